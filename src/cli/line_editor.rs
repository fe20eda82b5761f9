//! Keyboard input for the interactive shell.
//!
//! On a terminal the shell switches to raw mode and edits the line itself,
//! so the status line redraw never wipes what the user is typing and a
//! password can be read without echo. Piped input is read line by line.

use std::io::{self, IsTerminal};
use std::time::Duration;

use anyhow::Result;
use crossterm::event::{self, Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers};
use crossterm::terminal;
use tokio::io::{AsyncBufReadExt, BufReader, Lines, Stdin};
use tokio::sync::mpsc;

use crate::display::DisplaySink;

const POLL_INTERVAL: Duration = Duration::from_millis(100);

// ============================================================================
// LineEditor
// ============================================================================

/// Result of feeding one key to a [`LineEditor`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EditAction {
    /// The buffer changed
    Edited,
    /// Enter was pressed; carries the finished line
    Submit(String),
    /// Ctrl-C
    Interrupt,
    /// Ctrl-D on an empty line
    EndOfInput,
    /// The key has no meaning here
    Ignored,
}

/// Single-line input buffer.
#[derive(Debug, Default)]
pub struct LineEditor {
    buffer: String,
    masked: bool,
}

impl LineEditor {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Hides typed characters, for password entry.
    pub fn set_masked(&mut self, masked: bool) {
        self.masked = masked;
    }

    /// Applies one key press.
    pub fn apply(&mut self, key: KeyEvent) -> EditAction {
        if key.kind != KeyEventKind::Press {
            return EditAction::Ignored;
        }

        if key.modifiers.contains(KeyModifiers::CONTROL) {
            return match key.code {
                KeyCode::Char('c') => EditAction::Interrupt,
                KeyCode::Char('d') if self.buffer.is_empty() => EditAction::EndOfInput,
                KeyCode::Char('u') => {
                    self.buffer.clear();
                    EditAction::Edited
                }
                _ => EditAction::Ignored,
            };
        }

        match key.code {
            KeyCode::Char(c) => {
                self.buffer.push(c);
                EditAction::Edited
            }
            KeyCode::Backspace => {
                if self.buffer.pop().is_some() {
                    EditAction::Edited
                } else {
                    EditAction::Ignored
                }
            }
            KeyCode::Esc => {
                self.buffer.clear();
                EditAction::Edited
            }
            KeyCode::Enter => EditAction::Submit(std::mem::take(&mut self.buffer)),
            _ => EditAction::Ignored,
        }
    }

    /// Returns the prompt and buffer as they should be drawn.
    pub fn view(&self) -> String {
        if self.masked {
            format!("Password: {}", "*".repeat(self.buffer.chars().count()))
        } else {
            format!("> {}", self.buffer)
        }
    }
}

// ============================================================================
// ShellInput
// ============================================================================

/// Source of shell lines.
pub enum ShellInput {
    /// Raw-mode terminal with keys arriving from a reader thread
    Terminal {
        keys: mpsc::UnboundedReceiver<KeyEvent>,
        editor: LineEditor,
    },
    /// Anything that is not a terminal
    Piped(Lines<BufReader<Stdin>>),
}

impl ShellInput {
    /// Opens stdin, switching to raw mode when it is a terminal.
    pub fn open() -> Result<Self> {
        if !io::stdin().is_terminal() {
            tracing::debug!("stdin is not a terminal, reading lines");
            return Ok(Self::Piped(BufReader::new(tokio::io::stdin()).lines()));
        }

        terminal::enable_raw_mode()?;
        Ok(Self::Terminal {
            keys: spawn_key_reader(),
            editor: LineEditor::new(),
        })
    }

    /// Waits for the next submitted line.
    ///
    /// Returns `None` at end of input or on Ctrl-C. Cancel safe: keys
    /// applied before a cancellation stay in the buffer.
    pub async fn next_line(
        &mut self,
        display: &dyn DisplaySink,
        masked: bool,
    ) -> Result<Option<String>> {
        match self {
            Self::Piped(lines) => Ok(lines.next_line().await?),
            Self::Terminal { keys, editor } => {
                editor.set_masked(masked);
                display.set_input(&editor.view());
                while let Some(key) = keys.recv().await {
                    match editor.apply(key) {
                        EditAction::Submit(line) => {
                            display.set_input("");
                            return Ok(Some(line));
                        }
                        EditAction::Interrupt | EditAction::EndOfInput => {
                            display.set_input("");
                            return Ok(None);
                        }
                        EditAction::Edited => display.set_input(&editor.view()),
                        EditAction::Ignored => {}
                    }
                }
                Ok(None)
            }
        }
    }
}

/// Polls crossterm for key events on a dedicated thread.
///
/// The thread exits when the receiver is dropped or reading fails.
fn spawn_key_reader() -> mpsc::UnboundedReceiver<KeyEvent> {
    let (tx, rx) = mpsc::unbounded_channel();
    std::thread::spawn(move || loop {
        if tx.is_closed() {
            break;
        }
        match event::poll(POLL_INTERVAL) {
            Ok(false) => continue,
            Ok(true) => {}
            Err(e) => {
                tracing::warn!("failed to poll terminal: {}", e);
                break;
            }
        }
        match event::read() {
            Ok(Event::Key(key)) => {
                if tx.send(key).is_err() {
                    break;
                }
            }
            Ok(_) => {}
            Err(e) => {
                tracing::warn!("failed to read key: {}", e);
                break;
            }
        }
    });
    rx
}

#[cfg(test)]
mod tests {
    use super::*;

    fn press(code: KeyCode) -> KeyEvent {
        KeyEvent::new(code, KeyModifiers::NONE)
    }

    fn ctrl(c: char) -> KeyEvent {
        KeyEvent::new(KeyCode::Char(c), KeyModifiers::CONTROL)
    }

    fn type_text(editor: &mut LineEditor, text: &str) {
        for c in text.chars() {
            assert_eq!(editor.apply(press(KeyCode::Char(c))), EditAction::Edited);
        }
    }

    #[test]
    fn test_typing_and_submit() {
        let mut editor = LineEditor::new();
        type_text(&mut editor, "start");
        assert_eq!(editor.view(), "> start");

        assert_eq!(
            editor.apply(press(KeyCode::Enter)),
            EditAction::Submit("start".to_string())
        );
        assert_eq!(editor.view(), "> ");
    }

    #[test]
    fn test_backspace_and_clear() {
        let mut editor = LineEditor::new();
        type_text(&mut editor, "stopx");
        assert_eq!(editor.apply(press(KeyCode::Backspace)), EditAction::Edited);
        assert_eq!(editor.view(), "> stop");

        assert_eq!(editor.apply(ctrl('u')), EditAction::Edited);
        assert_eq!(editor.view(), "> ");
        assert_eq!(editor.apply(press(KeyCode::Backspace)), EditAction::Ignored);
    }

    #[test]
    fn test_masked_view_hides_characters() {
        let mut editor = LineEditor::new();
        editor.set_masked(true);
        type_text(&mut editor, "s3cret");

        assert_eq!(editor.view(), "Password: ******");
        assert!(!editor.view().contains("s3cret"));
        assert_eq!(
            editor.apply(press(KeyCode::Enter)),
            EditAction::Submit("s3cret".to_string())
        );
    }

    #[test]
    fn test_control_keys() {
        let mut editor = LineEditor::new();
        assert_eq!(editor.apply(ctrl('d')), EditAction::EndOfInput);
        type_text(&mut editor, "h");
        assert_eq!(editor.apply(ctrl('d')), EditAction::Ignored);
        assert_eq!(editor.apply(ctrl('c')), EditAction::Interrupt);
    }

    #[test]
    fn test_release_events_are_ignored() {
        let mut editor = LineEditor::new();
        let mut key = press(KeyCode::Char('x'));
        key.kind = KeyEventKind::Release;

        assert_eq!(editor.apply(key), EditAction::Ignored);
        assert_eq!(editor.view(), "> ");
    }
}
