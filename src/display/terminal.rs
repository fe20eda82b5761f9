//! Terminal renderer for the interactive shell.
//!
//! Countdown, status, the transient message and the input being typed share
//! a single line that is redrawn in place. Block output such as the history
//! table is printed above it with [`DisplaySink::print_block`].
//!
//! The shell keeps the terminal in raw mode while it reads keys, so every
//! newline written here is an explicit `\r\n`.

use std::io::{self, Write};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use crossterm::cursor::MoveToColumn;
use crossterm::style::Print;
use crossterm::terminal::{self, Clear, ClearType};
use crossterm::QueueableCommand;

use super::message::MessageArea;
use super::DisplaySink;

#[derive(Debug)]
struct Screen {
    countdown: String,
    status: String,
    input: String,
}

/// Crossterm-backed [`DisplaySink`].
#[derive(Debug, Clone)]
pub struct TerminalDisplay {
    screen: Arc<Mutex<Screen>>,
    messages: MessageArea,
}

impl TerminalDisplay {
    /// Creates a renderer whose messages stay visible for `message_ttl`.
    pub fn new(message_ttl: Duration) -> Self {
        Self {
            screen: Arc::new(Mutex::new(Screen {
                countdown: "00:00".to_string(),
                status: "Status: Not started".to_string(),
                input: String::new(),
            })),
            messages: MessageArea::new(message_ttl),
        }
    }

    /// Composes the status line.
    fn compose(screen: &Screen, message: &str) -> String {
        let mut line = format!("[{}] {}", screen.countdown, screen.status);
        if !message.is_empty() {
            line.push_str(" | ");
            line.push_str(message);
        }
        if !screen.input.is_empty() {
            line.push_str("  ");
            line.push_str(&screen.input);
        }
        line
    }

    /// Returns the status line as it would be drawn now.
    pub fn line(&self) -> String {
        let message = self.messages.current();
        self.screen
            .lock()
            .map(|screen| Self::compose(&screen, &message))
            .unwrap_or_default()
    }

    /// Restores the terminal and moves to a fresh line, leaving the status
    /// line in place.
    pub fn finish(&self) {
        if let Err(e) = terminal::disable_raw_mode() {
            tracing::debug!("failed to leave raw mode: {}", e);
        }
        let mut out = io::stdout().lock();
        let _ = writeln!(out);
        let _ = out.flush();
    }

    fn redraw(&self) {
        render_line(&self.line());
    }
}

fn render_line(line: &str) {
    if let Err(e) = write_line(None, line) {
        tracing::debug!("failed to redraw status line: {}", e);
    }
}

/// Clears the current line, optionally prints `block` above, then draws `line`.
fn write_line(block: Option<&str>, line: &str) -> io::Result<()> {
    let mut out = io::stdout().lock();
    out.queue(MoveToColumn(0))?
        .queue(Clear(ClearType::CurrentLine))?;
    if let Some(text) = block {
        out.queue(Print(format!("{}\r\n", text.replace('\n', "\r\n"))))?;
    }
    out.queue(Print(line))?;
    out.flush()
}

impl DisplaySink for TerminalDisplay {
    fn set_countdown(&self, text: &str) {
        if let Ok(mut screen) = self.screen.lock() {
            screen.countdown = text.to_string();
        }
        self.redraw();
    }

    fn set_status(&self, text: &str) {
        if let Ok(mut screen) = self.screen.lock() {
            screen.status = text.to_string();
        }
        self.redraw();
    }

    fn show_message(&self, text: &str) {
        let this = self.clone();
        self.messages.show(text, move || this.redraw());
        self.redraw();
    }

    fn print_block(&self, text: &str) {
        if let Err(e) = write_line(Some(text), &self.line()) {
            tracing::debug!("failed to print block: {}", e);
        }
    }

    fn set_input(&self, text: &str) {
        if let Ok(mut screen) = self.screen.lock() {
            screen.input = text.to_string();
        }
        self.redraw();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_initial_line() {
        let display = TerminalDisplay::new(Duration::from_secs(4));
        assert_eq!(display.line(), "[00:00] Status: Not started");
    }

    #[test]
    fn test_line_reflects_updates() {
        let display = TerminalDisplay::new(Duration::from_secs(4));
        display.set_countdown("24:59");
        display.set_status("Status: running");
        assert_eq!(display.line(), "[24:59] Status: running");
    }

    #[test]
    fn test_countdown_redraw_keeps_pending_input() {
        let display = TerminalDisplay::new(Duration::from_secs(4));
        display.set_input("> sto");
        display.set_countdown("24:59");
        assert_eq!(display.line(), "[24:59] Status: Not started  > sto");

        display.set_input("");
        assert_eq!(display.line(), "[24:59] Status: Not started");
    }

    #[tokio::test(start_paused = true)]
    async fn test_message_and_input_share_the_line() {
        let display = TerminalDisplay::new(Duration::from_secs(4));
        display.set_input("> hist");
        display.show_message("Logged in");
        assert_eq!(
            display.line(),
            "[00:00] Status: Not started | Logged in  > hist"
        );

        tokio::time::sleep(Duration::from_secs(5)).await;
        assert_eq!(display.line(), "[00:00] Status: Not started  > hist");
    }

    #[tokio::test(start_paused = true)]
    async fn test_message_appears_then_clears() {
        let display = TerminalDisplay::new(Duration::from_secs(4));
        display.show_message("Logged in");
        assert_eq!(display.line(), "[00:00] Status: Not started | Logged in");

        tokio::time::sleep(Duration::from_secs(5)).await;
        assert_eq!(display.line(), "[00:00] Status: Not started");
    }
}
