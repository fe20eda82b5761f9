//! Display sink for countdown, status and transient messages.
//!
//! The timer and the shell only ever push text into a [`DisplaySink`]; they
//! never read it back. Implementations must not block, since the timer
//! calls them from its background task.
//!
//! - `message`: self-clearing message area
//! - `terminal`: crossterm renderer for the interactive shell

pub mod message;
pub mod terminal;

use std::sync::Mutex;

pub use message::MessageArea;
pub use terminal::TerminalDisplay;

/// Receiver of display updates.
pub trait DisplaySink: Send + Sync {
    /// Replaces the countdown text.
    fn set_countdown(&self, text: &str);

    /// Replaces the status text.
    fn set_status(&self, text: &str);

    /// Shows a message that clears itself after a while.
    fn show_message(&self, text: &str);

    /// Prints multi-line output such as the history table.
    fn print_block(&self, _text: &str) {}

    /// Replaces the input line the user is typing.
    fn set_input(&self, _text: &str) {}
}

/// One update received by [`RecordingDisplay`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DisplayEvent {
    /// `set_countdown`
    Countdown(String),
    /// `set_status`
    Status(String),
    /// `show_message`
    Message(String),
    /// `print_block`
    Block(String),
}

/// Display sink that records every update, for tests.
///
/// The input line is kept apart from [`DisplayEvent`]s since it changes on
/// every key.
#[derive(Debug, Default)]
pub struct RecordingDisplay {
    events: Mutex<Vec<DisplayEvent>>,
    input: Mutex<String>,
}

impl RecordingDisplay {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns all updates received so far.
    pub fn events(&self) -> Vec<DisplayEvent> {
        self.events.lock().unwrap().clone()
    }

    /// Returns the countdown texts in order.
    pub fn countdowns(&self) -> Vec<String> {
        self.events()
            .into_iter()
            .filter_map(|event| match event {
                DisplayEvent::Countdown(text) => Some(text),
                _ => None,
            })
            .collect()
    }

    /// Returns the status texts in order.
    pub fn statuses(&self) -> Vec<String> {
        self.events()
            .into_iter()
            .filter_map(|event| match event {
                DisplayEvent::Status(text) => Some(text),
                _ => None,
            })
            .collect()
    }

    /// Returns the messages in order.
    pub fn messages(&self) -> Vec<String> {
        self.events()
            .into_iter()
            .filter_map(|event| match event {
                DisplayEvent::Message(text) => Some(text),
                _ => None,
            })
            .collect()
    }

    /// Returns the printed blocks in order.
    pub fn blocks(&self) -> Vec<String> {
        self.events()
            .into_iter()
            .filter_map(|event| match event {
                DisplayEvent::Block(text) => Some(text),
                _ => None,
            })
            .collect()
    }

    /// Returns the most recent countdown text.
    pub fn last_countdown(&self) -> Option<String> {
        self.countdowns().pop()
    }

    /// Returns the current input line.
    pub fn input(&self) -> String {
        self.input.lock().unwrap().clone()
    }

    /// Forgets everything recorded so far.
    pub fn clear(&self) {
        self.events.lock().unwrap().clear();
    }

    fn push(&self, event: DisplayEvent) {
        self.events.lock().unwrap().push(event);
    }
}

impl DisplaySink for RecordingDisplay {
    fn set_countdown(&self, text: &str) {
        self.push(DisplayEvent::Countdown(text.to_string()));
    }

    fn set_status(&self, text: &str) {
        self.push(DisplayEvent::Status(text.to_string()));
    }

    fn show_message(&self, text: &str) {
        self.push(DisplayEvent::Message(text.to_string()));
    }

    fn print_block(&self, text: &str) {
        self.push(DisplayEvent::Block(text.to_string()));
    }

    fn set_input(&self, text: &str) {
        *self.input.lock().unwrap() = text.to_string();
    }
}
