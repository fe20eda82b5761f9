//! Interactive shell for the Pomodoro client.
//!
//! The shell owns the logged-in session and the [`PhaseTimer`], turns each
//! input line into a [`ShellCommand`] and reports every outcome through the
//! display. Failures never end the shell; they become transient messages.
//! A rejected credential drops the session so the user can log in again.

use std::sync::Arc;

use anyhow::Result;
use tokio::sync::mpsc;

use crate::display::DisplaySink;
use crate::session::{AuthorizedSession, RemoteError, SessionApi};
use crate::settings::DurationSettings;
use crate::timer::{Clock, PhaseTimer, TimerEvent, IDLE_COUNTDOWN};

use super::display::Display;
use super::input::{ShellCommand, HELP_TEXT};
use super::line_editor::ShellInput;

/// Whether the shell keeps reading input.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Flow {
    /// Read the next line
    Continue,
    /// Leave the shell
    Quit,
}

struct LoggedIn {
    session: AuthorizedSession,
    timer: PhaseTimer,
}

// ============================================================================
// Shell
// ============================================================================

/// The application shell.
pub struct Shell {
    api: Arc<dyn SessionApi>,
    display: Arc<dyn DisplaySink>,
    settings: DurationSettings,
    clock: Arc<dyn Clock>,
    event_tx: mpsc::UnboundedSender<TimerEvent>,
    events: mpsc::UnboundedReceiver<TimerEvent>,
    logged_in: Option<LoggedIn>,
    /// Username from `login`, waiting for its password line
    pending_login: Option<String>,
}

impl Shell {
    /// Creates a shell that is not logged in yet.
    pub fn new(
        api: Arc<dyn SessionApi>,
        display: Arc<dyn DisplaySink>,
        settings: DurationSettings,
        clock: Arc<dyn Clock>,
    ) -> Self {
        let (event_tx, events) = mpsc::unbounded_channel();
        Self {
            api,
            display,
            settings,
            clock,
            event_tx,
            events,
            logged_in: None,
            pending_login: None,
        }
    }

    /// Returns true after a successful login.
    pub fn is_logged_in(&self) -> bool {
        self.logged_in.is_some()
    }

    /// Returns true if the next line is read as a password.
    pub fn awaiting_password(&self) -> bool {
        self.pending_login.is_some()
    }

    /// Returns true while a timer run is active.
    pub fn timer_running(&self) -> bool {
        self.logged_in
            .as_ref()
            .is_some_and(|state| state.timer.is_running())
    }

    /// Reads commands from stdin until `quit`, end of input or Ctrl-C.
    ///
    /// On a terminal this enables raw mode; the caller restores it with
    /// [`TerminalDisplay::finish`](crate::display::TerminalDisplay::finish).
    pub async fn run(&mut self) -> Result<()> {
        let mut input = ShellInput::open()?;
        let display = Arc::clone(&self.display);

        loop {
            let masked = self.awaiting_password();
            tokio::select! {
                line = input.next_line(display.as_ref(), masked) => {
                    let Some(line) = line? else {
                        tracing::debug!("end of input");
                        break;
                    };
                    if self.handle_line(&line).await == Flow::Quit {
                        break;
                    }
                }
                Some(event) = self.events.recv() => {
                    self.handle_event(event).await;
                }
                _ = tokio::signal::ctrl_c() => {
                    tracing::debug!("interrupted");
                    break;
                }
            }
        }

        self.shutdown();
        Ok(())
    }

    /// Parses and runs one input line.
    ///
    /// After `login <user>` the next line is taken as the password instead.
    pub async fn handle_line(&mut self, line: &str) -> Flow {
        if let Some(username) = self.pending_login.take() {
            self.login(&username, line).await;
            return Flow::Continue;
        }
        self.handle(ShellCommand::parse(line)).await
    }

    /// Runs one command.
    pub async fn handle(&mut self, command: ShellCommand) -> Flow {
        if command.requires_login() && !self.is_logged_in() {
            self.display.show_message("Please log in first");
            return Flow::Continue;
        }

        match command {
            ShellCommand::Empty => {}
            ShellCommand::Login { username } => self.request_password(username),
            ShellCommand::SetWork(input) => self.settings.set_work(input),
            ShellCommand::SetBreak(input) => self.settings.set_break(input),
            ShellCommand::Start => self.start().await,
            ShellCommand::Stop => self.stop().await,
            ShellCommand::Complete => self.complete().await,
            ShellCommand::History => self.refresh_history().await,
            ShellCommand::Delete(raw) => self.delete(&raw).await,
            ShellCommand::Status => self.show_settings(),
            ShellCommand::Help => self.display.print_block(HELP_TEXT),
            ShellCommand::Quit => {
                self.shutdown();
                return Flow::Quit;
            }
            ShellCommand::Unknown(word) => self.display.show_message(&format!(
                "Unknown command '{}'. Type 'help' for a list of commands",
                word
            )),
        }
        Flow::Continue
    }

    /// Reacts to a notification from the timer.
    pub async fn handle_event(&mut self, event: TimerEvent) {
        match event {
            TimerEvent::SessionCompleted { status } => {
                tracing::info!("session completed by timer: {}", status);
                self.refresh_history().await;
            }
            other => tracing::debug!("timer event: {:?}", other),
        }
    }

    /// Cancels the active run.
    pub fn shutdown(&mut self) {
        if let Some(state) = self.logged_in.as_mut() {
            state.timer.cancel();
        }
    }

    // ------------------------------------------------------------------------
    // Commands
    // ------------------------------------------------------------------------

    fn request_password(&mut self, username: String) {
        if username.is_empty() {
            self.display.show_message("Enter username and password");
            return;
        }
        self.pending_login = Some(username);
    }

    /// Logs in and replaces any previous session.
    pub async fn login(&mut self, username: &str, password: &str) {
        self.pending_login = None;
        if username.is_empty() || password.is_empty() {
            self.display.show_message("Enter username and password");
            return;
        }

        match AuthorizedSession::login(Arc::clone(&self.api), username, password).await {
            Ok(session) => {
                // Replacing the previous login drops its timer, which cancels it.
                let timer = PhaseTimer::new(
                    session.clone(),
                    Arc::clone(&self.display),
                    self.settings.clone(),
                    Arc::clone(&self.clock),
                    self.event_tx.clone(),
                );
                self.logged_in = Some(LoggedIn { session, timer });
                tracing::info!("logged in as {}", username);
                self.display.show_message("Logged in");
                self.refresh_history().await;
            }
            Err(e) => {
                tracing::warn!("{}", e);
                self.display.show_message(&e.to_string());
            }
        }
    }

    async fn start(&mut self) {
        let Some(state) = self.logged_in.as_mut() else {
            return;
        };

        let durations = match self.settings.session_durations() {
            Ok(durations) => durations,
            Err(e) => {
                self.display.show_message(&e.to_string());
                return;
            }
        };

        let result = state
            .session
            .start(durations.work_minutes, durations.break_minutes)
            .await;
        match result {
            Ok(started) => {
                state.timer.cancel();
                let phase_start = started.phase_start(self.clock.timezone(), self.clock.now());
                self.display.set_status(&format!("Status: {}", started.status));
                if let Err(e) = state.timer.start(durations.work_minutes, phase_start) {
                    self.display.show_message(&e.to_string());
                }
            }
            Err(e) => self.report(e),
        }
    }

    async fn stop(&mut self) {
        let Some(state) = self.logged_in.as_ref() else {
            return;
        };
        let result = state.session.stop().await;
        match result {
            Ok(outcome) => self.finalize(&outcome.status).await,
            Err(e) => self.report(e),
        }
    }

    async fn complete(&mut self) {
        let Some(state) = self.logged_in.as_ref() else {
            return;
        };
        let result = state.session.complete().await;
        match result {
            Ok(outcome) => self.finalize(&outcome.status).await,
            Err(e) => self.report(e),
        }
    }

    async fn delete(&mut self, raw: &str) {
        let session_id = match parse_session_id(raw) {
            Some(id) => id,
            None => {
                self.display
                    .show_message("Please enter a valid numeric session ID");
                return;
            }
        };
        let Some(state) = self.logged_in.as_ref() else {
            return;
        };

        let result = state.session.delete(session_id).await;
        match result {
            Ok(()) => {
                self.display
                    .show_message(&format!("Session {} deleted", session_id));
                if self.timer_running() {
                    self.reset_timer();
                }
                self.refresh_history().await;
            }
            Err(e) => self.report(e),
        }
    }

    fn show_settings(&self) {
        let (work, breaks) = self.settings.raw();
        let phase = if self.timer_running() { "running" } else { "idle" };
        self.display.show_message(&format!(
            "Work: {} min, Break: {} min, Timer: {}",
            or_default(&work),
            or_default(&breaks),
            phase
        ));
    }

    // ------------------------------------------------------------------------
    // Helpers
    // ------------------------------------------------------------------------

    /// Ends the session locally after the server reported its final status.
    async fn finalize(&mut self, status: &str) {
        self.reset_timer();
        self.display.set_status(&format!("Status: {}", status));
        self.refresh_history().await;
    }

    fn reset_timer(&mut self) {
        if let Some(state) = self.logged_in.as_mut() {
            state.timer.cancel();
        }
        self.display.set_countdown(IDLE_COUNTDOWN);
    }

    async fn refresh_history(&mut self) {
        let Some(state) = self.logged_in.as_ref() else {
            return;
        };
        let result = state.session.list_history().await;
        match result {
            Ok(entries) => self.display.print_block(&Display::history_table(&entries)),
            Err(e) => self.report(e),
        }
    }

    /// Shows a failed session call; a rejected credential also logs out.
    fn report(&mut self, e: RemoteError) {
        tracing::warn!("{}", e);
        if e.is_unauthorized() {
            self.reset_timer();
            self.logged_in = None;
            self.display
                .show_message(&format!("{}. Please log in again", e));
        } else {
            self.display.show_message(&e.to_string());
        }
    }
}

/// Accepts only plain ASCII digits.
fn parse_session_id(raw: &str) -> Option<u64> {
    if raw.is_empty() || !raw.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    raw.parse().ok()
}

fn or_default(raw: &str) -> &str {
    if raw.trim().is_empty() {
        "default"
    } else {
        raw
    }
}

// ============================================================================
// Tests
// ============================================================================
