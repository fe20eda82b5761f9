//! Pomodoro Client Library
//!
//! This library provides the core functionality for the Pomodoro terminal
//! client. It includes:
//! - Phase timer with cancellable, generation-guarded runs
//! - Session service client (HTTP, bearer auth) and a recording mock
//! - Display sink with a crossterm status line and self-clearing messages
//! - Live duration settings and file-based configuration
//! - CLI command parsing and the interactive shell

pub mod cli;
pub mod config;
pub mod display;
pub mod session;
pub mod settings;
pub mod timer;
pub mod types;

// Re-export commonly used types for convenience
pub use types::{
    format_countdown, parse_started_at, HistoryEntry, SessionPhase, SessionStatus,
    StartedSession, TimerState, Transition,
};

pub use config::{AppConfig, ConfigError};
pub use settings::{ConfigurationError, DurationSettings, SessionDurations};

pub use session::{
    AuthorizedSession, HttpSessionClient, MockCall, MockSessionApi, Operation, RemoteError,
    SessionApi,
};

pub use display::{DisplayEvent, DisplaySink, RecordingDisplay, TerminalDisplay};

pub use timer::{Clock, MockClock, PhaseTimer, RunOutcome, SystemClock, TimerEvent};
