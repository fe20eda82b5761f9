//! CLI module for the Pomodoro client.
//!
//! This module provides the command-line interface:
//! - `commands`: Command definitions using clap derive
//! - `input`: Line commands of the interactive shell
//! - `line_editor`: Raw-mode key input and the line being typed
//! - `shell`: The interactive shell driving the session and timer
//! - `display`: Output formatting for one-shot commands

pub mod commands;
pub mod display;
pub mod input;
pub mod line_editor;
pub mod shell;

pub use commands::{Cli, Commands, CredentialArgs, ShellArgs};
pub use display::Display;
pub use input::{ShellCommand, HELP_TEXT};
pub use line_editor::{EditAction, LineEditor, ShellInput};
pub use shell::{Flow, Shell};
