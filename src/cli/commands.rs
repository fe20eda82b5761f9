//! Command definitions for the Pomodoro client.
//!
//! Uses clap derive macro for argument parsing.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

// ============================================================================
// CLI Structure
// ============================================================================

/// Terminal client for a remote Pomodoro focus-session service
#[derive(Parser, Debug)]
#[command(
    name = "pomodoro-client",
    version,
    about = "Terminal client for a remote Pomodoro focus-session service",
    long_about = "Log in to a focus-session service, run a work/break timer with a live \
                  countdown, and browse or delete past sessions.\n\
                  Without a subcommand an interactive shell is started.",
    propagate_version = true
)]
pub struct Cli {
    /// Subcommand to execute
    #[command(subcommand)]
    pub command: Option<Commands>,

    /// Enable verbose output for debugging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Path to the JSON config file
    #[arg(long, global = true, value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// Base URL of the session service (overrides the config file)
    #[arg(long, global = true, env = "POMODORO_BASE_URL", value_name = "URL")]
    pub base_url: Option<String>,
}

// ============================================================================
// Subcommands
// ============================================================================

/// Available subcommands
#[derive(Subcommand, Debug, Clone)]
pub enum Commands {
    /// Start the interactive shell (default)
    Shell(ShellArgs),

    /// Print the session history
    History(CredentialArgs),

    /// Delete a past session
    Delete {
        /// Numeric session ID
        id: u64,

        #[command(flatten)]
        credentials: CredentialArgs,
    },

    /// Generate shell completion scripts
    Completions {
        /// Shell type for completion script
        #[arg(value_enum)]
        shell: clap_complete::Shell,
    },
}

// ============================================================================
// Arguments
// ============================================================================

/// Credentials for one-shot commands
#[derive(Args, Debug, Clone)]
pub struct CredentialArgs {
    /// Account name
    #[arg(short, long, env = "POMODORO_USERNAME")]
    pub username: String,

    /// Account password
    #[arg(short, long, env = "POMODORO_PASSWORD", hide_env_values = true)]
    pub password: String,
}

/// Arguments for the interactive shell
#[derive(Args, Debug, Clone, Default)]
pub struct ShellArgs {
    /// Log in with this account on startup
    #[arg(short, long, env = "POMODORO_USERNAME")]
    pub username: Option<String>,

    /// Password for the startup login; asked for without echo when omitted
    #[arg(short, long, env = "POMODORO_PASSWORD", hide_env_values = true)]
    pub password: Option<String>,
}

// ============================================================================
// Tests
// ============================================================================
