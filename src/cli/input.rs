//! Line commands accepted by the interactive shell.
//!
//! Parsing never fails: arguments are kept as typed and validated by the
//! shell when the command runs, so the user gets the same messages as for
//! any other invalid input.

/// Help text listing the shell commands.
pub const HELP_TEXT: &str = "\
Commands:
  login <user>      Log in (the password is asked for without echo)
  work <minutes>    Set the work duration (default 25)
  break <minutes>   Set the break duration (default 5)
  start             Start a session
  stop              Stop the running session
  complete          Complete the running session
  history           Show past sessions
  delete <id>       Delete a past session
  status            Show the current settings
  help              Show this help
  quit              Exit";

/// A parsed shell line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ShellCommand {
    /// Blank line
    Empty,
    /// `login <user>`; the password follows on its own line
    Login {
        /// Account name, possibly empty
        username: String,
    },
    /// `work <minutes>`
    SetWork(String),
    /// `break <minutes>`
    SetBreak(String),
    /// `start`
    Start,
    /// `stop`
    Stop,
    /// `complete`
    Complete,
    /// `history`
    History,
    /// `delete <id>`
    Delete(String),
    /// `status`
    Status,
    /// `help`
    Help,
    /// `quit`
    Quit,
    /// Anything else
    Unknown(String),
}

impl ShellCommand {
    /// Parses one input line.
    pub fn parse(line: &str) -> Self {
        let mut parts = line.split_whitespace();
        let Some(head) = parts.next() else {
            return Self::Empty;
        };
        let mut arg = || parts.next().unwrap_or_default().to_string();

        match head.to_ascii_lowercase().as_str() {
            "login" => Self::Login { username: arg() },
            "work" => Self::SetWork(arg()),
            "break" => Self::SetBreak(arg()),
            "start" => Self::Start,
            "stop" => Self::Stop,
            "complete" => Self::Complete,
            "history" => Self::History,
            "delete" => Self::Delete(arg()),
            "status" => Self::Status,
            "help" | "?" => Self::Help,
            "quit" | "exit" | "q" => Self::Quit,
            _ => Self::Unknown(head.to_string()),
        }
    }

    /// Returns true if the command needs a logged-in session.
    pub fn requires_login(&self) -> bool {
        matches!(
            self,
            Self::Start | Self::Stop | Self::Complete | Self::History | Self::Delete(_)
        )
    }
}
