//! Session service error types.
//!
//! Every failure talking to the remote service is a [`RemoteError`]. The
//! shell turns them into transient messages; none of them are fatal.

use std::fmt;

use thiserror::Error;

/// The remote operation a request belonged to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Operation {
    /// Credential exchange
    Login,
    /// Start a session
    Start,
    /// Stop the running session
    Stop,
    /// Complete the running session
    Complete,
    /// List past sessions
    History,
    /// Delete a past session
    Delete,
}

impl Operation {
    /// Returns a short verb phrase for messages.
    pub fn describe(&self) -> &'static str {
        match self {
            Operation::Login => "log in",
            Operation::Start => "start session",
            Operation::Stop => "stop session",
            Operation::Complete => "complete session",
            Operation::History => "fetch history",
            Operation::Delete => "delete session",
        }
    }
}

impl fmt::Display for Operation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.describe())
    }
}

/// Errors returned by the session service boundary.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum RemoteError {
    /// The server answered with an unexpected status.
    #[error("Failed to {operation} (HTTP {status}): {message}")]
    Status {
        /// Operation that failed
        operation: Operation,
        /// HTTP status code
        status: u16,
        /// Response body text
        message: String,
    },

    /// The request never produced a response.
    #[error("Failed to {operation}: {message}")]
    Transport {
        /// Operation that failed
        operation: Operation,
        /// Transport error description
        message: String,
    },

    /// The response body could not be decoded.
    #[error("Failed to {operation}: unexpected response ({message})")]
    Decode {
        /// Operation that failed
        operation: Operation,
        /// Decoder error description
        message: String,
    },

    /// Login succeeded but no token was returned.
    #[error("Login failed: no token returned")]
    MissingToken,

    /// The configured base URL cannot be used.
    #[error("Invalid service URL: {0}")]
    InvalidUrl(String),
}

impl RemoteError {
    /// Returns true if the server rejected the credential.
    #[must_use]
    pub fn is_unauthorized(&self) -> bool {
        matches!(self, Self::Status { status: 401 | 403, .. })
    }
}
