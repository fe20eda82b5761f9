//! Session service boundary.
//!
//! This module provides:
//! - `client`: the [`SessionApi`] trait and its HTTP implementation
//! - `error`: [`RemoteError`] and the [`Operation`] it belongs to
//! - `mock`: a recording [`MockSessionApi`] for tests
//!
//! [`AuthorizedSession`] pairs an API with the bearer credential obtained at
//! login, so callers past the login step never handle the token directly.

pub mod client;
pub mod error;
pub mod mock;

use std::fmt;
use std::sync::Arc;

pub use client::{HttpSessionClient, SessionApi};
pub use error::{Operation, RemoteError};
pub use mock::{MockCall, MockSessionApi};

use crate::types::{HistoryEntry, SessionStatus, StartedSession};

/// A logged-in handle to the session service.
#[derive(Clone)]
pub struct AuthorizedSession {
    api: Arc<dyn SessionApi>,
    token: String,
}

impl fmt::Debug for AuthorizedSession {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AuthorizedSession")
            .field("token", &"<redacted>")
            .finish()
    }
}

impl AuthorizedSession {
    /// Wraps an API and a bearer token.
    pub fn new(api: Arc<dyn SessionApi>, token: impl Into<String>) -> Self {
        Self {
            api,
            token: token.into(),
        }
    }

    /// Logs in and returns an authorized handle.
    pub async fn login(
        api: Arc<dyn SessionApi>,
        username: &str,
        password: &str,
    ) -> Result<Self, RemoteError> {
        let token = api.login(username, password).await?;
        Ok(Self::new(api, token))
    }

    /// Starts a session.
    pub async fn start(
        &self,
        session_minutes: u32,
        break_minutes: u32,
    ) -> Result<StartedSession, RemoteError> {
        self.api
            .start(&self.token, session_minutes, break_minutes)
            .await
    }

    /// Stops the running session.
    pub async fn stop(&self) -> Result<SessionStatus, RemoteError> {
        self.api.stop(&self.token).await
    }

    /// Completes the running session.
    pub async fn complete(&self) -> Result<SessionStatus, RemoteError> {
        self.api.complete(&self.token).await
    }

    /// Lists past sessions.
    pub async fn list_history(&self) -> Result<Vec<HistoryEntry>, RemoteError> {
        self.api.list_history(&self.token).await
    }

    /// Deletes a past session.
    pub async fn delete(&self, session_id: u64) -> Result<(), RemoteError> {
        self.api.delete(&self.token, session_id).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_login_wraps_token() {
        let api = Arc::new(MockSessionApi::new());
        let session = AuthorizedSession::login(api.clone(), "ada", "secret")
            .await
            .unwrap();

        session.complete().await.unwrap();

        assert_eq!(
            api.calls(),
            vec![
                MockCall::Login {
                    username: "ada".to_string()
                },
                MockCall::Complete,
            ]
        );
    }

    #[tokio::test]
    async fn test_login_failure() {
        let api = Arc::new(MockSessionApi::new());
        api.set_failing(Operation::Login, true);

        let result = AuthorizedSession::login(api, "ada", "wrong").await;
        assert!(matches!(
            result,
            Err(RemoteError::Status {
                operation: Operation::Login,
                status: 500,
                ..
            })
        ));
    }

    #[test]
    fn test_debug_redacts_token() {
        let session = AuthorizedSession::new(Arc::new(MockSessionApi::new()), "s3cr3t");
        let debug = format!("{:?}", session);
        assert!(!debug.contains("s3cr3t"));
    }
}
