//! HTTP client for the session service.
//!
//! This module provides:
//! - The [`SessionApi`] trait the rest of the client is written against
//! - [`HttpSessionClient`], a reqwest implementation with fixed endpoints

use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, RequestBuilder, StatusCode};
use serde::de::DeserializeOwned;
use url::Url;

use crate::types::{
    HistoryEntry, LoginRequest, LoginResponse, SessionResponse, SessionStatus, StartRequest,
    StartedSession,
};

use super::error::{Operation, RemoteError};

// ============================================================================
// Constants
// ============================================================================

const LOGIN_PATH: &str = "auth/login";
const START_PATH: &str = "api/pomodoro/start";
const STOP_PATH: &str = "api/pomodoro/stop";
const COMPLETE_PATH: &str = "api/pomodoro/complete";
const HISTORY_PATH: &str = "api/pomodoro/history";
const SESSION_PATH_PREFIX: &str = "api/pomodoro/";

// ============================================================================
// SessionApi
// ============================================================================

/// Operations offered by the remote session service.
///
/// All session operations take the bearer credential obtained from
/// [`SessionApi::login`].
#[async_trait]
pub trait SessionApi: Send + Sync {
    /// Exchanges credentials for a bearer token.
    async fn login(&self, username: &str, password: &str) -> Result<String, RemoteError>;

    /// Starts a new session.
    async fn start(
        &self,
        token: &str,
        session_minutes: u32,
        break_minutes: u32,
    ) -> Result<StartedSession, RemoteError>;

    /// Stops the running session.
    async fn stop(&self, token: &str) -> Result<SessionStatus, RemoteError>;

    /// Marks the running session as completed.
    async fn complete(&self, token: &str) -> Result<SessionStatus, RemoteError>;

    /// Lists past sessions, in server order.
    async fn list_history(&self, token: &str) -> Result<Vec<HistoryEntry>, RemoteError>;

    /// Deletes a past session.
    async fn delete(&self, token: &str, session_id: u64) -> Result<(), RemoteError>;
}

// ============================================================================
// HttpSessionClient
// ============================================================================

/// reqwest-backed [`SessionApi`].
#[derive(Debug, Clone)]
pub struct HttpSessionClient {
    client: Client,
    base_url: Url,
}

impl HttpSessionClient {
    /// Creates a client for the service at `base_url`.
    ///
    /// # Errors
    ///
    /// Returns an error if the URL is invalid or the HTTP client cannot be
    /// built.
    pub fn new(base_url: &str, timeout: Duration) -> Result<Self, RemoteError> {
        let mut base_url =
            Url::parse(base_url).map_err(|e| RemoteError::InvalidUrl(format!("{base_url}: {e}")))?;
        if base_url.cannot_be_a_base() {
            return Err(RemoteError::InvalidUrl(base_url.to_string()));
        }
        // Url::join replaces the last segment unless the path ends with '/'
        if !base_url.path().ends_with('/') {
            let path = format!("{}/", base_url.path());
            base_url.set_path(&path);
        }

        let client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| RemoteError::InvalidUrl(format!("failed to build HTTP client: {e}")))?;

        Ok(Self { client, base_url })
    }

    /// Returns the normalized base URL.
    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    fn endpoint(&self, path: &str) -> Result<Url, RemoteError> {
        self.base_url
            .join(path)
            .map_err(|e| RemoteError::InvalidUrl(format!("{path}: {e}")))
    }

    /// Sends a request and returns the body if the status is expected.
    async fn send(
        &self,
        operation: Operation,
        request: RequestBuilder,
        expected: &[StatusCode],
    ) -> Result<String, RemoteError> {
        let response = request
            .send()
            .await
            .map_err(|e| RemoteError::Transport {
                operation,
                message: e.to_string(),
            })?;

        let status = response.status();
        let body = response.text().await.map_err(|e| RemoteError::Transport {
            operation,
            message: format!("failed reading response: {e}"),
        })?;

        if !expected.contains(&status) {
            tracing::warn!("{} returned HTTP {}", operation, status.as_u16());
            return Err(RemoteError::Status {
                operation,
                status: status.as_u16(),
                message: body,
            });
        }

        Ok(body)
    }

    fn decode<T: DeserializeOwned + Default>(
        operation: Operation,
        body: &str,
    ) -> Result<T, RemoteError> {
        if body.trim().is_empty() {
            return Ok(T::default());
        }
        serde_json::from_str(body).map_err(|e| RemoteError::Decode {
            operation,
            message: e.to_string(),
        })
    }

    async fn session_call(
        &self,
        operation: Operation,
        request: RequestBuilder,
        default_status: &str,
    ) -> Result<SessionStatus, RemoteError> {
        let body = self.send(operation, request, &[StatusCode::OK]).await?;
        let parsed: SessionResponse = Self::decode(operation, &body)?;
        Ok(SessionStatus {
            status: parsed.status.unwrap_or_else(|| default_status.to_string()),
        })
    }
}

#[async_trait]
impl SessionApi for HttpSessionClient {
    async fn login(&self, username: &str, password: &str) -> Result<String, RemoteError> {
        let request = self
            .client
            .post(self.endpoint(LOGIN_PATH)?)
            .json(&LoginRequest { username, password });

        let body = self.send(Operation::Login, request, &[StatusCode::OK]).await?;
        let parsed: LoginResponse = Self::decode(Operation::Login, &body)?;

        parsed
            .token
            .filter(|token| !token.trim().is_empty())
            .ok_or(RemoteError::MissingToken)
    }

    async fn start(
        &self,
        token: &str,
        session_minutes: u32,
        break_minutes: u32,
    ) -> Result<StartedSession, RemoteError> {
        let request = self
            .client
            .post(self.endpoint(START_PATH)?)
            .bearer_auth(token)
            .json(&StartRequest {
                session_duration: session_minutes,
                break_duration: break_minutes,
            });

        let body = self
            .send(
                Operation::Start,
                request,
                &[StatusCode::OK, StatusCode::CREATED],
            )
            .await?;
        let parsed: SessionResponse = Self::decode(Operation::Start, &body)?;

        Ok(StartedSession {
            status: parsed.status.unwrap_or_else(|| "running".to_string()),
            started_at: parsed.started_at,
        })
    }

    async fn stop(&self, token: &str) -> Result<SessionStatus, RemoteError> {
        let request = self
            .client
            .patch(self.endpoint(STOP_PATH)?)
            .bearer_auth(token);
        self.session_call(Operation::Stop, request, "stopped").await
    }

    async fn complete(&self, token: &str) -> Result<SessionStatus, RemoteError> {
        let request = self
            .client
            .patch(self.endpoint(COMPLETE_PATH)?)
            .bearer_auth(token);
        self.session_call(Operation::Complete, request, "completed")
            .await
    }

    async fn list_history(&self, token: &str) -> Result<Vec<HistoryEntry>, RemoteError> {
        let request = self
            .client
            .get(self.endpoint(HISTORY_PATH)?)
            .bearer_auth(token);

        let body = self
            .send(Operation::History, request, &[StatusCode::OK])
            .await?;
        Self::decode(Operation::History, &body)
    }

    async fn delete(&self, token: &str, session_id: u64) -> Result<(), RemoteError> {
        let path = format!("{SESSION_PATH_PREFIX}{session_id}");
        let request = self.client.delete(self.endpoint(&path)?).bearer_auth(token);

        self.send(Operation::Delete, request, &[StatusCode::NO_CONTENT])
            .await?;
        Ok(())
    }
}

// ============================================================================
// Tests
// ============================================================================
