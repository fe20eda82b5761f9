//! In-memory [`SessionApi`] for tests.

use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Mutex;
use std::time::Duration;

use async_trait::async_trait;

use crate::types::{HistoryEntry, SessionStatus, StartedSession};

use super::client::SessionApi;
use super::error::{Operation, RemoteError};

/// A call received by [`MockSessionApi`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MockCall {
    /// `login`
    Login {
        /// Username passed in
        username: String,
    },
    /// `start`
    Start {
        /// Requested work minutes
        session_minutes: u32,
        /// Requested break minutes
        break_minutes: u32,
    },
    /// `stop`
    Stop,
    /// `complete`
    Complete,
    /// `list_history`
    History,
    /// `delete`
    Delete {
        /// Deleted session id
        session_id: u64,
    },
}

/// Recording session service with configurable failures.
#[derive(Debug)]
pub struct MockSessionApi {
    calls: Mutex<Vec<MockCall>>,
    failing: Mutex<HashMap<Operation, u16>>,
    started_at: Mutex<Option<String>>,
    history: Mutex<Vec<HistoryEntry>>,
    complete_delay_ms: AtomicU64,
}

impl Default for MockSessionApi {
    fn default() -> Self {
        Self::new()
    }
}

impl MockSessionApi {
    /// Creates a mock where every operation succeeds.
    #[must_use]
    pub fn new() -> Self {
        Self {
            calls: Mutex::new(Vec::new()),
            failing: Mutex::new(HashMap::new()),
            started_at: Mutex::new(None),
            history: Mutex::new(Vec::new()),
            complete_delay_ms: AtomicU64::new(0),
        }
    }

    /// Makes `operation` fail with HTTP 500.
    pub fn set_failing(&self, operation: Operation, failing: bool) {
        let mut map = self.failing.lock().unwrap();
        if failing {
            map.insert(operation, 500);
        } else {
            map.remove(&operation);
        }
    }

    /// Makes `operation` fail with the given HTTP status.
    pub fn set_failing_status(&self, operation: Operation, status: u16) {
        self.failing.lock().unwrap().insert(operation, status);
    }

    /// Sets the `startedAt` value returned by `start`.
    pub fn set_started_at(&self, started_at: Option<String>) {
        *self.started_at.lock().unwrap() = started_at;
    }

    /// Sets the entries returned by `list_history`.
    pub fn set_history(&self, history: Vec<HistoryEntry>) {
        *self.history.lock().unwrap() = history;
    }

    /// Delays `complete` by the given duration.
    pub fn set_complete_delay(&self, delay: Duration) {
        self.complete_delay_ms
            .store(delay.as_millis() as u64, Ordering::SeqCst);
    }

    /// Returns all calls received so far.
    pub fn calls(&self) -> Vec<MockCall> {
        self.calls.lock().unwrap().clone()
    }

    /// Returns how many `complete` calls were received.
    pub fn complete_count(&self) -> usize {
        self.calls()
            .iter()
            .filter(|call| matches!(call, MockCall::Complete))
            .count()
    }

    fn record(&self, call: MockCall, operation: Operation) -> Result<(), RemoteError> {
        self.calls.lock().unwrap().push(call);
        if let Some(&status) = self.failing.lock().unwrap().get(&operation) {
            return Err(RemoteError::Status {
                operation,
                status,
                message: "mock failure".to_string(),
            });
        }
        Ok(())
    }
}

#[async_trait]
impl SessionApi for MockSessionApi {
    async fn login(&self, username: &str, _password: &str) -> Result<String, RemoteError> {
        self.record(
            MockCall::Login {
                username: username.to_string(),
            },
            Operation::Login,
        )?;
        Ok(format!("token-{username}"))
    }

    async fn start(
        &self,
        _token: &str,
        session_minutes: u32,
        break_minutes: u32,
    ) -> Result<StartedSession, RemoteError> {
        self.record(
            MockCall::Start {
                session_minutes,
                break_minutes,
            },
            Operation::Start,
        )?;
        Ok(StartedSession {
            status: "running".to_string(),
            started_at: self.started_at.lock().unwrap().clone(),
        })
    }

    async fn stop(&self, _token: &str) -> Result<SessionStatus, RemoteError> {
        self.record(MockCall::Stop, Operation::Stop)?;
        Ok(SessionStatus {
            status: "stopped".to_string(),
        })
    }

    async fn complete(&self, _token: &str) -> Result<SessionStatus, RemoteError> {
        let delay = self.complete_delay_ms.load(Ordering::SeqCst);
        if delay > 0 {
            tokio::time::sleep(Duration::from_millis(delay)).await;
        }
        self.record(MockCall::Complete, Operation::Complete)?;
        Ok(SessionStatus {
            status: "completed".to_string(),
        })
    }

    async fn list_history(&self, _token: &str) -> Result<Vec<HistoryEntry>, RemoteError> {
        self.record(MockCall::History, Operation::History)?;
        Ok(self.history.lock().unwrap().clone())
    }

    async fn delete(&self, _token: &str, session_id: u64) -> Result<(), RemoteError> {
        self.record(MockCall::Delete { session_id }, Operation::Delete)
    }
}
