//! Self-clearing message area.
//!
//! Each message gets a sequence number. The clear task spawned for a
//! message only wipes the area if no newer message has replaced it, so a
//! new message is never cut short by an older one's timer.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

/// Default display interval for transient messages.
pub const DEFAULT_MESSAGE_TTL: Duration = Duration::from_secs(4);

#[derive(Debug)]
struct Inner {
    text: Mutex<String>,
    seq: AtomicU64,
    ttl: Duration,
}

/// Holder for the current transient message.
#[derive(Debug, Clone)]
pub struct MessageArea {
    inner: Arc<Inner>,
}

impl Default for MessageArea {
    fn default() -> Self {
        Self::new(DEFAULT_MESSAGE_TTL)
    }
}

impl MessageArea {
    /// Creates an empty area whose messages live for `ttl`.
    pub fn new(ttl: Duration) -> Self {
        Self {
            inner: Arc::new(Inner {
                text: Mutex::new(String::new()),
                seq: AtomicU64::new(0),
                ttl,
            }),
        }
    }

    /// Returns the message currently shown, empty if none.
    pub fn current(&self) -> String {
        self.inner
            .text
            .lock()
            .map(|text| text.clone())
            .unwrap_or_default()
    }

    /// Shows `text` and schedules it to be cleared.
    ///
    /// `on_clear` runs after the message has been cleared. Outside a tokio
    /// runtime the message stays until replaced.
    pub fn show<F>(&self, text: &str, on_clear: F)
    where
        F: FnOnce() + Send + 'static,
    {
        let seq = match self.inner.text.lock() {
            Ok(mut current) => {
                *current = text.to_string();
                self.inner.seq.fetch_add(1, Ordering::SeqCst) + 1
            }
            Err(_) => return,
        };

        let Ok(handle) = tokio::runtime::Handle::try_current() else {
            tracing::debug!("no runtime, message will not auto-clear");
            return;
        };

        let inner = Arc::clone(&self.inner);
        handle.spawn(async move {
            tokio::time::sleep(inner.ttl).await;
            // Checked under the text lock so a concurrent show is never wiped
            if let Ok(mut current) = inner.text.lock() {
                if inner.seq.load(Ordering::SeqCst) != seq {
                    return;
                }
                current.clear();
            }
            on_clear();
        });
    }
}
