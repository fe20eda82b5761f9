//! Time source for the phase timer.
//!
//! The zone is resolved once at startup and every `now()` of a run is taken
//! in it. [`MockClock`] follows tokio's clock, so tests running with paused
//! time see wall-clock time advance in step with the tick interval.

use chrono::{DateTime, Utc};
use chrono_tz::Tz;

/// Source of the current time.
pub trait Clock: Send + Sync {
    /// Returns the current time in the clock's zone.
    fn now(&self) -> DateTime<Tz>;

    /// Returns the clock's zone.
    fn timezone(&self) -> Tz;
}

/// Resolves the local time zone.
///
/// Order: explicit override, then the system zone, then UTC.
pub fn resolve_timezone(override_tz: Option<Tz>) -> Tz {
    if let Some(tz) = override_tz {
        return tz;
    }
    match iana_time_zone::get_timezone() {
        Ok(name) => name.parse::<Tz>().unwrap_or_else(|_| {
            tracing::warn!("unknown system time zone '{}', using UTC", name);
            Tz::UTC
        }),
        Err(e) => {
            tracing::warn!("could not determine local time zone ({}), using UTC", e);
            Tz::UTC
        }
    }
}

/// Wall clock in a fixed zone.
#[derive(Debug, Clone, Copy)]
pub struct SystemClock {
    tz: Tz,
}

impl SystemClock {
    /// Creates a clock in `tz`.
    pub fn new(tz: Tz) -> Self {
        Self { tz }
    }

    /// Creates a clock in the resolved local zone.
    pub fn local(override_tz: Option<Tz>) -> Self {
        Self::new(resolve_timezone(override_tz))
    }
}

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Tz> {
        Utc::now().with_timezone(&self.tz)
    }

    fn timezone(&self) -> Tz {
        self.tz
    }
}

/// Clock that starts at a fixed instant and advances with tokio time.
#[derive(Debug, Clone)]
pub struct MockClock {
    origin: DateTime<Tz>,
    anchor: tokio::time::Instant,
}

impl MockClock {
    /// Creates a clock reading `origin` right now.
    pub fn new(origin: DateTime<Tz>) -> Self {
        Self {
            origin,
            anchor: tokio::time::Instant::now(),
        }
    }
}

impl Clock for MockClock {
    fn now(&self) -> DateTime<Tz> {
        let elapsed = chrono::Duration::from_std(self.anchor.elapsed())
            .unwrap_or_else(|_| chrono::Duration::zero());
        self.origin + elapsed
    }

    fn timezone(&self) -> Tz {
        self.origin.timezone()
    }
}
