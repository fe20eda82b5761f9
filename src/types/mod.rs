//! Core data types for the Pomodoro client.
//!
//! This module defines the data structures used for:
//! - Session phases and the phase timer state machine
//! - Countdown formatting
//! - Request/response payloads exchanged with the session service

use chrono::{DateTime, NaiveDateTime, TimeZone};
use chrono_tz::Tz;
use serde::{Deserialize, Serialize};

// ============================================================================
// SessionPhase
// ============================================================================

/// Represents the current segment of a Pomodoro cycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SessionPhase {
    /// No run is active
    #[default]
    Idle,
    /// Currently in a work session
    Working,
    /// Currently in the break following a work session
    OnBreak,
}

// ============================================================================
// TimerState
// ============================================================================

/// Outcome of evaluating the timer state at one tick.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Transition {
    /// Phase still has time left (or the timer is idle)
    None,
    /// Work phase ran out and the break has begun
    BreakStarted {
        /// Break length as read at the moment of transition
        break_minutes: u32,
    },
    /// Break phase ran out; the session must be completed remotely
    BreakFinished,
}

/// Countdown state owned by a single timer run.
///
/// `phase` is `Idle` exactly when `phase_start` is `None`, and
/// `phase_minutes` is positive whenever the phase is active.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TimerState {
    /// Current phase
    pub phase: SessionPhase,
    /// Instant the current phase began
    pub phase_start: Option<DateTime<Tz>>,
    /// Length of the current phase in minutes
    pub phase_minutes: u32,
}

impl Default for TimerState {
    fn default() -> Self {
        Self::idle()
    }
}

impl TimerState {
    /// Creates an idle state.
    pub fn idle() -> Self {
        Self {
            phase: SessionPhase::Idle,
            phase_start: None,
            phase_minutes: 0,
        }
    }

    /// Creates a state at the beginning of a work phase.
    ///
    /// A zero length yields an idle state.
    pub fn working(phase_start: DateTime<Tz>, phase_minutes: u32) -> Self {
        if phase_minutes == 0 {
            return Self::idle();
        }
        Self {
            phase: SessionPhase::Working,
            phase_start: Some(phase_start),
            phase_minutes,
        }
    }

    /// Returns true if no phase is running.
    pub fn is_idle(&self) -> bool {
        self.phase_start.is_none() || self.phase_minutes == 0
    }

    /// Total length of the current phase in seconds.
    pub fn total_seconds(&self) -> u64 {
        u64::from(self.phase_minutes) * 60
    }

    /// Seconds left in the current phase at `now`.
    ///
    /// Elapsed time is floored to whole seconds and clamped at zero, so a
    /// phase start slightly in the future never shows more than the full
    /// phase length.
    pub fn remaining_seconds(&self, now: DateTime<Tz>) -> u64 {
        let Some(start) = self.phase_start else {
            return 0;
        };
        let elapsed = now.signed_duration_since(start).num_seconds().max(0) as u64;
        self.total_seconds().saturating_sub(elapsed)
    }

    /// Evaluates the state at `now` and performs the in-process transition.
    ///
    /// `break_minutes` is only consulted when a work phase runs out.
    pub fn advance(&mut self, now: DateTime<Tz>, break_minutes: impl FnOnce() -> u32) -> Transition {
        if self.is_idle() || self.remaining_seconds(now) > 0 {
            return Transition::None;
        }

        match self.phase {
            SessionPhase::Working => {
                let minutes = break_minutes();
                self.phase = SessionPhase::OnBreak;
                self.phase_start = Some(now);
                self.phase_minutes = minutes;
                Transition::BreakStarted {
                    break_minutes: minutes,
                }
            }
            SessionPhase::OnBreak => Transition::BreakFinished,
            SessionPhase::Idle => Transition::None,
        }
    }

    /// Resets to idle.
    pub fn reset(&mut self) {
        *self = Self::idle();
    }
}

/// Formats a number of seconds as `MM:SS`.
pub fn format_countdown(total_seconds: u64) -> String {
    let minutes = total_seconds / 60;
    let seconds = total_seconds % 60;
    format!("{:02}:{:02}", minutes, seconds)
}

// ============================================================================
// Session Service Payloads
// ============================================================================

/// Body of the login request.
#[derive(Debug, Clone, Serialize)]
pub struct LoginRequest<'a> {
    /// Account name
    pub username: &'a str,
    /// Account password
    pub password: &'a str,
}

/// Body of the login response.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct LoginResponse {
    /// Bearer credential
    #[serde(default)]
    pub token: Option<String>,
}

/// Body of the start request.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct StartRequest {
    /// Work duration in minutes
    pub session_duration: u32,
    /// Break duration in minutes
    pub break_duration: u32,
}

/// Session record returned by start, stop and complete.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct SessionResponse {
    /// Server-side session status
    #[serde(default)]
    pub status: Option<String>,
    /// Server-reported start time
    #[serde(default)]
    pub started_at: Option<String>,
}

/// Result of a successful start call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StartedSession {
    /// Server-side session status
    pub status: String,
    /// Raw server-reported start time
    pub started_at: Option<String>,
}

impl StartedSession {
    /// Returns the instant to seed the work phase with.
    ///
    /// Falls back to `now` when the server did not report a usable time.
    pub fn phase_start(&self, tz: Tz, now: DateTime<Tz>) -> DateTime<Tz> {
        self.started_at
            .as_deref()
            .and_then(|raw| parse_started_at(raw, tz))
            .unwrap_or(now)
    }
}

/// Parses a server timestamp into the given zone.
///
/// RFC 3339 values keep their offset; offset-less values are read as local
/// wall-clock time in `tz`.
pub fn parse_started_at(raw: &str, tz: Tz) -> Option<DateTime<Tz>> {
    let raw = raw.trim();
    if raw.is_empty() {
        return None;
    }
    if let Ok(parsed) = DateTime::parse_from_rfc3339(raw) {
        return Some(parsed.with_timezone(&tz));
    }
    let naive = NaiveDateTime::parse_from_str(raw, "%Y-%m-%dT%H:%M:%S%.f")
        .or_else(|_| NaiveDateTime::parse_from_str(raw, "%Y-%m-%d %H:%M:%S%.f"))
        .ok()?;
    tz.from_local_datetime(&naive).earliest()
}

/// Final status of a stop or complete call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionStatus {
    /// Server-side session status
    pub status: String,
}

/// One row of the session history.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct HistoryEntry {
    /// Session identifier
    #[serde(default)]
    pub id: Option<i64>,
    /// Start time as reported by the server
    #[serde(default)]
    pub started_at: Option<String>,
    /// Work duration in minutes
    #[serde(default)]
    pub session_duration: Option<u32>,
    /// Break duration in minutes
    #[serde(default)]
    pub break_duration: Option<u32>,
    /// Session status
    #[serde(default)]
    pub status: Option<String>,
}

impl HistoryEntry {
    /// Returns the table cells for this entry, `-` for missing fields.
    pub fn cells(&self) -> [String; 5] {
        fn or_dash<T: ToString>(value: Option<T>) -> String {
            value.map_or_else(|| "-".to_string(), |v| v.to_string())
        }
        [
            or_dash(self.id),
            or_dash(self.started_at.as_deref()),
            or_dash(self.session_duration),
            or_dash(self.break_duration),
            or_dash(self.status.as_deref()),
        ]
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    fn t0() -> DateTime<Tz> {
        Tz::UTC.with_ymd_and_hms(2024, 5, 1, 9, 0, 0).unwrap()
    }

    // ------------------------------------------------------------------------
    // SessionPhase Tests
    // ------------------------------------------------------------------------

    mod session_phase_tests {
        use super::*;

        #[test]
        fn test_default_is_idle() {
            assert_eq!(SessionPhase::default(), SessionPhase::Idle);
        }
    }

    // ------------------------------------------------------------------------
    // TimerState Tests
    // ------------------------------------------------------------------------

    mod timer_state_tests {
        use super::*;

        #[test]
        fn test_idle_has_no_start() {
            let state = TimerState::idle();
            assert_eq!(state.phase, SessionPhase::Idle);
            assert!(state.phase_start.is_none());
            assert!(state.is_idle());
            assert_eq!(state.remaining_seconds(t0()), 0);
        }

        #[test]
        fn test_working_with_zero_minutes_is_idle() {
            let state = TimerState::working(t0(), 0);
            assert_eq!(state, TimerState::idle());
        }

        #[test]
        fn test_remaining_equals_full_length_at_start() {
            for minutes in [1, 5, 25, 90] {
                let state = TimerState::working(t0(), minutes);
                assert_eq!(state.remaining_seconds(t0()), u64::from(minutes) * 60);
            }
        }

        #[test]
        fn test_remaining_floors_partial_seconds() {
            let state = TimerState::working(t0(), 1);
            let now = t0() + Duration::milliseconds(1999);
            assert_eq!(state.remaining_seconds(now), 59);
        }

        #[test]
        fn test_remaining_is_monotonic_and_never_negative() {
            let state = TimerState::working(t0(), 2);
            let mut previous = state.remaining_seconds(t0());
            for secs in (0..400).step_by(7) {
                let remaining = state.remaining_seconds(t0() + Duration::seconds(secs));
                assert!(remaining <= previous);
                previous = remaining;
            }
            assert_eq!(state.remaining_seconds(t0() + Duration::hours(3)), 0);
        }

        #[test]
        fn test_start_in_future_is_capped_at_full_length() {
            let state = TimerState::working(t0() + Duration::seconds(30), 1);
            assert_eq!(state.remaining_seconds(t0()), 60);
        }

        #[test]
        fn test_advance_before_zero_is_noop() {
            let mut state = TimerState::working(t0(), 25);
            let transition = state.advance(t0() + Duration::seconds(1499), || {
                panic!("break setting must not be read early")
            });
            assert_eq!(transition, Transition::None);
            assert_eq!(state.phase, SessionPhase::Working);
        }

        #[test]
        fn test_advance_work_to_break_reads_break_minutes() {
            let mut state = TimerState::working(t0(), 25);
            let now = t0() + Duration::seconds(1500);

            let transition = state.advance(now, || 7);

            assert_eq!(transition, Transition::BreakStarted { break_minutes: 7 });
            assert_eq!(state.phase, SessionPhase::OnBreak);
            assert_eq!(state.phase_start, Some(now));
            assert_eq!(state.phase_minutes, 7);
            assert_eq!(state.remaining_seconds(now), 7 * 60);
        }

        #[test]
        fn test_advance_break_finished() {
            let mut state = TimerState::working(t0(), 1);
            state.advance(t0() + Duration::seconds(60), || 1);

            let transition = state.advance(t0() + Duration::seconds(120), || 99);
            assert_eq!(transition, Transition::BreakFinished);
        }

        #[test]
        fn test_advance_idle_is_noop() {
            let mut state = TimerState::idle();
            assert_eq!(state.advance(t0(), || 5), Transition::None);
        }

        #[test]
        fn test_reset() {
            let mut state = TimerState::working(t0(), 25);
            state.reset();
            assert!(state.is_idle());
            assert_eq!(state.phase, SessionPhase::Idle);
        }
    }

    // ------------------------------------------------------------------------
    // Countdown Formatting Tests
    // ------------------------------------------------------------------------

    mod format_countdown_tests {
        use super::*;

        #[test]
        fn test_zero() {
            assert_eq!(format_countdown(0), "00:00");
        }

        #[test]
        fn test_seconds_only() {
            assert_eq!(format_countdown(1), "00:01");
            assert_eq!(format_countdown(59), "00:59");
        }

        #[test]
        fn test_full_session() {
            assert_eq!(format_countdown(25 * 60), "25:00");
            assert_eq!(format_countdown(5 * 60), "05:00");
        }

        #[test]
        fn test_over_99_minutes() {
            assert_eq!(format_countdown(120 * 60 + 59), "120:59");
        }
    }

    // ------------------------------------------------------------------------
    // Payload Tests
    // ------------------------------------------------------------------------

    mod payload_tests {
        use super::*;

        #[test]
        fn test_start_request_uses_camel_case() {
            let body = StartRequest {
                session_duration: 25,
                break_duration: 5,
            };
            let json = serde_json::to_string(&body).unwrap();
            assert_eq!(json, r#"{"sessionDuration":25,"breakDuration":5}"#);
        }

        #[test]
        fn test_session_response_missing_fields() {
            let parsed: SessionResponse = serde_json::from_str("{}").unwrap();
            assert!(parsed.status.is_none());
            assert!(parsed.started_at.is_none());
        }

        #[test]
        fn test_history_entry_cells() {
            let entry: HistoryEntry = serde_json::from_str(
                r#"{"id":3,"startedAt":"2024-05-01T09:00:00Z","sessionDuration":25,"status":"COMPLETED"}"#,
            )
            .unwrap();
            assert_eq!(
                entry.cells(),
                [
                    "3".to_string(),
                    "2024-05-01T09:00:00Z".to_string(),
                    "25".to_string(),
                    "-".to_string(),
                    "COMPLETED".to_string(),
                ]
            );
        }

        #[test]
        fn test_parse_started_at_rfc3339_with_z() {
            let tokyo: Tz = "Asia/Tokyo".parse().unwrap();
            let parsed = parse_started_at("2024-05-01T09:00:00Z", tokyo).unwrap();
            assert_eq!(parsed, t0());
            assert_eq!(parsed.timezone(), tokyo);
        }

        #[test]
        fn test_parse_started_at_naive_is_local() {
            let tokyo: Tz = "Asia/Tokyo".parse().unwrap();
            let parsed = parse_started_at("2024-05-01T18:00:00.123", tokyo).unwrap();
            assert_eq!(parsed.with_timezone(&Tz::UTC).format("%H:%M:%S").to_string(), "09:00:00");
        }

        #[test]
        fn test_parse_started_at_garbage() {
            assert!(parse_started_at("", Tz::UTC).is_none());
            assert!(parse_started_at("yesterday", Tz::UTC).is_none());
        }

        #[test]
        fn test_phase_start_falls_back_to_now() {
            let session = StartedSession {
                status: "running".to_string(),
                started_at: None,
            };
            assert_eq!(session.phase_start(Tz::UTC, t0()), t0());

            let session = StartedSession {
                status: "running".to_string(),
                started_at: Some("not a time".to_string()),
            };
            assert_eq!(session.phase_start(Tz::UTC, t0()), t0());
        }
    }
}
