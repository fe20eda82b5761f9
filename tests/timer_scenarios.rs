//! End-to-end timer scenarios.
//!
//! These tests drive a full run through the public API with a recording
//! session service, a recording display and tokio's paused clock:
//! - A 25/5 session from start to automatic completion
//! - Live break length edited during the work phase
//! - Fallback durations for unusable input
//! - The interactive shell reacting to automatic completion

use std::sync::Arc;

use chrono::{DateTime, TimeZone};
use chrono_tz::Tz;
use tokio::sync::mpsc;
use tokio::time::{Duration, Instant};

use pomodoro_client::cli::Shell;
use pomodoro_client::display::RecordingDisplay;
use pomodoro_client::session::{AuthorizedSession, MockCall, MockSessionApi, Operation};
use pomodoro_client::settings::{DurationSettings, SessionDurations};
use pomodoro_client::timer::{Clock, MockClock, PhaseTimer, RunOutcome, TimerEvent};

// ============================================================================
// Test Helpers
// ============================================================================

struct Fixture {
    timer: PhaseTimer,
    api: Arc<MockSessionApi>,
    display: Arc<RecordingDisplay>,
    settings: DurationSettings,
    clock: Arc<MockClock>,
    events: mpsc::UnboundedReceiver<TimerEvent>,
}

fn t0() -> DateTime<Tz> {
    Tz::Europe__Berlin
        .with_ymd_and_hms(2024, 5, 1, 9, 0, 0)
        .unwrap()
}

fn fixture() -> Fixture {
    let api = Arc::new(MockSessionApi::new());
    let display = Arc::new(RecordingDisplay::new());
    let settings = DurationSettings::new(25, 5);
    let clock = Arc::new(MockClock::new(t0()));
    let (tx, rx) = mpsc::unbounded_channel();
    let timer = PhaseTimer::new(
        AuthorizedSession::new(api.clone(), "token"),
        display.clone(),
        settings.clone(),
        clock.clone(),
        tx,
    );
    Fixture {
        timer,
        api,
        display,
        settings,
        clock,
        events: rx,
    }
}

/// Sleeps until `secs` seconds after `origin`.
async fn until(origin: Instant, secs: f64) {
    tokio::time::sleep_until(origin + Duration::from_secs_f64(secs)).await;
}

fn drain(rx: &mut mpsc::UnboundedReceiver<TimerEvent>) -> Vec<TimerEvent> {
    let mut events = Vec::new();
    while let Ok(event) = rx.try_recv() {
        events.push(event);
    }
    events
}

// ============================================================================
// Scenarios
// ============================================================================

#[tokio::test(start_paused = true)]
async fn full_session_runs_work_then_break_then_completes() {
    let origin = Instant::now();
    let mut f = fixture();
    f.timer.start(25, f.clock.now()).unwrap();

    until(origin, 1499.5).await;
    assert_eq!(f.display.last_countdown().as_deref(), Some("00:01"));
    assert!(f.display.statuses().is_empty());
    assert_eq!(f.api.complete_count(), 0);

    until(origin, 1500.5).await;
    assert_eq!(f.display.statuses(), vec!["Status: Break started"]);
    assert_eq!(f.display.last_countdown().as_deref(), Some("05:00"));
    assert_eq!(f.api.complete_count(), 0);

    until(origin, 1799.5).await;
    assert_eq!(f.display.last_countdown().as_deref(), Some("00:01"));
    assert_eq!(f.api.complete_count(), 0);

    until(origin, 1800.5).await;
    assert_eq!(f.api.complete_count(), 1);
    assert_eq!(f.timer.wait().await, Some(RunOutcome::Completed));
    assert_eq!(f.display.last_countdown().as_deref(), Some("00:00"));
    assert_eq!(
        f.display.statuses(),
        vec![
            "Status: Break started",
            "Status: Break ended, completing session...",
            "Status: completed",
        ]
    );
    assert_eq!(f.display.messages(), vec!["Session completed"]);
    assert_eq!(
        drain(&mut f.events),
        vec![
            TimerEvent::RunStarted { phase_minutes: 25 },
            TimerEvent::BreakStarted { break_minutes: 5 },
            TimerEvent::SessionCompleted {
                status: "completed".to_string()
            },
        ]
    );

    // No further ticks after the run ended
    let count = f.display.events().len();
    until(origin, 1900.0).await;
    assert_eq!(f.display.events().len(), count);
    assert_eq!(f.api.complete_count(), 1);
}

#[tokio::test(start_paused = true)]
async fn countdown_never_increases_during_work_phase() {
    let origin = Instant::now();
    let mut f = fixture();
    f.timer.start(2, f.clock.now()).unwrap();

    until(origin, 119.5).await;
    f.timer.cancel();

    let seconds: Vec<u64> = f
        .display
        .countdowns()
        .iter()
        .map(|text| {
            let (m, s) = text.split_once(':').unwrap();
            m.parse::<u64>().unwrap() * 60 + s.parse::<u64>().unwrap()
        })
        .collect();
    assert_eq!(seconds.first(), Some(&120));
    assert!(seconds.windows(2).all(|pair| pair[1] <= pair[0]));
    assert_eq!(seconds.last(), Some(&1));
}

#[tokio::test(start_paused = true)]
async fn break_length_edited_mid_work_is_used() {
    let origin = Instant::now();
    let mut f = fixture();
    f.timer.start(1, f.clock.now()).unwrap();

    until(origin, 30.5).await;
    f.settings.set_break("3");

    until(origin, 60.5).await;
    assert_eq!(f.display.last_countdown().as_deref(), Some("03:00"));
    assert!(drain(&mut f.events).contains(&TimerEvent::BreakStarted { break_minutes: 3 }));

    until(origin, 240.5).await;
    assert_eq!(f.api.complete_count(), 1);
}

#[tokio::test(start_paused = true)]
async fn completion_failure_still_ends_run() {
    let origin = Instant::now();
    let mut f = fixture();
    f.api.set_failing(Operation::Complete, true);
    f.settings.set_break("1");
    f.timer.start(1, f.clock.now()).unwrap();

    until(origin, 120.5).await;
    assert_eq!(f.timer.wait().await, Some(RunOutcome::CompletionFailed));
    assert_eq!(f.api.complete_count(), 1);
    assert_eq!(
        f.display.messages(),
        vec!["Warning: Failed to complete session (HTTP 500): mock failure"]
    );
    assert_eq!(f.display.last_countdown().as_deref(), Some("00:00"));
}

#[test]
fn unusable_duration_input_falls_back_to_defaults() {
    let settings = DurationSettings::new(25, 5);
    settings.set_work("abc");
    settings.set_break("");

    assert_eq!(
        settings.session_durations(),
        Ok(SessionDurations {
            work_minutes: 25,
            break_minutes: 5
        })
    );
}

// ============================================================================
// Shell
// ============================================================================

#[tokio::test(start_paused = true)]
async fn shell_refreshes_history_after_automatic_completion() {
    let origin = Instant::now();
    let api = Arc::new(MockSessionApi::new());
    let display = Arc::new(RecordingDisplay::new());
    let settings = DurationSettings::new(25, 5);
    let mut shell = Shell::new(
        api.clone(),
        display.clone(),
        settings,
        Arc::new(MockClock::new(t0())),
    );

    shell.handle_line("login ada").await;
    assert!(shell.awaiting_password());
    shell.handle_line("secret").await;
    shell.handle_line("work 1").await;
    shell.handle_line("break 1").await;
    shell.handle_line("start").await;
    assert!(shell.timer_running());

    until(origin, 120.5).await;
    assert!(!shell.timer_running());

    // The shell loop forwards timer events; emulate it here.
    shell
        .handle_event(TimerEvent::SessionCompleted {
            status: "completed".to_string(),
        })
        .await;

    assert_eq!(
        api.calls(),
        vec![
            MockCall::Login {
                username: "ada".to_string()
            },
            MockCall::History,
            MockCall::Start {
                session_minutes: 1,
                break_minutes: 1
            },
            MockCall::Complete,
            MockCall::History,
        ]
    );
    assert_eq!(display.blocks().len(), 2);
}
