//! Phase timer for a Pomodoro session.
//!
//! This module provides the countdown that runs after a session has been
//! started on the server:
//! - One tick per second with `tokio::time::interval`
//! - Working → OnBreak transition in process, reading the break setting live
//! - Remote completion once the break runs out
//! - Cancellation via `CancellationToken` plus a generation guard so a
//!   superseded run can never touch the display or call the service

use std::sync::Arc;

use chrono::DateTime;
use chrono_tz::Tz;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio::time::{interval, Duration, MissedTickBehavior};
use tokio_util::sync::CancellationToken;

use crate::display::DisplaySink;
use crate::session::AuthorizedSession;
use crate::settings::{ConfigurationError, DurationSettings};
use crate::types::{format_countdown, TimerState, Transition};

use super::clock::Clock;
use super::generation::Generation;

/// Tick cadence.
pub const TICK_CADENCE: Duration = Duration::from_secs(1);

/// Countdown text shown while idle.
pub const IDLE_COUNTDOWN: &str = "00:00";

// ============================================================================
// TimerEvent
// ============================================================================

/// Notifications emitted by a run for the application shell.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TimerEvent {
    /// A run began counting down the work phase
    RunStarted {
        /// Work phase length in minutes
        phase_minutes: u32,
    },
    /// The work phase ended and the break began
    BreakStarted {
        /// Break length in minutes, as read at the transition
        break_minutes: u32,
    },
    /// The break ended and the session was completed on the server
    SessionCompleted {
        /// Status reported by the server
        status: String,
    },
    /// The break ended but the completion call failed
    CompletionFailed {
        /// Error description
        message: String,
    },
}

/// How a run ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunOutcome {
    /// Cancelled or superseded before finishing
    Cancelled,
    /// Break ran out and the session was completed
    Completed,
    /// Break ran out and the completion call failed
    CompletionFailed,
}

// ============================================================================
// PhaseTimer
// ============================================================================

struct ActiveRun {
    generation: u64,
    token: CancellationToken,
    handle: JoinHandle<RunOutcome>,
}

/// Owner of the single active timer run.
pub struct PhaseTimer {
    session: AuthorizedSession,
    display: Arc<dyn DisplaySink>,
    settings: DurationSettings,
    clock: Arc<dyn Clock>,
    event_tx: mpsc::UnboundedSender<TimerEvent>,
    generation: Generation,
    active: Option<ActiveRun>,
}

impl PhaseTimer {
    /// Creates an idle timer.
    pub fn new(
        session: AuthorizedSession,
        display: Arc<dyn DisplaySink>,
        settings: DurationSettings,
        clock: Arc<dyn Clock>,
        event_tx: mpsc::UnboundedSender<TimerEvent>,
    ) -> Self {
        Self {
            session,
            display,
            settings,
            clock,
            event_tx,
            generation: Generation::new(),
            active: None,
        }
    }

    /// Starts a new run with a work phase of `phase_minutes` beginning at
    /// `phase_start`.
    ///
    /// Any previous run is cancelled before the new one is spawned.
    ///
    /// # Errors
    ///
    /// Returns an error if `phase_minutes` is zero; no run is started.
    pub fn start(
        &mut self,
        phase_minutes: u32,
        phase_start: DateTime<Tz>,
    ) -> Result<u64, ConfigurationError> {
        if phase_minutes == 0 {
            return Err(ConfigurationError::NonPositive { field: "work" });
        }

        self.cancel();
        let generation = self.generation.advance();
        let token = CancellationToken::new();

        let run = Run {
            generation,
            guard: self.generation.clone(),
            token: token.clone(),
            session: self.session.clone(),
            display: Arc::clone(&self.display),
            settings: self.settings.clone(),
            clock: Arc::clone(&self.clock),
            event_tx: self.event_tx.clone(),
            state: TimerState::working(phase_start, phase_minutes),
        };

        tracing::info!(
            "timer run {} started: {} min from {}",
            generation,
            phase_minutes,
            phase_start.to_rfc3339()
        );
        let _ = self.event_tx.send(TimerEvent::RunStarted { phase_minutes });

        let handle = tokio::spawn(run.run());
        self.active = Some(ActiveRun {
            generation,
            token,
            handle,
        });

        Ok(generation)
    }

    /// Cancels the active run, if any.
    ///
    /// When this returns, the cancelled run can no longer update the
    /// display or emit events. A completion call already in flight is left
    /// to finish but its result is discarded.
    pub fn cancel(&mut self) -> bool {
        self.generation.advance();
        match self.active.take() {
            Some(run) => {
                run.token.cancel();
                let was_running = !run.handle.is_finished();
                if was_running {
                    tracing::info!("timer run {} cancelled", run.generation);
                }
                was_running
            }
            None => false,
        }
    }

    /// Returns true while a run is counting down or completing.
    pub fn is_running(&self) -> bool {
        self.active
            .as_ref()
            .is_some_and(|run| !run.handle.is_finished())
    }

    /// Returns the generation of the active run, if any.
    pub fn active_generation(&self) -> Option<u64> {
        self.active.as_ref().map(|run| run.generation)
    }

    /// Waits for the active run to end on its own.
    pub async fn wait(&mut self) -> Option<RunOutcome> {
        let run = self.active.take()?;
        match run.handle.await {
            Ok(outcome) => Some(outcome),
            Err(e) => {
                tracing::warn!("timer run {} ended abnormally: {}", run.generation, e);
                Some(RunOutcome::Cancelled)
            }
        }
    }
}

impl Drop for PhaseTimer {
    fn drop(&mut self) {
        self.cancel();
    }
}

// ============================================================================
// Run
// ============================================================================

enum Step {
    Continue,
    Superseded,
    BreakOver,
}

/// State and capabilities owned by one spawned run.
struct Run {
    generation: u64,
    guard: Generation,
    token: CancellationToken,
    session: AuthorizedSession,
    display: Arc<dyn DisplaySink>,
    settings: DurationSettings,
    clock: Arc<dyn Clock>,
    event_tx: mpsc::UnboundedSender<TimerEvent>,
    state: TimerState,
}

impl Run {
    async fn run(mut self) -> RunOutcome {
        let mut ticker = interval(TICK_CADENCE);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);

        loop {
            tokio::select! {
                biased;
                _ = self.token.cancelled() => {
                    tracing::debug!("timer run {} stopping at tick boundary", self.generation);
                    return RunOutcome::Cancelled;
                }
                _ = ticker.tick() => {}
            }

            match self.tick() {
                Step::Continue => {}
                Step::Superseded => return RunOutcome::Cancelled,
                Step::BreakOver => return self.finish().await,
            }
        }
    }

    /// Performs `effect` against the display if this run is still current.
    fn publish(
        &self,
        effect: impl FnOnce(&dyn DisplaySink, &mpsc::UnboundedSender<TimerEvent>),
    ) -> bool {
        self.guard
            .run_if_current(self.generation, || {
                effect(self.display.as_ref(), &self.event_tx)
            })
            .is_some()
    }

    fn tick(&mut self) -> Step {
        if self.state.is_idle() {
            return if self.publish(|display, _| display.set_countdown(IDLE_COUNTDOWN)) {
                Step::Continue
            } else {
                Step::Superseded
            };
        }

        let now = self.clock.now();
        let remaining = self.state.remaining_seconds(now);
        if !self.publish(|display, _| display.set_countdown(&format_countdown(remaining))) {
            return Step::Superseded;
        }

        let settings = self.settings.clone();
        match self.state.advance(now, || settings.live_break_minutes()) {
            Transition::None => Step::Continue,
            Transition::BreakStarted { break_minutes } => {
                tracing::info!(
                    "timer run {}: work phase over, {} min break",
                    self.generation,
                    break_minutes
                );
                let remaining = self.state.remaining_seconds(now);
                let published = self.publish(|display, events| {
                    display.set_status("Status: Break started");
                    display.set_countdown(&format_countdown(remaining));
                    let _ = events.send(TimerEvent::BreakStarted { break_minutes });
                });
                if published {
                    Step::Continue
                } else {
                    Step::Superseded
                }
            }
            Transition::BreakFinished => Step::BreakOver,
        }
    }

    async fn finish(mut self) -> RunOutcome {
        let announced = self.publish(|display, _| {
            display.set_status("Status: Break ended, completing session...");
        });
        if !announced || self.token.is_cancelled() {
            return RunOutcome::Cancelled;
        }

        tracing::info!("timer run {}: break over, completing session", self.generation);
        let result = self.session.complete().await;
        self.state.reset();

        match result {
            Ok(session) => {
                self.publish(|display, events| {
                    display.set_status(&format!("Status: {}", session.status));
                    display.set_countdown(IDLE_COUNTDOWN);
                    display.show_message("Session completed");
                    let _ = events.send(TimerEvent::SessionCompleted {
                        status: session.status.clone(),
                    });
                });
                RunOutcome::Completed
            }
            Err(e) => {
                tracing::warn!("timer run {}: completion failed: {}", self.generation, e);
                let message = e.to_string();
                self.publish(|display, events| {
                    display.set_status("Status: Break ended");
                    display.set_countdown(IDLE_COUNTDOWN);
                    display.show_message(&format!("Warning: {message}"));
                    let _ = events.send(TimerEvent::CompletionFailed {
                        message: message.clone(),
                    });
                });
                RunOutcome::CompletionFailed
            }
        }
    }
}

// ============================================================================
// Tests
// ============================================================================
