//! Timer module for the Pomodoro client.
//!
//! This module contains the session phase timer:
//! - `phase_timer`: run lifecycle, tick loop and phase transitions
//! - `generation`: guard that silences superseded runs
//! - `clock`: time source and local time zone resolution

pub mod clock;
pub mod generation;
pub mod phase_timer;

pub use clock::{resolve_timezone, Clock, MockClock, SystemClock};
pub use generation::Generation;
pub use phase_timer::{PhaseTimer, RunOutcome, TimerEvent, IDLE_COUNTDOWN, TICK_CADENCE};
