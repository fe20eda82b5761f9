//! Live duration settings.
//!
//! The user may edit the work and break durations at any time. The raw text
//! is kept as typed and only coerced to minutes when it is read: once when a
//! session starts, and again for the break length when a work phase ends.

use std::sync::{Arc, RwLock};

use thiserror::Error;

/// Default work duration in minutes.
pub const DEFAULT_WORK_MINUTES: u32 = 25;

/// Default break duration in minutes.
pub const DEFAULT_BREAK_MINUTES: u32 = 5;

/// Errors raised when a duration setting cannot be used to start a session.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ConfigurationError {
    /// A numeric duration that is not positive.
    #[error("{field} duration must be a positive number of minutes")]
    NonPositive {
        /// Which setting was rejected
        field: &'static str,
    },
}

/// Session durations resolved at start time.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SessionDurations {
    /// Work duration in minutes
    pub work_minutes: u32,
    /// Break duration in minutes
    pub break_minutes: u32,
}

impl Default for SessionDurations {
    fn default() -> Self {
        Self {
            work_minutes: DEFAULT_WORK_MINUTES,
            break_minutes: DEFAULT_BREAK_MINUTES,
        }
    }
}

#[derive(Debug, Default)]
struct RawInputs {
    work: String,
    breaks: String,
}

/// Shared handle to the user's duration inputs.
#[derive(Debug, Clone, Default)]
pub struct DurationSettings {
    inputs: Arc<RwLock<RawInputs>>,
}

impl DurationSettings {
    /// Creates settings pre-filled with the given minutes.
    pub fn new(work_minutes: u32, break_minutes: u32) -> Self {
        let settings = Self::default();
        settings.set_work(work_minutes.to_string());
        settings.set_break(break_minutes.to_string());
        settings
    }

    /// Replaces the work duration input.
    pub fn set_work(&self, input: impl Into<String>) {
        if let Ok(mut inputs) = self.inputs.write() {
            inputs.work = input.into();
        }
    }

    /// Replaces the break duration input.
    pub fn set_break(&self, input: impl Into<String>) {
        if let Ok(mut inputs) = self.inputs.write() {
            inputs.breaks = input.into();
        }
    }

    /// Returns the raw work and break inputs.
    pub fn raw(&self) -> (String, String) {
        self.inputs
            .read()
            .map(|inputs| (inputs.work.clone(), inputs.breaks.clone()))
            .unwrap_or_default()
    }

    /// Resolves both durations for a new session.
    ///
    /// Empty or non-numeric inputs fall back to the defaults; zero is
    /// rejected.
    pub fn session_durations(&self) -> Result<SessionDurations, ConfigurationError> {
        let (work, breaks) = self.raw();
        Ok(SessionDurations {
            work_minutes: coerce_minutes(&work, DEFAULT_WORK_MINUTES, "work")?,
            break_minutes: coerce_minutes(&breaks, DEFAULT_BREAK_MINUTES, "break")?,
        })
    }

    /// Reads the break length for a work-to-break transition.
    ///
    /// Anything unusable at this moment yields the default.
    pub fn live_break_minutes(&self) -> u32 {
        let (_, breaks) = self.raw();
        coerce_minutes(&breaks, DEFAULT_BREAK_MINUTES, "break").unwrap_or(DEFAULT_BREAK_MINUTES)
    }
}

/// Coerces a raw duration input into minutes.
pub fn coerce_minutes(
    input: &str,
    default: u32,
    field: &'static str,
) -> Result<u32, ConfigurationError> {
    match input.trim().parse::<i64>() {
        Ok(minutes) if minutes > 0 => Ok(u32::try_from(minutes).unwrap_or(u32::MAX)),
        Ok(_) => Err(ConfigurationError::NonPositive { field }),
        Err(_) => {
            tracing::debug!("{} duration {:?} is not a number, using {}", field, input, default);
            Ok(default)
        }
    }
}
