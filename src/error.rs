// src/error.rs
//
// Failures that can surface from a training session.
//
// Bad configuration input never shows up here: it is clamped or replaced
// by a default when it is read into a program.

use crate::state::{Mode, SessionState};

/// Error raised by the session controller or the look-ahead scheduler.
#[derive(Debug, Clone, PartialEq)]
pub enum TrainerError {
    /// The audio backend could not be resumed at session start.
    AudioUnavailable { reason: String },

    /// `start()` was called while a countdown or playback is in flight.
    SessionBusy { state: SessionState },

    /// The clock returned NaN or infinity.
    NonFiniteClock { value: f64 },

    /// The tone sink refused to schedule an event.
    ToneRejected { at_time: f64, reason: String },

    /// The program produced nothing to schedule.
    EmptyProgram { mode: Mode },
}

impl std::fmt::Display for TrainerError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            TrainerError::AudioUnavailable { reason } => {
                write!(f, "Audio backend unavailable: {}", reason)
            }
            TrainerError::SessionBusy { state } => {
                write!(f, "Session already running ({:?})", state)
            }
            TrainerError::NonFiniteClock { value } => {
                write!(f, "Clock returned a non-finite time: {}", value)
            }
            TrainerError::ToneRejected { at_time, reason } => {
                write!(f, "Tone at {:.3}s rejected: {}", at_time, reason)
            }
            TrainerError::EmptyProgram { mode } => {
                write!(f, "The {} program has nothing to schedule", mode)
            }
        }
    }
}

impl std::error::Error for TrainerError {}

/// Result of a session operation.
pub type TrainerResult<T> = Result<T, TrainerError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_messages() {
        let err = TrainerError::AudioUnavailable {
            reason: "suspended".into(),
        };
        assert_eq!(err.to_string(), "Audio backend unavailable: suspended");

        let err = TrainerError::ToneRejected {
            at_time: 1.5,
            reason: "graph closed".into(),
        };
        assert_eq!(err.to_string(), "Tone at 1.500s rejected: graph closed");
    }
}
