// src/lib.rs
//
// Library entry point for Rust and browser (wasm) consumers.

mod cadence;
mod clock;
mod controller;
mod countdown;
mod cue;
mod error;
mod event;
mod host;
mod phase;
mod readout;
mod scheduler;
mod state;

#[cfg(test)]
mod test_host;

#[cfg(feature = "web")]
pub mod wasm;

// Re-export key types for Rust consumers
pub use cadence::{ContinuousCadence, progressive_bpm};
pub use clock::{Clock, ManualClock, RestKind, RestWindow, SessionWindow, format_mmss};
pub use controller::{START_OFFSET_SECONDS, SessionController};
pub use countdown::{COUNTDOWN_STEPS, CountdownProgress, CountdownSequencer, CountdownState};
pub use cue::{CountdownCue, CueEmitter};
pub use error::{TrainerError, TrainerResult};
pub use event::{CuePreset, Tone};
pub use host::{Host, SpeechSink, ToneSink, WakeHold};
pub use phase::{AccentStyle, Boundary, Phase, PhaseKind, PhaseSequence, RepCursor};
pub use readout::{ReadoutSource, project};
pub use scheduler::{
    LookaheadScheduler, POLL_INTERVAL_MS, ProgramCursor, SCHEDULE_AHEAD_SECONDS, TickReport,
};
pub use state::*;
