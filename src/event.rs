// src/event.rs

/// ===============================
/// Cue presets
/// ===============================

/// Level applied to every cue before its preset multiplier.
pub const CUE_LEVEL: f64 = 1.4;

/// Length of a routine tick and of structured-mode accents.
pub const TICK_SECONDS: f64 = 0.18;

const MIN_GAIN: f64 = 0.0001;
const MAX_GAIN: f64 = 2.0;

/// Pitches of the five pre-roll steps. GO is the highest.
const COUNTDOWN_PITCHES: [f64; 5] = [700.0, 780.0, 860.0, 940.0, 1200.0];

/// Named sounds the trainer can make.
///
/// These are:
/// - resolved to concrete pitch/duration/volume here
/// - the only vocabulary the scheduler and countdown speak
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CuePreset {
    /// Routine beat or second.
    Tick,

    /// Last second of a phase that is not the last of its rep.
    PhaseBoundary,

    /// Last second of a rep.
    RepBoundary,

    /// Last second of the eccentric effort, louder.
    EffortPeak,

    /// Pre-roll step 0..=4, where 4 is GO.
    Countdown(u8),
}

impl CuePreset {
    pub fn frequency_hz(&self) -> f64 {
        match self {
            CuePreset::Tick => 940.0,
            CuePreset::PhaseBoundary => 1020.0,
            CuePreset::RepBoundary | CuePreset::EffortPeak => 1200.0,
            CuePreset::Countdown(step) => {
                COUNTDOWN_PITCHES[(*step as usize).min(COUNTDOWN_PITCHES.len() - 1)]
            }
        }
    }

    pub fn duration_seconds(&self) -> f64 {
        match self {
            CuePreset::Countdown(step) if *step >= 4 => 0.20,
            CuePreset::Countdown(_) => 0.14,
            _ => TICK_SECONDS,
        }
    }

    pub fn volume_multiplier(&self) -> f64 {
        match self {
            CuePreset::EffortPeak => 1.5,
            CuePreset::Countdown(step) if *step >= 4 => 1.25,
            _ => 1.0,
        }
    }
}

/// ===============================
/// Tone events
/// ===============================

/// A tone pinned to an absolute clock time.
///
/// These events:
/// - carry their own start time, independent of when they were computed
/// - are handed to the tone sink exactly once
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Tone {
    pub at_time: f64,
    pub frequency_hz: f64,
    pub duration_seconds: f64,
    pub gain: f64,
}

impl Tone {
    /// Build a tone from explicit parameters.
    pub fn new(
        at_time: f64,
        frequency_hz: f64,
        duration_seconds: f64,
        volume_multiplier: f64,
    ) -> Self {
        Self {
            at_time,
            frequency_hz,
            duration_seconds,
            gain: (CUE_LEVEL * volume_multiplier).clamp(MIN_GAIN, MAX_GAIN),
        }
    }

    pub fn from_preset(at_time: f64, preset: CuePreset) -> Self {
        Self::new(
            at_time,
            preset.frequency_hz(),
            preset.duration_seconds(),
            preset.volume_multiplier(),
        )
    }
}
