// src/cadence.rs
//
// Cadence functions of the continuous programs (progressive, steady,
// random).

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use crate::state::{CadenceProgram, MAX_BPM, MIN_BPM};

/// Instantaneous cadence of a linear ramp.
///
/// Pure function of elapsed time: recomputing at any `t` always gives the
/// same answer, whatever was computed before.
pub fn progressive_bpm(start_bpm: f64, end_bpm: f64, ramp_seconds: f64, elapsed: f64) -> f64 {
    if ramp_seconds <= 0.0 {
        return end_bpm;
    }
    let progress = (elapsed / ramp_seconds).clamp(0.0, 1.0);
    start_bpm + (end_bpm - start_bpm) * progress
}

#[derive(Debug, Clone, Copy, PartialEq)]
enum Curve {
    Ramp {
        start_bpm: f64,
        end_bpm: f64,
        ramp_seconds: f64,
    },
    Constant {
        bpm: f64,
    },
    Uniform {
        min_bpm: f64,
        max_bpm: f64,
    },
}

/// Beat-by-beat cadence of a continuous program.
#[derive(Debug, Clone)]
pub struct ContinuousCadence {
    curve: Curve,
    rng: StdRng,

    /// Cadence sampled for the most recent random beat.
    last_bpm: Option<f64>,
}

impl ContinuousCadence {
    /// Returns `None` for structured programs.
    pub fn new(program: &CadenceProgram, rng: StdRng) -> Option<Self> {
        let curve = match *program {
            CadenceProgram::Progressive {
                start_bpm,
                end_bpm,
                ramp_seconds,
            } => Curve::Ramp {
                start_bpm,
                end_bpm,
                ramp_seconds,
            },
            CadenceProgram::Steady { bpm, .. } => Curve::Constant { bpm },
            CadenceProgram::Random {
                min_bpm, max_bpm, ..
            } => Curve::Uniform {
                min_bpm: min_bpm.min(max_bpm),
                max_bpm: min_bpm.max(max_bpm),
            },
            CadenceProgram::Eccentric { .. } | CadenceProgram::Hsr { .. } => return None,
        };

        Some(Self {
            curve,
            rng,
            last_bpm: None,
        })
    }

    /// Same as [`ContinuousCadence::new`] with a fixed seed.
    pub fn seeded(program: &CadenceProgram, seed: u64) -> Option<Self> {
        Self::new(program, StdRng::seed_from_u64(seed))
    }

    /// Cadence to display at `elapsed` seconds, without sampling.
    ///
    /// For random programs this is the last sampled beat, or `None`
    /// before the first beat.
    pub fn bpm_at(&self, elapsed: f64) -> Option<f64> {
        match self.curve {
            Curve::Ramp {
                start_bpm,
                end_bpm,
                ramp_seconds,
            } => Some(progressive_bpm(start_bpm, end_bpm, ramp_seconds, elapsed)),
            Curve::Constant { bpm } => Some(bpm),
            Curve::Uniform { .. } => self.last_bpm,
        }
    }

    /// Cadence for the beat at `elapsed`. Random programs draw a fresh
    /// value here and remember it.
    pub fn sample_beat(&mut self, elapsed: f64) -> f64 {
        let bpm = match self.curve {
            Curve::Uniform { min_bpm, max_bpm } => {
                let bpm = self.rng.gen_range(min_bpm..=max_bpm);
                self.last_bpm = Some(bpm);
                bpm
            }
            _ => self.bpm_at(elapsed).unwrap_or(MIN_BPM),
        };
        bpm.clamp(MIN_BPM, MAX_BPM)
    }

    /// Seconds from the beat at `elapsed` to the next one.
    pub fn interval_after_beat(&mut self, elapsed: f64) -> f64 {
        60.0 / self.sample_beat(elapsed)
    }
}
