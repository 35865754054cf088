// src/state/program.rs
//
// Declarative cadence programs.
//
// A program is what the user configured: one of five modes with its
// parameters. Raw host input goes through the constructors, which clamp
// every field to its bounds and replace non-finite values with defaults.

use std::fmt;
use std::str::FromStr;

/// Slowest cadence a program may use.
pub const MIN_BPM: f64 = 20.0;

/// Fastest cadence a program may use.
pub const MAX_BPM: f64 = 300.0;

pub const MAX_SETS: u32 = 20;
pub const MAX_REPS: u32 = 50;

/// Longest configurable effort/return/concentric/eccentric phase.
pub const MAX_MOVE_SECONDS: u32 = 15;

/// Longest configurable top or bottom hold.
pub const MAX_HOLD_SECONDS: u32 = 10;

pub const MAX_REP_REST_SECONDS: f64 = 20.0;
pub const MAX_SET_REST_SECONDS: f64 = 600.0;

pub mod defaults {
    pub const START_BPM: f64 = 40.0;
    pub const END_BPM: f64 = 50.0;
    pub const RAMP_SECONDS: f64 = 0.0;
    pub const STEADY_BPM: f64 = 60.0;
    pub const STEADY_SECONDS: f64 = 30.0;
    pub const RANDOM_MIN_BPM: f64 = 40.0;
    pub const RANDOM_MAX_BPM: f64 = 60.0;
    pub const RANDOM_SECONDS: f64 = 90.0;
    pub const SETS: u32 = 3;
    pub const REPS: u32 = 15;
    pub const EFFORT_SECONDS: u32 = 6;
    pub const RETURN_SECONDS: u32 = 3;
    pub const CONCENTRIC_SECONDS: u32 = 3;
    pub const ECCENTRIC_SECONDS: u32 = 3;
    pub const HOLD_SECONDS: u32 = 0;
    pub const REP_REST_SECONDS: f64 = 0.0;
    pub const SET_REST_SECONDS: f64 = 120.0;
}

#[inline]
fn finite_or(value: f64, default: f64) -> f64 {
    if value.is_finite() { value } else { default }
}

#[inline]
fn clamp_bpm(value: f64, default: f64) -> f64 {
    finite_or(value, default).clamp(MIN_BPM, MAX_BPM)
}

/// Round raw host input to a whole count within bounds.
#[inline]
fn whole(value: f64, default: u32, lo: u32, hi: u32) -> u32 {
    let value = finite_or(value, default as f64).round();
    value.clamp(lo as f64, hi as f64) as u32
}

/// Which of the five cadence programs is active.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Mode {
    #[default]
    Progressive,
    Steady,
    Random,
    Eccentric,
    Hsr,
}

impl Mode {
    /// Host-facing identifier.
    pub fn as_str(&self) -> &'static str {
        match self {
            Mode::Progressive => "accel",
            Mode::Steady => "steady",
            Mode::Random => "random",
            Mode::Eccentric => "ecc",
            Mode::Hsr => "hsr",
        }
    }

    /// Structured modes tick once per second through a phase sequence.
    pub fn is_structured(&self) -> bool {
        matches!(self, Mode::Eccentric | Mode::Hsr)
    }
}

impl fmt::Display for Mode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Mode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "accel" | "progressive" => Ok(Mode::Progressive),
            "steady" | "fixed" => Ok(Mode::Steady),
            "random" => Ok(Mode::Random),
            "ecc" | "eccentric" => Ok(Mode::Eccentric),
            "hsr" => Ok(Mode::Hsr),
            other => Err(format!("unknown cadence mode '{}'", other)),
        }
    }
}

/// Raw HSR parameters as entered by the user.
///
/// Passed to [`CadenceProgram::hsr`], which clamps everything.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct HsrSettings {
    pub sets: f64,
    pub reps_per_set: f64,
    pub concentric_seconds: f64,
    pub eccentric_seconds: f64,
    pub top_hold_seconds: f64,
    pub bottom_hold_seconds: f64,
    pub inter_rep_rest_seconds: f64,
    pub inter_set_rest_seconds: f64,
}

impl Default for HsrSettings {
    fn default() -> Self {
        Self {
            sets: defaults::SETS as f64,
            reps_per_set: defaults::REPS as f64,
            concentric_seconds: defaults::CONCENTRIC_SECONDS as f64,
            eccentric_seconds: defaults::ECCENTRIC_SECONDS as f64,
            top_hold_seconds: defaults::HOLD_SECONDS as f64,
            bottom_hold_seconds: defaults::HOLD_SECONDS as f64,
            inter_rep_rest_seconds: defaults::REP_REST_SECONDS,
            inter_set_rest_seconds: defaults::SET_REST_SECONDS,
        }
    }
}

/// One active cadence program per session.
#[derive(Debug, Clone, PartialEq)]
pub enum CadenceProgram {
    /// Linear ramp from `start_bpm` to `end_bpm` over `ramp_seconds`.
    /// A ramp of zero jumps straight to `end_bpm` and never ends.
    Progressive {
        start_bpm: f64,
        end_bpm: f64,
        ramp_seconds: f64,
    },

    /// Constant cadence for a fixed duration.
    Steady { bpm: f64, duration_seconds: f64 },

    /// Every beat picks a fresh cadence uniformly in `[min_bpm, max_bpm]`.
    Random {
        min_bpm: f64,
        max_bpm: f64,
        duration_seconds: f64,
    },

    /// Eccentric-only reps: effort phase, then return phase.
    Eccentric {
        sets: u32,
        reps_per_set: u32,
        effort_seconds: u32,
        return_seconds: u32,
    },

    /// Heavy slow resistance: up to four phases per rep plus rests.
    Hsr {
        sets: u32,
        reps_per_set: u32,
        concentric_seconds: u32,
        eccentric_seconds: u32,
        top_hold_seconds: u32,
        bottom_hold_seconds: u32,
        inter_rep_rest_seconds: f64,
        inter_set_rest_seconds: f64,
    },
}

impl Default for CadenceProgram {
    fn default() -> Self {
        Self::preset()
    }
}

impl CadenceProgram {
    pub fn progressive(start_bpm: f64, end_bpm: f64, ramp_seconds: f64) -> Self {
        Self::Progressive {
            start_bpm,
            end_bpm,
            ramp_seconds,
        }
        .sanitized()
    }

    /// The "40 → 50 in 120 s" preset.
    pub fn preset() -> Self {
        Self::progressive(40.0, 50.0, 120.0)
    }

    pub fn steady(bpm: f64, duration_seconds: f64) -> Self {
        Self::Steady {
            bpm,
            duration_seconds,
        }
        .sanitized()
    }

    pub fn random(min_bpm: f64, max_bpm: f64, duration_seconds: f64) -> Self {
        Self::Random {
            min_bpm,
            max_bpm,
            duration_seconds,
        }
        .sanitized()
    }

    pub fn eccentric(
        sets: f64,
        reps_per_set: f64,
        effort_seconds: f64,
        return_seconds: f64,
    ) -> Self {
        Self::Eccentric {
            sets: whole(sets, defaults::SETS, 1, MAX_SETS),
            reps_per_set: whole(reps_per_set, defaults::REPS, 1, MAX_REPS),
            effort_seconds: whole(effort_seconds, defaults::EFFORT_SECONDS, 0, MAX_MOVE_SECONDS),
            return_seconds: whole(return_seconds, defaults::RETURN_SECONDS, 0, MAX_MOVE_SECONDS),
        }
        .sanitized()
    }

    pub fn hsr(settings: HsrSettings) -> Self {
        Self::Hsr {
            sets: whole(settings.sets, defaults::SETS, 1, MAX_SETS),
            reps_per_set: whole(settings.reps_per_set, defaults::REPS, 1, MAX_REPS),
            concentric_seconds: whole(
                settings.concentric_seconds,
                defaults::CONCENTRIC_SECONDS,
                0,
                MAX_MOVE_SECONDS,
            ),
            eccentric_seconds: whole(
                settings.eccentric_seconds,
                defaults::ECCENTRIC_SECONDS,
                0,
                MAX_MOVE_SECONDS,
            ),
            top_hold_seconds: whole(
                settings.top_hold_seconds,
                defaults::HOLD_SECONDS,
                0,
                MAX_HOLD_SECONDS,
            ),
            bottom_hold_seconds: whole(
                settings.bottom_hold_seconds,
                defaults::HOLD_SECONDS,
                0,
                MAX_HOLD_SECONDS,
            ),
            inter_rep_rest_seconds: settings.inter_rep_rest_seconds,
            inter_set_rest_seconds: settings.inter_set_rest_seconds,
        }
        .sanitized()
    }

    /// Clamp every field to its bounds.
    ///
    /// Idempotent. The controller runs it again when a session starts, so
    /// a program built directly from the enum variants is still safe.
    pub fn sanitized(self) -> Self {
        match self {
            Self::Progressive {
                start_bpm,
                end_bpm,
                ramp_seconds,
            } => Self::Progressive {
                start_bpm: clamp_bpm(start_bpm, defaults::START_BPM),
                end_bpm: clamp_bpm(end_bpm, defaults::END_BPM),
                ramp_seconds: finite_or(ramp_seconds, defaults::RAMP_SECONDS).max(0.0),
            },

            Self::Steady {
                bpm,
                duration_seconds,
            } => Self::Steady {
                bpm: clamp_bpm(bpm, defaults::STEADY_BPM),
                duration_seconds: finite_or(duration_seconds, defaults::STEADY_SECONDS).max(1.0),
            },

            Self::Random {
                min_bpm,
                max_bpm,
                duration_seconds,
            } => {
                let lo = clamp_bpm(min_bpm, defaults::RANDOM_MIN_BPM);
                let hi = clamp_bpm(max_bpm, defaults::RANDOM_MAX_BPM);
                Self::Random {
                    min_bpm: lo.min(hi),
                    max_bpm: lo.max(hi),
                    duration_seconds: finite_or(duration_seconds, defaults::RANDOM_SECONDS)
                        .max(1.0),
                }
            }

            Self::Eccentric {
                sets,
                reps_per_set,
                effort_seconds,
                return_seconds,
            } => {
                let mut effort_seconds = effort_seconds.min(MAX_MOVE_SECONDS);
                let return_seconds = return_seconds.min(MAX_MOVE_SECONDS);
                if effort_seconds == 0 && return_seconds == 0 {
                    log::warn!(
                        "eccentric rep has no phases, using {}s effort",
                        defaults::EFFORT_SECONDS
                    );
                    effort_seconds = defaults::EFFORT_SECONDS;
                }
                Self::Eccentric {
                    sets: sets.clamp(1, MAX_SETS),
                    reps_per_set: reps_per_set.clamp(1, MAX_REPS),
                    effort_seconds,
                    return_seconds,
                }
            }

            Self::Hsr {
                sets,
                reps_per_set,
                concentric_seconds,
                eccentric_seconds,
                top_hold_seconds,
                bottom_hold_seconds,
                inter_rep_rest_seconds,
                inter_set_rest_seconds,
            } => {
                let mut concentric_seconds = concentric_seconds.min(MAX_MOVE_SECONDS);
                let eccentric_seconds = eccentric_seconds.min(MAX_MOVE_SECONDS);
                let top_hold_seconds = top_hold_seconds.min(MAX_HOLD_SECONDS);
                let bottom_hold_seconds = bottom_hold_seconds.min(MAX_HOLD_SECONDS);
                if concentric_seconds + eccentric_seconds + top_hold_seconds + bottom_hold_seconds
                    == 0
                {
                    log::warn!(
                        "HSR rep has no phases, using {}s concentric",
                        defaults::CONCENTRIC_SECONDS
                    );
                    concentric_seconds = defaults::CONCENTRIC_SECONDS;
                }
                Self::Hsr {
                    sets: sets.clamp(1, MAX_SETS),
                    reps_per_set: reps_per_set.clamp(1, MAX_REPS),
                    concentric_seconds,
                    eccentric_seconds,
                    top_hold_seconds,
                    bottom_hold_seconds,
                    inter_rep_rest_seconds: finite_or(
                        inter_rep_rest_seconds,
                        defaults::REP_REST_SECONDS,
                    )
                    .clamp(0.0, MAX_REP_REST_SECONDS),
                    inter_set_rest_seconds: finite_or(
                        inter_set_rest_seconds,
                        defaults::SET_REST_SECONDS,
                    )
                    .clamp(0.0, MAX_SET_REST_SECONDS),
                }
            }
        }
    }

    pub fn mode(&self) -> Mode {
        match self {
            Self::Progressive { .. } => Mode::Progressive,
            Self::Steady { .. } => Mode::Steady,
            Self::Random { .. } => Mode::Random,
            Self::Eccentric { .. } => Mode::Eccentric,
            Self::Hsr { .. } => Mode::Hsr,
        }
    }

    /// Playback length of a continuous program, measured from the anchor.
    ///
    /// `None` for the unlimited ramp and for structured programs, whose
    /// end is found by walking the phase sequence.
    pub fn duration(&self) -> Option<f64> {
        match self {
            Self::Progressive { ramp_seconds, .. } if *ramp_seconds > 0.0 => Some(*ramp_seconds),
            Self::Steady {
                duration_seconds, ..
            }
            | Self::Random {
                duration_seconds, ..
            } => Some(*duration_seconds),
            _ => None,
        }
    }

    /// Total sets and reps per set of a structured program.
    pub fn sets_and_reps(&self) -> Option<(u32, u32)> {
        match self {
            Self::Eccentric {
                sets, reps_per_set, ..
            }
            | Self::Hsr {
                sets, reps_per_set, ..
            } => Some((*sets, *reps_per_set)),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bpm_fields_are_clamped() {
        let program = CadenceProgram::progressive(5.0, 900.0, -10.0);
        assert_eq!(
            program,
            CadenceProgram::Progressive {
                start_bpm: MIN_BPM,
                end_bpm: MAX_BPM,
                ramp_seconds: 0.0,
            }
        );
        assert_eq!(program.duration(), None);
    }

    #[test]
    fn test_non_finite_input_uses_defaults() {
        let program = CadenceProgram::steady(f64::NAN, f64::INFINITY);
        assert_eq!(
            program,
            CadenceProgram::Steady {
                bpm: defaults::STEADY_BPM,
                duration_seconds: defaults::STEADY_SECONDS,
            }
        );

        let program = CadenceProgram::eccentric(f64::NAN, 2.0, 4.0, 1.0);
        assert_eq!(program.sets_and_reps(), Some((defaults::SETS, 2)));
    }

    #[test]
    fn test_steady_duration_at_least_one_second() {
        let program = CadenceProgram::steady(60.0, 0.2);
        assert_eq!(program.duration(), Some(1.0));
    }

    #[test]
    fn test_random_bounds_are_swapped() {
        let program = CadenceProgram::random(60.0, 40.0, 30.0);
        assert_eq!(
            program,
            CadenceProgram::Random {
                min_bpm: 40.0,
                max_bpm: 60.0,
                duration_seconds: 30.0,
            }
        );
    }

    #[test]
    fn test_eccentric_counts_are_clamped() {
        let program = CadenceProgram::eccentric(0.0, 99.0, 30.0, 2.4);
        assert_eq!(
            program,
            CadenceProgram::Eccentric {
                sets: 1,
                reps_per_set: MAX_REPS,
                effort_seconds: MAX_MOVE_SECONDS,
                return_seconds: 2,
            }
        );
    }

    #[test]
    fn test_empty_eccentric_rep_gets_default_effort() {
        let program = CadenceProgram::eccentric(1.0, 1.0, 0.0, 0.0);
        match program {
            CadenceProgram::Eccentric {
                effort_seconds,
                return_seconds,
                ..
            } => {
                assert_eq!(effort_seconds, defaults::EFFORT_SECONDS);
                assert_eq!(return_seconds, 0);
            }
            other => panic!("unexpected program {:?}", other),
        }
    }

    #[test]
    fn test_hsr_rests_and_holds_are_clamped() {
        let program = CadenceProgram::hsr(HsrSettings {
            top_hold_seconds: 25.0,
            inter_rep_rest_seconds: 90.0,
            inter_set_rest_seconds: -5.0,
            ..HsrSettings::default()
        });
        match program {
            CadenceProgram::Hsr {
                top_hold_seconds,
                inter_rep_rest_seconds,
                inter_set_rest_seconds,
                ..
            } => {
                assert_eq!(top_hold_seconds, MAX_HOLD_SECONDS);
                assert_eq!(inter_rep_rest_seconds, MAX_REP_REST_SECONDS);
                assert_eq!(inter_set_rest_seconds, 0.0);
            }
            other => panic!("unexpected program {:?}", other),
        }
    }

    #[test]
    fn test_sanitized_is_idempotent() {
        let program = CadenceProgram::hsr(HsrSettings::default());
        assert_eq!(program.clone().sanitized(), program);
    }

    #[test]
    fn test_mode_parsing() {
        assert_eq!("accel".parse::<Mode>(), Ok(Mode::Progressive));
        assert_eq!(" HSR ".parse::<Mode>(), Ok(Mode::Hsr));
        assert!("polka".parse::<Mode>().is_err());
        assert_eq!(Mode::Eccentric.to_string(), "ecc");
        assert!(Mode::Hsr.is_structured());
        assert!(!Mode::Random.is_structured());
    }
}
