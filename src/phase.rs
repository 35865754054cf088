// src/phase.rs
//
// Phase sequences and the set/rep cursor of structured programs.
//
// A structured program (eccentric or HSR) ticks once per second. One full
// traversal of the phase sequence is one rep. The cursor walks the
// sequence a second at a time and reports which boundary each step
// closed; the scheduler decides what to do about rests.

use crate::clock::RestWindow;
use crate::event::CuePreset;
use crate::state::{CadenceProgram, Language};

/// What the body is doing during a phase.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PhaseKind {
    /// Eccentric-mode effort (the slow lowering).
    Effort,
    /// Eccentric-mode return to the start position.
    Return,
    Concentric,
    TopHold,
    Eccentric,
    BottomHold,
}

impl PhaseKind {
    pub fn label(&self, language: Language) -> &'static str {
        match (self, language) {
            (PhaseKind::Effort | PhaseKind::Eccentric, Language::En) => "eccentric",
            (PhaseKind::Effort | PhaseKind::Eccentric, Language::Fr) => "excentrique",
            (PhaseKind::Return, Language::En) => "return",
            (PhaseKind::Return, Language::Fr) => "retour",
            (PhaseKind::Concentric, Language::En) => "concentric",
            (PhaseKind::Concentric, Language::Fr) => "concentrique",
            (PhaseKind::TopHold, Language::En) => "top hold",
            (PhaseKind::TopHold, Language::Fr) => "pause haut",
            (PhaseKind::BottomHold, Language::En) => "bottom hold",
            (PhaseKind::BottomHold, Language::Fr) => "pause bas",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Phase {
    pub kind: PhaseKind,
    pub duration_seconds: u32,
}

/// How the last second of a phase is accented.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AccentStyle {
    /// Only the end of the effort phase is accented, louder.
    EffortPeak,
    /// Every phase end is accented, the end of the rep more so.
    PhaseAndRep,
}

/// Ordered, non-empty list of the phases of one rep.
#[derive(Debug, Clone, PartialEq)]
pub struct PhaseSequence {
    phases: Vec<Phase>,
    accent: AccentStyle,
}

impl PhaseSequence {
    /// Build the sequence of a structured program, skipping zero-length
    /// phases. Returns `None` for continuous programs or an empty rep.
    pub fn from_program(program: &CadenceProgram) -> Option<Self> {
        let (candidates, accent) = match *program {
            CadenceProgram::Eccentric {
                effort_seconds,
                return_seconds,
                ..
            } => (
                vec![
                    (PhaseKind::Effort, effort_seconds),
                    (PhaseKind::Return, return_seconds),
                ],
                AccentStyle::EffortPeak,
            ),
            CadenceProgram::Hsr {
                concentric_seconds,
                eccentric_seconds,
                top_hold_seconds,
                bottom_hold_seconds,
                ..
            } => (
                vec![
                    (PhaseKind::Concentric, concentric_seconds),
                    (PhaseKind::TopHold, top_hold_seconds),
                    (PhaseKind::Eccentric, eccentric_seconds),
                    (PhaseKind::BottomHold, bottom_hold_seconds),
                ],
                AccentStyle::PhaseAndRep,
            ),
            _ => return None,
        };

        let phases: Vec<Phase> = candidates
            .into_iter()
            .filter(|(_, secs)| *secs > 0)
            .map(|(kind, duration_seconds)| Phase {
                kind,
                duration_seconds,
            })
            .collect();

        if phases.is_empty() {
            return None;
        }
        Some(Self { phases, accent })
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.phases.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Phase> {
        self.phases.iter()
    }

    pub fn accent(&self) -> AccentStyle {
        self.accent
    }
}

/// Boundary closed by one cursor step.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Boundary {
    /// Still inside the same phase.
    None,
    /// Moved to the next phase of the same rep.
    Phase,
    /// Closed a rep that was not the last of its set.
    Rep,
    /// Closed the last rep of a set that was not the last set.
    Set,
    /// Closed the last rep of the last set.
    Program,
}

/// Position inside a structured program.
///
/// Owned by the scheduler and mutated only by [`RepCursor::advance`].
#[derive(Debug, Clone)]
pub struct RepCursor {
    sequence: PhaseSequence,
    total_sets: u32,
    reps_per_set: u32,

    /// 1-based.
    pub current_set: u32,
    /// 1-based.
    pub current_rep: u32,
    pub phase_index: usize,
    pub seconds_into_phase: u32,

    /// Rest to sit out before the next tick.
    pub pending_rest: Option<RestWindow>,

    finished: bool,
}

impl RepCursor {
    pub fn new(sequence: PhaseSequence, total_sets: u32, reps_per_set: u32) -> Self {
        Self {
            sequence,
            total_sets: total_sets.max(1),
            reps_per_set: reps_per_set.max(1),
            current_set: 1,
            current_rep: 1,
            phase_index: 0,
            seconds_into_phase: 0,
            pending_rest: None,
            finished: false,
        }
    }

    pub fn from_program(program: &CadenceProgram) -> Option<Self> {
        let (sets, reps) = program.sets_and_reps()?;
        let sequence = PhaseSequence::from_program(program)?;
        Some(Self::new(sequence, sets, reps))
    }

    pub fn phase(&self) -> &Phase {
        // phase_index is kept in bounds by advance()
        &self.sequence.phases[self.phase_index.min(self.sequence.len() - 1)]
    }

    pub fn total_sets(&self) -> u32 {
        self.total_sets
    }

    pub fn reps_per_set(&self) -> u32 {
        self.reps_per_set
    }

    pub fn is_finished(&self) -> bool {
        self.finished
    }

    /// Cue for the second the cursor currently points at.
    pub fn cue(&self) -> CuePreset {
        let last_second = self.seconds_into_phase + 1 >= self.phase().duration_seconds;
        if !last_second {
            return CuePreset::Tick;
        }
        match self.sequence.accent {
            AccentStyle::EffortPeak if self.phase().kind == PhaseKind::Effort => {
                CuePreset::EffortPeak
            }
            AccentStyle::EffortPeak => CuePreset::Tick,
            AccentStyle::PhaseAndRep if self.phase_index + 1 == self.sequence.len() => {
                CuePreset::RepBoundary
            }
            AccentStyle::PhaseAndRep => CuePreset::PhaseBoundary,
        }
    }

    /// Consume one second.
    pub fn advance(&mut self) -> Boundary {
        if self.finished {
            return Boundary::Program;
        }

        self.seconds_into_phase += 1;
        if self.seconds_into_phase < self.phase().duration_seconds {
            return Boundary::None;
        }

        self.seconds_into_phase = 0;
        self.phase_index += 1;
        if self.phase_index < self.sequence.len() {
            return Boundary::Phase;
        }

        self.phase_index = 0;
        self.current_rep += 1;
        if self.current_rep <= self.reps_per_set {
            return Boundary::Rep;
        }

        self.current_rep = 1;
        self.current_set += 1;
        if self.current_set <= self.total_sets {
            return Boundary::Set;
        }

        // Stay on the last position so the readout keeps making sense.
        self.current_set = self.total_sets;
        self.current_rep = self.reps_per_set;
        self.phase_index = self.sequence.len() - 1;
        self.finished = true;
        Boundary::Program
    }

    /// `set 1/3 — rep 2/15 — eccentric`
    pub fn label(&self, language: Language) -> String {
        let phase = self.phase().kind.label(language);
        match language {
            Language::En => format!(
                "set {}/{} — rep {}/{} — {}",
                self.current_set, self.total_sets, self.current_rep, self.reps_per_set, phase
            ),
            Language::Fr => format!(
                "série {}/{} — rep {}/{} — phase {}",
                self.current_set, self.total_sets, self.current_rep, self.reps_per_set, phase
            ),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::state::HsrSettings;

    fn hsr(con: f64, top: f64, ecc: f64, bot: f64) -> CadenceProgram {
        CadenceProgram::hsr(HsrSettings {
            sets: 1.0,
            reps_per_set: 1.0,
            concentric_seconds: con,
            eccentric_seconds: ecc,
            top_hold_seconds: top,
            bottom_hold_seconds: bot,
            ..HsrSettings::default()
        })
    }

    #[test]
    fn test_zero_length_phases_are_skipped() {
        let sequence = PhaseSequence::from_program(&hsr(3.0, 0.0, 4.0, 2.0)).unwrap();
        let kinds: Vec<PhaseKind> = sequence.iter().map(|p| p.kind).collect();
        assert_eq!(
            kinds,
            vec![PhaseKind::Concentric, PhaseKind::Eccentric, PhaseKind::BottomHold]
        );
        let seconds: Vec<u32> = sequence.iter().map(|p| p.duration_seconds).collect();
        assert_eq!(seconds, vec![3, 4, 2]);
    }

    #[test]
    fn test_continuous_programs_have_no_sequence() {
        assert!(PhaseSequence::from_program(&CadenceProgram::steady(60.0, 10.0)).is_none());
        assert!(RepCursor::from_program(&CadenceProgram::preset()).is_none());
    }

    #[test]
    fn test_eccentric_cursor_walks_sets_and_reps() {
        let program = CadenceProgram::eccentric(2.0, 2.0, 2.0, 1.0);
        let mut cursor = RepCursor::from_program(&program).unwrap();

        let mut boundaries = Vec::new();
        while !cursor.is_finished() {
            boundaries.push(cursor.advance());
        }

        // 2 sets x 2 reps x 3 seconds
        assert_eq!(boundaries.len(), 12);
        assert_eq!(
            boundaries.iter().filter(|b| **b == Boundary::Rep).count(),
            2
        );
        assert_eq!(
            boundaries.iter().filter(|b| **b == Boundary::Set).count(),
            1
        );
        assert_eq!(boundaries.last(), Some(&Boundary::Program));
        assert_eq!(cursor.advance(), Boundary::Program);
    }

    #[test]
    fn test_eccentric_accent_on_last_effort_second() {
        let program = CadenceProgram::eccentric(1.0, 1.0, 3.0, 2.0);
        let mut cursor = RepCursor::from_program(&program).unwrap();

        let mut cues = Vec::new();
        while !cursor.is_finished() {
            cues.push(cursor.cue());
            cursor.advance();
        }

        assert_eq!(
            cues,
            vec![
                CuePreset::Tick,
                CuePreset::Tick,
                CuePreset::EffortPeak,
                CuePreset::Tick,
                CuePreset::Tick,
            ]
        );
    }

    #[test]
    fn test_hsr_accents() {
        let mut cursor = RepCursor::from_program(&hsr(2.0, 1.0, 2.0, 0.0)).unwrap();

        let mut cues = Vec::new();
        while !cursor.is_finished() {
            cues.push(cursor.cue());
            cursor.advance();
        }

        assert_eq!(
            cues,
            vec![
                CuePreset::Tick,
                CuePreset::PhaseBoundary,
                CuePreset::PhaseBoundary,
                CuePreset::Tick,
                CuePreset::RepBoundary,
            ]
        );
    }

    #[test]
    fn test_labels() {
        let program = CadenceProgram::eccentric(3.0, 15.0, 6.0, 3.0);
        let cursor = RepCursor::from_program(&program).unwrap();
        assert_eq!(cursor.label(Language::En), "set 1/3 — rep 1/15 — eccentric");
        assert_eq!(
            cursor.label(Language::Fr),
            "série 1/3 — rep 1/15 — phase excentrique"
        );
    }
}
