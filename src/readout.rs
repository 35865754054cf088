// src/readout.rs
//
// Derives the display readout from session state and the clock.
//
// Runs at display-refresh cadence, independent of the audio schedule.
// Takes shared references only: projecting never mutates the cursor.

use crate::clock::RestWindow;
use crate::countdown::CountdownSequencer;
use crate::scheduler::LookaheadScheduler;
use crate::state::{Language, Readout, SessionState, SessionStatus};

/// Everything the projector reads.
pub struct ReadoutSource<'a> {
    pub state: SessionState,
    pub status: SessionStatus,
    pub language: Language,
    pub scheduler: Option<&'a LookaheadScheduler>,
    pub countdown: &'a CountdownSequencer,
    /// Pending automatic restart.
    pub restart_rest: Option<RestWindow>,
}

/// Build the readout for clock time `now`.
pub fn project(source: &ReadoutSource<'_>, now: f64) -> Readout {
    let playing = source.state == SessionState::Playing;
    let scheduler = source.scheduler.filter(|_| playing);

    let rest = source
        .restart_rest
        .filter(|r| r.is_active(now))
        .or_else(|| scheduler.and_then(|s| s.active_rest(now)));

    let session_remaining = scheduler
        .filter(|s| s.program().duration().is_some())
        .and_then(|s| s.window().remaining(now));

    let time_remaining = session_remaining.or_else(|| rest.map(|r| r.remaining(now)));

    let countdown_label = source.countdown.label();

    Readout {
        state: source.state,
        status: source.status,
        display_bpm: scheduler.and_then(|s| s.display_bpm(now)),
        phase_label: scheduler.and_then(|s| s.phase_label(source.language)),
        time_remaining,
        is_countdown_phase: countdown_label.is_some()
            || (session_remaining.is_none() && rest.is_some()),
        countdown_label,
    }
}

#[cfg(test)]
mod tests {
    use rand::SeedableRng;
    use rand::rngs::StdRng;

    use super::*;
    use crate::clock::RestKind;
    use crate::cue::CueEmitter;
    use crate::state::{CadenceProgram, HsrSettings};
    use crate::test_host::FakeHost;

    fn source<'a>(
        state: SessionState,
        scheduler: Option<&'a LookaheadScheduler>,
        countdown: &'a CountdownSequencer,
    ) -> ReadoutSource<'a> {
        ReadoutSource {
            state,
            status: SessionStatus::Playing,
            language: Language::En,
            scheduler,
            countdown,
            restart_rest: None,
        }
    }

    fn scheduler(program: CadenceProgram) -> LookaheadScheduler {
        LookaheadScheduler::new(program, 0.0, CueEmitter::default(), StdRng::seed_from_u64(5))
            .unwrap()
    }

    #[test]
    fn test_progressive_readout() {
        let sched = scheduler(CadenceProgram::progressive(40.0, 50.0, 120.0));
        let countdown = CountdownSequencer::default();

        let readout = project(&source(SessionState::Playing, Some(&sched), &countdown), 60.0);
        assert_eq!(readout.display_bpm, Some(45.0));
        assert_eq!(readout.time_text(), "1:00");
        assert!(!readout.is_countdown_phase);
        assert_eq!(readout.phase_label, None);
    }

    #[test]
    fn test_random_readout_before_first_beat() {
        let sched = scheduler(CadenceProgram::random(40.0, 60.0, 30.0));
        let countdown = CountdownSequencer::default();

        let readout = project(&source(SessionState::Playing, Some(&sched), &countdown), 0.0);
        assert_eq!(readout.bpm_text(), "—");
        assert_eq!(readout.time_text(), "0:30");
    }

    #[test]
    fn test_structured_readout_shows_rest() {
        let mut host = FakeHost::new(0.0);
        let mut sched = scheduler(CadenceProgram::hsr(HsrSettings {
            sets: 2.0,
            reps_per_set: 3.0,
            concentric_seconds: 1.0,
            eccentric_seconds: 1.0,
            inter_rep_rest_seconds: 10.0,
            ..HsrSettings::default()
        }));
        sched.poll(&mut host, 0.0).unwrap();
        sched.poll(&mut host, 1.0).unwrap();
        let countdown = CountdownSequencer::default();

        let readout = project(&source(SessionState::Playing, Some(&sched), &countdown), 4.5);
        assert_eq!(readout.display_bpm, None);
        assert_eq!(readout.phase_label.as_deref(), Some("set 1/2 — rep 2/3 — concentric"));
        assert_eq!(readout.time_text(), "0:07");
        assert!(readout.is_countdown_phase);

        // The display loop pausing for a while needs no catch-up.
        let readout = project(&source(SessionState::Playing, Some(&sched), &countdown), 11.5);
        assert_eq!(readout.time_remaining, Some(0.5));
        let readout = project(&source(SessionState::Playing, Some(&sched), &countdown), 13.0);
        assert_eq!(readout.time_text(), "—");
        assert!(!readout.is_countdown_phase);
    }

    #[test]
    fn test_restart_rest_readout() {
        let countdown = CountdownSequencer::default();
        let mut src = source(SessionState::RestingBeforeRestart, None, &countdown);
        src.restart_rest = Some(RestWindow::new(RestKind::BeforeRestart, 105.0));

        let readout = project(&src, 101.2);
        assert_eq!(readout.time_text(), "0:03");
        assert!(readout.is_countdown_phase);
        assert_eq!(readout.display_bpm, None);
    }

    #[test]
    fn test_countdown_readout() {
        let mut host = FakeHost::new(0.0);
        let mut countdown = CountdownSequencer::default();
        countdown.begin(&mut host, 0.0);

        let readout = project(&source(SessionState::CountingDown, None, &countdown), 0.5);
        assert_eq!(readout.countdown_label, Some("4"));
        assert!(readout.is_countdown_phase);
        assert_eq!(readout.time_text(), "—");
    }
}
