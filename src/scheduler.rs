// src/scheduler.rs

use rand::rngs::StdRng;

use crate::cadence::ContinuousCadence;
use crate::clock::{RestKind, RestWindow, SessionWindow};
use crate::cue::CueEmitter;
use crate::error::{TrainerError, TrainerResult};
use crate::event::{CuePreset, Tone};
use crate::host::ToneSink;
use crate::phase::{Boundary, RepCursor};
use crate::state::{CadenceProgram, Language};

/// How far ahead of the clock events are scheduled.
pub const SCHEDULE_AHEAD_SECONDS: f64 = 0.15;

/// How often the host should call [`LookaheadScheduler::poll`].
pub const POLL_INTERVAL_MS: u32 = 25;

/// Structured programs tick once per second.
const STRUCTURED_TICK_SECONDS: f64 = 1.0;

/// Float slack when comparing a beat against the session end.
const END_TOLERANCE_SECONDS: f64 = 1e-9;

/// Mutable position inside the running program.
#[derive(Debug, Clone)]
pub enum ProgramCursor {
    /// Beat-by-beat cadence, anchored at the session window.
    Continuous(ContinuousCadence),
    /// Set/rep/phase position.
    Structured(RepCursor),
}

/// What one poll did.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TickReport {
    /// Tones handed to the sink, in increasing time order.
    pub tones: Vec<Tone>,

    /// Rests opened during this poll.
    pub rests: Vec<RestWindow>,

    /// The clock reached the end of the session window.
    pub finished: bool,
}

/// Converts a cadence program into tones on a moving horizon.
///
/// Every event is scheduled at an absolute clock time, so a late poll
/// simply drains a longer backlog without shifting audio timing.
///
/// Owns the program cursor exclusively. Readers (the readout projector)
/// only get shared references.
pub struct LookaheadScheduler {
    program: CadenceProgram,

    window: SessionWindow,

    cursor: ProgramCursor,

    /// Time of the next event. `None` once nothing is left to schedule.
    next_event_time: Option<f64>,

    emitter: CueEmitter,

    inter_rep_rest: f64,
    inter_set_rest: f64,
}

impl LookaheadScheduler {
    /// Anchor `program` at `anchor_time`. The first event sounds at the
    /// anchor.
    pub fn new(
        program: CadenceProgram,
        anchor_time: f64,
        emitter: CueEmitter,
        rng: StdRng,
    ) -> TrainerResult<Self> {
        let program = program.sanitized();

        let (inter_rep_rest, inter_set_rest) = match program {
            CadenceProgram::Hsr {
                inter_rep_rest_seconds,
                inter_set_rest_seconds,
                ..
            } => (inter_rep_rest_seconds, inter_set_rest_seconds),
            _ => (0.0, 0.0),
        };

        let end_time = program.duration().map(|d| anchor_time + d);

        let cursor = match RepCursor::from_program(&program) {
            Some(cursor) => ProgramCursor::Structured(cursor),
            None => match ContinuousCadence::new(&program, rng) {
                Some(cadence) => ProgramCursor::Continuous(cadence),
                None => return Err(TrainerError::EmptyProgram { mode: program.mode() }),
            },
        };

        log::info!(
            "scheduling {} program from {:.3}s{}",
            program.mode(),
            anchor_time,
            end_time
                .map(|end| format!(" to {:.3}s", end))
                .unwrap_or_default()
        );

        Ok(Self {
            program,
            window: SessionWindow::new(anchor_time, end_time),
            cursor,
            next_event_time: Some(anchor_time),
            emitter,
            inter_rep_rest,
            inter_set_rest,
        })
    }

    /// Run one polling tick against the clock value `now`.
    ///
    /// On error nothing has been advanced past the failing event; the
    /// next poll retries it.
    pub fn poll<S: ToneSink + ?Sized>(
        &mut self,
        sink: &mut S,
        now: f64,
    ) -> TrainerResult<TickReport> {
        if !now.is_finite() {
            return Err(TrainerError::NonFiniteClock { value: now });
        }

        let mut report = TickReport::default();

        if self.window.is_over(now) {
            report.finished = true;
            return Ok(report);
        }

        let horizon_end = now + SCHEDULE_AHEAD_SECONDS;

        while let Some(at) = self.next_event_time {
            if at >= horizon_end {
                break;
            }

            // Skip over an open rest without emitting anything.
            if let ProgramCursor::Structured(cursor) = &self.cursor {
                if let Some(rest) = cursor.pending_rest {
                    if rest.until_time > at {
                        self.next_event_time = Some(rest.until_time);
                        continue;
                    }
                }
            }

            match &mut self.cursor {
                ProgramCursor::Continuous(cadence) => {
                    let tone = self.emitter.emit(sink, at, CuePreset::Tick)?;
                    report.tones.push(tone);

                    let interval = cadence.interval_after_beat(self.window.elapsed(at));
                    let next = at + interval;
                    self.next_event_time = match self.window.end_time {
                        Some(end) if next > end + END_TOLERANCE_SECONDS => None,
                        _ => Some(next),
                    };
                }

                ProgramCursor::Structured(cursor) => {
                    let tone = self.emitter.emit(sink, at, cursor.cue())?;
                    report.tones.push(tone);

                    let next = at + STRUCTURED_TICK_SECONDS;
                    self.next_event_time = Some(next);

                    let rest = match cursor.advance() {
                        Boundary::None | Boundary::Phase => None,
                        Boundary::Rep if self.inter_rep_rest > 0.0 => Some(RestWindow::new(
                            RestKind::BetweenReps,
                            next + self.inter_rep_rest,
                        )),
                        Boundary::Set if self.inter_set_rest > 0.0 => Some(RestWindow::new(
                            RestKind::BetweenSets,
                            next + self.inter_set_rest,
                        )),
                        Boundary::Rep | Boundary::Set => None,
                        Boundary::Program => {
                            // Finish once the final tick has had its second.
                            self.window.end_time = Some(next);
                            self.next_event_time = None;
                            log::info!("last tick scheduled at {:.3}s", at);
                            None
                        }
                    };

                    if let Some(rest) = rest {
                        log::debug!("{:?} rest until {:.3}s", rest.kind, rest.until_time);
                        cursor.pending_rest = Some(rest);
                        report.rests.push(rest);
                    }
                }
            }
        }

        Ok(report)
    }

    pub fn program(&self) -> &CadenceProgram {
        &self.program
    }

    pub fn window(&self) -> &SessionWindow {
        &self.window
    }

    pub fn next_event_time(&self) -> Option<f64> {
        self.next_event_time
    }

    /// Cadence to display at `now`. `None` for structured programs.
    pub fn display_bpm(&self, now: f64) -> Option<f64> {
        match &self.cursor {
            ProgramCursor::Continuous(cadence) => cadence.bpm_at(self.window.elapsed(now)),
            ProgramCursor::Structured(_) => None,
        }
    }

    /// Set/rep/phase text for structured programs.
    pub fn phase_label(&self, language: Language) -> Option<String> {
        match &self.cursor {
            ProgramCursor::Structured(cursor) => Some(cursor.label(language)),
            ProgramCursor::Continuous(_) => None,
        }
    }

    /// The rest in effect at `now`, if any.
    pub fn active_rest(&self, now: f64) -> Option<RestWindow> {
        match &self.cursor {
            ProgramCursor::Structured(cursor) => cursor.pending_rest.filter(|r| r.is_active(now)),
            ProgramCursor::Continuous(_) => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use rand::SeedableRng;

    use super::*;
    use crate::clock::Clock;
    use crate::state::{HsrSettings, MAX_BPM, MIN_BPM};
    use crate::test_host::FakeHost;

    fn scheduler(program: CadenceProgram) -> LookaheadScheduler {
        LookaheadScheduler::new(program, 0.0, CueEmitter::default(), StdRng::seed_from_u64(11))
            .unwrap()
    }

    /// Poll every 25 ms until the scheduler reports the end.
    fn run_to_end(
        scheduler: &mut LookaheadScheduler,
        host: &mut FakeHost,
        limit: f64,
    ) -> Vec<TickReport> {
        let mut reports = Vec::new();
        while host.clock.now() <= limit {
            let now = host.clock.now();
            let report = scheduler.poll(host, now).unwrap();
            let finished = report.finished;
            reports.push(report);
            if finished {
                break;
            }
            host.advance(POLL_INTERVAL_MS as f64 / 1000.0);
        }
        reports
    }

    #[test]
    fn test_steady_beats_and_finish() {
        let mut host = FakeHost::new(0.0);
        let mut sched = scheduler(CadenceProgram::steady(120.0, 5.0));

        let reports = run_to_end(&mut sched, &mut host, 10.0);
        assert!(reports.last().unwrap().finished);

        // Beats at 0.0, 0.5, ... 5.0, the last one on the end time.
        let times = host.tone_times();
        assert_eq!(times.len(), 11);
        for (i, t) in times.iter().enumerate() {
            assert!((t - i as f64 * 0.5).abs() < 1e-9);
        }
        assert!(host.clock.now() >= 5.0);
    }

    #[test]
    fn test_beat_on_end_time_is_scheduled() {
        for anchor in [0.0, 4.4] {
            let mut host = FakeHost::new(anchor);
            let mut sched = LookaheadScheduler::new(
                CadenceProgram::steady(60.0, 10.0),
                anchor,
                CueEmitter::default(),
                StdRng::seed_from_u64(1),
            )
            .unwrap();
            run_to_end(&mut sched, &mut host, anchor + 20.0);

            let times = host.tone_times();
            assert_eq!(times.len(), 11);
            assert!((times[10] - (anchor + 10.0)).abs() < 1e-9);
        }
    }

    #[test]
    fn test_events_are_scheduled_ahead_of_the_clock() {
        let mut host = FakeHost::new(0.0);
        let mut sched = scheduler(CadenceProgram::steady(60.0, 30.0));

        let report = sched.poll(&mut host, 0.0).unwrap();
        assert_eq!(report.tones.len(), 1);

        // 0.9s: the beat at 1.0 is inside the horizon.
        let report = sched.poll(&mut host, 0.9).unwrap();
        assert_eq!(report.tones.len(), 1);
        assert_eq!(report.tones[0].at_time, 1.0);

        // Nothing new until the next beat enters the horizon.
        let report = sched.poll(&mut host, 1.2).unwrap();
        assert!(report.tones.is_empty());
    }

    #[test]
    fn test_late_poll_drains_backlog_at_exact_times() {
        let mut host = FakeHost::new(0.0);
        let mut sched = scheduler(CadenceProgram::steady(60.0, 30.0));

        sched.poll(&mut host, 0.0).unwrap();
        // The host was throttled for five seconds.
        let report = sched.poll(&mut host, 5.0).unwrap();

        let times: Vec<f64> = report.tones.iter().map(|t| t.at_time).collect();
        assert_eq!(times, vec![1.0, 2.0, 3.0, 4.0, 5.0]);
    }

    #[test]
    fn test_continuous_intervals_stay_within_bpm_bounds() {
        let programs = [
            CadenceProgram::progressive(20.0, 300.0, 20.0),
            CadenceProgram::random(20.0, 300.0, 20.0),
            CadenceProgram::steady(300.0, 5.0),
        ];
        for program in programs {
            let mut host = FakeHost::new(0.0);
            let mut sched = scheduler(program);
            run_to_end(&mut sched, &mut host, 30.0);

            let times = host.tone_times();
            assert!(times.len() > 2);
            for pair in times.windows(2) {
                let gap = pair[1] - pair[0];
                assert!(gap >= 60.0 / MAX_BPM - 1e-9, "gap {} too short", gap);
                assert!(gap <= 60.0 / MIN_BPM + 1e-9, "gap {} too long", gap);
            }
        }
    }

    #[test]
    fn test_progressive_follows_ramp() {
        let mut host = FakeHost::new(0.0);
        let mut sched = scheduler(CadenceProgram::progressive(40.0, 50.0, 120.0));
        run_to_end(&mut sched, &mut host, 130.0);

        let times = host.tone_times();
        // First interval at 40 bpm, last close to 50 bpm.
        assert!((times[1] - times[0] - 1.5).abs() < 1e-9);
        let last_gap = times[times.len() - 1] - times[times.len() - 2];
        assert!(last_gap < 1.25, "last gap {}", last_gap);
        assert!(*times.last().unwrap() <= 120.0);
    }

    #[test]
    fn test_unlimited_ramp_never_finishes() {
        let mut host = FakeHost::new(0.0);
        let mut sched = scheduler(CadenceProgram::progressive(40.0, 50.0, 0.0));
        let reports = run_to_end(&mut sched, &mut host, 20.0);

        assert!(reports.iter().all(|r| !r.finished));
        assert_eq!(sched.window().end_time, None);
        assert_eq!(sched.display_bpm(10.0), Some(50.0));
    }

    #[test]
    fn test_eccentric_reps_and_accents() {
        let mut host = FakeHost::new(0.0);
        let mut sched = scheduler(CadenceProgram::eccentric(2.0, 2.0, 6.0, 3.0));
        let reports = run_to_end(&mut sched, &mut host, 60.0);
        assert!(reports.last().unwrap().finished);

        // 4 reps of 9 seconds, one tick per second.
        assert_eq!(host.tones.len(), 36);
        let peaks: Vec<f64> = host
            .tones
            .iter()
            .filter(|t| t.frequency_hz == CuePreset::EffortPeak.frequency_hz())
            .map(|t| t.at_time)
            .collect();
        assert_eq!(peaks, vec![5.0, 14.0, 23.0, 32.0]);

        // Finishes one second after the final tick.
        assert_eq!(sched.window().end_time, Some(36.0));
        assert!(host.clock.now() >= 36.0);
    }

    #[test]
    fn test_hsr_inter_rep_rest() {
        let mut host = FakeHost::new(0.0);
        let program = CadenceProgram::hsr(HsrSettings {
            sets: 1.0,
            reps_per_set: 2.0,
            concentric_seconds: 3.0,
            eccentric_seconds: 3.0,
            top_hold_seconds: 0.0,
            bottom_hold_seconds: 0.0,
            inter_rep_rest_seconds: 5.0,
            inter_set_rest_seconds: 120.0,
        });
        let mut sched = scheduler(program);
        let reports = run_to_end(&mut sched, &mut host, 60.0);

        let rests: Vec<RestWindow> = reports.iter().flat_map(|r| r.rests.clone()).collect();
        assert_eq!(rests, vec![RestWindow::new(RestKind::BetweenReps, 11.0)]);

        // Rep 1 ticks 0..=5, rest 6..11, rep 2 ticks 11..=16.
        let times = host.tone_times();
        assert_eq!(times.len(), 12);
        assert_eq!(times[5], 5.0);
        assert_eq!(times[6], 11.0);
        assert_eq!(times[11], 16.0);
        assert_eq!(sched.window().end_time, Some(17.0));
    }

    #[test]
    fn test_hsr_inter_set_rest_and_no_trailing_rest() {
        let mut host = FakeHost::new(0.0);
        let program = CadenceProgram::hsr(HsrSettings {
            sets: 2.0,
            reps_per_set: 1.0,
            concentric_seconds: 2.0,
            eccentric_seconds: 2.0,
            top_hold_seconds: 0.0,
            bottom_hold_seconds: 0.0,
            inter_rep_rest_seconds: 4.0,
            inter_set_rest_seconds: 10.0,
        });
        let mut sched = scheduler(program);
        let reports = run_to_end(&mut sched, &mut host, 60.0);

        let rests: Vec<RestWindow> = reports.iter().flat_map(|r| r.rests.clone()).collect();
        assert_eq!(rests, vec![RestWindow::new(RestKind::BetweenSets, 14.0)]);
        assert_eq!(sched.window().end_time, Some(18.0));
        assert!(reports.last().unwrap().finished);
    }

    #[test]
    fn test_rest_is_visible_while_active() {
        let mut host = FakeHost::new(0.0);
        let program = CadenceProgram::hsr(HsrSettings {
            sets: 1.0,
            reps_per_set: 2.0,
            concentric_seconds: 1.0,
            eccentric_seconds: 1.0,
            inter_rep_rest_seconds: 5.0,
            ..HsrSettings::default()
        });
        let mut sched = scheduler(program);
        sched.poll(&mut host, 0.0).unwrap();
        sched.poll(&mut host, 1.0).unwrap();

        // Rep 1 ticked at 0 and 1; rest runs until 7.
        let rest = sched.active_rest(3.0).unwrap();
        assert_eq!(rest.remaining(3.0), 4.0);
        assert!(sched.active_rest(7.5).is_none());
    }

    #[test]
    fn test_rejected_tone_is_retried() {
        let mut host = FakeHost::new(0.0);
        let mut sched = scheduler(CadenceProgram::steady(60.0, 30.0));

        host.reject_tones = true;
        assert!(sched.poll(&mut host, 0.0).is_err());
        assert_eq!(sched.next_event_time(), Some(0.0));

        host.reject_tones = false;
        let report = sched.poll(&mut host, 0.025).unwrap();
        assert_eq!(report.tones.len(), 1);
        assert_eq!(report.tones[0].at_time, 0.0);
    }

    #[test]
    fn test_non_finite_clock_is_rejected() {
        let mut host = FakeHost::new(0.0);
        let mut sched = scheduler(CadenceProgram::steady(60.0, 30.0));
        let err = sched.poll(&mut host, f64::NAN).unwrap_err();
        assert!(matches!(err, TrainerError::NonFiniteClock { .. }));
        assert!(host.tones.is_empty());
    }
}
