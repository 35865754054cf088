// src/countdown.rs
//
// Cancelable 4-3-2-1-GO pre-roll.
//
// The sequencer never sleeps. The controller feeds it the clock on every
// poll and it fires the next step once that step's deadline has passed.
// Each deadline is one second after the previous step actually fired, so
// a throttled host stretches the countdown rather than skipping steps.

use crate::cue::{CountdownCue, CueEmitter};
use crate::host::{SpeechSink, ToneSink};

/// Number of pre-roll steps, GO included.
pub const COUNTDOWN_STEPS: u8 = 5;

/// Time between steps.
pub const STEP_SECONDS: f64 = 1.0;

/// Pause after GO before playback is anchored.
pub const SETTLE_SECONDS: f64 = 0.3;

const STEP_LABELS: [&str; COUNTDOWN_STEPS as usize] = ["4", "3", "2", "1", "GO"];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum CountdownState {
    #[default]
    Idle,
    /// Showing step `n` (0 is "4", 4 is "GO").
    Step(u8),
    Done,
    Aborted,
}

/// Result of feeding the clock to the sequencer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CountdownProgress {
    Pending,
    Done,
    Aborted,
}

/// Single-flight pre-roll state machine.
#[derive(Debug, Clone, Default)]
pub struct CountdownSequencer {
    state: CountdownState,
    emitter: CueEmitter,

    /// When the current step may give way to the next one.
    deadline: f64,

    /// Checked at every step boundary.
    abort_requested: bool,
}

impl CountdownSequencer {
    pub fn new(emitter: CueEmitter) -> Self {
        Self {
            emitter,
            ..Self::default()
        }
    }

    pub fn state(&self) -> CountdownState {
        self.state
    }

    pub fn is_running(&self) -> bool {
        matches!(self.state, CountdownState::Step(_))
    }

    /// Overlay text for the current step.
    pub fn label(&self) -> Option<&'static str> {
        match self.state {
            CountdownState::Step(step) => STEP_LABELS.get(step as usize).copied(),
            _ => None,
        }
    }

    /// Start the pre-roll and fire step 0 at `now`.
    ///
    /// Returns false, and does nothing, if a countdown is already in
    /// flight.
    pub fn begin<S: ToneSink + SpeechSink + ?Sized>(&mut self, sink: &mut S, now: f64) -> bool {
        if self.is_running() {
            log::warn!("countdown already running");
            return false;
        }
        self.abort_requested = false;
        self.fire(sink, 0, now);
        true
    }

    /// Feed the clock. Fires at most one step per call.
    pub fn advance<S: ToneSink + SpeechSink + ?Sized>(
        &mut self,
        sink: &mut S,
        now: f64,
    ) -> CountdownProgress {
        if self.abort_requested && self.is_running() {
            self.state = CountdownState::Aborted;
        }

        match self.state {
            CountdownState::Idle => CountdownProgress::Pending,
            CountdownState::Done => CountdownProgress::Done,
            CountdownState::Aborted => CountdownProgress::Aborted,
            CountdownState::Step(_) if now < self.deadline => CountdownProgress::Pending,
            CountdownState::Step(step) if step + 1 < COUNTDOWN_STEPS => {
                self.fire(sink, step + 1, now);
                CountdownProgress::Pending
            }
            CountdownState::Step(_) => {
                log::debug!("countdown complete");
                self.state = CountdownState::Done;
                CountdownProgress::Done
            }
        }
    }

    /// Request an abort and silence any speech in flight.
    ///
    /// Returns true if a countdown was running. Calling it again, or
    /// when idle, is a no-op.
    pub fn abort<S: SpeechSink + ?Sized>(&mut self, sink: &mut S) -> bool {
        if !self.is_running() {
            return false;
        }
        self.abort_requested = true;
        self.state = CountdownState::Aborted;
        sink.cancel_speech();
        log::info!("countdown aborted");
        true
    }

    fn fire<S: ToneSink + SpeechSink + ?Sized>(&mut self, sink: &mut S, step: u8, now: f64) {
        self.state = CountdownState::Step(step);
        self.deadline = if step + 1 < COUNTDOWN_STEPS {
            now + STEP_SECONDS
        } else {
            now + SETTLE_SECONDS
        };

        let cue = self.emitter.emit_countdown_step(sink, now, step);
        if cue == CountdownCue::Dropped {
            log::warn!("countdown step {} had no audible cue", step);
        }
    }
}
