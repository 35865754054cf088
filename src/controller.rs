// src/controller.rs
//
// Session controller.
//
// Orchestrates one training session at a time: pre-roll countdown,
// playback, finish, and the optional rest before an automatic restart.
// Everything runs on the host's event loop. The host calls `poll()` every
// POLL_INTERVAL_MS and `readout()` on each display frame; there are no
// timers inside the core, only absolute deadlines compared to the clock.

use std::collections::VecDeque;

use rand::SeedableRng;
use rand::rngs::StdRng;

use crate::clock::{RestKind, RestWindow};
use crate::countdown::{CountdownProgress, CountdownSequencer};
use crate::cue::CueEmitter;
use crate::error::{TrainerError, TrainerResult};
use crate::host::Host;
use crate::readout::{ReadoutSource, project};
use crate::scheduler::LookaheadScheduler;
use crate::state::{LifecycleEvent, Readout, SessionState, SessionStatus, TrainerConfig};

/// Gap between the end of the countdown and the first tick.
pub const START_OFFSET_SECONDS: f64 = 0.1;

/// One start attempt. Dropped on every terminal transition.
struct Session {
    countdown: CountdownSequencer,

    /// Present once the countdown completed.
    scheduler: Option<LookaheadScheduler>,
}

/// Drives sessions against a host.
///
/// Coordinates:
/// - CountdownSequencer (pre-roll)
/// - LookaheadScheduler (program → tones)
/// - the readout projector
/// - auto-restart and the screen wake hold
pub struct SessionController<H: Host> {
    host: H,

    config: TrainerConfig,

    state: SessionState,
    status: SessionStatus,

    /// The current attempt, if one is in flight.
    session: Option<Session>,

    /// Pending automatic restart.
    restart_rest: Option<RestWindow>,

    /// Lifecycle notifications not yet taken by the host.
    events: VecDeque<LifecycleEvent>,

    wake_held: bool,

    /// Fixed seed for random cadence, for reproducible sessions.
    rng_seed: Option<u64>,
}

impl<H: Host> SessionController<H> {
    pub fn new(host: H, config: TrainerConfig) -> Self {
        Self {
            host,
            config,
            state: SessionState::Idle,
            status: SessionStatus::Idle,
            session: None,
            restart_rest: None,
            events: VecDeque::with_capacity(8),
            wake_held: false,
            rng_seed: None,
        }
    }

    /// Seed the random cadence generator.
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.rng_seed = Some(seed);
        self
    }

    /// Replace the configuration. Takes effect at the next `start()`.
    pub fn configure(&mut self, config: TrainerConfig) {
        self.config = config;
    }

    // ─────────────────────────────────────────────────────────────────────
    // Transitions
    // ─────────────────────────────────────────────────────────────────────

    /// Begin a new attempt with the pre-roll countdown.
    ///
    /// Cancels any pending automatic restart. Fails if a countdown or
    /// playback is already running, or if the audio backend cannot be
    /// resumed.
    pub fn start(&mut self) -> TrainerResult<()> {
        if matches!(self.state, SessionState::CountingDown | SessionState::Playing) {
            return Err(TrainerError::SessionBusy { state: self.state });
        }

        self.restart_rest = None;

        let now = self.host.now();
        if !now.is_finite() {
            return Err(TrainerError::NonFiniteClock { value: now });
        }

        if let Err(reason) = self.host.resume() {
            log::error!("audio backend did not resume: {}", reason);
            self.session = None;
            self.state = SessionState::Idle;
            self.status = SessionStatus::AudioUnavailable;
            self.sync_wake();
            return Err(TrainerError::AudioUnavailable { reason });
        }

        let mut countdown = CountdownSequencer::new(self.emitter());
        countdown.begin(&mut self.host, now);
        self.session = Some(Session {
            countdown,
            scheduler: None,
        });

        self.state = SessionState::CountingDown;
        self.status = SessionStatus::Ready;
        self.sync_wake();
        log::info!("countdown started at {:.3}s", now);
        Ok(())
    }

    /// Manual stop. Idempotent.
    pub fn stop(&mut self) {
        match self.state {
            SessionState::CountingDown => {
                if let Some(session) = self.session.as_mut() {
                    session.countdown.abort(&mut self.host);
                }
                self.abort_countdown();
            }
            SessionState::Playing | SessionState::RestingBeforeRestart => {
                self.host.cancel_speech();
                self.session = None;
                self.restart_rest = None;
                self.state = SessionState::Stopped;
                self.status = SessionStatus::Stopped;
                self.sync_wake();
                self.events.push_back(LifecycleEvent::Stopped);
                log::info!("session stopped");
            }
            SessionState::Idle | SessionState::Stopped | SessionState::Finished => {
                self.restart_rest = None;
                self.sync_wake();
            }
        }
    }

    /// One polling tick. Call every POLL_INTERVAL_MS.
    ///
    /// Never fails: a bad tick is logged and skipped so the host's polling
    /// timer keeps running.
    pub fn poll(&mut self) -> SessionState {
        let now = self.host.now();
        if !now.is_finite() {
            log::error!("skipping tick: {}", TrainerError::NonFiniteClock { value: now });
            return self.state;
        }

        match self.state {
            SessionState::CountingDown => self.poll_countdown(now),
            SessionState::Playing => self.poll_playback(now),
            SessionState::RestingBeforeRestart => self.poll_restart(now),
            SessionState::Idle | SessionState::Stopped | SessionState::Finished => {}
        }
        self.state
    }

    fn poll_countdown(&mut self, now: f64) {
        let Some(session) = self.session.as_mut() else {
            log::warn!("counting down without a session");
            self.state = SessionState::Idle;
            return;
        };

        match session.countdown.advance(&mut self.host, now) {
            CountdownProgress::Pending => {}
            CountdownProgress::Aborted => self.abort_countdown(),
            CountdownProgress::Done => self.begin_playback(now),
        }
    }

    fn begin_playback(&mut self, now: f64) {
        let anchor = now + START_OFFSET_SECONDS;
        let rng = match self.rng_seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };

        let program = self.config.program.clone();
        let scheduler = match LookaheadScheduler::new(program, anchor, self.emitter(), rng) {
            Ok(scheduler) => scheduler,
            Err(e) => {
                log::error!("cannot start playback: {}", e);
                self.session = None;
                self.state = SessionState::Stopped;
                self.status = SessionStatus::Stopped;
                self.sync_wake();
                self.events.push_back(LifecycleEvent::Stopped);
                return;
            }
        };

        if let Some(session) = self.session.as_mut() {
            session.scheduler = Some(scheduler);
        }
        self.state = SessionState::Playing;
        self.status = SessionStatus::Playing;
        self.events.push_back(LifecycleEvent::Started);
        log::info!("playback anchored at {:.3}s", anchor);

        self.poll_playback(now);
    }

    fn poll_playback(&mut self, now: f64) {
        let Some(scheduler) = self.session.as_mut().and_then(|s| s.scheduler.as_mut()) else {
            log::warn!("playing without a scheduler");
            return;
        };

        match scheduler.poll(&mut self.host, now) {
            Ok(report) => {
                for rest in &report.rests {
                    log::info!("{:?} rest until {:.3}s", rest.kind, rest.until_time);
                }
                if report.finished {
                    self.finish(now);
                }
            }
            Err(e) => log::error!("skipping tick: {}", e),
        }
    }

    fn finish(&mut self, now: f64) {
        self.session = None;
        self.events.push_back(LifecycleEvent::Finished);
        log::info!("session finished at {:.3}s", now);

        let auto_restart = self.config.auto_restart;
        if auto_restart.enabled {
            let until_time = now + auto_restart.delay_seconds;
            self.restart_rest = Some(RestWindow::new(RestKind::BeforeRestart, until_time));
            self.state = SessionState::RestingBeforeRestart;
            self.status = SessionStatus::RestartCountdown;
            self.events
                .push_back(LifecycleEvent::RestBeforeRestart { until_time });
        } else {
            self.state = SessionState::Finished;
            self.status = SessionStatus::Finished;
            self.sync_wake();
        }
    }

    fn poll_restart(&mut self, now: f64) {
        let due = self.restart_rest.is_none_or(|rest| !rest.is_active(now));
        if !due {
            return;
        }
        log::info!("restarting after rest");
        if let Err(e) = self.start() {
            log::error!("automatic restart failed: {}", e);
        }
    }

    fn abort_countdown(&mut self) {
        self.session = None;
        self.state = SessionState::Idle;
        self.status = SessionStatus::Aborted;
        self.sync_wake();
        self.events.push_back(LifecycleEvent::CountdownAborted);
    }

    /// Acquire or release the wake hold to match the current state.
    fn sync_wake(&mut self) {
        let held = self.state.holds_wake();
        if held == self.wake_held {
            return;
        }
        if held {
            self.host.acquire_wake();
        } else {
            self.host.release_wake();
        }
        self.wake_held = held;
    }

    fn emitter(&self) -> CueEmitter {
        CueEmitter::new(self.config.countdown_sound, self.config.language)
    }

    // ─────────────────────────────────────────────────────────────────────
    // Readback
    // ─────────────────────────────────────────────────────────────────────

    /// Display snapshot for the current clock time.
    pub fn readout(&self) -> Readout {
        let idle_countdown = CountdownSequencer::default();
        let session = self.session.as_ref();

        let source = ReadoutSource {
            state: self.state,
            status: self.status,
            language: self.config.language,
            scheduler: session.and_then(|s| s.scheduler.as_ref()),
            countdown: session.map(|s| &s.countdown).unwrap_or(&idle_countdown),
            restart_rest: self.restart_rest,
        };
        project(&source, self.host.now())
    }

    /// Take all pending lifecycle notifications, oldest first.
    pub fn drain_events(&mut self) -> impl Iterator<Item = LifecycleEvent> + '_ {
        self.events.drain(..)
    }

    pub fn state(&self) -> SessionState {
        self.state
    }

    pub fn status(&self) -> SessionStatus {
        self.status
    }

    pub fn status_text(&self) -> &'static str {
        self.status.label(self.config.language)
    }

    pub fn config(&self) -> &TrainerConfig {
        &self.config
    }

    pub fn host(&self) -> &H {
        &self.host
    }

    pub fn host_mut(&mut self) -> &mut H {
        &mut self.host
    }

    /// The pending automatic restart, if any.
    pub fn restart_rest(&self) -> Option<RestWindow> {
        self.restart_rest
    }
}
