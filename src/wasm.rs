//! WebAssembly bindings via wasm-bindgen for browser integration.
//!
//! This module is only compiled when the `web` feature is enabled.
//!
//! # Usage
//!
//! Build with wasm-pack:
//! ```bash
//! wasm-pack build --target web --features web
//! ```
//!
//! # JavaScript Example
//!
//! ```javascript
//! import init, { cadence_init, CadenceTrainer } from './cadence.js';
//!
//! await init();
//! cadence_init();
//!
//! const trainer = new CadenceTrainer();
//! trainer.set_steady(60, 30);
//! trainer.set_countdown_sound("voice");
//!
//! const err = await ctx.resume().then(() => null, (e) => String(e));
//! trainer.start(ctx.currentTime, err);
//!
//! setInterval(() => {
//!   trainer.poll(ctx.currentTime);
//!   const t = trainer.drain_tones(); // [at, hz, secs, gain, ...]
//!   for (let i = 0; i < t.length; i += 4) playTone(t[i], t[i + 1], t[i + 2], t[i + 3]);
//! }, 25);
//! ```
//!
//! Every call takes the audio clock (`AudioContext.currentTime`), so the
//! core never reads time on its own.

use wasm_bindgen::prelude::*;

use crate::clock::Clock;
use crate::controller::SessionController;
use crate::event::Tone;
use crate::host::{SpeechSink, ToneSink, WakeHold};
use crate::state::{
    AutoRestart, CadenceProgram, CountdownSound, HsrSettings, Language, Readout, SessionState,
    TrainerConfig,
};

// ═══════════════════════════════════════════════════════════════════════════
// Initialization
// ═══════════════════════════════════════════════════════════════════════════

/// Initialize the wasm module. Call this once before using any other functions.
/// Sets up panic hooks and console logging.
#[wasm_bindgen]
pub fn cadence_init() {
    console_error_panic_hook::set_once();
    console_log::init_with_level(log::Level::Debug).ok();
}

// ═══════════════════════════════════════════════════════════════════════════
// Queueing Host
// ═══════════════════════════════════════════════════════════════════════════

/// Host side of the controller while running in the browser.
///
/// Holds the clock value passed in by JS and queues every request for JS
/// to drain after the call returns.
#[derive(Default)]
struct WebHost {
    now: f64,
    resume_error: Option<String>,
    speech_available: bool,
    tones: Vec<Tone>,
    speech: Vec<String>,
    speech_cancelled: bool,
    wake_held: bool,
}

impl Clock for WebHost {
    fn now(&self) -> f64 {
        self.now
    }
}

impl ToneSink for WebHost {
    fn resume(&mut self) -> Result<(), String> {
        match self.resume_error.take() {
            Some(reason) => Err(reason),
            None => Ok(()),
        }
    }

    fn schedule_tone(&mut self, tone: &Tone) -> Result<(), String> {
        self.tones.push(*tone);
        Ok(())
    }
}

impl SpeechSink for WebHost {
    fn speak(&mut self, text: &str, language_tag: &str) -> bool {
        if !self.speech_available {
            return false;
        }
        self.speech.push(text.to_string());
        self.speech.push(language_tag.to_string());
        true
    }

    fn cancel_speech(&mut self) {
        self.speech.clear();
        self.speech_cancelled = true;
    }
}

impl WakeHold for WebHost {
    fn acquire_wake(&mut self) {
        self.wake_held = true;
    }

    fn release_wake(&mut self) {
        self.wake_held = false;
    }
}

fn state_name(state: SessionState) -> &'static str {
    match state {
        SessionState::Idle => "idle",
        SessionState::CountingDown => "countingDown",
        SessionState::Playing => "playing",
        SessionState::Stopped => "stopped",
        SessionState::Finished => "finished",
        SessionState::RestingBeforeRestart => "restingBeforeRestart",
    }
}

// ═══════════════════════════════════════════════════════════════════════════
// Readout
// ═══════════════════════════════════════════════════════════════════════════

/// Display snapshot for one animation frame.
#[wasm_bindgen]
pub struct CadenceReadout {
    inner: Readout,
    status_text: &'static str,
}

#[wasm_bindgen]
impl CadenceReadout {
    /// Lifecycle state name (e.g. "countingDown").
    pub fn state(&self) -> String {
        state_name(self.inner.state).to_string()
    }

    /// Localised status line.
    pub fn status_text(&self) -> String {
        self.status_text.to_string()
    }

    /// Cadence with one decimal, or a placeholder.
    pub fn bpm_text(&self) -> String {
        self.inner.bpm_text()
    }

    /// Remaining session or rest time as m:ss, or a placeholder.
    pub fn time_text(&self) -> String {
        self.inner.time_text()
    }

    /// "set i/N — rep j/M — phase" for structured modes.
    pub fn phase_label(&self) -> Option<String> {
        self.inner.phase_label.clone()
    }

    /// "4", "3", "2", "1" or "GO" while the pre-roll runs.
    pub fn countdown_label(&self) -> Option<String> {
        self.inner.countdown_label.map(str::to_string)
    }

    /// Whether the time readout is a countdown (rest or pre-roll).
    pub fn is_countdown_phase(&self) -> bool {
        self.inner.is_countdown_phase
    }
}

// ═══════════════════════════════════════════════════════════════════════════
// Trainer
// ═══════════════════════════════════════════════════════════════════════════

/// One cadence trainer bound to a browser page.
#[wasm_bindgen]
pub struct CadenceTrainer {
    inner: SessionController<WebHost>,
}

#[wasm_bindgen]
impl CadenceTrainer {
    /// Create a trainer with the default program (40 → 50 bpm over 120 s).
    #[wasm_bindgen(constructor)]
    pub fn new() -> CadenceTrainer {
        CadenceTrainer {
            inner: SessionController::new(WebHost::default(), TrainerConfig::default()),
        }
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Configuration
    // ─────────────────────────────────────────────────────────────────────────

    /// Ramp from `start_bpm` to `end_bpm`. A zero ramp runs until stopped.
    pub fn set_progressive(&mut self, start_bpm: f64, end_bpm: f64, ramp_seconds: f64) {
        self.set_program(CadenceProgram::progressive(start_bpm, end_bpm, ramp_seconds));
    }

    pub fn set_steady(&mut self, bpm: f64, duration_seconds: f64) {
        self.set_program(CadenceProgram::steady(bpm, duration_seconds));
    }

    pub fn set_random(&mut self, min_bpm: f64, max_bpm: f64, duration_seconds: f64) {
        self.set_program(CadenceProgram::random(min_bpm, max_bpm, duration_seconds));
    }

    pub fn set_eccentric(
        &mut self,
        sets: f64,
        reps_per_set: f64,
        effort_seconds: f64,
        return_seconds: f64,
    ) {
        self.set_program(CadenceProgram::eccentric(
            sets,
            reps_per_set,
            effort_seconds,
            return_seconds,
        ));
    }

    #[allow(clippy::too_many_arguments)]
    pub fn set_hsr(
        &mut self,
        sets: f64,
        reps_per_set: f64,
        concentric_seconds: f64,
        eccentric_seconds: f64,
        top_hold_seconds: f64,
        bottom_hold_seconds: f64,
        inter_rep_rest_seconds: f64,
        inter_set_rest_seconds: f64,
    ) {
        self.set_program(CadenceProgram::hsr(HsrSettings {
            sets,
            reps_per_set,
            concentric_seconds,
            eccentric_seconds,
            top_hold_seconds,
            bottom_hold_seconds,
            inter_rep_rest_seconds,
            inter_set_rest_seconds,
        }));
    }

    /// "none", "beep" or "voice".
    pub fn set_countdown_sound(&mut self, sound: &str) {
        let sound = sound.parse::<CountdownSound>().unwrap_or_default();
        self.update_config(|config| config.countdown_sound = sound);
    }

    pub fn set_auto_restart(&mut self, enabled: bool, delay_seconds: f64) {
        let auto_restart = AutoRestart::new(enabled, delay_seconds);
        self.update_config(|config| config.auto_restart = auto_restart);
    }

    /// "en" or "fr".
    pub fn set_language(&mut self, language: &str) {
        let language = language.parse::<Language>().unwrap_or_default();
        self.update_config(|config| config.language = language);
    }

    /// Whether a speech voice for the current language is loaded.
    pub fn set_speech_available(&mut self, available: bool) {
        self.inner.host_mut().speech_available = available;
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Session
    // ─────────────────────────────────────────────────────────────────────────

    /// Start the countdown. `audio_error` is the rejection reason if the
    /// audio context failed to resume.
    pub fn start(&mut self, now: f64, audio_error: Option<String>) -> Result<(), JsValue> {
        let host = self.inner.host_mut();
        host.now = now;
        host.resume_error = audio_error;
        self.inner
            .start()
            .map_err(|e| JsValue::from_str(&e.to_string()))
    }

    /// Manual stop. Safe to call at any time.
    pub fn stop(&mut self, now: f64) {
        self.inner.host_mut().now = now;
        self.inner.stop();
    }

    /// Polling tick. Call every 25 ms. Returns the lifecycle state name.
    pub fn poll(&mut self, now: f64) -> String {
        self.inner.host_mut().now = now;
        state_name(self.inner.poll()).to_string()
    }

    /// Display snapshot. Call from requestAnimationFrame.
    pub fn readout(&mut self, now: f64) -> CadenceReadout {
        self.inner.host_mut().now = now;
        CadenceReadout {
            inner: self.inner.readout(),
            status_text: self.inner.status_text(),
        }
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Queued Requests
    // ─────────────────────────────────────────────────────────────────────────

    /// Tones to schedule, flattened as `[at, hz, secs, gain, ...]`.
    pub fn drain_tones(&mut self) -> Vec<f64> {
        self.inner
            .host_mut()
            .tones
            .drain(..)
            .flat_map(|t| [t.at_time, t.frequency_hz, t.duration_seconds, t.gain])
            .collect()
    }

    /// Utterances to speak, flattened as `[text, languageTag, ...]`.
    pub fn drain_speech(&mut self) -> Vec<String> {
        std::mem::take(&mut self.inner.host_mut().speech)
    }

    /// True once after speech in flight must be cut off.
    pub fn take_speech_cancel(&mut self) -> bool {
        std::mem::take(&mut self.inner.host_mut().speech_cancelled)
    }

    /// Lifecycle notices since the last call, oldest first.
    pub fn drain_events(&mut self) -> Vec<String> {
        self.inner
            .drain_events()
            .map(|e| e.name().to_string())
            .collect()
    }

    /// Whether the screen should be kept awake.
    pub fn wake_held(&self) -> bool {
        self.inner.host().wake_held
    }
}

impl CadenceTrainer {
    fn set_program(&mut self, program: CadenceProgram) {
        self.update_config(|config| config.program = program);
    }

    fn update_config(&mut self, f: impl FnOnce(&mut TrainerConfig)) {
        let mut config = self.inner.config().clone();
        f(&mut config);
        self.inner.configure(config);
    }
}

impl Default for CadenceTrainer {
    fn default() -> Self {
        Self::new()
    }
}
