// src/state/session.rs
//
// Session lifecycle state and the read-only view handed to the host.

use std::fmt;

use crate::clock::format_mmss;

use super::Language;

/// Shown in place of a value that does not apply.
pub const PLACEHOLDER: &str = "—";

/// Lifecycle of the session controller.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SessionState {
    #[default]
    Idle,
    CountingDown,
    Playing,
    Stopped,
    Finished,
    RestingBeforeRestart,
}

impl SessionState {
    /// States during which the screen should stay awake.
    pub fn holds_wake(&self) -> bool {
        matches!(
            self,
            SessionState::CountingDown | SessionState::Playing | SessionState::RestingBeforeRestart
        )
    }
}

/// Status line shown by the host.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SessionStatus {
    #[default]
    Idle,
    Ready,
    Playing,
    Aborted,
    Finished,
    Stopped,
    RestartCountdown,
    AudioUnavailable,
}

impl SessionStatus {
    pub fn label(&self, language: Language) -> &'static str {
        match (self, language) {
            (SessionStatus::Idle, Language::En) => "idle",
            (SessionStatus::Idle, Language::Fr) => "au repos",
            (SessionStatus::Ready, Language::En) => "ready...",
            (SessionStatus::Ready, Language::Fr) => "prêt...",
            (SessionStatus::Playing, Language::En) => "playing",
            (SessionStatus::Playing, Language::Fr) => "lecture",
            (SessionStatus::Aborted, Language::En) => "aborted",
            (SessionStatus::Aborted, Language::Fr) => "interrompu",
            (SessionStatus::Finished, Language::En) => "finished",
            (SessionStatus::Finished, Language::Fr) => "terminé",
            (SessionStatus::Stopped, Language::En) => "stopped",
            (SessionStatus::Stopped, Language::Fr) => "arrêté",
            (SessionStatus::RestartCountdown, Language::En) => "countdown before restart",
            (SessionStatus::RestartCountdown, Language::Fr) => "compte à rebours avant redémarrage",
            (SessionStatus::AudioUnavailable, Language::En) => "audio unavailable",
            (SessionStatus::AudioUnavailable, Language::Fr) => "audio indisponible",
        }
    }
}

/// Transition notifications pushed to the host.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum LifecycleEvent {
    /// The countdown completed and playback is anchored.
    Started,
    /// The countdown was stopped before GO.
    CountdownAborted,
    /// The program ran to completion.
    Finished,
    /// The user stopped playback or a pending restart.
    Stopped,
    /// An automatic restart is pending until `until_time`.
    RestBeforeRestart { until_time: f64 },
}

impl LifecycleEvent {
    /// Host-facing event name.
    pub fn name(&self) -> &'static str {
        match self {
            LifecycleEvent::Started => "started",
            LifecycleEvent::CountdownAborted => "countdownAborted",
            LifecycleEvent::Finished => "finished",
            LifecycleEvent::Stopped => "stopped",
            LifecycleEvent::RestBeforeRestart { .. } => "restBeforeRestart",
        }
    }
}

/// Snapshot of what the display should show right now.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Readout {
    pub state: SessionState,
    pub status: SessionStatus,

    /// Current cadence. `None` for structured modes and before the first
    /// random beat.
    pub display_bpm: Option<f64>,

    /// `set 1/3 — rep 2/15 — eccentric` for structured modes.
    pub phase_label: Option<String>,

    /// Seconds left in the session or in the active rest.
    pub time_remaining: Option<f64>,

    /// True while the pre-roll or a rest is counting down.
    pub is_countdown_phase: bool,

    /// `4`, `3`, `2`, `1` or `GO` while the pre-roll runs.
    pub countdown_label: Option<&'static str>,
}

impl Readout {
    pub fn bpm_text(&self) -> String {
        match self.display_bpm {
            Some(bpm) => format!("{:.1}", bpm),
            None => PLACEHOLDER.to_string(),
        }
    }

    pub fn time_text(&self) -> String {
        match self.time_remaining {
            Some(seconds) => format_mmss(seconds),
            None => PLACEHOLDER.to_string(),
        }
    }
}

impl fmt::Display for Readout {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} bpm, {}", self.bpm_text(), self.time_text())?;
        if self.is_countdown_phase {
            f.write_str(" (countdown)")?;
        }
        if let Some(label) = &self.phase_label {
            write!(f, ", {}", label)?;
        }
        Ok(())
    }
}
