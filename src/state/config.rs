// src/state/config.rs
//
// Session configuration supplied by the host.

use std::str::FromStr;

use super::CadenceProgram;

/// Default pause before an automatic restart.
pub const DEFAULT_RESTART_DELAY_SECONDS: f64 = 5.0;

/// Shortest pause before an automatic restart.
pub const MIN_RESTART_DELAY_SECONDS: f64 = 1.0;

/// What the pre-roll sounds like.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum CountdownSound {
    Mute,
    #[default]
    Tone,
    /// Spoken words, falling back to tones when speech is unavailable.
    Voice,
}

impl FromStr for CountdownSound {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "none" | "mute" => Ok(CountdownSound::Mute),
            "beep" | "tone" => Ok(CountdownSound::Tone),
            "voice" => Ok(CountdownSound::Voice),
            other => Err(format!("unknown countdown sound '{}'", other)),
        }
    }
}

/// Language for spoken cues and readout text.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Language {
    #[default]
    En,
    Fr,
}

impl Language {
    /// BCP 47 tag handed to the speech sink.
    pub fn tag(&self) -> &'static str {
        match self {
            Language::En => "en-US",
            Language::Fr => "fr-FR",
        }
    }

    /// Spoken words for the five pre-roll steps.
    pub fn countdown_words(&self) -> [&'static str; 5] {
        match self {
            Language::En => ["four", "three", "two", "one", "go"],
            Language::Fr => ["quatre", "trois", "deux", "un", "partez"],
        }
    }
}

impl FromStr for Language {
    type Err = String;

    /// Accepts bare codes and full tags (`fr`, `fr-CA`, `en-GB`).
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let lower = s.trim().to_ascii_lowercase();
        if lower.starts_with("fr") {
            Ok(Language::Fr)
        } else if lower.starts_with("en") {
            Ok(Language::En)
        } else {
            Err(format!("unsupported language '{}'", s))
        }
    }
}

/// Restart the program automatically after it finishes.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AutoRestart {
    pub enabled: bool,
    pub delay_seconds: f64,
}

impl AutoRestart {
    pub fn new(enabled: bool, delay_seconds: f64) -> Self {
        let delay_seconds = if delay_seconds.is_finite() {
            delay_seconds.max(MIN_RESTART_DELAY_SECONDS)
        } else {
            DEFAULT_RESTART_DELAY_SECONDS
        };
        Self {
            enabled,
            delay_seconds,
        }
    }

    pub fn disabled() -> Self {
        Self::new(false, DEFAULT_RESTART_DELAY_SECONDS)
    }
}

impl Default for AutoRestart {
    fn default() -> Self {
        Self::disabled()
    }
}

/// Everything a session needs from the host.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct TrainerConfig {
    pub program: CadenceProgram,
    pub countdown_sound: CountdownSound,
    pub auto_restart: AutoRestart,
    pub language: Language,
}

impl TrainerConfig {
    pub fn new(program: CadenceProgram) -> Self {
        Self {
            program,
            ..Self::default()
        }
    }

    pub fn with_countdown_sound(mut self, sound: CountdownSound) -> Self {
        self.countdown_sound = sound;
        self
    }

    pub fn with_auto_restart(mut self, auto_restart: AutoRestart) -> Self {
        self.auto_restart = auto_restart;
        self
    }

    pub fn with_language(mut self, language: Language) -> Self {
        self.language = language;
        self
    }
}
