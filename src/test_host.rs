// src/test_host.rs
//
// Deterministic host used by the unit tests.

use crate::clock::{Clock, ManualClock};
use crate::event::Tone;
use crate::host::{SpeechSink, ToneSink, WakeHold};

/// Records everything the core asks of the host.
#[derive(Debug, Default)]
pub struct FakeHost {
    pub clock: ManualClock,
    pub tones: Vec<Tone>,
    pub spoken: Vec<(String, String)>,
    pub speech_available: bool,
    pub speech_cancels: usize,
    pub wake_held: bool,
    pub wake_acquires: usize,
    pub wake_releases: usize,
    pub resume_error: Option<String>,
    pub reject_tones: bool,
}

impl FakeHost {
    pub fn new(now: f64) -> Self {
        Self {
            clock: ManualClock::new(now),
            ..Self::default()
        }
    }

    pub fn advance(&self, seconds: f64) {
        self.clock.advance(seconds);
    }

    pub fn tone_times(&self) -> Vec<f64> {
        self.tones.iter().map(|t| t.at_time).collect()
    }
}

impl Clock for FakeHost {
    fn now(&self) -> f64 {
        self.clock.now()
    }
}

impl ToneSink for FakeHost {
    fn resume(&mut self) -> Result<(), String> {
        match &self.resume_error {
            Some(reason) => Err(reason.clone()),
            None => Ok(()),
        }
    }

    fn schedule_tone(&mut self, tone: &Tone) -> Result<(), String> {
        if self.reject_tones {
            return Err("audio graph closed".to_string());
        }
        self.tones.push(*tone);
        Ok(())
    }
}

impl SpeechSink for FakeHost {
    fn speak(&mut self, text: &str, language_tag: &str) -> bool {
        if self.speech_available {
            self.spoken.push((text.to_string(), language_tag.to_string()));
        }
        self.speech_available
    }

    fn cancel_speech(&mut self) {
        self.speech_cancels += 1;
    }
}

impl WakeHold for FakeHost {
    fn acquire_wake(&mut self) {
        self.wake_held = true;
        self.wake_acquires += 1;
    }

    fn release_wake(&mut self) {
        self.wake_held = false;
        self.wake_releases += 1;
    }
}
