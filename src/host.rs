// src/host.rs
//
// Collaborators implemented by the host application.
//
// The core never talks to an audio graph, a speech engine or a screen
// directly. It calls these traits, all from the same thread that drives
// the polling loop.

use crate::clock::Clock;
use crate::event::Tone;

/// Audio output that can start a tone at an exact future clock time.
pub trait ToneSink {
    /// Wake a suspended audio backend. Called once per `start()`.
    fn resume(&mut self) -> Result<(), String> {
        Ok(())
    }

    /// Schedule `tone` at `tone.at_time`.
    ///
    /// A time already in the past sounds immediately; it is never moved
    /// retroactively.
    fn schedule_tone(&mut self, tone: &Tone) -> Result<(), String>;
}

/// Optional speech output for the spoken countdown.
pub trait SpeechSink {
    /// Speak `text` now. Returns false if speech or a matching voice is
    /// unavailable, in which case the caller plays the tone instead.
    fn speak(&mut self, _text: &str, _language_tag: &str) -> bool {
        false
    }

    /// Cut off anything still being spoken.
    fn cancel_speech(&mut self) {}
}

/// Keeps the screen awake while a session is active.
pub trait WakeHold {
    fn acquire_wake(&mut self) {}

    fn release_wake(&mut self) {}
}

/// Everything the session controller needs from the host.
pub trait Host: Clock + ToneSink + SpeechSink + WakeHold {}

impl<T: Clock + ToneSink + SpeechSink + WakeHold> Host for T {}
