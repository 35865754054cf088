// src/cue.rs
//
// Turns named cues into tones (or spoken words) on the host sinks.

use crate::error::{TrainerError, TrainerResult};
use crate::event::{CuePreset, Tone};
use crate::host::{SpeechSink, ToneSink};
use crate::state::{CountdownSound, Language};

/// How a pre-roll step was actually rendered.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CountdownCue {
    Muted,
    Spoken,
    Toned,
    /// The tone sink refused the fallback tone. The countdown still runs.
    Dropped,
}

/// Schedules single cues at exact clock times.
#[derive(Debug, Clone, Copy, Default)]
pub struct CueEmitter {
    countdown_sound: CountdownSound,
    language: Language,
}

impl CueEmitter {
    pub fn new(countdown_sound: CountdownSound, language: Language) -> Self {
        Self {
            countdown_sound,
            language,
        }
    }

    /// Schedule a tone with explicit parameters.
    pub fn emit_tone<S: ToneSink + ?Sized>(
        &self,
        sink: &mut S,
        at_time: f64,
        frequency_hz: f64,
        duration_ms: f64,
        volume_multiplier: f64,
    ) -> TrainerResult<Tone> {
        let tone = Tone::new(at_time, frequency_hz, duration_ms / 1000.0, volume_multiplier);
        Self::schedule(sink, tone)
    }

    /// Schedule a preset cue.
    pub fn emit<S: ToneSink + ?Sized>(
        &self,
        sink: &mut S,
        at_time: f64,
        preset: CuePreset,
    ) -> TrainerResult<Tone> {
        Self::schedule(sink, Tone::from_preset(at_time, preset))
    }

    fn schedule<S: ToneSink + ?Sized>(sink: &mut S, tone: Tone) -> TrainerResult<Tone> {
        sink.schedule_tone(&tone)
            .map_err(|reason| TrainerError::ToneRejected {
                at_time: tone.at_time,
                reason,
            })?;
        log::debug!(
            "tone {:.0}Hz at {:.3}s ({:.2}s, gain {:.2})",
            tone.frequency_hz,
            tone.at_time,
            tone.duration_seconds,
            tone.gain
        );
        Ok(tone)
    }

    /// Play pre-roll step `step` (0..=4, 4 is GO).
    ///
    /// Voice mode speaks the localised word and falls back to the step's
    /// tone, at the same time, when speech is unavailable.
    pub fn emit_countdown_step<S: ToneSink + SpeechSink + ?Sized>(
        &self,
        sink: &mut S,
        at_time: f64,
        step: u8,
    ) -> CountdownCue {
        match self.countdown_sound {
            CountdownSound::Mute => return CountdownCue::Muted,
            CountdownSound::Voice => {
                let words = self.language.countdown_words();
                let word = words[(step as usize).min(words.len() - 1)];
                if sink.speak(word, self.language.tag()) {
                    return CountdownCue::Spoken;
                }
                log::debug!("speech unavailable for '{}', using tone", word);
            }
            CountdownSound::Tone => {}
        }

        match self.emit(sink, at_time, CuePreset::Countdown(step)) {
            Ok(_) => CountdownCue::Toned,
            Err(e) => {
                log::warn!("countdown step {} silent: {}", step, e);
                CountdownCue::Dropped
            }
        }
    }
}
