// src/main.rs
//
// Offline session simulation against a virtual clock.
//
//     cadence-sim [mode] [countdown] [language]
//
// mode: accel | steady | random | ecc | hsr
// countdown: none | beep | voice
// language: en | fr

use cadence::{
    CadenceProgram, Clock, CountdownSound, HsrSettings, Language, ManualClock, Mode,
    POLL_INTERVAL_MS, SessionController, SessionState, SpeechSink, Tone, ToneSink,
    TrainerConfig, WakeHold,
};

/// Longest simulated run, in seconds.
const MAX_SIMULATED_SECONDS: f64 = 900.0;

/// ===============================
/// Virtual Host
/// ===============================

struct SimHost {
    clock: ManualClock,
    tones: usize,
}

impl Clock for SimHost {
    fn now(&self) -> f64 {
        self.clock.now()
    }
}

impl ToneSink for SimHost {
    fn schedule_tone(&mut self, tone: &Tone) -> Result<(), String> {
        self.tones += 1;
        println!(
            "  [{:8.3}] tone {:6.1} Hz  {:.2}s  gain {:.2}",
            tone.at_time, tone.frequency_hz, tone.duration_seconds, tone.gain
        );
        Ok(())
    }
}

impl SpeechSink for SimHost {
    fn speak(&mut self, text: &str, language_tag: &str) -> bool {
        println!("  [{:8.3}] say \"{}\" ({})", self.clock.now(), text, language_tag);
        true
    }

    fn cancel_speech(&mut self) {
        println!("  [{:8.3}] speech cancelled", self.clock.now());
    }
}

impl WakeHold for SimHost {
    fn acquire_wake(&mut self) {
        println!("  [{:8.3}] wake hold acquired", self.clock.now());
    }

    fn release_wake(&mut self) {
        println!("  [{:8.3}] wake hold released", self.clock.now());
    }
}

/// Short demonstration program for each mode.
fn demo_program(mode: Mode) -> CadenceProgram {
    match mode {
        Mode::Progressive => CadenceProgram::progressive(40.0, 60.0, 20.0),
        Mode::Steady => CadenceProgram::steady(90.0, 10.0),
        Mode::Random => CadenceProgram::random(40.0, 80.0, 15.0),
        Mode::Eccentric => CadenceProgram::eccentric(1.0, 2.0, 6.0, 3.0),
        Mode::Hsr => CadenceProgram::hsr(HsrSettings {
            sets: 2.0,
            reps_per_set: 2.0,
            concentric_seconds: 3.0,
            eccentric_seconds: 3.0,
            top_hold_seconds: 1.0,
            bottom_hold_seconds: 0.0,
            inter_rep_rest_seconds: 2.0,
            inter_set_rest_seconds: 5.0,
        }),
    }
}

/// ===============================
/// Main
/// ===============================

fn main() {
    let mut args = std::env::args().skip(1);

    let mode = match args.next().map(|a| a.parse::<Mode>()) {
        Some(Ok(mode)) => mode,
        Some(Err(e)) => {
            eprintln!("{}", e);
            std::process::exit(2);
        }
        None => Mode::Progressive,
    };
    let countdown_sound = args
        .next()
        .and_then(|a| a.parse::<CountdownSound>().ok())
        .unwrap_or_default();
    let language = args
        .next()
        .and_then(|a| a.parse::<Language>().ok())
        .unwrap_or_default();

    let config = TrainerConfig::new(demo_program(mode))
        .with_countdown_sound(countdown_sound)
        .with_language(language);

    let host = SimHost {
        clock: ManualClock::new(0.0),
        tones: 0,
    };
    let mut controller = SessionController::new(host, config);
    let step = POLL_INTERVAL_MS as f64 / 1000.0;

    println!("Simulating {} session…", mode);

    if let Err(e) = controller.start() {
        eprintln!("start failed: {}", e);
        std::process::exit(1);
    }

    let mut last_label = None;

    while controller.host().now() < MAX_SIMULATED_SECONDS {
        let state = controller.poll();

        let events: Vec<_> = controller.drain_events().collect();
        for event in events {
            println!("  [{:8.3}] event {}", controller.host().now(), event.name());
        }

        let readout = controller.readout();
        if readout.phase_label != last_label {
            if let Some(label) = &readout.phase_label {
                println!("  [{:8.3}] {}", controller.host().now(), label);
            }
            last_label = readout.phase_label;
        }

        if matches!(
            state,
            SessionState::Finished | SessionState::Stopped | SessionState::Idle
        ) {
            break;
        }
        controller.host().clock.advance(step);
    }

    println!(
        "Simulation ended at {:.3}s: {} ({} tones).",
        controller.host().now(),
        controller.status_text(),
        controller.host().tones
    );
}
