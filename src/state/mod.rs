// src/state/mod.rs
//
// Declarative state layer shared with the host.
//
// This module contains what the host configures (programs, countdown
// sound, auto-restart, language) and what it reads back (lifecycle
// state, status, readout). Nothing here touches the clock or the audio
// sinks; the scheduler and controller do that.

mod config;
mod program;
mod session;

pub use config::*;
pub use program::*;
pub use session::*;
