//! neonsynth - audio engine core for an audio-reactive visual instrument.
//!
//! The [`AudioEngine`] owns the audio graph: one looping background track, an
//! analyser feeding the visuals, short synth voices triggered by clicks and a
//! shared echo bus. Everything visual lives outside this crate and talks to the
//! engine through a handful of calls.

pub mod audio;
pub mod config;
pub mod engine;
pub mod error;
pub mod palette;
pub mod playlist;
pub mod synth;
pub mod transport;

#[cfg(feature = "native")]
pub mod input;
#[cfg(feature = "native")]
pub mod runtime;

pub use audio::{ContextState, OfflineBackend, OfflineHandle, TrackInput};
pub use config::EngineConfig;
pub use engine::{AudioEngine, LoadOutcome, PendingLoad, SourceId};
pub use error::EngineError;
