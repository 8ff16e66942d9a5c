//! Signal-processing building blocks for the click synth and the echo bus.

pub mod delayline;
pub mod echo;
pub mod envelope;
pub mod filter;
pub mod pitch;
pub mod voice;
pub mod waveform;

pub use echo::EchoBus;
pub use pitch::PitchTable;
pub use voice::Voice;
pub use waveform::{Oscillator, Waveform};
