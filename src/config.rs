//! Engine configuration.
//!
//! Every value has a default matching the instrument's stock sound, so an
//! empty JSON object is a valid config file.

use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::EngineError;
use crate::playlist::PlaylistEntry;
use crate::synth::waveform::Waveform;

/// Pentatonic scale played across the width of the screen, left to right.
pub const PENTATONIC_SCALE: [f32; 10] = [
    196.0, 220.0, 261.63, 293.66, 329.63, 392.0, 440.0, 523.25, 587.33, 659.25,
];

/// Top-level configuration for an [`AudioEngine`](crate::AudioEngine).
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    pub analyser: AnalyserConfig,
    pub echo: EchoConfig,
    pub synth: SynthConfig,
    /// Number of lowest spectrum bins averaged into the bass-energy readout.
    pub bass_bins: usize,
    /// Directory that non-URL locators are resolved against.
    pub asset_root: Option<PathBuf>,
    pub playlist: Vec<PlaylistEntry>,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            analyser: AnalyserConfig::default(),
            echo: EchoConfig::default(),
            synth: SynthConfig::default(),
            bass_bins: 20,
            asset_root: None,
            playlist: PlaylistEntry::defaults(),
        }
    }
}

impl EngineConfig {
    /// Reads and validates a JSON config file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, EngineError> {
        let text = fs::read_to_string(path.as_ref())?;
        let config: EngineConfig = serde_json::from_str(&text)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), EngineError> {
        self.analyser.validate()?;
        self.echo.validate()?;
        self.synth.validate()?;
        if self.playlist.is_empty() {
            return Err(EngineError::Config("playlist must not be empty".into()));
        }
        Ok(())
    }
}

/// Spectrum analyser settings (Web Audio analyser semantics).
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AnalyserConfig {
    /// FFT window size; the spectrum has `fft_size / 2` bins.
    pub fft_size: usize,
    /// Weight of the previous frame when smoothing magnitudes over time.
    pub smoothing: f32,
    /// Level mapped to byte value 0.
    pub min_db: f32,
    /// Level mapped to byte value 255.
    pub max_db: f32,
}

impl Default for AnalyserConfig {
    fn default() -> Self {
        Self {
            fft_size: 512,
            smoothing: 0.8,
            min_db: -100.0,
            max_db: -30.0,
        }
    }
}

impl AnalyserConfig {
    pub fn bin_count(&self) -> usize {
        self.fft_size / 2
    }

    pub fn validate(&self) -> Result<(), EngineError> {
        if !self.fft_size.is_power_of_two() || !(32..=32768).contains(&self.fft_size) {
            return Err(EngineError::Config(format!(
                "FFT size must be a power of 2 between 32 and 32768, got {}",
                self.fft_size
            )));
        }
        if !(0.0..=1.0).contains(&self.smoothing) {
            return Err(EngineError::Config(format!(
                "smoothing must be within [0, 1], got {}",
                self.smoothing
            )));
        }
        if self.min_db >= self.max_db {
            return Err(EngineError::Config(format!(
                "min_db ({}) must be below max_db ({})",
                self.min_db, self.max_db
            )));
        }
        Ok(())
    }
}

/// Shared echo bus: delay -> lowpass -> feedback gain -> delay.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct EchoConfig {
    pub delay_seconds: f32,
    /// Capacity of the delay buffer.
    pub max_delay_seconds: f32,
    pub cutoff_hz: f32,
    pub q: f32,
    pub feedback: f32,
}

impl Default for EchoConfig {
    fn default() -> Self {
        Self {
            delay_seconds: 0.35,
            max_delay_seconds: 1.0,
            cutoff_hz: 2000.0,
            q: std::f32::consts::FRAC_1_SQRT_2,
            feedback: 0.4,
        }
    }
}

impl EchoConfig {
    pub fn validate(&self) -> Result<(), EngineError> {
        if self.delay_seconds <= 0.0 || self.delay_seconds > self.max_delay_seconds {
            return Err(EngineError::Config(format!(
                "echo delay must be within (0, {}] seconds, got {}",
                self.max_delay_seconds, self.delay_seconds
            )));
        }
        // Unity or higher feedback never dies out.
        if !(0.0..1.0).contains(&self.feedback) {
            return Err(EngineError::Config(format!(
                "echo feedback must be within [0, 1), got {}",
                self.feedback
            )));
        }
        if self.cutoff_hz <= 0.0 || self.q <= 0.0 {
            return Err(EngineError::Config(
                "echo filter cutoff and Q must be positive".into(),
            ));
        }
        Ok(())
    }
}

/// One oscillator of a synth voice.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct OscillatorSpec {
    pub waveform: Waveform,
    /// Offset from the note frequency, in Hz.
    pub detune_hz: f32,
}

/// Click-synth settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SynthConfig {
    pub scale: Vec<f32>,
    /// Used when a position falls outside the scale.
    pub fallback_frequency_hz: f32,
    pub peak_gain: f32,
    pub floor_gain: f32,
    pub note_seconds: f32,
    pub oscillators: Vec<OscillatorSpec>,
}

impl Default for SynthConfig {
    fn default() -> Self {
        Self {
            scale: PENTATONIC_SCALE.to_vec(),
            fallback_frequency_hz: 440.0,
            peak_gain: 0.3,
            floor_gain: 0.001,
            note_seconds: 1.0,
            oscillators: vec![
                OscillatorSpec {
                    waveform: Waveform::Sawtooth,
                    detune_hz: 2.0,
                },
                OscillatorSpec {
                    waveform: Waveform::Sawtooth,
                    detune_hz: 0.0,
                },
                OscillatorSpec {
                    waveform: Waveform::Square,
                    detune_hz: -2.0,
                },
            ],
        }
    }
}

impl SynthConfig {
    pub fn validate(&self) -> Result<(), EngineError> {
        if self.scale.is_empty() {
            return Err(EngineError::Config("synth scale must not be empty".into()));
        }
        // The exponential ramp is undefined towards or from zero.
        if self.peak_gain <= 0.0 || self.floor_gain <= 0.0 {
            return Err(EngineError::Config(
                "synth envelope gains must be positive".into(),
            ));
        }
        if self.note_seconds <= 0.0 {
            return Err(EngineError::Config(format!(
                "note length must be positive, got {}",
                self.note_seconds
            )));
        }
        Ok(())
    }
}
