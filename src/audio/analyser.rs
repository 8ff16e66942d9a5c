//! Spectrum analysis for the visuals.
//!
//! Mirrors the Web Audio analyser: a Blackman-windowed FFT over the most recent
//! `fft_size` input samples, smoothed over time and mapped from decibels to
//! bytes. The spectrum is only recomputed once new input has arrived, so the
//! smoothing follows rendered audio rather than how often it is read.

use std::f32::consts::PI;
use std::sync::Arc;

use rustfft::{num_complex::Complex, Fft, FftPlanner};

use crate::config::AnalyserConfig;

pub struct Analyser {
    config: AnalyserConfig,
    fft: Arc<dyn Fft<f32>>,
    // Ring of the most recent `fft_size` input samples.
    history: Vec<f32>,
    write_pos: usize,
    window: Vec<f32>,
    fft_buffer: Vec<Complex<f32>>,
    scratch: Vec<Complex<f32>>,
    smoothed: Vec<f32>,
    bytes: Vec<u8>,
    // Samples pushed since the spectrum was last computed.
    pending: usize,
}

impl Analyser {
    pub fn new(config: &AnalyserConfig) -> Self {
        let fft_size = config.fft_size;
        let mut planner = FftPlanner::new();
        let fft = planner.plan_fft_forward(fft_size);
        let scratch = vec![Complex::new(0.0, 0.0); fft.get_inplace_scratch_len()];

        Self {
            config: config.clone(),
            fft,
            history: vec![0.0; fft_size],
            write_pos: 0,
            window: (0..fft_size).map(|i| blackman_window(i, fft_size)).collect(),
            fft_buffer: vec![Complex::new(0.0, 0.0); fft_size],
            scratch,
            smoothed: vec![0.0; fft_size / 2],
            bytes: vec![0; fft_size / 2],
            pending: 0,
        }
    }

    #[inline]
    pub fn push_sample(&mut self, sample: f32) {
        self.history[self.write_pos] = sample;
        self.write_pos = (self.write_pos + 1) % self.history.len();
        self.pending += 1;
    }

    /// Writes byte magnitudes of the current input window into `out`, at most
    /// `fft_size / 2` values. Reading again before more input arrives returns
    /// the same bytes.
    pub fn get_byte_frequency_data(&mut self, out: &mut [u8]) {
        if self.pending > 0 {
            self.update_spectrum();
            self.update_bytes();
            self.pending = 0;
        }
        for (byte, cached) in out.iter_mut().zip(self.bytes.iter()) {
            *byte = *cached;
        }
    }

    fn update_bytes(&mut self) {
        let range_db = self.config.max_db - self.config.min_db;
        let scale = 255.0 / range_db;
        for (byte, magnitude) in self.bytes.iter_mut().zip(self.smoothed.iter()) {
            // log10(0) is -inf, which clamps to 0 below.
            let db = 20.0 * magnitude.log10();
            let scaled = (scale * (db - self.config.min_db)).floor();
            *byte = if scaled.is_nan() {
                0
            } else {
                scaled.clamp(0.0, 255.0) as u8
            };
        }
    }

    fn update_spectrum(&mut self) {
        let fft_size = self.config.fft_size;
        // Oldest sample first.
        for i in 0..fft_size {
            let sample = self.history[(self.write_pos + i) % fft_size];
            self.fft_buffer[i] = Complex::new(sample * self.window[i], 0.0);
        }

        self.fft
            .process_with_scratch(&mut self.fft_buffer, &mut self.scratch);

        let tau = self.config.smoothing;
        let norm = 1.0 / fft_size as f32;
        for (k, smoothed) in self.smoothed.iter_mut().enumerate() {
            let magnitude = self.fft_buffer[k].norm() * norm;
            let value = tau * *smoothed + (1.0 - tau) * magnitude;
            *smoothed = if value.is_finite() { value } else { 0.0 };
        }
    }
}

/// Blackman window (alpha = 0.16) as used by the Web Audio analyser.
pub fn blackman_window(index: usize, size: usize) -> f32 {
    let a0 = 0.42;
    let a1 = 0.5;
    let a2 = 0.08;
    let x = index as f32 / size as f32;
    a0 - a1 * (2.0 * PI * x).cos() + a2 * (4.0 * PI * x).cos()
}

/// Mean of the first `bins` spectrum values; bins past the end count as zero.
/// Returns 0 for an empty spectrum.
pub fn bass_energy(spectrum: &[u8], bins: usize) -> f32 {
    if spectrum.is_empty() || bins == 0 {
        return 0.0;
    }
    let sum: u32 = spectrum.iter().take(bins).map(|v| u32::from(*v)).sum();
    sum as f32 / bins as f32
}
