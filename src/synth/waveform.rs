use core::f32::consts::{PI, TAU};

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Waveform {
    Sine,
    Square,
    Sawtooth,
    Triangle,
}

impl Waveform {
    /// Evaluates the waveform at `phase` radians. Every shape starts at or
    /// near zero and stays within [-1, 1].
    pub fn evaluate(self, phase: f32) -> f32 {
        match self {
            Waveform::Sine => phase.sin(),
            Waveform::Square => {
                if phase.sin() >= 0.0 {
                    1.0
                } else {
                    -1.0
                }
            }
            Waveform::Sawtooth => {
                let cycles = phase / TAU;
                2.0 * (cycles - (cycles + 0.5).floor())
            }
            Waveform::Triangle => (2.0 / PI) * (phase.sin()).asin(),
        }
    }
}

/// A free-running oscillator with its own phase accumulator.
#[derive(Debug, Clone)]
pub struct Oscillator {
    waveform: Waveform,
    frequency: f32,
    phase: f32,
}

impl Oscillator {
    pub fn new(waveform: Waveform, frequency: f32) -> Self {
        Self {
            waveform,
            // Negative frequencies would run the phase backwards.
            frequency: frequency.max(0.0),
            phase: 0.0,
        }
    }

    pub fn waveform(&self) -> Waveform {
        self.waveform
    }

    pub fn frequency(&self) -> f32 {
        self.frequency
    }

    #[inline]
    pub fn next_sample(&mut self, sample_rate: f32) -> f32 {
        let value = self.waveform.evaluate(self.phase);
        self.phase += TAU * self.frequency / sample_rate;
        if self.phase >= TAU {
            self.phase %= TAU;
        }
        value
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_waveforms_stay_in_range() {
        for waveform in [
            Waveform::Sine,
            Waveform::Square,
            Waveform::Sawtooth,
            Waveform::Triangle,
        ] {
            let mut osc = Oscillator::new(waveform, 440.0);
            for _ in 0..4800 {
                let s = osc.next_sample(48_000.0);
                assert!((-1.0..=1.0).contains(&s), "{:?} produced {}", waveform, s);
            }
        }
    }

    #[test]
    fn test_square_is_bipolar() {
        assert_eq!(Waveform::Square.evaluate(0.5), 1.0);
        assert_eq!(Waveform::Square.evaluate(PI + 0.5), -1.0);
    }

    #[test]
    fn test_sawtooth_ramps_through_zero() {
        assert!(Waveform::Sawtooth.evaluate(0.0).abs() < 1e-6);
        assert!(Waveform::Sawtooth.evaluate(PI * 0.5) > 0.4);
        assert!(Waveform::Sawtooth.evaluate(PI * 1.5) < -0.4);
    }

    #[test]
    fn test_oscillator_period() {
        // 100 Hz at 1000 Hz sample rate repeats every 10 samples.
        let mut osc = Oscillator::new(Waveform::Sine, 100.0);
        let first: Vec<f32> = (0..10).map(|_| osc.next_sample(1000.0)).collect();
        let second: Vec<f32> = (0..10).map(|_| osc.next_sample(1000.0)).collect();
        for (a, b) in first.iter().zip(second.iter()) {
            assert!((a - b).abs() < 1e-3);
        }
    }
}
