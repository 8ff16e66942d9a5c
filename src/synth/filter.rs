use core::f32::consts::PI;

#[derive(Clone, Debug, Default)]
pub struct LowPassBiquad {
    cutoff: f32,
    b0: f32,
    b1: f32,
    b2: f32,
    a1: f32,
    a2: f32,
    x1: f32,
    x2: f32,
    y1: f32,
    y2: f32,
}

impl LowPassBiquad {
    pub fn new(cutoff: f32, q: f32, sample_rate: f32) -> Self {
        let sample_rate = sample_rate.max(1.0);
        // Keep the cutoff below Nyquist.
        let cutoff = cutoff.max(1.0).min(sample_rate * 0.49);
        let q = q.max(1e-3);

        // RBJ Audio EQ Cookbook low-pass.
        let omega = 2.0 * PI * cutoff / sample_rate;
        let cos_omega = omega.cos();
        let sin_omega = omega.sin();
        let alpha = sin_omega / (2.0 * q);

        let b0 = (1.0 - cos_omega) / 2.0;
        let b1 = 1.0 - cos_omega;
        let b2 = (1.0 - cos_omega) / 2.0;
        let a0 = 1.0 + alpha;
        let a1 = -2.0 * cos_omega;
        let a2 = 1.0 - alpha;

        Self {
            cutoff,
            b0: b0 / a0,
            b1: b1 / a0,
            b2: b2 / a0,
            a1: a1 / a0,
            a2: a2 / a0,
            ..Default::default()
        }
    }

    pub fn cutoff(&self) -> f32 {
        self.cutoff
    }

    /// Direct Form I:
    /// y[n] = b0*x[n] + b1*x[n-1] + b2*x[n-2] - a1*y[n-1] - a2*y[n-2]
    #[inline]
    pub fn process(&mut self, input: f32) -> f32 {
        let output = self.b0 * input + self.b1 * self.x1 + self.b2 * self.x2
            - self.a1 * self.y1
            - self.a2 * self.y2;

        self.x2 = self.x1;
        self.x1 = input;
        self.y2 = self.y1;
        self.y1 = output;

        output
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::synth::waveform::{Oscillator, Waveform};

    fn steady_state_peak(filter: &mut LowPassBiquad, frequency: f32, sample_rate: f32) -> f32 {
        let mut osc = Oscillator::new(Waveform::Sine, frequency);
        // Let the filter settle before measuring.
        for _ in 0..4096 {
            filter.process(osc.next_sample(sample_rate));
        }
        (0..4096)
            .map(|_| filter.process(osc.next_sample(sample_rate)).abs())
            .fold(0.0, f32::max)
    }

    #[test]
    fn test_passes_dc() {
        let mut filter = LowPassBiquad::new(2000.0, core::f32::consts::FRAC_1_SQRT_2, 48_000.0);
        let mut out = 0.0;
        for _ in 0..2000 {
            out = filter.process(1.0);
        }
        assert!((out - 1.0).abs() < 1e-3);
    }

    #[test]
    fn test_attenuates_above_cutoff() {
        let q = core::f32::consts::FRAC_1_SQRT_2;
        let low = steady_state_peak(&mut LowPassBiquad::new(2000.0, q, 48_000.0), 200.0, 48_000.0);
        let high = steady_state_peak(&mut LowPassBiquad::new(2000.0, q, 48_000.0), 12_000.0, 48_000.0);
        assert!(low > 0.95, "passband peak {}", low);
        assert!(high < 0.1, "stopband peak {}", high);
    }

    #[test]
    fn test_cutoff_clamped_below_nyquist() {
        let filter = LowPassBiquad::new(30_000.0, 1.0, 44_100.0);
        assert!(filter.cutoff() < 22_050.0);
    }
}
