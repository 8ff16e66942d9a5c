/// Gain envelope that holds `start` at time zero and ramps exponentially to
/// `end` over `duration` seconds, then holds `end`.
#[derive(Debug, Clone)]
pub struct EnvelopeGenerator {
    pub start: f32,
    pub end: f32,
    pub duration: f32,
}

impl EnvelopeGenerator {
    pub fn new(start: f32, end: f32, duration: f32) -> Self {
        Self {
            start,
            end,
            duration,
        }
    }

    pub fn evaluate(&self, time_since_on: f32) -> f32 {
        if time_since_on <= 0.0 {
            self.start
        } else if time_since_on >= self.duration {
            self.end
        } else {
            let progress = time_since_on / self.duration;
            self.start * (self.end / self.start).powf(progress)
        }
    }
}

impl Default for EnvelopeGenerator {
    fn default() -> Self {
        Self {
            start: 0.3,
            end: 0.001,
            duration: 1.0,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_endpoints() {
        let env = EnvelopeGenerator::default();
        assert_relative_eq!(env.evaluate(0.0), 0.3);
        assert_relative_eq!(env.evaluate(1.0), 0.001);
        assert_relative_eq!(env.evaluate(5.0), 0.001);
    }

    #[test]
    fn test_exponential_midpoint() {
        // Geometric mean halfway through an exponential ramp.
        let env = EnvelopeGenerator::default();
        let expected = (0.3f32 * 0.001).sqrt();
        assert_relative_eq!(env.evaluate(0.5), expected, max_relative = 1e-4);
    }

    #[test]
    fn test_monotonic_decay() {
        let env = EnvelopeGenerator::default();
        let mut previous = env.evaluate(0.0);
        for step in 1..=100 {
            let value = env.evaluate(step as f32 / 100.0);
            assert!(value < previous);
            previous = value;
        }
    }
}
