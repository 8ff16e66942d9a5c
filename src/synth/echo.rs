use super::delayline::DelayLine;
use super::filter::LowPassBiquad;
use crate::config::EchoConfig;

/// Shared echo send: delay -> lowpass -> feedback gain -> back into the delay.
///
/// The delay output is the bus output. Each repeat is darker and quieter than
/// the last because it passes through the filter and the feedback gain again.
#[derive(Clone, Debug)]
pub struct EchoBus {
    delay: DelayLine,
    filter: LowPassBiquad,
    feedback: f32,
}

impl EchoBus {
    pub fn new(config: &EchoConfig, sample_rate: f32) -> Self {
        Self {
            delay: DelayLine::new(
                config.delay_seconds * sample_rate,
                config.max_delay_seconds * sample_rate,
            ),
            filter: LowPassBiquad::new(config.cutoff_hz, config.q, sample_rate),
            feedback: config.feedback,
        }
    }

    pub fn delay_samples(&self) -> f32 {
        self.delay.delay_samples()
    }

    /// Feeds one input sample into the bus and returns the bus output.
    #[inline]
    pub fn process(&mut self, input: f32) -> f32 {
        let delayed = self.delay.read();
        let fed_back = self.filter.process(delayed) * self.feedback;
        self.delay.write(input + fed_back);
        delayed
    }
}
