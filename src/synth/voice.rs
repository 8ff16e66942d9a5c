use super::envelope::EnvelopeGenerator;
use super::waveform::Oscillator;
use crate::config::SynthConfig;

/// One click-triggered note: a few detuned oscillators summed under a shared
/// decaying gain envelope.
///
/// A voice is scheduled on the context's sample clock. It is silent before
/// `start_frame`, all oscillators stop at `stop_frame`, and the graph drops it
/// once that frame has been rendered.
#[derive(Debug, Clone)]
pub struct Voice {
    oscillators: Vec<Oscillator>,
    envelope: EnvelopeGenerator,
    pub frequency: f32,
    start_frame: u64,
    stop_frame: u64,
}

impl Voice {
    pub fn new(frequency: f32, start_frame: u64, sample_rate: f32, config: &SynthConfig) -> Self {
        let oscillators = config
            .oscillators
            .iter()
            .map(|spec| Oscillator::new(spec.waveform, frequency + spec.detune_hz))
            .collect();
        let length_frames = (config.note_seconds * sample_rate).round() as u64;

        Self {
            oscillators,
            envelope: EnvelopeGenerator::new(
                config.peak_gain,
                config.floor_gain,
                config.note_seconds,
            ),
            frequency,
            start_frame,
            stop_frame: start_frame + length_frames,
        }
    }

    pub fn start_frame(&self) -> u64 {
        self.start_frame
    }

    pub fn stop_frame(&self) -> u64 {
        self.stop_frame
    }

    pub fn oscillators(&self) -> &[Oscillator] {
        &self.oscillators
    }

    /// Renders the voice's contribution at absolute frame `frame`.
    #[inline]
    pub fn next_sample(&mut self, frame: u64, sample_rate: f32) -> f32 {
        if frame < self.start_frame || frame >= self.stop_frame {
            return 0.0;
        }
        let time_since_on = (frame - self.start_frame) as f32 / sample_rate;
        let gain = self.envelope.evaluate(time_since_on);
        let raw: f32 = self
            .oscillators
            .iter_mut()
            .map(|osc| osc.next_sample(sample_rate))
            .sum();
        raw * gain
    }

    /// True once every frame up to the scheduled stop has been rendered.
    pub fn is_finished(&self, frames_rendered: u64) -> bool {
        frames_rendered >= self.stop_frame
    }
}
