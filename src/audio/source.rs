use std::sync::Arc;

use super::buffer::AudioBuffer;

/// Identifies one playback source for the lifetime of an engine.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SourceId(pub(crate) u64);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SourceState {
    Playing,
    /// Reached the end of a non-looping buffer.
    Ended,
    Stopped,
}

/// Plays a decoded buffer into the graph, resampling it to the context rate
/// with linear interpolation.
#[derive(Debug, Clone)]
pub struct TrackSource {
    id: SourceId,
    buffer: Arc<AudioBuffer>,
    position: f64, // Fractional read position in buffer frames
    rate: f64,     // Buffer frames advanced per output frame
    looping: bool,
    state: SourceState,
}

impl TrackSource {
    pub fn new(id: SourceId, buffer: Arc<AudioBuffer>, context_sample_rate: f32) -> Self {
        let rate = if context_sample_rate > 0.0 {
            buffer.sample_rate() as f64 / context_sample_rate as f64
        } else {
            1.0
        };
        Self {
            id,
            buffer,
            position: 0.0,
            rate,
            looping: true,
            state: SourceState::Playing,
        }
    }

    pub fn id(&self) -> SourceId {
        self.id
    }

    pub fn state(&self) -> SourceState {
        self.state
    }

    pub fn set_looping(&mut self, looping: bool) {
        self.looping = looping;
    }

    pub fn stop(&mut self) {
        self.state = SourceState::Stopped;
    }

    /// Adds one output frame to `out` (one slot per output channel) and returns
    /// the mono downmix of the frame, which is what the analyser sees.
    pub fn render_frame(&mut self, out: &mut [f32]) -> f32 {
        let frames = self.buffer.frames();
        let num_channels = self.buffer.num_channels();
        if self.state != SourceState::Playing || frames == 0 {
            return 0.0;
        }

        let idx0 = (self.position as usize).min(frames - 1);
        let fraction = (self.position - idx0 as f64) as f32;
        let idx1 = if idx0 + 1 < frames {
            idx0 + 1
        } else if self.looping {
            0
        } else {
            idx0
        };
        let sample = |channel: usize| {
            let data = self.buffer.channel(channel);
            data[idx0] + fraction * (data[idx1] - data[idx0])
        };

        let mono = (0..num_channels).map(sample).sum::<f32>() / num_channels as f32;

        // Mono sources go to every output channel, a mono output gets the
        // downmix, otherwise channels map one to one.
        let out_channels = out.len();
        for (channel, slot) in out.iter_mut().enumerate() {
            *slot += if num_channels == 1 || out_channels == 1 {
                mono
            } else if channel < num_channels {
                sample(channel)
            } else {
                0.0
            };
        }

        self.position += self.rate;
        if self.position >= frames as f64 {
            if self.looping {
                self.position %= frames as f64;
            } else {
                self.state = SourceState::Ended;
            }
        }

        mono
    }
}
