const MIN_DELAY_SAMPLES: f32 = 1.0; // Minimum allowed delay in samples
const INTERPOLATION_POINTS_MARGIN: usize = 2; // For linear interpolation (idx, idx+1), effectively need 1 extra point. 2 is safe.

/// Fixed-length delay line with fractional (linearly interpolated) delay.
///
/// Reading and writing are split so a feedback path can read the delayed
/// sample, process it, and write it back in the same frame.
#[derive(Clone, Debug)]
pub struct DelayLine {
    buffer: Vec<f32>,
    write_pos: usize,
    delay_samples: f32,
    // Largest delay the buffer can serve given the interpolation margin.
    max_allowable_delay_samples: f32,
}

impl DelayLine {
    pub fn new(delay_samples: f32, max_delay_samples: f32) -> Self {
        let buffer_len = (max_delay_samples.max(MIN_DELAY_SAMPLES).ceil() as usize)
            + INTERPOLATION_POINTS_MARGIN;
        let max_allowable_delay_samples = (buffer_len - INTERPOLATION_POINTS_MARGIN) as f32;

        Self {
            buffer: vec![0.0; buffer_len],
            write_pos: 0,
            delay_samples: delay_samples.clamp(MIN_DELAY_SAMPLES, max_allowable_delay_samples),
            max_allowable_delay_samples,
        }
    }

    pub fn delay_samples(&self) -> f32 {
        self.delay_samples
    }

    pub fn set_delay_samples(&mut self, delay_samples: f32) {
        self.delay_samples =
            delay_samples.clamp(MIN_DELAY_SAMPLES, self.max_allowable_delay_samples);
    }

    /// Returns the sample written `delay_samples` frames before the next write.
    #[inline]
    pub fn read(&self) -> f32 {
        let buffer_len = self.buffer.len() as f32;
        let mut read_pos = self.write_pos as f32 - self.delay_samples;
        if read_pos < 0.0 {
            read_pos += buffer_len;
        }

        let idx_floor = read_pos.floor();
        let fraction = read_pos - idx_floor;
        let read_idx0 = (idx_floor as usize) % self.buffer.len();
        let read_idx1 = (read_idx0 + 1) % self.buffer.len();

        let val0 = self.buffer[read_idx0];
        let val1 = self.buffer[read_idx1];
        val0 + fraction * (val1 - val0)
    }

    #[inline]
    pub fn write(&mut self, input: f32) {
        self.buffer[self.write_pos] = input;
        self.write_pos = (self.write_pos + 1) % self.buffer.len();
    }

    #[inline]
    pub fn process(&mut self, input: f32) -> f32 {
        let output = self.read();
        self.write(input);
        output
    }
}
