/// Ordered note frequencies addressed by a normalized horizontal position.
#[derive(Debug, Clone)]
pub struct PitchTable {
    frequencies: Vec<f32>,
    fallback_hz: f32,
}

impl PitchTable {
    pub fn new(frequencies: Vec<f32>, fallback_hz: f32) -> Self {
        Self {
            frequencies,
            fallback_hz,
        }
    }

    pub fn len(&self) -> usize {
        self.frequencies.len()
    }

    pub fn is_empty(&self) -> bool {
        self.frequencies.is_empty()
    }

    /// `floor(x_ratio * len)`. Positions outside [0, 1) give indices outside
    /// the table; non-finite positions give -1.
    pub fn index_for(&self, x_ratio: f32) -> i32 {
        if !x_ratio.is_finite() {
            return -1;
        }
        // `as` saturates at the i32 bounds.
        (x_ratio * self.frequencies.len() as f32).floor() as i32
    }

    /// Frequency for `index`, or the fallback when it is out of range.
    pub fn frequency(&self, index: i32) -> f32 {
        usize::try_from(index)
            .ok()
            .and_then(|i| self.frequencies.get(i))
            .copied()
            .unwrap_or(self.fallback_hz)
    }
}
