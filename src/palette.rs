//! Note colors for the visuals.

/// One color per pitch-table slot, left to right.
pub const SYNTH_COLORS: [[u8; 3]; 10] = [
    [0xFF, 0x00, 0x55],
    [0xFF, 0x00, 0xCC],
    [0xCC, 0x00, 0xFF],
    [0x00, 0x99, 0xFF],
    [0x00, 0xFF, 0xCC],
    [0x00, 0xFF, 0x00],
    [0xFF, 0xFF, 0x00],
    [0xFF, 0x99, 0x00],
    [0xFF, 0x33, 0x33],
    [0xFF, 0xFF, 0xFF],
];

/// Color for a note index as returned by
/// [`AudioEngine::play_synth`](crate::AudioEngine::play_synth). Indices
/// outside the table wrap around, negative ones included.
pub fn note_color(index: i32) -> [u8; 3] {
    let slot = index.rem_euclid(SYNTH_COLORS.len() as i32) as usize;
    SYNTH_COLORS[slot]
}

/// `#RRGGBB` form of a color.
pub fn to_hex(color: [u8; 3]) -> String {
    format!("#{:02X}{:02X}{:02X}", color[0], color[1], color[2])
}
