mod keyboard;

pub use self::keyboard::{key_position, KeyboardHandler};

/// What a key press asks the instrument to do.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum InstrumentCommand {
    /// Play a note at a horizontal position in [0, 1).
    Note(f32),
    TogglePlay,
    ChangeTrack(i32),
    Quit,
}
