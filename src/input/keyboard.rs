use std::collections::HashMap;
use std::sync::mpsc::Sender;

use device_query::{DeviceQuery, DeviceState, Keycode};
use log::{debug, error};

use super::InstrumentCommand;

/// Number row, left to right across the screen.
const NOTE_KEYS: [Keycode; 10] = [
    Keycode::Key1,
    Keycode::Key2,
    Keycode::Key3,
    Keycode::Key4,
    Keycode::Key5,
    Keycode::Key6,
    Keycode::Key7,
    Keycode::Key8,
    Keycode::Key9,
    Keycode::Key0,
];

/// Center of key `slot`'s strip, as a fraction of the width.
pub fn key_position(slot: usize) -> f32 {
    (slot as f32 + 0.5) / NOTE_KEYS.len() as f32
}

/// Polls the keyboard and turns fresh key presses into commands.
pub struct KeyboardHandler {
    device_state: DeviceState,
    key_states: HashMap<Keycode, bool>,
    key_to_command: HashMap<Keycode, InstrumentCommand>,
    command_sender: Sender<InstrumentCommand>,
}

impl KeyboardHandler {
    pub fn new(command_sender: Sender<InstrumentCommand>) -> Self {
        let mut key_to_command: HashMap<Keycode, InstrumentCommand> = NOTE_KEYS
            .iter()
            .enumerate()
            .map(|(slot, key)| (*key, InstrumentCommand::Note(key_position(slot))))
            .collect();
        key_to_command.insert(Keycode::Space, InstrumentCommand::TogglePlay);
        key_to_command.insert(Keycode::Left, InstrumentCommand::ChangeTrack(-1));
        key_to_command.insert(Keycode::Right, InstrumentCommand::ChangeTrack(1));
        key_to_command.insert(Keycode::Escape, InstrumentCommand::Quit);

        // Initialize all keys as not pressed
        let key_states = key_to_command.keys().map(|key| (*key, false)).collect();

        Self {
            device_state: DeviceState::new(),
            key_states,
            key_to_command,
            command_sender,
        }
    }

    /// Sends one command per key that went down since the last call.
    pub fn update(&mut self) {
        let keys: Vec<Keycode> = self.device_state.get_keys();

        for (key, command) in &self.key_to_command {
            let is_pressed = keys.contains(key);
            let was_pressed = self.key_states.get(key).copied().unwrap_or(false);

            if is_pressed && !was_pressed {
                debug!("Key '{:?}' pressed - sending {:?}", key, command);
                if let Err(e) = self.command_sender.send(*command) {
                    error!("Error sending command: {}", e);
                }
            }
            self.key_states.insert(*key, is_pressed);
        }
    }
}
