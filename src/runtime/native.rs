//! Terminal instrument: keyboard in, speakers out, bass energy in the log.

use std::path::Path;
use std::sync::mpsc::{channel, Receiver};
use std::thread;
use std::time::{Duration, Instant};

use log::{error, info};

use crate::audio::TrackInput;
use crate::config::EngineConfig;
use crate::engine::AudioEngine;
use crate::error::EngineError;
use crate::input::{InstrumentCommand, KeyboardHandler};
use crate::palette::{note_color, to_hex};
use crate::playlist::Playlist;
use crate::transport::Transport;

const POLL_INTERVAL: Duration = Duration::from_millis(10);
const HUD_INTERVAL: Duration = Duration::from_millis(500);

/// The engine plus the control state a UI would keep next to it.
pub struct Instrument {
    engine: AudioEngine,
    transport: Transport,
    command_receiver: Receiver<InstrumentCommand>,
}

impl Instrument {
    pub fn new(config: EngineConfig, command_receiver: Receiver<InstrumentCommand>) -> Self {
        let transport = Transport::new(Playlist::new(config.playlist.clone()));
        Self {
            engine: AudioEngine::new(config),
            transport,
            command_receiver,
        }
    }

    pub fn load_file(&mut self, path: &Path) -> Result<(), EngineError> {
        let file = TrackInput::from_file(path)?;
        if !self.transport.load_file(&mut self.engine, file) {
            error!("Could not play {}", path.display());
        }
        Ok(())
    }

    /// Handles queued commands. Returns `false` once asked to quit.
    pub fn process_commands(&mut self) -> bool {
        while let Ok(command) = self.command_receiver.try_recv() {
            match command {
                InstrumentCommand::Note(x_ratio) => {
                    let index = self.engine.play_synth(x_ratio);
                    self.transport.note_interaction();
                    info!("Note {} {}", index, to_hex(note_color(index)));
                }
                InstrumentCommand::TogglePlay => {
                    self.transport.toggle_play(&mut self.engine);
                    info!(
                        "{} {}",
                        if self.transport.is_playing() { "Playing" } else { "Paused" },
                        self.transport.track_label()
                    );
                }
                InstrumentCommand::ChangeTrack(delta) => {
                    self.transport.change_track(&mut self.engine, delta);
                }
                InstrumentCommand::Quit => return false,
            }
        }
        true
    }

    fn report(&mut self) {
        let Some(state) = self.engine.get_state() else {
            return;
        };
        let bass = self.engine.bass_energy();
        info!(
            "[{}] {} | bass {:>3} | voices {}",
            state,
            self.transport.track_label(),
            bass.floor(),
            self.engine.active_voice_count()
        );
    }
}

/// Runs the instrument until Escape is pressed.
pub fn run(config: EngineConfig, initial_file: Option<&Path>) -> Result<(), EngineError> {
    let (command_tx, command_rx) = channel();
    let mut keyboard_handler = KeyboardHandler::new(command_tx);
    let mut instrument = Instrument::new(config, command_rx);

    if let Some(path) = initial_file {
        instrument.load_file(path)?;
    }

    info!("Keys 1-0 play notes, Space plays/pauses, Left/Right change track, Esc quits");

    let mut last_report = Instant::now();
    loop {
        keyboard_handler.update();
        if !instrument.process_commands() {
            break;
        }

        if last_report.elapsed() >= HUD_INTERVAL {
            instrument.report();
            last_report = Instant::now();
        }

        thread::sleep(POLL_INTERVAL);
    }

    info!("Bye");
    Ok(())
}
