//! Play/pause, track stepping and file loading on top of the engine, as the
//! control panel drives them.

use log::info;

use crate::audio::TrackInput;
use crate::engine::AudioEngine;
use crate::playlist::Playlist;

pub struct Transport {
    playlist: Playlist,
    playing: bool,
    started: bool,
    custom_track: Option<String>,
}

impl Transport {
    pub fn new(playlist: Playlist) -> Self {
        Self {
            playlist,
            playing: false,
            started: false,
            custom_track: None,
        }
    }

    pub fn is_playing(&self) -> bool {
        self.playing
    }

    /// True once any track has been requested.
    pub fn is_started(&self) -> bool {
        self.started
    }

    /// Name shown in the control panel: the loaded file if there is one,
    /// otherwise the current playlist entry.
    pub fn track_label(&self) -> &str {
        self.custom_track
            .as_deref()
            .unwrap_or(&self.playlist.current().name)
    }

    /// The first press starts the current playlist track; later presses
    /// pause and resume.
    pub fn toggle_play(&mut self, engine: &mut AudioEngine) {
        if !self.started {
            let locator = self.playlist.current().locator.clone();
            engine.play_track(TrackInput::locator(locator));
            self.started = true;
            self.playing = true;
            return;
        }

        if self.playing {
            engine.pause();
        } else {
            engine.resume();
        }
        self.playing = !self.playing;
    }

    /// Steps the playlist by `delta` and plays the new entry.
    pub fn change_track(&mut self, engine: &mut AudioEngine, delta: i32) {
        let entry = self.playlist.step(delta).clone();
        info!("Switching to {}", entry.name);
        self.custom_track = None;
        engine.play_track(TrackInput::locator(entry.locator));
        self.playing = true;
        self.started = true;
    }

    /// Plays a file the user dropped. The label only changes if it plays.
    pub fn load_file(&mut self, engine: &mut AudioEngine, file: TrackInput) -> bool {
        let label = format!("File: {}", file.name());
        if !engine.play_track(file) {
            return false;
        }
        self.custom_track = Some(label);
        self.playing = true;
        self.started = true;
        true
    }

    /// A synth click resumes a paused engine, so the panel shows playing again.
    pub fn note_interaction(&mut self) {
        if self.started && !self.playing {
            self.playing = true;
        }
    }
}

impl Default for Transport {
    fn default() -> Self {
        Self::new(Playlist::default())
    }
}
