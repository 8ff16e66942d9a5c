//! The engine the UI talks to.
//!
//! Owns the output backend until the first call that needs sound opens it,
//! then owns the [`AudioContext`] for the rest of its life. Every public
//! method is safe to call at any time: before initialization they do nothing,
//! and failures are logged instead of propagated.

use std::sync::Arc;
use std::thread::{self, JoinHandle};

use log::{debug, error, info, warn};

use crate::audio::graph::{lock_graph, Graph};
use crate::audio::loader::{self, TrackInput};
use crate::audio::{bass_energy, AudioBackend, AudioBuffer, AudioContext, ContextState, TrackSource};
use crate::config::EngineConfig;
use crate::error::EngineError;
use crate::synth::{PitchTable, Voice};

pub use crate::audio::SourceId;

/// Result of finishing a background track load.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoadOutcome {
    /// The track is connected and playing.
    Playing(SourceId),
    /// Fetching or decoding failed; nothing is connected.
    Failed,
    /// A newer load was started in the meantime; the result was dropped.
    Superseded,
}

/// A track being fetched and decoded on a worker thread.
pub struct PendingLoad {
    generation: u64,
    name: String,
    worker: JoinHandle<Result<AudioBuffer, EngineError>>,
}

impl PendingLoad {
    /// True once the worker is done and finishing the load will not block.
    pub fn is_ready(&self) -> bool {
        self.worker.is_finished()
    }

    pub fn name(&self) -> &str {
        &self.name
    }
}

pub struct AudioEngine {
    config: EngineConfig,
    backend: Option<Box<dyn AudioBackend>>,
    context: Option<AudioContext>,
    frequency_data: Vec<u8>,
    pitch_table: PitchTable,
    next_source_id: u64,
    load_generation: u64,
    current_source: Option<SourceId>,
}

impl AudioEngine {
    /// Engine on the default output device.
    #[cfg(feature = "native")]
    pub fn new(config: EngineConfig) -> Self {
        Self::with_backend(config, Box::new(crate::audio::CpalBackend::new()))
    }

    pub fn with_backend(config: EngineConfig, backend: Box<dyn AudioBackend>) -> Self {
        let pitch_table = PitchTable::new(
            config.synth.scale.clone(),
            config.synth.fallback_frequency_hz,
        );
        Self {
            config,
            backend: Some(backend),
            context: None,
            frequency_data: Vec::new(),
            pitch_table,
            next_source_id: 0,
            load_generation: 0,
            current_source: None,
        }
    }

    pub fn pitch_table(&self) -> &PitchTable {
        &self.pitch_table
    }

    /// Opens the output stream and builds the graph on the first call.
    ///
    /// Later calls do nothing. If the backend cannot be opened it is kept and
    /// the next call tries again.
    pub fn ensure_initialized(&mut self) -> Result<(), EngineError> {
        if self.context.is_some() {
            return Ok(());
        }

        let backend = self
            .backend
            .as_mut()
            .ok_or(EngineError::BackendUnavailable)?;
        let info = backend.stream_info()?;
        let graph = Graph::new(info.sample_rate as f32, &self.config).into_shared();
        backend.open(Arc::clone(&graph))?;
        backend.start()?;

        let backend = self.backend.take().ok_or(EngineError::BackendUnavailable)?;
        self.frequency_data = vec![0; self.config.analyser.bin_count()];
        self.context = Some(AudioContext::new(backend, graph, info));
        Ok(())
    }

    pub fn is_initialized(&self) -> bool {
        self.context.is_some()
    }

    pub fn get_state(&self) -> Option<ContextState> {
        self.context.as_ref().map(AudioContext::state)
    }

    pub fn resume(&mut self) {
        if let Some(context) = self.context.as_mut() {
            if let Err(e) = context.resume() {
                error!("Failed to resume audio: {}", e);
            }
        }
    }

    pub fn pause(&mut self) {
        if let Some(context) = self.context.as_mut() {
            if let Err(e) = context.suspend() {
                error!("Failed to suspend audio: {}", e);
            }
        }
    }

    pub fn sample_rate(&self) -> Option<f32> {
        self.context.as_ref().map(AudioContext::sample_rate)
    }

    /// Seconds rendered on the context's sample clock; 0 before init.
    pub fn current_time(&self) -> f64 {
        self.context
            .as_ref()
            .map_or(0.0, |context| lock_graph(context.graph()).current_time())
    }

    pub fn active_voice_count(&self) -> usize {
        self.context
            .as_ref()
            .map_or(0, |context| lock_graph(context.graph()).active_voices())
    }

    pub fn current_source(&self) -> Option<SourceId> {
        self.current_source
    }

    pub fn is_source_connected(&self, id: SourceId) -> bool {
        self.context
            .as_ref()
            .is_some_and(|context| lock_graph(context.graph()).source_id() == Some(id))
    }

    /// Loads `input` and plays it on a loop, replacing whatever was playing.
    ///
    /// Blocks while fetching and decoding. Returns `false` if the engine
    /// could not start or the track could not be loaded; the previous track
    /// is stopped either way.
    pub fn play_track(&mut self, input: TrackInput) -> bool {
        let generation = match self.prepare_track_load() {
            Ok(generation) => generation,
            Err(e) => {
                error!("Failed to initialize audio: {}", e);
                return false;
            }
        };

        let name = input.name().to_string();
        let result = loader::load_track(input, self.config.asset_root.as_deref());
        matches!(
            self.complete_track_load(generation, &name, result),
            LoadOutcome::Playing(_)
        )
    }

    /// Starts loading `input` on a worker thread. The current track stops
    /// right away; the new one starts in [`finish_track_load`](Self::finish_track_load).
    pub fn begin_track_load(&mut self, input: TrackInput) -> Result<PendingLoad, EngineError> {
        let generation = self.prepare_track_load()?;
        let name = input.name().to_string();
        let asset_root = self.config.asset_root.clone();

        let worker = thread::Builder::new()
            .name("track-loader".into())
            .spawn(move || loader::load_track(input, asset_root.as_deref()))?;

        debug!("Loading {} in the background (load {})", name, generation);
        Ok(PendingLoad {
            generation,
            name,
            worker,
        })
    }

    /// Waits for `pending` and connects its track unless a newer load was
    /// started since.
    pub fn finish_track_load(&mut self, pending: PendingLoad) -> LoadOutcome {
        let PendingLoad {
            generation,
            name,
            worker,
        } = pending;
        let result = worker
            .join()
            .unwrap_or_else(|_| Err(EngineError::Decode("track loader panicked".into())));
        self.complete_track_load(generation, &name, result)
    }

    /// Fills the frequency buffer from the analyser and returns it. Empty
    /// before initialization.
    pub fn get_frequency_data(&mut self) -> &[u8] {
        let Some(context) = self.context.as_ref() else {
            return &[];
        };
        lock_graph(context.graph())
            .analyser_mut()
            .get_byte_frequency_data(&mut self.frequency_data);
        &self.frequency_data
    }

    /// Mean of the lowest spectrum bins, read fresh from the analyser.
    pub fn bass_energy(&mut self) -> f32 {
        let bins = self.config.bass_bins;
        bass_energy(self.get_frequency_data(), bins)
    }

    /// Plays a short note picked by a horizontal position in [0, 1) and
    /// returns the note index. Positions outside the range play the fallback
    /// pitch.
    pub fn play_synth(&mut self, x_ratio: f32) -> i32 {
        let index = self.pitch_table.index_for(x_ratio);

        if let Err(e) = self.ensure_initialized() {
            error!("Failed to initialize audio: {}", e);
            return index;
        }
        self.resume_if_suspended();

        // A closed context never renders again, so its voices would never be
        // released.
        if self.get_state() == Some(ContextState::Closed) {
            warn!("Audio context is closed, note {} not played", index);
            return index;
        }

        let frequency = self.pitch_table.frequency(index);
        if let Some(context) = self.context.as_ref() {
            let mut graph = lock_graph(context.graph());
            let start_frame = graph.current_frame();
            let voice = Voice::new(frequency, start_frame, graph.sample_rate(), &self.config.synth);
            debug!(
                "Note {} at {:.2} Hz, frames {}..{}",
                index,
                frequency,
                voice.start_frame(),
                voice.stop_frame()
            );
            graph.add_voice(voice);
        }
        index
    }

    /// Shared first half of every track load: open the engine, wake it up,
    /// stop the current track and take a new load ticket.
    fn prepare_track_load(&mut self) -> Result<u64, EngineError> {
        self.ensure_initialized()?;
        self.resume_if_suspended();
        self.stop_current_source();
        self.load_generation += 1;
        Ok(self.load_generation)
    }

    fn complete_track_load(
        &mut self,
        generation: u64,
        name: &str,
        result: Result<AudioBuffer, EngineError>,
    ) -> LoadOutcome {
        if generation != self.load_generation {
            warn!(
                "Dropping load of {} superseded by load {}",
                name, self.load_generation
            );
            return LoadOutcome::Superseded;
        }

        let connected = result.and_then(|buffer| self.connect_track(buffer));
        match connected {
            Ok(id) => {
                info!("Playing {}", name);
                LoadOutcome::Playing(id)
            }
            Err(e) => {
                error!("Error loading audio {}: {}", name, e);
                LoadOutcome::Failed
            }
        }
    }

    fn connect_track(&mut self, buffer: AudioBuffer) -> Result<SourceId, EngineError> {
        let context = self.context.as_ref().ok_or(EngineError::BackendUnavailable)?;

        let id = SourceId(self.next_source_id);
        self.next_source_id += 1;
        debug!(
            "Track {:?}: {} frame(s), {} channel(s) @ {}Hz",
            id,
            buffer.frames(),
            buffer.num_channels(),
            buffer.sample_rate()
        );

        let source = TrackSource::new(id, Arc::new(buffer), context.sample_rate());
        lock_graph(context.graph()).connect_source(source);
        self.current_source = Some(id);
        Ok(id)
    }

    fn stop_current_source(&mut self) {
        if let Some(context) = self.context.as_ref() {
            if let Some(previous) = lock_graph(context.graph()).disconnect_source() {
                debug!("Stopped track {:?}", previous.id());
            }
        }
        self.current_source = None;
    }

    fn resume_if_suspended(&mut self) {
        if self.get_state() == Some(ContextState::Suspended) {
            self.resume();
        }
    }
}
