//! The render graph shared between the control side and the output callback.
//!
//! Routing is fixed:
//!
//! ```text
//! source ──┬──────────────────────────────► destination
//!          └──► analyser
//! voices ──┬──────────────────────────────► destination
//!          └──► echo bus (delay ⇄ lowpass ⇄ feedback) ──► destination
//! ```

use std::sync::{Arc, Mutex, MutexGuard};

use log::warn;

use super::analyser::Analyser;
use super::source::{SourceId, TrackSource};
use crate::config::EngineConfig;
use crate::synth::{EchoBus, Voice};

pub type SharedGraph = Arc<Mutex<Graph>>;

/// Locks the graph, recovering the data if a previous holder panicked so the
/// output callback keeps running.
pub fn lock_graph(graph: &SharedGraph) -> MutexGuard<'_, Graph> {
    graph
        .lock()
        .unwrap_or_else(|poisoned| poisoned.into_inner())
}

pub struct Graph {
    sample_rate: f32,
    frames_rendered: u64,
    source: Option<TrackSource>,
    voices: Vec<Voice>,
    echo: EchoBus,
    analyser: Analyser,
}

impl Graph {
    pub fn new(sample_rate: f32, config: &EngineConfig) -> Self {
        Self {
            sample_rate,
            frames_rendered: 0,
            source: None,
            voices: Vec::new(),
            echo: EchoBus::new(&config.echo, sample_rate),
            analyser: Analyser::new(&config.analyser),
        }
    }

    pub fn into_shared(self) -> SharedGraph {
        Arc::new(Mutex::new(self))
    }

    pub fn sample_rate(&self) -> f32 {
        self.sample_rate
    }

    /// Frames rendered so far; the context's sample clock.
    pub fn current_frame(&self) -> u64 {
        self.frames_rendered
    }

    pub fn current_time(&self) -> f64 {
        self.frames_rendered as f64 / self.sample_rate as f64
    }

    /// Connects `source` to the analyser and destination. Anything still
    /// connected is stopped and handed back.
    pub fn connect_source(&mut self, source: TrackSource) -> Option<TrackSource> {
        let previous = self.disconnect_source();
        if let Some(previous) = &previous {
            warn!(
                "Replacing source {:?} that was still connected",
                previous.id()
            );
        }
        self.source = Some(source);
        previous
    }

    /// Stops and disconnects the current source, if any.
    pub fn disconnect_source(&mut self) -> Option<TrackSource> {
        self.source.take().map(|mut source| {
            source.stop();
            source
        })
    }

    pub fn source_id(&self) -> Option<SourceId> {
        self.source.as_ref().map(TrackSource::id)
    }

    pub fn add_voice(&mut self, voice: Voice) {
        self.voices.push(voice);
    }

    pub fn active_voices(&self) -> usize {
        self.voices.len()
    }

    pub fn echo(&self) -> &EchoBus {
        &self.echo
    }

    pub fn analyser_mut(&mut self) -> &mut Analyser {
        &mut self.analyser
    }

    /// Renders interleaved frames into `output`, overwriting it.
    pub fn process(&mut self, output: &mut [f32], channels: usize) {
        if channels == 0 {
            return;
        }
        output.fill(0.0);

        for frame in output.chunks_mut(channels) {
            let frame_index = self.frames_rendered;

            let mut dry = 0.0;
            for voice in self.voices.iter_mut() {
                dry += voice.next_sample(frame_index, self.sample_rate);
            }
            let synth = dry + self.echo.process(dry);

            let analysed = match self.source.as_mut() {
                Some(source) => source.render_frame(frame),
                None => 0.0,
            };
            self.analyser.push_sample(analysed);

            for sample in frame.iter_mut() {
                *sample += synth;
            }
            self.frames_rendered += 1;
        }

        let frames_rendered = self.frames_rendered;
        self.voices.retain(|voice| !voice.is_finished(frames_rendered));

        apply_limiter(output);
    }
}

const LIMITER_KNEE: f32 = 0.9;

/// Soft-knee limiter: samples above the knee are squashed with `tanh` so the
/// output never exceeds 1.0 and louder input never comes out quieter.
pub fn apply_limiter(output: &mut [f32]) {
    let headroom = 1.0 - LIMITER_KNEE;
    for sample in output.iter_mut() {
        let abs_sample = sample.abs();
        if abs_sample > LIMITER_KNEE {
            let over = (abs_sample - LIMITER_KNEE) / headroom;
            *sample = sample.signum() * (LIMITER_KNEE + headroom * over.tanh());
        }
    }
}
