//! Audio graph, output backends and track loading.

pub mod analyser;
pub mod buffer;
pub mod context;
#[cfg(feature = "native")]
mod cpal_backend;
pub mod graph;
pub mod loader;
pub mod offline;
pub mod source;

#[cfg(feature = "native")]
pub use self::cpal_backend::CpalBackend;
pub use analyser::{bass_energy, Analyser};
pub use buffer::AudioBuffer;
pub use context::{AudioContext, ContextState};
pub use graph::{Graph, SharedGraph};
pub use loader::TrackInput;
pub use offline::{OfflineBackend, OfflineHandle};
pub use source::{SourceId, SourceState, TrackSource};

use crate::error::EngineError;

/// Format of the stream a backend will open.
#[derive(Debug, Clone, PartialEq)]
pub struct StreamInfo {
    pub sample_rate: u32,
    pub channels: u16,
    pub device_name: String,
}

/// An audio output that pulls frames from a [`Graph`].
///
/// The engine asks for the stream format first so it can size the graph, then
/// hands the graph over with `open`. `start` and `stop` map to resuming and
/// suspending the context.
pub trait AudioBackend {
    fn stream_info(&mut self) -> Result<StreamInfo, EngineError>;
    fn open(&mut self, graph: SharedGraph) -> Result<(), EngineError>;
    fn start(&mut self) -> Result<(), EngineError>;
    fn stop(&mut self) -> Result<(), EngineError>;
    /// True once the stream hit an unrecoverable error, e.g. the device went away.
    fn is_faulted(&self) -> bool;
}
