use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};

use super::graph::{lock_graph, SharedGraph};
use super::{AudioBackend, StreamInfo};
use crate::error::EngineError;

struct OfflineShared {
    graph: Mutex<Option<SharedGraph>>,
    running: AtomicBool,
    faulted: AtomicBool,
    refuse_open: AtomicBool,
}

/// Backend without a device. Frames are rendered only when an
/// [`OfflineHandle`] asks for them, which makes the graph deterministic for
/// tests and usable for rendering to a file.
pub struct OfflineBackend {
    sample_rate: u32,
    channels: u16,
    shared: Arc<OfflineShared>,
}

impl OfflineBackend {
    pub fn new(sample_rate: u32, channels: u16) -> Self {
        Self {
            sample_rate,
            channels: channels.max(1),
            shared: Arc::new(OfflineShared {
                graph: Mutex::new(None),
                running: AtomicBool::new(false),
                faulted: AtomicBool::new(false),
                refuse_open: AtomicBool::new(false),
            }),
        }
    }

    pub fn handle(&self) -> OfflineHandle {
        OfflineHandle {
            shared: Arc::clone(&self.shared),
            channels: self.channels,
        }
    }
}

impl AudioBackend for OfflineBackend {
    fn stream_info(&mut self) -> Result<StreamInfo, EngineError> {
        if self.shared.refuse_open.load(Ordering::SeqCst) {
            return Err(EngineError::Backend("offline device refused to open".into()));
        }
        Ok(StreamInfo {
            sample_rate: self.sample_rate,
            channels: self.channels,
            device_name: "offline".to_string(),
        })
    }

    fn open(&mut self, graph: SharedGraph) -> Result<(), EngineError> {
        let mut slot = self
            .shared
            .graph
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner());
        *slot = Some(graph);
        Ok(())
    }

    fn start(&mut self) -> Result<(), EngineError> {
        self.shared.running.store(true, Ordering::SeqCst);
        Ok(())
    }

    fn stop(&mut self) -> Result<(), EngineError> {
        self.shared.running.store(false, Ordering::SeqCst);
        Ok(())
    }

    fn is_faulted(&self) -> bool {
        self.shared.faulted.load(Ordering::SeqCst)
    }
}

/// Pulls audio out of an [`OfflineBackend`] and controls its failure modes.
#[derive(Clone)]
pub struct OfflineHandle {
    shared: Arc<OfflineShared>,
    channels: u16,
}

impl OfflineHandle {
    pub fn is_open(&self) -> bool {
        self.graph().is_some()
    }

    pub fn is_running(&self) -> bool {
        self.shared.running.load(Ordering::SeqCst)
    }

    /// Renders `frames` interleaved frames. A stream that is not open, not
    /// running or faulted produces silence and does not advance the clock.
    pub fn render(&self, frames: usize) -> Vec<f32> {
        let channels = self.channels as usize;
        let mut output = vec![0.0; frames * channels];
        if !self.is_running() || self.shared.faulted.load(Ordering::SeqCst) {
            return output;
        }
        if let Some(graph) = self.graph() {
            lock_graph(&graph).process(&mut output, channels);
        }
        output
    }

    /// Simulates losing the device.
    pub fn fail(&self) {
        self.shared.faulted.store(true, Ordering::SeqCst);
        self.shared.running.store(false, Ordering::SeqCst);
    }

    /// Makes the next attempts to open the stream fail.
    pub fn refuse_open(&self, refuse: bool) {
        self.shared.refuse_open.store(refuse, Ordering::SeqCst);
    }

    fn graph(&self) -> Option<SharedGraph> {
        self.shared
            .graph
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .clone()
    }
}
