use std::fmt;

use log::{info, warn};

use super::graph::SharedGraph;
use super::{AudioBackend, StreamInfo};
use crate::error::EngineError;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ContextState {
    Suspended,
    Running,
    Closed,
}

impl ContextState {
    pub fn as_str(self) -> &'static str {
        match self {
            ContextState::Suspended => "suspended",
            ContextState::Running => "running",
            ContextState::Closed => "closed",
        }
    }
}

impl fmt::Display for ContextState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// An opened output stream together with the graph it renders.
pub struct AudioContext {
    backend: Box<dyn AudioBackend>,
    graph: SharedGraph,
    info: StreamInfo,
    state: ContextState,
}

impl AudioContext {
    /// Wraps a backend that has already been opened and started on `graph`.
    pub fn new(backend: Box<dyn AudioBackend>, graph: SharedGraph, info: StreamInfo) -> Self {
        info!(
            "Audio context running on {} @ {}Hz, {} channel(s)",
            info.device_name, info.sample_rate, info.channels
        );
        Self {
            backend,
            graph,
            info,
            state: ContextState::Running,
        }
    }

    pub fn state(&self) -> ContextState {
        if self.backend.is_faulted() {
            ContextState::Closed
        } else {
            self.state
        }
    }

    pub fn graph(&self) -> &SharedGraph {
        &self.graph
    }

    pub fn sample_rate(&self) -> f32 {
        self.info.sample_rate as f32
    }

    pub fn resume(&mut self) -> Result<(), EngineError> {
        match self.state() {
            ContextState::Running => Ok(()),
            ContextState::Closed => {
                warn!("Cannot resume a closed audio context");
                self.state = ContextState::Closed;
                Ok(())
            }
            ContextState::Suspended => {
                self.backend.start()?;
                self.state = ContextState::Running;
                info!("Audio context resumed");
                Ok(())
            }
        }
    }

    pub fn suspend(&mut self) -> Result<(), EngineError> {
        match self.state() {
            ContextState::Running => {
                self.backend.stop()?;
                self.state = ContextState::Suspended;
                info!("Audio context suspended");
                Ok(())
            }
            ContextState::Suspended => Ok(()),
            ContextState::Closed => {
                self.state = ContextState::Closed;
                Ok(())
            }
        }
    }
}
