use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use cpal::traits::{DeviceTrait, HostTrait, StreamTrait};
use cpal::{SampleFormat, Stream};
use log::{error, info};

use super::graph::{lock_graph, SharedGraph};
use super::{AudioBackend, StreamInfo};
use crate::error::EngineError;

/// Output on the host's default device through cpal.
pub struct CpalBackend {
    device: Option<cpal::Device>,
    config: Option<cpal::StreamConfig>,
    stream: Option<Stream>,
    faulted: Arc<AtomicBool>,
}

impl CpalBackend {
    pub fn new() -> Self {
        Self {
            device: None,
            config: None,
            stream: None,
            faulted: Arc::new(AtomicBool::new(false)),
        }
    }

    fn select_output_device(&self, host: &cpal::Host) -> Result<cpal::Device, EngineError> {
        host.default_output_device()
            .ok_or_else(|| EngineError::Backend("No output device available".into()))
    }

    fn build_stream(
        &self,
        device: &cpal::Device,
        config: &cpal::StreamConfig,
        graph: SharedGraph,
    ) -> Result<Stream, EngineError> {
        let channels = config.channels as usize;
        let faulted = Arc::clone(&self.faulted);

        let stream = device
            .build_output_stream(
                config,
                move |data: &mut [f32], _: &cpal::OutputCallbackInfo| {
                    lock_graph(&graph).process(data, channels);
                },
                move |err| {
                    error!("Audio stream error: {}", err);
                    if matches!(err, cpal::StreamError::DeviceNotAvailable) {
                        faulted.store(true, Ordering::SeqCst);
                    }
                },
                None,
            )
            .map_err(|e| EngineError::Backend(format!("Failed to build audio stream: {}", e)))?;

        Ok(stream)
    }
}

impl Default for CpalBackend {
    fn default() -> Self {
        Self::new()
    }
}

impl AudioBackend for CpalBackend {
    fn stream_info(&mut self) -> Result<StreamInfo, EngineError> {
        let host = cpal::default_host();
        let device = self.select_output_device(&host)?;
        let supported_config = device
            .default_output_config()
            .map_err(|e| EngineError::Backend(format!("Failed to get audio config: {}", e)))?;

        if supported_config.sample_format() != SampleFormat::F32 {
            return Err(EngineError::Backend(format!(
                "Unsupported sample format {:?}",
                supported_config.sample_format()
            )));
        }

        let config: cpal::StreamConfig = supported_config.into();
        let info = StreamInfo {
            sample_rate: config.sample_rate.0,
            channels: config.channels,
            device_name: device.name().unwrap_or_else(|_| "Unknown".to_string()),
        };
        info!("Selected device: {}", info.device_name);

        self.device = Some(device);
        self.config = Some(config);
        Ok(info)
    }

    fn open(&mut self, graph: SharedGraph) -> Result<(), EngineError> {
        let (device, config) = match (&self.device, &self.config) {
            (Some(device), Some(config)) => (device, config),
            _ => {
                return Err(EngineError::Backend(
                    "stream format must be queried before opening".into(),
                ))
            }
        };
        let stream = self.build_stream(device, config, graph)?;
        self.stream = Some(stream);
        Ok(())
    }

    fn start(&mut self) -> Result<(), EngineError> {
        let stream = self.stream.as_ref().ok_or(EngineError::BackendUnavailable)?;
        stream
            .play()
            .map_err(|e| EngineError::Backend(format!("Failed to start audio stream: {}", e)))
    }

    fn stop(&mut self) -> Result<(), EngineError> {
        let stream = self.stream.as_ref().ok_or(EngineError::BackendUnavailable)?;
        stream
            .pause()
            .map_err(|e| EngineError::Backend(format!("Failed to stop audio stream: {}", e)))
    }

    fn is_faulted(&self) -> bool {
        self.faulted.load(Ordering::SeqCst)
    }
}
