#![allow(dead_code)]

use std::f32::consts::TAU;
use std::fs;
use std::io::Cursor;
use std::path::PathBuf;

use neonsynth::{AudioEngine, EngineConfig, OfflineBackend, OfflineHandle};

pub const SAMPLE_RATE: u32 = 48_000;

/// Encodes a mono 16-bit WAV sine tone in memory.
pub fn sine_wav(frequency: f32, seconds: f32, amplitude: f32) -> Vec<u8> {
    let spec = hound::WavSpec {
        channels: 1,
        sample_rate: SAMPLE_RATE,
        bits_per_sample: 16,
        sample_format: hound::SampleFormat::Int,
    };
    let frames = (seconds * SAMPLE_RATE as f32) as usize;

    let mut cursor = Cursor::new(Vec::new());
    {
        let mut writer = hound::WavWriter::new(&mut cursor, spec).unwrap();
        for i in 0..frames {
            let t = i as f32 / SAMPLE_RATE as f32;
            let sample = amplitude * (TAU * frequency * t).sin();
            writer
                .write_sample((sample * i16::MAX as f32) as i16)
                .unwrap();
        }
        writer.finalize().unwrap();
    }
    cursor.into_inner()
}

/// A fresh directory under the system temp dir for file-based fixtures.
pub fn fixture_dir(tag: &str) -> PathBuf {
    let dir = std::env::temp_dir().join(format!("neonsynth-{}-{}", std::process::id(), tag));
    fs::create_dir_all(&dir).unwrap();
    dir
}

pub fn offline_engine_with(config: EngineConfig) -> (AudioEngine, OfflineHandle) {
    let backend = OfflineBackend::new(SAMPLE_RATE, 2);
    let handle = backend.handle();
    (AudioEngine::with_backend(config, Box::new(backend)), handle)
}

pub fn offline_engine() -> (AudioEngine, OfflineHandle) {
    offline_engine_with(EngineConfig::default())
}

pub fn peak(samples: &[f32]) -> f32 {
    samples.iter().fold(0.0f32, |acc, s| acc.max(s.abs()))
}
