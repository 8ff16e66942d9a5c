//! Resolving a track request to raw bytes and decoding them.

use std::fs;
use std::io::{Cursor, Read};
use std::path::{Path, PathBuf};

use log::debug;
use symphonia::core::audio::SampleBuffer;
use symphonia::core::codecs::{DecoderOptions, CODEC_TYPE_NULL};
use symphonia::core::errors::Error as SymphoniaError;
use symphonia::core::formats::FormatOptions;
use symphonia::core::io::MediaSourceStream;
use symphonia::core::meta::MetadataOptions;
use symphonia::core::probe::Hint;

use super::buffer::AudioBuffer;
use crate::error::EngineError;

/// What to play: something to fetch, or bytes the caller already holds (a
/// dropped or picked file).
#[derive(Debug, Clone, PartialEq)]
pub enum TrackInput {
    /// An `http(s)://` URL or a path, resolved against the asset root.
    Locator(String),
    Bytes { name: String, data: Vec<u8> },
}

impl TrackInput {
    pub fn locator(locator: impl Into<String>) -> Self {
        TrackInput::Locator(locator.into())
    }

    pub fn bytes(name: impl Into<String>, data: Vec<u8>) -> Self {
        TrackInput::Bytes {
            name: name.into(),
            data,
        }
    }

    /// Reads a local file into memory, the way a dropped file arrives.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, EngineError> {
        let path = path.as_ref();
        let data = fs::read(path)?;
        let name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| path.display().to_string());
        Ok(TrackInput::Bytes { name, data })
    }

    /// Human-readable name for logs and labels.
    pub fn name(&self) -> &str {
        match self {
            TrackInput::Locator(locator) => locator,
            TrackInput::Bytes { name, .. } => name,
        }
    }

    fn extension(&self) -> Option<String> {
        let name = match self {
            TrackInput::Locator(locator) => locator.split(['?', '#']).next().unwrap_or(locator),
            TrackInput::Bytes { name, .. } => name.as_str(),
        };
        Path::new(name)
            .extension()
            .and_then(|e| e.to_str())
            .map(str::to_ascii_lowercase)
    }
}

fn is_url(locator: &str) -> bool {
    locator.starts_with("http://") || locator.starts_with("https://")
}

/// Maps a non-URL locator to a file. A leading `/` is relative to the asset
/// root, like a path on a web server.
pub fn resolve_path(locator: &str, asset_root: Option<&Path>) -> PathBuf {
    match asset_root {
        Some(root) => root.join(locator.trim_start_matches('/')),
        None => PathBuf::from(locator),
    }
}

/// Resolves `input` to the bytes of an encoded audio file.
pub fn fetch_bytes(input: TrackInput, asset_root: Option<&Path>) -> Result<Vec<u8>, EngineError> {
    match input {
        TrackInput::Bytes { data, .. } => Ok(data),
        TrackInput::Locator(locator) if is_url(&locator) => fetch_url(&locator),
        TrackInput::Locator(locator) => {
            let path = resolve_path(&locator, asset_root);
            debug!("Reading track from {}", path.display());
            fs::read(&path).map_err(|e| EngineError::Fetch {
                locator,
                reason: format!("{}: {}", path.display(), e),
            })
        }
    }
}

fn fetch_url(url: &str) -> Result<Vec<u8>, EngineError> {
    debug!("Fetching track from {}", url);
    let response = ureq::get(url).call().map_err(|e| EngineError::Fetch {
        locator: url.to_string(),
        reason: e.to_string(),
    })?;

    let mut bytes = Vec::new();
    response
        .into_reader()
        .read_to_end(&mut bytes)
        .map_err(|e| EngineError::Fetch {
            locator: url.to_string(),
            reason: e.to_string(),
        })?;
    Ok(bytes)
}

/// Decodes a complete encoded file into planar `f32` samples.
pub fn decode(bytes: Vec<u8>, extension_hint: Option<&str>) -> Result<AudioBuffer, EngineError> {
    let mss = MediaSourceStream::new(Box::new(Cursor::new(bytes)), Default::default());

    let mut hint = Hint::new();
    if let Some(ext) = extension_hint {
        hint.with_extension(ext);
    }

    let probed = symphonia::default::get_probe().format(
        &hint,
        mss,
        &FormatOptions::default(),
        &MetadataOptions::default(),
    )?;
    let mut format = probed.format;

    let track = format
        .tracks()
        .iter()
        .find(|t| t.codec_params.codec != CODEC_TYPE_NULL)
        .ok_or_else(|| EngineError::Decode("no audio track".into()))?;
    let track_id = track.id;
    let mut sample_rate = track.codec_params.sample_rate;

    let mut decoder =
        symphonia::default::get_codecs().make(&track.codec_params, &DecoderOptions::default())?;

    let mut channels: Vec<Vec<f32>> = Vec::new();
    let mut sample_buf: Option<SampleBuffer<f32>> = None;

    loop {
        let packet = match format.next_packet() {
            Ok(packet) => packet,
            Err(SymphoniaError::IoError(ref e))
                if e.kind() == std::io::ErrorKind::UnexpectedEof =>
            {
                break
            }
            Err(SymphoniaError::ResetRequired) => break,
            Err(e) => return Err(e.into()),
        };

        if packet.track_id() != track_id {
            continue;
        }

        let decoded = match decoder.decode(&packet) {
            Ok(decoded) => decoded,
            // A corrupt frame is skipped, the rest of the stream still plays.
            Err(SymphoniaError::DecodeError(e)) => {
                debug!("Skipping undecodable packet: {}", e);
                continue;
            }
            Err(e) => return Err(e.into()),
        };

        let spec = *decoded.spec();
        let num_channels = spec.channels.count();
        if num_channels == 0 {
            continue;
        }
        if channels.is_empty() {
            channels = vec![Vec::new(); num_channels];
            sample_rate = sample_rate.or(Some(spec.rate));
        }

        let buf = sample_buf.get_or_insert_with(|| {
            SampleBuffer::<f32>::new(decoded.capacity() as u64, spec)
        });
        // Packets can grow past the first one's capacity.
        if buf.capacity() < decoded.capacity() * num_channels {
            *buf = SampleBuffer::<f32>::new(decoded.capacity() as u64, spec);
        }
        buf.copy_interleaved_ref(decoded);

        for frame in buf.samples().chunks(num_channels) {
            for (channel, sample) in channels.iter_mut().zip(frame.iter()) {
                channel.push(*sample);
            }
        }
    }

    let sample_rate =
        sample_rate.ok_or_else(|| EngineError::Decode("unknown sample rate".into()))?;
    let buffer = AudioBuffer::new(sample_rate, channels);
    if buffer.is_empty() {
        return Err(EngineError::Decode("stream contains no audio frames".into()));
    }
    Ok(buffer)
}

/// Fetches and decodes `input` in one step.
pub fn load_track(input: TrackInput, asset_root: Option<&Path>) -> Result<AudioBuffer, EngineError> {
    let extension = input.extension();
    let bytes = fetch_bytes(input, asset_root)?;
    decode(bytes, extension.as_deref())
}
