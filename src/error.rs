use thiserror::Error;

/// Errors raised inside the engine. The public playback calls turn these into
/// a `false` result plus a log line; they never escape as panics.
#[derive(Debug, Error)]
pub enum EngineError {
    #[error("failed to fetch {locator}: {reason}")]
    Fetch { locator: String, reason: String },

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("failed to decode audio: {0}")]
    Decode(String),

    #[error("audio backend error: {0}")]
    Backend(String),

    #[error("invalid configuration: {0}")]
    Config(String),

    #[error("audio backend is not available")]
    BackendUnavailable,
}

impl From<symphonia::core::errors::Error> for EngineError {
    fn from(err: symphonia::core::errors::Error) -> Self {
        EngineError::Decode(err.to_string())
    }
}

impl From<serde_json::Error> for EngineError {
    fn from(err: serde_json::Error) -> Self {
        EngineError::Config(err.to_string())
    }
}
