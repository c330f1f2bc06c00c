//! Error types for WAV handling and Morse decoding

use thiserror::Error;

/// Result type used throughout the crate
pub type Result<T> = std::result::Result<T, MorseError>;

/// Errors that can occur while parsing, decoding or encoding audio
#[derive(Error, Debug)]
pub enum MorseError {
    /// The buffer is not a well-formed RIFF/WAVE container
    #[error("invalid WAV format at offset {offset}: {reason}")]
    InvalidFormat { offset: usize, reason: String },

    /// The chunk walk ran off the end of the buffer
    #[error("chunk '{chunk}' not found after scanning {scanned} bytes")]
    ChunkNotFound { chunk: String, scanned: usize },

    /// The external audio-container decoder failed
    #[error("audio decode failed: {0}")]
    DecodeFailure(String),

    /// No silence gap long enough to infer the dot length
    #[error("cannot infer Morse time unit: {silence_runs} silence runs, none significant")]
    AmbiguousTiming { silence_runs: usize },

    /// Caller handed us samples we cannot encode
    #[error("invalid input: {0}")]
    InvalidInput(String),

    /// The external format converter failed
    #[error("format conversion failed: {0}")]
    Conversion(String),

    #[error("resampling failed: {0}")]
    Resampling(String),

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

impl MorseError {
    pub(crate) fn invalid_format(offset: usize, reason: impl Into<String>) -> Self {
        MorseError::InvalidFormat {
            offset,
            reason: reason.into(),
        }
    }
}
