// src/lib.rs
// Library interface for morsewav

pub mod backend;
pub mod buffer;
pub mod config;
pub mod decoder;
pub mod envelope;
pub mod error;
pub mod generator;
pub mod morse;
pub mod pipeline;
pub mod segment;
pub mod timing;
pub mod wav;

pub use backend::{
    AudioContainerDecoder, FfmpegConverter, FormatConverter, PassthroughConverter, WavDecoder,
};
pub use buffer::SampleBuffer;
pub use config::{ConverterConfig, DecoderConfig};
pub use decoder::MorseDecoder;
pub use error::{MorseError, Result};
pub use generator::MorseGenerator;
pub use pipeline::{Pipeline, ProcessedAudio};
pub use wav::{WavHeader, encode, parse_duration};

/// Decodes the Morse message in a WAV buffer with the default settings.
pub fn decode_wav_bytes(bytes: &[u8]) -> Result<String> {
    let audio = WavDecoder::decode_wav(bytes)?;
    MorseDecoder::default().decode(&audio)
}

/// Reads a WAV file and decodes its Morse message with the default settings.
pub fn decode_wav_file<P: AsRef<std::path::Path>>(path: P) -> Result<String> {
    decode_wav_bytes(&std::fs::read(path)?)
}
