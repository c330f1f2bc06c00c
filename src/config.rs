//! Configuration parameters for decoding and conversion

use std::path::PathBuf;

/// Amplitude above which a sample counts as tone (default: 0.3)
pub const DEFAULT_THRESHOLD: f32 = 0.3;

/// Silence runs shorter than this many samples are treated as jitter (default: 100)
pub const DEFAULT_MIN_GAP_SAMPLES: usize = 100;

/// Converter program looked up on `PATH` (default: ffmpeg)
pub const DEFAULT_FFMPEG: &str = "ffmpeg";

/// Morse decoder configuration
#[derive(Debug, Clone, PartialEq)]
pub struct DecoderConfig {
    /// Fixed envelope threshold separating tone from silence
    pub threshold: f32,

    /// Shortest silence run that survives denoising, in samples.
    /// Surviving silence runs are also the candidates for the time unit.
    pub min_gap_samples: usize,

    /// Resample channel 0 to this rate before extracting the envelope.
    /// `None` keeps the input rate, so all timing is in input samples.
    pub resample_to: Option<u32>,
}

impl Default for DecoderConfig {
    fn default() -> Self {
        Self {
            threshold: DEFAULT_THRESHOLD,
            min_gap_samples: DEFAULT_MIN_GAP_SAMPLES,
            resample_to: None,
        }
    }
}

/// Settings for the ffmpeg-backed format converter
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConverterConfig {
    /// Program to invoke (default: [`DEFAULT_FFMPEG`])
    pub program: String,

    /// Directory for the converter's scratch files (default: the system temp dir)
    pub scratch_dir: Option<PathBuf>,
}

impl Default for ConverterConfig {
    fn default() -> Self {
        Self {
            program: DEFAULT_FFMPEG.to_string(),
            scratch_dir: None,
        }
    }
}
