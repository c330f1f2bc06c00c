//! Decoded PCM audio

use crate::error::Result;
use crate::wav;

/// Per-channel float samples in [-1.0, 1.0] at a fixed rate.
#[derive(Debug, Clone, PartialEq)]
pub struct SampleBuffer {
    pub channels: Vec<Vec<f32>>,
    pub sample_rate: u32,
}

impl SampleBuffer {
    pub fn new(channels: Vec<Vec<f32>>, sample_rate: u32) -> Self {
        Self {
            channels,
            sample_rate,
        }
    }

    pub fn mono(samples: Vec<f32>, sample_rate: u32) -> Self {
        Self::new(vec![samples], sample_rate)
    }

    /// Channel 0, or an empty slice when there are no channels.
    pub fn first_channel(&self) -> &[f32] {
        self.channels.first().map(Vec::as_slice).unwrap_or(&[])
    }

    pub fn frames(&self) -> usize {
        self.channels.first().map_or(0, Vec::len)
    }

    pub fn duration(&self) -> f64 {
        if self.sample_rate == 0 {
            return 0.0;
        }
        self.frames() as f64 / f64::from(self.sample_rate)
    }

    /// Serializes as 16-bit PCM WAV.
    pub fn to_wav(&self) -> Result<Vec<u8>> {
        wav::encode(self.channels.as_slice(), self.sample_rate)
    }
}
