//! External audio services: container decoding and format conversion
//!
//! Both are one-shot async operations. A caller cancels by dropping the
//! future; nothing here retries.

use std::future::Future;
use std::io::Cursor;
use std::path::{Path, PathBuf};
use std::process::Stdio;
use std::sync::atomic::{AtomicU64, Ordering};

use hound::{SampleFormat, WavReader};

use crate::buffer::SampleBuffer;
use crate::config::ConverterConfig;
use crate::error::{MorseError, Result};
use crate::wav;

/// MIME types accepted by [`WavDecoder`].
pub const WAV_MIME_TYPES: [&str; 4] = ["audio/wav", "audio/x-wav", "audio/wave", "audio/vnd.wave"];

/// Decodes an audio container into per-channel float samples.
pub trait AudioContainerDecoder {
    fn decode(&self, bytes: &[u8], mime: &str) -> impl Future<Output = Result<SampleBuffer>> + Send;
}

/// Converts arbitrary audio into a WAV buffer. The filename's extension
/// identifies the input format.
pub trait FormatConverter {
    fn convert_to_wav(
        &self,
        bytes: &[u8],
        filename: &str,
    ) -> impl Future<Output = Result<Vec<u8>>> + Send;
}

/// WAV container decoder backed by `hound`.
#[derive(Debug, Clone, Copy, Default)]
pub struct WavDecoder;

impl WavDecoder {
    pub fn decode_wav(bytes: &[u8]) -> Result<SampleBuffer> {
        let mut reader = WavReader::new(Cursor::new(bytes))
            .map_err(|e| MorseError::DecodeFailure(e.to_string()))?;
        let spec = reader.spec();
        log::debug!("WAV spec: {:?}", spec);

        let channels = usize::from(spec.channels);
        if channels == 0 {
            return Err(MorseError::DecodeFailure("WAV declares zero channels".to_string()));
        }

        let samples: std::result::Result<Vec<f32>, hound::Error> = match spec.sample_format {
            SampleFormat::Int => {
                let scale = 1.0 / (1u64 << spec.bits_per_sample.saturating_sub(1)) as f32;
                reader
                    .samples::<i32>()
                    .map(|s| s.map(|v| v as f32 * scale))
                    .collect()
            }
            SampleFormat::Float => reader.samples::<f32>().collect(),
        };
        let interleaved = samples.map_err(|e| MorseError::DecodeFailure(e.to_string()))?;

        let mut out = vec![Vec::with_capacity(interleaved.len() / channels); channels];
        for frame in interleaved.chunks_exact(channels) {
            for (ch, &sample) in out.iter_mut().zip(frame) {
                ch.push(sample);
            }
        }
        Ok(SampleBuffer::new(out, spec.sample_rate))
    }
}

impl AudioContainerDecoder for WavDecoder {
    async fn decode(&self, bytes: &[u8], mime: &str) -> Result<SampleBuffer> {
        let mime = mime.trim().to_ascii_lowercase();
        if !WAV_MIME_TYPES.contains(&mime.as_str()) {
            return Err(MorseError::DecodeFailure(format!(
                "unsupported container type '{}'",
                mime
            )));
        }
        Self::decode_wav(bytes)
    }
}

/// Converter that shells out to `ffmpeg`.
#[derive(Debug, Clone, Default)]
pub struct FfmpegConverter {
    config: ConverterConfig,
}

static SCRATCH_COUNTER: AtomicU64 = AtomicU64::new(0);

impl FfmpegConverter {
    pub fn new(config: ConverterConfig) -> Self {
        Self { config }
    }

    async fn run(&self, input: &Path, output: &Path) -> Result<()> {
        log::debug!("Running {} on {:?}", self.config.program, input);
        let result = tokio::process::Command::new(&self.config.program)
            .args(["-y", "-loglevel", "error", "-i"])
            .arg(input)
            .args(["-f", "wav"])
            .arg(output)
            .stdin(Stdio::null())
            .output()
            .await
            .map_err(|e| {
                MorseError::Conversion(format!("cannot run {}: {}", self.config.program, e))
            })?;

        if !result.status.success() {
            return Err(MorseError::Conversion(format!(
                "{} exited with {}: {}",
                self.config.program,
                result.status,
                String::from_utf8_lossy(&result.stderr).trim()
            )));
        }
        Ok(())
    }
}

impl FormatConverter for FfmpegConverter {
    async fn convert_to_wav(&self, bytes: &[u8], filename: &str) -> Result<Vec<u8>> {
        let dir = self.config.scratch_dir.clone().unwrap_or_else(std::env::temp_dir);
        let (input, output) = scratch_paths(&dir, filename);
        let converted = match tokio::fs::write(&input, bytes).await {
            Ok(()) => match self.run(&input, &output).await {
                Ok(()) => tokio::fs::read(&output).await.map_err(MorseError::from),
                Err(e) => Err(e),
            },
            Err(e) => Err(MorseError::from(e)),
        };

        tokio::fs::remove_file(&input).await.ok();
        tokio::fs::remove_file(&output).await.ok();

        let wav = converted?;
        log::info!("Converted {} ({} bytes) to {} WAV bytes", filename, bytes.len(), wav.len());
        Ok(wav)
    }
}

/// Accepts WAV input unchanged and rejects everything else.
#[derive(Debug, Clone, Copy, Default)]
pub struct PassthroughConverter;

impl FormatConverter for PassthroughConverter {
    async fn convert_to_wav(&self, bytes: &[u8], filename: &str) -> Result<Vec<u8>> {
        if wav::is_riff_wave(bytes) {
            Ok(bytes.to_vec())
        } else {
            Err(MorseError::Conversion(format!(
                "{} is not a WAV file and no converter is configured",
                filename
            )))
        }
    }
}

/// Input and output paths in the temp dir. The input keeps the original
/// extension so ffmpeg can pick a demuxer.
fn scratch_paths(dir: &Path, filename: &str) -> (PathBuf, PathBuf) {
    let stem = format!(
        "morsewav-{}-{}",
        std::process::id(),
        SCRATCH_COUNTER.fetch_add(1, Ordering::Relaxed)
    );
    let input = match extension(filename) {
        Some(ext) => dir.join(format!("{stem}-in.{ext}")),
        None => dir.join(format!("{stem}-in")),
    };
    (input, dir.join(format!("{stem}-out.wav")))
}

fn extension(filename: &str) -> Option<String> {
    Path::new(filename)
        .extension()
        .and_then(|ext| ext.to_str())
        .filter(|ext| !ext.is_empty() && ext.chars().all(|c| c.is_ascii_alphanumeric()))
        .map(str::to_ascii_lowercase)
}
