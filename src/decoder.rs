use rubato::{
    Resampler, SincFixedIn, SincInterpolationParameters, SincInterpolationType, WindowFunction,
};

use crate::buffer::SampleBuffer;
use crate::config::DecoderConfig;
use crate::envelope;
use crate::error::{MorseError, Result};
use crate::morse;
use crate::segment;
use crate::timing::{Symbol, TimeUnit};

const RESAMPLER_CHUNK_SIZE: usize = 1024;

/// Amplitude-keyed Morse decoder.
///
/// Holds only configuration, so one decoder can serve any number of
/// concurrent decodes.
#[derive(Debug, Clone, Default)]
pub struct MorseDecoder {
    config: DecoderConfig,
}

impl MorseDecoder {
    pub fn new(config: DecoderConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &DecoderConfig {
        &self.config
    }

    /// Decodes channel 0 of a PCM buffer into text.
    pub fn decode(&self, audio: &SampleBuffer) -> Result<String> {
        let samples = audio.first_channel();
        log::info!(
            "Decoding {} samples at {} Hz ({} channels)",
            samples.len(),
            audio.sample_rate,
            audio.channels.len()
        );

        let keying = match self.config.resample_to {
            Some(target) if target != audio.sample_rate && !samples.is_empty() => {
                let resampled = resample(samples, audio.sample_rate, target)?;
                log::debug!(
                    "Resampled {} -> {} samples ({} Hz -> {} Hz)",
                    samples.len(),
                    resampled.len(),
                    audio.sample_rate,
                    target
                );
                envelope::keying(&resampled, self.config.threshold)
            }
            _ => envelope::keying(samples, self.config.threshold),
        };
        self.decode_keying(&keying)
    }

    /// Decodes a binary tone/silence signal into text.
    pub fn decode_keying(&self, keying: &[bool]) -> Result<String> {
        let symbols = self.symbols(keying)?;
        let code = morse::render(&symbols);
        log::debug!("Morse code: {:?}", code);
        let text = morse::decode_code_string(&code);
        log::info!("Decoded text: {}", text);
        Ok(text)
    }

    /// Classifies a binary signal into Morse symbols.
    pub fn symbols(&self, keying: &[bool]) -> Result<Vec<Symbol>> {
        let runs = segment::clean_runs(keying, self.config.min_gap_samples);
        let unit = TimeUnit::estimate(&runs, self.config.min_gap_samples)?;
        Ok(unit.classify(&runs))
    }
}

/// Resamples a mono signal with a windowed-sinc interpolator.
pub fn resample(samples: &[f32], source_rate: u32, target_rate: u32) -> Result<Vec<f32>> {
    if source_rate == 0 || target_rate == 0 {
        return Err(MorseError::Resampling(format!(
            "cannot resample {} Hz -> {} Hz",
            source_rate, target_rate
        )));
    }
    let mut resampler = SincFixedIn::<f32>::new(
        f64::from(target_rate) / f64::from(source_rate),
        2.0,
        SincInterpolationParameters {
            sinc_len: 256,
            f_cutoff: 0.95,
            interpolation: SincInterpolationType::Linear,
            oversampling_factor: 256,
            window: WindowFunction::BlackmanHarris,
        },
        RESAMPLER_CHUNK_SIZE,
        1,
    )
    .map_err(|e| MorseError::Resampling(e.to_string()))?;

    let expected = samples.len() as u64 * u64::from(target_rate) / u64::from(source_rate);
    let mut out = Vec::with_capacity(expected as usize + RESAMPLER_CHUNK_SIZE);
    let mut pos = 0;
    while samples.len() - pos >= resampler.input_frames_next() {
        let needed = resampler.input_frames_next();
        let wave_in: &[&[f32]] = &[&samples[pos..pos + needed]];
        let chunk = resampler
            .process(wave_in, None)
            .map_err(|e| MorseError::Resampling(e.to_string()))?;
        out.extend_from_slice(&chunk[0]);
        pos += needed;
    }
    if pos < samples.len() {
        let tail: &[&[f32]] = &[&samples[pos..]];
        let chunk = resampler
            .process_partial(Some(tail), None)
            .map_err(|e| MorseError::Resampling(e.to_string()))?;
        out.extend_from_slice(&chunk[0]);
    }
    Ok(out)
}
