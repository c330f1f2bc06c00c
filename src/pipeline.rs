//! Audio file processing with injected conversion and decoding services

use crate::backend::{AudioContainerDecoder, FormatConverter};
use crate::decoder::MorseDecoder;
use crate::error::Result;
use crate::wav;

const WAV_MIME: &str = "audio/wav";

/// Everything derived from one input file.
#[derive(Debug, Clone, PartialEq)]
pub struct ProcessedAudio {
    pub name: String,
    /// Input normalized to WAV
    pub wav: Vec<u8>,
    /// Duration of `wav` in seconds
    pub duration: f64,
    pub text: String,
}

/// Runs conversion, duration measurement and Morse decoding over injected
/// services. Holds no per-call state, so it can be shared across tasks.
#[derive(Debug, Clone)]
pub struct Pipeline<C, D> {
    converter: C,
    container: D,
    decoder: MorseDecoder,
}

impl<C: FormatConverter, D: AudioContainerDecoder> Pipeline<C, D> {
    pub fn new(converter: C, container: D, decoder: MorseDecoder) -> Self {
        Self {
            converter,
            container,
            decoder,
        }
    }

    /// Duration in seconds of any convertible audio file.
    pub async fn duration(&self, bytes: &[u8], filename: &str) -> Result<f64> {
        let wav = self.converter.convert_to_wav(bytes, filename).await?;
        wav::parse_duration(&wav)
    }

    /// Converts to WAV, then decodes the Morse message.
    pub async fn decode(&self, bytes: &[u8], filename: &str) -> Result<String> {
        let wav = self.converter.convert_to_wav(bytes, filename).await?;
        self.decode_container(&wav, WAV_MIME).await
    }

    /// Decodes a container the decoding service understands directly.
    pub async fn decode_container(&self, bytes: &[u8], mime: &str) -> Result<String> {
        let audio = self.container.decode(bytes, mime).await?;
        self.decoder.decode(&audio)
    }

    /// Decodes a container and re-encodes it as 16-bit PCM WAV.
    pub async fn export_wav(&self, bytes: &[u8], mime: &str) -> Result<Vec<u8>> {
        let audio = self.container.decode(bytes, mime).await?;
        audio.to_wav()
    }

    /// Converts any input to WAV, then re-encodes it as 16-bit PCM.
    pub async fn export(&self, bytes: &[u8], filename: &str) -> Result<Vec<u8>> {
        let wav = self.converter.convert_to_wav(bytes, filename).await?;
        self.export_wav(&wav, WAV_MIME).await
    }

    /// Converts, measures and decodes one file.
    pub async fn process(&self, bytes: &[u8], filename: &str) -> Result<ProcessedAudio> {
        let wav = self.converter.convert_to_wav(bytes, filename).await?;
        let duration = wav::parse_duration(&wav)?;
        let text = self.decode_container(&wav, WAV_MIME).await?;
        log::info!("{}: {:.2}s, decoded {:?}", filename, duration, text);
        Ok(ProcessedAudio {
            name: filename.to_string(),
            wav,
            duration,
            text,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backend::{PassthroughConverter, WavDecoder};
    use crate::buffer::SampleBuffer;
    use crate::error::MorseError;

    struct FailingDecoder;

    impl AudioContainerDecoder for FailingDecoder {
        async fn decode(&self, _bytes: &[u8], _mime: &str) -> Result<SampleBuffer> {
            Err(MorseError::DecodeFailure("backend unavailable".to_string()))
        }
    }

    fn pipeline() -> Pipeline<PassthroughConverter, WavDecoder> {
        Pipeline::new(PassthroughConverter, WavDecoder, MorseDecoder::default())
    }

    #[tokio::test]
    async fn test_duration_through_converter() {
        let wav = wav::encode(&[vec![0.0f32; 4000]], 8000).unwrap();
        assert_eq!(pipeline().duration(&wav, "a.wav").await.unwrap(), 0.5);
    }

    #[tokio::test]
    async fn test_conversion_failure_propagates() {
        let err = pipeline().decode(b"OggS....", "a.ogg").await.unwrap_err();
        assert!(matches!(err, MorseError::Conversion(_)));
    }

    #[tokio::test]
    async fn test_decode_failure_propagates() {
        let pipeline = Pipeline::new(PassthroughConverter, FailingDecoder, MorseDecoder::default());
        let wav = wav::encode(&[vec![0.0f32; 16]], 8000).unwrap();
        assert!(matches!(
            pipeline.decode(&wav, "a.wav").await,
            Err(MorseError::DecodeFailure(_))
        ));
        assert!(matches!(
            pipeline.export_wav(&wav, WAV_MIME).await,
            Err(MorseError::DecodeFailure(_))
        ));
    }

    #[tokio::test]
    async fn test_silent_file_is_ambiguous() {
        let wav = wav::encode(&[vec![0.0f32; 8000]], 8000).unwrap();
        assert!(matches!(
            pipeline().process(&wav, "quiet.wav").await,
            Err(MorseError::AmbiguousTiming { .. })
        ));
    }

    #[tokio::test]
    async fn test_export_round_trip() {
        let wav = wav::encode(&[vec![0.25f32; 10], vec![-0.25f32; 10]], 22050).unwrap();
        let exported = pipeline().export_wav(&wav, WAV_MIME).await.unwrap();
        let header = wav::WavHeader::parse(&exported).unwrap();
        assert_eq!(header.channels, 2);
        assert_eq!(header.sample_rate, 22050);
        assert_eq!(header.data_size, 40);
    }
}
