use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use morsewav::config::{DEFAULT_FFMPEG, DEFAULT_MIN_GAP_SAMPLES, DEFAULT_THRESHOLD};
use morsewav::{
    ConverterConfig, DecoderConfig, FfmpegConverter, FormatConverter, MorseDecoder,
    MorseGenerator, PassthroughConverter, Pipeline, WavDecoder,
};
use std::path::{Path, PathBuf};

#[derive(Parser)]
#[command(author, version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Command,

    /// Envelope threshold separating tone from silence
    #[arg(long, global = true, default_value_t = DEFAULT_THRESHOLD)]
    threshold: f32,

    /// Silence runs shorter than this many samples are ignored
    #[arg(long, global = true, default_value_t = DEFAULT_MIN_GAP_SAMPLES)]
    min_gap: usize,

    /// Resample to this rate (Hz) before decoding
    #[arg(long, global = true)]
    resample: Option<u32>,

    /// ffmpeg executable used to convert non-WAV input
    #[arg(long, global = true, default_value = DEFAULT_FFMPEG)]
    ffmpeg: String,

    /// Only accept WAV input; never run ffmpeg
    #[arg(long, global = true)]
    no_ffmpeg: bool,
}

#[derive(Subcommand)]
enum Command {
    /// Decode the Morse message in an audio file
    Decode {
        #[arg(value_name = "AUDIO_FILE")]
        file: PathBuf,
    },
    /// Print the duration of an audio file in seconds
    Duration {
        #[arg(value_name = "AUDIO_FILE")]
        file: PathBuf,
    },
    /// Convert an audio file to 16-bit PCM WAV
    Export {
        #[arg(value_name = "AUDIO_FILE")]
        file: PathBuf,
        #[arg(short, long)]
        output: PathBuf,
    },
    /// Render text as a Morse WAV file
    Generate {
        text: String,
        #[arg(short, long)]
        output: PathBuf,
        #[arg(long, default_value_t = 12000)]
        sample_rate: u32,
        #[arg(long, default_value_t = 600.0)]
        frequency: f32,
        #[arg(long, default_value_t = 20.0)]
        wpm: f32,
    },
}

enum Converter {
    Ffmpeg(FfmpegConverter),
    Passthrough(PassthroughConverter),
}

impl FormatConverter for Converter {
    async fn convert_to_wav(&self, bytes: &[u8], filename: &str) -> morsewav::Result<Vec<u8>> {
        match self {
            Converter::Ffmpeg(c) => c.convert_to_wav(bytes, filename).await,
            Converter::Passthrough(c) => c.convert_to_wav(bytes, filename).await,
        }
    }
}

fn read_input(path: &Path) -> Result<(Vec<u8>, String)> {
    log::info!("Opening audio file: {:?}", path);
    let bytes = std::fs::read(path).with_context(|| format!("cannot read {:?}", path))?;
    let name = path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default();
    Ok((bytes, name))
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
    // Set up logging. Use `RUST_LOG=info` or `RUST_LOG=debug` to see output.
    env_logger::init();
    let cli = Cli::parse();

    let converter = if cli.no_ffmpeg {
        Converter::Passthrough(PassthroughConverter)
    } else {
        Converter::Ffmpeg(FfmpegConverter::new(ConverterConfig {
            program: cli.ffmpeg.clone(),
            ..ConverterConfig::default()
        }))
    };
    let decoder = MorseDecoder::new(DecoderConfig {
        threshold: cli.threshold,
        min_gap_samples: cli.min_gap,
        resample_to: cli.resample,
    });
    let pipeline = Pipeline::new(converter, WavDecoder, decoder);

    match cli.command {
        Command::Decode { file } => {
            let (bytes, name) = read_input(&file)?;
            let text = pipeline.decode(&bytes, &name).await?;
            println!("\n--- Decoded Text ---");
            println!("{}", text);
        }
        Command::Duration { file } => {
            let (bytes, name) = read_input(&file)?;
            let seconds = pipeline.duration(&bytes, &name).await?;
            println!("{:.3}", seconds);
        }
        Command::Export { file, output } => {
            let (bytes, name) = read_input(&file)?;
            let wav = pipeline.export(&bytes, &name).await?;
            std::fs::write(&output, wav).with_context(|| format!("cannot write {:?}", output))?;
            log::info!("Wrote {:?}", output);
        }
        Command::Generate {
            text,
            output,
            sample_rate,
            frequency,
            wpm,
        } => {
            MorseGenerator::new(sample_rate, frequency, wpm).generate_wav_file(&text, &output)?;
        }
    }

    Ok(())
}
