// tests/integration_tests.rs
// End-to-end tests: generated audio through the WAV codec and decoder

use anyhow::Result;
use morsewav::generator::keying;
use morsewav::{
    DecoderConfig, MorseDecoder, MorseError, MorseGenerator, PassthroughConverter, Pipeline,
    WavDecoder, decode_wav_bytes, decode_wav_file, encode, parse_duration,
};
use std::fs;

#[derive(Debug)]
struct TestCase {
    name: &'static str,
    text: &'static str,
    frequency: f32,
    wpm: f32,
    sample_rate: u32,
}

// Every text has more intra-character gaps than letter gaps, so the most
// common gap is one dot long.
const TEST_CASES: &[TestCase] = &[
    TestCase {
        name: "simple_sos",
        text: "SOS",
        frequency: 600.0,
        wpm: 20.0,
        sample_rate: 12000,
    },
    TestCase {
        name: "hello_world",
        text: "HELLO WORLD",
        frequency: 600.0,
        wpm: 20.0,
        sample_rate: 12000,
    },
    TestCase {
        name: "alphabet",
        text: "ABCDEFGHIJKLMNOPQRSTUVWXYZ",
        frequency: 600.0,
        wpm: 15.0,
        sample_rate: 12000,
    },
    TestCase {
        name: "low_freq",
        text: "PARIS",
        frequency: 300.0,
        wpm: 20.0,
        sample_rate: 12000,
    },
    TestCase {
        name: "slow_wpm",
        text: "SLOW",
        frequency: 600.0,
        wpm: 10.0,
        sample_rate: 12000,
    },
    TestCase {
        name: "numbers",
        text: "12345",
        frequency: 600.0,
        wpm: 20.0,
        sample_rate: 12000,
    },
    TestCase {
        name: "mixed",
        text: "CQ DE W1AW",
        frequency: 600.0,
        wpm: 20.0,
        sample_rate: 12000,
    },
    TestCase {
        name: "different_sample_rate",
        text: "RADIO",
        frequency: 600.0,
        wpm: 20.0,
        sample_rate: 44100,
    },
];

#[test]
fn run_generated_wav_suite() -> Result<()> {
    env_logger::try_init().ok();

    for test_case in TEST_CASES {
        let generator =
            MorseGenerator::new(test_case.sample_rate, test_case.frequency, test_case.wpm);
        let wav = generator.generate_wav(test_case.text)?;
        let decoded = decode_wav_bytes(&wav)?;
        println!("{}: '{}' -> '{}'", test_case.name, test_case.text, decoded);
        assert_eq!(decoded, test_case.text, "{}", test_case.name);
        assert_eq!(calculate_accuracy(test_case.text, &decoded), 1.0);
    }
    Ok(())
}

#[test]
fn sos_from_ideal_keying() -> Result<()> {
    // dot=100, dash=300, intra-gap=100, letter-gap=300 samples
    let signal = keying("SOS", 100);
    assert_eq!(MorseDecoder::default().decode_keying(&signal)?, "SOS");
    Ok(())
}

#[test]
fn word_gap_of_seven_units() -> Result<()> {
    let signal = keying("HI HI", 100);
    assert!(signal.windows(700).any(|w| w.iter().all(|&on| !on)));
    assert_eq!(MorseDecoder::default().decode_keying(&signal)?, "HI HI");
    Ok(())
}

#[test]
fn unknown_code_becomes_placeholder() -> Result<()> {
    // Six dots in a row, then a known letter.
    let mut signal = Vec::new();
    for i in 0..6 {
        if i > 0 {
            signal.extend(std::iter::repeat_n(false, 100));
        }
        signal.extend(std::iter::repeat_n(true, 100));
    }
    signal.extend(std::iter::repeat_n(false, 300));
    signal.extend(keying("S", 100));

    assert_eq!(MorseDecoder::default().decode_keying(&signal)?, "?S");
    Ok(())
}

#[test]
fn empty_inputs_fail_cleanly() {
    assert!(matches!(
        parse_duration(&[0u8; 10]),
        Err(MorseError::InvalidFormat { .. })
    ));
    assert!(matches!(
        MorseDecoder::default().decode_keying(&[]),
        Err(MorseError::AmbiguousTiming { .. })
    ));
    assert!(matches!(
        MorseDecoder::default().decode_keying(&vec![true; 5000]),
        Err(MorseError::AmbiguousTiming { .. })
    ));
}

#[test]
fn duration_round_trip() -> Result<()> {
    for (frames, rate, channels) in [(0usize, 8000u32, 1usize), (44100, 44100, 2), (12345, 22050, 3)] {
        let samples = vec![vec![0.1f32; frames]; channels];
        let wav = encode(samples.as_slice(), rate)?;
        let seconds = parse_duration(&wav)?;
        let expected = frames as f64 / f64::from(rate);
        assert!((seconds - expected).abs() < 1e-9, "{seconds} vs {expected}");
    }
    Ok(())
}

#[test]
fn decode_from_file() -> Result<()> {
    let path = std::env::temp_dir().join(format!("morsewav-test-{}.wav", std::process::id()));
    MorseGenerator::new(8000, 700.0, 18.0).generate_wav_file("CQ", &path)?;
    let decoded = decode_wav_file(&path);
    fs::remove_file(&path).ok();
    assert_eq!(decoded?, "CQ");
    Ok(())
}

#[test]
fn resampled_decode() -> Result<()> {
    let generator = MorseGenerator::new(44100, 600.0, 20.0);
    let audio = generator.render("PARIS");
    let decoder = MorseDecoder::new(DecoderConfig {
        resample_to: Some(12000),
        ..DecoderConfig::default()
    });
    let decoded = decoder.decode(&audio)?;
    assert!(calculate_accuracy("PARIS", &decoded) >= 0.8, "decoded {decoded:?}");
    Ok(())
}

#[tokio::test]
async fn pipeline_processes_generated_file() -> Result<()> {
    let generator = MorseGenerator::new(12000, 600.0, 20.0);
    let wav = generator.generate_wav("HELLO WORLD")?;
    let pipeline = Pipeline::new(PassthroughConverter, WavDecoder, MorseDecoder::default());

    let processed = pipeline.process(&wav, "hello.wav").await?;
    assert_eq!(processed.name, "hello.wav");
    assert_eq!(processed.text, "HELLO WORLD");
    assert_eq!(processed.wav, wav);
    let expected = generator.render("HELLO WORLD").duration();
    assert!((processed.duration - expected).abs() < 1e-9);
    Ok(())
}

#[tokio::test]
async fn concurrent_decodes_are_independent() -> Result<()> {
    let pipeline = Pipeline::new(PassthroughConverter, WavDecoder, MorseDecoder::default());
    let sos = MorseGenerator::new(12000, 600.0, 20.0).generate_wav("SOS")?;
    let paris = MorseGenerator::new(8000, 500.0, 25.0).generate_wav("PARIS")?;

    let (a, b) = tokio::join!(pipeline.decode(&sos, "a.wav"), pipeline.decode(&paris, "b.wav"));
    assert_eq!(a?, "SOS");
    assert_eq!(b?, "PARIS");
    Ok(())
}

fn calculate_accuracy(expected: &str, actual: &str) -> f32 {
    if expected.is_empty() {
        return if actual.is_empty() { 1.0 } else { 0.0 };
    }

    let expected_clean = expected.to_uppercase().replace(" ", "");
    let actual_clean = actual.to_uppercase().replace(" ", "").replace("?", "");

    let expected_chars: Vec<char> = expected_clean.chars().collect();
    let actual_chars: Vec<char> = actual_clean.chars().collect();

    let max_len = expected_chars.len().max(actual_chars.len());
    if max_len == 0 {
        return 1.0;
    }
    let matches = (0..max_len)
        .filter(|&i| expected_chars.get(i) == actual_chars.get(i))
        .count();

    matches as f32 / max_len as f32
}

#[test]
fn test_accuracy_calculation() {
    assert_eq!(calculate_accuracy("SOS", "SOS"), 1.0);
    assert_eq!(calculate_accuracy("SOS", "SO"), 2.0 / 3.0);
    assert_eq!(calculate_accuracy("SOS", "XOS"), 2.0 / 3.0);
    assert_eq!(calculate_accuracy("HELLO", "WORLD"), 1.0 / 5.0);
    assert_eq!(calculate_accuracy("", ""), 1.0);
    assert_eq!(calculate_accuracy("A", ""), 0.0);
}
