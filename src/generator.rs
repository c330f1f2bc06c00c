// src/generator.rs
// Synthetic Morse audio and keying signals

use std::f32::consts::PI;
use std::path::Path;

use crate::buffer::SampleBuffer;
use crate::error::Result;
use crate::morse::char_to_morse;

/// Tone amplitude. Dropped sub-threshold samples near zero crossings shorten
/// every keyed tone, so it must sit well above the 0.3 decode threshold for a
/// dash to still measure about three units.
const DEFAULT_AMPLITUDE: f32 = 0.9;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MorseElement {
    Dot,
    Dash,
    ElementGap,
    LetterGap,
    WordGap,
}

impl MorseElement {
    /// Standard length in dot units.
    pub fn units(self) -> usize {
        match self {
            MorseElement::Dot | MorseElement::ElementGap => 1,
            MorseElement::Dash | MorseElement::LetterGap => 3,
            MorseElement::WordGap => 7,
        }
    }

    pub fn is_tone(self) -> bool {
        matches!(self, MorseElement::Dot | MorseElement::Dash)
    }
}

/// Converts text to keyed elements. Characters without a code are skipped,
/// and so are words left empty by that.
pub fn text_to_morse(text: &str) -> Vec<MorseElement> {
    let words: Vec<Vec<&str>> = text
        .split_whitespace()
        .map(|word| word.chars().filter_map(char_to_morse).collect::<Vec<_>>())
        .filter(|codes| !codes.is_empty())
        .collect();

    let mut result = Vec::new();
    for (word_idx, word) in words.iter().enumerate() {
        if word_idx > 0 {
            result.push(MorseElement::WordGap);
        }
        for (char_idx, code) in word.iter().enumerate() {
            if char_idx > 0 {
                result.push(MorseElement::LetterGap);
            }
            for (elem_idx, morse_char) in code.chars().enumerate() {
                if elem_idx > 0 {
                    result.push(MorseElement::ElementGap);
                }
                result.push(if morse_char == '.' {
                    MorseElement::Dot
                } else {
                    MorseElement::Dash
                });
            }
        }
    }
    result
}

/// Ideal binary keying with `unit_samples` samples per dot.
pub fn keying(text: &str, unit_samples: usize) -> Vec<bool> {
    let mut out = Vec::new();
    for element in text_to_morse(text) {
        out.extend(std::iter::repeat_n(
            element.is_tone(),
            element.units() * unit_samples,
        ));
    }
    out
}

/// Renders text as a keyed sine tone.
pub struct MorseGenerator {
    sample_rate: u32,
    frequency: f32,
    amplitude: f32,
    dot_duration: f32,
}

impl MorseGenerator {
    /// PARIS timing: one dot lasts 1.2 / wpm seconds.
    pub fn new(sample_rate: u32, frequency: f32, wpm: f32) -> Self {
        Self {
            sample_rate,
            frequency,
            amplitude: DEFAULT_AMPLITUDE,
            dot_duration: 1.2 / wpm,
        }
    }

    pub fn with_amplitude(mut self, amplitude: f32) -> Self {
        self.amplitude = amplitude.clamp(0.0, 1.0);
        self
    }

    /// Samples per dot at this generator's rate and speed.
    pub fn unit_samples(&self) -> usize {
        (self.dot_duration * self.sample_rate as f32).round() as usize
    }

    pub fn render(&self, text: &str) -> SampleBuffer {
        let unit = self.unit_samples();
        let mut samples = Vec::new();
        for element in text_to_morse(text) {
            let len = element.units() * unit;
            if element.is_tone() {
                self.write_tone(&mut samples, len);
            } else {
                samples.extend(std::iter::repeat_n(0.0, len));
            }
        }
        SampleBuffer::mono(samples, self.sample_rate)
    }

    pub fn generate_wav(&self, text: &str) -> Result<Vec<u8>> {
        self.render(text).to_wav()
    }

    pub fn generate_wav_file<P: AsRef<Path>>(&self, text: &str, path: P) -> Result<()> {
        let bytes = self.generate_wav(text)?;
        std::fs::write(path.as_ref(), bytes)?;
        log::info!("Wrote {:?} for {:?}", path.as_ref(), text);
        Ok(())
    }

    fn write_tone(&self, out: &mut Vec<f32>, len: usize) {
        for i in 0..len {
            let t = i as f32 / self.sample_rate as f32;
            out.push((2.0 * PI * self.frequency * t).sin() * self.amplitude);
        }
    }
}
