//! Time-unit inference and run classification
//!
//! The dot length ("dit") is taken as the most common silence gap, which in
//! well-formed Morse is the gap between elements of one character. Every run
//! is then measured in whole units and classified.

use std::collections::BTreeMap;

use crate::error::{MorseError, Result};
use crate::segment::{Run, RunState};

// A tone of at most one unit is a dot; anything longer is a dash.
const DOT_MAX_UNITS: u64 = 1;
// Gaps of up to three units separate letters, longer ones separate words.
const LETTER_GAP_MAX_UNITS: u64 = 3;

/// A classified Morse element.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Symbol {
    Dot,
    Dash,
    LetterGap,
    WordGap,
}

/// Samples per dot.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TimeUnit(usize);

impl TimeUnit {
    /// Returns `None` for a zero-length unit.
    pub fn new(samples: usize) -> Option<Self> {
        (samples > 0).then_some(Self(samples))
    }

    /// Infers the unit from the silence runs of a denoised, coalesced run
    /// sequence. Only gaps of at least `min_gap` samples that lie between two
    /// tones are considered; leading and trailing silence is not a gap.
    pub fn estimate(runs: &[Run], min_gap: usize) -> Result<Self> {
        let interior: &[Run] = match runs {
            [_, inner @ .., _] => inner,
            _ => &[],
        };
        let significant: Vec<usize> = interior
            .iter()
            .filter(|run| run.is_silence() && run.duration >= min_gap.max(1))
            .map(|run| run.duration)
            .collect();

        let unit = mode(&significant).ok_or_else(|| MorseError::AmbiguousTiming {
            silence_runs: runs.iter().filter(|run| run.is_silence()).count(),
        })?;
        log::info!(
            "Time unit: {} samples (mode of {} gaps)",
            unit,
            significant.len()
        );
        Ok(Self(unit))
    }

    pub fn samples(self) -> usize {
        self.0
    }

    /// Duration rounded to the nearest whole number of units.
    pub fn units(self, duration: usize) -> u64 {
        (duration as f64 / self.0 as f64).round() as u64
    }

    /// Classifies one run. Intra-character gaps yield `None`.
    pub fn classify_run(self, run: &Run) -> Option<Symbol> {
        let units = self.units(run.duration);
        match run.state {
            RunState::Tone if units <= DOT_MAX_UNITS => Some(Symbol::Dot),
            RunState::Tone => Some(Symbol::Dash),
            RunState::Silence if units <= DOT_MAX_UNITS => None,
            RunState::Silence if units <= LETTER_GAP_MAX_UNITS => Some(Symbol::LetterGap),
            RunState::Silence => Some(Symbol::WordGap),
        }
    }

    pub fn classify(self, runs: &[Run]) -> Vec<Symbol> {
        runs.iter().filter_map(|run| self.classify_run(run)).collect()
    }
}

/// The most frequent value. Ties go to the smallest value; empty input has
/// no mode.
pub fn mode<T: Ord + Copy>(values: &[T]) -> Option<T> {
    let mut counts: BTreeMap<T, usize> = BTreeMap::new();
    for &v in values {
        *counts.entry(v).or_insert(0) += 1;
    }
    // Ascending iteration plus a strict comparison keeps the smallest value on ties.
    let mut best: Option<(T, usize)> = None;
    for (value, count) in counts {
        if best.is_none_or(|(_, c)| count > c) {
            best = Some((value, count));
        }
    }
    best.map(|(value, _)| value)
}
