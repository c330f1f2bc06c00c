//! Run-length segmentation of a keyed signal

/// Keying state of a run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RunState {
    Tone,
    Silence,
}

impl From<bool> for RunState {
    fn from(on: bool) -> Self {
        if on { RunState::Tone } else { RunState::Silence }
    }
}

/// A maximal span of samples sharing one state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Run {
    pub state: RunState,
    /// Length in samples
    pub duration: usize,
}

impl Run {
    pub fn new(state: RunState, duration: usize) -> Self {
        Self { state, duration }
    }

    pub fn is_silence(&self) -> bool {
        self.state == RunState::Silence
    }
}

/// Collapses consecutive equal values into runs. The first run takes its
/// state from the first sample; empty input gives no runs.
pub fn segment(binary: &[bool]) -> Vec<Run> {
    let mut runs: Vec<Run> = Vec::new();
    for &on in binary {
        let state = RunState::from(on);
        match runs.last_mut() {
            Some(run) if run.state == state => run.duration += 1,
            _ => runs.push(Run::new(state, 1)),
        }
    }
    runs
}

/// Drops silence runs shorter than `min_gap` samples. Tone runs are kept
/// whatever their length.
pub fn denoise(runs: &[Run], min_gap: usize) -> Vec<Run> {
    runs.iter()
        .filter(|run| !(run.is_silence() && run.duration < min_gap))
        .copied()
        .collect()
}

/// Merges adjacent runs with the same state, summing their durations.
pub fn coalesce(runs: &[Run]) -> Vec<Run> {
    let mut merged: Vec<Run> = Vec::with_capacity(runs.len());
    for &run in runs {
        match merged.last_mut() {
            Some(last) if last.state == run.state => last.duration += run.duration,
            _ => merged.push(run),
        }
    }
    merged
}

/// Segments, denoises and coalesces in one go.
pub fn clean_runs(binary: &[bool], min_gap: usize) -> Vec<Run> {
    let runs = segment(binary);
    let cleaned = coalesce(&denoise(&runs, min_gap));
    log::debug!(
        "Segmented {} samples into {} runs, {} after denoising",
        binary.len(),
        runs.len(),
        cleaned.len()
    );
    cleaned
}
