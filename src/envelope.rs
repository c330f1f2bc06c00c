//! Amplitude envelope and tone/silence keying

/// Instantaneous absolute amplitude of each sample.
pub fn envelope(samples: &[f32]) -> Vec<f32> {
    samples.iter().map(|s| s.abs()).collect()
}

/// Marks each envelope value as tone (`true`) when strictly above `threshold`.
pub fn binarize(envelope: &[f32], threshold: f32) -> Vec<bool> {
    envelope.iter().map(|&e| e > threshold).collect()
}

/// Tone/silence keying of raw samples.
pub fn keying(samples: &[f32], threshold: f32) -> Vec<bool> {
    binarize(&envelope(samples), threshold)
}
