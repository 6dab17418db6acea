// src/core/visualization/sampler.rs
//
// Stride decimation for display curves.

/// Target point count for waveform and correlation previews
pub const DEFAULT_POINTS: usize = 500;

/// Keep every Nth value, N = max(1, len / target_points).
///
/// Plain decimation, no averaging: the output has `ceil(len / N)` points,
/// so it can exceed `target_points` by up to one stride's remainder. Inputs
/// shorter than the target come back unchanged. A target of zero is treated
/// as one.
pub fn downsample(data: &[f32], target_points: usize) -> Vec<f32> {
    let step = (data.len() / target_points.max(1)).max(1);
    data.iter().step_by(step).copied().collect()
}
