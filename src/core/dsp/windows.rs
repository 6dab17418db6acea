//! Window function implementations

use std::f32::consts::PI;

/// Periodic Hann window, the usual choice for overlapping STFT frames
pub fn hann_window(size: usize) -> Vec<f32> {
    let n = size as f32;
    (0..size)
        .map(|i| 0.5 * (1.0 - (2.0 * PI * i as f32 / n).cos()))
        .collect()
}
