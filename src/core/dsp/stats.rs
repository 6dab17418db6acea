//! Small statistics helpers shared by the detectors

/// Guard added to a curve's peak magnitude before dividing
pub const CURVE_EPSILON: f32 = 1e-8;

/// Largest absolute value, 0.0 for an empty slice
pub fn max_abs(data: &[f32]) -> f32 {
    data.iter().map(|v| v.abs()).fold(0.0f32, f32::max)
}

/// Divide a similarity curve by its own peak magnitude (plus epsilon)
pub fn normalize_by_peak(curve: &[f32]) -> Vec<f32> {
    let scale = max_abs(curve) + CURVE_EPSILON;
    curve.iter().map(|&v| v / scale).collect()
}

/// Element-wise mean of equal-length rows
pub fn mean_rows(rows: &[Vec<f32>]) -> Vec<f32> {
    let Some(first) = rows.first() else {
        return Vec::new();
    };

    let mut mean = vec![0.0f32; first.len()];
    for row in rows {
        for (acc, &v) in mean.iter_mut().zip(row.iter()) {
            *acc += v;
        }
    }

    let count = rows.len() as f32;
    mean.iter_mut().for_each(|v| *v /= count);
    mean
}

pub fn all_finite(data: &[f32]) -> bool {
    data.iter().all(|v| v.is_finite())
}
