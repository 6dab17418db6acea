//! Frame-based feature extraction
//!
//! Both extractors share the same centered STFT framing, so frame `t` of a
//! [`FeatureMatrix`] describes the audio around sample `t * hop_size`.

mod chroma;
mod contrast;

pub use chroma::{extract_chroma, CHROMA_BINS};
pub use contrast::extract_spectral_contrast;

use crate::core::dsp::all_finite;
use crate::core::error::FeatureError;
use crate::core::signal::AudioSignal;

/// Feature channels (rows) by frames (columns)
#[derive(Debug, Clone, PartialEq)]
pub struct FeatureMatrix {
    rows: Vec<Vec<f32>>,
    hop_size: usize,
    sample_rate: u32,
}

impl FeatureMatrix {
    pub fn new(rows: Vec<Vec<f32>>, hop_size: usize, sample_rate: u32) -> Self {
        Self {
            rows,
            hop_size,
            sample_rate,
        }
    }

    pub fn rows(&self) -> &[Vec<f32>] {
        &self.rows
    }

    pub fn channel_count(&self) -> usize {
        self.rows.len()
    }

    pub fn frame_count(&self) -> usize {
        self.rows.first().map_or(0, Vec::len)
    }

    pub fn hop_size(&self) -> usize {
        self.hop_size
    }

    pub fn sample_rate(&self) -> u32 {
        self.sample_rate
    }

    /// Time of a frame's center in seconds
    pub fn frame_to_secs(&self, frame: usize) -> f64 {
        (frame * self.hop_size) as f64 / self.sample_rate as f64
    }

    /// Number of frames spanning `secs` seconds, at least one
    pub fn secs_to_frames(&self, secs: f32) -> usize {
        let frames = (secs as f64 * self.sample_rate as f64 / self.hop_size as f64).round();
        (frames as usize).max(1)
    }
}

/// Reject inputs no extractor can describe
fn check_signal(signal: &AudioSignal, role: &'static str) -> Result<(), FeatureError> {
    if signal.is_empty() {
        return Err(FeatureError::EmptySignal(role));
    }
    if !all_finite(signal.samples()) {
        return Err(FeatureError::NonFiniteSamples(role));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_frame_time_conversion() {
        let matrix = FeatureMatrix::new(vec![vec![0.0; 10]], 512, 22050);
        assert_eq!(matrix.frame_count(), 10);
        assert!((matrix.frame_to_secs(43) - 43.0 * 512.0 / 22050.0).abs() < 1e-12);
        assert_eq!(matrix.secs_to_frames(0.5), 22);
        assert_eq!(matrix.secs_to_frames(0.0), 1);
    }

    #[test]
    fn test_check_signal() {
        let empty = AudioSignal::new(vec![], 22050);
        assert_eq!(check_signal(&empty, "pattern"), Err(FeatureError::EmptySignal("pattern")));

        let bad = AudioSignal::new(vec![0.0, f32::NAN], 22050);
        assert_eq!(check_signal(&bad, "target"), Err(FeatureError::NonFiniteSamples("target")));
    }
}
