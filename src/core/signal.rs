// src/core/signal.rs
//
// Mono signal containers and peak normalization.

/// Guard added to the peak before dividing
pub const NORMALIZE_EPSILON: f32 = 1e-8;

/// Mono audio at a known sample rate
#[derive(Debug, Clone, PartialEq)]
pub struct AudioSignal {
    samples: Vec<f32>,
    sample_rate: u32,
}

impl AudioSignal {
    pub fn new(samples: Vec<f32>, sample_rate: u32) -> Self {
        Self { samples, sample_rate }
    }

    /// Average interleaved multi-channel samples down to mono.
    /// A trailing partial frame is dropped.
    pub fn from_interleaved(samples: &[f32], channels: usize, sample_rate: u32) -> Self {
        if channels <= 1 {
            return Self::new(samples.to_vec(), sample_rate);
        }

        let mono = samples
            .chunks_exact(channels)
            .map(|frame| frame.iter().sum::<f32>() / channels as f32)
            .collect();

        Self::new(mono, sample_rate)
    }

    pub fn samples(&self) -> &[f32] {
        &self.samples
    }

    pub fn sample_rate(&self) -> u32 {
        self.sample_rate
    }

    pub fn len(&self) -> usize {
        self.samples.len()
    }

    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    pub fn duration_secs(&self) -> f64 {
        if self.sample_rate == 0 {
            return 0.0;
        }
        self.samples.len() as f64 / self.sample_rate as f64
    }

    pub fn peak(&self) -> f32 {
        self.samples.iter().map(|s| s.abs()).fold(0.0f32, f32::max)
    }

    /// Scale to unit peak. Silence stays silence.
    pub fn normalize(&self) -> NormalizedSignal {
        let scale = self.peak() + NORMALIZE_EPSILON;
        let samples = self.samples.iter().map(|&s| s / scale).collect();
        NormalizedSignal(AudioSignal::new(samples, self.sample_rate))
    }
}

/// An [`AudioSignal`] scaled so its largest absolute sample is ~1.0
#[derive(Debug, Clone, PartialEq)]
pub struct NormalizedSignal(AudioSignal);

impl NormalizedSignal {
    pub fn samples(&self) -> &[f32] {
        self.0.samples()
    }

    pub fn sample_rate(&self) -> u32 {
        self.0.sample_rate()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn duration_secs(&self) -> f64 {
        self.0.duration_secs()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_interleaved_stereo_averages_channels() {
        let signal = AudioSignal::from_interleaved(&[0.5, -0.5, 0.3, 0.1, 1.0], 2, 8000);
        assert_eq!(signal.len(), 2);
        assert!((signal.samples()[0] - 0.0).abs() < 1e-6);
        assert!((signal.samples()[1] - 0.2).abs() < 1e-6);
    }

    #[test]
    fn test_normalize_reaches_unit_peak() {
        let signal = AudioSignal::new(vec![0.1, -0.25, 0.2], 22050);
        let normalized = signal.normalize();
        let peak = normalized.samples().iter().map(|s| s.abs()).fold(0.0f32, f32::max);
        assert!((peak - 1.0).abs() < 1e-5);
        assert!(normalized.samples()[1] < 0.0);
    }

    #[test]
    fn test_normalize_silence_stays_zero() {
        let signal = AudioSignal::new(vec![0.0; 64], 22050);
        let normalized = signal.normalize();
        assert!(normalized.samples().iter().all(|&s| s == 0.0));
    }

    #[test]
    fn test_duration() {
        let signal = AudioSignal::new(vec![0.0; 44100], 22050);
        assert!((signal.duration_secs() - 2.0).abs() < 1e-12);
        assert_eq!(AudioSignal::new(vec![0.0; 10], 0).duration_secs(), 0.0);
    }
}
