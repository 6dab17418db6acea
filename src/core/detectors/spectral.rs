//! Timbre matching on octave-band spectral contrast

use super::{feature_detections, OptionalDetector};
use crate::config::SpectralSettings;
use crate::core::error::FeatureError;
use crate::core::features::extract_spectral_contrast;
use crate::core::signal::AudioSignal;
use crate::detection::{Detection, Method};

#[derive(Debug, Clone, Default)]
pub struct SpectralDetector {
    settings: SpectralSettings,
}

impl SpectralDetector {
    pub fn new(settings: SpectralSettings) -> Self {
        Self { settings }
    }
}

impl OptionalDetector for SpectralDetector {
    fn method(&self) -> Method {
        Method::Spectral
    }

    fn detect(
        &self,
        pattern: &AudioSignal,
        target: &AudioSignal,
    ) -> Result<Vec<Detection>, FeatureError> {
        let pattern_contrast = extract_spectral_contrast(pattern, &self.settings, "pattern")?;
        let target_contrast = extract_spectral_contrast(target, &self.settings, "target")?;

        feature_detections(
            &target_contrast,
            &pattern_contrast,
            self.settings.min_height,
            self.settings.min_separation_secs,
            Method::Spectral,
            target.duration_secs(),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::detectors::MethodOutcome;
    use crate::testgen::chirp;

    #[test]
    fn test_finds_embedded_chirp() {
        let sr = 22050;
        let pattern = chirp(8820, sr, 300.0, 3000.0);
        let mut target = vec![0.0f32; sr as usize * 4];
        target[44100..44100 + pattern.len()].copy_from_slice(&pattern);

        let found = SpectralDetector::default()
            .detect(&AudioSignal::new(pattern, sr), &AudioSignal::new(target, sr))
            .unwrap();

        assert_eq!(found.len(), 1);
        assert!((found[0].time - 2.0).abs() < 0.05, "{}", found[0].time);
        assert!(found[0].confidence > 0.99);
    }

    #[test]
    fn test_low_sample_rate_fails_softly() {
        // Nyquist of 2 kHz sits below the upper contrast bands
        let sr = 4000;
        let outcome = SpectralDetector::default().run(
            &AudioSignal::new(chirp(800, sr, 300.0, 900.0), sr),
            &AudioSignal::new(vec![0.1; 8000], sr),
        );
        assert!(matches!(
            outcome,
            MethodOutcome::Failed(FeatureError::BandAboveNyquist { .. })
        ));
        assert!(outcome.detections().is_empty());
    }
}
