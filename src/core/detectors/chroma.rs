//! Harmonic matching on pitch-class profiles

use super::{feature_detections, OptionalDetector};
use crate::config::ChromaSettings;
use crate::core::error::FeatureError;
use crate::core::features::extract_chroma;
use crate::core::signal::AudioSignal;
use crate::detection::{Detection, Method};

/// Finds the pattern by comparing chroma over time; robust to timbre changes.
#[derive(Debug, Clone, Default)]
pub struct ChromaDetector {
    settings: ChromaSettings,
}

impl ChromaDetector {
    pub fn new(settings: ChromaSettings) -> Self {
        Self { settings }
    }
}

impl OptionalDetector for ChromaDetector {
    fn method(&self) -> Method {
        Method::Chroma
    }

    fn detect(
        &self,
        pattern: &AudioSignal,
        target: &AudioSignal,
    ) -> Result<Vec<Detection>, FeatureError> {
        let pattern_chroma = extract_chroma(pattern, &self.settings, "pattern")?;
        let target_chroma = extract_chroma(target, &self.settings, "target")?;

        feature_detections(
            &target_chroma,
            &pattern_chroma,
            self.settings.min_height,
            self.settings.min_separation_secs,
            Method::Chroma,
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

        let found = ChromaDetector::default()
            .detect(&AudioSignal::new(pattern, sr), &AudioSignal::new(target, sr))
            .unwrap();

        assert_eq!(found.len(), 1);
        assert!((found[0].time - 2.0).abs() < 0.05, "{}", found[0].time);
        assert!(found[0].confidence > 0.99);
    }

    #[test]
    fn test_empty_pattern_fails_softly() {
        let outcome = ChromaDetector::default().run(
            &AudioSignal::new(vec![], 22050),
            &AudioSignal::new(vec![0.1; 22050], 22050),
        );
        assert_eq!(outcome, MethodOutcome::Failed(FeatureError::EmptySignal("pattern")));
    }

    #[test]
    fn test_silent_target_completes_empty() {
        let sr = 22050;
        let outcome = ChromaDetector::default().run(
            &AudioSignal::new(chirp(4410, sr, 400.0, 800.0), sr),
            &AudioSignal::new(vec![0.0; sr as usize], sr),
        );
        assert_eq!(outcome, MethodOutcome::Completed(vec![]));
    }
}
