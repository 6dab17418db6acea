//! Waveform cross-correlation detector

use crate::config::CorrelationSettings;
use crate::core::dsp::{
    all_finite, cross_correlate, find_peaks_with_properties, normalize_by_peak, PeakCriteria,
};
use crate::core::error::{AnalysisError, EngineResult};
use crate::core::signal::NormalizedSignal;
use crate::detection::{Detection, Method};

/// Detections plus the full normalized correlation curve
#[derive(Debug, Clone, PartialEq)]
pub struct CorrelationOutput {
    pub detections: Vec<Detection>,
    /// One value per target sample (lag), peak magnitude ~1.0
    pub curve: Vec<f32>,
}

/// FFT cross-correlation of the normalized waveforms
#[derive(Debug, Clone, Default)]
pub struct CorrelationDetector {
    settings: CorrelationSettings,
}

impl CorrelationDetector {
    pub fn new(settings: CorrelationSettings) -> Self {
        Self { settings }
    }

    pub fn detect(
        &self,
        pattern: &NormalizedSignal,
        target: &NormalizedSignal,
    ) -> EngineResult<CorrelationOutput> {
        validate(pattern, target)?;

        let curve = normalize_by_peak(&cross_correlate(target.samples(), pattern.samples()));
        if !all_finite(&curve) {
            return Err(AnalysisError::Correlation(
                "correlation curve contains non-finite values".to_string(),
            ));
        }

        let criteria = self.criteria(pattern.len());
        let sample_rate = target.sample_rate() as f64;
        let max_time = target.duration_secs();

        let detections: Vec<Detection> = find_peaks_with_properties(&curve, &criteria)
            .into_iter()
            .map(|peak| {
                Detection::new(
                    peak.index as f64 / sample_rate,
                    peak.height.unwrap_or(1.0),
                    Method::Correlation,
                )
            })
            .filter(|d| d.time >= 0.0 && d.time <= max_time)
            .collect();

        log::debug!(
            "correlation: {} detections (min distance {} samples)",
            detections.len(),
            criteria.distance
        );

        Ok(CorrelationOutput { detections, curve })
    }

    fn criteria(&self, pattern_len: usize) -> PeakCriteria {
        let distance = (pattern_len as f32 * self.settings.distance_ratio) as usize;
        PeakCriteria {
            height: Some(self.settings.min_height),
            prominence: Some(self.settings.min_prominence),
            distance: distance.max(1),
            width: Some(self.settings.min_width),
        }
    }
}

fn validate(pattern: &NormalizedSignal, target: &NormalizedSignal) -> EngineResult<()> {
    if pattern.sample_rate() != target.sample_rate() {
        return Err(AnalysisError::SampleRateMismatch {
            pattern: pattern.sample_rate(),
            target: target.sample_rate(),
        });
    }
    if target.sample_rate() == 0 {
        return Err(AnalysisError::Correlation("sample rate is zero".to_string()));
    }
    if pattern.is_empty() {
        return Err(AnalysisError::Correlation("pattern signal is empty".to_string()));
    }
    if pattern.len() > target.len() {
        return Err(AnalysisError::Correlation(format!(
            "pattern ({} samples) is longer than target ({} samples)",
            pattern.len(),
            target.len()
        )));
    }
    if !all_finite(pattern.samples()) || !all_finite(target.samples()) {
        return Err(AnalysisError::Correlation(
            "input contains non-finite samples".to_string(),
        ));
    }
    Ok(())
}
