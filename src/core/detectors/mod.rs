//! Per-method detectors
//!
//! The correlation detector is mandatory and returns fatal errors. The chroma
//! and spectral detectors implement [`OptionalDetector`]: a failure there is
//! logged and reported as [`MethodOutcome::Failed`], and the analysis goes on
//! without that method.

mod chroma;
mod correlation;
mod spectral;

pub use chroma::ChromaDetector;
pub use correlation::{CorrelationDetector, CorrelationOutput};
pub use spectral::SpectralDetector;

use crate::core::dsp::{
    correlate_same, find_peaks_with_properties, mean_rows, normalize_by_peak, PeakCriteria,
};
use crate::core::error::FeatureError;
use crate::core::features::FeatureMatrix;
use crate::core::signal::AudioSignal;
use crate::detection::{Detection, Method, MethodState, MethodStatus};

/// What an optional method produced
#[derive(Debug, Clone, PartialEq)]
pub enum MethodOutcome {
    /// Ran to completion; the list may be empty
    Completed(Vec<Detection>),
    /// Faulted; contributes nothing to the merge
    Failed(FeatureError),
}

impl MethodOutcome {
    pub fn detections(&self) -> &[Detection] {
        match self {
            MethodOutcome::Completed(d) => d,
            MethodOutcome::Failed(_) => &[],
        }
    }

    pub fn is_failed(&self) -> bool {
        matches!(self, MethodOutcome::Failed(_))
    }

    pub fn status(&self, method: Method) -> MethodStatus {
        match self {
            MethodOutcome::Completed(d) => MethodStatus {
                method,
                status: MethodState::Ok,
                detections: d.len(),
                error: None,
            },
            MethodOutcome::Failed(e) => MethodStatus {
                method,
                status: MethodState::Failed,
                detections: 0,
                error: Some(e.to_string()),
            },
        }
    }
}

/// A feature-based method whose faults must not abort the analysis
pub trait OptionalDetector {
    fn method(&self) -> Method;

    /// Detect the pattern inside the target; both are raw mono signals.
    fn detect(
        &self,
        pattern: &AudioSignal,
        target: &AudioSignal,
    ) -> Result<Vec<Detection>, FeatureError>;

    /// Run [`detect`](Self::detect), turning a fault into a logged failure.
    fn run(&self, pattern: &AudioSignal, target: &AudioSignal) -> MethodOutcome {
        match self.detect(pattern, target) {
            Ok(detections) => {
                log::debug!("{}: {} detections", self.method(), detections.len());
                MethodOutcome::Completed(detections)
            }
            Err(e) => {
                log::warn!("{} analysis skipped: {}", self.method(), e);
                MethodOutcome::Failed(e)
            }
        }
    }
}

/// Average same-length row correlations into one curve normalized by its peak.
pub fn feature_similarity(
    target: &FeatureMatrix,
    pattern: &FeatureMatrix,
) -> Result<Vec<f32>, FeatureError> {
    if pattern.frame_count() > target.frame_count() {
        return Err(FeatureError::PatternLongerThanTarget {
            pattern: pattern.frame_count(),
            target: target.frame_count(),
        });
    }

    let rows: Vec<Vec<f32>> = target
        .rows()
        .iter()
        .zip(pattern.rows())
        .map(|(t, p)| correlate_same(t, p))
        .collect();

    Ok(normalize_by_peak(&mean_rows(&rows)))
}

/// Shared peak picking for the feature-based methods.
///
/// A centered curve peaks half a pattern after the match begins, so the peak
/// index is shifted back to report where the match starts, the same reference
/// the correlation lags use.
fn feature_detections(
    target: &FeatureMatrix,
    pattern: &FeatureMatrix,
    min_height: f32,
    min_separation_secs: f32,
    method: Method,
    target_duration: f64,
) -> Result<Vec<Detection>, FeatureError> {
    let curve = feature_similarity(target, pattern)?;

    let criteria = PeakCriteria {
        height: Some(min_height),
        distance: target.secs_to_frames(min_separation_secs),
        ..Default::default()
    };

    let lead = pattern.frame_count() / 2;

    Ok(find_peaks_with_properties(&curve, &criteria)
        .into_iter()
        .map(|peak| {
            Detection::new(
                target.frame_to_secs(peak.index.saturating_sub(lead)),
                peak.height.unwrap_or(1.0),
                method,
            )
        })
        .filter(|d| d.time >= 0.0 && d.time <= target_duration)
        .collect())
}
