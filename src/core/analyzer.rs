// src/core/analyzer.rs
//
// High-level pattern detection API with builder pattern.

use anyhow::Result;
use std::path::Path;

use super::decoder::load_signal;
use super::detectors::{
    ChromaDetector, CorrelationDetector, CorrelationOutput, MethodOutcome, OptionalDetector,
    SpectralDetector,
};
use super::error::{AnalysisError, EngineResult};
use super::merger::DetectionMerger;
use super::signal::AudioSignal;
use super::visualization::downsample;
use crate::config::EngineConfig;
use crate::detection::{DetectionResult, Method};

/// Builder for PatternAnalyzer configuration
pub struct AnalyzerBuilder {
    config: EngineConfig,
}

impl AnalyzerBuilder {
    pub fn new() -> Self {
        Self {
            config: EngineConfig::default(),
        }
    }

    /// Start from a loaded configuration
    pub fn config(mut self, config: EngineConfig) -> Self {
        self.config = config;
        self
    }

    pub fn correlation_threshold(mut self, height: f32) -> Self {
        self.config.correlation.min_height = height;
        self
    }

    pub fn chroma_threshold(mut self, height: f32) -> Self {
        self.config.chroma.min_height = height;
        self
    }

    pub fn spectral_threshold(mut self, height: f32) -> Self {
        self.config.spectral.min_height = height;
        self
    }

    pub fn cluster_window(mut self, secs: f64) -> Self {
        self.config.merge.cluster_window_secs = secs;
        self
    }

    pub fn max_detections(mut self, count: usize) -> Self {
        self.config.merge.max_detections = count;
        self
    }

    pub fn visualization_points(mut self, points: usize) -> Self {
        self.config.visualization_points = points;
        self
    }

    pub fn sample_rate(mut self, rate: u32) -> Self {
        self.config.analysis_sample_rate = rate;
        self
    }

    pub fn parallel(mut self, parallel: bool) -> Self {
        self.config.parallel = parallel;
        self
    }

    pub fn build(self) -> Result<PatternAnalyzer> {
        self.config.validate()?;
        Ok(PatternAnalyzer {
            config: self.config,
        })
    }
}

impl Default for AnalyzerBuilder {
    fn default() -> Self {
        Self::new()
    }
}

/// Locates a short pattern inside a longer target.
///
/// Holds only configuration; every call to [`analyze`](Self::analyze) is
/// independent, so one analyzer can be cloned or shared across threads.
#[derive(Debug, Clone, Default)]
pub struct PatternAnalyzer {
    config: EngineConfig,
}

impl PatternAnalyzer {
    /// Create analyzer with custom configuration
    pub fn new(config: EngineConfig) -> Self {
        Self { config }
    }

    /// Create a builder for custom configuration
    pub fn builder() -> AnalyzerBuilder {
        AnalyzerBuilder::new()
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// Decode both files at the analysis rate and run [`analyze`](Self::analyze)
    pub fn analyze_files(&self, pattern: &Path, target: &Path) -> Result<DetectionResult> {
        let rate = self.config.analysis_sample_rate;
        let pattern = load_signal(pattern, rate)?;
        let target = load_signal(target, rate)?;
        Ok(self.analyze(&pattern, &target)?)
    }

    /// Run every method over the pair and merge their detections.
    ///
    /// Only the correlation method can fail the analysis; chroma and spectral
    /// faults are logged and reported through `method_status`.
    pub fn analyze(
        &self,
        pattern: &AudioSignal,
        target: &AudioSignal,
    ) -> EngineResult<DetectionResult> {
        check_inputs(pattern, target)?;

        log::info!(
            "Analyzing {:.2}s pattern against {:.2}s target at {} Hz",
            pattern.duration_secs(),
            target.duration_secs(),
            target.sample_rate()
        );

        let pattern_norm = pattern.normalize();
        let target_norm = target.normalize();

        let correlation = CorrelationDetector::new(self.config.correlation.clone());
        let chroma = ChromaDetector::new(self.config.chroma.clone());
        let spectral = SpectralDetector::new(self.config.spectral.clone());

        // Feature methods take the raw signals
        let run_correlation = || correlation.detect(&pattern_norm, &target_norm);
        let run_chroma = || chroma.run(pattern, target);
        let run_spectral = || spectral.run(pattern, target);

        let (correlation_out, (chroma_out, spectral_out)) = if self.config.parallel {
            rayon::join(run_correlation, || rayon::join(run_chroma, run_spectral))
        } else {
            (run_correlation(), (run_chroma(), run_spectral()))
        };
        let CorrelationOutput { detections, curve } = correlation_out?;

        let method_status = vec![
            MethodOutcome::Completed(detections.clone()).status(Method::Correlation),
            chroma_out.status(Method::Chroma),
            spectral_out.status(Method::Spectral),
        ];

        let pooled = detections
            .into_iter()
            .chain(chroma_out.detections().iter().copied())
            .chain(spectral_out.detections().iter().copied());
        let merged = DetectionMerger::new(&self.config.merge).merge(pooled);

        match merged.first() {
            Some(best) => log::info!(
                "Found {} detections, best at {:.3}s (confidence {:.2})",
                merged.len(),
                best.time,
                best.confidence
            ),
            None => log::info!("No detections"),
        }

        let points = self.config.visualization_points;
        Ok(DetectionResult {
            detection_count: merged.len(),
            detections: merged,
            pattern_duration: pattern.duration_secs(),
            target_duration: target.duration_secs(),
            sample_rate: target.sample_rate(),
            waveform_data: downsample(target_norm.samples(), points),
            correlation_data: downsample(&curve, points),
            analysis_methods: Method::all().to_vec(),
            method_status,
        })
    }
}

fn check_inputs(pattern: &AudioSignal, target: &AudioSignal) -> EngineResult<()> {
    if pattern.sample_rate() != target.sample_rate() {
        return Err(AnalysisError::SampleRateMismatch {
            pattern: pattern.sample_rate(),
            target: target.sample_rate(),
        });
    }
    if target.sample_rate() == 0 {
        return Err(AnalysisError::InvalidInput("sample rate is zero".to_string()));
    }
    if pattern.is_empty() {
        return Err(AnalysisError::InvalidInput("pattern contains no samples".to_string()));
    }
    if target.is_empty() {
        return Err(AnalysisError::InvalidInput("target contains no samples".to_string()));
    }
    Ok(())
}
