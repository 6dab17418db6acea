// src/config/settings.rs
//
// Tunable thresholds for each detection method, loadable from JSON.

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::core::visualization::DEFAULT_POINTS;

/// Peak-picking thresholds for the waveform cross-correlation method
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CorrelationSettings {
    /// Minimum normalized peak height
    pub min_height: f32,
    /// Minimum peak prominence
    pub min_prominence: f32,
    /// Minimum peak separation as a fraction of the pattern length
    pub distance_ratio: f32,
    /// Minimum peak width in samples (measured at half prominence)
    pub min_width: f32,
}

impl Default for CorrelationSettings {
    fn default() -> Self {
        Self {
            min_height: 0.2,
            min_prominence: 0.15,
            distance_ratio: 0.3,
            min_width: 2.0,
        }
    }
}

/// Framing and peak-picking for the chroma method
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ChromaSettings {
    pub min_height: f32,
    pub min_separation_secs: f32,
    pub fft_size: usize,
    pub hop_size: usize,
}

impl Default for ChromaSettings {
    fn default() -> Self {
        Self {
            min_height: 0.15,
            min_separation_secs: 0.5,
            fft_size: 2048,
            hop_size: 512,
        }
    }
}

/// Framing, band layout and peak-picking for the spectral-contrast method
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SpectralSettings {
    pub min_height: f32,
    pub min_separation_secs: f32,
    pub fft_size: usize,
    pub hop_size: usize,
    /// Upper edge of the lowest octave band in Hz
    pub fmin: f32,
    /// Number of octave bands above `fmin` (the matrix has `n_bands + 1` rows)
    pub n_bands: usize,
    /// Fraction of each band averaged for its peak and valley
    pub quantile: f32,
}

impl Default for SpectralSettings {
    fn default() -> Self {
        Self {
            min_height: 0.1,
            min_separation_secs: 0.5,
            fft_size: 2048,
            hop_size: 512,
            fmin: 200.0,
            n_bands: 6,
            quantile: 0.02,
        }
    }
}

/// Clustering and ranking of pooled detections
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MergeSettings {
    /// Maximum distance from a cluster's anchor, in seconds
    pub cluster_window_secs: f64,
    /// Number of merged detections kept after ranking
    pub max_detections: usize,
}

impl Default for MergeSettings {
    fn default() -> Self {
        Self {
            cluster_window_secs: 0.5,
            max_detections: 10,
        }
    }
}

/// Complete engine configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    pub correlation: CorrelationSettings,
    pub chroma: ChromaSettings,
    pub spectral: SpectralSettings,
    pub merge: MergeSettings,
    /// Upper bound on points in each visualization series
    pub visualization_points: usize,
    /// Rate both files are resampled to before analysis
    pub analysis_sample_rate: u32,
    /// Run the three detectors on the rayon pool
    pub parallel: bool,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            correlation: CorrelationSettings::default(),
            chroma: ChromaSettings::default(),
            spectral: SpectralSettings::default(),
            merge: MergeSettings::default(),
            visualization_points: DEFAULT_POINTS,
            analysis_sample_rate: 22050,
            parallel: true,
        }
    }
}

impl EngineConfig {
    /// Load a configuration from a JSON file. Missing fields keep their defaults.
    pub fn load(path: &Path) -> Result<Self> {
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;
        let config: Self = serde_json::from_str(&text)
            .with_context(|| format!("Invalid config file: {}", path.display()))?;
        config.validate()?;
        Ok(config)
    }

    /// Use the explicit path if given, else the per-user config file if it exists,
    /// else the defaults.
    pub fn resolve(explicit: Option<&Path>) -> Result<Self> {
        if let Some(path) = explicit {
            return Self::load(path);
        }
        match Self::user_config_path() {
            Some(path) if path.is_file() => {
                log::debug!("Using config from {}", path.display());
                Self::load(&path)
            }
            _ => Ok(Self::default()),
        }
    }

    /// `<config dir>/audiomatchr/config.json`
    pub fn user_config_path() -> Option<PathBuf> {
        dirs::config_dir().map(|dir| dir.join("audiomatchr").join("config.json"))
    }

    pub fn validate(&self) -> Result<()> {
        if self.analysis_sample_rate == 0 {
            anyhow::bail!("analysis_sample_rate must be positive");
        }
        if self.visualization_points == 0 {
            anyhow::bail!("visualization_points must be positive");
        }
        for (name, fft, hop) in [
            ("chroma", self.chroma.fft_size, self.chroma.hop_size),
            ("spectral", self.spectral.fft_size, self.spectral.hop_size),
        ] {
            if fft < 2 || hop == 0 {
                anyhow::bail!("{} framing invalid: fft_size={}, hop_size={}", name, fft, hop);
            }
        }
        let window = self.merge.cluster_window_secs;
        if window.is_nan() || window < 0.0 {
            anyhow::bail!("merge.cluster_window_secs must be non-negative");
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_match_method_thresholds() {
        let config = EngineConfig::default();
        assert_eq!(config.correlation.min_height, 0.2);
        assert_eq!(config.correlation.min_prominence, 0.15);
        assert_eq!(config.chroma.min_height, 0.15);
        assert_eq!(config.spectral.min_height, 0.1);
        assert_eq!(config.merge.max_detections, 10);
        assert_eq!(config.visualization_points, DEFAULT_POINTS);
        assert_eq!(DEFAULT_POINTS, 500);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_partial_json_keeps_defaults() {
        let json = r#"{ "merge": { "max_detections": 3 }, "parallel": false }"#;
        let config: EngineConfig = serde_json::from_str(json).unwrap();
        assert_eq!(config.merge.max_detections, 3);
        assert_eq!(config.merge.cluster_window_secs, 0.5);
        assert!(!config.parallel);
        assert_eq!(config.chroma, ChromaSettings::default());
    }

    #[test]
    fn test_validate_rejects_zero_hop() {
        let mut config = EngineConfig::default();
        config.spectral.hop_size = 0;
        assert!(config.validate().is_err());
    }
}
