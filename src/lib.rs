//! AudioMatchr - Find where a short clip occurs inside a longer recording
//!
//! Three independent methods look for the pattern and their hits are merged
//! into one ranked list of timestamps.
//!
//! ## Methods
//!
//! - **Correlation**: FFT cross-correlation of the peak-normalized
//!   waveforms. Required; if it fails the analysis fails.
//! - **Chroma**: correlation of 12-bin pitch-class profiles. Survives
//!   changes in timbre.
//! - **Spectral**: correlation of octave-band spectral contrast. Tracks
//!   timbre rather than pitch.
//!
//! Chroma and spectral are optional: a fault there is logged, reported in
//! `method_status` and the analysis continues without them.
//!
//! ## Module Structure
//!
//! - `core` - Signals, DSP, detectors, merging and the analyzer
//! - `cli` - Command-line interface
//! - `config` - Tunable thresholds, loadable from JSON
//! - `detection` - Detection result types
//! - `testgen` - Synthetic WAV fixtures
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use audiomatchr::PatternAnalyzer;
//!
//! let analyzer = PatternAnalyzer::builder().build()?;
//! let result = analyzer.analyze_files(pattern_path, target_path)?;
//!
//! for hit in &result.detections {
//!     println!("{:.2}s ({:.0}%)", hit.time, hit.confidence * 100.0);
//! }
//! ```
//!
//! ## Merging
//!
//! | Step    | Rule                                                    |
//! |---------|---------------------------------------------------------|
//! | Cluster | Sorted by time; each cluster spans 0.5 s from its first hit |
//! | Time    | Mean of the cluster                                     |
//! | Score   | Highest confidence in the cluster                       |
//! | Rank    | Confidence descending, earlier time on ties; top 10     |

// Core detection engine
pub mod core;

// Command-line interface
pub mod cli;

// Configuration
pub mod config;

// Detection result types
pub mod detection;

// Synthetic test fixtures
pub mod testgen;

pub use config::EngineConfig;
pub use core::{
    AnalysisError, AnalyzerBuilder, AudioSignal, DetectionMerger, EngineResult, FeatureError,
    PatternAnalyzer,
};
pub use detection::{Detection, DetectionResult, MergedDetection, Method, MethodStatus};
