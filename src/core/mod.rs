//! Core detection engine
//!
//! Signals flow through [`signal`] normalization, the per-method
//! [`detectors`], the [`merger`] and finally [`visualization`] sampling,
//! all sequenced by [`analyzer::PatternAnalyzer`].

pub mod analyzer;
pub mod decoder;
pub mod detectors;
pub mod dsp;
pub mod error;
pub mod features;
pub mod merger;
pub mod signal;
pub mod visualization;

pub use analyzer::{AnalyzerBuilder, PatternAnalyzer};
pub use decoder::{decode_audio, load_signal, AudioData};
pub use detectors::{
    ChromaDetector, CorrelationDetector, CorrelationOutput, MethodOutcome, OptionalDetector,
    SpectralDetector,
};
pub use error::{AnalysisError, EngineResult, FeatureError};
pub use merger::DetectionMerger;
pub use signal::{AudioSignal, NormalizedSignal};
