// src/core/error.rs
//
// Error types for the detection engine.

use thiserror::Error;

/// Fatal errors that abort a whole analysis.
#[derive(Debug, Clone, Error, PartialEq)]
pub enum AnalysisError {
    /// Caller supplied signals the engine cannot work with
    #[error("invalid input: {0}")]
    InvalidInput(String),

    /// Pattern and target were decoded at different rates
    #[error("sample rate mismatch: pattern at {pattern} Hz, target at {target} Hz")]
    SampleRateMismatch { pattern: u32, target: u32 },

    /// The mandatory correlation method faulted
    #[error("correlation failed: {0}")]
    Correlation(String),
}

/// Recoverable feature-extraction errors for the chroma and spectral methods.
#[derive(Debug, Clone, Error, PartialEq)]
pub enum FeatureError {
    #[error("{0} signal is empty")]
    EmptySignal(&'static str),

    #[error("{0} signal contains non-finite samples")]
    NonFiniteSamples(&'static str),

    #[error("pattern spans {pattern} frames but target only {target}")]
    PatternLongerThanTarget { pattern: usize, target: usize },

    #[error("invalid frame parameters: fft_size={fft_size}, hop_size={hop_size}")]
    InvalidFraming { fft_size: usize, hop_size: usize },

    #[error("contrast band {band} starts at {low_hz} Hz, above Nyquist")]
    BandAboveNyquist { band: usize, low_hz: f32 },

    #[error("fft failed: {0}")]
    Fft(String),
}

pub type EngineResult<T> = std::result::Result<T, AnalysisError>;
