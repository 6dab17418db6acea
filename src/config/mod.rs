//! Configuration module for AudioMatchr

mod settings;

pub use settings::{
    ChromaSettings, CorrelationSettings, EngineConfig, MergeSettings, SpectralSettings,
};
