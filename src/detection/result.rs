//! Detection result types

use std::collections::BTreeSet;
use std::fmt;

use serde::{Deserialize, Serialize};

/// The independent matching methods
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Method {
    /// Waveform cross-correlation
    Correlation,
    /// Pitch-class profile correlation
    Chroma,
    /// Spectral-contrast (timbre) correlation
    Spectral,
}

impl Method {
    pub fn all() -> [Self; 3] {
        [Self::Correlation, Self::Chroma, Self::Spectral]
    }

    pub fn name(&self) -> &'static str {
        match self {
            Method::Correlation => "correlation",
            Method::Chroma => "chroma",
            Method::Spectral => "spectral",
        }
    }

    pub fn from_name(name: &str) -> Option<Self> {
        match name.to_lowercase().as_str() {
            "correlation" => Some(Self::Correlation),
            "chroma" => Some(Self::Chroma),
            "spectral" => Some(Self::Spectral),
            _ => None,
        }
    }
}

impl fmt::Display for Method {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// One peak reported by one method
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Detection {
    /// Offset into the target in seconds
    pub time: f64,
    pub confidence: f32,
    pub method: Method,
}

impl Detection {
    pub fn new(time: f64, confidence: f32, method: Method) -> Self {
        Self {
            time,
            confidence,
            method,
        }
    }
}

/// A cluster of nearby detections, possibly from several methods
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MergedDetection {
    /// Mean time of the cluster members
    pub time: f64,
    /// Highest member confidence
    pub confidence: f32,
    pub methods: BTreeSet<Method>,
    pub method_count: usize,
}

impl MergedDetection {
    pub fn from_cluster(cluster: &[Detection]) -> Self {
        let time = if cluster.is_empty() {
            0.0
        } else {
            cluster.iter().map(|d| d.time).sum::<f64>() / cluster.len() as f64
        };
        let confidence = cluster
            .iter()
            .map(|d| d.confidence)
            .fold(f32::NEG_INFINITY, f32::max)
            .max(0.0);
        let methods: BTreeSet<Method> = cluster.iter().map(|d| d.method).collect();

        Self {
            time,
            confidence,
            method_count: methods.len(),
            methods,
        }
    }

    /// Expand back into one detection per contributing method
    pub fn to_detections(&self) -> Vec<Detection> {
        self.methods
            .iter()
            .map(|&m| Detection::new(self.time, self.confidence, m))
            .collect()
    }

    pub fn has_method(&self, method: Method) -> bool {
        self.methods.contains(&method)
    }
}

/// Whether a method ran to completion
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MethodState {
    Ok,
    Failed,
}

/// Per-method bookkeeping reported alongside the detections
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MethodStatus {
    pub method: Method,
    pub status: MethodState,
    /// Raw detections the method contributed before merging
    pub detections: usize,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

/// Complete output of one analysis
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DetectionResult {
    pub detection_count: usize,
    pub detections: Vec<MergedDetection>,
    pub pattern_duration: f64,
    pub target_duration: f64,
    pub sample_rate: u32,
    pub waveform_data: Vec<f32>,
    pub correlation_data: Vec<f32>,
    /// Always every method, whether or not it produced anything
    pub analysis_methods: Vec<Method>,
    #[serde(default)]
    pub method_status: Vec<MethodStatus>,
}

impl DetectionResult {
    pub fn best(&self) -> Option<&MergedDetection> {
        self.detections.first()
    }

    pub fn failed_methods(&self) -> impl Iterator<Item = &MethodStatus> {
        self.method_status
            .iter()
            .filter(|s| s.status == MethodState::Failed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_method_names_round_trip() {
        for method in Method::all() {
            assert_eq!(Method::from_name(method.name()), Some(method));
        }
        assert_eq!(Method::from_name("CHROMA"), Some(Method::Chroma));
        assert_eq!(Method::from_name("mfcc"), None);
    }

    #[test]
    fn test_cluster_aggregation() {
        let cluster = [
            Detection::new(1.0, 0.4, Method::Correlation),
            Detection::new(1.2, 0.9, Method::Chroma),
            Detection::new(1.4, 0.5, Method::Correlation),
        ];
        let merged = MergedDetection::from_cluster(&cluster);
        assert!((merged.time - 1.2).abs() < 1e-12);
        assert_eq!(merged.confidence, 0.9);
        assert_eq!(merged.method_count, 2);
        assert!(merged.has_method(Method::Chroma));
        assert!(!merged.has_method(Method::Spectral));
    }

    #[test]
    fn test_json_field_names() {
        let merged = MergedDetection::from_cluster(&[
            Detection::new(2.0, 1.0, Method::Spectral),
            Detection::new(2.1, 0.5, Method::Correlation),
        ]);
        let json = serde_json::to_value(&merged).unwrap();
        assert_eq!(json["method_count"], 2);
        assert_eq!(json["methods"], serde_json::json!(["correlation", "spectral"]));

        let status = MethodStatus {
            method: Method::Chroma,
            status: MethodState::Ok,
            detections: 0,
            error: None,
        };
        let json = serde_json::to_value(&status).unwrap();
        assert_eq!(json["status"], "ok");
        assert!(json.get("error").is_none());
    }
}
