//! Report envelope and terminal/JSON formatting

use chrono::{DateTime, Utc};
use colorful::Colorful;
use serde::{Deserialize, Serialize};
use std::path::Path;
use uuid::Uuid;

use crate::detection::{DetectionResult, MergedDetection, MethodState};

/// One analysis run as written to JSON
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnalysisReport {
    pub analysis_id: Uuid,
    pub timestamp: DateTime<Utc>,
    pub pattern_filename: String,
    pub target_filename: String,
    #[serde(flatten)]
    pub result: DetectionResult,
}

impl AnalysisReport {
    pub fn new(pattern: &Path, target: &Path, result: DetectionResult) -> Self {
        Self {
            analysis_id: Uuid::new_v4(),
            timestamp: Utc::now(),
            pattern_filename: file_name(pattern),
            target_filename: file_name(target),
            result,
        }
    }
}

fn file_name(path: &Path) -> String {
    path.file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string())
}

/// Format a report for terminal output
pub fn format_report(report: &AnalysisReport, verbose: bool) -> String {
    let result = &report.result;
    let mut output = String::new();

    output.push_str(&format!(
        "{} {} in {}\n",
        "▶".cyan(),
        report.pattern_filename.clone().bold(),
        report.target_filename.clone().bold()
    ));
    output.push_str(&format!(
        "  Pattern: {:.2}s  Target: {:.2}s  Rate: {} Hz\n",
        result.pattern_duration, result.target_duration, result.sample_rate
    ));

    if result.detections.is_empty() {
        output.push_str(&format!("  {}\n", "✗ No occurrences found".red()));
    } else {
        output.push_str(&format!(
            "  {}\n",
            format!("✓ {} occurrence(s)", result.detection_count).green()
        ));
        for (rank, detection) in result.detections.iter().enumerate() {
            output.push_str(&format_detection(rank + 1, detection));
        }
    }

    for status in result.failed_methods() {
        output.push_str(&format!(
            "  {}\n",
            format!(
                "! {} unavailable: {}",
                status.method,
                status.error.as_deref().unwrap_or("unknown error")
            )
            .yellow()
        ));
    }

    if verbose {
        output.push_str("\n  Methods:\n");
        for status in &result.method_status {
            let state = match status.status {
                MethodState::Ok => "ok",
                MethodState::Failed => "failed",
            };
            output.push_str(&format!(
                "    {:<12} {:<7} {} raw detections\n",
                status.method.name(),
                state,
                status.detections
            ));
        }
        output.push_str(&format!("  Analysis ID: {}\n", report.analysis_id));
    }

    output
}

fn format_detection(rank: usize, detection: &MergedDetection) -> String {
    let methods: Vec<&str> = detection.methods.iter().map(|m| m.name()).collect();
    let line = format!(
        "    #{:<2} {:>9}  {:>5.1}%  [{}]",
        rank,
        format_timestamp(detection.time),
        detection.confidence * 100.0,
        methods.join(", ")
    );
    let line = match detection.method_count {
        0 | 1 => line.yellow(),
        _ => line.green(),
    };
    format!("{}\n", line)
}

/// `m:ss.mmm`
pub fn format_timestamp(secs: f64) -> String {
    let total_ms = (secs.max(0.0) * 1000.0).round() as u64;
    format!(
        "{}:{:02}.{:03}",
        total_ms / 60_000,
        (total_ms / 1000) % 60,
        total_ms % 1000
    )
}

/// Format reports as pretty JSON: a single object, or an array for several
pub fn format_json(reports: &[AnalysisReport]) -> serde_json::Result<String> {
    match reports {
        [single] => serde_json::to_string_pretty(single),
        many => serde_json::to_string_pretty(many),
    }
}

/// Format a summary for multiple targets
pub fn format_summary(reports: &[AnalysisReport], failures: usize) -> String {
    let matched = reports.iter().filter(|r| r.result.detection_count > 0).count();
    let mut output = format!("\n{}\n", "Summary:".bold());
    output.push_str(&format!("  {} targets analyzed\n", reports.len() + failures));
    if matched > 0 {
        output.push_str(&format!("  {}\n", format!("✓ {} with matches", matched).green()));
    }
    if reports.len() > matched {
        output.push_str(&format!(
            "  {}\n",
            format!("✗ {} without matches", reports.len() - matched).red()
        ));
    }
    if failures > 0 {
        output.push_str(&format!(
            "  {}\n",
            format!("! {} could not be analyzed", failures).yellow()
        ));
    }
    output
}
