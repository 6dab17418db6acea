//! Cross-method detection merging
//!
//! Detections from every method are pooled, sorted by time and grouped
//! greedily: a cluster is anchored at its earliest member and takes every
//! following detection within the window of that anchor. The anchor never
//! moves, so a chain of detections 0.4 s apart still splits once it drifts
//! past the window.

use std::cmp::Ordering;

use crate::config::MergeSettings;
use crate::detection::{Detection, MergedDetection};

#[derive(Debug, Clone)]
pub struct DetectionMerger {
    window_secs: f64,
    max_detections: usize,
}

impl Default for DetectionMerger {
    fn default() -> Self {
        Self::new(&MergeSettings::default())
    }
}

impl DetectionMerger {
    pub fn new(settings: &MergeSettings) -> Self {
        Self {
            window_secs: settings.cluster_window_secs,
            max_detections: settings.max_detections,
        }
    }

    /// Cluster, rank by confidence and keep the strongest.
    pub fn merge<I>(&self, detections: I) -> Vec<MergedDetection>
    where
        I: IntoIterator<Item = Detection>,
    {
        let mut pooled: Vec<Detection> = detections.into_iter().collect();
        if pooled.is_empty() {
            return Vec::new();
        }
        pooled.sort_by(|a, b| a.time.total_cmp(&b.time));

        let mut merged: Vec<MergedDetection> = self
            .clusters(&pooled)
            .into_iter()
            .map(MergedDetection::from_cluster)
            .collect();

        merged.sort_by(rank);
        merged.truncate(self.max_detections);

        log::debug!(
            "merged {} detections into {} clusters",
            pooled.len(),
            merged.len()
        );
        merged
    }

    /// Split time-sorted detections into anchor-fixed clusters
    fn clusters<'a>(&self, sorted: &'a [Detection]) -> Vec<&'a [Detection]> {
        let mut clusters = Vec::new();
        let mut start = 0;
        while start < sorted.len() {
            let anchor = sorted[start].time;
            let end = sorted[start..]
                .iter()
                .position(|d| d.time - anchor > self.window_secs)
                .map_or(sorted.len(), |offset| start + offset);
            clusters.push(&sorted[start..end]);
            start = end;
        }
        clusters
    }
}

/// Highest confidence first; equal confidence goes to the earlier time
fn rank(a: &MergedDetection, b: &MergedDetection) -> Ordering {
    b.confidence
        .total_cmp(&a.confidence)
        .then_with(|| a.time.total_cmp(&b.time))
}
