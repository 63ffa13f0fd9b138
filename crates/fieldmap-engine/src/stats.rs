//! Batch statistics over a resolution result.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use fieldmap_model::ResolutionResult;

use crate::options::{ConfidenceLevel, ConfidenceThresholds};

/// Mapping statistics for one resolution call.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResolutionSummary {
    pub total: usize,
    pub mapped: usize,
    pub unmapped: usize,
    /// `mapped / total`, zero for an empty batch.
    pub mapping_rate: f32,
    /// Mapped headers per confidence level. Scores under the low threshold
    /// count as low.
    pub by_level: BTreeMap<ConfidenceLevel, usize>,
    /// Mean confidence over mapped headers.
    pub mean_confidence: f32,
}

impl ResolutionSummary {
    pub fn count(&self, level: ConfidenceLevel) -> usize {
        self.by_level.get(&level).copied().unwrap_or(0)
    }
}

/// Statistics helpers for [`ResolutionResult`].
pub trait ResolutionStats {
    /// Summary using the default thresholds.
    fn summary(&self) -> ResolutionSummary {
        self.summary_with(&ConfidenceThresholds::default())
    }

    fn summary_with(&self, thresholds: &ConfidenceThresholds) -> ResolutionSummary;

    /// Returns the count of mapped headers at each confidence level.
    fn count_by_level_with(
        &self,
        thresholds: &ConfidenceThresholds,
    ) -> BTreeMap<ConfidenceLevel, usize>;
}

impl ResolutionStats for ResolutionResult {
    fn summary_with(&self, thresholds: &ConfidenceThresholds) -> ResolutionSummary {
        let total = self.len();
        let confidences: Vec<f32> = self.mapped().map(|(_, a)| a.confidence).collect();
        let mapped = confidences.len();
        let mean_confidence = if mapped == 0 {
            0.0
        } else {
            confidences.iter().sum::<f32>() / mapped as f32
        };
        ResolutionSummary {
            total,
            mapped,
            unmapped: total - mapped,
            mapping_rate: if total == 0 {
                0.0
            } else {
                mapped as f32 / total as f32
            },
            by_level: self.count_by_level_with(thresholds),
            mean_confidence,
        }
    }

    fn count_by_level_with(
        &self,
        thresholds: &ConfidenceThresholds,
    ) -> BTreeMap<ConfidenceLevel, usize> {
        let mut counts = BTreeMap::new();
        for (_, assignment) in self.mapped() {
            let level = thresholds
                .categorize(assignment.confidence)
                .unwrap_or(ConfidenceLevel::Low);
            *counts.entry(level).or_insert(0) += 1;
        }
        counts
    }
}
