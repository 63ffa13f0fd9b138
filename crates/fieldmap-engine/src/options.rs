//! Engine tunables and confidence levels.

use serde::{Deserialize, Serialize};

/// Confidence level categories for resolution quality.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ConfidenceLevel {
    /// Below the medium threshold. Should be confirmed by a person.
    Low,
    /// Reasonable, worth a glance.
    Medium,
    /// Near-certain, safe to load unattended.
    High,
}

impl ConfidenceLevel {
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::High => "high",
            Self::Medium => "medium",
            Self::Low => "low",
        }
    }
}

/// Configurable thresholds for categorizing resolution confidence.
///
/// - At or above `high`: [`ConfidenceLevel::High`]
/// - `medium` to `high`: [`ConfidenceLevel::Medium`]
/// - `low` to `medium`: [`ConfidenceLevel::Low`]
/// - Below `low`: uncategorized
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ConfidenceThresholds {
    /// Minimum confidence for high-quality matches (default: 0.90).
    pub high: f32,
    /// Minimum confidence for medium-quality matches (default: 0.70).
    pub medium: f32,
    /// Minimum confidence for low-quality matches (default: 0.50).
    pub low: f32,
}

impl Default for ConfidenceThresholds {
    fn default() -> Self {
        Self {
            high: 0.90,
            medium: 0.70,
            low: 0.50,
        }
    }
}

impl ConfidenceThresholds {
    /// Creates thresholds with strict boundaries for unattended loads.
    #[must_use]
    pub fn strict() -> Self {
        Self {
            high: 0.95,
            medium: 0.80,
            low: 0.60,
        }
    }

    /// Creates thresholds with relaxed boundaries for exploratory mapping.
    #[must_use]
    pub fn relaxed() -> Self {
        Self {
            high: 0.85,
            medium: 0.60,
            low: 0.40,
        }
    }

    /// Categorizes a confidence score into a confidence level.
    ///
    /// Returns `None` if the score is below the low threshold.
    #[must_use]
    pub fn categorize(&self, confidence: f32) -> Option<ConfidenceLevel> {
        if confidence >= self.high {
            Some(ConfidenceLevel::High)
        } else if confidence >= self.medium {
            Some(ConfidenceLevel::Medium)
        } else if confidence >= self.low {
            Some(ConfidenceLevel::Low)
        } else {
            None
        }
    }
}

/// Every tunable the resolver reads.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineOptions {
    /// Multiplier applied to a collision loser's fallback candidate.
    pub fallback_penalty: f32,
    /// Minimum whole-string similarity for a fuzzy candidate.
    pub fuzzy_floor: f32,
    /// Minimum share of header characters covered by catalog keywords.
    pub keyword_min_coverage: f32,
    /// Fewer non-empty samples than this disables value-pattern detection.
    pub min_sample_values: usize,
    /// Only the first this-many non-empty samples are inspected.
    pub max_sample_values: usize,
    /// Key fields resolved below this confidence are flagged for review.
    pub review_threshold: f32,
    pub thresholds: ConfidenceThresholds,
}

impl Default for EngineOptions {
    fn default() -> Self {
        Self {
            fallback_penalty: 0.9,
            fuzzy_floor: 0.70,
            keyword_min_coverage: 0.5,
            min_sample_values: 3,
            max_sample_values: 20,
            review_threshold: 0.8,
            thresholds: ConfidenceThresholds::default(),
        }
    }
}

impl EngineOptions {
    /// Fewer, surer matches.
    #[must_use]
    pub fn strict() -> Self {
        Self {
            fallback_penalty: 0.85,
            fuzzy_floor: 0.80,
            keyword_min_coverage: 0.75,
            min_sample_values: 5,
            max_sample_values: 20,
            review_threshold: 0.9,
            thresholds: ConfidenceThresholds::strict(),
        }
    }

    /// More matches, more review.
    #[must_use]
    pub fn relaxed() -> Self {
        Self {
            fallback_penalty: 0.9,
            fuzzy_floor: 0.60,
            keyword_min_coverage: 0.34,
            min_sample_values: 3,
            max_sample_values: 30,
            review_threshold: 0.7,
            thresholds: ConfidenceThresholds::relaxed(),
        }
    }

    /// Clamp ratios into `[0, 1]` and keep the sample window non-empty.
    #[must_use]
    pub fn sanitized(mut self) -> Self {
        let unit = |v: f32| if v.is_nan() { 0.0 } else { v.clamp(0.0, 1.0) };
        self.fallback_penalty = unit(self.fallback_penalty);
        self.fuzzy_floor = unit(self.fuzzy_floor);
        self.keyword_min_coverage = unit(self.keyword_min_coverage);
        self.review_threshold = unit(self.review_threshold);
        self.min_sample_values = self.min_sample_values.max(1);
        self.max_sample_values = self.max_sample_values.max(self.min_sample_values);
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn categorize_uses_inclusive_lower_bounds() {
        let thresholds = ConfidenceThresholds::default();
        assert_eq!(thresholds.categorize(1.0), Some(ConfidenceLevel::High));
        assert_eq!(thresholds.categorize(0.90), Some(ConfidenceLevel::High));
        assert_eq!(thresholds.categorize(0.82), Some(ConfidenceLevel::Medium));
        assert_eq!(thresholds.categorize(0.5), Some(ConfidenceLevel::Low));
        assert_eq!(thresholds.categorize(0.2), None);
    }

    #[test]
    fn partial_config_keeps_defaults() {
        let options: EngineOptions =
            serde_json::from_str(r#"{"fallback_penalty": 0.8, "thresholds": {"high": 0.95}}"#)
                .unwrap();
        assert_eq!(options.fallback_penalty, 0.8);
        assert_eq!(options.fuzzy_floor, 0.70);
        assert_eq!(options.thresholds.high, 0.95);
        assert_eq!(options.thresholds.medium, 0.70);
    }

    #[test]
    fn sanitized_clamps_out_of_range_values() {
        let options = EngineOptions {
            fallback_penalty: 1.5,
            fuzzy_floor: f32::NAN,
            min_sample_values: 0,
            max_sample_values: 0,
            ..EngineOptions::default()
        }
        .sanitized();
        assert_eq!(options.fallback_penalty, 1.0);
        assert_eq!(options.fuzzy_floor, 0.0);
        assert_eq!(options.min_sample_values, 1);
        assert_eq!(options.max_sample_values, 1);
    }
}
