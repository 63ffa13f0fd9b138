use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::cmp::Ordering;
use std::fmt;
use std::str::FromStr;

use crate::error::ModelError;

/// Semantic type inferred from sample cell values.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum ValueKind {
    Date,
    Currency,
    Quantity,
    Ratio,
}

impl ValueKind {
    pub const ALL: [ValueKind; 4] = [
        ValueKind::Date,
        ValueKind::Currency,
        ValueKind::Quantity,
        ValueKind::Ratio,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            ValueKind::Date => "date",
            ValueKind::Currency => "currency",
            ValueKind::Quantity => "quantity",
            ValueKind::Ratio => "ratio",
        }
    }
}

impl fmt::Display for ValueKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The strategy that produced a match candidate.
///
/// Methods are ranked by strategy priority: dictionary hits outrank the
/// text-similarity strategies, which outrank value-pattern inference. The
/// conflict resolver uses [`MatchMethod::priority_cmp`] to break confidence
/// ties.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MatchMethod {
    /// Normalized header equals a catalog synonym or display name.
    ExactMatch,
    /// Display name contained in the header or vice versa.
    ContainsMatch,
    /// Header fragments overlap the catalog keyword index.
    KeywordSimilarity,
    /// Whole-string similarity ratio above the fuzzy floor.
    FuzzyMatch,
    /// Inferred from the shape of sample values.
    ValuePattern(ValueKind),
}

impl MatchMethod {
    pub fn as_str(&self) -> &'static str {
        match self {
            MatchMethod::ExactMatch => "exact_match",
            MatchMethod::ContainsMatch => "contains_match",
            MatchMethod::KeywordSimilarity => "keyword_similarity",
            MatchMethod::FuzzyMatch => "fuzzy_match",
            MatchMethod::ValuePattern(ValueKind::Date) => "value_pattern_date",
            MatchMethod::ValuePattern(ValueKind::Currency) => "value_pattern_currency",
            MatchMethod::ValuePattern(ValueKind::Quantity) => "value_pattern_quantity",
            MatchMethod::ValuePattern(ValueKind::Ratio) => "value_pattern_ratio",
        }
    }

    /// Strategy tier; lower is stronger.
    pub fn tier(&self) -> u8 {
        match self {
            MatchMethod::ExactMatch => 0,
            MatchMethod::ContainsMatch
            | MatchMethod::KeywordSimilarity
            | MatchMethod::FuzzyMatch => 1,
            MatchMethod::ValuePattern(_) => 2,
        }
    }

    /// Orders methods strongest first.
    pub fn priority_cmp(&self, other: &Self) -> Ordering {
        self.tier().cmp(&other.tier())
    }
}

impl fmt::Display for MatchMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for MatchMethod {
    type Err = ModelError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "exact_match" => Ok(MatchMethod::ExactMatch),
            "contains_match" => Ok(MatchMethod::ContainsMatch),
            "keyword_similarity" => Ok(MatchMethod::KeywordSimilarity),
            "fuzzy_match" => Ok(MatchMethod::FuzzyMatch),
            "value_pattern_date" => Ok(MatchMethod::ValuePattern(ValueKind::Date)),
            "value_pattern_currency" => Ok(MatchMethod::ValuePattern(ValueKind::Currency)),
            "value_pattern_quantity" => Ok(MatchMethod::ValuePattern(ValueKind::Quantity)),
            "value_pattern_ratio" => Ok(MatchMethod::ValuePattern(ValueKind::Ratio)),
            other => Err(ModelError::UnknownMethod(other.to_string())),
        }
    }
}

impl Serialize for MatchMethod {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

impl<'de> Deserialize<'de> for MatchMethod {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        raw.parse().map_err(serde::de::Error::custom)
    }
}
