//! Header resolution types.
//!
//! A resolution call turns a batch of [`RawHeader`]s into a
//! [`ResolutionResult`] holding exactly one [`FieldResolution`] per input
//! header, in input order.

use serde::{Deserialize, Serialize};

use crate::method::MatchMethod;

/// Field code reported for headers that could not be resolved.
pub const UNMAPPED: &str = "unmapped";
/// Method label reported for headers that could not be resolved.
pub const NO_MATCH: &str = "no_match";
/// Suffix appended to the method of a collision fallback assignment.
pub const FALLBACK_SUFFIX: &str = "_fallback";

/// Clamp a score into `[0, 1]`, mapping NaN to zero.
pub fn clamp_confidence(value: f32) -> f32 {
    if value.is_nan() {
        0.0
    } else {
        value.clamp(0.0, 1.0)
    }
}

/// A raw spreadsheet header plus sample cell values from the same column.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RawHeader {
    pub text: String,
    #[serde(default)]
    pub samples: Vec<String>,
}

impl RawHeader {
    pub fn new(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            samples: Vec::new(),
        }
    }

    #[must_use]
    pub fn with_samples<I, S>(mut self, samples: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.samples = samples.into_iter().map(Into::into).collect();
        self
    }

    /// Sample values that are not blank.
    pub fn non_empty_samples(&self) -> impl Iterator<Item = &str> {
        self.samples
            .iter()
            .map(|value| value.trim())
            .filter(|value| !value.is_empty())
    }
}

/// A proposed header-to-field assignment produced by one matching strategy.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MatchCandidate {
    pub raw_header: String,
    pub field_code: String,
    pub confidence: f32,
    pub method: MatchMethod,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rationale: Option<String>,
}

impl MatchCandidate {
    pub fn new(
        raw_header: impl Into<String>,
        field_code: impl Into<String>,
        confidence: f32,
        method: MatchMethod,
    ) -> Self {
        Self {
            raw_header: raw_header.into(),
            field_code: field_code.into(),
            confidence: clamp_confidence(confidence),
            method,
            rationale: None,
        }
    }

    #[must_use]
    pub fn with_rationale(mut self, rationale: impl Into<String>) -> Self {
        self.rationale = Some(rationale.into());
        self
    }
}

/// A header's final assignment to a canonical field.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FieldAssignment {
    pub field_code: String,
    pub confidence: f32,
    pub method: MatchMethod,
    /// True when the header lost its best field to another header and was
    /// assigned its next-best unclaimed candidate instead.
    #[serde(default)]
    pub fallback: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rationale: Option<String>,
}

impl FieldAssignment {
    /// Method label as reported to callers (`fuzzy_match_fallback`, ...).
    pub fn method_label(&self) -> String {
        if self.fallback {
            format!("{}{}", self.method.as_str(), FALLBACK_SUFFIX)
        } else {
            self.method.as_str().to_string()
        }
    }
}

/// Outcome for one header: a field assignment or the unmapped sentinel.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum FieldResolution {
    Mapped(FieldAssignment),
    Unmapped,
}

impl FieldResolution {
    pub fn field_code(&self) -> Option<&str> {
        match self {
            FieldResolution::Mapped(assignment) => Some(assignment.field_code.as_str()),
            FieldResolution::Unmapped => None,
        }
    }

    pub fn confidence(&self) -> f32 {
        match self {
            FieldResolution::Mapped(assignment) => assignment.confidence,
            FieldResolution::Unmapped => 0.0,
        }
    }

    pub fn method_label(&self) -> String {
        match self {
            FieldResolution::Mapped(assignment) => assignment.method_label(),
            FieldResolution::Unmapped => NO_MATCH.to_string(),
        }
    }

    pub fn assignment(&self) -> Option<&FieldAssignment> {
        match self {
            FieldResolution::Mapped(assignment) => Some(assignment),
            FieldResolution::Unmapped => None,
        }
    }

    pub fn is_unmapped(&self) -> bool {
        matches!(self, FieldResolution::Unmapped)
    }
}

/// One input header with its outcome.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResolvedHeader {
    pub header: String,
    pub resolution: FieldResolution,
}

/// Complete outcome of one resolution call, in input order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResolutionResult {
    pub data_domain: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub platform: Option<String>,
    pub entries: Vec<ResolvedHeader>,
}

impl ResolutionResult {
    pub fn new(data_domain: impl Into<String>, platform: Option<String>) -> Self {
        Self {
            data_domain: data_domain.into(),
            platform,
            entries: Vec::new(),
        }
    }

    pub fn push(&mut self, header: impl Into<String>, resolution: FieldResolution) {
        self.entries.push(ResolvedHeader {
            header: header.into(),
            resolution,
        });
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &ResolvedHeader> {
        self.entries.iter()
    }

    /// Outcome for the first entry with this exact header text.
    pub fn get(&self, header: &str) -> Option<&FieldResolution> {
        self.entries
            .iter()
            .find(|entry| entry.header == header)
            .map(|entry| &entry.resolution)
    }

    /// Field code assigned to `header`, if it was mapped.
    pub fn field_for(&self, header: &str) -> Option<&str> {
        self.get(header).and_then(FieldResolution::field_code)
    }

    /// Mapped entries as `(header, assignment)` pairs.
    pub fn mapped(&self) -> impl Iterator<Item = (&str, &FieldAssignment)> {
        self.entries.iter().filter_map(|entry| {
            entry
                .resolution
                .assignment()
                .map(|assignment| (entry.header.as_str(), assignment))
        })
    }

    pub fn unmapped_headers(&self) -> Vec<&str> {
        self.entries
            .iter()
            .filter(|entry| entry.resolution.is_unmapped())
            .map(|entry| entry.header.as_str())
            .collect()
    }

    /// Flatten into the caller-facing record form.
    pub fn to_records(&self) -> Vec<ResolutionRecord> {
        self.entries.iter().map(ResolutionRecord::from).collect()
    }
}

/// Caller-facing record for one header.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResolutionRecord {
    pub header: String,
    pub standard_field_code: String,
    pub confidence: f32,
    pub method: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rationale: Option<String>,
}

impl From<&ResolvedHeader> for ResolutionRecord {
    fn from(entry: &ResolvedHeader) -> Self {
        match &entry.resolution {
            FieldResolution::Mapped(assignment) => Self {
                header: entry.header.clone(),
                standard_field_code: assignment.field_code.clone(),
                confidence: assignment.confidence,
                method: assignment.method_label(),
                rationale: assignment.rationale.clone(),
            },
            FieldResolution::Unmapped => Self {
                header: entry.header.clone(),
                standard_field_code: UNMAPPED.to_string(),
                confidence: 0.0,
                method: NO_MATCH.to_string(),
                rationale: None,
            },
        }
    }
}

/// A key field resolved with too little confidence to load unattended.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReviewItem {
    pub header: String,
    pub field_code: String,
    pub confidence: f32,
}
