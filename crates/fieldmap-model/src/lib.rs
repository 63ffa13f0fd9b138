#![deny(unsafe_code)]

pub mod error;
pub mod field;
pub mod method;
pub mod resolution;

pub use error::{ModelError, Result};
pub use field::{CanonicalField, GENERAL_DOMAIN, SemanticCategory};
pub use method::{MatchMethod, ValueKind};
pub use resolution::{
    FALLBACK_SUFFIX, FieldAssignment, FieldResolution, MatchCandidate, NO_MATCH, RawHeader,
    ResolutionRecord, ResolutionResult, ResolvedHeader, ReviewItem, UNMAPPED, clamp_confidence,
};
