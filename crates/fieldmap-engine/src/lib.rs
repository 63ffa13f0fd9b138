#![deny(unsafe_code)]

pub mod candidates;
pub mod dictionary;
pub mod engine;
pub mod options;
pub mod resolver;
pub mod review;
pub mod stats;
pub mod value_pattern;

pub use candidates::generate;
pub use dictionary::{match_exact, match_exact_all};
pub use engine::FieldResolver;
pub use options::{ConfidenceLevel, ConfidenceThresholds, EngineOptions};
pub use resolver::{HeaderCandidates, merge_candidates, resolve_conflicts};
pub use review::review_key_fields;
pub use stats::{ResolutionStats, ResolutionSummary};
pub use value_pattern::detect;
