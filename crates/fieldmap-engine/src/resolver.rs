//! One-to-one assignment of headers to fields.
//!
//! Greedy, not globally optimal: each contested field goes to the header
//! whose best candidate for it is strongest, and displaced headers walk down
//! their own candidate lists. The same candidate table always produces the
//! same assignment.

use std::cmp::Ordering;
use std::collections::{BTreeMap, BTreeSet};

use tracing::debug;

use fieldmap_model::{FieldAssignment, FieldResolution, MatchCandidate, ResolutionResult};

/// Candidates gathered for one header, best first.
#[derive(Debug, Clone, PartialEq)]
pub struct HeaderCandidates {
    pub header: String,
    pub candidates: Vec<MatchCandidate>,
}

impl HeaderCandidates {
    pub fn new(header: impl Into<String>, candidates: Vec<MatchCandidate>) -> Self {
        Self {
            header: header.into(),
            candidates,
        }
    }
}

/// Order two candidates strongest first: confidence, then strategy tier.
pub fn candidate_cmp(a: &MatchCandidate, b: &MatchCandidate) -> Ordering {
    b.confidence
        .total_cmp(&a.confidence)
        .then_with(|| a.method.priority_cmp(&b.method))
}

/// Collapse repeated fields to their strongest candidate and sort best first.
///
/// Ties keep their incoming order.
pub fn merge_candidates(candidates: Vec<MatchCandidate>) -> Vec<MatchCandidate> {
    let mut merged: Vec<MatchCandidate> = Vec::with_capacity(candidates.len());
    for candidate in candidates {
        match merged
            .iter_mut()
            .find(|known| known.field_code == candidate.field_code)
        {
            Some(known) => {
                if candidate_cmp(&candidate, known) == Ordering::Less {
                    *known = candidate;
                }
            }
            None => merged.push(candidate),
        }
    }
    merged.sort_by(candidate_cmp);
    merged
}

fn assignment(candidate: &MatchCandidate) -> FieldAssignment {
    FieldAssignment {
        field_code: candidate.field_code.clone(),
        confidence: candidate.confidence,
        method: candidate.method,
        fallback: false,
        rationale: candidate.rationale.clone(),
    }
}

/// Resolve a candidate table into a bijective result.
///
/// `fallback_penalty` scales the confidence of a displaced header's
/// replacement field.
pub fn resolve_conflicts(
    table: &[HeaderCandidates],
    data_domain: &str,
    platform: Option<&str>,
    fallback_penalty: f32,
) -> ResolutionResult {
    // field -> index of the header currently holding it
    let mut owners: BTreeMap<&str, usize> = BTreeMap::new();
    for (idx, entry) in table.iter().enumerate() {
        let Some(best) = entry.candidates.first() else {
            continue;
        };
        match owners.get(best.field_code.as_str()) {
            Some(&holder) => {
                let held = &table[holder].candidates[0];
                // earlier header keeps the field on a full tie
                if candidate_cmp(best, held) == Ordering::Less {
                    owners.insert(best.field_code.as_str(), idx);
                }
            }
            None => {
                owners.insert(best.field_code.as_str(), idx);
            }
        }
    }

    let mut claimed: BTreeSet<&str> = owners.keys().copied().collect();
    let mut result = ResolutionResult::new(data_domain, platform.map(str::to_string));
    for (idx, entry) in table.iter().enumerate() {
        let Some(best) = entry.candidates.first() else {
            result.push(entry.header.as_str(), FieldResolution::Unmapped);
            continue;
        };
        let winner = owners.get(best.field_code.as_str()).copied();
        if winner == Some(idx) {
            result.push(
                entry.header.as_str(),
                FieldResolution::Mapped(assignment(best)),
            );
            continue;
        }

        let displaced_by = winner.map_or("", |w| table[w].header.as_str());
        let fallback = entry.candidates[1..]
            .iter()
            .find(|candidate| !claimed.contains(candidate.field_code.as_str()));
        match fallback {
            Some(candidate) => {
                claimed.insert(candidate.field_code.as_str());
                debug!(
                    header = %entry.header,
                    lost = %best.field_code,
                    winner = %displaced_by,
                    field_code = %candidate.field_code,
                    "header displaced, using fallback candidate"
                );
                let mut fallback = assignment(candidate);
                fallback.confidence =
                    fieldmap_model::clamp_confidence(candidate.confidence * fallback_penalty);
                fallback.fallback = true;
                fallback.rationale = Some(format!(
                    "{} lost to {displaced_by:?}; {}",
                    best.field_code,
                    candidate.rationale.as_deref().unwrap_or("next candidate")
                ));
                result.push(entry.header.as_str(), FieldResolution::Mapped(fallback));
            }
            None => {
                debug!(
                    header = %entry.header,
                    lost = %best.field_code,
                    winner = %displaced_by,
                    "header displaced with no unclaimed candidate left"
                );
                result.push(entry.header.as_str(), FieldResolution::Unmapped);
            }
        }
    }
    result
}

#[cfg(test)]
mod tests {
    use super::*;
    use fieldmap_model::{MatchMethod, ValueKind};

    fn cand(header: &str, field: &str, confidence: f32, method: MatchMethod) -> MatchCandidate {
        MatchCandidate::new(header, field, confidence, method)
    }

    #[test]
    fn higher_confidence_wins_and_loser_falls_back() {
        let table = vec![
            HeaderCandidates::new(
                "商品",
                vec![
                    cand("商品", "product_name", 0.85, MatchMethod::ContainsMatch),
                    cand("商品", "product_id", 0.85, MatchMethod::ContainsMatch),
                ],
            ),
            HeaderCandidates::new(
                "商品名称",
                vec![cand("商品名称", "product_name", 1.0, MatchMethod::ExactMatch)],
            ),
        ];
        let result = resolve_conflicts(&table, "products", None, 0.9);
        assert_eq!(result.field_for("商品名称"), Some("product_name"));
        let loser = result.get("商品").unwrap().assignment().unwrap();
        assert_eq!(loser.field_code, "product_id");
        assert!(loser.fallback);
        assert!((loser.confidence - 0.765).abs() < 1e-6);
        assert_eq!(loser.method_label(), "contains_match_fallback");
    }

    #[test]
    fn confidence_tie_goes_to_stronger_strategy() {
        let table = vec![
            HeaderCandidates::new(
                "a",
                vec![cand("a", "f", 0.8, MatchMethod::ValuePattern(ValueKind::Quantity))],
            ),
            HeaderCandidates::new("b", vec![cand("b", "f", 0.8, MatchMethod::FuzzyMatch)]),
        ];
        let result = resolve_conflicts(&table, "d", None, 0.9);
        assert_eq!(result.field_for("b"), Some("f"));
        assert!(result.get("a").unwrap().is_unmapped());
    }

    #[test]
    fn full_tie_goes_to_earlier_header() {
        let table = vec![
            HeaderCandidates::new("x", vec![cand("x", "f", 0.9, MatchMethod::FuzzyMatch)]),
            HeaderCandidates::new("y", vec![cand("y", "f", 0.9, MatchMethod::FuzzyMatch)]),
        ];
        let result = resolve_conflicts(&table, "d", None, 0.9);
        assert_eq!(result.field_for("x"), Some("f"));
        assert_eq!(result.field_for("y"), None);
    }

    #[test]
    fn fallback_skips_fields_claimed_by_winners() {
        let table = vec![
            HeaderCandidates::new(
                "a",
                vec![
                    cand("a", "f1", 0.8, MatchMethod::FuzzyMatch),
                    cand("a", "f2", 0.75, MatchMethod::FuzzyMatch),
                    cand("a", "f3", 0.7, MatchMethod::FuzzyMatch),
                ],
            ),
            HeaderCandidates::new("b", vec![cand("b", "f1", 0.9, MatchMethod::FuzzyMatch)]),
            HeaderCandidates::new("c", vec![cand("c", "f2", 0.72, MatchMethod::FuzzyMatch)]),
        ];
        let result = resolve_conflicts(&table, "d", None, 0.9);
        assert_eq!(result.field_for("a"), Some("f3"));
        assert_eq!(result.field_for("b"), Some("f1"));
        assert_eq!(result.field_for("c"), Some("f2"));
    }

    #[test]
    fn headers_without_candidates_are_unmapped() {
        let table = vec![HeaderCandidates::new("", Vec::new())];
        let result = resolve_conflicts(&table, "d", Some("shopee"), 0.9);
        assert_eq!(result.len(), 1);
        assert!(result.get("").unwrap().is_unmapped());
        assert_eq!(result.platform.as_deref(), Some("shopee"));
    }

    #[test]
    fn merge_keeps_strongest_per_field() {
        let merged = merge_candidates(vec![
            cand("h", "a", 0.7, MatchMethod::FuzzyMatch),
            cand("h", "b", 0.8, MatchMethod::ContainsMatch),
            cand("h", "a", 0.82, MatchMethod::ValuePattern(ValueKind::Currency)),
            cand("h", "b", 0.8, MatchMethod::ValuePattern(ValueKind::Currency)),
        ]);
        assert_eq!(merged.len(), 2);
        assert_eq!(merged[0].field_code, "a");
        assert_eq!(merged[0].confidence, 0.82);
        assert_eq!(merged[1].method, MatchMethod::ContainsMatch);
    }
}
