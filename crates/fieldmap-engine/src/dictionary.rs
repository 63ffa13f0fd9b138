//! Exact lookup against the catalog synonym index.

use fieldmap_catalog::{CatalogView, SynonymHit};
use fieldmap_model::{MatchCandidate, MatchMethod};
use fieldmap_text::{normalize, strip_annotations};

/// Header maps to exactly one field.
pub const EXACT_CONFIDENCE: f32 = 1.0;
/// Several fields share the synonym but only one through the caller's platform.
pub const PLATFORM_CONFIDENCE: f32 = 0.98;
/// Several fields share the synonym and nothing tells them apart.
pub const AMBIGUOUS_CONFIDENCE: f32 = 0.95;

/// Best exact match for a raw header, if any.
pub fn match_exact(view: &CatalogView<'_>, header: &str) -> Option<MatchCandidate> {
    match_exact_all(view, header).into_iter().next()
}

/// Every exact hit for a raw header, best first.
///
/// The full normalized header is tried first, then the header with bracketed
/// annotations removed. The first hit carries the dictionary confidence, any
/// further hits are kept at [`AMBIGUOUS_CONFIDENCE`] as alternates.
pub fn match_exact_all(view: &CatalogView<'_>, header: &str) -> Vec<MatchCandidate> {
    let normalized = normalize(header);
    if normalized.is_empty() {
        return Vec::new();
    }
    let hits = view.lookup(&normalized);
    if !hits.is_empty() {
        return score_hits(header, &hits, None);
    }

    let stem = normalize(&strip_annotations(header));
    if stem.is_empty() || stem == normalized {
        return Vec::new();
    }
    score_hits(header, &view.lookup(&stem), Some(&stem))
}

fn primary_confidence(hits: &[SynonymHit<'_>]) -> f32 {
    if hits.len() == 1 {
        return EXACT_CONFIDENCE;
    }
    let platform_hits = hits.iter().filter(|hit| hit.platform_specific).count();
    if platform_hits == 1 {
        PLATFORM_CONFIDENCE
    } else {
        AMBIGUOUS_CONFIDENCE
    }
}

fn score_hits(header: &str, hits: &[SynonymHit<'_>], stem: Option<&str>) -> Vec<MatchCandidate> {
    let Some(first) = hits.first() else {
        return Vec::new();
    };
    let primary = primary_confidence(hits);
    let lead = match stem {
        Some(stem) => format!("synonym match on {stem:?} after removing annotations"),
        None => "synonym match".to_string(),
    };

    let mut out = Vec::with_capacity(hits.len());
    let rationale = if first.platform_specific {
        format!("{lead} (platform synonym)")
    } else if hits.len() > 1 {
        format!("{lead} (shared by {} fields)", hits.len())
    } else {
        lead.clone()
    };
    out.push(
        MatchCandidate::new(
            header,
            first.field.field_code.as_str(),
            primary,
            MatchMethod::ExactMatch,
        )
        .with_rationale(rationale),
    );
    for hit in &hits[1..] {
        out.push(
            MatchCandidate::new(
                header,
                hit.field.field_code.as_str(),
                AMBIGUOUS_CONFIDENCE,
                MatchMethod::ExactMatch,
            )
            .with_rationale(format!("{lead} (alternate of {})", first.field.field_code)),
        );
    }
    out
}
