//! Approximate candidates for headers with no dictionary hit.
//!
//! Three scorers run against every field visible in the catalog view:
//! containment of a display name, keyword coverage, and whole-string
//! similarity. Each field keeps its single best score.

use std::cmp::Ordering;
use std::collections::{BTreeMap, BTreeSet};

use rapidfuzz::fuzz;

use fieldmap_catalog::{CatalogView, FieldPos};
use fieldmap_model::{CanonicalField, MatchCandidate, MatchMethod};
use fieldmap_text::{Fragments, fragments, normalize, strip_annotations, text_width};

use crate::options::EngineOptions;

const CONTAINS_BASE: f32 = 0.80;
const CONTAINS_SPAN: f32 = 0.10;
/// Two CJK characters or four Latin ones.
const MIN_CONTAINED_WIDTH: usize = 4;
const KEYWORD_BASE: f32 = 0.65;
const KEYWORD_SPAN: f32 = 0.20;
const FUZZY_CAP: f32 = 0.85;

/// Round to four decimals so equal-band scores from different scorers tie
/// exactly instead of differing in the last bit.
fn round_score(score: f32) -> f32 {
    (score * 10_000.0).round() / 10_000.0
}

#[derive(Debug, Clone)]
struct Scored {
    pos: FieldPos,
    confidence: f32,
    method: MatchMethod,
    weight: u32,
    rationale: String,
}

/// Keyword evidence for one field.
#[derive(Debug, Default)]
struct KeywordHits {
    covered: BTreeSet<usize>,
    weight: u32,
    matched: Vec<String>,
}

/// One spelling of the header that gets scored: the full text, plus the
/// annotation-stripped stem when that differs.
struct HeaderForm {
    normalized: String,
    fragments: Fragments,
    keyword_hits: BTreeMap<FieldPos, KeywordHits>,
}

fn header_forms(view: &CatalogView<'_>, header: &str) -> Vec<HeaderForm> {
    let mut forms: Vec<HeaderForm> = Vec::with_capacity(2);
    for text in [header.to_string(), strip_annotations(header)] {
        let normalized = normalize(&text);
        if normalized.is_empty() || forms.iter().any(|f| f.normalized == normalized) {
            continue;
        }
        let fragments = fragments(&text);
        let keyword_hits = collect_keyword_hits(view, &fragments);
        forms.push(HeaderForm {
            normalized,
            fragments,
            keyword_hits,
        });
    }
    forms
}

/// Ranked approximate candidates for a raw header, best first.
///
/// Bracketed annotations such as units are scored both with and without
/// the annotation. Returns an empty list when nothing clears the floors.
pub fn generate(
    view: &CatalogView<'_>,
    header: &str,
    options: &EngineOptions,
) -> Vec<MatchCandidate> {
    let forms = header_forms(view, header);
    if forms.is_empty() {
        return Vec::new();
    }

    let mut scored: Vec<Scored> = Vec::new();
    for (pos, field) in view.entries() {
        let weight = forms
            .iter()
            .filter_map(|form| form.keyword_hits.get(&pos))
            .map(|h| h.weight)
            .max()
            .unwrap_or(0);
        let mut best: Option<Scored> = None;
        let mut offer = |confidence: f32, method: MatchMethod, rationale: String| {
            let confidence = round_score(confidence);
            if best.as_ref().is_none_or(|b| confidence > b.confidence) {
                best = Some(Scored {
                    pos,
                    confidence,
                    method,
                    weight,
                    rationale,
                });
            }
        };

        for form in &forms {
            if let Some((confidence, name)) = contains_score(&form.normalized, field) {
                offer(
                    confidence,
                    MatchMethod::ContainsMatch,
                    format!("contains {name:?}"),
                );
            }
            if let Some(hits) = form.keyword_hits.get(&pos) {
                let share = coverage(hits, &form.fragments);
                if share >= options.keyword_min_coverage && share > 0.0 {
                    offer(
                        KEYWORD_BASE + KEYWORD_SPAN * share,
                        MatchMethod::KeywordSimilarity,
                        format!(
                            "keywords {} cover {:.0}% of header",
                            hits.matched.join(", "),
                            share * 100.0
                        ),
                    );
                }
            }
            if let Some((ratio, term)) = fuzzy_score(&form.normalized, field, view.platform()) {
                if ratio > options.fuzzy_floor {
                    offer(
                        ratio.min(FUZZY_CAP),
                        MatchMethod::FuzzyMatch,
                        format!("similar to {term:?} ({ratio:.2})"),
                    );
                }
            }
        }

        if let Some(best) = best {
            scored.push(best);
        }
    }

    scored.sort_by(rank);
    scored
        .into_iter()
        .filter_map(|s| {
            let field = view.field_at(s.pos)?;
            Some(
                MatchCandidate::new(header, field.field_code.as_str(), s.confidence, s.method)
                    .with_rationale(s.rationale),
            )
        })
        .collect()
}

fn rank(a: &Scored, b: &Scored) -> Ordering {
    b.confidence
        .total_cmp(&a.confidence)
        .then_with(|| b.weight.cmp(&a.weight))
        .then_with(|| a.pos.cmp(&b.pos))
}

/// Display name or field code contained in the header, or the other way round.
///
/// Longer overlap relative to the longer string scores higher.
fn contains_score(normalized: &str, field: &CanonicalField) -> Option<(f32, String)> {
    let mut best: Option<(f32, String)> = None;
    let terms = field
        .names()
        .chain(std::iter::once(field.field_code.as_str()));
    for term in terms {
        let candidate = normalize(term);
        if candidate.is_empty() {
            continue;
        }
        let (shorter, longer) = if candidate.chars().count() <= normalized.chars().count() {
            (candidate.as_str(), normalized)
        } else {
            (normalized, candidate.as_str())
        };
        if text_width(shorter) < MIN_CONTAINED_WIDTH || !longer.contains(shorter) {
            continue;
        }
        let share = shorter.chars().count() as f32 / longer.chars().count() as f32;
        let confidence = CONTAINS_BASE + CONTAINS_SPAN * share;
        if best.as_ref().is_none_or(|(score, _)| confidence > *score) {
            best = Some((confidence, term.to_string()));
        }
    }
    best
}

fn collect_keyword_hits(
    view: &CatalogView<'_>,
    header_fragments: &Fragments,
) -> BTreeMap<FieldPos, KeywordHits> {
    let mut by_field: BTreeMap<FieldPos, KeywordHits> = BTreeMap::new();
    for fragment in &header_fragments.items {
        let Some(counts) = view.keyword(&fragment.text) else {
            continue;
        };
        for (&pos, &count) in counts {
            let hits = by_field.entry(pos).or_default();
            hits.covered.extend(fragment.span.clone());
            hits.weight += count;
            if !hits.matched.contains(&fragment.text) {
                hits.matched.push(fragment.text.clone());
            }
        }
    }
    by_field
}

/// Share of the header's meaningful characters covered by matched fragments.
fn coverage(hits: &KeywordHits, header_fragments: &Fragments) -> f32 {
    if header_fragments.content_len == 0 {
        return 0.0;
    }
    (hits.covered.len() as f32 / header_fragments.content_len as f32).min(1.0)
}

/// Best whole-string similarity against the field's names and synonyms.
fn fuzzy_score(
    normalized: &str,
    field: &CanonicalField,
    platform: Option<&str>,
) -> Option<(f32, String)> {
    let platform_terms = platform
        .map(|p| field.synonyms_for_platform(p))
        .unwrap_or(&[]);
    let terms = field
        .names()
        .chain(std::iter::once(field.field_code.as_str()))
        .chain(field.synonyms.iter().map(String::as_str))
        .chain(platform_terms.iter().map(String::as_str));

    let mut best: Option<(f32, String)> = None;
    for term in terms {
        let candidate = normalize(term);
        if candidate.is_empty() {
            continue;
        }
        let ratio = fuzz::ratio(normalized.chars(), candidate.chars()) as f32;
        if best.as_ref().is_none_or(|(score, _)| ratio > *score) {
            best = Some((ratio, term.to_string()));
        }
    }
    best
}
