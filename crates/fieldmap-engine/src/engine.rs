//! Resolution entry point.

use std::collections::BTreeMap;
use std::sync::Arc;

use tracing::{debug, info, info_span, warn};

use fieldmap_catalog::{Catalog, CatalogView, SharedCatalog};
use fieldmap_model::{FieldResolution, MatchCandidate, RawHeader, ResolutionResult, ReviewItem};
use fieldmap_text::normalize;

use crate::candidates::generate;
use crate::dictionary::match_exact_all;
use crate::options::{ConfidenceLevel, EngineOptions};
use crate::resolver::{HeaderCandidates, merge_candidates, resolve_conflicts};
use crate::review::review_key_fields;
use crate::stats::ResolutionStats;
use crate::value_pattern::detect;

/// Resolves raw spreadsheet headers to canonical fields.
///
/// Holds a [`SharedCatalog`] handle; every call works on one snapshot of it,
/// so calls may run concurrently with each other and with a reload.
#[derive(Debug, Clone)]
pub struct FieldResolver {
    catalog: SharedCatalog,
    options: EngineOptions,
}

impl FieldResolver {
    pub fn new(catalog: impl Into<SharedCatalog>) -> Self {
        Self {
            catalog: catalog.into(),
            options: EngineOptions::default(),
        }
    }

    #[must_use]
    pub fn with_options(mut self, options: EngineOptions) -> Self {
        self.options = options.sanitized();
        self
    }

    pub fn options(&self) -> &EngineOptions {
        &self.options
    }

    pub fn catalog(&self) -> &SharedCatalog {
        &self.catalog
    }

    /// Swap in a new catalog. In-flight calls finish on the old one.
    pub fn reload(&self, catalog: Catalog) -> Arc<Catalog> {
        self.catalog.replace(catalog)
    }

    /// Resolve header strings, taking sample values for each header from
    /// `sample_rows` (rows keyed by header text).
    pub fn resolve_headers<S: AsRef<str>>(
        &self,
        headers: &[S],
        data_domain: &str,
        platform: Option<&str>,
        sample_rows: Option<&[BTreeMap<String, String>]>,
    ) -> ResolutionResult {
        let raw: Vec<RawHeader> = headers
            .iter()
            .map(|header| {
                let header = header.as_ref();
                let samples = sample_rows
                    .unwrap_or(&[])
                    .iter()
                    .filter_map(|row| row.get(header).cloned());
                RawHeader::new(header).with_samples(samples)
            })
            .collect();
        self.resolve(&raw, data_domain, platform)
    }

    /// Resolve headers that already carry their sample values.
    pub fn resolve(
        &self,
        headers: &[RawHeader],
        data_domain: &str,
        platform: Option<&str>,
    ) -> ResolutionResult {
        let span = info_span!(
            "resolve_headers",
            domain = %data_domain,
            platform = platform.unwrap_or("-"),
            headers = headers.len()
        );
        let _guard = span.enter();

        let catalog = self.catalog.snapshot();
        let platform = platform.map(str::trim).filter(|p| !p.is_empty());
        let Some(view) = catalog.view(data_domain, platform) else {
            warn!(
                domain = %data_domain,
                "no catalog fields for domain, every header resolves to unmapped"
            );
            let mut result = ResolutionResult::new(data_domain, platform.map(str::to_string));
            for header in headers {
                result.push(header.text.as_str(), FieldResolution::Unmapped);
            }
            return result;
        };

        let table: Vec<HeaderCandidates> = headers
            .iter()
            .map(|header| {
                HeaderCandidates::new(header.text.as_str(), self.candidates(&view, header))
            })
            .collect();
        let result = resolve_conflicts(&table, data_domain, platform, self.options.fallback_penalty);

        for entry in result.iter() {
            debug!(
                header = %entry.header,
                field_code = entry.resolution.field_code().unwrap_or(fieldmap_model::UNMAPPED),
                confidence = entry.resolution.confidence(),
                method = %entry.resolution.method_label(),
                "resolved header"
            );
        }
        let summary = result.summary_with(&self.options.thresholds);
        info!(
            mapped = summary.mapped,
            unmapped = summary.unmapped,
            high = summary.count(ConfidenceLevel::High),
            medium = summary.count(ConfidenceLevel::Medium),
            low = summary.count(ConfidenceLevel::Low),
            "header resolution finished"
        );
        result
    }

    /// Ranked candidates for one header against a catalog view.
    ///
    /// A dictionary hit short-circuits the approximate strategies.
    pub fn candidates(&self, view: &CatalogView<'_>, header: &RawHeader) -> Vec<MatchCandidate> {
        if normalize(&header.text).is_empty() {
            return Vec::new();
        }
        let exact = match_exact_all(view, &header.text);
        if !exact.is_empty() {
            return exact;
        }
        let mut candidates = generate(view, &header.text, &self.options);
        if let Some(inferred) = detect(view, header, &self.options) {
            candidates.push(inferred);
        }
        merge_candidates(candidates)
    }

    /// Required fields of `data_domain` resolved below the configured review
    /// threshold.
    pub fn review_required(&self, result: &ResolutionResult, data_domain: &str) -> Vec<ReviewItem> {
        let catalog = self.catalog.snapshot();
        let key_fields: Vec<&str> = catalog
            .required_fields(data_domain)
            .into_iter()
            .map(|field| field.field_code.as_str())
            .collect();
        review_key_fields(result, &key_fields, self.options.review_threshold)
    }
}
