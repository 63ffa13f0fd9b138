use std::fs;
use std::path::Path;
use std::time::Instant;

use anyhow::{Context, Result, bail};
use comfy_table::Table;
use tracing::{info, info_span};

use fieldmap_catalog::{Catalog, load_catalog_dir, load_catalog_json, load_default_catalog};
use fieldmap_cli::input::read_sheet;
use fieldmap_engine::{EngineOptions, FieldResolver, ResolutionStats, ResolutionSummary};
use fieldmap_model::{ResolutionResult, ReviewItem};

use crate::cli::{CatalogArgs, FieldsArgs, ResolveArgs};
use crate::summary::apply_table_style;

/// Everything `resolve` reports.
#[derive(Debug)]
pub struct ResolveOutcome {
    pub result: ResolutionResult,
    pub summary: ResolutionSummary,
    pub review: Vec<ReviewItem>,
    pub options: EngineOptions,
}

pub fn load_catalog(args: &CatalogArgs) -> Result<Catalog> {
    let catalog = match (&args.catalog_json, &args.dictionary) {
        (Some(path), _) => load_catalog_json(path)
            .with_context(|| format!("load catalog feed {}", path.display()))?,
        (None, Some(dir)) => load_catalog_dir(dir)
            .with_context(|| format!("load dictionary {}", dir.display()))?,
        (None, None) => load_default_catalog().context("load bundled dictionary")?,
    };
    info!(
        fields = catalog.len(),
        domains = catalog.domains().count(),
        "catalog loaded"
    );
    Ok(catalog)
}

pub fn load_options(path: &Path) -> Result<EngineOptions> {
    let text =
        fs::read_to_string(path).with_context(|| format!("read config {}", path.display()))?;
    let options: EngineOptions = serde_json::from_str(&text)
        .with_context(|| format!("parse engine options in {}", path.display()))?;
    Ok(options)
}

pub fn run_resolve(args: &ResolveArgs) -> Result<ResolveOutcome> {
    let span = info_span!("resolve", input = %args.input.display(), domain = %args.domain);
    let _guard = span.enter();
    let start = Instant::now();

    let catalog = load_catalog(&args.catalog)?;
    if !catalog.has_domain(&args.domain) {
        let known: Vec<&str> = catalog.domains().collect();
        bail!(
            "unknown data domain {:?} (known: {})",
            args.domain,
            known.join(", ")
        );
    }
    let options = match &args.config {
        Some(path) => load_options(path)?,
        None if args.strict => EngineOptions::strict(),
        None => EngineOptions::default(),
    };
    let resolver = FieldResolver::new(catalog).with_options(options);

    let sheet = read_sheet(&args.input, args.samples)?;
    if sheet.headers.is_empty() {
        bail!("{} has no header row", args.input.display());
    }
    let result = resolver.resolve_headers(
        &sheet.headers,
        &args.domain,
        args.platform.as_deref(),
        Some(&sheet.rows),
    );
    let summary = result.summary_with(&resolver.options().thresholds);
    let review = resolver.review_required(&result, &args.domain);
    info!(
        headers = sheet.headers.len(),
        sample_rows = sheet.row_count(),
        mapped = summary.mapped,
        review = review.len(),
        duration_ms = start.elapsed().as_millis(),
        "resolve complete"
    );
    Ok(ResolveOutcome {
        result,
        summary,
        review,
        options: *resolver.options(),
    })
}

pub fn run_fields(args: &FieldsArgs) -> Result<()> {
    let catalog = load_catalog(&args.catalog)?;
    let fields: Vec<_> = match &args.domain {
        Some(domain) => {
            let Some(view) = catalog.view(domain, None) else {
                bail!("unknown data domain {domain:?}");
            };
            view.fields().collect()
        }
        None => catalog.fields().iter().collect(),
    };

    let mut table = Table::new();
    table.set_header(vec![
        "Domain",
        "Field",
        "Name",
        "Category",
        "Required",
        "Synonyms",
    ]);
    apply_table_style(&mut table);
    for field in fields {
        table.add_row(vec![
            field.data_domain.clone(),
            field.field_code.clone(),
            field.display_name().to_string(),
            field.semantic_category.as_str().to_string(),
            if field.is_required { "yes" } else { "-" }.to_string(),
            field.synonyms.len().to_string(),
        ]);
    }
    println!("{table}");
    Ok(())
}

pub fn run_domains(args: &CatalogArgs) -> Result<()> {
    let catalog = load_catalog(args)?;
    let mut table = Table::new();
    table.set_header(vec!["Domain", "Fields", "Required"]);
    apply_table_style(&mut table);
    for domain in catalog.domains() {
        let visible = catalog.view(domain, None).map_or(0, |view| view.len());
        table.add_row(vec![
            domain.to_string(),
            visible.to_string(),
            catalog.required_fields(domain).len().to_string(),
        ]);
    }
    println!("{table}");
    Ok(())
}
