//! Dictionary store loaders.
//!
//! The on-disk store is a directory holding `Fields.csv` and, optionally,
//! `PlatformSynonyms.csv`. The same records can also arrive as a JSON array
//! of [`CanonicalField`]s.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use csv::ReaderBuilder;
use tracing::{debug, warn};

use fieldmap_model::{CanonicalField, GENERAL_DOMAIN, SemanticCategory};

use crate::catalog::Catalog;
use crate::error::{CatalogError, Result};

/// Environment variable for overriding the dictionary directory.
pub const DICTIONARY_ENV_VAR: &str = "FIELDMAP_DICTIONARY_DIR";

pub const FIELDS_FILE: &str = "Fields.csv";
pub const PLATFORM_SYNONYMS_FILE: &str = "PlatformSynonyms.csv";

const SYNONYM_SEPARATOR: char = '|';

type Row = BTreeMap<String, String>;

/// Get the default dictionary root directory.
///
/// Checks the `FIELDMAP_DICTIONARY_DIR` environment variable first,
/// then falls back to the `dictionary/` directory of the workspace.
pub fn default_dictionary_root() -> PathBuf {
    if let Ok(root) = std::env::var(DICTIONARY_ENV_VAR) {
        return PathBuf::from(root);
    }
    PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("../../dictionary")
}

pub fn load_default_catalog() -> Result<Catalog> {
    load_catalog_dir(&default_dictionary_root())
}

/// Load a catalog from a dictionary directory.
pub fn load_catalog_dir(dir: &Path) -> Result<Catalog> {
    let fields_path = dir.join(FIELDS_FILE);
    let rows = read_csv_rows(&fields_path)?;
    let mut fields = parse_field_rows(&fields_path, &rows)?;

    let synonyms_path = dir.join(PLATFORM_SYNONYMS_FILE);
    if synonyms_path.is_file() {
        let rows = read_csv_rows(&synonyms_path)?;
        apply_platform_synonyms(&synonyms_path, &rows, &mut fields)?;
    }

    debug!(path = %dir.display(), fields = fields.len(), "loaded dictionary store");
    Ok(Catalog::from_fields(fields))
}

/// Load a catalog from a JSON array of field records.
pub fn load_catalog_json(path: &Path) -> Result<Catalog> {
    let text = std::fs::read_to_string(path).map_err(|e| CatalogError::io(path, e))?;
    let fields: Vec<CanonicalField> =
        serde_json::from_str(&text).map_err(|source| CatalogError::Json {
            path: path.to_path_buf(),
            source,
        })?;
    Ok(Catalog::from_fields(fields))
}

/// Read a CSV file into row maps keyed by header.
///
/// Header BOMs are trimmed and every value is whitespace-trimmed.
pub fn read_csv_rows(path: &Path) -> Result<Vec<Row>> {
    let mut reader = ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .from_path(path)
        .map_err(|e| CatalogError::csv(path, e))?;

    let headers: Vec<String> = reader
        .headers()
        .map_err(|e| CatalogError::csv(path, e))?
        .iter()
        .map(|h| h.trim_matches('\u{feff}').trim().to_string())
        .collect();

    let mut rows = Vec::new();
    for record in reader.records() {
        let record = record.map_err(|e| CatalogError::csv(path, e))?;
        let mut row = Row::new();
        for (idx, value) in record.iter().enumerate() {
            if let Some(key) = headers.get(idx) {
                row.insert(key.clone(), value.trim().to_string());
            }
        }
        rows.push(row);
    }
    Ok(rows)
}

fn get_field<'a>(row: &'a Row, key: &str) -> &'a str {
    row.get(key).map(String::as_str).unwrap_or("")
}

fn get_optional<'a>(row: &'a Row, key: &str) -> Option<&'a str> {
    row.get(key).map(String::as_str).filter(|v| !v.is_empty())
}

fn require_columns(path: &Path, rows: &[Row], columns: &[&'static str]) -> Result<()> {
    let Some(first) = rows.first() else {
        return Ok(());
    };
    for column in columns {
        if !first.contains_key(*column) {
            return Err(CatalogError::MissingColumn {
                path: path.to_path_buf(),
                column,
            });
        }
    }
    Ok(())
}

/// Parse a yes/no flag cell. Blank cells take `default`.
fn parse_flag(raw: &str, default: bool) -> Option<bool> {
    match raw.trim().to_lowercase().as_str() {
        "" => Some(default),
        "1" | "true" | "yes" | "y" | "是" => Some(true),
        "0" | "false" | "no" | "n" | "否" => Some(false),
        _ => None,
    }
}

fn parse_field_rows(path: &Path, rows: &[Row]) -> Result<Vec<CanonicalField>> {
    require_columns(path, rows, &["Field Code", "Category"])?;

    let mut fields = Vec::with_capacity(rows.len());
    for (idx, row) in rows.iter().enumerate() {
        // 1-based, after the header line
        let line = idx + 2;
        let invalid = |column: &'static str, message: String| CatalogError::InvalidValue {
            path: path.to_path_buf(),
            row: line,
            column,
            message,
        };

        let active = parse_flag(get_field(row, "Active"), true)
            .ok_or_else(|| invalid("Active", format!("not a flag: {}", get_field(row, "Active"))))?;
        if !active {
            continue;
        }

        let category: SemanticCategory = get_field(row, "Category")
            .parse()
            .map_err(|e| invalid("Category", format!("{e}")))?;
        let required = parse_flag(get_field(row, "Required"), false).ok_or_else(|| {
            invalid("Required", format!("not a flag: {}", get_field(row, "Required")))
        })?;
        let display_order = match get_optional(row, "Display Order") {
            Some(raw) => Some(
                raw.parse::<u32>()
                    .map_err(|e| invalid("Display Order", format!("{raw}: {e}")))?,
            ),
            None => None,
        };

        let domain = get_optional(row, "Data Domain").unwrap_or(GENERAL_DOMAIN);
        let mut field = CanonicalField::new(get_field(row, "Field Code"), domain, category)
            .required(required)
            .with_synonyms(
                get_field(row, "Synonyms")
                    .split(SYNONYM_SEPARATOR)
                    .map(str::trim)
                    .filter(|s| !s.is_empty()),
            );
        field.display_order = display_order;
        if let Some(name) = get_optional(row, "CN Name") {
            field = field.with_name("zh", name);
        }
        if let Some(name) = get_optional(row, "EN Name") {
            field = field.with_name("en", name);
        }
        fields.push(field);
    }
    Ok(fields)
}

fn apply_platform_synonyms(path: &Path, rows: &[Row], fields: &mut [CanonicalField]) -> Result<()> {
    require_columns(path, rows, &["Field Code", "Platform", "Synonym"])?;

    for row in rows {
        let code = get_field(row, "Field Code");
        let platform = get_field(row, "Platform").to_lowercase();
        let synonym = get_field(row, "Synonym");
        if platform.is_empty() || synonym.is_empty() {
            continue;
        }
        match fields.iter_mut().find(|field| field.field_code == code) {
            Some(field) => {
                let entry = field.platform_synonyms.entry(platform).or_default();
                if !entry.iter().any(|known| known == synonym) {
                    entry.push(synonym.to_string());
                }
            }
            None => {
                warn!(
                    field_code = %code,
                    platform = %platform,
                    "platform synonym references unknown or inactive field"
                );
            }
        }
    }
    Ok(())
}
