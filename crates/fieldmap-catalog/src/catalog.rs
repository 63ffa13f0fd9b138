//! Immutable canonical-field catalog and its per-domain lookup indexes.

use std::collections::{BTreeMap, BTreeSet, HashMap};

use tracing::{debug, warn};

use fieldmap_model::{CanonicalField, GENERAL_DOMAIN};
use fieldmap_text::{fragments, normalize};

use crate::error::{CatalogError, Result};

/// Position of a field in catalog order.
pub type FieldPos = usize;

/// Precomputed lookups for one data domain.
#[derive(Debug, Clone, Default)]
struct DomainIndex {
    fields: Vec<FieldPos>,
    /// normalized synonym -> fields, in catalog order
    synonyms: HashMap<String, Vec<FieldPos>>,
    /// platform -> normalized synonym -> fields
    platform_synonyms: HashMap<String, HashMap<String, Vec<FieldPos>>>,
    /// keyword fragment -> per-field occurrence count
    keywords: HashMap<String, BTreeMap<FieldPos, u32>>,
}

impl DomainIndex {
    fn build(all: &[CanonicalField], visible: Vec<FieldPos>) -> Self {
        let mut index = DomainIndex {
            fields: visible,
            ..DomainIndex::default()
        };
        for &pos in &index.fields {
            let field = &all[pos];
            for text in generic_terms(field) {
                let key = normalize(text);
                if !key.is_empty() {
                    push_unique(index.synonyms.entry(key).or_default(), pos);
                }
                for fragment in fragments(text).items {
                    *index
                        .keywords
                        .entry(fragment.text)
                        .or_default()
                        .entry(pos)
                        .or_default() += 1;
                }
            }
            for (platform, synonyms) in &field.platform_synonyms {
                let by_platform = index.platform_synonyms.entry(platform.clone()).or_default();
                for synonym in synonyms {
                    let key = normalize(synonym);
                    if !key.is_empty() {
                        push_unique(by_platform.entry(key).or_default(), pos);
                    }
                }
            }
        }
        index
    }
}

fn push_unique(list: &mut Vec<FieldPos>, pos: FieldPos) {
    if !list.contains(&pos) {
        list.push(pos);
    }
}

/// Display names, the field code and the generic synonyms of a field.
fn generic_terms(field: &CanonicalField) -> impl Iterator<Item = &str> {
    field
        .names()
        .chain(std::iter::once(field.field_code.as_str()))
        .chain(field.synonyms.iter().map(String::as_str))
}

fn domain_key(domain: &str) -> String {
    domain.trim().to_lowercase()
}

/// Lowercase platform codes, merging synonym lists whose keys differ only
/// in case. Blank platform codes are dropped.
fn platform_keys(raw: BTreeMap<String, Vec<String>>) -> BTreeMap<String, Vec<String>> {
    let mut keyed: BTreeMap<String, Vec<String>> = BTreeMap::new();
    for (platform, synonyms) in raw {
        let key = domain_key(&platform);
        if key.is_empty() {
            continue;
        }
        let entry = keyed.entry(key).or_default();
        for synonym in synonyms {
            if !entry.contains(&synonym) {
                entry.push(synonym);
            }
        }
    }
    keyed
}

/// The set of canonical fields headers are resolved against.
///
/// A catalog is never mutated after construction; reloading means building
/// a new one and swapping it in through [`crate::SharedCatalog`].
#[derive(Debug, Clone, Default)]
pub struct Catalog {
    fields: Vec<CanonicalField>,
    domains: BTreeMap<String, DomainIndex>,
}

impl Catalog {
    /// An empty catalog. Every lookup against it comes back empty.
    pub fn empty() -> Self {
        Self::default()
    }

    /// Build a catalog from raw field records.
    ///
    /// Blank or invalid field codes are skipped and duplicate codes keep the
    /// first occurrence. Fields are then ordered required first, by display
    /// order, then by code.
    pub fn from_fields(records: impl IntoIterator<Item = CanonicalField>) -> Self {
        let mut seen = BTreeSet::new();
        let mut fields = Vec::new();
        for mut field in records {
            if let Err(err) = field.validate() {
                warn!(field_code = %field.field_code, error = %err, "skipping dictionary field");
                continue;
            }
            if !seen.insert(field.field_code.clone()) {
                warn!(field_code = %field.field_code, "duplicate field code, keeping first");
                continue;
            }
            field.data_domain = domain_key(&field.data_domain);
            if field.data_domain.is_empty() {
                field.data_domain = GENERAL_DOMAIN.to_string();
            }
            field.platform_synonyms = platform_keys(std::mem::take(&mut field.platform_synonyms));
            fields.push(field);
        }
        fields.sort_by(|a, b| {
            b.is_required
                .cmp(&a.is_required)
                .then_with(|| match (a.display_order, b.display_order) {
                    (Some(x), Some(y)) => x.cmp(&y),
                    (Some(_), None) => std::cmp::Ordering::Less,
                    (None, Some(_)) => std::cmp::Ordering::Greater,
                    (None, None) => std::cmp::Ordering::Equal,
                })
                .then_with(|| a.field_code.cmp(&b.field_code))
        });

        let names: BTreeSet<String> = fields.iter().map(|f| f.data_domain.clone()).collect();
        let mut domains = BTreeMap::new();
        for name in names {
            let visible = fields
                .iter()
                .enumerate()
                .filter(|(_, field)| {
                    if name == GENERAL_DOMAIN {
                        field.data_domain == GENERAL_DOMAIN
                    } else {
                        field.is_visible_in(&name)
                    }
                })
                .map(|(pos, _)| pos)
                .collect();
            let index = DomainIndex::build(&fields, visible);
            debug!(
                domain = %name,
                fields = index.fields.len(),
                synonyms = index.synonyms.len(),
                keywords = index.keywords.len(),
                "indexed catalog domain"
            );
            domains.insert(name, index);
        }

        Self { fields, domains }
    }

    /// Parse a JSON array of field records.
    pub fn from_json_str(json: &str) -> Result<Self> {
        let fields: Vec<CanonicalField> =
            serde_json::from_str(json).map_err(|source| CatalogError::Json {
                path: "<inline>".into(),
                source,
            })?;
        Ok(Self::from_fields(fields))
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    /// All fields in catalog order.
    pub fn fields(&self) -> &[CanonicalField] {
        &self.fields
    }

    pub fn field(&self, code: &str) -> Option<&CanonicalField> {
        self.fields.iter().find(|field| field.field_code == code)
    }

    /// Domain names with at least one field.
    pub fn domains(&self) -> impl Iterator<Item = &str> {
        self.domains.keys().map(String::as_str)
    }

    pub fn has_domain(&self, domain: &str) -> bool {
        self.domains.contains_key(&domain_key(domain))
    }

    /// Required fields visible in `domain`, in catalog order.
    pub fn required_fields(&self, domain: &str) -> Vec<&CanonicalField> {
        self.view(domain, None)
            .map(|view| view.fields().filter(|field| field.is_required).collect())
            .unwrap_or_default()
    }

    /// Scope the catalog to one data domain and, optionally, a platform.
    ///
    /// Returns `None` when the domain has no fields.
    pub fn view(&self, domain: &str, platform: Option<&str>) -> Option<CatalogView<'_>> {
        let index = self.domains.get(&domain_key(domain))?;
        let platform = platform
            .map(|p| p.trim().to_lowercase())
            .filter(|p| !p.is_empty());
        Some(CatalogView {
            catalog: self,
            index,
            platform,
        })
    }
}

/// One synonym-index hit.
#[derive(Debug, Clone, Copy)]
pub struct SynonymHit<'a> {
    pub pos: FieldPos,
    pub field: &'a CanonicalField,
    /// Hit came from the caller's platform synonyms.
    pub platform_specific: bool,
}

/// A catalog scoped to one domain and optional platform.
#[derive(Debug, Clone)]
pub struct CatalogView<'a> {
    catalog: &'a Catalog,
    index: &'a DomainIndex,
    platform: Option<String>,
}

impl<'a> CatalogView<'a> {
    pub fn platform(&self) -> Option<&str> {
        self.platform.as_deref()
    }

    pub fn len(&self) -> usize {
        self.index.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.index.fields.is_empty()
    }

    /// Visible fields with their catalog positions, in catalog order.
    pub fn entries(&self) -> impl Iterator<Item = (FieldPos, &'a CanonicalField)> + '_ {
        let fields: &'a [CanonicalField] = &self.catalog.fields;
        self.index.fields.iter().map(move |&pos| (pos, &fields[pos]))
    }

    pub fn fields(&self) -> impl Iterator<Item = &'a CanonicalField> + '_ {
        self.entries().map(|(_, field)| field)
    }

    pub fn field_at(&self, pos: FieldPos) -> Option<&'a CanonicalField> {
        let catalog: &'a Catalog = self.catalog;
        self.index
            .fields
            .contains(&pos)
            .then(|| &catalog.fields[pos])
    }

    /// Visible field by code.
    pub fn field(&self, code: &str) -> Option<&'a CanonicalField> {
        self.fields().find(|field| field.field_code == code)
    }

    /// Look up a normalized header in the synonym index.
    ///
    /// Platform hits come first, then generic hits, each in catalog order and
    /// without repeats.
    pub fn lookup(&self, normalized: &str) -> Vec<SynonymHit<'a>> {
        let mut hits: Vec<SynonymHit<'a>> = Vec::new();
        if normalized.is_empty() {
            return hits;
        }
        let fields: &'a [CanonicalField] = &self.catalog.fields;
        let platform_hits = self
            .platform
            .as_ref()
            .and_then(|platform| self.index.platform_synonyms.get(platform))
            .and_then(|by_platform| by_platform.get(normalized));
        for &pos in platform_hits.into_iter().flatten() {
            hits.push(SynonymHit {
                pos,
                field: &fields[pos],
                platform_specific: true,
            });
        }
        for &pos in self.index.synonyms.get(normalized).into_iter().flatten() {
            if hits.iter().all(|hit| hit.pos != pos) {
                hits.push(SynonymHit {
                    pos,
                    field: &fields[pos],
                    platform_specific: false,
                });
            }
        }
        hits
    }

    /// Per-field occurrence counts of a keyword fragment.
    pub fn keyword(&self, fragment: &str) -> Option<&'a BTreeMap<FieldPos, u32>> {
        self.index.keywords.get(fragment)
    }
}
