use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use crate::error::ModelError;

/// Data domain whose fields are visible from every other domain.
pub const GENERAL_DOMAIN: &str = "general";

/// Semantic category of a canonical field.
///
/// The category tells the value-pattern detector which kind of sample data a
/// field can legitimately hold (a currency pattern may only resolve to an
/// [`SemanticCategory::Amount`] field, and so on).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SemanticCategory {
    /// Identifiers and grouping attributes (order id, SKU, shop, category).
    Dimension,
    /// Monetary values.
    Amount,
    /// Counts and other non-monetary measures (stock, visitors, ratings).
    Quantity,
    /// Rates and percentages.
    Ratio,
    /// Dates and timestamps.
    Datetime,
    /// Free text.
    Text,
}

impl SemanticCategory {
    pub fn as_str(&self) -> &'static str {
        match self {
            SemanticCategory::Dimension => "dimension",
            SemanticCategory::Amount => "amount",
            SemanticCategory::Quantity => "quantity",
            SemanticCategory::Ratio => "ratio",
            SemanticCategory::Datetime => "datetime",
            SemanticCategory::Text => "text",
        }
    }
}

impl fmt::Display for SemanticCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for SemanticCategory {
    type Err = ModelError;

    /// Parse a category name.
    /// Dictionary data-type names (`currency`, `integer`, `date`, ...) are
    /// accepted as aliases of the category they imply. Untyped numbers
    /// (`decimal`, `float`) are measures, not money.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "dimension" | "id" | "identifier" | "code" => Ok(SemanticCategory::Dimension),
            "amount" | "currency" | "money" => Ok(SemanticCategory::Amount),
            "quantity" | "integer" | "int" | "count" | "decimal" | "float" | "numeric" => {
                Ok(SemanticCategory::Quantity)
            }
            "ratio" | "percent" | "percentage" | "rate" => Ok(SemanticCategory::Ratio),
            "datetime" | "date" | "timestamp" | "time" => Ok(SemanticCategory::Datetime),
            "text" | "string" | "str" | "char" => Ok(SemanticCategory::Text),
            _ => Err(ModelError::UnknownCategory(s.to_string())),
        }
    }
}

/// A standard schema column that raw headers are resolved to.
///
/// Display names are keyed by language code (`zh`, `en`, ...). Platform
/// synonyms are keyed by platform code and take precedence over the generic
/// synonyms when the caller supplies that platform.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CanonicalField {
    pub field_code: String,
    #[serde(default)]
    pub display_names: BTreeMap<String, String>,
    pub semantic_category: SemanticCategory,
    pub data_domain: String,
    #[serde(default)]
    pub synonyms: Vec<String>,
    #[serde(default)]
    pub platform_synonyms: BTreeMap<String, Vec<String>>,
    #[serde(default)]
    pub is_required: bool,
    #[serde(default)]
    pub display_order: Option<u32>,
}

impl CanonicalField {
    pub fn new(
        field_code: impl Into<String>,
        data_domain: impl Into<String>,
        semantic_category: SemanticCategory,
    ) -> Self {
        Self {
            field_code: field_code.into(),
            display_names: BTreeMap::new(),
            semantic_category,
            data_domain: data_domain.into(),
            synonyms: Vec::new(),
            platform_synonyms: BTreeMap::new(),
            is_required: false,
            display_order: None,
        }
    }

    #[must_use]
    pub fn with_name(mut self, lang: impl Into<String>, name: impl Into<String>) -> Self {
        self.display_names.insert(lang.into(), name.into());
        self
    }

    #[must_use]
    pub fn with_synonyms<I, S>(mut self, synonyms: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        for synonym in synonyms {
            let synonym = synonym.into();
            if !self.synonyms.contains(&synonym) {
                self.synonyms.push(synonym);
            }
        }
        self
    }

    #[must_use]
    pub fn with_platform_synonyms<I, S>(mut self, platform: impl Into<String>, synonyms: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let entry = self.platform_synonyms.entry(platform.into()).or_default();
        for synonym in synonyms {
            let synonym = synonym.into();
            if !entry.contains(&synonym) {
                entry.push(synonym);
            }
        }
        self
    }

    #[must_use]
    pub fn required(mut self, is_required: bool) -> Self {
        self.is_required = is_required;
        self
    }

    /// Preferred display name: Chinese, then English, then any language.
    pub fn display_name(&self) -> &str {
        self.display_names
            .get("zh")
            .or_else(|| self.display_names.get("en"))
            .or_else(|| self.display_names.values().next())
            .map(String::as_str)
            .unwrap_or(self.field_code.as_str())
    }

    /// All display names in language-code order.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.display_names.values().map(String::as_str)
    }

    /// Synonyms registered for a specific platform.
    pub fn synonyms_for_platform(&self, platform: &str) -> &[String] {
        self.platform_synonyms
            .get(platform)
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    /// Returns true if this field belongs to `domain`, either directly or
    /// through the shared [`GENERAL_DOMAIN`].
    pub fn is_visible_in(&self, domain: &str) -> bool {
        self.data_domain.eq_ignore_ascii_case(domain)
            || self.data_domain.eq_ignore_ascii_case(GENERAL_DOMAIN)
    }

    /// Check the field code is a usable key.
    pub fn validate(&self) -> Result<(), ModelError> {
        let code = self.field_code.trim();
        if code.is_empty() {
            return Err(ModelError::InvalidFieldCode {
                code: self.field_code.clone(),
                reason: "field code is blank",
            });
        }
        if code != self.field_code {
            return Err(ModelError::InvalidFieldCode {
                code: self.field_code.clone(),
                reason: "field code has surrounding whitespace",
            });
        }
        if code.eq_ignore_ascii_case(crate::resolution::UNMAPPED) {
            return Err(ModelError::InvalidFieldCode {
                code: self.field_code.clone(),
                reason: "field code collides with the unmapped sentinel",
            });
        }
        Ok(())
    }
}
