//! Caller-injected policies consulted while writing categories.
//!
//! - `CategoryFilter` decides which categories and fields are written.
//! - `CategoryFormatter` supplies per-field `FieldFormat` overrides.
//! - `EncodingProvider` supplies explicit encoders, ahead of every other source.
//!
//! All names are category names without the leading underscore. Policies are
//! `Send` so a configured `BinaryEncoder` can move to a worker thread.

use hashbrown::{HashMap, HashSet};

use crate::bridge::field::FieldFormat;
use crate::pipeline::models::ArrayEncoder;

//==================================================================================
// I. Policy Traits
//==================================================================================

pub trait CategoryFilter: Send {
    fn include_category(&self, category: &str) -> bool;
    fn include_field(&self, category: &str, field: &str) -> bool;
}

pub trait CategoryFormatter: Send {
    fn get_format(&self, category: &str, field: &str) -> Option<FieldFormat>;
}

pub trait EncodingProvider: Send {
    fn get(&self, category: &str, field: &str) -> Option<ArrayEncoder>;
}

/// Accepts every category and field.
#[derive(Debug, Clone, Copy, Default)]
pub struct DefaultFilter;

impl CategoryFilter for DefaultFilter {
    fn include_category(&self, _category: &str) -> bool {
        true
    }

    fn include_field(&self, _category: &str, _field: &str) -> bool {
        true
    }
}

/// Supplies no formats.
#[derive(Debug, Clone, Copy, Default)]
pub struct DefaultFormatter;

impl CategoryFormatter for DefaultFormatter {
    fn get_format(&self, _category: &str, _field: &str) -> Option<FieldFormat> {
        None
    }
}

//==================================================================================
// II. Name-Based Filter
//==================================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum FilterMode {
    Allow,
    Deny,
}

/// An allow-list or deny-list of category and field names.
///
/// In allow mode only listed categories are written; if any fields are listed
/// for a category, only those fields are written. In deny mode listed
/// categories and listed fields are dropped and everything else is kept.
#[derive(Debug, Clone)]
pub struct NameFilter {
    mode: FilterMode,
    categories: HashSet<String>,
    fields: HashMap<String, HashSet<String>>,
}

impl NameFilter {
    pub fn allow<I, S>(categories: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self::with_mode(FilterMode::Allow, categories)
    }

    pub fn deny<I, S>(categories: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self::with_mode(FilterMode::Deny, categories)
    }

    fn with_mode<I, S>(mode: FilterMode, categories: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            mode,
            categories: categories.into_iter().map(Into::into).collect(),
            fields: HashMap::new(),
        }
    }

    /// Adds a field rule. In allow mode the category is allowed as well.
    pub fn field(mut self, category: &str, field: &str) -> Self {
        if self.mode == FilterMode::Allow {
            self.categories.insert(category.to_string());
        }
        self.fields
            .entry(category.to_string())
            .or_default()
            .insert(field.to_string());
        self
    }
}

impl CategoryFilter for NameFilter {
    fn include_category(&self, category: &str) -> bool {
        let listed = self.categories.contains(category);
        match self.mode {
            FilterMode::Allow => listed,
            FilterMode::Deny => !listed,
        }
    }

    fn include_field(&self, category: &str, field: &str) -> bool {
        let rules = self.fields.get(category);
        match self.mode {
            FilterMode::Allow => rules.map_or(true, |fields| fields.contains(field)),
            FilterMode::Deny => !rules.is_some_and(|fields| fields.contains(field)),
        }
    }
}

//==================================================================================
// III. Map-Backed Encoding Provider
//==================================================================================

/// Explicit encoders keyed by `(category, field)`.
#[derive(Debug, Clone, Default)]
pub struct EncodingMap {
    encoders: HashMap<String, HashMap<String, ArrayEncoder>>,
}

impl EncodingMap {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, category: &str, field: &str, encoder: ArrayEncoder) {
        self.encoders
            .entry(category.to_string())
            .or_default()
            .insert(field.to_string(), encoder);
    }

    pub fn with(mut self, category: &str, field: &str, encoder: ArrayEncoder) -> Self {
        self.insert(category, field, encoder);
        self
    }

    pub fn len(&self) -> usize {
        self.encoders.values().map(HashMap::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl EncodingProvider for EncodingMap {
    fn get(&self, category: &str, field: &str) -> Option<ArrayEncoder> {
        self.encoders.get(category)?.get(field).cloned()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pipeline::models::Transform;

    #[test]
    fn test_allow_filter() {
        let filter = NameFilter::allow(["atom_site"]).field("cell", "length_a");
        assert!(filter.include_category("atom_site"));
        assert!(filter.include_category("cell"));
        assert!(!filter.include_category("entity"));
        assert!(filter.include_field("atom_site", "id"));
        assert!(filter.include_field("cell", "length_a"));
        assert!(!filter.include_field("cell", "length_b"));
    }

    #[test]
    fn test_deny_filter() {
        let filter = NameFilter::deny(["entity"]).field("atom_site", "pdbx_formal_charge");
        assert!(!filter.include_category("entity"));
        assert!(filter.include_category("atom_site"));
        assert!(!filter.include_field("atom_site", "pdbx_formal_charge"));
        assert!(filter.include_field("atom_site", "id"));
    }

    #[test]
    fn test_encoding_map_lookup() {
        let map = EncodingMap::new().with(
            "atom_site",
            "Cartn_x",
            ArrayEncoder::by(Transform::FixedPoint { factor: 1000.0 }),
        );
        assert_eq!(map.len(), 1);
        assert!(map.get("atom_site", "Cartn_x").is_some());
        assert!(map.get("atom_site", "Cartn_y").is_none());
        assert!(map.get("cell", "Cartn_x").is_none());
    }
}
