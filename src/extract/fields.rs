//! Declarative field extraction
//!
//! Each configured field names an element by tag and exact class string and
//! says how to read it: as trimmed text, or by scraping an attribute from
//! every match.

use crate::config::FieldConfig;
use crate::extract::record::{FieldValue, Record};
use crate::html::{Document, Element};
use std::collections::BTreeSet;

/// How to locate and read one output field
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FieldSpec {
    /// Trimmed text of the single matching element
    Text { tag: String, class: String },

    /// Distinct values of `attribute` across all matching elements
    Attribute {
        tag: String,
        class: String,
        attribute: String,
    },
}

impl FieldSpec {
    pub fn text(tag: impl Into<String>, class: impl Into<String>) -> Self {
        Self::Text {
            tag: tag.into(),
            class: class.into(),
        }
    }

    pub fn attribute(
        tag: impl Into<String>,
        class: impl Into<String>,
        attribute: impl Into<String>,
    ) -> Self {
        Self::Attribute {
            tag: tag.into(),
            class: class.into(),
            attribute: attribute.into(),
        }
    }

    /// The (tag, class) pair this field is located by
    pub fn selector(&self) -> (&str, &str) {
        match self {
            Self::Text { tag, class } | Self::Attribute { tag, class, .. } => (tag, class),
        }
    }

    /// Extracts this field from a document
    ///
    /// Returns `None` when the field yields no usable signal; the caller omits
    /// the key in that case.
    pub fn extract(&self, document: &Document) -> Option<FieldValue> {
        let (tag, class) = self.selector();
        let matches = document.query(tag, class);

        match self {
            Self::Text { .. } => extract_text(&matches),
            Self::Attribute { attribute, .. } => extract_attribute(&matches, attribute),
        }
    }
}

/// A field spec together with the record key it fills
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NamedField {
    pub name: String,
    pub spec: FieldSpec,
}

impl NamedField {
    pub fn new(name: impl Into<String>, spec: FieldSpec) -> Self {
        Self {
            name: name.into(),
            spec,
        }
    }
}

impl From<&FieldConfig> for NamedField {
    fn from(config: &FieldConfig) -> Self {
        let spec = match &config.attribute {
            Some(attribute) => FieldSpec::attribute(&config.tag, &config.class, attribute),
            None => FieldSpec::text(&config.tag, &config.class),
        };
        Self::new(&config.name, spec)
    }
}

/// Runs every field spec against a document
///
/// Fields without a usable result are left out of the returned record.
pub fn extract_fields(document: &Document, fields: &[NamedField]) -> Record {
    let mut record = Record::new();

    for field in fields {
        match field.spec.extract(document) {
            Some(value) => record.insert(field.name.clone(), value),
            None => {
                let (tag, class) = field.spec.selector();
                tracing::debug!(field = %field.name, tag, class, "Field omitted: no usable match");
            }
        }
    }

    record
}

/// Exactly one match yields its trimmed text; zero or several are ambiguous
fn extract_text(matches: &[Element<'_>]) -> Option<FieldValue> {
    let [only] = matches else {
        return None;
    };

    let text = only.text();
    let trimmed = text.trim();
    if trimmed.is_empty() {
        None
    } else {
        Some(FieldValue::Text(trimmed.to_string()))
    }
}

/// Collects, flattens and deduplicates attribute values across all matches
///
/// One distinct value collapses to a scalar; more stay a list (sorted, since
/// set semantics carry no order).
fn extract_attribute(matches: &[Element<'_>], attribute: &str) -> Option<FieldValue> {
    let distinct: BTreeSet<String> = matches
        .iter()
        .flat_map(|el| el.attribute(attribute))
        .filter(|value| !value.is_empty())
        .collect();

    let mut values: Vec<String> = distinct.into_iter().collect();
    match values.len() {
        0 => None,
        1 => values.pop().map(FieldValue::Text),
        _ => Some(FieldValue::List(values)),
    }
}
