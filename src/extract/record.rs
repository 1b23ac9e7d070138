use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Provenance key holding the topic name
pub const SECTION_KEY: &str = "section";

/// Provenance key holding the article URL
pub const LINK_KEY: &str = "link";

/// Provenance key holding the publisher id
pub const NEWSPAPER_KEY: &str = "newspaper";

/// Keys stamped on every record regardless of extraction success
pub const PROVENANCE_KEYS: &[&str] = &[SECTION_KEY, LINK_KEY, NEWSPAPER_KEY];

/// A single extracted value
///
/// The same logical field may be a scalar in one record and a list in
/// another (attribute extraction collapses to a scalar when only one distinct
/// value was found), so storage must accept both shapes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum FieldValue {
    Count(usize),
    Text(String),
    List(Vec<String>),
}

impl FieldValue {
    pub fn as_text(&self) -> Option<&str> {
        match self {
            Self::Text(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_list(&self) -> Option<&[String]> {
        match self {
            Self::List(items) => Some(items),
            _ => None,
        }
    }

    pub fn as_count(&self) -> Option<usize> {
        match self {
            Self::Count(n) => Some(*n),
            _ => None,
        }
    }
}

impl From<String> for FieldValue {
    fn from(value: String) -> Self {
        Self::Text(value)
    }
}

impl From<&str> for FieldValue {
    fn from(value: &str) -> Self {
        Self::Text(value.to_string())
    }
}

impl From<usize> for FieldValue {
    fn from(value: usize) -> Self {
        Self::Count(value)
    }
}

impl From<Vec<String>> for FieldValue {
    fn from(value: Vec<String>) -> Self {
        Self::List(value)
    }
}

/// One article's extracted fields plus provenance
///
/// Serializes as a flat JSON object. Fields whose extraction produced nothing
/// are absent rather than null.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Record {
    fields: BTreeMap<String, FieldValue>,
}

/// Records of one topic, in article discovery order
pub type ResultSequence = Vec<Record>;

impl Record {
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets a field, replacing any previous value
    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<FieldValue>) {
        self.fields.insert(key.into(), value.into());
    }

    pub fn get(&self, key: &str) -> Option<&FieldValue> {
        self.fields.get(key)
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.fields.contains_key(key)
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.fields.keys().map(String::as_str)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &FieldValue)> {
        self.fields.iter().map(|(k, v)| (k.as_str(), v))
    }

    /// Merges `other` into this record; keys of `other` win on collision
    pub fn merge(&mut self, other: Record) {
        self.fields.extend(other.fields);
    }

    /// Stamps the provenance fields, overwriting same-named extracted fields
    pub fn stamp_provenance(&mut self, section: &str, link: &str, newspaper: &str) {
        self.insert(SECTION_KEY, section);
        self.insert(LINK_KEY, link);
        self.insert(NEWSPAPER_KEY, newspaper);
    }

    pub fn section(&self) -> Option<&str> {
        self.get(SECTION_KEY).and_then(FieldValue::as_text)
    }

    pub fn link(&self) -> Option<&str> {
        self.get(LINK_KEY).and_then(FieldValue::as_text)
    }

    pub fn newspaper(&self) -> Option<&str> {
        self.get(NEWSPAPER_KEY).and_then(FieldValue::as_text)
    }

    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string(self)
    }
}
