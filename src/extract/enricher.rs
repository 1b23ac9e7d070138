//! Publisher-specific enrichment
//!
//! Produces the fields the declarative field specs cannot express: paragraph
//! counts, inline reference links nested inside paragraphs, and the full body
//! text.

use crate::config::EnricherConfig;
use crate::extract::record::Record;
use crate::html::Document;

pub const PARAGRAPHS_KEY: &str = "paragraphs";
pub const EXTERNAL_REFERENCES_KEY: &str = "external_references";
pub const NR_EXTERNAL_REFERENCES_KEY: &str = "nr_external_references";
pub const TEXT_KEY: &str = "text";

/// Derives extra fields from a parsed article
pub trait Enricher: Send + Sync {
    fn enrich(&self, document: &Document) -> Record;
}

/// Enricher for publishers whose body is a run of classed paragraphs
///
/// The defaults match the FAZ article markup (`p.atc-TextParagraph` with
/// `a.rtr-entity` reference links).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParagraphEnricher {
    pub paragraph_tag: String,
    pub paragraph_class: String,
    pub reference_tag: String,
    pub reference_class: String,
}

impl Default for ParagraphEnricher {
    fn default() -> Self {
        Self::from(&EnricherConfig::default())
    }
}

impl From<&EnricherConfig> for ParagraphEnricher {
    fn from(config: &EnricherConfig) -> Self {
        Self {
            paragraph_tag: config.paragraph_tag.clone(),
            paragraph_class: config.paragraph_class.clone(),
            reference_tag: config.reference_tag.clone(),
            reference_class: config.reference_class.clone(),
        }
    }
}

impl Enricher for ParagraphEnricher {
    fn enrich(&self, document: &Document) -> Record {
        let paragraphs = document.query(&self.paragraph_tag, &self.paragraph_class);

        let references: Vec<String> = paragraphs
            .iter()
            .flat_map(|p| p.query(&self.reference_tag, &self.reference_class))
            .map(|reference| reference.text())
            .collect();

        let text: String = paragraphs.iter().map(|p| p.text()).collect();

        let mut record = Record::new();
        record.insert(PARAGRAPHS_KEY, paragraphs.len());
        record.insert(NR_EXTERNAL_REFERENCES_KEY, references.len());
        record.insert(EXTERNAL_REFERENCES_KEY, references);
        record.insert(TEXT_KEY, text);
        record
    }
}
