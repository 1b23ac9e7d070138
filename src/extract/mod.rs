//! Article extraction module
//!
//! Turns one downloaded article into a flat [`Record`]:
//! - declarative field specs (text or attribute strategy)
//! - a pluggable publisher [`Enricher`]
//! - provenance stamping (`section`, `link`, `newspaper`)

mod enricher;
mod fields;
mod record;

pub use enricher::{
    Enricher, ParagraphEnricher, EXTERNAL_REFERENCES_KEY, NR_EXTERNAL_REFERENCES_KEY,
    PARAGRAPHS_KEY, TEXT_KEY,
};
pub use fields::{extract_fields, FieldSpec, NamedField};
pub use record::{
    FieldValue, Record, ResultSequence, LINK_KEY, NEWSPAPER_KEY, PROVENANCE_KEYS, SECTION_KEY,
};

use crate::config::Config;
use crate::html::Document;

/// Everything one extraction needs, passed by value between crawl stages
///
/// Each in-flight article owns its own step, so concurrent downloads never
/// share a "current article".
#[derive(Debug)]
pub struct CrawlStep {
    pub topic: String,
    pub article_link: String,
    pub document: Document,
}

impl CrawlStep {
    pub fn new(topic: impl Into<String>, article_link: impl Into<String>, document: Document) -> Self {
        Self {
            topic: topic.into(),
            article_link: article_link.into(),
            document,
        }
    }
}

/// Field specs + enricher + publisher id for one newspaper
pub struct ArticleExtractor {
    newspaper: String,
    fields: Vec<NamedField>,
    enricher: Box<dyn Enricher>,
}

impl ArticleExtractor {
    pub fn new(
        newspaper: impl Into<String>,
        fields: Vec<NamedField>,
        enricher: Box<dyn Enricher>,
    ) -> Self {
        Self {
            newspaper: newspaper.into(),
            fields,
            enricher,
        }
    }

    /// Builds the extractor described by the `[site]`, `[enricher]` and
    /// `[[field]]` sections of a configuration
    pub fn from_config(config: &Config) -> Self {
        let fields = config.fields.iter().map(NamedField::from).collect();
        let enricher = ParagraphEnricher::from(&config.enricher);
        Self::new(&config.site.newspaper, fields, Box::new(enricher))
    }

    pub fn newspaper(&self) -> &str {
        &self.newspaper
    }

    pub fn fields(&self) -> &[NamedField] {
        &self.fields
    }

    /// Extracts one article
    ///
    /// Field results are merged with the enrichment (enrichment wins), then
    /// provenance is stamped last and always overwrites.
    pub fn extract(&self, step: &CrawlStep) -> Record {
        let mut record = extract_fields(&step.document, &self.fields);
        record.merge(self.enricher.enrich(&step.document));
        record.stamp_provenance(&step.topic, &step.article_link, &self.newspaper);
        record
    }
}

impl std::fmt::Debug for ArticleExtractor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ArticleExtractor")
            .field("newspaper", &self.newspaper)
            .field("fields", &self.fields)
            .finish_non_exhaustive()
    }
}
