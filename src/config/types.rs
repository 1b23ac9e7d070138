use crate::crawler::{ArticleErrorPolicy, Backoff, DuplicateTopicPolicy};
use serde::Deserialize;

/// Main configuration structure for Topic-Harvest
#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    pub site: SiteConfig,
    #[serde(default)]
    pub fetch: FetchConfig,
    #[serde(default)]
    pub crawl: CrawlConfig,
    pub output: OutputConfig,
    #[serde(default)]
    pub enricher: EnricherConfig,
    #[serde(default, rename = "field")]
    pub fields: Vec<FieldConfig>,
}

/// The news site being crawled
#[derive(Debug, Clone, Deserialize)]
pub struct SiteConfig {
    /// Root page listing the topic sections
    #[serde(rename = "root-url")]
    pub root_url: String,

    /// Exact class string of topic links on the root page
    #[serde(rename = "topic-class")]
    pub topic_class: String,

    /// Exact class string of article links on a topic page
    #[serde(rename = "article-class")]
    pub article_class: String,

    /// Publisher id stamped on every record
    pub newspaper: String,

    /// Keep only links containing the root URL
    #[serde(rename = "keep-with-base", default = "default_true")]
    pub keep_with_base: bool,

    /// What to do when two topic links end in the same segment
    #[serde(rename = "duplicate-topics", default)]
    pub duplicate_topics: DuplicateTopicPolicy,
}

/// HTTP fetch behavior
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct FetchConfig {
    #[serde(rename = "user-agent")]
    pub user_agent: String,

    /// Whole-request timeout in seconds
    #[serde(rename = "timeout-secs")]
    pub timeout_secs: u64,

    /// Total attempts per URL, including the first
    #[serde(rename = "max-attempts")]
    pub max_attempts: u32,

    /// Delay before the first retry (milliseconds)
    #[serde(rename = "base-delay-ms")]
    pub base_delay_ms: u64,

    pub backoff: Backoff,

    /// Add 0-250ms of random delay to every retry
    pub jitter: bool,
}

impl Default for FetchConfig {
    fn default() -> Self {
        Self {
            user_agent: format!("topic-harvest/{}", env!("CARGO_PKG_VERSION")),
            timeout_secs: 30,
            max_attempts: 3,
            base_delay_ms: 2000,
            backoff: Backoff::Exponential,
            jitter: false,
        }
    }
}

/// Crawl traversal behavior
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct CrawlConfig {
    /// Article downloads in flight per topic
    pub concurrency: usize,

    #[serde(rename = "on-article-error")]
    pub on_article_error: ArticleErrorPolicy,

    /// Crawl only these topics (absent or empty means all)
    #[serde(rename = "keep-topics")]
    pub keep_topics: Option<Vec<String>>,

    /// Never crawl these topics
    #[serde(rename = "drop-topics")]
    pub drop_topics: Vec<String>,
}

impl Default for CrawlConfig {
    fn default() -> Self {
        Self {
            concurrency: 1,
            on_article_error: ArticleErrorPolicy::Skip,
            keep_topics: None,
            drop_topics: Vec::new(),
        }
    }
}

impl CrawlConfig {
    /// The keep list to apply, or `None` when every topic is crawled
    pub fn keep_list(&self) -> Option<&[String]> {
        self.keep_topics.as_deref().filter(|keep| !keep.is_empty())
    }
}

/// Where records are persisted
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SinkKind {
    #[default]
    Sqlite,
    Json,
}

/// Output configuration
#[derive(Debug, Clone, Deserialize)]
pub struct OutputConfig {
    #[serde(default)]
    pub sink: SinkKind,

    /// Path to the SQLite database file
    #[serde(rename = "database-path")]
    pub database_path: Option<String>,

    /// Directory receiving one JSON file per topic
    #[serde(rename = "json-dir")]
    pub json_dir: Option<String>,
}

/// Markup used by the paragraph enricher
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct EnricherConfig {
    #[serde(rename = "paragraph-tag")]
    pub paragraph_tag: String,

    #[serde(rename = "paragraph-class")]
    pub paragraph_class: String,

    #[serde(rename = "reference-tag")]
    pub reference_tag: String,

    #[serde(rename = "reference-class")]
    pub reference_class: String,
}

impl Default for EnricherConfig {
    fn default() -> Self {
        Self {
            paragraph_tag: "p".to_string(),
            paragraph_class: "atc-TextParagraph".to_string(),
            reference_tag: "a".to_string(),
            reference_class: "rtr-entity".to_string(),
        }
    }
}

/// One declarative field; `attribute` selects attribute scraping
#[derive(Debug, Clone, Deserialize)]
pub struct FieldConfig {
    pub name: String,
    pub tag: String,
    pub class: String,
    #[serde(default)]
    pub attribute: Option<String>,
}

fn default_true() -> bool {
    true
}
