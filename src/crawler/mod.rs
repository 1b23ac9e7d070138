//! Crawler module for the topic-then-article pipeline
//!
//! This module contains the core crawling logic, including:
//! - HTTP fetching with retry logic
//! - Link extraction from listing pages
//! - The topic registry
//! - Overall crawl orchestration

mod fetcher;
mod links;
mod orchestrator;
mod topics;

pub use fetcher::{build_http_client, Backoff, Fetcher, HttpFetcher, RetryPolicy, MAX_JITTER_MS};
pub use links::{extract_links, filter_by_base};
pub use orchestrator::{
    ArticleBatch, ArticleErrorPolicy, CrawlReport, CrawlResults, Crawler, CrawlerSettings,
    TopicTarget,
};
pub use topics::{topic_name, DuplicateTopicPolicy, TopicMap};

use crate::config::Config;
use crate::storage::RecordSink;
use crate::Result;

/// Runs a complete crawl into a sink
///
/// This is the main entry point for a configured crawl. It will:
/// 1. Build the HTTP client
/// 2. Discover topics and apply the `[crawl]` keep/drop lists
/// 3. Download and extract every article of every kept topic
/// 4. Hand each topic's records to `sink`
///
/// # Arguments
///
/// * `config` - The crawler configuration
/// * `sink` - Where each topic's records are written
///
/// # Returns
///
/// * `Ok(CrawlReport)` - Crawl completed
/// * `Err(HarvestError)` - Root page unreachable or the HTTP client failed to build
pub async fn crawl(config: &Config, sink: &mut dyn RecordSink) -> Result<CrawlReport> {
    let mut crawler = Crawler::from_config(config)?;
    crawler
        .run_into(
            sink,
            config.crawl.keep_list(),
            &config.crawl.drop_topics,
        )
        .await
}
