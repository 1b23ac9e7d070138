//! Crawl orchestrator - topic-then-article pipeline
//!
//! This module drives one crawl of one site:
//! - Fetching the root page and building the topic map
//! - Selecting each kept topic and collecting its article links
//! - Downloading and extracting every article with bounded concurrency
//! - Handing each topic's records to a sink, or collecting them in memory
//!
//! Stages exchange values (`TopicTarget`, `ArticleBatch`, `CrawlStep`)
//! instead of sharing a "current topic" or "current article".

use crate::config::Config;
use crate::crawler::fetcher::{Fetcher, HttpFetcher};
use crate::crawler::links::extract_links;
use crate::crawler::topics::{DuplicateTopicPolicy, TopicMap};
use crate::extract::{ArticleExtractor, CrawlStep, ResultSequence};
use crate::html::Document;
use crate::state::CrawlPhase;
use crate::storage::RecordSink;
use crate::{FetchError, HarvestError, Result};
use futures::stream::{self, StreamExt};
use serde::Deserialize;
use std::pin::pin;

/// What happens when one article cannot be fetched
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ArticleErrorPolicy {
    /// Log a warning and continue with the next article
    #[default]
    Skip,
    /// Stop downloading the rest of the topic; the crawl moves on to the
    /// next topic
    Abort,
}

/// Site markup and traversal knobs used by the crawler
#[derive(Debug, Clone)]
pub struct CrawlerSettings {
    pub root_url: String,
    pub topic_class: String,
    pub article_class: String,
    /// Keep only links containing `root_url`
    pub keep_with_base: bool,
    pub duplicate_topics: DuplicateTopicPolicy,
    /// Article downloads in flight per topic
    pub concurrency: usize,
    pub on_article_error: ArticleErrorPolicy,
}

impl CrawlerSettings {
    pub fn from_config(config: &Config) -> Self {
        Self {
            root_url: config.site.root_url.clone(),
            topic_class: config.site.topic_class.clone(),
            article_class: config.site.article_class.clone(),
            keep_with_base: config.site.keep_with_base,
            duplicate_topics: config.site.duplicate_topics,
            concurrency: config.crawl.concurrency.max(1),
            on_article_error: config.crawl.on_article_error,
        }
    }

    fn base_filter(&self) -> Option<&str> {
        self.keep_with_base.then_some(self.root_url.as_str())
    }
}

/// A topic chosen for crawling
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TopicTarget {
    pub name: String,
    pub url: String,
}

/// Article links discovered on one topic page, in page order
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ArticleBatch {
    pub topic: String,
    pub links: Vec<String>,
}

impl ArticleBatch {
    pub fn len(&self) -> usize {
        self.links.len()
    }

    pub fn is_empty(&self) -> bool {
        self.links.is_empty()
    }
}

/// Records of every crawled topic, in topic order
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CrawlResults {
    topics: Vec<(String, ResultSequence)>,
}

impl CrawlResults {
    pub fn get(&self, topic: &str) -> Option<&ResultSequence> {
        self.topics
            .iter()
            .find(|(name, _)| name == topic)
            .map(|(_, records)| records)
    }

    pub fn topic_names(&self) -> impl Iterator<Item = &str> {
        self.topics.iter().map(|(name, _)| name.as_str())
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &ResultSequence)> {
        self.topics
            .iter()
            .map(|(name, records)| (name.as_str(), records))
    }

    /// Number of topics
    pub fn len(&self) -> usize {
        self.topics.len()
    }

    pub fn is_empty(&self) -> bool {
        self.topics.is_empty()
    }

    /// Number of records across all topics
    pub fn total_records(&self) -> usize {
        self.topics.iter().map(|(_, records)| records.len()).sum()
    }
}

/// Counters for one crawl
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CrawlReport {
    /// Topics whose articles were downloaded (including empty ones)
    pub topics_crawled: usize,
    /// Topics whose page could not be fetched
    pub topics_failed: usize,
    pub articles_extracted: usize,
    /// Articles dropped under [`ArticleErrorPolicy::Skip`]
    pub articles_skipped: usize,
    /// Topics cut short under [`ArticleErrorPolicy::Abort`]
    pub topics_aborted: usize,
    pub records_written: usize,
    /// Topics the sink failed to persist
    pub sink_failures: usize,
}

/// Records of one topic, the number of skipped articles and the fetch
/// error that aborted the topic, if any
#[derive(Debug, Default)]
struct TopicOutcome {
    records: ResultSequence,
    skipped: usize,
    aborted: Option<FetchError>,
}

/// Topic-then-article crawler for one news site
pub struct Crawler<F: Fetcher> {
    fetcher: F,
    extractor: ArticleExtractor,
    settings: CrawlerSettings,
    topics: TopicMap,
    phase: CrawlPhase,
}

impl Crawler<HttpFetcher> {
    /// Builds a crawler with a retrying HTTP fetcher from configuration
    ///
    /// # Arguments
    ///
    /// * `config` - A validated configuration
    ///
    /// # Returns
    ///
    /// * `Ok(Crawler)` - Ready to run
    /// * `Err(HarvestError)` - The HTTP client could not be built
    pub fn from_config(config: &Config) -> Result<Self> {
        let fetcher = HttpFetcher::new(&config.fetch)?;
        Ok(Self::with_fetcher(config, fetcher))
    }
}

impl<F: Fetcher> Crawler<F> {
    pub fn new(settings: CrawlerSettings, extractor: ArticleExtractor, fetcher: F) -> Self {
        Self {
            fetcher,
            extractor,
            settings,
            topics: TopicMap::new(),
            phase: CrawlPhase::Init,
        }
    }

    /// Builds a crawler from configuration around any fetcher
    pub fn with_fetcher(config: &Config, fetcher: F) -> Self {
        Self::new(
            CrawlerSettings::from_config(config),
            ArticleExtractor::from_config(config),
            fetcher,
        )
    }

    pub fn topics(&self) -> &TopicMap {
        &self.topics
    }

    pub fn phase(&self) -> CrawlPhase {
        self.phase
    }

    /// Removes topics before crawling; unknown names are ignored
    pub fn drop_topics<S: AsRef<str>>(&mut self, names: &[S]) {
        for name in names {
            tracing::info!("Dropping topic {}", name.as_ref());
        }
        self.topics.drop_topics(names);
    }

    /// Restricts crawling to the named topics
    pub fn keep_topics<S: AsRef<str>>(&mut self, names: &[S]) {
        tracing::info!(
            "Keeping topics {:?}",
            names.iter().map(|name| name.as_ref()).collect::<Vec<_>>()
        );
        self.topics.keep_topics(names);
    }

    /// Fetches the root page and rebuilds the topic map
    ///
    /// A root fetch failure is returned as is and leaves the phase unchanged.
    pub async fn discover_topics(&mut self) -> Result<&TopicMap> {
        self.check_transition(CrawlPhase::TopicsDiscovered)?;

        tracing::info!("Retrieving topics from {}", self.settings.root_url);
        let body = self.fetcher.fetch(&self.settings.root_url).await?;
        let links = {
            let document = Document::parse(&body);
            extract_links(&document, &self.settings.topic_class, self.settings.base_filter())
        };

        self.topics = TopicMap::build(&links, self.settings.duplicate_topics)?;
        self.phase = CrawlPhase::TopicsDiscovered;

        tracing::info!(
            "Found {} topics from {} links",
            self.topics.len(),
            links.len()
        );
        Ok(&self.topics)
    }

    /// Chooses the topic to crawl next
    ///
    /// # Returns
    ///
    /// * `Ok(TopicTarget)` - Name and URL of the topic
    /// * `Err(HarvestError::UnknownTopic)` - The name is not in the topic map
    /// * `Err(HarvestError::InvalidTransition)` - The crawl is mid-topic or done
    pub fn select_topic(&mut self, name: &str) -> Result<TopicTarget> {
        let url = self
            .topics
            .resolve(name)
            .map_err(|e| {
                tracing::error!("Could not select topic {}: {}", name, e);
                e
            })?
            .to_string();
        self.check_transition(CrawlPhase::TopicSelected)?;

        let target = TopicTarget {
            name: name.to_string(),
            url,
        };

        tracing::info!("Selected topic {}", name);
        self.phase = CrawlPhase::TopicSelected;
        Ok(target)
    }

    /// Fetches a topic page and collects its article links
    ///
    /// An empty link list is logged and returned as an empty batch.
    pub async fn discover_articles(&mut self, target: &TopicTarget) -> Result<ArticleBatch> {
        self.check_transition(CrawlPhase::ArticlesDiscovered)?;

        tracing::info!("Fetching articles of topic {}", target.name);
        let body = self.fetcher.fetch(&target.url).await?;
        let links = {
            let document = Document::parse(&body);
            extract_links(&document, &self.settings.article_class, self.settings.base_filter())
        };

        if links.is_empty() {
            tracing::warn!("No articles found for topic {} at {}", target.name, target.url);
        } else {
            tracing::info!("Retrieved {} articles for topic {}", links.len(), target.name);
        }

        self.phase = CrawlPhase::ArticlesDiscovered;
        Ok(ArticleBatch {
            topic: target.name.clone(),
            links,
        })
    }

    /// Downloads and extracts every article of a batch, in link order
    ///
    /// Under [`ArticleErrorPolicy::Abort`] the first failed article ends the
    /// topic and its error is returned. The phase still advances, so the next
    /// topic can be selected.
    pub async fn download_and_extract_all(&mut self, batch: &ArticleBatch) -> Result<ResultSequence> {
        let outcome = self.download_batch(batch).await?;
        match outcome.aborted {
            Some(e) => Err(e.into()),
            None => Ok(outcome.records),
        }
    }

    /// Runs all three topic stages for one topic
    pub async fn crawl_topic(&mut self, name: &str) -> Result<ResultSequence> {
        let target = self.select_topic(name)?;
        let batch = self.discover_articles(&target).await?;
        self.download_and_extract_all(&batch).await
    }

    /// Crawls every kept topic and returns all records in memory
    ///
    /// # Arguments
    ///
    /// * `keep` - If set, only these topics are crawled
    /// * `drop` - Topics never crawled
    pub async fn run(&mut self, keep: Option<&[String]>, drop: &[String]) -> Result<CrawlResults> {
        let mut results = CrawlResults::default();
        self.crawl_topics(keep, drop, |topic, records| {
            let count = records.len();
            results.topics.push((topic.to_string(), records));
            Ok(count)
        })
        .await?;
        Ok(results)
    }

    /// Crawls every kept topic, handing each topic's records to `sink`
    ///
    /// Sink failures are logged and counted; they do not stop the crawl.
    pub async fn run_into(
        &mut self,
        sink: &mut dyn RecordSink,
        keep: Option<&[String]>,
        drop: &[String],
    ) -> Result<CrawlReport> {
        let report = self
            .crawl_topics(keep, drop, |topic, records| {
                sink.write_topic(topic, &records)
            })
            .await?;

        if let Err(e) = sink.finish() {
            tracing::error!("Failed to finish output: {}", e);
        }
        Ok(report)
    }

    /// Marks the crawl as finished
    pub fn finish(&mut self) -> Result<()> {
        self.check_transition(CrawlPhase::Done)?;
        self.phase = CrawlPhase::Done;
        Ok(())
    }

    async fn crawl_topics<S>(
        &mut self,
        keep: Option<&[String]>,
        drop: &[String],
        mut on_topic: S,
    ) -> Result<CrawlReport>
    where
        S: FnMut(&str, ResultSequence) -> crate::storage::StorageResult<usize>,
    {
        if self.phase == CrawlPhase::Init {
            self.discover_topics().await?;
        }
        if let Some(keep) = keep {
            self.keep_topics(keep);
        }
        self.drop_topics(drop);

        let names: Vec<String> = self.topics.names().map(str::to_string).collect();
        let mut report = CrawlReport::default();

        for name in &names {
            let target = self.select_topic(name)?;

            let batch = match self.discover_articles(&target).await {
                Ok(batch) => batch,
                Err(HarvestError::Fetch(e)) => {
                    tracing::error!("Skipping topic {}: {}", name, e);
                    report.topics_failed += 1;
                    continue;
                }
                Err(e) => return Err(e),
            };

            let outcome = self.download_batch(&batch).await?;
            report.topics_crawled += 1;
            report.articles_extracted += outcome.records.len();
            report.articles_skipped += outcome.skipped;
            if let Some(e) = &outcome.aborted {
                tracing::error!(
                    "Topic {} aborted after {} articles: {}",
                    name,
                    outcome.records.len(),
                    e
                );
                report.topics_aborted += 1;
            }

            let count = outcome.records.len();
            tracing::info!("Handing {} records of topic {} to output", count, name);
            match on_topic(name, outcome.records) {
                Ok(written) => report.records_written += written,
                Err(e) => {
                    tracing::error!("Failed to store {} records of topic {}: {}", count, name, e);
                    report.sink_failures += 1;
                }
            }
        }

        self.finish()?;
        tracing::info!(
            "Crawl finished: {} topics, {} articles, {} skipped, {} failed topics, {} aborted topics",
            report.topics_crawled,
            report.articles_extracted,
            report.articles_skipped,
            report.topics_failed,
            report.topics_aborted
        );
        Ok(report)
    }

    async fn download_batch(&mut self, batch: &ArticleBatch) -> Result<TopicOutcome> {
        self.check_transition(CrawlPhase::ArticlesDownloaded)?;
        let outcome = self.collect_articles(batch).await;
        self.phase = CrawlPhase::ArticlesDownloaded;
        Ok(outcome)
    }

    async fn collect_articles(&self, batch: &ArticleBatch) -> TopicOutcome {
        let fetcher = &self.fetcher;
        let extractor = &self.extractor;
        let topic = batch.topic.as_str();

        let mut downloads = pin!(stream::iter(&batch.links)
            .map(|link| async move {
                let record = fetcher.fetch(link).await.map(|body| {
                    let step = CrawlStep::new(topic, link.as_str(), Document::parse(&body));
                    extractor.extract(&step)
                });
                (link, record)
            })
            .buffered(self.settings.concurrency.max(1)));

        let mut outcome = TopicOutcome::default();
        while let Some((link, record)) = downloads.next().await {
            match record {
                Ok(record) => outcome.records.push(record),
                Err(e) => match self.settings.on_article_error {
                    ArticleErrorPolicy::Skip => {
                        tracing::warn!("Skipping article {}: {}", link, e);
                        outcome.skipped += 1;
                    }
                    ArticleErrorPolicy::Abort => {
                        tracing::error!("Aborting topic {} at article {}: {}", topic, link, e);
                        outcome.aborted = Some(e);
                        break;
                    }
                },
            }
        }

        tracing::info!(
            "Extracted {} of {} articles for topic {}",
            outcome.records.len(),
            batch.len(),
            topic
        );
        outcome
    }

    fn check_transition(&self, next: CrawlPhase) -> Result<()> {
        if self.phase.can_transition_to(next) {
            Ok(())
        } else {
            Err(HarvestError::InvalidTransition {
                from: self.phase,
                to: next,
            })
        }
    }
}

impl<F: Fetcher> std::fmt::Debug for Crawler<F> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Crawler")
            .field("settings", &self.settings)
            .field("phase", &self.phase)
            .field("topics", &self.topics)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::extract::{FieldSpec, FieldValue, NamedField, ParagraphEnricher, Record};
    use crate::storage::StorageError;
    use async_trait::async_trait;
    use std::collections::HashMap;
    use std::time::Duration;

    const ROOT: &str = "https://news.test";

    /// In-memory fetcher; unknown URLs answer 404
    #[derive(Default)]
    struct MapFetcher {
        pages: HashMap<String, String>,
        delays: HashMap<String, u64>,
    }

    impl MapFetcher {
        fn page(mut self, url: &str, body: &str) -> Self {
            self.pages.insert(url.to_string(), body.to_string());
            self
        }

        fn slow(mut self, url: &str, millis: u64) -> Self {
            self.delays.insert(url.to_string(), millis);
            self
        }
    }

    #[async_trait]
    impl Fetcher for MapFetcher {
        async fn fetch(&self, url: &str) -> std::result::Result<String, FetchError> {
            if let Some(millis) = self.delays.get(url) {
                tokio::time::sleep(Duration::from_millis(*millis)).await;
            }
            self.pages.get(url).cloned().ok_or_else(|| FetchError::Status {
                url: url.to_string(),
                status: 404,
            })
        }
    }

    #[derive(Default)]
    struct VecSink {
        topics: Vec<(String, usize)>,
        fail_on: Option<String>,
        finished: bool,
    }

    impl RecordSink for VecSink {
        fn write_topic(&mut self, topic: &str, records: &[Record]) -> crate::storage::StorageResult<usize> {
            if self.fail_on.as_deref() == Some(topic) {
                return Err(StorageError::MissingProvenance("link"));
            }
            self.topics.push((topic.to_string(), records.len()));
            Ok(records.len())
        }

        fn finish(&mut self) -> crate::storage::StorageResult<()> {
            self.finished = true;
            Ok(())
        }
    }

    fn root_page() -> String {
        format!(
            r#"<html><body><nav>
                <a class="topic" href="{ROOT}/politics/">Politics</a>
                <a class="topic" href="{ROOT}/sport/">Sport</a>
                <a class="topic" href="https://ads.test/promo/">Promo</a>
            </nav></body></html>"#
        )
    }

    fn listing(links: &[&str]) -> String {
        let anchors: String = links
            .iter()
            .map(|l| format!(r#"<a class="teaser" href="{l}">x</a>"#))
            .collect();
        format!("<html><body>{anchors}</body></html>")
    }

    fn article(headline: &str) -> String {
        format!(
            r#"<html><body>
                <h1 class="headline"> {headline} </h1>
                <p class="atc-TextParagraph">First <a class="rtr-entity">Berlin</a>.</p>
                <p class="atc-TextParagraph">Second <a class="rtr-entity">Paris</a>.</p>
            </body></html>"#
        )
    }

    fn settings() -> CrawlerSettings {
        CrawlerSettings {
            root_url: ROOT.to_string(),
            topic_class: "topic".to_string(),
            article_class: "teaser".to_string(),
            keep_with_base: true,
            duplicate_topics: DuplicateTopicPolicy::Overwrite,
            concurrency: 1,
            on_article_error: ArticleErrorPolicy::Skip,
        }
    }

    fn build_crawler(fetcher: MapFetcher, settings: CrawlerSettings) -> Crawler<MapFetcher> {
        let extractor = ArticleExtractor::new(
            "faz",
            vec![NamedField::new("headline", FieldSpec::text("h1", "headline"))],
            Box::new(ParagraphEnricher::default()),
        );
        Crawler::new(settings, extractor, fetcher)
    }

    fn site() -> MapFetcher {
        MapFetcher::default()
            .page(ROOT, &root_page())
            .page(&format!("{ROOT}/politics/"), &listing(&[&format!("{ROOT}/politics/a1.html")]))
            .page(&format!("{ROOT}/sport/"), &listing(&[]))
            .page(&format!("{ROOT}/politics/a1.html"), &article("Vote"))
    }

    #[tokio::test]
    async fn test_end_to_end_politics_article() {
        let mut crawler = build_crawler(site(), settings());
        let results = crawler.run(None, &[]).await.unwrap();

        assert_eq!(results.topic_names().collect::<Vec<_>>(), vec!["politics", "sport"]);
        let politics = results.get("politics").unwrap();
        assert_eq!(politics.len(), 1);

        let record = &politics[0];
        assert_eq!(record.get("paragraphs"), Some(&FieldValue::Count(2)));
        assert_eq!(record.get("nr_external_references"), Some(&FieldValue::Count(2)));
        assert_eq!(
            record.get("external_references"),
            Some(&FieldValue::List(vec!["Berlin".to_string(), "Paris".to_string()]))
        );
        assert_eq!(
            record.get("text"),
            Some(&FieldValue::from("First Berlin.Second Paris."))
        );
        assert_eq!(record.get("headline"), Some(&FieldValue::from("Vote")));
        assert_eq!(record.section(), Some("politics"));
        assert_eq!(record.link(), Some("https://news.test/politics/a1.html"));
        assert_eq!(record.newspaper(), Some("faz"));
        assert_eq!(crawler.phase(), CrawlPhase::Done);
    }

    #[tokio::test]
    async fn test_empty_article_list_is_not_an_error() {
        let mut crawler = build_crawler(site(), settings());
        crawler.discover_topics().await.unwrap();

        let records = crawler.crawl_topic("sport").await.unwrap();
        assert!(records.is_empty());
        assert_eq!(crawler.phase(), CrawlPhase::ArticlesDownloaded);
    }

    #[tokio::test]
    async fn test_unknown_topic_leaves_map_untouched() {
        let mut crawler = build_crawler(site(), settings());
        crawler.discover_topics().await.unwrap();
        let before = crawler.topics().clone();

        let result = crawler.select_topic("unknown");
        assert!(matches!(result, Err(HarvestError::UnknownTopic { name }) if name == "unknown"));
        assert_eq!(crawler.topics(), &before);
        assert_eq!(crawler.phase(), CrawlPhase::TopicsDiscovered);
    }

    #[tokio::test]
    async fn test_base_filter_drops_foreign_topics() {
        let mut crawler = build_crawler(site(), settings());
        let topics = crawler.discover_topics().await.unwrap();
        assert!(!topics.contains("promo"));

        let mut open = settings();
        open.keep_with_base = false;
        let mut crawler = build_crawler(site(), open);
        assert!(crawler.discover_topics().await.unwrap().contains("promo"));
    }

    #[tokio::test]
    async fn test_root_failure_is_fatal() {
        let mut crawler = build_crawler(MapFetcher::default(), settings());
        let result = crawler.run(None, &[]).await;

        assert!(matches!(result, Err(HarvestError::Fetch(FetchError::Status { status: 404, .. }))));
        assert_eq!(crawler.phase(), CrawlPhase::Init);
    }

    #[tokio::test]
    async fn test_stages_out_of_order_are_rejected() {
        let mut crawler = build_crawler(site(), settings());
        crawler.discover_topics().await.unwrap();
        let batch = ArticleBatch {
            topic: "politics".to_string(),
            links: vec![],
        };
        assert!(matches!(
            crawler.download_and_extract_all(&batch).await,
            Err(HarvestError::InvalidTransition { .. })
        ));

        let target = crawler.select_topic("politics").unwrap();
        crawler.discover_articles(&target).await.unwrap();
        let result = crawler.select_topic("sport");
        assert!(matches!(
            result,
            Err(HarvestError::InvalidTransition {
                from: CrawlPhase::ArticlesDiscovered,
                to: CrawlPhase::TopicSelected
            })
        ));
    }

    #[tokio::test]
    async fn test_unknown_topic_reported_in_every_phase() {
        let mut crawler = build_crawler(site(), settings());
        crawler.discover_topics().await.unwrap();
        let target = crawler.select_topic("politics").unwrap();
        crawler.discover_articles(&target).await.unwrap();

        let result = crawler.select_topic("unknown");
        assert!(matches!(result, Err(HarvestError::UnknownTopic { name }) if name == "unknown"));
        assert_eq!(crawler.phase(), CrawlPhase::ArticlesDiscovered);

        let mut crawler = build_crawler(site(), settings());
        crawler.run(None, &[]).await.unwrap();

        let result = crawler.select_topic("unknown");
        assert!(matches!(result, Err(HarvestError::UnknownTopic { name }) if name == "unknown"));
        assert_eq!(crawler.phase(), CrawlPhase::Done);
    }

    #[tokio::test]
    async fn test_skip_policy_continues_past_missing_article() {
        let fetcher = site().page(
            &format!("{ROOT}/politics/"),
            &listing(&[
                &format!("{ROOT}/politics/gone.html"),
                &format!("{ROOT}/politics/a1.html"),
            ]),
        );
        let mut sink = VecSink::default();
        let mut crawler = build_crawler(fetcher, settings());
        let report = crawler.run_into(&mut sink, None, &[]).await.unwrap();

        assert_eq!(report.articles_extracted, 1);
        assert_eq!(report.articles_skipped, 1);
        assert_eq!(report.topics_crawled, 2);
        assert_eq!(sink.topics, vec![("politics".to_string(), 1), ("sport".to_string(), 0)]);
        assert!(sink.finished);
    }

    #[tokio::test]
    async fn test_abort_policy_ends_only_that_topic() {
        let fetcher = site()
            .page(
                &format!("{ROOT}/politics/"),
                &listing(&[
                    &format!("{ROOT}/politics/a1.html"),
                    &format!("{ROOT}/politics/gone.html"),
                    &format!("{ROOT}/politics/a2.html"),
                ]),
            )
            .page(&format!("{ROOT}/politics/a2.html"), &article("Never fetched"))
            .page(&format!("{ROOT}/sport/"), &listing(&[&format!("{ROOT}/sport/s1.html")]))
            .page(&format!("{ROOT}/sport/s1.html"), &article("Match"));
        let mut aborting = settings();
        aborting.on_article_error = ArticleErrorPolicy::Abort;
        let mut sink = VecSink::default();
        let mut crawler = build_crawler(fetcher, aborting);

        let report = crawler.run_into(&mut sink, None, &[]).await.unwrap();
        assert_eq!(report.topics_aborted, 1);
        assert_eq!(report.topics_crawled, 2);
        assert_eq!(report.articles_extracted, 2);
        assert_eq!(sink.topics, vec![("politics".to_string(), 1), ("sport".to_string(), 1)]);
        assert!(sink.finished);
        assert_eq!(crawler.phase(), CrawlPhase::Done);
    }

    #[tokio::test]
    async fn test_abort_policy_surfaces_error_from_download_stage() {
        let fetcher = site().page(
            &format!("{ROOT}/politics/"),
            &listing(&[&format!("{ROOT}/politics/gone.html")]),
        );
        let mut aborting = settings();
        aborting.on_article_error = ArticleErrorPolicy::Abort;
        let mut crawler = build_crawler(fetcher, aborting);
        crawler.discover_topics().await.unwrap();

        let result = crawler.crawl_topic("politics").await;
        assert!(matches!(result, Err(HarvestError::Fetch(FetchError::Status { status: 404, .. }))));
        assert_eq!(crawler.phase(), CrawlPhase::ArticlesDownloaded);
        assert!(crawler.crawl_topic("sport").await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_failed_topic_page_is_counted_and_skipped() {
        let mut fetcher = site();
        fetcher.pages.remove(&format!("{ROOT}/politics/"));
        let mut sink = VecSink::default();
        let mut crawler = build_crawler(fetcher, settings());

        let report = crawler.run_into(&mut sink, None, &[]).await.unwrap();
        assert_eq!(report.topics_failed, 1);
        assert_eq!(report.topics_crawled, 1);
        assert_eq!(sink.topics, vec![("sport".to_string(), 0)]);
    }

    #[tokio::test]
    async fn test_sink_failure_does_not_stop_crawl() {
        let mut sink = VecSink {
            fail_on: Some("politics".to_string()),
            ..VecSink::default()
        };
        let mut crawler = build_crawler(site(), settings());

        let report = crawler.run_into(&mut sink, None, &[]).await.unwrap();
        assert_eq!(report.sink_failures, 1);
        assert_eq!(report.records_written, 0);
        assert_eq!(sink.topics, vec![("sport".to_string(), 0)]);
    }

    #[tokio::test]
    async fn test_keep_and_drop_filter_topics() {
        let mut crawler = build_crawler(site(), settings());
        let keep = vec!["politics".to_string(), "sport".to_string()];
        let drop = vec!["sport".to_string()];

        let results = crawler.run(Some(keep.as_slice()), &drop).await.unwrap();
        assert_eq!(results.topic_names().collect::<Vec<_>>(), vec!["politics"]);
    }

    #[tokio::test]
    async fn test_concurrent_downloads_keep_link_order() {
        let links: Vec<String> = (1..=4).map(|i| format!("{ROOT}/politics/a{i}.html")).collect();
        let mut fetcher = site().page(
            &format!("{ROOT}/politics/"),
            &listing(&links.iter().map(String::as_str).collect::<Vec<_>>()),
        );
        for (i, link) in links.iter().enumerate() {
            fetcher = fetcher.page(link, &article(&format!("Story {i}")));
            fetcher = fetcher.slow(link, 40 - 10 * i as u64);
        }

        let mut concurrent = settings();
        concurrent.concurrency = 4;
        let mut crawler = build_crawler(fetcher, concurrent);
        crawler.discover_topics().await.unwrap();
        let records = crawler.crawl_topic("politics").await.unwrap();

        let got: Vec<&str> = records.iter().filter_map(Record::link).collect();
        assert_eq!(got, links.iter().map(String::as_str).collect::<Vec<_>>());
    }
}
