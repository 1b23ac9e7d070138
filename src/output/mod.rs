//! Output module for crawl reports and statistics
//!
//! This module handles:
//! - Printing the counters of a finished crawl
//! - Printing the topic map for `--list-topics`
//! - Summarizing the article database for `--stats`

pub mod stats;

pub use stats::{load_statistics, print_statistics, ArticleStatistics};

use crate::crawler::{CrawlReport, TopicMap};

/// Prints the counters of a finished crawl
pub fn print_report(report: &CrawlReport) {
    println!("=== Crawl Report ===\n");
    println!("  Topics crawled: {}", report.topics_crawled);
    if report.topics_failed > 0 {
        println!("  Topics failed: {}", report.topics_failed);
    }
    if report.topics_aborted > 0 {
        println!("  Topics aborted: {}", report.topics_aborted);
    }
    println!("  Articles extracted: {}", report.articles_extracted);
    if report.articles_skipped > 0 {
        println!("  Articles skipped: {}", report.articles_skipped);
    }
    println!("  Records written: {}", report.records_written);
    if report.sink_failures > 0 {
        println!("  Topics not stored: {}", report.sink_failures);
    }
}

/// Prints one `name  url` line per topic, in crawl order
pub fn print_topics(topics: &TopicMap) {
    let width = topics.names().map(str::len).max().unwrap_or(0);
    for (name, url) in topics.iter() {
        println!("{:width$}  {}", name, url, width = width);
    }
    println!("\n{} topics", topics.len());
}
