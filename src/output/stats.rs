//! Statistics generation from the article database
//!
//! This module provides functionality for extracting and displaying
//! article statistics from the storage layer.

use crate::storage::{ArticleStore, RunRecord, StorageResult};

/// Article database summary
#[derive(Debug, Clone)]
pub struct ArticleStatistics {
    /// Total number of stored articles
    pub total_articles: u64,

    /// Article count per section, largest first
    pub by_section: Vec<(String, u64)>,

    /// Article count per newspaper, largest first
    pub by_newspaper: Vec<(String, u64)>,

    /// Most recent crawl run, if any
    pub latest_run: Option<RunRecord>,
}

/// Loads statistics from storage
///
/// # Arguments
///
/// * `storage` - The storage backend to query
///
/// # Returns
///
/// * `Ok(ArticleStatistics)` - Successfully loaded statistics
/// * `Err(StorageError)` - Failed to query statistics
pub fn load_statistics(storage: &dyn ArticleStore) -> StorageResult<ArticleStatistics> {
    Ok(ArticleStatistics {
        total_articles: storage.count_articles()?,
        by_section: storage.count_by_section()?,
        by_newspaper: storage.count_by_newspaper()?,
        latest_run: storage.get_latest_run()?,
    })
}

/// Prints statistics to stdout in a formatted manner
///
/// # Arguments
///
/// * `stats` - The statistics to display
pub fn print_statistics(stats: &ArticleStatistics) {
    println!("=== Article Statistics ===\n");

    println!("Overview:");
    println!("  Total articles: {}", stats.total_articles);
    println!();

    if !stats.by_newspaper.is_empty() {
        println!("Articles by Newspaper:");
        for (newspaper, count) in &stats.by_newspaper {
            println!("  {}: {}", newspaper, count);
        }
        println!();
    }

    if !stats.by_section.is_empty() {
        println!("Articles by Section:");
        for (section, count) in &stats.by_section {
            let percentage = if stats.total_articles > 0 {
                (*count as f64 / stats.total_articles as f64) * 100.0
            } else {
                0.0
            };
            println!("  {}: {} ({:.1}%)", section, count, percentage);
        }
        println!();
    }

    match &stats.latest_run {
        Some(run) => println!(
            "Latest Run: #{} {} (started {}, finished {})",
            run.id,
            run.status.to_db_string(),
            run.started_at,
            run.finished_at.as_deref().unwrap_or("-")
        ),
        None => println!("No crawl runs recorded"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::extract::Record;
    use crate::storage::{RecordSink, RunStatus, SqliteStore};

    fn record(section: &str, link: &str) -> Record {
        let mut record = Record::new();
        record.stamp_provenance(section, link, "faz");
        record
    }

    #[test]
    fn test_load_statistics_from_store() {
        let mut store = SqliteStore::new_in_memory().unwrap();
        let run_id = store.create_run("hash").unwrap();
        store
            .write_topic(
                "politik",
                &[record("politik", "https://x.test/1"), record("politik", "https://x.test/2")],
            )
            .unwrap();
        store
            .write_topic("sport", &[record("sport", "https://x.test/3")])
            .unwrap();
        store.finish_run(run_id, RunStatus::Completed).unwrap();

        let stats = load_statistics(&store).unwrap();
        assert_eq!(stats.total_articles, 3);
        assert_eq!(stats.by_section[0], ("politik".to_string(), 2));
        assert_eq!(stats.by_newspaper, vec![("faz".to_string(), 3)]);

        let run = stats.latest_run.unwrap();
        assert_eq!(run.id, run_id);
        assert_eq!(run.status, RunStatus::Completed);
    }

    #[test]
    fn test_empty_store() {
        let store = SqliteStore::new_in_memory().unwrap();
        let stats = load_statistics(&store).unwrap();

        assert_eq!(stats.total_articles, 0);
        assert!(stats.by_section.is_empty());
        assert!(stats.latest_run.is_none());
    }
}
