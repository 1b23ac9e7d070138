//! Storage traits and error types
//!
//! `RecordSink` is the narrow interface the crawler hands finished topics
//! to. `ArticleStore` adds run tracking and statistics for the SQLite
//! backend.

use crate::extract::Record;
use crate::storage::{RunRecord, RunStatus};
use thiserror::Error;

/// Errors that can occur during storage operations
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("Run not found: {0}")]
    RunNotFound(i64),

    #[error("Record is missing its '{0}' field")]
    MissingProvenance(&'static str),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("SQLite error: {0}")]
    Sqlite(#[from] rusqlite::Error),
}

/// Result type for storage operations
pub type StorageResult<T> = Result<T, StorageError>;

/// Destination for the records of one crawled topic
pub trait RecordSink {
    /// Persists one topic's records in order
    ///
    /// # Returns
    ///
    /// The number of records written. An empty slice writes nothing.
    fn write_topic(&mut self, topic: &str, records: &[Record]) -> StorageResult<usize>;

    /// Flushes anything buffered; called once after the last topic
    fn finish(&mut self) -> StorageResult<()> {
        Ok(())
    }
}

/// Run bookkeeping and article queries for a persistent store
pub trait ArticleStore {
    // ===== Run Management =====

    /// Creates a new crawl run and makes it the run new articles belong to
    ///
    /// # Arguments
    ///
    /// * `config_hash` - Hash of the configuration file
    ///
    /// # Returns
    ///
    /// The ID of the newly created run
    fn create_run(&mut self, config_hash: &str) -> StorageResult<i64>;

    /// Gets a run by ID
    fn get_run(&self, run_id: i64) -> StorageResult<RunRecord>;

    /// Gets the most recent run
    fn get_latest_run(&self) -> StorageResult<Option<RunRecord>>;

    /// Sets the final status of a run with a finish timestamp
    fn finish_run(&mut self, run_id: i64, status: RunStatus) -> StorageResult<()>;

    // ===== Articles =====

    /// Looks up one stored article document
    fn get_article(&self, newspaper: &str, link: &str) -> StorageResult<Option<Record>>;

    // ===== Statistics =====

    /// Gets total article count
    fn count_articles(&self) -> StorageResult<u64>;

    /// Gets article counts per section, largest first
    fn count_by_section(&self) -> StorageResult<Vec<(String, u64)>>;

    /// Gets article counts per newspaper, largest first
    fn count_by_newspaper(&self) -> StorageResult<Vec<(String, u64)>>;
}
