//! Flat-file sink writing one pretty-printed JSON array per topic

use crate::extract::Record;
use crate::storage::traits::{RecordSink, StorageResult};
use chrono::{Local, NaiveDate};
use std::fs;
use std::path::{Path, PathBuf};

/// Writes `{dir}/{newspaper}_{topic}_{YYYY-MM-DD}.json`
#[derive(Debug, Clone)]
pub struct JsonFileSink {
    dir: PathBuf,
    newspaper: String,
    date: NaiveDate,
    written: Vec<PathBuf>,
}

impl JsonFileSink {
    /// Creates the output directory if needed; files are dated today
    pub fn new(dir: impl Into<PathBuf>, newspaper: impl Into<String>) -> StorageResult<Self> {
        Self::with_date(dir, newspaper, Local::now().date_naive())
    }

    pub fn with_date(
        dir: impl Into<PathBuf>,
        newspaper: impl Into<String>,
        date: NaiveDate,
    ) -> StorageResult<Self> {
        let dir = dir.into();
        fs::create_dir_all(&dir)?;
        Ok(Self {
            dir,
            newspaper: newspaper.into(),
            date,
            written: Vec::new(),
        })
    }

    /// Path the given topic is (or would be) written to
    pub fn path_for(&self, topic: &str) -> PathBuf {
        let name = format!(
            "{}_{}_{}.json",
            sanitize(&self.newspaper),
            sanitize(topic),
            self.date.format("%Y-%m-%d")
        );
        self.dir.join(name)
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Files written so far, in topic order
    pub fn written_files(&self) -> &[PathBuf] {
        &self.written
    }
}

impl RecordSink for JsonFileSink {
    fn write_topic(&mut self, topic: &str, records: &[Record]) -> StorageResult<usize> {
        if records.is_empty() {
            tracing::debug!("No records for topic '{}', no file written", topic);
            return Ok(0);
        }

        let path = self.path_for(topic);
        let json = serde_json::to_string_pretty(records)?;
        fs::write(&path, json)?;

        tracing::info!("Wrote {} records to {}", records.len(), path.display());
        self.written.push(path);
        Ok(records.len())
    }
}

/// Replaces characters that are unsafe in file names
fn sanitize(component: &str) -> String {
    component
        .chars()
        .map(|c| match c {
            'a'..='z' | 'A'..='Z' | '0'..='9' | '-' | '_' | '.' => c,
            _ => '_',
        })
        .collect()
}
