//! SQLite storage implementation
//!
//! Articles are upserted by `(newspaper, link)`, so crawling the same site
//! twice leaves one row per article holding the latest extraction.

use crate::extract::{Record, LINK_KEY, NEWSPAPER_KEY, SECTION_KEY};
use crate::storage::schema::initialize_schema;
use crate::storage::traits::{ArticleStore, RecordSink, StorageError, StorageResult};
use crate::storage::{RunRecord, RunStatus};
use chrono::Utc;
use rusqlite::{params, Connection, OptionalExtension, Row};
use std::path::Path;

const UPSERT_ARTICLE_SQL: &str = "
    INSERT INTO articles (newspaper, section, link, document, run_id, scraped_at)
    VALUES (?1, ?2, ?3, ?4, ?5, ?6)
    ON CONFLICT(newspaper, link) DO UPDATE SET
        section = excluded.section,
        document = excluded.document,
        run_id = excluded.run_id,
        scraped_at = excluded.scraped_at
";

/// SQLite storage backend
pub struct SqliteStore {
    conn: Connection,
    current_run: Option<i64>,
}

impl SqliteStore {
    /// Opens (or creates) a database file and ensures the schema exists
    ///
    /// # Arguments
    ///
    /// * `path` - Path to the SQLite database file
    ///
    /// # Returns
    ///
    /// * `Ok(SqliteStore)` - Successfully opened/created database
    /// * `Err(StorageError)` - Failed to open database
    pub fn new(path: &Path) -> StorageResult<Self> {
        let conn = Connection::open(path)?;

        conn.execute_batch(
            "
            PRAGMA journal_mode = WAL;
            PRAGMA synchronous = NORMAL;
            PRAGMA foreign_keys = ON;
            PRAGMA temp_store = MEMORY;
        ",
        )?;

        initialize_schema(&conn)?;

        Ok(Self {
            conn,
            current_run: None,
        })
    }

    /// Creates an in-memory database
    pub fn new_in_memory() -> StorageResult<Self> {
        let conn = Connection::open_in_memory()?;
        conn.execute_batch("PRAGMA foreign_keys = ON;")?;
        initialize_schema(&conn)?;
        Ok(Self {
            conn,
            current_run: None,
        })
    }

    /// The run new articles are attributed to, if one was created
    pub fn current_run(&self) -> Option<i64> {
        self.current_run
    }

    /// Lists the stored articles of one section, oldest row first
    pub fn articles_in_section(&self, newspaper: &str, section: &str) -> StorageResult<Vec<Record>> {
        let mut stmt = self.conn.prepare(
            "SELECT document FROM articles WHERE newspaper = ?1 AND section = ?2 ORDER BY id",
        )?;

        let documents = stmt
            .query_map(params![newspaper, section], |row| row.get::<_, String>(0))?
            .collect::<Result<Vec<_>, _>>()?;

        documents
            .iter()
            .map(|doc| serde_json::from_str(doc).map_err(StorageError::from))
            .collect()
    }

    fn run_from_row(row: &Row<'_>) -> rusqlite::Result<RunRecord> {
        Ok(RunRecord {
            id: row.get(0)?,
            started_at: row.get(1)?,
            finished_at: row.get(2)?,
            config_hash: row.get(3)?,
            status: RunStatus::from_db_string(&row.get::<_, String>(4)?)
                .unwrap_or(RunStatus::Running),
        })
    }

    fn counts(&self, sql: &str) -> StorageResult<Vec<(String, u64)>> {
        let mut stmt = self.conn.prepare(sql)?;
        let rows = stmt
            .query_map([], |row| Ok((row.get::<_, String>(0)?, row.get::<_, i64>(1)? as u64)))?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(rows)
    }
}

impl RecordSink for SqliteStore {
    fn write_topic(&mut self, topic: &str, records: &[Record]) -> StorageResult<usize> {
        if records.is_empty() {
            return Ok(0);
        }

        let now = Utc::now().to_rfc3339();
        let tx = self.conn.transaction()?;
        {
            let mut stmt = tx.prepare(UPSERT_ARTICLE_SQL)?;
            for record in records {
                let newspaper = record
                    .newspaper()
                    .ok_or(StorageError::MissingProvenance(NEWSPAPER_KEY))?;
                let link = record.link().ok_or(StorageError::MissingProvenance(LINK_KEY))?;
                let section = record
                    .section()
                    .ok_or(StorageError::MissingProvenance(SECTION_KEY))?;
                let document = record.to_json()?;

                stmt.execute(params![newspaper, section, link, document, self.current_run, now])?;
            }
        }
        tx.commit()?;

        tracing::debug!("Stored {} articles for topic '{}'", records.len(), topic);
        Ok(records.len())
    }
}

impl ArticleStore for SqliteStore {
    // ===== Run Management =====

    fn create_run(&mut self, config_hash: &str) -> StorageResult<i64> {
        let now = Utc::now().to_rfc3339();
        self.conn.execute(
            "INSERT INTO runs (started_at, config_hash, status) VALUES (?1, ?2, ?3)",
            params![now, config_hash, RunStatus::Running.to_db_string()],
        )?;
        let run_id = self.conn.last_insert_rowid();
        self.current_run = Some(run_id);
        Ok(run_id)
    }

    fn get_run(&self, run_id: i64) -> StorageResult<RunRecord> {
        self.conn
            .query_row(
                "SELECT id, started_at, finished_at, config_hash, status FROM runs WHERE id = ?1",
                params![run_id],
                Self::run_from_row,
            )
            .optional()?
            .ok_or(StorageError::RunNotFound(run_id))
    }

    fn get_latest_run(&self) -> StorageResult<Option<RunRecord>> {
        let run = self
            .conn
            .query_row(
                "SELECT id, started_at, finished_at, config_hash, status FROM runs ORDER BY id DESC LIMIT 1",
                [],
                Self::run_from_row,
            )
            .optional()?;

        Ok(run)
    }

    fn finish_run(&mut self, run_id: i64, status: RunStatus) -> StorageResult<()> {
        let now = Utc::now().to_rfc3339();
        let updated = self.conn.execute(
            "UPDATE runs SET status = ?1, finished_at = ?2 WHERE id = ?3",
            params![status.to_db_string(), now, run_id],
        )?;
        if updated == 0 {
            return Err(StorageError::RunNotFound(run_id));
        }
        Ok(())
    }

    // ===== Articles =====

    fn get_article(&self, newspaper: &str, link: &str) -> StorageResult<Option<Record>> {
        let document: Option<String> = self
            .conn
            .query_row(
                "SELECT document FROM articles WHERE newspaper = ?1 AND link = ?2",
                params![newspaper, link],
                |row| row.get(0),
            )
            .optional()?;

        match document {
            Some(doc) => Ok(Some(serde_json::from_str(&doc)?)),
            None => Ok(None),
        }
    }

    // ===== Statistics =====

    fn count_articles(&self) -> StorageResult<u64> {
        let count: i64 = self
            .conn
            .query_row("SELECT COUNT(*) FROM articles", [], |row| row.get(0))?;
        Ok(count as u64)
    }

    fn count_by_section(&self) -> StorageResult<Vec<(String, u64)>> {
        self.counts(
            "SELECT section, COUNT(*) AS n FROM articles GROUP BY section ORDER BY n DESC, section",
        )
    }

    fn count_by_newspaper(&self) -> StorageResult<Vec<(String, u64)>> {
        self.counts(
            "SELECT newspaper, COUNT(*) AS n FROM articles GROUP BY newspaper ORDER BY n DESC, newspaper",
        )
    }
}

/// Creates the database file and schema without opening a store
///
/// # Arguments
///
/// * `path` - Path to the SQLite database file
///
/// # Returns
///
/// * `Ok(Connection)` - Successfully opened/created database
/// * `Err(rusqlite::Error)` - Failed to open database
pub fn init_database(path: &Path) -> Result<Connection, rusqlite::Error> {
    let conn = Connection::open(path)?;

    conn.execute_batch(
        "
        PRAGMA journal_mode = WAL;
        PRAGMA synchronous = NORMAL;
        PRAGMA foreign_keys = ON;
    ",
    )?;

    initialize_schema(&conn)?;

    Ok(conn)
}
