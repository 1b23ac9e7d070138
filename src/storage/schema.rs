//! Database schema definitions
//!
//! Articles are stored as JSON documents keyed by `(newspaper, link)`, so
//! re-crawling an article replaces its previous version.

/// SQL schema for the database
pub const SCHEMA_SQL: &str = r#"
-- Track crawl runs
CREATE TABLE IF NOT EXISTS runs (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    started_at TEXT NOT NULL,
    finished_at TEXT,
    config_hash TEXT NOT NULL,
    status TEXT NOT NULL
);

-- One row per extracted article
CREATE TABLE IF NOT EXISTS articles (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    newspaper TEXT NOT NULL,
    section TEXT NOT NULL,
    link TEXT NOT NULL,
    document TEXT NOT NULL,
    run_id INTEGER REFERENCES runs(id),
    scraped_at TEXT NOT NULL,
    UNIQUE(newspaper, link)
);

CREATE INDEX IF NOT EXISTS idx_articles_section ON articles(newspaper, section);
CREATE INDEX IF NOT EXISTS idx_articles_run ON articles(run_id);
"#;

/// Initializes the database schema
///
/// # Arguments
///
/// * `conn` - The database connection
///
/// # Returns
///
/// * `Ok(())` - Schema initialized successfully
/// * `Err(rusqlite::Error)` - Failed to initialize schema
pub fn initialize_schema(conn: &rusqlite::Connection) -> Result<(), rusqlite::Error> {
    conn.execute_batch(SCHEMA_SQL)?;
    Ok(())
}
