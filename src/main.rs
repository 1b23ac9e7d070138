//! Topic-Harvest main entry point
//!
//! This is the command-line interface for the Topic-Harvest news crawler.

use clap::Parser;
use std::path::{Path, PathBuf};
use topic_harvest::config::{load_config_with_hash, Config, SinkKind};
use topic_harvest::crawler::{crawl, Crawler};
use topic_harvest::output::{print_report, print_topics};
use topic_harvest::storage::{ArticleStore, JsonFileSink, RunStatus, SqliteStore};
use tracing_subscriber::EnvFilter;

/// Topic-Harvest: a topic-then-article news crawler
///
/// Topic-Harvest reads the section menu of one news site, collects the
/// article links of every section and stores each article as a flat record
/// built from class-keyed HTML selectors.
#[derive(Parser, Debug)]
#[command(name = "topic-harvest")]
#[command(version)]
#[command(about = "A topic-then-article news crawler", long_about = None)]
struct Cli {
    /// Path to TOML configuration file
    #[arg(value_name = "CONFIG")]
    config: PathBuf,

    /// Increase logging verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Suppress non-error output
    #[arg(short, long, conflicts_with = "verbose")]
    quiet: bool,

    /// Validate config and show what would be crawled without crawling
    #[arg(long, conflicts_with_all = ["stats", "list_topics", "init_db"])]
    dry_run: bool,

    /// Fetch the root page, print the topics that would be crawled and exit
    #[arg(long, conflicts_with_all = ["dry_run", "stats", "init_db"])]
    list_topics: bool,

    /// Show statistics from the article database and exit
    #[arg(long, conflicts_with_all = ["dry_run", "list_topics", "init_db"])]
    stats: bool,

    /// Create the article database schema and exit
    #[arg(long, conflicts_with_all = ["dry_run", "list_topics", "stats"])]
    init_db: bool,

    /// Crawl only this topic; repeat for more (overrides `keep-topics`)
    #[arg(long, value_name = "TOPIC", action = clap::ArgAction::Append)]
    keep: Vec<String>,

    /// Never crawl this topic; repeat for more (overrides `drop-topics`)
    #[arg(long, value_name = "TOPIC", action = clap::ArgAction::Append)]
    drop: Vec<String>,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    setup_logging(cli.verbose, cli.quiet);

    tracing::info!("Loading configuration from: {}", cli.config.display());
    let (mut config, config_hash) = match load_config_with_hash(&cli.config) {
        Ok((cfg, hash)) => {
            tracing::info!("Configuration loaded successfully (hash: {})", hash);
            (cfg, hash)
        }
        Err(e) => {
            tracing::error!("Failed to load configuration: {}", e);
            return Err(e.into());
        }
    };

    if !cli.keep.is_empty() {
        config.crawl.keep_topics = Some(cli.keep.clone());
    }
    if !cli.drop.is_empty() {
        config.crawl.drop_topics = cli.drop.clone();
    }

    if cli.dry_run {
        handle_dry_run(&config);
    } else if cli.list_topics {
        handle_list_topics(&config).await?;
    } else if cli.stats {
        handle_stats(&config)?;
    } else if cli.init_db {
        handle_init_db(&config)?;
    } else {
        handle_crawl(&config, &config_hash).await?;
    }

    Ok(())
}

/// Sets up the logging/tracing subscriber based on verbosity level
fn setup_logging(verbose: u8, quiet: bool) {
    let filter = if quiet {
        EnvFilter::new("error")
    } else {
        match verbose {
            0 => EnvFilter::new("topic_harvest=info,warn"),
            1 => EnvFilter::new("topic_harvest=debug,info"),
            2 => EnvFilter::new("topic_harvest=trace,debug"),
            _ => EnvFilter::new("trace"),
        }
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_thread_ids(false)
        .with_file(false)
        .init();
}

/// Handles the --dry-run mode: validates config and shows what would be crawled
fn handle_dry_run(config: &Config) {
    println!("=== Topic-Harvest Dry Run ===\n");

    println!("Site:");
    println!("  Root: {}", config.site.root_url);
    println!("  Newspaper: {}", config.site.newspaper);
    println!("  Topic class: {}", config.site.topic_class);
    println!("  Article class: {}", config.site.article_class);
    println!("  Keep with base: {}", config.site.keep_with_base);
    println!("  Duplicate topics: {:?}", config.site.duplicate_topics);

    println!("\nFetch:");
    println!("  User agent: {}", config.fetch.user_agent);
    println!("  Timeout: {}s", config.fetch.timeout_secs);
    println!(
        "  Retries: {} attempts, {:?} backoff from {}ms{}",
        config.fetch.max_attempts,
        config.fetch.backoff,
        config.fetch.base_delay_ms,
        if config.fetch.jitter { " with jitter" } else { "" }
    );

    println!("\nCrawl:");
    println!("  Concurrency: {}", config.crawl.concurrency);
    println!("  On article error: {:?}", config.crawl.on_article_error);
    match config.crawl.keep_list() {
        Some(keep) => println!("  Keep topics: {}", keep.join(", ")),
        None => println!("  Keep topics: all"),
    }
    if !config.crawl.drop_topics.is_empty() {
        println!("  Drop topics: {}", config.crawl.drop_topics.join(", "));
    }

    println!("\nOutput:");
    match config.output.sink {
        SinkKind::Sqlite => println!(
            "  SQLite: {}",
            config.output.database_path.as_deref().unwrap_or("-")
        ),
        SinkKind::Json => println!(
            "  JSON directory: {}",
            config.output.json_dir.as_deref().unwrap_or("-")
        ),
    }

    println!("\nFields ({}):", config.fields.len());
    for field in &config.fields {
        match &field.attribute {
            Some(attribute) => println!(
                "  - {}: {}.{} @{}",
                field.name, field.tag, field.class, attribute
            ),
            None => println!("  - {}: {}.{}", field.name, field.tag, field.class),
        }
    }
    println!(
        "  + paragraphs from {}.{}, references from {}.{}",
        config.enricher.paragraph_tag,
        config.enricher.paragraph_class,
        config.enricher.reference_tag,
        config.enricher.reference_class
    );

    println!("\n✓ Configuration is valid");
}

/// Handles the --list-topics mode: discovers and prints topics
async fn handle_list_topics(config: &Config) -> Result<(), Box<dyn std::error::Error>> {
    let mut crawler = Crawler::from_config(config)?;
    crawler.discover_topics().await?;

    if let Some(keep) = config.crawl.keep_list() {
        crawler.keep_topics(keep);
    }
    crawler.drop_topics(config.crawl.drop_topics.as_slice());

    print_topics(crawler.topics());
    Ok(())
}

/// Handles the --stats mode: shows statistics from the database
fn handle_stats(config: &Config) -> Result<(), Box<dyn std::error::Error>> {
    use topic_harvest::output::{load_statistics, print_statistics};
    use topic_harvest::storage::open_storage;

    let path = database_path(config)?;
    println!("Database: {}\n", path.display());

    let storage = open_storage(path)?;
    let stats = load_statistics(&storage)?;
    print_statistics(&stats);

    Ok(())
}

/// Handles the --init-db mode: creates the article schema
fn handle_init_db(config: &Config) -> Result<(), Box<dyn std::error::Error>> {
    let path = database_path(config)?;
    topic_harvest::storage::init_database(path)?;
    println!("✓ Database initialized at: {}", path.display());
    Ok(())
}

/// Handles the main crawl operation
async fn handle_crawl(config: &Config, config_hash: &str) -> Result<(), Box<dyn std::error::Error>> {
    tracing::info!(
        "Crawling {} from {} with {} fields",
        config.site.newspaper,
        config.site.root_url,
        config.fields.len()
    );

    let report = match config.output.sink {
        SinkKind::Sqlite => {
            let mut store = SqliteStore::new(database_path(config)?)?;
            let run_id = store.create_run(config_hash)?;
            let result = crawl(config, &mut store).await;

            let status = if result.is_ok() {
                RunStatus::Completed
            } else {
                RunStatus::Failed
            };
            store.finish_run(run_id, status)?;
            result
        }
        SinkKind::Json => {
            let dir = config
                .output
                .json_dir
                .as_deref()
                .ok_or("json-dir is required for the json sink")?;
            let mut sink = JsonFileSink::new(dir, &config.site.newspaper)?;
            crawl(config, &mut sink).await
        }
    };

    match report {
        Ok(report) => {
            tracing::info!("Crawl completed successfully");
            print_report(&report);
            Ok(())
        }
        Err(e) => {
            tracing::error!("Crawl failed: {}", e);
            Err(e.into())
        }
    }
}

fn database_path(config: &Config) -> Result<&Path, Box<dyn std::error::Error>> {
    config
        .output
        .database_path
        .as_deref()
        .map(Path::new)
        .ok_or_else(|| "database-path is not configured".into())
}
