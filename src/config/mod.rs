//! Configuration module for Topic-Harvest
//!
//! This module handles loading, parsing, and validating TOML configuration files.
//!
//! # Example
//!
//! ```no_run
//! use topic_harvest::config::load_config;
//! use std::path::Path;
//!
//! let config = load_config(Path::new("configs/faz.toml")).unwrap();
//! println!("Crawling {} from {}", config.site.newspaper, config.site.root_url);
//! ```

mod parser;
mod types;
mod validation;

// Re-export types
pub use types::{
    Config, CrawlConfig, EnricherConfig, FetchConfig, FieldConfig, OutputConfig, SinkKind,
    SiteConfig,
};

// Re-export parser functions
pub use parser::{compute_config_hash, load_config, load_config_with_hash, parse_config};
