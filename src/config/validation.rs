use crate::config::types::{
    Config, CrawlConfig, FetchConfig, FieldConfig, OutputConfig, SinkKind, SiteConfig,
};
use crate::extract::PROVENANCE_KEYS;
use crate::ConfigError;
use std::collections::HashSet;
use url::Url;

/// Upper bound on concurrent article downloads per topic
pub const MAX_CONCURRENCY: usize = 64;

/// Validates the entire configuration
pub fn validate(config: &Config) -> Result<(), ConfigError> {
    validate_site_config(&config.site)?;
    validate_fetch_config(&config.fetch)?;
    validate_crawl_config(&config.crawl)?;
    validate_output_config(&config.output)?;
    validate_fields(&config.fields)?;
    Ok(())
}

/// Validates the site section
fn validate_site_config(config: &SiteConfig) -> Result<(), ConfigError> {
    let url = Url::parse(&config.root_url)
        .map_err(|e| ConfigError::InvalidUrl(format!("Invalid root-url '{}': {}", config.root_url, e)))?;

    if url.scheme() != "http" && url.scheme() != "https" {
        return Err(ConfigError::InvalidUrl(format!(
            "root-url '{}' must use HTTP or HTTPS",
            config.root_url
        )));
    }

    require_non_empty("topic-class", &config.topic_class)?;
    require_non_empty("article-class", &config.article_class)?;
    require_non_empty("newspaper", &config.newspaper)?;

    Ok(())
}

/// Validates fetch configuration
fn validate_fetch_config(config: &FetchConfig) -> Result<(), ConfigError> {
    if config.max_attempts < 1 {
        return Err(ConfigError::Validation(format!(
            "max-attempts must be >= 1, got {}",
            config.max_attempts
        )));
    }

    if config.timeout_secs < 1 {
        return Err(ConfigError::Validation(format!(
            "timeout-secs must be >= 1, got {}",
            config.timeout_secs
        )));
    }

    require_non_empty("user-agent", &config.user_agent)
}

/// Validates crawl configuration
fn validate_crawl_config(config: &CrawlConfig) -> Result<(), ConfigError> {
    if config.concurrency < 1 || config.concurrency > MAX_CONCURRENCY {
        return Err(ConfigError::Validation(format!(
            "concurrency must be between 1 and {}, got {}",
            MAX_CONCURRENCY, config.concurrency
        )));
    }
    Ok(())
}

/// Validates output configuration against the selected sink
fn validate_output_config(config: &OutputConfig) -> Result<(), ConfigError> {
    let (key, value) = match config.sink {
        SinkKind::Sqlite => ("database-path", &config.database_path),
        SinkKind::Json => ("json-dir", &config.json_dir),
    };

    match value {
        Some(path) if !path.is_empty() => Ok(()),
        _ => Err(ConfigError::Validation(format!(
            "{} is required for the {:?} sink",
            key, config.sink
        ))),
    }
}

/// Validates the declarative field list
fn validate_fields(fields: &[FieldConfig]) -> Result<(), ConfigError> {
    let mut seen = HashSet::new();

    for field in fields {
        require_non_empty("field name", &field.name)?;
        require_non_empty(&format!("tag of field '{}'", field.name), &field.tag)?;

        if PROVENANCE_KEYS.contains(&field.name.as_str()) {
            return Err(ConfigError::Validation(format!(
                "field name '{}' is reserved for provenance",
                field.name
            )));
        }

        if !seen.insert(field.name.as_str()) {
            return Err(ConfigError::Validation(format!(
                "field '{}' is defined more than once",
                field.name
            )));
        }

        if let Some(attribute) = &field.attribute {
            require_non_empty(&format!("attribute of field '{}'", field.name), attribute)?;
        }
    }

    Ok(())
}

fn require_non_empty(what: &str, value: &str) -> Result<(), ConfigError> {
    if value.trim().is_empty() {
        return Err(ConfigError::Validation(format!("{} cannot be empty", what)));
    }
    Ok(())
}
