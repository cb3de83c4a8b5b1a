//! Settings read from the environment.

use std::env;

use classifieds_search_repository::config::{DEFAULT_BULK_CHUNK_SIZE, DEFAULT_SCROLL_BATCH_SIZE};
use classifieds_search_repository::opensearch::{
    DEFAULT_HISTORY_INDEX, DEFAULT_POSTS_INDEX, DEFAULT_STRAY_INDEX_PATTERN,
};
use classifieds_search_repository::{IndexConfig, SearchServiceConfig};
use tracing::warn;

use crate::errors::ReconcileError;

/// Default search engine URL.
const DEFAULT_ELASTICSEARCH_URL: &str = "http://localhost:9200";

/// Default PostgreSQL pool size.
const DEFAULT_DATABASE_MAX_CONNECTIONS: u32 = 5;

/// Log output format.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LogFormat {
    /// Compact human-readable lines.
    #[default]
    Console,
    /// One JSON object per line.
    Json,
}

/// Everything the scripts read from the environment.
#[derive(Debug, Clone)]
pub struct Settings {
    pub elasticsearch_url: String,
    pub database_url: Option<String>,
    pub database_max_connections: u32,
    pub posts_index: String,
    pub history_index: String,
    pub stray_index_pattern: String,
    pub scroll_batch_size: usize,
    pub bulk_chunk_size: usize,
    pub log_format: LogFormat,
}

impl Settings {
    /// Read settings from environment variables.
    ///
    /// # Environment Variables
    ///
    /// - `ELASTICSEARCH_URL`: search engine URL (default: http://localhost:9200)
    /// - `DATABASE_URL`: PostgreSQL connection string
    /// - `DATABASE_MAX_CONNECTIONS`: pool size (default: 5)
    /// - `POSTS_INDEX`: document index name (default: posts)
    /// - `SEARCH_HISTORY_INDEX`: history index name (default: search_history)
    /// - `STRAY_INDEX_PATTERN`: pattern consolidate lists indices with (default: posts*)
    /// - `SCROLL_BATCH_SIZE`: documents per scroll page (default: 500)
    /// - `BULK_CHUNK_SIZE`: documents per bulk request (default: 1000)
    /// - `LOG_FORMAT`: `json` for JSON logs, anything else for console output
    pub fn from_env() -> Result<Self, ReconcileError> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Read settings through `lookup`, which returns the value of a variable if set.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ReconcileError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let text = |key: &str, default: &str| {
            lookup(key)
                .filter(|v| !v.trim().is_empty())
                .unwrap_or_else(|| default.to_string())
        };

        let elasticsearch_url = text("ELASTICSEARCH_URL", DEFAULT_ELASTICSEARCH_URL);
        if !elasticsearch_url.starts_with("http://") && !elasticsearch_url.starts_with("https://") {
            return Err(ReconcileError::config(format!(
                "ELASTICSEARCH_URL must be an http(s) URL, got {}",
                elasticsearch_url
            )));
        }

        let log_format = match lookup("LOG_FORMAT").map(|v| v.to_lowercase()).as_deref() {
            Some("json") => LogFormat::Json,
            _ => LogFormat::Console,
        };

        Ok(Self {
            elasticsearch_url,
            database_url: lookup("DATABASE_URL").filter(|v| !v.trim().is_empty()),
            database_max_connections: parse_number(
                &lookup,
                "DATABASE_MAX_CONNECTIONS",
                DEFAULT_DATABASE_MAX_CONNECTIONS,
            ),
            posts_index: text("POSTS_INDEX", DEFAULT_POSTS_INDEX),
            history_index: text("SEARCH_HISTORY_INDEX", DEFAULT_HISTORY_INDEX),
            stray_index_pattern: text("STRAY_INDEX_PATTERN", DEFAULT_STRAY_INDEX_PATTERN),
            scroll_batch_size: parse_number(&lookup, "SCROLL_BATCH_SIZE", DEFAULT_SCROLL_BATCH_SIZE),
            bulk_chunk_size: parse_number(&lookup, "BULK_CHUNK_SIZE", DEFAULT_BULK_CHUNK_SIZE),
            log_format,
        })
    }

    /// The PostgreSQL connection string, required by every script.
    pub fn require_database_url(&self) -> Result<&str, ReconcileError> {
        self.database_url
            .as_deref()
            .ok_or_else(|| ReconcileError::config("DATABASE_URL must be set"))
    }

    pub fn index_config(&self) -> IndexConfig {
        IndexConfig::new(&self.posts_index, &self.history_index)
            .with_stray_index_pattern(&self.stray_index_pattern)
    }

    pub fn service_config(&self) -> SearchServiceConfig {
        SearchServiceConfig::default()
            .with_bulk_chunk_size(self.bulk_chunk_size)
            .with_scroll_batch_size(self.scroll_batch_size)
    }
}

/// Parse a positive number, falling back to `default` when unset or invalid.
fn parse_number<F, T>(lookup: &F, key: &str, default: T) -> T
where
    F: Fn(&str) -> Option<String>,
    T: std::str::FromStr + PartialOrd + Default + Copy,
{
    match lookup(key) {
        None => default,
        Some(raw) => match raw.trim().parse::<T>() {
            Ok(value) if value > T::default() => value,
            _ => {
                warn!(variable = key, value = %raw, "Invalid number, using default");
                default
            }
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn settings(vars: &[(&str, &str)]) -> Result<Settings, ReconcileError> {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        Settings::from_lookup(|key| vars.get(key).cloned())
    }

    #[test]
    fn test_defaults() {
        let settings = settings(&[]).unwrap();

        assert_eq!(settings.elasticsearch_url, "http://localhost:9200");
        assert_eq!(settings.database_url, None);
        assert_eq!(settings.database_max_connections, 5);
        assert_eq!(settings.posts_index, "posts");
        assert_eq!(settings.history_index, "search_history");
        assert_eq!(settings.stray_index_pattern, "posts*");
        assert_eq!(settings.scroll_batch_size, 500);
        assert_eq!(settings.bulk_chunk_size, 1000);
        assert_eq!(settings.log_format, LogFormat::Console);
    }

    #[test]
    fn test_overrides() {
        let settings = settings(&[
            ("ELASTICSEARCH_URL", "https://search.internal:9243"),
            ("DATABASE_URL", "postgres://localhost/market"),
            ("POSTS_INDEX", "posts_v2"),
            ("BULK_CHUNK_SIZE", "250"),
            ("LOG_FORMAT", "JSON"),
        ])
        .unwrap();

        assert_eq!(settings.elasticsearch_url, "https://search.internal:9243");
        assert_eq!(settings.require_database_url().unwrap(), "postgres://localhost/market");
        assert_eq!(settings.index_config().posts_index, "posts_v2");
        assert_eq!(settings.service_config().bulk_chunk_size, 250);
        assert_eq!(settings.log_format, LogFormat::Json);
    }

    #[test]
    fn test_invalid_numbers_fall_back() {
        let settings = settings(&[("SCROLL_BATCH_SIZE", "lots"), ("BULK_CHUNK_SIZE", "0")]).unwrap();

        assert_eq!(settings.scroll_batch_size, 500);
        assert_eq!(settings.bulk_chunk_size, 1000);
    }

    #[test]
    fn test_missing_database_url() {
        let settings = settings(&[("DATABASE_URL", "  ")]).unwrap();
        assert!(matches!(
            settings.require_database_url(),
            Err(ReconcileError::ConfigError(_))
        ));
    }

    #[test]
    fn test_rejects_non_http_url() {
        let result = settings(&[("ELASTICSEARCH_URL", "localhost:9200")]);
        assert!(matches!(result, Err(ReconcileError::ConfigError(_))));
    }
}
