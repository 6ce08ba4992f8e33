use crate::db::ServerEndpoint;
use log::LevelFilter;
use std::env;
use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;

fn lookup_string<F>(lookup: &F, key: &str, default: &str) -> String
where
    F: Fn(&str) -> Option<String>,
{
    lookup(key)
        .map(|value| value.trim().to_string())
        .filter(|value| !value.is_empty())
        .unwrap_or_else(|| default.to_string())
}

fn lookup_parsed<F, T>(lookup: &F, key: &str, default: T) -> T
where
    F: Fn(&str) -> Option<String>,
    T: FromStr,
{
    lookup(key)
        .and_then(|value| value.trim().parse::<T>().ok())
        .unwrap_or(default)
}

fn lookup_duration_millis<F>(lookup: &F, key: &str, default_millis: u64) -> Duration
where
    F: Fn(&str) -> Option<String>,
{
    Duration::from_millis(lookup_parsed(lookup, key, default_millis))
}

/// Runtime configuration for the media import.
#[derive(Debug, Clone, PartialEq)]
pub struct ImportConfig {
    pub endpoint: ServerEndpoint,
    pub database: String,
    pub server_selection_timeout: Duration,
    pub log_file: PathBuf,
    pub log_level: LevelFilter,
}

impl ImportConfig {
    pub fn from_env() -> Self {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Build the configuration from an arbitrary key lookup.
    ///
    /// Missing or unparsable values fall back to their defaults.
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = ServerEndpoint::default();

        Self {
            endpoint: ServerEndpoint::new(
                lookup_string(&lookup, "MEDIA_DB_HOST", &defaults.host),
                lookup_parsed(&lookup, "MEDIA_DB_PORT", defaults.port),
            ),
            database: lookup_string(&lookup, "MEDIA_DB_NAME", crate::import::MEDIA_DATABASE),
            server_selection_timeout: lookup_duration_millis(
                &lookup,
                "MEDIA_DB_SELECTION_TIMEOUT_MS",
                30_000,
            ),
            log_file: PathBuf::from(lookup_string(&lookup, "MEDIA_IMPORT_LOG_FILE", "db.log")),
            log_level: lookup_parsed(&lookup, "MEDIA_IMPORT_LOG_LEVEL", LevelFilter::Debug),
        }
    }
}

impl Default for ImportConfig {
    fn default() -> Self {
        Self::from_env()
    }
}
