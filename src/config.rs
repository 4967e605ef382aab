//! Configuration management for the endpoint monitor

use serde::{Deserialize, Serialize};
use std::env;
use std::path::PathBuf;
use std::time::Duration;

/// URLs monitored when no URL document exists yet
pub const DEFAULT_URLS: [&str; 4] = [
    "https://httpbin.org/status/200",
    "https://httpbin.org/status/404",
    "https://httpbin.org/delay/2",
    "https://jsonplaceholder.typicode.com/posts/1",
];

/// Retained check results per endpoint
pub const DEFAULT_HISTORY_CAP: usize = 100;

pub const MIN_REFRESH_INTERVAL: Duration = Duration::from_secs(5);
pub const MAX_REFRESH_INTERVAL: Duration = Duration::from_secs(300);

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Path of the monitored-URL document
    pub urls_file: PathBuf,

    /// Path of the per-URL history document
    pub history_file: PathBuf,

    /// Timeout for a single probe
    pub http_timeout: Duration,

    /// Maximum check results kept per endpoint
    pub history_cap: usize,

    /// Delay between automatic check cycles
    pub refresh_interval: Duration,

    /// Probes in flight at once during a check cycle
    pub check_concurrency: usize,

    /// Seed URLs used when the URL document is missing or unreadable
    pub default_urls: Vec<String>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            urls_file: PathBuf::from("urls.json"),
            history_file: PathBuf::from("history.json"),
            http_timeout: Duration::from_secs(5),
            history_cap: DEFAULT_HISTORY_CAP,
            refresh_interval: Duration::from_secs(30),
            check_concurrency: 1,
            default_urls: DEFAULT_URLS.iter().map(|s| s.to_string()).collect(),
        }
    }
}

impl Config {
    /// Load configuration from environment variables
    pub fn from_env() -> Self {
        let mut config = Config::default();

        if let Ok(urls_file) = env::var("URLS_FILE") {
            config.urls_file = PathBuf::from(urls_file);
        }

        if let Ok(history_file) = env::var("HISTORY_FILE") {
            config.history_file = PathBuf::from(history_file);
        }

        if let Ok(timeout) = env::var("HTTP_TIMEOUT_SECONDS") {
            if let Ok(seconds) = timeout.parse::<u64>() {
                config.http_timeout = Duration::from_secs(seconds);
            }
        }

        if let Ok(cap) = env::var("HISTORY_CAP") {
            if let Ok(cap) = cap.parse() {
                config.history_cap = cap;
            }
        }

        if let Ok(interval) = env::var("REFRESH_INTERVAL_SECONDS") {
            if let Ok(seconds) = interval.parse::<u64>() {
                config.refresh_interval = Duration::from_secs(seconds);
            }
        }

        if let Ok(concurrency) = env::var("CHECK_CONCURRENCY") {
            if let Ok(concurrency) = concurrency.parse() {
                config.check_concurrency = concurrency;
            }
        }

        if let Ok(urls) = env::var("DEFAULT_URLS") {
            config.default_urls = parse_url_list(&urls);
        }

        config
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<(), String> {
        if self.urls_file.as_os_str().is_empty() {
            return Err("urls_file cannot be empty".to_string());
        }

        if self.history_file.as_os_str().is_empty() {
            return Err("history_file cannot be empty".to_string());
        }

        if self.urls_file == self.history_file {
            return Err("urls_file and history_file must differ".to_string());
        }

        if self.http_timeout.is_zero() {
            return Err("http_timeout must be greater than 0".to_string());
        }

        if self.history_cap == 0 {
            return Err("history_cap must be greater than 0".to_string());
        }

        if self.check_concurrency == 0 {
            return Err("check_concurrency must be greater than 0".to_string());
        }

        if self.refresh_interval < MIN_REFRESH_INTERVAL || self.refresh_interval > MAX_REFRESH_INTERVAL {
            return Err(format!(
                "refresh_interval must be between {} and {} seconds",
                MIN_REFRESH_INTERVAL.as_secs(),
                MAX_REFRESH_INTERVAL.as_secs()
            ));
        }

        Ok(())
    }
}

/// Split a comma-separated URL list, dropping blanks and repeats
fn parse_url_list(raw: &str) -> Vec<String> {
    let mut urls: Vec<String> = Vec::new();
    for url in raw.split(',').map(str::trim).filter(|s| !s.is_empty()) {
        if !urls.iter().any(|u| u == url) {
            urls.push(url.to_string());
        }
    }
    urls
}
