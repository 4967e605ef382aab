//! Error types for the endpoint monitor

use std::fmt;

pub type Result<T> = std::result::Result<T, MonitorError>;

#[derive(Debug)]
pub enum MonitorError {
    /// URL was empty or blank
    InvalidUrl(String),

    /// URL is already monitored
    Duplicate(String),

    /// URL is not monitored
    NotFound(String),

    /// IO operation failed
    Io(std::io::Error),

    /// HTTP client failed
    Http(reqwest::Error),

    /// JSON serialization/deserialization failed
    Json(serde_json::Error),

    /// Configuration error
    Config(String),

    /// Generic error with message
    Other(String),
}

impl MonitorError {
    /// Whether this error is a rejected URL-set mutation, i.e. a user mistake
    /// the presentation layer should show inline.
    pub fn is_user_error(&self) -> bool {
        matches!(
            self,
            MonitorError::InvalidUrl(_) | MonitorError::Duplicate(_) | MonitorError::NotFound(_)
        )
    }
}

impl fmt::Display for MonitorError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MonitorError::InvalidUrl(url) => write!(f, "Invalid URL: {:?}", url),
            MonitorError::Duplicate(url) => write!(f, "{} already exists", url),
            MonitorError::NotFound(url) => write!(f, "{} is not monitored", url),
            MonitorError::Io(err) => write!(f, "IO error: {}", err),
            MonitorError::Http(err) => write!(f, "HTTP error: {}", err),
            MonitorError::Json(err) => write!(f, "JSON error: {}", err),
            MonitorError::Config(msg) => write!(f, "Configuration error: {}", msg),
            MonitorError::Other(msg) => write!(f, "Error: {}", msg),
        }
    }
}

impl std::error::Error for MonitorError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            MonitorError::Io(err) => Some(err),
            MonitorError::Http(err) => Some(err),
            MonitorError::Json(err) => Some(err),
            _ => None,
        }
    }
}

impl From<std::io::Error> for MonitorError {
    fn from(err: std::io::Error) -> Self {
        MonitorError::Io(err)
    }
}

impl From<reqwest::Error> for MonitorError {
    fn from(err: reqwest::Error) -> Self {
        MonitorError::Http(err)
    }
}

impl From<serde_json::Error> for MonitorError {
    fn from(err: serde_json::Error) -> Self {
        MonitorError::Json(err)
    }
}
