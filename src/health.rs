//! Health check data structures

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "UPPERCASE")]
pub enum HealthStatus {
    Up,
    Down,
}

impl std::fmt::Display for HealthStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            HealthStatus::Up => f.pad("UP"),
            HealthStatus::Down => f.pad("DOWN"),
        }
    }
}

/// Outcome of probing one endpoint once.
///
/// An `Up` result always carries a status code and a response time. A `Down`
/// result carries both (non-2xx response) or neither (no response at all).
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct CheckResult {
    #[serde(default)]
    pub url: String,
    pub status: HealthStatus,
    #[serde(default)]
    pub status_code: Option<u16>,
    #[serde(default, alias = "response_time")]
    pub response_time_ms: Option<f64>,
    #[serde(with = "timestamp")]
    pub timestamp: DateTime<Utc>,
    #[serde(default)]
    pub error: Option<String>,
}

impl CheckResult {
    /// Classify a received HTTP response
    pub fn from_response(url: &str, status_code: u16, response_time_ms: f64) -> Self {
        let is_up = (200..300).contains(&status_code);
        Self {
            url: url.to_string(),
            status: if is_up { HealthStatus::Up } else { HealthStatus::Down },
            status_code: Some(status_code),
            response_time_ms: Some(response_time_ms),
            timestamp: Utc::now(),
            error: if is_up { None } else { Some(format!("HTTP {}", status_code)) },
        }
    }

    /// Build a result for a probe that never received a response
    pub fn unreachable(url: &str, error: impl Into<String>) -> Self {
        Self {
            url: url.to_string(),
            status: HealthStatus::Down,
            status_code: None,
            response_time_ms: None,
            timestamp: Utc::now(),
            error: Some(error.into()),
        }
    }

    pub fn is_up(&self) -> bool {
        self.status == HealthStatus::Up
    }
}

/// Classification of an endpoint by its most recent check
#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "UPPERCASE")]
pub enum EndpointState {
    Unchecked,
    Up,
    Down,
}

impl From<Option<&CheckResult>> for EndpointState {
    fn from(latest: Option<&CheckResult>) -> Self {
        match latest.map(|r| r.status) {
            None => EndpointState::Unchecked,
            Some(HealthStatus::Up) => EndpointState::Up,
            Some(HealthStatus::Down) => EndpointState::Down,
        }
    }
}

impl std::fmt::Display for EndpointState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            EndpointState::Unchecked => f.pad("UNCHECKED"),
            EndpointState::Up => f.pad("UP"),
            EndpointState::Down => f.pad("DOWN"),
        }
    }
}

/// Aggregate counts over the monitored set.
///
/// `total == up + down + unchecked` holds for every snapshot.
#[derive(Clone, Copy, Debug, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct MetricsSnapshot {
    pub total: usize,
    pub up: usize,
    pub down: usize,
    pub unchecked: usize,
}

impl MetricsSnapshot {
    pub fn count(&mut self, state: EndpointState) {
        self.total += 1;
        match state {
            EndpointState::Unchecked => self.unchecked += 1,
            EndpointState::Up => self.up += 1,
            EndpointState::Down => self.down += 1,
        }
    }
}

/// One row of the current status table
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct EndpointStatus {
    pub url: String,
    pub state: EndpointState,
    pub status_code: Option<u16>,
    pub response_time_ms: Option<f64>,
    pub last_checked: Option<DateTime<Utc>>,
    pub error: Option<String>,
    /// Share of retained checks that were UP, absent while unchecked
    pub uptime_percentage: Option<f64>,
}

/// Timestamps are written as RFC 3339. Older history files hold naive
/// ISO-8601 values without an offset; those are read as UTC.
pub(crate) mod timestamp {
    use chrono::{DateTime, NaiveDateTime, Utc};
    use serde::{Deserialize, Deserializer, Serializer};

    const NAIVE_FORMATS: [&str; 3] = [
        "%Y-%m-%dT%H:%M:%S%.f",
        "%Y-%m-%dT%H:%M:%S",
        "%Y-%m-%d %H:%M:%S%.f",
    ];

    pub fn serialize<S: Serializer>(ts: &DateTime<Utc>, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&ts.to_rfc3339())
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<DateTime<Utc>, D::Error> {
        let raw = String::deserialize(deserializer)?;
        parse(&raw).ok_or_else(|| serde::de::Error::custom(format!("invalid timestamp: {}", raw)))
    }

    pub fn parse(raw: &str) -> Option<DateTime<Utc>> {
        if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
            return Some(dt.with_timezone(&Utc));
        }

        NAIVE_FORMATS
            .iter()
            .find_map(|format| NaiveDateTime::parse_from_str(raw, format).ok())
            .map(|naive| naive.and_utc())
    }
}
