//! Bounded per-endpoint check history

use crate::health::{CheckResult, EndpointState, HealthStatus};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, VecDeque};
use tracing::debug;

/// Per-endpoint logs keyed by URL
pub type History = BTreeMap<String, HistoryLog>;

/// Chronological check results for one endpoint, oldest first.
#[derive(Clone, Debug, Default, Serialize, Deserialize, PartialEq)]
#[serde(transparent)]
pub struct HistoryLog {
    entries: VecDeque<CheckResult>,
}

impl HistoryLog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Wrap already-ordered entries, oldest first
    pub fn from_entries(entries: Vec<CheckResult>) -> Self {
        Self { entries: entries.into() }
    }

    /// Append a result, evicting the oldest entries beyond `cap`
    pub fn push(&mut self, result: CheckResult, cap: usize) {
        self.entries.push_back(result);
        self.truncate_to(cap);
    }

    /// Drop the oldest entries until at most `cap` remain
    pub fn truncate_to(&mut self, cap: usize) {
        let excess = self.entries.len().saturating_sub(cap);
        if excess > 0 {
            self.entries.drain(..excess);
            debug!("Evicted {} history entries over cap {}", excess, cap);
        }
    }

    pub fn latest(&self) -> Option<&CheckResult> {
        self.entries.back()
    }

    pub fn state(&self) -> EndpointState {
        EndpointState::from(self.latest())
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &CheckResult> {
        self.entries.iter()
    }

    pub fn to_vec(&self) -> Vec<CheckResult> {
        self.entries.iter().cloned().collect()
    }

    /// Percentage of retained checks that were UP
    pub fn uptime_percentage(&self) -> Option<f64> {
        if self.entries.is_empty() {
            return None;
        }

        let up = self.entries.iter().filter(|r| r.status == HealthStatus::Up).count();
        Some((up as f64 / self.entries.len() as f64) * 100.0)
    }
}
