//! Monitored URL set and per-endpoint history
//!
//! [`HealthMonitor`] owns both the URL set and the history logs. Every
//! mutation takes the state lock, changes memory and rewrites the affected
//! documents before the lock is released, so overlapping callers never
//! interleave whole-file writes.

use crate::config::Config;
use crate::errors::{MonitorError, Result};
use crate::health::{CheckResult, EndpointState, EndpointStatus, MetricsSnapshot};
use crate::history::{History, HistoryLog};
use crate::prober::Prober;
use crate::store::JsonStore;
use chrono::{DateTime, Utc};
use futures::stream::{self, StreamExt};
use tokio::sync::Mutex;
use tracing::{debug, info, instrument, warn};

/// Advisory check for an http/https scheme. Returns the warning to show,
/// never blocks an add.
pub fn scheme_warning(url: &str) -> Option<String> {
    let url = url.trim();
    if url.starts_with("http://") || url.starts_with("https://") {
        None
    } else {
        Some(format!("{} should start with http:// or https://", url))
    }
}

/// Callers may pass URLs with surrounding whitespace; every operation keys on
/// the trimmed form
fn normalize(url: &str) -> &str {
    url.trim()
}

#[derive(Debug, Default)]
struct MonitorState {
    /// Monitored URLs in insertion order
    urls: Vec<String>,
    /// One log per monitored URL, empty until first checked
    history: History,
}

impl MonitorState {
    /// Pair loaded URLs with their loaded logs, dropping logs of URLs no
    /// longer monitored
    fn reconcile(urls: Vec<String>, mut loaded: History, cap: usize) -> Self {
        let mut history = History::new();
        for url in &urls {
            let mut log = loaded.remove(url).unwrap_or_default();
            log.truncate_to(cap);
            history.insert(url.clone(), log);
        }

        if !loaded.is_empty() {
            debug!("Dropped history for {} unmonitored URLs", loaded.len());
        }

        Self { urls, history }
    }

    fn contains(&self, url: &str) -> bool {
        self.urls.iter().any(|u| u == url)
    }

    fn latest(&self, url: &str) -> Option<&CheckResult> {
        self.history.get(url).and_then(HistoryLog::latest)
    }
}

/// Health-check-and-history engine shared by every front end
#[derive(Debug)]
pub struct HealthMonitor {
    state: Mutex<MonitorState>,
    run_guard: Mutex<()>,
    store: JsonStore,
    history_cap: usize,
    check_concurrency: usize,
}

impl HealthMonitor {
    /// Open the monitor, loading persisted state from `store`.
    ///
    /// A history cap of zero is raised to one so the latest result is always
    /// retained.
    pub async fn open(store: JsonStore, history_cap: usize, check_concurrency: usize) -> Self {
        if history_cap == 0 {
            warn!("History cap of 0 would discard every result, using 1");
        }
        let history_cap = history_cap.max(1);
        let check_concurrency = check_concurrency.max(1);

        let urls = store.load_urls().await;
        let history = store.load_history().await;
        let state = MonitorState::reconcile(urls, history, history_cap);

        info!(
            "Monitoring {} URLs (history cap {}, concurrency {})",
            state.urls.len(),
            history_cap,
            check_concurrency
        );

        Self {
            state: Mutex::new(state),
            run_guard: Mutex::new(()),
            store,
            history_cap,
            check_concurrency,
        }
    }

    pub async fn from_config(config: &Config) -> Result<Self> {
        config.validate().map_err(MonitorError::Config)?;

        let store = JsonStore::new(
            config.urls_file.clone(),
            config.history_file.clone(),
            config.default_urls.clone(),
        );

        Ok(Self::open(store, config.history_cap, config.check_concurrency).await)
    }

    pub fn history_cap(&self) -> usize {
        self.history_cap
    }

    pub async fn list_urls(&self) -> Vec<String> {
        self.state.lock().await.urls.clone()
    }

    /// Start monitoring `url` with an empty history
    pub async fn add_url(&self, url: &str) -> Result<()> {
        let url = normalize(url);
        if url.is_empty() {
            return Err(MonitorError::InvalidUrl(url.to_string()));
        }

        let mut state = self.state.lock().await;
        if state.contains(url) {
            return Err(MonitorError::Duplicate(url.to_string()));
        }

        if let Some(warning) = scheme_warning(url) {
            warn!("{}", warning);
        }

        state.urls.push(url.to_string());
        state.history.insert(url.to_string(), HistoryLog::new());
        self.persist_all(&state).await;

        info!("Added {} ({} URLs monitored)", url, state.urls.len());
        Ok(())
    }

    /// Stop monitoring `url` and discard its history
    pub async fn remove_url(&self, url: &str) -> Result<()> {
        let url = normalize(url);
        let mut state = self.state.lock().await;
        let Some(index) = state.urls.iter().position(|u| u == url) else {
            return Err(MonitorError::NotFound(url.to_string()));
        };

        state.urls.remove(index);
        state.history.remove(url);
        self.persist_all(&state).await;

        info!("Removed {} ({} URLs monitored)", url, state.urls.len());
        Ok(())
    }

    /// Append one result to a monitored URL's log
    pub async fn record(&self, url: &str, result: CheckResult) -> Result<()> {
        let url = normalize(url);
        let mut state = self.state.lock().await;
        let log = state
            .history
            .get_mut(url)
            .ok_or_else(|| MonitorError::NotFound(url.to_string()))?;

        log.push(result, self.history_cap);
        self.store.save_history(&state.history).await;
        Ok(())
    }

    /// Probe `urls` (or every monitored URL) and record the outcomes.
    ///
    /// Manual and timed refreshes both go through here. The history document
    /// is written once, after the whole batch. URLs that are not monitored are
    /// skipped, and a URL removed while its probe was in flight has its result
    /// returned but not recorded.
    #[instrument(skip(self, prober, urls))]
    pub async fn run_checks<P>(&self, prober: &P, urls: Option<&[String]>) -> Vec<CheckResult>
    where
        P: Prober + ?Sized,
    {
        let _running = self.run_guard.lock().await;

        let targets = {
            let state = self.state.lock().await;
            match urls {
                None => state.urls.clone(),
                Some(requested) => {
                    let mut targets: Vec<String> = Vec::new();
                    for url in requested.iter().map(|u| normalize(u)) {
                        if !state.contains(url) {
                            warn!("Skipping check of unmonitored URL {}", url);
                        } else if !targets.iter().any(|t| t == url) {
                            targets.push(url.to_string());
                        }
                    }
                    targets
                }
            }
        };

        if targets.is_empty() {
            debug!("No URLs to check");
            return Vec::new();
        }

        info!("Checking {} URLs", targets.len());

        let results: Vec<CheckResult> = stream::iter(targets.iter())
            .map(|url| prober.check(url))
            .buffered(self.check_concurrency)
            .collect()
            .await;

        let mut state = self.state.lock().await;
        let cap = self.history_cap;
        for (url, result) in targets.iter().zip(&results) {
            match state.history.get_mut(url) {
                Some(log) => log.push(result.clone(), cap),
                None => warn!("{} was removed during the check, discarding result", url),
            }
        }
        self.store.save_history(&state.history).await;

        let up = results.iter().filter(|r| r.is_up()).count();
        info!("Check complete: {} UP, {} DOWN", up, results.len() - up);

        results
    }

    /// Counts by the latest result of each monitored URL
    pub async fn snapshot(&self) -> MetricsSnapshot {
        let state = self.state.lock().await;
        let mut snapshot = MetricsSnapshot::default();
        for url in &state.urls {
            snapshot.count(EndpointState::from(state.latest(url)));
        }
        snapshot
    }

    /// Retained results for `url`, oldest first
    pub async fn history_for(&self, url: &str) -> Result<Vec<CheckResult>> {
        let url = normalize(url);
        let state = self.state.lock().await;
        state
            .history
            .get(url)
            .map(HistoryLog::to_vec)
            .ok_or_else(|| MonitorError::NotFound(url.to_string()))
    }

    /// Current status row for every monitored URL, in list order
    pub async fn status_table(&self) -> Vec<EndpointStatus> {
        let state = self.state.lock().await;
        state
            .urls
            .iter()
            .map(|url| {
                let log = state.history.get(url);
                let latest = log.and_then(HistoryLog::latest);
                EndpointStatus {
                    url: url.clone(),
                    state: EndpointState::from(latest),
                    status_code: latest.and_then(|r| r.status_code),
                    response_time_ms: latest.and_then(|r| r.response_time_ms),
                    last_checked: latest.map(|r| r.timestamp),
                    error: latest.and_then(|r| r.error.clone()),
                    uptime_percentage: log.and_then(HistoryLog::uptime_percentage),
                }
            })
            .collect()
    }

    /// Latest response time of every endpoint that is currently UP
    pub async fn response_times(&self) -> Vec<(String, f64)> {
        let state = self.state.lock().await;
        state
            .urls
            .iter()
            .filter_map(|url| {
                let latest = state.latest(url).filter(|r| r.is_up())?;
                Some((url.clone(), latest.response_time_ms?))
            })
            .collect()
    }

    /// Time of the newest recorded check across all endpoints
    pub async fn last_check_time(&self) -> Option<DateTime<Utc>> {
        let state = self.state.lock().await;
        state.urls.iter().filter_map(|url| state.latest(url)).map(|r| r.timestamp).max()
    }

    async fn persist_all(&self, state: &MonitorState) {
        self.store.save_urls(&state.urls).await;
        self.store.save_history(&state.history).await;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::health::HealthStatus;
    use async_trait::async_trait;
    use std::collections::HashMap;
    use std::sync::Mutex as StdMutex;
    use tempfile::TempDir;
    use tokio_test::{assert_err, assert_ok};

    const API: &str = "https://api.example.com/health";

    /// Answers every URL with a configured status code, or "Timeout"
    #[derive(Default)]
    struct StubProber {
        codes: HashMap<String, u16>,
        calls: StdMutex<Vec<String>>,
    }

    impl StubProber {
        fn with(codes: &[(&str, u16)]) -> Self {
            Self {
                codes: codes.iter().map(|(u, c)| (u.to_string(), *c)).collect(),
                calls: StdMutex::new(Vec::new()),
            }
        }

        fn calls(&self) -> Vec<String> {
            self.calls.lock().unwrap().clone()
        }
    }

    #[async_trait]
    impl Prober for StubProber {
        async fn check(&self, url: &str) -> CheckResult {
            self.calls.lock().unwrap().push(url.to_string());
            match self.codes.get(url) {
                Some(code) => CheckResult::from_response(url, *code, 42.0),
                None => CheckResult::unreachable(url, "Timeout"),
            }
        }
    }

    async fn empty_store(dir: &TempDir) -> JsonStore {
        let store = empty_store_handle(dir);
        store.save_urls(&[]).await;
        store
    }

    /// Store over the same files without rewriting them
    fn empty_store_handle(dir: &TempDir) -> JsonStore {
        JsonStore::new(
            dir.path().join("urls.json"),
            dir.path().join("history.json"),
            Vec::new(),
        )
    }

    async fn empty_monitor(dir: &TempDir) -> HealthMonitor {
        HealthMonitor::open(empty_store(dir).await, 100, 1).await
    }

    #[tokio::test]
    async fn test_seeded_from_defaults() {
        let dir = TempDir::new().unwrap();
        let store = JsonStore::new(
            dir.path().join("urls.json"),
            dir.path().join("history.json"),
            vec!["https://seed.example".to_string()],
        );
        let monitor = HealthMonitor::open(store, 100, 1).await;

        assert_eq!(monitor.list_urls().await, vec!["https://seed.example"]);
        let snapshot = monitor.snapshot().await;
        assert_eq!(snapshot.total, 1);
        assert_eq!(snapshot.unchecked, 1);
    }

    #[tokio::test]
    async fn test_add_and_remove_urls() {
        let dir = TempDir::new().unwrap();
        let monitor = empty_monitor(&dir).await;

        assert_ok!(monitor.add_url("https://a.example").await);
        assert_ok!(monitor.add_url("https://b.example").await);
        assert_ok!(monitor.add_url("https://c.example").await);
        assert_ok!(monitor.remove_url("https://b.example").await);

        assert_eq!(monitor.list_urls().await, vec!["https://a.example", "https://c.example"]);
        assert_err!(monitor.history_for("https://b.example").await);
    }

    #[tokio::test]
    async fn test_add_rejects_blank_and_duplicate() {
        let dir = TempDir::new().unwrap();
        let monitor = empty_monitor(&dir).await;
        monitor.add_url(API).await.unwrap();
        monitor.record(API, CheckResult::from_response(API, 200, 10.0)).await.unwrap();

        let err = monitor.add_url(API).await.unwrap_err();
        assert!(matches!(err, MonitorError::Duplicate(_)));

        let err = monitor.add_url("   ").await.unwrap_err();
        assert!(matches!(err, MonitorError::InvalidUrl(_)));

        assert_eq!(monitor.list_urls().await, vec![API]);
        assert_eq!(monitor.history_for(API).await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_add_accepts_url_without_scheme() {
        let dir = TempDir::new().unwrap();
        let monitor = empty_monitor(&dir).await;

        assert!(scheme_warning("example.com").is_some());
        assert!(scheme_warning("https://example.com").is_none());
        assert_ok!(monitor.add_url("example.com").await);
        assert_eq!(monitor.list_urls().await, vec!["example.com"]);
    }

    #[tokio::test]
    async fn test_remove_unknown_url() {
        let dir = TempDir::new().unwrap();
        let monitor = empty_monitor(&dir).await;
        monitor.add_url(API).await.unwrap();

        let err = monitor.remove_url("https://missing.example").await.unwrap_err();
        assert!(matches!(err, MonitorError::NotFound(_)));
        assert_eq!(monitor.list_urls().await, vec![API]);
    }

    #[tokio::test]
    async fn test_record_unknown_url_does_not_create_entry() {
        let dir = TempDir::new().unwrap();
        let monitor = empty_monitor(&dir).await;
        let url = "https://ghost.example";

        let err = monitor.record(url, CheckResult::unreachable(url, "Timeout")).await.unwrap_err();
        assert!(matches!(err, MonitorError::NotFound(_)));
        assert!(monitor.list_urls().await.is_empty());
        assert_err!(monitor.history_for(url).await);
    }

    #[tokio::test]
    async fn test_history_cap_evicts_oldest() {
        let dir = TempDir::new().unwrap();
        let monitor = empty_monitor(&dir).await;
        monitor.add_url(API).await.unwrap();

        for n in 1..=101u16 {
            let result = if n % 2 == 1 {
                CheckResult::from_response(API, 200, n as f64)
            } else {
                CheckResult::from_response(API, 503, n as f64)
            };
            monitor.record(API, result).await.unwrap();
        }

        let history = monitor.history_for(API).await.unwrap();
        assert_eq!(history.len(), 100);
        assert_eq!(history.first().unwrap().response_time_ms, Some(2.0));
        assert_eq!(history.last().unwrap().response_time_ms, Some(101.0));
    }

    #[tokio::test]
    async fn test_run_checks_example() {
        let dir = TempDir::new().unwrap();
        let monitor = empty_monitor(&dir).await;
        monitor.add_url(API).await.unwrap();
        let prober = StubProber::with(&[(API, 200)]);

        let results = monitor.run_checks(&prober, None).await;

        assert_eq!(results.len(), 1);
        assert_eq!(results[0].response_time_ms, Some(42.0));
        assert_eq!(
            monitor.snapshot().await,
            MetricsSnapshot { total: 1, up: 1, down: 0, unchecked: 0 }
        );
        let history = monitor.history_for(API).await.unwrap();
        assert_eq!(history.len(), 1);
        assert_eq!(history[0].status, HealthStatus::Up);
    }

    #[tokio::test]
    async fn test_timeout_counts_as_down() {
        let dir = TempDir::new().unwrap();
        let monitor = empty_monitor(&dir).await;
        monitor.add_url(API).await.unwrap();

        let results = monitor.run_checks(&StubProber::default(), None).await;

        assert_eq!(results[0].status, HealthStatus::Down);
        assert!(results[0].status_code.is_none());
        assert_eq!(results[0].error.as_deref(), Some("Timeout"));
        assert_eq!(monitor.snapshot().await.down, 1);
    }

    #[tokio::test]
    async fn test_new_url_counts_as_unchecked() {
        let dir = TempDir::new().unwrap();
        let monitor = empty_monitor(&dir).await;
        monitor.add_url("https://a.example").await.unwrap();
        monitor.run_checks(&StubProber::with(&[("https://a.example", 500)]), None).await;

        monitor.add_url("https://b.example").await.unwrap();

        let snapshot = monitor.snapshot().await;
        assert_eq!(snapshot, MetricsSnapshot { total: 2, up: 0, down: 1, unchecked: 1 });
        assert_eq!(snapshot.total, snapshot.up + snapshot.down + snapshot.unchecked);
    }

    #[tokio::test]
    async fn test_state_follows_latest_result() {
        let dir = TempDir::new().unwrap();
        let monitor = empty_monitor(&dir).await;
        monitor.add_url(API).await.unwrap();

        monitor.record(API, CheckResult::from_response(API, 200, 5.0)).await.unwrap();
        assert_eq!(monitor.snapshot().await.up, 1);

        monitor.record(API, CheckResult::unreachable(API, "Connection error")).await.unwrap();
        let snapshot = monitor.snapshot().await;
        assert_eq!((snapshot.up, snapshot.down), (0, 1));

        monitor.record(API, CheckResult::from_response(API, 204, 5.0)).await.unwrap();
        assert_eq!(monitor.snapshot().await.up, 1);
    }

    #[tokio::test]
    async fn test_run_checks_subset_and_order() {
        let dir = TempDir::new().unwrap();
        let monitor = empty_monitor(&dir).await;
        for url in ["https://c.example", "https://a.example", "https://b.example"] {
            monitor.add_url(url).await.unwrap();
        }
        let prober = StubProber::with(&[("https://a.example", 200), ("https://b.example", 200)]);

        monitor.run_checks(&prober, None).await;
        assert_eq!(
            prober.calls(),
            vec!["https://c.example", "https://a.example", "https://b.example"]
        );

        let subset = vec![
            "https://b.example".to_string(),
            "https://unknown.example".to_string(),
            "https://b.example".to_string(),
        ];
        let results = monitor.run_checks(&prober, Some(&subset)).await;
        assert_eq!(results.len(), 1);
        assert_eq!(monitor.history_for("https://b.example").await.unwrap().len(), 2);
        assert_eq!(monitor.history_for("https://a.example").await.unwrap().len(), 1);
        assert_err!(monitor.history_for("https://unknown.example").await);
    }

    #[tokio::test]
    async fn test_concurrent_checks_append_once_per_url() {
        let dir = TempDir::new().unwrap();
        let monitor = HealthMonitor::open(empty_store(&dir).await, 100, 4).await;
        let urls: Vec<String> = (0..10).map(|n| format!("https://svc{}.example", n)).collect();
        for url in &urls {
            monitor.add_url(url).await.unwrap();
        }
        let codes: Vec<(&str, u16)> = urls.iter().map(|u| (u.as_str(), 200)).collect();
        let prober = StubProber::with(&codes);

        let results = monitor.run_checks(&prober, None).await;

        let checked: Vec<&str> = results.iter().map(|r| r.url.as_str()).collect();
        let expected: Vec<&str> = urls.iter().map(String::as_str).collect();
        assert_eq!(checked, expected);
        for url in &urls {
            assert_eq!(monitor.history_for(url).await.unwrap().len(), 1);
        }
    }

    #[tokio::test]
    async fn test_state_survives_reopen() {
        let dir = TempDir::new().unwrap();
        {
            let monitor = empty_monitor(&dir).await;
            monitor.add_url("https://a.example").await.unwrap();
            monitor.add_url("https://b.example").await.unwrap();
            monitor.run_checks(&StubProber::with(&[("https://a.example", 200)]), None).await;
            monitor.remove_url("https://b.example").await.unwrap();
        }

        let store = JsonStore::new(
            dir.path().join("urls.json"),
            dir.path().join("history.json"),
            vec!["https://seed.example".to_string()],
        );
        let reopened = HealthMonitor::open(store, 100, 1).await;

        assert_eq!(reopened.list_urls().await, vec!["https://a.example"]);
        let history = reopened.history_for("https://a.example").await.unwrap();
        assert_eq!(history.len(), 1);
        assert_eq!(history[0].status, HealthStatus::Up);
        assert_eq!(reopened.snapshot().await.up, 1);
    }

    #[tokio::test]
    async fn test_reopen_drops_orphans_and_applies_cap() {
        let dir = TempDir::new().unwrap();
        let store = empty_store(&dir).await;
        store.save_urls(&["https://a.example".to_string()]).await;

        let mut log = HistoryLog::new();
        for n in 0..10 {
            log.push(CheckResult::from_response("https://a.example", 200, n as f64), 100);
        }
        let mut history = History::new();
        history.insert("https://a.example".to_string(), log.clone());
        history.insert("https://gone.example".to_string(), log);
        store.save_history(&history).await;

        let monitor = HealthMonitor::open(store, 5, 1).await;

        let kept = monitor.history_for("https://a.example").await.unwrap();
        assert_eq!(kept.len(), 5);
        assert_eq!(kept[0].response_time_ms, Some(5.0));
        assert_err!(monitor.history_for("https://gone.example").await);
    }

    #[tokio::test]
    async fn test_status_views() {
        let dir = TempDir::new().unwrap();
        let monitor = empty_monitor(&dir).await;
        for url in ["https://up.example", "https://down.example", "https://new.example"] {
            monitor.add_url(url).await.unwrap();
        }
        assert!(monitor.last_check_time().await.is_none());

        let checked = vec!["https://up.example".to_string(), "https://down.example".to_string()];
        let prober = StubProber::with(&[("https://up.example", 200), ("https://down.example", 404)]);
        monitor.run_checks(&prober, Some(&checked)).await;

        let table = monitor.status_table().await;
        assert_eq!(table.len(), 3);
        assert_eq!(table[0].state, EndpointState::Up);
        assert_eq!(table[0].uptime_percentage, Some(100.0));
        assert_eq!(table[1].state, EndpointState::Down);
        assert_eq!(table[1].status_code, Some(404));
        assert_eq!(table[1].error.as_deref(), Some("HTTP 404"));
        assert_eq!(table[2].state, EndpointState::Unchecked);
        assert!(table[2].uptime_percentage.is_none());

        assert_eq!(
            monitor.response_times().await,
            vec![("https://up.example".to_string(), 42.0)]
        );
        assert!(monitor.last_check_time().await.is_some());
    }

    #[tokio::test]
    async fn test_from_config_rejects_invalid() {
        let mut config = Config::default();
        config.history_cap = 0;
        assert!(matches!(
            HealthMonitor::from_config(&config).await,
            Err(MonitorError::Config(_))
        ));
    }

    #[tokio::test]
    async fn test_single_record_survives_reopen() {
        let dir = TempDir::new().unwrap();
        {
            let monitor = empty_monitor(&dir).await;
            monitor.add_url(API).await.unwrap();
            monitor.record(API, CheckResult::from_response(API, 503, 17.0)).await.unwrap();
        }

        let reopened = HealthMonitor::open(empty_store_handle(&dir), 100, 1).await;

        let history = reopened.history_for(API).await.unwrap();
        assert_eq!(history.len(), 1);
        assert_eq!(history[0].status_code, Some(503));
        assert_eq!(history[0].error.as_deref(), Some("HTTP 503"));
        assert_eq!(reopened.snapshot().await.down, 1);
    }

    #[tokio::test]
    async fn test_padded_input_matches_trimmed_url() {
        let dir = TempDir::new().unwrap();
        let monitor = empty_monitor(&dir).await;
        let padded = " https://a.example ";

        assert_ok!(monitor.add_url(padded).await);
        assert!(matches!(monitor.add_url("https://a.example").await, Err(MonitorError::Duplicate(_))));
        assert_ok!(
            monitor
                .record(padded, CheckResult::from_response("https://a.example", 200, 3.0))
                .await
        );
        assert_eq!(monitor.history_for(padded).await.unwrap().len(), 1);

        let subset = vec![padded.to_string(), "https://a.example\t".to_string()];
        let prober = StubProber::with(&[("https://a.example", 200)]);
        let results = monitor.run_checks(&prober, Some(&subset)).await;
        assert_eq!(results.len(), 1);
        assert_eq!(prober.calls(), vec!["https://a.example"]);

        assert_ok!(monitor.remove_url(padded).await);
        assert!(monitor.list_urls().await.is_empty());
    }

    #[tokio::test]
    async fn test_zero_history_cap_keeps_latest() {
        let dir = TempDir::new().unwrap();
        let monitor = HealthMonitor::open(empty_store(&dir).await, 0, 1).await;
        assert_eq!(monitor.history_cap(), 1);
        monitor.add_url(API).await.unwrap();

        monitor.record(API, CheckResult::unreachable(API, "Timeout")).await.unwrap();
        monitor.record(API, CheckResult::from_response(API, 200, 9.0)).await.unwrap();

        assert_eq!(monitor.snapshot().await, MetricsSnapshot { total: 1, up: 1, down: 0, unchecked: 0 });
        let history = monitor.history_for(API).await.unwrap();
        assert_eq!(history.len(), 1);
        assert_eq!(history[0].status, HealthStatus::Up);
    }

    #[tokio::test]
    async fn test_history_without_url_field_is_keyed() {
        let dir = TempDir::new().unwrap();
        let store = empty_store_handle(&dir);
        std::fs::write(store.urls_path(), format!(r#"["{}"]"#, API)).unwrap();
        std::fs::write(
            store.history_path(),
            format!(
                r#"{{"{}": [{{"status": "UP", "status_code": 200, "response_time_ms": 42.0,
                    "timestamp": "2025-01-01T10:30:00", "error": null}}]}}"#,
                API
            ),
        )
        .unwrap();

        let monitor = HealthMonitor::open(store, 100, 1).await;
        assert_eq!(monitor.history_for(API).await.unwrap()[0].url, API);

        monitor.add_url("https://other.example").await.unwrap();
        let raw: serde_json::Value =
            serde_json::from_str(&std::fs::read_to_string(dir.path().join("history.json")).unwrap())
                .unwrap();
        assert_eq!(raw[API][0]["url"], API);
    }

    #[tokio::test]
    async fn test_bad_history_entry_survives_mutation() {
        let dir = TempDir::new().unwrap();
        let store = empty_store_handle(&dir);
        std::fs::write(store.urls_path(), r#"["https://a.example", "https://b.example"]"#).unwrap();
        std::fs::write(
            store.history_path(),
            r#"{
                "https://a.example": [{"url": "https://a.example", "status": "UP", "status_code": 200,
                    "response_time_ms": 5.0, "timestamp": "2025-01-01T10:30:00Z", "error": null}],
                "https://b.example": [{"url": "https://b.example", "status": "DOWN", "status_code": null,
                    "response_time_ms": null, "timestamp": "not-a-time", "error": "Timeout"}]
            }"#,
        )
        .unwrap();

        let monitor = HealthMonitor::open(store, 100, 1).await;
        assert_eq!(monitor.history_for("https://a.example").await.unwrap().len(), 1);
        assert!(monitor.history_for("https://b.example").await.unwrap().is_empty());

        monitor.add_url("https://c.example").await.unwrap();
        let raw: serde_json::Value =
            serde_json::from_str(&std::fs::read_to_string(dir.path().join("history.json")).unwrap())
                .unwrap();
        assert_eq!(raw["https://a.example"].as_array().unwrap().len(), 1);
    }
}
