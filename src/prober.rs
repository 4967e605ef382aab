//! HTTP probing of monitored endpoints

use crate::errors::{MonitorError, Result};
use crate::health::CheckResult;
use async_trait::async_trait;
use reqwest::Client;
use std::time::{Duration, Instant};
use tokio::time::timeout;
use tracing::{debug, warn};

/// Something that can check one endpoint.
///
/// Implementations never fail: every failure mode is folded into a DOWN
/// [`CheckResult`].
#[async_trait]
pub trait Prober: Send + Sync {
    async fn check(&self, url: &str) -> CheckResult;
}

/// Probes endpoints with a single GET and a fixed timeout
#[derive(Debug, Clone)]
pub struct HttpProber {
    client: Client,
    timeout: Duration,
}

impl HttpProber {
    pub fn new(http_timeout: Duration) -> Result<Self> {
        let client = Client::builder()
            .timeout(http_timeout)
            .user_agent(format!("endpoint_monitor/{}", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(MonitorError::Http)?;

        Ok(Self {
            client,
            timeout: http_timeout,
        })
    }

    pub fn timeout(&self) -> Duration {
        self.timeout
    }
}

#[async_trait]
impl Prober for HttpProber {
    async fn check(&self, url: &str) -> CheckResult {
        let start_time = Instant::now();

        let outcome = timeout(self.timeout, self.client.get(url).send()).await;
        let elapsed = start_time.elapsed();

        let result = match outcome {
            Ok(Ok(response)) => {
                CheckResult::from_response(url, response.status().as_u16(), elapsed_ms(elapsed))
            }
            Ok(Err(e)) => CheckResult::unreachable(url, describe_error(&e)),
            Err(_) => CheckResult::unreachable(url, "Timeout"),
        };

        if result.is_up() {
            debug!("{} is UP ({:?} in {:?})", url, result.status_code, elapsed);
        } else {
            warn!(
                "{} is DOWN: {}",
                url,
                result.error.as_deref().unwrap_or("unknown error")
            );
        }

        result
    }
}

/// Elapsed wall time in milliseconds, rounded to two decimals
fn elapsed_ms(elapsed: Duration) -> f64 {
    (elapsed.as_secs_f64() * 1000.0 * 100.0).round() / 100.0
}

fn describe_error(err: &reqwest::Error) -> String {
    if err.is_timeout() {
        "Timeout".to_string()
    } else if err.is_connect() {
        format!("Connection error: {}", err)
    } else if err.is_builder() {
        format!("Invalid request: {}", err)
    } else if err.is_request() || err.is_redirect() || err.is_body() {
        format!("Request failed: {}", err)
    } else {
        format!("Unexpected error: {}", err)
    }
}
