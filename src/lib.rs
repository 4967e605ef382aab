//! Endpoint Health Monitor Library
//!
//! Probes a set of HTTP endpoints, classifies each as UP or DOWN, keeps a
//! bounded per-endpoint history on disk and exposes aggregate health for a
//! dashboard or CLI to render.

pub mod config;
pub mod errors;
pub mod health;
pub mod history;
pub mod monitor;
pub mod prober;
pub mod refresh;
pub mod store;

pub use config::Config;
pub use errors::{MonitorError, Result};
pub use health::{CheckResult, EndpointState, EndpointStatus, HealthStatus, MetricsSnapshot};
pub use monitor::{HealthMonitor, scheme_warning};
pub use prober::{HttpProber, Prober};
pub use store::JsonStore;
