//! Endpoint Health Monitor Binary

use clap::{Parser, Subcommand};
use endpoint_monitor::config::{MAX_REFRESH_INTERVAL, MIN_REFRESH_INTERVAL};
use endpoint_monitor::refresh::run_auto_refresh;
use endpoint_monitor::{Config, HealthMonitor, HttpProber, MonitorError, Result};
use std::time::Duration;
use tracing::{error, info};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Debug, Parser)]
#[command(name = "endpoint-monitor", version, about = "Probe HTTP endpoints and track their health")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// List monitored URLs
    List,
    /// Start monitoring a URL
    Add { url: String },
    /// Stop monitoring a URL and discard its history
    Remove { url: String },
    /// Check all URLs, or only the ones given
    Check { urls: Vec<String> },
    /// Show summary counts and the current status table
    Status,
    /// Show retained check results for a URL
    History {
        url: String,
        /// Only show the newest N results
        #[arg(short, long)]
        limit: Option<usize>,
    },
    /// Check all URLs repeatedly until interrupted
    Watch {
        /// Seconds between check cycles (5-300)
        #[arg(short, long)]
        interval: Option<u64>,
    },
}

#[tokio::main]
async fn main() {
    initialize_tracing();

    let cli = Cli::parse();
    let config = Config::from_env();

    if let Err(e) = config.validate() {
        error!("Configuration validation failed: {}", e);
        std::process::exit(1);
    }

    if let Err(e) = run(cli.command, config).await {
        if e.is_user_error() {
            eprintln!("{}", e);
        } else {
            error!("Command failed: {}", e);
        }
        std::process::exit(1);
    }
}

async fn run(command: Command, mut config: Config) -> Result<()> {
    let monitor = HealthMonitor::from_config(&config).await?;

    match command {
        Command::List => {
            for url in monitor.list_urls().await {
                println!("{}", url);
            }
        }
        Command::Add { url } => {
            monitor.add_url(&url).await?;
            println!("Added {}", url.trim());
        }
        Command::Remove { url } => {
            monitor.remove_url(&url).await?;
            println!("Removed {}", url);
        }
        Command::Check { urls } => {
            let prober = HttpProber::new(config.http_timeout)?;
            let subset = if urls.is_empty() { None } else { Some(urls.as_slice()) };
            let results = monitor.run_checks(&prober, subset).await;
            for result in &results {
                println!(
                    "{:<5} {:>6} {:>10}  {}{}",
                    result.status,
                    display_or_na(result.status_code),
                    display_or_na(result.response_time_ms.map(|ms| format!("{:.2}ms", ms))),
                    result.url,
                    result.error.as_deref().map(|e| format!("  ({})", e)).unwrap_or_default()
                );
            }
            print_summary(&monitor).await;
        }
        Command::Status => {
            print_summary(&monitor).await;
            for row in monitor.status_table().await {
                println!(
                    "{:<9} {:>6} {:>10} {:>8}  {}",
                    row.state,
                    display_or_na(row.status_code),
                    display_or_na(row.response_time_ms.map(|ms| format!("{:.2}ms", ms))),
                    display_or_na(row.uptime_percentage.map(|p| format!("{:.1}%", p))),
                    row.url
                );
            }
        }
        Command::History { url, limit } => {
            let history = monitor.history_for(&url).await?;
            let skip = limit.map_or(0, |n| history.len().saturating_sub(n));
            for result in history.iter().skip(skip) {
                println!(
                    "{}  {:<5} {:>6} {:>10}  {}",
                    result.timestamp.format("%Y-%m-%d %H:%M:%S"),
                    result.status,
                    display_or_na(result.status_code),
                    display_or_na(result.response_time_ms.map(|ms| format!("{:.2}ms", ms))),
                    result.error.as_deref().unwrap_or("")
                );
            }
        }
        Command::Watch { interval } => {
            if let Some(seconds) = interval {
                config.refresh_interval = Duration::from_secs(seconds);
                config.validate().map_err(MonitorError::Config)?;
            }

            info!(
                "Watching with a {}s refresh interval ({}-{}s allowed)",
                config.refresh_interval.as_secs(),
                MIN_REFRESH_INTERVAL.as_secs(),
                MAX_REFRESH_INTERVAL.as_secs()
            );

            let prober = HttpProber::new(config.http_timeout)?;
            let shutdown = async {
                if let Err(e) = tokio::signal::ctrl_c().await {
                    error!("Failed to wait for shutdown signal: {}", e);
                }
            };
            run_auto_refresh(&monitor, &prober, config.refresh_interval, shutdown).await;
            print_summary(&monitor).await;
        }
    }

    Ok(())
}

async fn print_summary(monitor: &HealthMonitor) {
    let snapshot = monitor.snapshot().await;
    println!(
        "Total: {}  UP: {}  DOWN: {}  Unchecked: {}",
        snapshot.total, snapshot.up, snapshot.down, snapshot.unchecked
    );
    if let Some(last) = monitor.last_check_time().await {
        println!("Last checked: {}", last.format("%Y-%m-%d %H:%M:%S"));
    }
}

fn display_or_na<T: std::fmt::Display>(value: Option<T>) -> String {
    value.map(|v| v.to_string()).unwrap_or_else(|| "N/A".to_string())
}

/// Initialize structured logging
fn initialize_tracing() {
    let log_level = std::env::var("RUST_LOG").unwrap_or_else(|_| "info".to_string());

    let filter_layer = tracing_subscriber::EnvFilter::try_from_default_env()
        .or_else(|_| tracing_subscriber::EnvFilter::try_new(&log_level))
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info"));

    let pretty = std::env::var("LOG_FORMAT").is_ok_and(|f| f.eq_ignore_ascii_case("pretty"));

    let registry = tracing_subscriber::registry().with(filter_layer);
    if pretty {
        registry
            .with(tracing_subscriber::fmt::layer().with_target(false).with_writer(std::io::stderr))
            .init();
    } else {
        registry
            .with(
                tracing_subscriber::fmt::layer()
                    .with_target(false)
                    .with_thread_ids(false)
                    .with_thread_names(false)
                    .with_file(false)
                    .with_line_number(false)
                    .with_writer(std::io::stderr)
                    .json(),
            )
            .init();
    }
}
