//! Timed refresh loop
//!
//! The monitor has no clock of its own. This loop is the timer-driven caller:
//! each tick runs the same [`HealthMonitor::run_checks`] a manual check uses.

use crate::monitor::HealthMonitor;
use crate::prober::Prober;
use std::future::Future;
use std::time::Duration;
use tokio::time::{MissedTickBehavior, interval};
use tracing::info;

/// Run check cycles every `period` until `shutdown` resolves.
///
/// Returns the number of completed cycles. A cycle that overruns the period
/// delays the next tick rather than queueing extra cycles.
pub async fn run_auto_refresh<P, F>(
    monitor: &HealthMonitor,
    prober: &P,
    period: Duration,
    shutdown: F,
) -> u64
where
    P: Prober + ?Sized,
    F: Future<Output = ()>,
{
    let mut ticker = interval(period);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
    tokio::pin!(shutdown);

    let mut cycles = 0u64;
    loop {
        tokio::select! {
            biased;
            _ = &mut shutdown => break,
            _ = ticker.tick() => {
                monitor.run_checks(prober, None).await;
                cycles += 1;

                let snapshot = monitor.snapshot().await;
                info!(
                    "Refresh cycle {} - Total: {}, UP: {}, DOWN: {}, Unchecked: {}",
                    cycles, snapshot.total, snapshot.up, snapshot.down, snapshot.unchecked
                );
            }
        }
    }

    info!("Auto refresh stopped after {} cycles", cycles);
    cycles
}
