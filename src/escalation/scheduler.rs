//! Periodic scan scheduler.
//!
//! Runs the escalation scan as a background task on a fixed cadence. Each
//! tick is independent: failures are logged and the next tick retries
//! naturally, which is the only retry mechanism this service has.

use std::sync::Arc;
use std::time::Duration;

use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{error, info};

use super::engine::EscalationEngine;

/// Spawn the periodic escalation scan task.
///
/// The first tick fires immediately, then every `interval`. Cancelling the
/// token stops the task after the in-flight scan completes.
#[must_use]
pub fn spawn_scan_task(
    engine: Arc<EscalationEngine>,
    interval: Duration,
    cancel: CancellationToken,
) -> JoinHandle<()> {
    tokio::spawn(async move {
        let mut ticker = tokio::time::interval(interval);
        loop {
            tokio::select! {
                () = cancel.cancelled() => {
                    info!("escalation scan task shutting down");
                    break;
                }
                _ = ticker.tick() => {
                    let summary = engine.scan().await;
                    if let Some(error) = &summary.error {
                        error!(%error, "escalation scan failed");
                    }
                }
            }
        }
    })
}
