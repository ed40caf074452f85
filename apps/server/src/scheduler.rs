//! Background scheduler for the event retention sweep.

use std::sync::Arc;
use std::time::Duration;

use tokio::time::interval;
use tracing::{debug, info, warn};

use crate::main_lib::AppState;

/// Upper bound on sweeps per tick so a large backlog is spread over ticks.
const MAX_SWEEPS_PER_TICK: usize = 50;

/// Starts the periodic cleanup of expired event records.
pub fn start_cleanup_scheduler(state: Arc<AppState>, period: Duration) {
    tokio::spawn(async move {
        info!("Event cleanup scheduler started ({}s interval)", period.as_secs());
        let mut ticker = interval(period);
        loop {
            ticker.tick().await;
            run_cleanup(&state).await;
        }
    });
}

/// Sweeps until the backlog is exhausted or the per-tick bound is reached.
/// Returns the number of records deleted.
pub async fn run_cleanup(state: &AppState) -> usize {
    let mut total = 0;
    for _ in 0..MAX_SWEEPS_PER_TICK {
        match state.retention_service.sweep().await {
            Ok(report) => {
                total += report.deleted;
                if report.exhausted {
                    break;
                }
            }
            Err(e) => {
                warn!("Event cleanup sweep failed: {}", e);
                break;
            }
        }
    }
    if total > 0 {
        info!("Event cleanup removed {} record(s)", total);
    } else {
        debug!("Event cleanup found nothing to remove");
    }
    total
}
