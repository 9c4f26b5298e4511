use airbot_core::jobs::refresh::{refresh_air_state, RefreshSummary};
use std::future::Future;
use std::time::Duration;
use tokio::time::MissedTickBehavior;
use tracing::{error, info};

use crate::WorkerState;

/// Runs the refresh once. Failures are already logged by the job.
pub async fn run_once(state: &WorkerState) -> Option<RefreshSummary> {
    refresh_air_state(&state.opendata, state.store.as_ref())
        .await
        .ok()
}

/// Resolves when `signal` fires. If the signal listener cannot be installed
/// the error is logged and this never resolves, so the scheduler keeps running.
pub async fn shutdown_on<F>(signal: F)
where
    F: Future<Output = std::io::Result<()>>,
{
    match signal.await {
        Ok(()) => info!("shutdown signal received"),
        Err(err) => {
            error!(error = %err, "cannot listen for shutdown signal");
            std::future::pending::<()>().await;
        }
    }
}

/// Refreshes on every tick until `shutdown` resolves. The first tick fires
/// immediately. Returns the number of runs started.
pub async fn run_every<F>(state: &WorkerState, period: Duration, shutdown: F) -> u64
where
    F: Future<Output = ()>,
{
    let mut ticker = tokio::time::interval(period);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
    tokio::pin!(shutdown);

    let mut runs = 0;
    loop {
        tokio::select! {
            _ = &mut shutdown => {
                info!(runs, "scheduler stopping");
                return runs;
            }
            _ = ticker.tick() => {
                runs += 1;
                if run_once(state).await.is_none() {
                    error!(run = runs, "scheduled refresh failed, waiting for next tick");
                }
            }
        }
    }
}
