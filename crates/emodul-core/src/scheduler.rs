// ── Polling scheduler ──
//
// Periodic background refresh. Failures are logged and swallowed: polling
// is advisory and the cached state simply stays as it was.

use std::time::Duration;

use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, warn};

use crate::controller::Controller;
use crate::error::CoreError;

/// Handle to the running poll task.
pub struct PollingScheduler {
    cancel: CancellationToken,
    handle: JoinHandle<()>,
}

impl PollingScheduler {
    /// Spawn the poll loop. The first refresh runs immediately, then every
    /// `interval` until `cancel` fires.
    pub fn spawn(controller: Controller, interval: Duration, cancel: CancellationToken) -> Self {
        let handle = tokio::spawn(poll_task(controller, interval, cancel.clone()));
        Self { cancel, handle }
    }

    pub fn is_running(&self) -> bool {
        !self.handle.is_finished()
    }

    /// Cancel the loop and wait for it to exit. A refresh in progress is
    /// abandoned at its next suspension point.
    pub async fn shutdown(self) {
        self.cancel.cancel();
        if let Err(e) = self.handle.await {
            if e.is_panic() {
                error!(error = %e, "poll task panicked");
            }
        }
    }
}

async fn poll_task(controller: Controller, interval: Duration, cancel: CancellationToken) {
    let mut ticker = tokio::time::interval(interval);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

    loop {
        tokio::select! {
            biased;
            () = cancel.cancelled() => break,
            _ = ticker.tick() => {
                tokio::select! {
                    biased;
                    () = cancel.cancelled() => break,
                    result = controller.refresh() => match result {
                        Ok(state) => debug!(
                            current_c = state.current_temperature_c,
                            target_c = state.target_temperature_c,
                            "poll complete"
                        ),
                        Err(e @ CoreError::NotFound { .. }) => {
                            error!(error = %e, "thermostat tile missing from module data; check tile_id");
                        }
                        Err(e) if e.is_transient() => {
                            warn!(error = %e, "periodic refresh failed; retrying next tick");
                        }
                        Err(e) => error!(error = %e, "periodic refresh failed"),
                    },
                }
            }
        }
    }
    debug!("poll task stopped");
}
