//! Long-running bridge loop: poll and print state changes.

use tracing::{info, warn};

use emodul_core::Controller;

use crate::cli::GlobalOpts;
use crate::error::CliError;
use crate::output;

pub async fn handle(controller: &Controller, global: &GlobalOpts) -> Result<(), CliError> {
    if controller.config().device.poll_interval_secs == 0 {
        warn!("poll_interval_secs is 0; no state changes will be reported");
    }

    let mut rx = controller.subscribe();
    controller.start().await;

    loop {
        tokio::select! {
            biased;
            signal = tokio::signal::ctrl_c() => {
                signal?;
                info!("interrupted, shutting down");
                break;
            }
            changed = rx.changed() => {
                if changed.is_err() {
                    break;
                }
                let state = *rx.borrow_and_update();
                output::print_output(&output::render_state(state, global.json, true)?);
            }
        }
    }
    Ok(())
}
