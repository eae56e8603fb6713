//! One-shot thermostat commands.

use tracing::info;

use emodul_core::{Controller, HeatingMode};

use crate::cli::GlobalOpts;
use crate::error::CliError;
use crate::output;

pub async fn status(controller: &Controller, global: &GlobalOpts) -> Result<(), CliError> {
    let state = controller.refresh().await?;
    output::print_output(&output::render_state(state, global.json, false)?);
    Ok(())
}

pub async fn set(controller: &Controller, celsius: f64, global: &GlobalOpts) -> Result<(), CliError> {
    let written = controller.request_set(celsius).await?;
    info!(requested = celsius, written, "target updated");
    output::print_output(&output::render_state(controller.state(), global.json, false)?);
    Ok(())
}

pub async fn off(controller: &Controller, global: &GlobalOpts) -> Result<(), CliError> {
    set_mode(controller, HeatingMode::Off, global).await
}

/// Reads first so the last heating target can be restored.
pub async fn heat(controller: &Controller, global: &GlobalOpts) -> Result<(), CliError> {
    controller.refresh().await?;
    set_mode(controller, HeatingMode::Heat, global).await
}

async fn set_mode(controller: &Controller, mode: HeatingMode, global: &GlobalOpts) -> Result<(), CliError> {
    controller.set_heating_mode(mode).await?;
    output::print_output(&output::render_state(controller.state(), global.json, false)?);
    Ok(())
}
