//! `emodul config`: show the effective configuration.

use emodul_config::{Config, config_path};

use crate::cli::GlobalOpts;
use crate::error::CliError;
use crate::output;

pub fn handle(config: &Config, global: &GlobalOpts) -> Result<(), CliError> {
    let source = global.config.clone().unwrap_or_else(config_path);
    if global.json {
        output::print_output(&serde_json::to_string_pretty(&config.redacted())?);
    } else {
        output::print_output(&format!("# source: {}", source.display()));
        output::print_output(&config.to_redacted_toml()?);
    }
    Ok(())
}
