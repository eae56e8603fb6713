mod cli;
mod commands;
mod error;
mod output;

use clap::Parser;
use tracing_subscriber::EnvFilter;

use emodul_config::Config;
use emodul_core::{Controller, ControllerConfig};

use crate::cli::{Cli, Command, GlobalOpts};
use crate::error::CliError;

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    init_tracing(cli.global.verbose);

    if let Err(err) = run(cli).await {
        let code = err.exit_code();
        eprintln!("{:?}", miette::Report::new(err));
        std::process::exit(code);
    }
}

fn init_tracing(verbosity: u8) {
    let filter = match verbosity {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(filter)),
        )
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

async fn run(cli: Cli) -> Result<(), CliError> {
    let config = load_config(&cli.global)?;

    match cli.command {
        // Needs no credentials or network
        Command::Config => commands::config_cmd::handle(&config, &cli.global),

        cmd => {
            let controller = Controller::new(build_controller_config(&config)?)?;

            tracing::debug!(command = ?cmd, "dispatching command");
            commands::dispatch(cmd, &controller, &cli.global).await
        }
    }
}

/// Config file + environment, then CLI flag overrides.
fn load_config(global: &GlobalOpts) -> Result<Config, CliError> {
    let mut config = emodul_config::load_config(global.config.as_deref())?;
    if let Some(url) = &global.url {
        config.url.clone_from(url);
    }
    if global.insecure {
        config.insecure = true;
    }
    if let Some(timeout) = global.timeout {
        config.timeout = timeout;
    }
    Ok(config)
}

fn build_controller_config(config: &Config) -> Result<ControllerConfig, CliError> {
    Ok(emodul_config::to_controller_config(config)?)
}
