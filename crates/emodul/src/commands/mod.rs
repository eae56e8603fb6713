//! Command dispatch.

pub mod config_cmd;
pub mod run;
pub mod thermostat;

use emodul_core::Controller;

use crate::cli::{Command, GlobalOpts};
use crate::error::CliError;

/// Route a controller-backed command. The controller is shut down
/// afterwards whatever the outcome.
pub async fn dispatch(
    cmd: Command,
    controller: &Controller,
    global: &GlobalOpts,
) -> Result<(), CliError> {
    let result = match cmd {
        Command::Run => run::handle(controller, global).await,
        Command::Status => thermostat::status(controller, global).await,
        Command::Set(args) => thermostat::set(controller, args.celsius, global).await,
        Command::Off => thermostat::off(controller, global).await,
        Command::Heat => thermostat::heat(controller, global).await,
        // Handled in `main` before a controller exists.
        Command::Config => Err(CliError::Config {
            message: "the config command does not use a controller".into(),
        }),
    };
    controller.shutdown().await;
    result
}

#[cfg(test)]
mod tests {
    use clap::Parser;
    use emodul_core::ControllerConfig;

    use super::*;
    use crate::cli::Cli;

    #[tokio::test]
    async fn config_command_is_rejected_by_dispatch() {
        let cli = Cli::try_parse_from(["emodul", "config"]).expect("parse");
        let config = ControllerConfig::new(
            "http://127.0.0.1:9".parse().expect("url"),
            "user",
            "pw".to_string().into(),
        );
        let controller = Controller::new(config).expect("controller");

        let err = dispatch(cli.command, &controller, &cli.global)
            .await
            .expect_err("config is not a controller command");

        assert!(matches!(err, CliError::Config { .. }));
        assert_eq!(err.exit_code(), crate::error::exit_code::GENERAL);
    }
}
