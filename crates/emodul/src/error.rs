//! CLI error types with miette diagnostics.
//!
//! Maps `CoreError` and `ConfigError` into user-facing errors with
//! actionable help text.

use miette::Diagnostic;
use thiserror::Error;

use emodul_config::ConfigError;
use emodul_core::CoreError;

pub mod exit_code {
    pub const GENERAL: i32 = 1;
    pub const USAGE: i32 = 2;
    pub const AUTH: i32 = 3;
    pub const NOT_FOUND: i32 = 4;
    pub const CONFLICT: i32 = 6;
    pub const CONNECTION: i32 = 7;
}

#[derive(Debug, Error, Diagnostic)]
pub enum CliError {
    // ── Backend ──────────────────────────────────────────────────────
    #[error("Backend request failed: {message}")]
    #[diagnostic(
        code(emodul::connection_failed),
        help(
            "Check network access to the backend URL.\n\
             Try: emodul status -vv"
        )
    )]
    ConnectionFailed { message: String },

    // ── Authentication ───────────────────────────────────────────────
    #[error("Authentication failed: {message}")]
    #[diagnostic(
        code(emodul::auth_failed),
        help("Verify the eModul username and password (EMODUL_USERNAME / EMODUL_PASSWORD).")
    )]
    AuthFailed { message: String },

    #[error("No {field} configured")]
    #[diagnostic(
        code(emodul::no_credentials),
        help(
            "Set {field} in the config file or the matching EMODUL_* variable.\n\
             Show the effective configuration with: emodul config"
        )
    )]
    NoCredentials { field: String },

    // ── Device ───────────────────────────────────────────────────────
    #[error("{entity_type} not found: {identifier}")]
    #[diagnostic(
        code(emodul::not_found),
        help("Check device.tile_id in the configuration against the module's tiles.")
    )]
    NotFound {
        entity_type: String,
        identifier: String,
    },

    #[error("Setpoint write skipped: another write was still in flight")]
    #[diagnostic(code(emodul::write_skipped), help("Retry in a moment."))]
    WriteSkipped,

    #[error("Controller shut down before the request completed")]
    #[diagnostic(code(emodul::disconnected))]
    Disconnected,

    // ── Validation / configuration ───────────────────────────────────
    #[error("Invalid value for {field}: {reason}")]
    #[diagnostic(code(emodul::validation))]
    Validation { field: String, reason: String },

    #[error("Configuration error: {message}")]
    #[diagnostic(code(emodul::config))]
    Config { message: String },

    // ── IO / Serialization ───────────────────────────────────────────
    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error("Failed to encode JSON output: {0}")]
    #[diagnostic(code(emodul::json))]
    Json(#[from] serde_json::Error),
}

impl CliError {
    /// Map this error to an exit code for process termination.
    pub fn exit_code(&self) -> i32 {
        match self {
            Self::ConnectionFailed { .. } => exit_code::CONNECTION,
            Self::AuthFailed { .. } | Self::NoCredentials { .. } => exit_code::AUTH,
            Self::NotFound { .. } => exit_code::NOT_FOUND,
            Self::WriteSkipped => exit_code::CONFLICT,
            Self::Validation { .. } => exit_code::USAGE,
            Self::Disconnected | Self::Config { .. } | Self::Io(_) | Self::Json(_) => {
                exit_code::GENERAL
            }
        }
    }
}

// ── CoreError → CliError mapping ─────────────────────────────────────

impl From<CoreError> for CliError {
    fn from(err: CoreError) -> Self {
        match err {
            CoreError::Config { message } => Self::Config { message },
            CoreError::AuthenticationFailed { message } => Self::AuthFailed { message },
            CoreError::Transport { message, .. } => Self::ConnectionFailed { message },
            CoreError::NotFound {
                entity_type,
                identifier,
            } => Self::NotFound {
                entity_type,
                identifier,
            },
            CoreError::ValidationFailed { message } => Self::Validation {
                field: "celsius".into(),
                reason: message,
            },
            CoreError::WriteSkipped => Self::WriteSkipped,
            CoreError::ControllerDisconnected => Self::Disconnected,
        }
    }
}

impl From<ConfigError> for CliError {
    fn from(err: ConfigError) -> Self {
        match err {
            ConfigError::NoCredentials { field } => Self::NoCredentials { field },
            ConfigError::Validation { field, reason } => Self::Validation { field, reason },
            other => Self::Config {
                message: other.to_string(),
            },
        }
    }
}
