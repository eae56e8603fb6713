//! Configuration for eModul thermostat tools.
//!
//! A TOML file merged with `EMODUL_*` environment variables, and the
//! translation to `emodul_core::ControllerConfig`. Nested keys use a
//! double underscore: `EMODUL_DEVICE__TILE_ID=12`.

use std::path::{Path, PathBuf};
use std::time::Duration;

use directories::ProjectDirs;
use figment::{
    Figment,
    providers::{Env, Format, Serialized, Toml},
};
use secrecy::SecretString;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use emodul_core::config::DEFAULT_BASE_URL;
use emodul_core::{ControllerConfig, CoreError, DeviceConfig, TlsVerification};

// ── Error ───────────────────────────────────────────────────────────

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("invalid {field}: {reason}")]
    Validation { field: String, reason: String },

    #[error("no {field} configured (set it in the config file or EMODUL_{env})", env = .field.to_uppercase())]
    NoCredentials { field: String },

    #[error("config file not found: {}", .path.display())]
    NotFound { path: PathBuf },

    #[error("failed to serialize config: {0}")]
    Serialization(#[from] toml::ser::Error),

    #[error("config loading failed: {0}")]
    Figment(Box<figment::Error>),
}

impl From<figment::Error> for ConfigError {
    fn from(err: figment::Error) -> Self {
        Self::Figment(Box::new(err))
    }
}

// ── TOML config ─────────────────────────────────────────────────────

/// Top-level configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct Config {
    /// Backend root URL.
    #[serde(default = "default_url")]
    pub url: String,

    /// eModul account name.
    pub username: Option<String>,

    /// eModul account password (plaintext; prefer `EMODUL_PASSWORD`).
    pub password: Option<String>,

    /// Accept invalid TLS certificates.
    #[serde(default)]
    pub insecure: bool,

    /// Request timeout in seconds.
    #[serde(default = "default_timeout")]
    pub timeout: u64,

    #[serde(default)]
    pub device: DeviceConfig,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            url: default_url(),
            username: None,
            password: None,
            insecure: false,
            timeout: default_timeout(),
            device: DeviceConfig::default(),
        }
    }
}

fn default_url() -> String {
    DEFAULT_BASE_URL.into()
}
fn default_timeout() -> u64 {
    15
}

impl Config {
    /// Copy with the password masked, for display.
    pub fn redacted(&self) -> Self {
        let mut shown = self.clone();
        if shown.password.is_some() {
            shown.password = Some("********".into());
        }
        shown
    }

    /// Render as TOML with the password masked.
    pub fn to_redacted_toml(&self) -> Result<String, ConfigError> {
        Ok(toml::to_string_pretty(&self.redacted())?)
    }
}

// ── Config file path ────────────────────────────────────────────────

/// Resolve the config file path via XDG / platform conventions.
pub fn config_path() -> PathBuf {
    ProjectDirs::from("pl", "emodul", "emodul").map_or_else(
        || {
            let mut p = PathBuf::from(std::env::var("HOME").unwrap_or_else(|_| ".".into()));
            p.push(".config");
            p.push("emodul");
            p.push("config.toml");
            p
        },
        |dirs| dirs.config_dir().join("config.toml"),
    )
}

// ── Config loading ──────────────────────────────────────────────────

/// Load the configuration from file + environment.
///
/// An explicit `path` must exist; the default location is optional.
pub fn load_config(path: Option<&Path>) -> Result<Config, ConfigError> {
    let path = match path {
        Some(explicit) => {
            if !explicit.is_file() {
                return Err(ConfigError::NotFound {
                    path: explicit.to_path_buf(),
                });
            }
            explicit.to_path_buf()
        }
        None => config_path(),
    };

    let config: Config = Figment::new()
        .merge(Serialized::defaults(Config::default()))
        .merge(Toml::file(&path))
        .merge(Env::prefixed("EMODUL_").split("__"))
        .extract()?;
    Ok(config)
}

// ── Translation ─────────────────────────────────────────────────────

/// Build a validated `ControllerConfig`.
pub fn to_controller_config(config: &Config) -> Result<ControllerConfig, ConfigError> {
    let url: url::Url = config.url.parse().map_err(|_| ConfigError::Validation {
        field: "url".into(),
        reason: format!("invalid URL: {}", config.url),
    })?;

    let username = config
        .username
        .clone()
        .filter(|u| !u.trim().is_empty())
        .ok_or_else(|| ConfigError::NoCredentials {
            field: "username".into(),
        })?;
    let password = config
        .password
        .clone()
        .filter(|p| !p.is_empty())
        .map(SecretString::from)
        .ok_or_else(|| ConfigError::NoCredentials {
            field: "password".into(),
        })?;

    let mut controller = ControllerConfig::new(url, username, password);
    controller.tls = if config.insecure {
        TlsVerification::DangerAcceptInvalid
    } else {
        TlsVerification::SystemDefaults
    };
    controller.timeout = Duration::from_secs(config.timeout);
    controller.device = config.device.clone();

    controller.validate().map_err(|e| match e {
        CoreError::Config { message } => ConfigError::Validation {
            field: "config".into(),
            reason: message,
        },
        other => ConfigError::Validation {
            field: "config".into(),
            reason: other.to_string(),
        },
    })?;
    Ok(controller)
}
