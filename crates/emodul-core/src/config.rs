// ── Runtime connection configuration ──
//
// These types describe *how* to reach the backend and how the device
// encodes its temperatures. They never touch disk: `emodul-config` (or any
// host) constructs a `ControllerConfig` and hands it in.

use std::time::Duration;

use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Serialize};
use url::Url;

use crate::error::CoreError;

pub const DEFAULT_BASE_URL: &str = "https://emodul.pl";

/// TLS verification strategy.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum TlsVerification {
    /// Bundled web PKI roots (strict).
    #[default]
    SystemDefaults,
    /// Skip verification.
    DangerAcceptInvalid,
}

/// Device encoding and control range.
///
/// Defaults match a TECH controller with the room thermostat on tile 58
/// and the setpoint control id 139.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DeviceConfig {
    /// Tile carrying target (`widget1`) and current (`widget2`) temperature.
    pub tile_id: i64,
    /// Control id used for setpoint writes.
    pub setpoint_ido: u32,
    /// Wire value = celsius * divider.
    pub temperature_divider: f64,
    /// Targets at or below this count as "off".
    pub off_threshold_c: f64,
    pub min_c: f64,
    pub max_c: f64,
    pub step_c: f64,
    /// Target used when switching to heat with no remembered heating target.
    pub default_heat_c: f64,
    /// Background refresh period. 0 = no polling.
    pub poll_interval_secs: u64,
    /// Quiet period before a requested setpoint is written.
    pub debounce_ms: u64,
}

impl Default for DeviceConfig {
    fn default() -> Self {
        Self {
            tile_id: 58,
            setpoint_ido: 139,
            temperature_divider: 10.0,
            off_threshold_c: 10.0,
            min_c: 10.0,
            max_c: 30.0,
            step_c: 0.5,
            default_heat_c: 20.0,
            poll_interval_secs: 30,
            debounce_ms: 1000,
        }
    }
}

impl DeviceConfig {
    pub fn poll_interval(&self) -> Duration {
        Duration::from_secs(self.poll_interval_secs)
    }

    pub fn debounce(&self) -> Duration {
        Duration::from_millis(self.debounce_ms)
    }

    /// Check internal consistency. Called once at construction.
    pub fn validate(&self) -> Result<(), CoreError> {
        let finite = [
            ("temperature_divider", self.temperature_divider),
            ("off_threshold_c", self.off_threshold_c),
            ("min_c", self.min_c),
            ("max_c", self.max_c),
            ("step_c", self.step_c),
            ("default_heat_c", self.default_heat_c),
        ];
        if let Some((field, _)) = finite.iter().find(|(_, v)| !v.is_finite()) {
            return Err(invalid(format!("{field} must be a finite number")));
        }
        if self.temperature_divider <= 0.0 {
            return Err(invalid("temperature_divider must be positive".into()));
        }
        if self.step_c <= 0.0 {
            return Err(invalid("step_c must be positive".into()));
        }
        if self.min_c >= self.max_c {
            return Err(invalid(format!(
                "min_c ({}) must be below max_c ({})",
                self.min_c, self.max_c
            )));
        }
        if self.off_threshold_c < self.min_c || self.off_threshold_c >= self.max_c {
            return Err(invalid(format!(
                "off_threshold_c ({}) must lie in [min_c, max_c)",
                self.off_threshold_c
            )));
        }
        Ok(())
    }
}

fn invalid(message: String) -> CoreError {
    CoreError::Config { message }
}

/// Configuration for one thermostat bridge.
#[derive(Debug, Clone)]
pub struct ControllerConfig {
    /// Backend root (e.g. `https://emodul.pl`).
    pub url: Url,
    pub username: String,
    pub password: SecretString,
    pub tls: TlsVerification,
    /// Per-request timeout.
    pub timeout: Duration,
    pub device: DeviceConfig,
}

impl ControllerConfig {
    pub fn new(url: Url, username: impl Into<String>, password: SecretString) -> Self {
        Self {
            url,
            username: username.into(),
            password,
            tls: TlsVerification::default(),
            timeout: Duration::from_secs(15),
            device: DeviceConfig::default(),
        }
    }

    /// Credentials present and device block consistent.
    pub fn validate(&self) -> Result<(), CoreError> {
        if self.username.trim().is_empty() {
            return Err(invalid("username is required".into()));
        }
        if self.password.expose_secret().is_empty() {
            return Err(invalid("password is required".into()));
        }
        if self.timeout.is_zero() {
            return Err(invalid("timeout must be non-zero".into()));
        }
        self.device.validate()
    }
}
