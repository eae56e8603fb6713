//! Synchronization core between a home-automation host and an eModul heater.
//!
//! - **[`Controller`]**: owns the API client, the cached
//!   [`ThermostatState`], debounced optimistic setpoint writes and the
//!   reconciliation of local requests against polled server state.
//!   [`start()`](Controller::start) spawns the [`PollingScheduler`];
//!   [`shutdown()`](Controller::shutdown) cancels polling and any pending write.
//!
//! - **[`ThermostatCharacteristics`]**: the narrow get/set contract a host
//!   adapter binds to its characteristics. State changes are pushed through
//!   [`Controller::subscribe()`].
//!
//! - **[`clamp_and_step`]** / **[`parse_state`]**: pure conversions between
//!   the host's Celsius domain and the device's tile encoding.

pub mod config;
pub mod controller;
pub mod convert;
pub mod error;
pub mod host;
pub mod model;
pub mod scheduler;
pub mod setpoint;

// ── Primary re-exports ──────────────────────────────────────────────
pub use config::{ControllerConfig, DeviceConfig, TlsVerification};
pub use controller::Controller;
pub use convert::parse_state;
pub use error::CoreError;
pub use host::ThermostatCharacteristics;
pub use model::{HeatingMode, TemperatureUnit, ThermostatState};
pub use scheduler::PollingScheduler;
pub use setpoint::clamp_and_step;
