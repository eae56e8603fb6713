// ── Domain model ──

use serde::{Deserialize, Serialize};

use crate::config::DeviceConfig;

/// Snapshot of the heating zone as the host should display it.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct ThermostatState {
    pub current_temperature_c: f64,
    pub target_temperature_c: f64,
    /// Always `target_temperature_c > off_threshold_c`.
    pub heating: bool,
}

impl ThermostatState {
    pub fn new(current_temperature_c: f64, target_temperature_c: f64, off_threshold_c: f64) -> Self {
        Self {
            current_temperature_c,
            target_temperature_c,
            heating: target_temperature_c > off_threshold_c,
        }
    }

    /// State before the first successful read: everything at `min_c`, off.
    pub fn initial(device: &DeviceConfig) -> Self {
        Self::new(device.min_c, device.min_c, device.off_threshold_c)
    }

    pub fn heating_mode(&self) -> HeatingMode {
        if self.heating {
            HeatingMode::Heat
        } else {
            HeatingMode::Off
        }
    }
}

/// Heating/cooling mode as exposed to the host. Only heat and off exist.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum HeatingMode {
    Off,
    Heat,
}

/// Display units. The device only speaks Celsius.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TemperatureUnit {
    #[default]
    Celsius,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn heating_follows_threshold() {
        assert!(ThermostatState::new(18.0, 10.5, 10.0).heating);
        assert!(!ThermostatState::new(18.0, 10.0, 10.0).heating);
    }

    #[test]
    fn initial_state_is_off_at_minimum() {
        let state = ThermostatState::initial(&DeviceConfig::default());
        assert_eq!(state.heating_mode(), HeatingMode::Off);
        assert!((state.target_temperature_c - 10.0).abs() < f64::EPSILON);
    }
}
