// ── Host adapter contract ──
//
// One query and one command per characteristic a home-automation host
// exposes for a heating thermostat. Getters answer from the cached state;
// setters resolve once the backend accepted (or refused) the change.
// State pushed from polling reaches the host via `Controller::subscribe`.

use std::future::Future;

use crate::controller::Controller;
use crate::error::CoreError;
use crate::model::{HeatingMode, TemperatureUnit};

pub trait ThermostatCharacteristics {
    fn current_temperature(&self) -> f64;

    fn target_temperature(&self) -> f64;

    /// Resolves with the clamped and stepped target actually written.
    fn set_target_temperature(
        &self,
        celsius: f64,
    ) -> impl Future<Output = Result<f64, CoreError>> + Send;

    fn heating_mode(&self) -> HeatingMode;

    fn set_heating_mode(
        &self,
        mode: HeatingMode,
    ) -> impl Future<Output = Result<(), CoreError>> + Send;

    fn display_units(&self) -> TemperatureUnit {
        TemperatureUnit::Celsius
    }

    /// Units are fixed to Celsius; accepted and ignored.
    fn set_display_units(&self, _unit: TemperatureUnit) -> Result<(), CoreError> {
        Ok(())
    }
}

impl ThermostatCharacteristics for Controller {
    fn current_temperature(&self) -> f64 {
        self.state().current_temperature_c
    }

    fn target_temperature(&self) -> f64 {
        self.state().target_temperature_c
    }

    fn set_target_temperature(
        &self,
        celsius: f64,
    ) -> impl Future<Output = Result<f64, CoreError>> + Send {
        self.request_set(celsius)
    }

    fn heating_mode(&self) -> HeatingMode {
        self.state().heating_mode()
    }

    fn set_heating_mode(
        &self,
        mode: HeatingMode,
    ) -> impl Future<Output = Result<(), CoreError>> + Send {
        Controller::set_heating_mode(self, mode)
    }
}
