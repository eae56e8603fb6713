//! Output formatting: human text or JSON.

use serde::Serialize;

use emodul_core::{HeatingMode, ThermostatState};

/// Serializable view of the thermostat for `--json`.
#[derive(Debug, Serialize)]
pub struct StateView {
    pub current_temperature_c: f64,
    pub target_temperature_c: f64,
    pub heating: bool,
    pub mode: HeatingMode,
}

impl From<ThermostatState> for StateView {
    fn from(state: ThermostatState) -> Self {
        Self {
            current_temperature_c: state.current_temperature_c,
            target_temperature_c: state.target_temperature_c,
            heating: state.heating,
            mode: state.heating_mode(),
        }
    }
}

fn mode_label(mode: HeatingMode) -> &'static str {
    match mode {
        HeatingMode::Heat => "heat",
        HeatingMode::Off => "off",
    }
}

/// One line of text, or one JSON document (compact for streaming).
pub fn render_state(state: ThermostatState, json: bool, compact: bool) -> Result<String, serde_json::Error> {
    if json {
        let view = StateView::from(state);
        return if compact {
            serde_json::to_string(&view)
        } else {
            serde_json::to_string_pretty(&view)
        };
    }
    Ok(format!(
        "current {:.1} °C  target {:.1} °C  mode {}",
        state.current_temperature_c,
        state.target_temperature_c,
        mode_label(state.heating_mode())
    ))
}

pub fn print_output(output: &str) {
    if !output.is_empty() {
        println!("{output}");
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn text_rendering() {
        let state = ThermostatState::new(18.0, 21.5, 10.0);
        assert_eq!(
            render_state(state, false, false).expect("render"),
            "current 18.0 °C  target 21.5 °C  mode heat"
        );
    }

    #[test]
    fn json_rendering_includes_mode() {
        let state = ThermostatState::new(18.0, 10.0, 10.0);
        let rendered = render_state(state, true, true).expect("render");
        let value: serde_json::Value = serde_json::from_str(&rendered).expect("json");
        assert_eq!(value["mode"], "off");
        assert_eq!(value["heating"], false);
        assert_eq!(value["target_temperature_c"], 10.0);
    }
}
