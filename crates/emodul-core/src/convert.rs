// ── Tile → domain conversion ──

use emodul_api::Tile;

use crate::error::CoreError;
use crate::model::ThermostatState;

/// Widget holding the encoded target temperature.
pub const TARGET_WIDGET: &str = "widget1";
/// Widget holding the encoded measured temperature.
pub const CURRENT_WIDGET: &str = "widget2";

/// Decode the thermostat tile into a [`ThermostatState`].
///
/// A missing tile or widget is a configuration mismatch and reported as
/// [`CoreError::NotFound`].
pub fn parse_state(
    tiles: &[Tile],
    tile_id: i64,
    divider: f64,
    off_threshold_c: f64,
) -> Result<ThermostatState, CoreError> {
    let tile = tiles
        .iter()
        .find(|t| t.id == tile_id)
        .ok_or_else(|| CoreError::NotFound {
            entity_type: "Tile".into(),
            identifier: tile_id.to_string(),
        })?;

    let widget = |name: &str| {
        tile.widget_value(name).ok_or_else(|| CoreError::NotFound {
            entity_type: "Widget".into(),
            identifier: format!("{name} on tile {tile_id}"),
        })
    };

    let target_c = widget(TARGET_WIDGET)? / divider;
    let current_c = widget(CURRENT_WIDGET)? / divider;

    Ok(ThermostatState::new(current_c, target_c, off_threshold_c))
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;
    use serde_json::json;

    use super::*;

    fn tiles(value: serde_json::Value) -> Vec<Tile> {
        serde_json::from_value(value).expect("tiles")
    }

    #[test]
    fn decodes_target_current_and_heating() {
        let tiles = tiles(json!([
            { "id": 3, "params": { "widget1": { "value": 1 } } },
            { "id": 58, "params": { "widget1": { "value": 215 }, "widget2": { "value": 180 } } }
        ]));

        let state = parse_state(&tiles, 58, 10.0, 10.0).expect("state");

        assert_eq!(state, ThermostatState::new(18.0, 21.5, 10.0));
        assert!(state.heating);
    }

    #[test]
    fn target_at_threshold_is_off() {
        let tiles = tiles(json!([
            { "id": 58, "params": { "widget1": { "value": 100 }, "widget2": { "value": 195 } } }
        ]));

        let state = parse_state(&tiles, 58, 10.0, 10.0).expect("state");

        assert!(!state.heating);
    }

    #[test]
    fn missing_tile_is_not_found() {
        let tiles = tiles(json!([{ "id": 3, "params": {} }]));

        let err = parse_state(&tiles, 58, 10.0, 10.0).expect_err("missing tile");

        assert!(
            matches!(err, CoreError::NotFound { ref entity_type, ref identifier } if entity_type == "Tile" && identifier == "58")
        );
    }

    #[test]
    fn missing_widget_is_not_found() {
        let tiles = tiles(json!([{ "id": 58, "params": { "widget1": { "value": 215 } } }]));

        let err = parse_state(&tiles, 58, 10.0, 10.0).expect_err("missing widget");

        assert!(matches!(err, CoreError::NotFound { ref entity_type, .. } if entity_type == "Widget"));
    }
}
