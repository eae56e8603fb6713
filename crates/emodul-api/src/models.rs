// Wire types for the eModul backend.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Body of `POST /login`.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct LoginRequest<'a> {
    pub username: &'a str,
    pub password: &'a str,
    pub remember_me: bool,
    pub language_id: &'a str,
}

/// Response of `GET /frontend/module_data`.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct ModuleData {
    #[serde(default)]
    pub tiles: Vec<Tile>,
}

/// The device's atomic state unit.
///
/// `params` carries named widgets (`widget1`, `widget2`, ...) alongside
/// whatever presentation fields the backend adds; only the numeric
/// `value` inside a widget is interpreted.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct Tile {
    pub id: i64,
    #[serde(default)]
    pub params: Map<String, Value>,
}

impl Tile {
    /// Raw encoded value of the named widget, if present and numeric.
    pub fn widget_value(&self, widget: &str) -> Option<f64> {
        self.params.get(widget)?.get("value")?.as_f64()
    }
}

/// One record of `POST /send_control_data`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ControlRecord {
    pub ido: u32,
    pub params: i64,
    pub module_index: u32,
}

impl ControlRecord {
    /// A setpoint record for the given control id and encoded temperature.
    pub fn setpoint(ido: u32, encoded: i64) -> Self {
        Self {
            ido,
            params: encoded,
            module_index: 0,
        }
    }
}

/// Encode a Celsius value into the device's integer wire unit.
#[allow(clippy::cast_possible_truncation, clippy::as_conversions)]
pub fn encode_temperature(celsius: f64, divider: f64) -> i64 {
    // Setpoints are bounded by the device range, far inside i64.
    (celsius * divider).round() as i64
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn tile_reads_widget_values() {
        let tile: Tile = serde_json::from_value(json!({
            "id": 58,
            "type": 6,
            "params": {
                "description": "Room",
                "widget1": { "value": 215, "unit": 7 },
                "widget2": { "value": 180.0 }
            }
        }))
        .expect("tile");

        assert_eq!(tile.widget_value("widget1"), Some(215.0));
        assert_eq!(tile.widget_value("widget2"), Some(180.0));
        assert_eq!(tile.widget_value("description"), None);
        assert_eq!(tile.widget_value("widget3"), None);
    }

    #[test]
    fn control_record_serializes_like_the_web_frontend() {
        let record = ControlRecord::setpoint(139, encode_temperature(21.5, 10.0));
        assert_eq!(
            serde_json::to_value([record]).expect("json"),
            json!([{ "ido": 139, "params": 215, "module_index": 0 }])
        );
    }

    #[test]
    fn encode_rounds_to_nearest_unit() {
        assert_eq!(encode_temperature(21.04, 10.0), 210);
        assert_eq!(encode_temperature(21.06, 10.0), 211);
        assert_eq!(encode_temperature(10.0, 10.0), 100);
    }

    #[test]
    fn login_request_uses_camel_case() {
        let body = LoginRequest {
            username: "user",
            password: "secret",
            remember_me: true,
            language_id: "en",
        };
        assert_eq!(
            serde_json::to_value(&body).expect("json"),
            json!({ "username": "user", "password": "secret", "rememberMe": true, "languageId": "en" })
        );
    }
}
