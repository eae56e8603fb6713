// eModul module endpoints
//
// Tile reads and control writes for the account's active module.

use tracing::debug;

use crate::client::ModuleClient;
use crate::error::Error;
use crate::models::{ControlRecord, ModuleData, Tile, encode_temperature};

impl ModuleClient {
    /// Fetch all tiles of the active module.
    ///
    /// `GET /frontend/module_data`
    pub async fn fetch_tiles(&self) -> Result<Vec<Tile>, Error> {
        let url = self.url("frontend/module_data")?;
        let data: ModuleData = self.get_json(url).await?;
        debug!(count = data.tiles.len(), "fetched tiles");
        Ok(data.tiles)
    }

    /// Send raw control records.
    ///
    /// `POST /send_control_data` with a JSON array of records.
    pub async fn send_control(&self, records: &[ControlRecord]) -> Result<(), Error> {
        let url = self.url("send_control_data")?;
        self.post_json(url, &records).await
    }

    /// Write a new setpoint, encoded as `round(celsius * divider)`.
    ///
    /// `POST /send_control_data` with `[{ido, params, module_index: 0}]`
    pub async fn write_setpoint(&self, ido: u32, celsius: f64, divider: f64) -> Result<(), Error> {
        let record = ControlRecord::setpoint(ido, encode_temperature(celsius, divider));
        debug!(ido, celsius, encoded = record.params, "writing setpoint");
        self.send_control(&[record]).await
    }
}
