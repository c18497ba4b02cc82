//! Data transfer objects for web requests and responses.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::coordinator::SensorState;
use crate::registry::Scope;

/// Sensor state string while the last refresh failed.
const STATE_UNAVAILABLE: &str = "unavailable";

/// Request to change the tracked train.
#[derive(Debug, Deserialize)]
pub struct SetTrainRequest {
    /// Train number, digits only
    pub train_number: Option<String>,

    /// Scope to update (defaults to the global tracked train)
    pub scope: Option<String>,
}

/// One sensor as exposed over HTTP.
#[derive(Debug, Serialize)]
pub struct SensorResult {
    /// Scope id, e.g. "global" or "station_S08409"
    pub scope: String,

    /// "station" or "train"
    pub kind: &'static str,

    /// Display name for stations
    pub name: Option<String>,

    /// Short state: "ok" for a board, the train number (or "idle") for a
    /// train, "unavailable" when the last refresh failed
    pub state: String,

    pub available: bool,

    /// RFC 3339 time of the last successful refresh
    pub last_updated: Option<String>,

    pub last_error: Option<String>,

    /// Last good data (board or train status)
    pub attributes: Value,
}

impl SensorResult {
    pub fn from_scope(scope_id: &str, scope: &Scope) -> Self {
        match scope {
            Scope::Station(station) => {
                let snapshot = station.coordinator.state();
                let state = if snapshot.available { "ok" } else { STATE_UNAVAILABLE };
                Self::build(
                    scope_id,
                    "station",
                    Some(station.station_name.clone()),
                    state.to_string(),
                    &snapshot,
                )
            }
            Scope::Train(train) => {
                let snapshot = train
                    .coordinator
                    .as_ref()
                    .map(|c| c.state())
                    .unwrap_or_default();
                let state = match (snapshot.available, snapshot.data.as_deref()) {
                    (false, _) => STATE_UNAVAILABLE.to_string(),
                    (true, Some(Some(status))) => status.train_number.clone(),
                    (true, _) => "idle".to_string(),
                };
                Self::build(scope_id, "train", None, state, &snapshot)
            }
        }
    }

    fn build<T: Serialize>(
        scope_id: &str,
        kind: &'static str,
        name: Option<String>,
        state: String,
        snapshot: &SensorState<T>,
    ) -> Self {
        let attributes = snapshot
            .data
            .as_deref()
            .and_then(|data| serde_json::to_value(data).ok())
            .unwrap_or(Value::Null);

        Self {
            scope: scope_id.to_string(),
            kind,
            name,
            state,
            available: snapshot.available,
            last_updated: snapshot.last_updated.map(|t| t.to_rfc3339()),
            last_error: snapshot.last_error.clone(),
            attributes,
        }
    }
}

/// Response listing every sensor.
#[derive(Debug, Serialize)]
pub struct SensorListResponse {
    pub sensors: Vec<SensorResult>,
}

/// Error response.
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: String,
}
