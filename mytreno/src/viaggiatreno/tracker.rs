//! Live tracking of a single train.

use futures::future::try_join;
use serde_json::Value;
use tracing::debug;

use crate::domain::{
    Platform, TrainStatus, TrainStop, UNKNOWN_STATION, decode_platform, ms_to_local_iso,
    next_stop,
};

use super::client::{Transport, get_ok};
use super::error::{Endpoint, FetchError};
use super::raw::{RawRecord, parse_json, records};
use super::resolve::{ResolvedTrain, resolve_train};

/// Platform fields of a stop, most authoritative first.
const STOP_PLATFORM_KEYS: [&str; 4] = [
    "binarioEffettivoArrivoDescrizione",
    "binarioEffettivoPartenzaDescrizione",
    "binarioProgrammatoArrivoDescrizione",
    "binarioProgrammatoPartenzaDescrizione",
];

/// Fetch the live status of a train.
///
/// `train_number` is a snapshot of the tracked-train cell. With nothing
/// selected this returns `Ok(None)` without touching the network.
pub async fn fetch_train_status<T: Transport>(
    transport: &T,
    train_number: Option<&str>,
) -> Result<Option<TrainStatus>, FetchError> {
    let Some(train_number) = train_number.filter(|n| !n.is_empty()) else {
        return Ok(None);
    };

    let resolved = resolve_train(transport, train_number).await?;
    let (overview, stops) = fetch_details(transport, train_number, &resolved).await?;

    let status = build_status(train_number, &overview, &stops);
    debug!(
        train_number,
        delay = status.delay_minutes,
        stops = status.stops.len(),
        next_station = status.next_station.as_deref().unwrap_or("-"),
        "Fetched train status"
    );
    Ok(Some(status))
}

/// Overview and stop list, requested concurrently.
async fn fetch_details<T: Transport>(
    transport: &T,
    train_number: &str,
    resolved: &ResolvedTrain,
) -> Result<(Value, Value), FetchError> {
    let suffix = format!(
        "{}/{}/{}",
        resolved.station_id, train_number, resolved.timestamp
    );
    let overview_path = format!("{}/{}", Endpoint::Overview, suffix);
    let stops_path = format!("{}/{}", Endpoint::Stops, suffix);

    let (overview, stops) = try_join(
        get_ok(transport, Endpoint::Overview, &overview_path),
        get_ok(transport, Endpoint::Stops, &stops_path),
    )
    .await?;

    Ok((
        parse_json(Endpoint::Overview, &overview)?,
        parse_json(Endpoint::Stops, &stops)?,
    ))
}

/// Combine the overview and stop list into a [`TrainStatus`].
pub fn build_status(train_number: &str, overview: &Value, stops: &Value) -> TrainStatus {
    let overview = RawRecord::from_value(overview.clone());
    let stops: Vec<TrainStop> = records(stops.clone(), usize::MAX)
        .iter()
        .map(|wrapper| train_stop(&wrapper.record("fermata")))
        .collect();

    let next = next_stop(&stops);
    let next_station = next.map(|stop| stop.station_name.clone());
    let next_station_scheduled_iso = next.and_then(|stop| stop.scheduled_iso_time.clone());

    TrainStatus {
        train_number: train_number.to_string(),
        delay_minutes: overview.get_with_default("ritardo", 0),
        status_text: status_text(&overview),
        last_detected_station: overview
            .get_with_default("stazioneUltimoRilevamento", UNKNOWN_STATION.to_string()),
        last_detection_time_iso: ms_to_local_iso(overview.get_opt("oraUltimoRilevamento")),
        next_station,
        next_station_scheduled_iso,
        stops,
    }
}

/// Normalize one `fermata` object.
pub fn train_stop(stop: &RawRecord) -> TrainStop {
    let has_arrived = stop.is_truthy("arrivoReale") || stop.is_truthy("partenzaReale");
    let platform = stop
        .first_non_empty(&STOP_PLATFORM_KEYS)
        .map(|descriptor| decode_platform(&descriptor))
        .unwrap_or_else(Platform::unknown);

    TrainStop {
        station_name: stop.get_with_default("stazione", UNKNOWN_STATION.to_string()),
        scheduled_iso_time: ms_to_local_iso(stop.get_opt("programmata")),
        actual_iso_time: ms_to_local_iso(stop.get_opt("effettiva")),
        delay_minutes: stop.get_with_default("ritardo", 0),
        has_arrived,
        platform,
    }
}

/// `compRitardoAndamento` is either a string or a list of translations,
/// Italian first.
fn status_text(overview: &RawRecord) -> Option<String> {
    match overview.get("compRitardoAndamento")? {
        Value::Array(items) => items.first().and_then(|first| first.as_str()).map(str::to_string),
        Value::String(s) => Some(s.clone()),
        _ => None,
    }
}
