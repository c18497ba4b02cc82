//! Station board fetching.

use futures::future::try_join;
use tracing::{debug, warn};

use crate::domain::{
    Delay, Direction, StationBoard, StationBoardEntry, UNKNOWN_PLATFORM, build_timestamp,
    decode_platform,
};

use super::client::{BoardStatusPolicy, Transport};
use super::error::{Endpoint, FetchCause, FetchError};
use super::raw::{RawRecord, parse_json, records};

/// Entries kept per direction.
pub const BOARD_LIMIT: usize = 10;

/// Placeholder for missing text fields on a board.
const UNKNOWN_TEXT: &str = "??";

/// Fetch departures and arrivals for a station.
///
/// `station_id` is the upstream code (e.g. `S08409`), not a display name.
/// Both directions are requested concurrently with the same timestamp. Any
/// error aborts the whole board; see [`BoardStatusPolicy`] for non-200s.
pub async fn fetch_station_board<T: Transport>(
    transport: &T,
    station_id: &str,
    policy: BoardStatusPolicy,
) -> Result<StationBoard, FetchError> {
    let timestamp = build_timestamp();
    fetch_station_board_at(transport, station_id, &timestamp, policy).await
}

/// [`fetch_station_board`] with an explicit board timestamp.
pub async fn fetch_station_board_at<T: Transport>(
    transport: &T,
    station_id: &str,
    timestamp: &str,
    policy: BoardStatusPolicy,
) -> Result<StationBoard, FetchError> {
    let (departures, arrivals) = try_join(
        fetch_direction(transport, Direction::Departures, station_id, timestamp, policy),
        fetch_direction(transport, Direction::Arrivals, station_id, timestamp, policy),
    )
    .await?;

    debug!(
        station_id,
        departures = departures.len(),
        arrivals = arrivals.len(),
        "Fetched station board"
    );

    Ok(StationBoard {
        departures,
        arrivals,
    })
}

async fn fetch_direction<T: Transport>(
    transport: &T,
    direction: Direction,
    station_id: &str,
    timestamp: &str,
    policy: BoardStatusPolicy,
) -> Result<Vec<StationBoardEntry>, FetchError> {
    let endpoint = Endpoint::from(direction);
    let path = format!("{}/{}/{}", endpoint, station_id, timestamp);

    let response = transport
        .get(&path)
        .await
        .map_err(|cause| FetchError::failed(endpoint, cause))?;

    if !response.is_ok() {
        return match policy {
            BoardStatusPolicy::Fail => Err(FetchError::failed(
                endpoint,
                FetchCause::Status(response.status),
            )),
            BoardStatusPolicy::Skip => {
                warn!(
                    station_id,
                    %direction,
                    status = response.status,
                    "Board direction unavailable, leaving it empty"
                );
                Ok(Vec::new())
            }
        };
    }

    let value = parse_json(endpoint, &response.body)?;

    Ok(records(value, BOARD_LIMIT)
        .iter()
        .map(|record| board_entry(record, direction))
        .collect())
}

/// Normalize one raw board record.
pub fn board_entry(record: &RawRecord, direction: Direction) -> StationBoardEntry {
    let text = |key: &str| record.get_with_default(key, UNKNOWN_TEXT.to_string());
    let platform = |key: &str| {
        decode_platform(&record.get_with_default(key, UNKNOWN_PLATFORM.to_string()))
    };

    StationBoardEntry {
        train_number: text("compNumeroTreno"),
        scheduled_time: text(direction.scheduled_time_key()),
        counterpart_station: text(direction.counterpart_key()),
        delay: record.get_with_default("ritardo", Delay::unknown()),
        planned_platform: platform(direction.planned_platform_key()),
        actual_platform: platform(direction.actual_platform_key()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::Platform;
    use crate::viaggiatreno::StubTransport;
    use serde_json::{Value, json};

    const TS: &str = "Wed Nov 15 2023 00:13:20 GMT+0200 (Ora legale dell’Europa centrale)";

    fn departures(n: usize) -> String {
        let items: Vec<Value> = (0..n)
            .map(|i| {
                json!({
                    "compNumeroTreno": format!("REG {}", 2000 + i),
                    "compOrarioPartenza": "10:15",
                    "destinazione": "FIUMICINO AEROPORTO",
                    "ritardo": i,
                    "binarioProgrammatoPartenzaDescrizione": "XIV",
                    "binarioEffettivoPartenzaDescrizione": null
                })
            })
            .collect();
        Value::Array(items).to_string()
    }

    #[tokio::test]
    async fn keeps_first_ten_in_order() {
        let stub = StubTransport::new()
            .route("partenze/S08409/", 200, departures(11))
            .route("arrivi/S08409/", 200, "[]");

        let board = fetch_station_board_at(&stub, "S08409", TS, BoardStatusPolicy::Fail)
            .await
            .unwrap();

        assert_eq!(board.departures.len(), 10);
        assert!(board.arrivals.is_empty());
        for (i, entry) in board.departures.iter().enumerate() {
            assert_eq!(entry.train_number, format!("REG {}", 2000 + i));
            assert_eq!(entry.delay, Delay::Minutes(i as i64));
        }
        assert_eq!(stub.call_count(), 2);
    }

    #[tokio::test]
    async fn departures_error_fails_whole_board() {
        let stub = StubTransport::new()
            .route("partenze/", 500, "oops")
            .route("arrivi/", 200, departures(3));

        let err = fetch_station_board_at(&stub, "S08409", TS, BoardStatusPolicy::Fail)
            .await
            .unwrap_err();

        assert_eq!(
            err,
            FetchError::failed(Endpoint::Departures, FetchCause::Status(500))
        );
        assert_eq!(err.endpoint().unwrap().to_string(), "partenze");
    }

    #[tokio::test]
    async fn skip_policy_empties_only_failed_direction() {
        let stub = StubTransport::new()
            .route("partenze/", 503, "")
            .route("arrivi/", 200, "[{\"compNumeroTreno\": \"IC 588\"}]");

        let board = fetch_station_board_at(&stub, "S08409", TS, BoardStatusPolicy::Skip)
            .await
            .unwrap();

        assert!(board.departures.is_empty());
        assert_eq!(board.arrivals.len(), 1);
        assert_eq!(board.arrivals[0].train_number, "IC 588");
    }

    #[tokio::test]
    async fn thrown_errors_abort_even_when_skipping() {
        let stub = StubTransport::new()
            .route("partenze/", 200, "[]")
            .fail("arrivi/", FetchCause::Timeout);

        let err = fetch_station_board_at(&stub, "S08409", TS, BoardStatusPolicy::Skip)
            .await
            .unwrap_err();
        assert_eq!(
            err,
            FetchError::failed(Endpoint::Arrivals, FetchCause::Timeout)
        );

        let stub = StubTransport::new()
            .route("partenze/", 200, "not json")
            .route("arrivi/", 200, "[]");
        let err = fetch_station_board_at(&stub, "S08409", TS, BoardStatusPolicy::Skip)
            .await
            .unwrap_err();
        assert_eq!(err.endpoint(), Some(Endpoint::Departures));
    }

    #[tokio::test]
    async fn failing_direction_cancels_the_other() {
        let stub = StubTransport::new()
            .route("partenze/", 500, "")
            .hang("arrivi/");

        let result = tokio::time::timeout(
            std::time::Duration::from_secs(2),
            fetch_station_board_at(&stub, "S08409", TS, BoardStatusPolicy::Fail),
        )
        .await
        .expect("board fetch waited on the hanging direction");

        assert_eq!(
            result.unwrap_err(),
            FetchError::failed(Endpoint::Departures, FetchCause::Status(500))
        );
        assert_eq!(stub.call_count(), 2);
        assert_eq!(stub.abandoned_count(), 1);
    }

    #[tokio::test]
    async fn failing_arrivals_cancel_departures() {
        let stub = StubTransport::new()
            .hang("partenze/")
            .fail("arrivi/", FetchCause::Timeout);

        let result = tokio::time::timeout(
            std::time::Duration::from_secs(2),
            fetch_station_board_at(&stub, "S08409", TS, BoardStatusPolicy::Skip),
        )
        .await
        .expect("board fetch waited on the hanging direction");

        assert_eq!(result.unwrap_err().endpoint(), Some(Endpoint::Arrivals));
        assert_eq!(stub.abandoned_count(), 1);
    }

    #[tokio::test]
    async fn non_array_body_is_empty() {
        let stub = StubTransport::new()
            .route("partenze/", 200, "{}")
            .route("arrivi/", 200, "null");

        let board = fetch_station_board_at(&stub, "S1", TS, BoardStatusPolicy::Fail)
            .await
            .unwrap();
        assert!(board.is_empty());
    }

    #[tokio::test]
    async fn requests_carry_station_and_timestamp() {
        let stub = StubTransport::new()
            .route("partenze/", 200, "[]")
            .route("arrivi/", 200, "[]");

        fetch_station_board_at(&stub, "S01700", TS, BoardStatusPolicy::Fail)
            .await
            .unwrap();

        let mut paths = stub.requested_paths();
        paths.sort();
        assert_eq!(
            paths,
            vec![format!("arrivi/S01700/{TS}"), format!("partenze/S01700/{TS}")]
        );
    }

    #[test]
    fn arrival_mapping_uses_arrival_keys() {
        let record = RawRecord::from_value(json!({
            "compNumeroTreno": "FR 9650",
            "compOrarioArrivo": "12:40",
            "compOrarioPartenza": "12:50",
            "origine": "TORINO P.NUOVA",
            "destinazione": "NAPOLI C.LE",
            "ritardo": 0,
            "binarioProgrammatoArrivoDescrizione": "VII",
            "binarioEffettivoArrivoDescrizione": "8 Est"
        }));

        let entry = board_entry(&record, Direction::Arrivals);
        assert_eq!(entry.scheduled_time, "12:40");
        assert_eq!(entry.counterpart_station, "TORINO P.NUOVA");
        assert_eq!(entry.planned_platform, Platform::Number(7));
        assert_eq!(entry.actual_platform, Platform::Text("8 Est".into()));
    }

    #[test]
    fn empty_record_gets_defaults() {
        let entry = board_entry(&RawRecord::default(), Direction::Departures);
        assert_eq!(entry.train_number, "??");
        assert_eq!(entry.scheduled_time, "??");
        assert_eq!(entry.counterpart_station, "??");
        assert_eq!(entry.delay, Delay::unknown());
        assert_eq!(entry.planned_platform, Platform::unknown());
        assert_eq!(entry.actual_platform, Platform::unknown());
    }
}
