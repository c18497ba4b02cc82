//! Live status of a single train.

use serde::Serialize;

use super::Platform;

/// Placeholder for station names upstream did not send.
pub const UNKNOWN_STATION: &str = "--";

/// A stop on the train's route.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TrainStop {
    pub station_name: String,

    /// Scheduled time, Rome local ISO-8601.
    pub scheduled_iso_time: Option<String>,

    /// Actual (or forecast) time, Rome local ISO-8601.
    pub actual_iso_time: Option<String>,

    pub delay_minutes: i64,

    /// True once upstream reports an actual arrival or departure here.
    pub has_arrived: bool,

    pub platform: Platform,
}

/// Everything we know about a tracked train after one refresh.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TrainStatus {
    pub train_number: String,

    pub delay_minutes: i64,

    /// Free-text status from upstream (Italian), e.g. "con un ritardo di 5 min.".
    pub status_text: Option<String>,

    pub last_detected_station: String,

    pub last_detection_time_iso: Option<String>,

    pub next_station: Option<String>,

    pub next_station_scheduled_iso: Option<String>,

    pub stops: Vec<TrainStop>,
}

/// First stop in route order the train has not reached yet.
pub fn next_stop(stops: &[TrainStop]) -> Option<&TrainStop> {
    stops.iter().find(|stop| !stop.has_arrived)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn stop(name: &str, has_arrived: bool) -> TrainStop {
        TrainStop {
            station_name: name.to_string(),
            scheduled_iso_time: None,
            actual_iso_time: None,
            delay_minutes: 0,
            has_arrived,
            platform: Platform::unknown(),
        }
    }

    #[test]
    fn next_stop_is_first_unreached() {
        let stops = vec![
            stop("ROMA TERMINI", true),
            stop("FIRENZE S.M.N.", false),
            stop("BOLOGNA C.LE", false),
        ];
        assert_eq!(next_stop(&stops).unwrap().station_name, "FIRENZE S.M.N.");
    }

    #[test]
    fn next_stop_none_when_all_arrived_or_empty() {
        assert!(next_stop(&[stop("A", true), stop("B", true)]).is_none());
        assert!(next_stop(&[]).is_none());
    }
}
