//! Time handling for ViaggiaTreno.
//!
//! The API wants a JavaScript `Date.toString()` style timestamp as a path
//! segment on board requests, and reports event times as epoch milliseconds.

use chrono::{DateTime, FixedOffset, SecondsFormat, Utc};
use chrono_tz::Europe::Rome;

/// Offset baked into the board timestamp. Upstream accepts it all year round.
const BOARD_OFFSET_SECS: i32 = 2 * 60 * 60;

/// Suffix the API expects after the time of day.
const BOARD_ZONE_LABEL: &str = "GMT+0200 (Ora legale dell’Europa centrale)";

/// Build the board timestamp for the current instant.
pub fn build_timestamp() -> String {
    build_timestamp_at(Utc::now())
}

/// Build the board timestamp for a given instant.
///
/// The instant is shown at a fixed UTC+2 offset whatever the actual
/// daylight-saving state in Italy.
///
/// # Examples
///
/// ```
/// use chrono::DateTime;
/// use mytreno::domain::build_timestamp_at;
///
/// let at = DateTime::from_timestamp(1_700_000_000, 0).unwrap();
/// assert_eq!(
///     build_timestamp_at(at),
///     "Wed Nov 15 2023 00:13:20 GMT+0200 (Ora legale dell’Europa centrale)"
/// );
/// ```
pub fn build_timestamp_at(now: DateTime<Utc>) -> String {
    let offset = FixedOffset::east_opt(BOARD_OFFSET_SECS).expect("UTC+2 is a valid offset");
    let local = now.with_timezone(&offset);
    format!("{} {}", local.format("%a %b %d %Y %H:%M:%S"), BOARD_ZONE_LABEL)
}

/// Convert epoch milliseconds to an ISO-8601 string in Rome local time.
///
/// Upstream uses `null` or `0` for "not happened yet", so both map to `None`.
/// Output has second precision and a numeric offset that follows CET/CEST,
/// e.g. `2023-11-14T23:13:20+01:00`.
pub fn ms_to_local_iso(ms: Option<i64>) -> Option<String> {
    let ms = ms.filter(|ms| *ms != 0)?;
    let utc = DateTime::<Utc>::from_timestamp_millis(ms)?;
    Some(
        utc.with_timezone(&Rome)
            .to_rfc3339_opts(SecondsFormat::Secs, false),
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    fn at(secs: i64) -> DateTime<Utc> {
        DateTime::from_timestamp(secs, 0).unwrap()
    }

    #[test]
    fn timestamp_uses_fixed_offset() {
        assert_eq!(
            build_timestamp_at(at(1_700_000_000)),
            "Wed Nov 15 2023 00:13:20 GMT+0200 (Ora legale dell’Europa centrale)"
        );
        // Summer: still +2, same as CEST
        assert_eq!(
            build_timestamp_at(at(1_690_000_000)),
            "Sat Jul 22 2023 06:26:40 GMT+0200 (Ora legale dell’Europa centrale)"
        );
    }

    #[test]
    fn timestamp_pads_day() {
        // 2024-03-05T10:00:00Z
        let ts = build_timestamp_at(at(1_709_632_800));
        assert!(ts.starts_with("Tue Mar 05 2024 12:00:00 "), "{ts}");
    }

    #[test]
    fn ms_winter_and_summer() {
        assert_eq!(
            ms_to_local_iso(Some(1_700_000_000_000)).as_deref(),
            Some("2023-11-14T23:13:20+01:00")
        );
        assert_eq!(
            ms_to_local_iso(Some(1_690_000_000_000)).as_deref(),
            Some("2023-07-22T06:26:40+02:00")
        );
    }

    #[test]
    fn ms_truncates_to_seconds() {
        assert_eq!(
            ms_to_local_iso(Some(1_700_000_000_999)).as_deref(),
            Some("2023-11-14T23:13:20+01:00")
        );
    }

    #[test]
    fn ms_absent_is_none() {
        assert_eq!(ms_to_local_iso(None), None);
        assert_eq!(ms_to_local_iso(Some(0)), None);
    }
}
