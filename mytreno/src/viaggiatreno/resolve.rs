//! Train number lookup.
//!
//! Every per-train endpoint needs the origin station id and a departure
//! timestamp alongside the train number. The autocomplete endpoint answers
//! with plain text like
//!
//! ```text
//! 9650 - MILANO CENTRALE|9650-S01700-1731366000000
//! ```
//!
//! from which both can be recovered.

use tracing::debug;

use super::client::{Transport, get_ok};
use super::error::{Endpoint, FetchCause, FetchError};

/// Where and when a train run starts, as upstream identifies it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedTrain {
    pub station_id: String,
    /// Epoch milliseconds, kept verbatim for use as a path segment.
    pub timestamp: String,
}

/// Resolve a train number to its origin station and timestamp.
pub async fn resolve_train<T: Transport>(
    transport: &T,
    train_number: &str,
) -> Result<ResolvedTrain, FetchError> {
    let path = format!("{}/{}", Endpoint::Autocomplete, train_number);
    let body = get_ok(transport, Endpoint::Autocomplete, &path).await?;

    let text = body.trim();
    if text.is_empty() {
        return Err(FetchError::failed(
            Endpoint::Autocomplete,
            FetchCause::EmptyBody,
        ));
    }

    let resolved = parse_autocomplete(text)?;
    debug!(
        train_number,
        station_id = %resolved.station_id,
        timestamp = %resolved.timestamp,
        "Resolved train"
    );
    Ok(resolved)
}

/// Parse an autocomplete body.
///
/// Splits on `|`, drops the first element, then scans the remaining
/// candidates from last to first. The first candidate whose leading
/// whitespace-delimited token splits on `-` into exactly three parts
/// (`<name>-<station_id>-<timestamp>`) wins.
pub fn parse_autocomplete(text: &str) -> Result<ResolvedTrain, FetchError> {
    let candidates: Vec<&str> = text.split('|').skip(1).collect();
    candidates
        .into_iter()
        .rev()
        .find_map(parse_candidate)
        .ok_or_else(|| FetchError::ParseFailed {
            raw_body: text.to_string(),
            reason: "no valid candidate".to_string(),
        })
}

fn parse_candidate(candidate: &str) -> Option<ResolvedTrain> {
    let token = candidate.split_whitespace().next()?;
    let parts: Vec<&str> = token.split('-').collect();
    match parts.as_slice() {
        [_, station_id, timestamp] => Some(ResolvedTrain {
            station_id: (*station_id).to_string(),
            timestamp: (*timestamp).to_string(),
        }),
        _ => None,
    }
}
