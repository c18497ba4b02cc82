//! ViaggiaTreno fetch error types.

use std::fmt;

use crate::domain::Direction;

/// Upstream endpoint a request was sent to.
///
/// Displays as the path segment used in the URL, which is also what shows
/// up in logs and sensor error messages.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Endpoint {
    /// `partenze`: departures board
    Departures,
    /// `arrivi`: arrivals board
    Arrivals,
    /// `cercaNumeroTrenoTrenoAutocomplete`: train number lookup
    Autocomplete,
    /// `andamentoTreno`: train overview
    Overview,
    /// `tratteCanvas`: full stop list
    Stops,
}

impl Endpoint {
    pub fn path_segment(self) -> &'static str {
        match self {
            Endpoint::Departures => "partenze",
            Endpoint::Arrivals => "arrivi",
            Endpoint::Autocomplete => "cercaNumeroTrenoTrenoAutocomplete",
            Endpoint::Overview => "andamentoTreno",
            Endpoint::Stops => "tratteCanvas",
        }
    }
}

impl From<Direction> for Endpoint {
    fn from(direction: Direction) -> Self {
        match direction {
            Direction::Departures => Endpoint::Departures,
            Direction::Arrivals => Endpoint::Arrivals,
        }
    }
}

impl fmt::Display for Endpoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.path_segment())
    }
}

/// Why a single request failed.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum FetchCause {
    /// Upstream answered with a status other than 200
    #[error("HTTP status {0}")]
    Status(u16),

    /// No response within the request timeout
    #[error("request timed out")]
    Timeout,

    /// Connection, TLS or body read failure
    #[error("transport error: {0}")]
    Transport(String),

    /// Body was not valid JSON
    #[error("invalid JSON: {0}")]
    Json(String),

    /// 200 with nothing in it; how the lookup reports unknown trains
    #[error("empty response body")]
    EmptyBody,
}

impl From<reqwest::Error> for FetchCause {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            FetchCause::Timeout
        } else {
            FetchCause::Transport(err.to_string())
        }
    }
}

/// Errors raised by a refresh cycle.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum FetchError {
    /// A request failed or returned something unusable
    #[error("fetch from {endpoint} failed: {cause}")]
    FetchFailed {
        endpoint: Endpoint,
        #[source]
        cause: FetchCause,
    },

    /// The train lookup answered but no candidate could be parsed
    #[error("could not parse train lookup: {reason} (raw='{raw_body}')")]
    ParseFailed { raw_body: String, reason: String },
}

impl FetchError {
    pub fn failed(endpoint: Endpoint, cause: FetchCause) -> Self {
        FetchError::FetchFailed { endpoint, cause }
    }

    /// The endpoint that failed, if this was a request failure.
    pub fn endpoint(&self) -> Option<Endpoint> {
        match self {
            FetchError::FetchFailed { endpoint, .. } => Some(*endpoint),
            FetchError::ParseFailed { .. } => None,
        }
    }
}
