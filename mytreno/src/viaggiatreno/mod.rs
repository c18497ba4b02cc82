//! ViaggiaTreno (Trenitalia live information) client.
//!
//! This module talks to the public ViaggiaTreno REST API and turns its
//! responses into the records in [`crate::domain`].
//!
//! Key characteristics of ViaggiaTreno:
//! - No authentication; everything is a path-parameterized GET
//! - Board requests need a JavaScript-style timestamp as a path segment
//! - Per-train endpoints are keyed by origin station id + train number +
//!   departure timestamp, which only the autocomplete endpoint can supply
//! - Bodies are loosely typed JSON, except autocomplete which is `|`
//!   delimited text

mod board;
mod client;
mod error;
mod mock;
mod raw;
mod resolve;
mod tracker;

pub use board::{BOARD_LIMIT, board_entry, fetch_station_board, fetch_station_board_at};
pub use client::{
    BoardStatusPolicy, DEFAULT_BASE_URL, DEFAULT_TIMEOUT_SECS, RawResponse, Transport,
    ViaggiaTrenoClient, ViaggiaTrenoConfig,
};
pub use error::{Endpoint, FetchCause, FetchError};
pub use mock::StubTransport;
pub use raw::{FromField, RawRecord};
pub use resolve::{ResolvedTrain, parse_autocomplete, resolve_train};
pub use tracker::{build_status, fetch_train_status, train_stop};
