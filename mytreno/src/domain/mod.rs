//! Domain types for mytreno.
//!
//! Normalized records built from ViaggiaTreno responses, plus the pure
//! helpers (platform decoding, timestamps) the fetchers rely on.

mod board;
mod platform;
mod time;
mod train;

pub use board::{Delay, Direction, StationBoard, StationBoardEntry};
pub use platform::{Platform, UNKNOWN_PLATFORM, decode_platform};
pub use time::{build_timestamp, build_timestamp_at, ms_to_local_iso};
pub use train::{TrainStatus, TrainStop, UNKNOWN_STATION, next_stop};
