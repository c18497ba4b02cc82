//! Station departure/arrival boards.

use std::fmt;

use serde::Serialize;

use super::Platform;

/// Which half of a station board.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Direction {
    Departures,
    Arrivals,
}

impl Direction {
    /// Upstream key holding the scheduled time for this direction.
    pub fn scheduled_time_key(self) -> &'static str {
        match self {
            Direction::Departures => "compOrarioPartenza",
            Direction::Arrivals => "compOrarioArrivo",
        }
    }

    /// Upstream key naming the other end of the journey.
    pub fn counterpart_key(self) -> &'static str {
        match self {
            Direction::Departures => "destinazione",
            Direction::Arrivals => "origine",
        }
    }

    pub fn planned_platform_key(self) -> &'static str {
        match self {
            Direction::Departures => "binarioProgrammatoPartenzaDescrizione",
            Direction::Arrivals => "binarioProgrammatoArrivoDescrizione",
        }
    }

    pub fn actual_platform_key(self) -> &'static str {
        match self {
            Direction::Departures => "binarioEffettivoPartenzaDescrizione",
            Direction::Arrivals => "binarioEffettivoArrivoDescrizione",
        }
    }
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Direction::Departures => f.write_str("departures"),
            Direction::Arrivals => f.write_str("arrivals"),
        }
    }
}

/// Delay as reported on a board: minutes when known, otherwise upstream text.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum Delay {
    Minutes(i64),
    Text(String),
}

impl Delay {
    /// The "?" placeholder used when upstream omits the delay.
    pub fn unknown() -> Self {
        Delay::Text("?".to_string())
    }
}

/// One train on a station board.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StationBoardEntry {
    /// Display number, e.g. "REG 2345".
    pub train_number: String,

    /// Scheduled time at this station ("HH:MM").
    pub scheduled_time: String,

    /// Destination for departures, origin for arrivals.
    pub counterpart_station: String,

    pub delay: Delay,

    pub planned_platform: Platform,

    pub actual_platform: Platform,
}

/// Departures and arrivals for one station.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct StationBoard {
    pub departures: Vec<StationBoardEntry>,
    pub arrivals: Vec<StationBoardEntry>,
}

impl StationBoard {
    /// Entries for one direction.
    pub fn entries(&self, direction: Direction) -> &[StationBoardEntry] {
        match direction {
            Direction::Departures => &self.departures,
            Direction::Arrivals => &self.arrivals,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.departures.is_empty() && self.arrivals.is_empty()
    }
}
