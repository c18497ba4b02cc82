//! Platform descriptors.
//!
//! ViaggiaTreno reports platforms as free text. Large stations often use
//! Roman numerals ("XIV"), which we decode to plain numbers so that boards
//! read consistently.

use std::fmt;

use serde::Serialize;

/// Sentinel used upstream (and by us) when no platform is known.
pub const UNKNOWN_PLATFORM: &str = "N/A";

const ROMAN_NUMERALS: [&str; 20] = [
    "I", "II", "III", "IV", "V", "VI", "VII", "VIII", "IX", "X", "XI", "XII", "XIII", "XIV", "XV",
    "XVI", "XVII", "XVIII", "XIX", "XX",
];

/// A platform as shown on a board.
///
/// Serializes untagged: `Number(14)` becomes `14`, `Text("3 Est")` becomes
/// `"3 Est"`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
#[serde(untagged)]
pub enum Platform {
    /// Platform decoded from a Roman numeral I..XX.
    Number(u8),
    /// Anything else, passed through verbatim.
    Text(String),
}

impl Platform {
    /// The "N/A" platform.
    pub fn unknown() -> Self {
        Platform::Text(UNKNOWN_PLATFORM.to_string())
    }
}

impl fmt::Display for Platform {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Platform::Number(n) => write!(f, "{n}"),
            Platform::Text(s) => f.write_str(s),
        }
    }
}

/// Decode a platform descriptor.
///
/// Exact matches of the Roman numerals I through XX become
/// `Platform::Number(1..=20)`. Every other input, including `"N/A"`, the
/// empty string and lowercase numerals, is returned unchanged.
///
/// # Examples
///
/// ```
/// use mytreno::domain::{Platform, decode_platform};
///
/// assert_eq!(decode_platform("XIV"), Platform::Number(14));
/// assert_eq!(decode_platform("N/A"), Platform::Text("N/A".into()));
/// assert_eq!(decode_platform("2 Est"), Platform::Text("2 Est".into()));
/// ```
pub fn decode_platform(descriptor: &str) -> Platform {
    ROMAN_NUMERALS
        .iter()
        .position(|numeral| *numeral == descriptor)
        .map(|idx| Platform::Number(idx as u8 + 1))
        .unwrap_or_else(|| Platform::Text(descriptor.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn decodes_every_numeral() {
        for (idx, numeral) in ROMAN_NUMERALS.iter().enumerate() {
            assert_eq!(decode_platform(numeral), Platform::Number(idx as u8 + 1));
        }
        assert_eq!(decode_platform("XIV"), Platform::Number(14));
        assert_eq!(decode_platform("XX"), Platform::Number(20));
    }

    #[test]
    fn sentinels_pass_through() {
        assert_eq!(decode_platform("N/A"), Platform::Text("N/A".into()));
        assert_eq!(decode_platform(""), Platform::Text(String::new()));
        assert_eq!(decode_platform("xiv"), Platform::Text("xiv".into()));
        assert_eq!(decode_platform("XXI"), Platform::Text("XXI".into()));
        assert_eq!(decode_platform(" IV"), Platform::Text(" IV".into()));
    }

    #[test]
    fn serializes_untagged() {
        assert_eq!(serde_json::to_string(&Platform::Number(7)).unwrap(), "7");
        assert_eq!(
            serde_json::to_string(&Platform::unknown()).unwrap(),
            "\"N/A\""
        );
    }

    #[test]
    fn display() {
        assert_eq!(Platform::Number(3).to_string(), "3");
        assert_eq!(Platform::Text("1 Tronco".into()).to_string(), "1 Tronco");
    }
}
