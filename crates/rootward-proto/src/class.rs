//! DNS record classes.

use serde::{Deserialize, Serialize};
use std::fmt;

/// A DNS record class.
///
/// IN is the only class the resolver handles; anything else is carried
/// numerically and its RDATA kept opaque.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum RecordClass {
    /// Internet (RFC 1035).
    IN,
    /// Any other class, carried as its numeric code.
    Unknown(u16),
}

impl RecordClass {
    /// Converts from the wire value.
    pub fn from_u16(value: u16) -> Self {
        match value {
            1 => Self::IN,
            other => Self::Unknown(other),
        }
    }

    /// Returns the wire value.
    pub fn to_u16(self) -> u16 {
        match self {
            Self::IN => 1,
            Self::Unknown(value) => value,
        }
    }
}

impl fmt::Display for RecordClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::IN => f.write_str("IN"),
            Self::Unknown(value) => write!(f, "CLASS{value}"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn round_trip() {
        assert_eq!(RecordClass::from_u16(1), RecordClass::IN);
        assert_eq!(RecordClass::IN.to_u16(), 1);
        assert_eq!(RecordClass::from_u16(1500).to_u16(), 1500);
        assert_eq!(RecordClass::from_u16(3).to_string(), "CLASS3");
    }
}
