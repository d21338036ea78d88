//! DNS record types.

use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// A DNS record type.
///
/// The variants cover every type the resolver interprets; other codes are
/// carried numerically with opaque RDATA.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum RecordType {
    /// IPv4 address (RFC 1035).
    A,
    /// Authoritative name server (RFC 1035).
    NS,
    /// Canonical name alias (RFC 1035).
    CNAME,
    /// Start of authority (RFC 1035).
    SOA,
    /// Domain name pointer (RFC 1035).
    PTR,
    /// Mail exchange (RFC 1035).
    MX,
    /// Text strings (RFC 1035).
    TXT,
    /// IPv6 address (RFC 3596).
    AAAA,
    /// EDNS(0) pseudo-record (RFC 6891).
    OPT,
    /// Delegation signer (RFC 4034).
    DS,
    /// RRSet signature (RFC 4034).
    RRSIG,
    /// Next secure (RFC 4034).
    NSEC,
    /// DNS public key (RFC 4034).
    DNSKEY,
    /// Any other type, carried as its numeric code.
    Unknown(u16),
}

impl RecordType {
    /// Converts from the wire value.
    pub fn from_u16(value: u16) -> Self {
        match value {
            1 => Self::A,
            2 => Self::NS,
            5 => Self::CNAME,
            6 => Self::SOA,
            12 => Self::PTR,
            15 => Self::MX,
            16 => Self::TXT,
            28 => Self::AAAA,
            41 => Self::OPT,
            43 => Self::DS,
            46 => Self::RRSIG,
            47 => Self::NSEC,
            48 => Self::DNSKEY,
            other => Self::Unknown(other),
        }
    }

    /// Returns the wire value.
    pub fn to_u16(self) -> u16 {
        match self {
            Self::A => 1,
            Self::NS => 2,
            Self::CNAME => 5,
            Self::SOA => 6,
            Self::PTR => 12,
            Self::MX => 15,
            Self::TXT => 16,
            Self::AAAA => 28,
            Self::OPT => 41,
            Self::DS => 43,
            Self::RRSIG => 46,
            Self::NSEC => 47,
            Self::DNSKEY => 48,
            Self::Unknown(value) => value,
        }
    }

    /// Returns the mnemonic, if the type has one.
    pub fn mnemonic(self) -> Option<&'static str> {
        Some(match self {
            Self::A => "A",
            Self::NS => "NS",
            Self::CNAME => "CNAME",
            Self::SOA => "SOA",
            Self::PTR => "PTR",
            Self::MX => "MX",
            Self::TXT => "TXT",
            Self::AAAA => "AAAA",
            Self::OPT => "OPT",
            Self::DS => "DS",
            Self::RRSIG => "RRSIG",
            Self::NSEC => "NSEC",
            Self::DNSKEY => "DNSKEY",
            Self::Unknown(_) => return None,
        })
    }

}

impl FromStr for RecordType {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        Ok(match s {
            "A" => Self::A,
            "NS" => Self::NS,
            "CNAME" => Self::CNAME,
            "SOA" => Self::SOA,
            "PTR" => Self::PTR,
            "MX" => Self::MX,
            "TXT" => Self::TXT,
            "AAAA" => Self::AAAA,
            "OPT" => Self::OPT,
            "DS" => Self::DS,
            "RRSIG" => Self::RRSIG,
            "NSEC" => Self::NSEC,
            "DNSKEY" => Self::DNSKEY,
            other => {
                return Err(Error::invalid_presentation(format!(
                    "unknown record type {other:?}"
                )))
            }
        })
    }
}

impl fmt::Display for RecordType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.mnemonic() {
            Some(text) => f.write_str(text),
            None => write!(f, "TYPE{}", self.to_u16()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn wire_values() {
        for (rtype, value) in [
            (RecordType::A, 1),
            (RecordType::NS, 2),
            (RecordType::CNAME, 5),
            (RecordType::SOA, 6),
            (RecordType::PTR, 12),
            (RecordType::MX, 15),
            (RecordType::TXT, 16),
            (RecordType::AAAA, 28),
            (RecordType::OPT, 41),
            (RecordType::DS, 43),
            (RecordType::RRSIG, 46),
            (RecordType::NSEC, 47),
            (RecordType::DNSKEY, 48),
        ] {
            assert_eq!(rtype.to_u16(), value);
            assert_eq!(RecordType::from_u16(value), rtype);
        }
        assert_eq!(RecordType::from_u16(99), RecordType::Unknown(99));
    }

    #[test]
    fn mnemonic_round_trip() {
        for text in ["A", "NS", "MX", "DNSKEY", "RRSIG"] {
            let rtype: RecordType = text.parse().unwrap();
            assert_eq!(rtype.to_string(), text);
        }
        assert!("BOGUS".parse::<RecordType>().is_err());
        assert_eq!(RecordType::Unknown(99).to_string(), "TYPE99");
    }
}
