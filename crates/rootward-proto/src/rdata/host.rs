//! Name-bearing RDATA: MX and SOA.

use crate::error::{Error, Result};
use crate::name::{decode_name, Name};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Mail exchange record data (RFC 1035 §3.3.9).
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct MX {
    /// Preference; lower is preferred.
    pub preference: u16,
    /// Host willing to act as mail exchange.
    pub exchange: Name,
}

impl MX {
    pub(crate) fn parse(msg: &[u8], offset: usize, rdlength: u16) -> Result<Self> {
        if rdlength < 3 {
            return Err(Error::invalid_rdata("MX", format!("{rdlength} octets")));
        }
        let pref = msg
            .get(offset..offset + 2)
            .ok_or(Error::UnexpectedEof { offset: offset + 2 })?;
        let (exchange, _) = decode_name(msg, offset + 2)?;
        Ok(Self {
            preference: u16::from_be_bytes([pref[0], pref[1]]),
            exchange,
        })
    }

    pub(crate) fn encode(&self, msg: &[u8]) -> Vec<u8> {
        let mut out = self.preference.to_be_bytes().to_vec();
        out.extend_from_slice(&self.exchange.encode_compressed(msg));
        out
    }
}

impl fmt::Display for MX {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.preference, self.exchange)
    }
}

/// Start-of-authority record data (RFC 1035 §3.3.13).
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SOA {
    /// Primary master name.
    pub mname: Name,
    /// Responsible mailbox, encoded as a name.
    pub rname: Name,
    /// Zone serial number.
    pub serial: u32,
    /// Secondary refresh interval, seconds.
    pub refresh: u32,
    /// Retry interval after failed refresh, seconds.
    pub retry: u32,
    /// Expiry of zone data on secondaries, seconds.
    pub expire: u32,
    /// Minimum TTL / negative-caching TTL, seconds.
    pub minimum: u32,
}

impl SOA {
    pub(crate) fn parse(msg: &[u8], offset: usize, rdlength: u16) -> Result<Self> {
        let end = offset + usize::from(rdlength);
        let (mname, next) = decode_name(msg, offset)?;
        let (rname, next) = decode_name(msg, next)?;
        let fixed = msg
            .get(next..next + 20)
            .ok_or(Error::UnexpectedEof { offset: next + 20 })?;
        if next + 20 > end {
            return Err(Error::invalid_rdata("SOA", "fields overrun RDLENGTH"));
        }
        let word = |i: usize| u32::from_be_bytes([fixed[i], fixed[i + 1], fixed[i + 2], fixed[i + 3]]);
        Ok(Self {
            mname,
            rname,
            serial: word(0),
            refresh: word(4),
            retry: word(8),
            expire: word(12),
            minimum: word(16),
        })
    }

    pub(crate) fn encode(&self, msg: &[u8]) -> Vec<u8> {
        let mut out = self.mname.encode_compressed(msg);
        out.extend_from_slice(&self.rname.encode_compressed(msg));
        for field in [self.serial, self.refresh, self.retry, self.expire, self.minimum] {
            out.extend_from_slice(&field.to_be_bytes());
        }
        out
    }
}

impl fmt::Display for SOA {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} {} {} {} {} {} {}",
            self.mname, self.rname, self.serial, self.refresh, self.retry, self.expire, self.minimum
        )
    }
}
