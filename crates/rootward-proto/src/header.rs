//! The fixed 12-octet DNS message header.

use crate::error::{Error, Result};
use crate::opcode::OpCode;
use crate::rcode::ResponseCode;
use bitflags::bitflags;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Header size in octets.
pub const HEADER_SIZE: usize = 12;

bitflags! {
    /// Single-bit header flags.
    ///
    /// The opcode and response code share the same 16-bit word but are
    /// kept as separate [`Header`] fields.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
    pub struct HeaderFlags: u16 {
        /// Query (0) or response (1).
        const QR = 0x8000;
        /// Authoritative answer.
        const AA = 0x0400;
        /// Truncated response.
        const TC = 0x0200;
        /// Recursion desired.
        const RD = 0x0100;
        /// Recursion available.
        const RA = 0x0080;
        /// Reserved, must be zero.
        const Z  = 0x0040;
        /// Authenticated data (DNSSEC).
        const AD = 0x0020;
        /// Checking disabled (DNSSEC).
        const CD = 0x0010;
    }
}

/// A parsed DNS header.
///
/// # Wire Format
///
/// ```text
/// |                      ID                       |
/// |QR|   Opcode  |AA|TC|RD|RA| Z|AD|CD|   RCODE   |
/// |                    QDCOUNT                    |
/// |                    ANCOUNT                    |
/// |                    NSCOUNT                    |
/// |                    ARCOUNT                    |
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Header {
    /// Transaction identifier.
    pub id: u16,
    /// Single-bit flags.
    pub flags: HeaderFlags,
    /// Operation code.
    pub opcode: OpCode,
    /// Response code.
    pub rcode: ResponseCode,
    /// Question count.
    pub qd_count: u16,
    /// Answer record count.
    pub an_count: u16,
    /// Authority record count.
    pub ns_count: u16,
    /// Additional record count.
    pub ar_count: u16,
}

impl Header {
    /// Total resource records across the three record sections.
    pub fn record_count(&self) -> usize {
        usize::from(self.an_count) + usize::from(self.ns_count) + usize::from(self.ar_count)
    }

    /// Returns true if this header marks a response.
    pub fn is_response(&self) -> bool {
        self.flags.contains(HeaderFlags::QR)
    }

    /// Returns true if the response was truncated.
    pub fn is_truncated(&self) -> bool {
        self.flags.contains(HeaderFlags::TC)
    }

    /// Returns true if the answer is authoritative.
    pub fn is_authoritative(&self) -> bool {
        self.flags.contains(HeaderFlags::AA)
    }

    /// Returns true if the AD bit is set.
    pub fn is_authenticated(&self) -> bool {
        self.flags.contains(HeaderFlags::AD)
    }

    /// Parses the header from the front of a message.
    pub fn parse(data: &[u8]) -> Result<Self> {
        if data.len() < HEADER_SIZE {
            return Err(Error::BufferTooShort {
                expected: HEADER_SIZE,
                actual: data.len(),
            });
        }

        let id = u16::from_be_bytes([data[0], data[1]]);
        let word = u16::from_be_bytes([data[2], data[3]]);

        let opcode_value = ((word >> 11) & 0x0F) as u8;
        let opcode = OpCode::try_from(opcode_value).map_err(|_| Error::InvalidOpCode {
            value: opcode_value,
        })?;

        let rcode_value = (word & 0x0F) as u8;
        let rcode = ResponseCode::try_from(rcode_value).map_err(|_| Error::InvalidResponseCode {
            value: rcode_value,
        })?;

        let flags = HeaderFlags::from_bits_truncate(word);

        Ok(Self {
            id,
            flags,
            opcode,
            rcode,
            qd_count: u16::from_be_bytes([data[4], data[5]]),
            an_count: u16::from_be_bytes([data[6], data[7]]),
            ns_count: u16::from_be_bytes([data[8], data[9]]),
            ar_count: u16::from_be_bytes([data[10], data[11]]),
        })
    }

    /// Emits the header as 12 octets.
    pub fn to_bytes(&self) -> [u8; HEADER_SIZE] {
        let word = self.flags.bits()
            | (u16::from(u8::from(self.opcode)) << 11)
            | u16::from(u8::from(self.rcode));

        let mut out = [0u8; HEADER_SIZE];
        out[0..2].copy_from_slice(&self.id.to_be_bytes());
        out[2..4].copy_from_slice(&word.to_be_bytes());
        out[4..6].copy_from_slice(&self.qd_count.to_be_bytes());
        out[6..8].copy_from_slice(&self.an_count.to_be_bytes());
        out[8..10].copy_from_slice(&self.ns_count.to_be_bytes());
        out[10..12].copy_from_slice(&self.ar_count.to_be_bytes());
        out
    }
}

impl fmt::Display for Header {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            ";; ->>HEADER<<- opcode: {}, status: {}, id: {}",
            self.opcode, self.rcode, self.id
        )?;

        let mut flags = Vec::with_capacity(8);
        for (bit, text) in [
            (HeaderFlags::QR, "qr"),
            (HeaderFlags::AA, "aa"),
            (HeaderFlags::TC, "tc"),
            (HeaderFlags::RD, "rd"),
            (HeaderFlags::RA, "ra"),
            (HeaderFlags::Z, "z"),
            (HeaderFlags::AD, "ad"),
            (HeaderFlags::CD, "cd"),
        ] {
            if self.flags.contains(bit) {
                flags.push(text);
            }
        }

        write!(
            f,
            "\n;; flags: {}; QUERY: {}, ANSWER: {}, AUTHORITY: {}, ADDITIONAL: {}",
            flags.join(" "),
            self.qd_count,
            self.an_count,
            self.ns_count,
            self.ar_count
        )
    }
}
