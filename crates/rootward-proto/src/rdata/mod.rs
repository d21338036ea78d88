//! Typed record data.
//!
//! RDATA is a tagged sum keyed by record type. Each variant knows how to
//! parse itself out of a message (names inside RDATA may be compressed) and
//! how to emit itself against the growing message buffer. NS, CNAME, PTR,
//! MX and SOA names compress per RFC 1035 §3.3; DNSSEC record names never
//! compress per RFC 4034.

mod dnssec;
mod host;
mod text;

pub use dnssec::{DNSKEY, DS, NSEC, RRSIG};
pub use host::{MX, SOA};
pub use text::{decode_texts, encode_texts, TXT};

use crate::class::RecordClass;
use crate::error::{Error, Result};
use crate::name::{decode_name, Name};
use crate::rtype::RecordType;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::net::{Ipv4Addr, Ipv6Addr};

/// Parsed record data.
///
/// Unknown record types, and known types in classes other than IN, are
/// retained as opaque octets.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum RData {
    /// IPv4 address.
    A(Ipv4Addr),
    /// IPv6 address.
    AAAA(Ipv6Addr),
    /// Delegated name server.
    NS(Name),
    /// Canonical name alias target.
    CNAME(Name),
    /// Reverse-lookup pointer target.
    PTR(Name),
    /// Mail exchange.
    MX(MX),
    /// Start of authority.
    SOA(SOA),
    /// Character strings.
    TXT(TXT),
    /// EDNS(0) pseudo-record; payload size and flags live in the record's
    /// class and TTL fields, the body is empty.
    OPT,
    /// Delegation signer.
    DS(DS),
    /// RRSet signature.
    RRSIG(RRSIG),
    /// Next-secure denial record.
    NSEC(NSEC),
    /// Zone public key.
    DNSKEY(DNSKEY),
    /// Opaque octets for anything else.
    Unknown(UnknownRdata),
}

/// Raw RDATA for record types the resolver does not interpret.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct UnknownRdata {
    /// Numeric record type.
    pub rtype: u16,
    /// The unparsed octets.
    pub data: Vec<u8>,
}

impl RData {
    /// Parses RDATA of the given type.
    ///
    /// `msg` is the whole message so compression pointers inside the RDATA
    /// can be followed; the RDATA itself spans `offset..offset + rdlength`.
    /// Known types in classes other than IN stay opaque.
    pub fn parse(
        rtype: RecordType,
        rclass: RecordClass,
        msg: &[u8],
        offset: usize,
        rdlength: u16,
    ) -> Result<Self> {
        let end = offset + usize::from(rdlength);
        let slice = msg.get(offset..end).ok_or(Error::UnexpectedEof { offset: end })?;

        if rclass != RecordClass::IN && rtype != RecordType::OPT {
            return Ok(Self::Unknown(UnknownRdata {
                rtype: rtype.to_u16(),
                data: slice.to_vec(),
            }));
        }

        Ok(match rtype {
            RecordType::A => {
                let octets: [u8; 4] = slice
                    .try_into()
                    .map_err(|_| Error::invalid_rdata("A", format!("{} octets", slice.len())))?;
                Self::A(Ipv4Addr::from(octets))
            }
            RecordType::AAAA => {
                let octets: [u8; 16] = slice
                    .try_into()
                    .map_err(|_| Error::invalid_rdata("AAAA", format!("{} octets", slice.len())))?;
                Self::AAAA(Ipv6Addr::from(octets))
            }
            RecordType::NS => Self::NS(decode_name(msg, offset)?.0),
            RecordType::CNAME => Self::CNAME(decode_name(msg, offset)?.0),
            RecordType::PTR => Self::PTR(decode_name(msg, offset)?.0),
            RecordType::MX => Self::MX(MX::parse(msg, offset, rdlength)?),
            RecordType::SOA => Self::SOA(SOA::parse(msg, offset, rdlength)?),
            RecordType::TXT => Self::TXT(TXT::parse(slice)?),
            RecordType::OPT => Self::OPT,
            RecordType::DS => Self::DS(DS::parse(slice)?),
            RecordType::RRSIG => Self::RRSIG(RRSIG::parse(msg, offset, rdlength)?),
            RecordType::NSEC => Self::NSEC(NSEC::parse(msg, offset, rdlength)?),
            RecordType::DNSKEY => Self::DNSKEY(DNSKEY::parse(slice)?),
            RecordType::Unknown(code) => Self::Unknown(UnknownRdata {
                rtype: code,
                data: slice.to_vec(),
            }),
        })
    }

    /// Record type of this RDATA.
    pub fn rtype(&self) -> RecordType {
        match self {
            Self::A(_) => RecordType::A,
            Self::AAAA(_) => RecordType::AAAA,
            Self::NS(_) => RecordType::NS,
            Self::CNAME(_) => RecordType::CNAME,
            Self::PTR(_) => RecordType::PTR,
            Self::MX(_) => RecordType::MX,
            Self::SOA(_) => RecordType::SOA,
            Self::TXT(_) => RecordType::TXT,
            Self::OPT => RecordType::OPT,
            Self::DS(_) => RecordType::DS,
            Self::RRSIG(_) => RecordType::RRSIG,
            Self::NSEC(_) => RecordType::NSEC,
            Self::DNSKEY(_) => RecordType::DNSKEY,
            Self::Unknown(u) => RecordType::Unknown(u.rtype),
        }
    }

    /// Emits the RDATA against the message produced so far.
    ///
    /// Passing an empty `msg` yields the canonical uncompressed form used
    /// for DNSSEC signature input.
    pub fn encode(&self, msg: &[u8]) -> Result<Vec<u8>> {
        Ok(match self {
            Self::A(addr) => addr.octets().to_vec(),
            Self::AAAA(addr) => addr.octets().to_vec(),
            Self::NS(name) | Self::CNAME(name) | Self::PTR(name) => name.encode_compressed(msg),
            Self::MX(mx) => mx.encode(msg),
            Self::SOA(soa) => soa.encode(msg),
            Self::TXT(txt) => txt.encode()?,
            Self::OPT => Vec::new(),
            Self::DS(ds) => ds.encode(),
            Self::RRSIG(rrsig) => rrsig.encode(),
            Self::NSEC(nsec) => nsec.encode(),
            Self::DNSKEY(dnskey) => dnskey.encode(),
            Self::Unknown(u) => u.data.clone(),
        })
    }

    /// Returns the IPv4 address for A records.
    pub fn as_a(&self) -> Option<Ipv4Addr> {
        match self {
            Self::A(addr) => Some(*addr),
            _ => None,
        }
    }

    /// Returns the IPv6 address for AAAA records.
    pub fn as_aaaa(&self) -> Option<Ipv6Addr> {
        match self {
            Self::AAAA(addr) => Some(*addr),
            _ => None,
        }
    }

    /// Returns the nameserver name for NS records.
    pub fn as_ns(&self) -> Option<&Name> {
        match self {
            Self::NS(name) => Some(name),
            _ => None,
        }
    }
}

impl fmt::Display for RData {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::A(addr) => write!(f, "{addr}"),
            Self::AAAA(addr) => write!(f, "{addr}"),
            Self::NS(name) | Self::CNAME(name) | Self::PTR(name) => write!(f, "{name}"),
            Self::MX(mx) => write!(f, "{mx}"),
            Self::SOA(soa) => write!(f, "{soa}"),
            Self::TXT(txt) => write!(f, "{txt}"),
            Self::OPT => Ok(()),
            Self::DS(ds) => write!(f, "{ds}"),
            Self::RRSIG(rrsig) => write!(f, "{rrsig}"),
            Self::NSEC(nsec) => write!(f, "{nsec}"),
            Self::DNSKEY(dnskey) => write!(f, "{dnskey}"),
            Self::Unknown(u) => write!(f, "\\# {} octets of TYPE{}", u.data.len(), u.rtype),
        }
    }
}
