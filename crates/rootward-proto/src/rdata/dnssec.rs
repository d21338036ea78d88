//! DNSSEC record data: DS, RRSIG, NSEC, DNSKEY.
//!
//! Besides the wire format, these types parse the presentation format used
//! in zone files (`flags proto algo base64-key` and friends). Names inside
//! these records are never compressed on emission (RFC 4034 §6.2).

use crate::error::{Error, Result};
use crate::name::{decode_name, Name};
use crate::rtype::RecordType;
use chrono::{DateTime, NaiveDateTime};
use data_encoding::{BASE64, HEXUPPER_PERMISSIVE};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// RRSIG timestamp presentation layout (RFC 4034 §3.2).
const TIME_LAYOUT: &str = "%Y%m%d%H%M%S";

/// Joins presentation fields that may be split across whitespace (base64
/// and hex material is often wrapped in zone files).
fn join_fields(fields: &[&str]) -> String {
    fields.concat()
}

fn parse_u32(field: &str) -> Result<u32> {
    field
        .parse()
        .map_err(|_| Error::invalid_presentation(format!("bad integer {field:?}")))
}

fn parse_u16(field: &str) -> Result<u16> {
    field
        .parse()
        .map_err(|_| Error::invalid_presentation(format!("bad integer {field:?}")))
}

fn parse_u8(field: &str) -> Result<u8> {
    field
        .parse()
        .map_err(|_| Error::invalid_presentation(format!("bad integer {field:?}")))
}

fn parse_timestamp(field: &str) -> Result<u32> {
    let dt = NaiveDateTime::parse_from_str(field, TIME_LAYOUT)
        .map_err(|_| Error::invalid_presentation(format!("bad timestamp {field:?}")))?;
    Ok(dt.and_utc().timestamp() as u32)
}

fn format_timestamp(ts: u32) -> String {
    DateTime::from_timestamp(i64::from(ts), 0)
        .map(|dt| dt.format(TIME_LAYOUT).to_string())
        .unwrap_or_else(|| ts.to_string())
}

/// Delegation signer record data (RFC 4034 §5).
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct DS {
    /// Key tag of the child KSK.
    pub key_tag: u16,
    /// Signing algorithm number.
    pub algorithm: u8,
    /// Digest algorithm number.
    pub digest_type: u8,
    /// Digest of the child KSK.
    pub digest: Vec<u8>,
}

impl DS {
    pub(crate) fn parse(data: &[u8]) -> Result<Self> {
        if data.len() < 4 {
            return Err(Error::invalid_rdata("DS", format!("{} octets", data.len())));
        }
        Ok(Self {
            key_tag: u16::from_be_bytes([data[0], data[1]]),
            algorithm: data[2],
            digest_type: data[3],
            digest: data[4..].to_vec(),
        })
    }

    pub(crate) fn encode(&self) -> Vec<u8> {
        let mut out = self.key_tag.to_be_bytes().to_vec();
        out.push(self.algorithm);
        out.push(self.digest_type);
        out.extend_from_slice(&self.digest);
        out
    }

    /// Parses the presentation form: `key-tag algorithm digest-type hex`.
    /// The hex digest may be split across multiple fields.
    pub fn from_presentation(fields: &[&str]) -> Result<Self> {
        if fields.len() < 4 {
            return Err(Error::invalid_presentation("DS needs 4 fields"));
        }
        let hex = join_fields(&fields[3..]).to_ascii_uppercase();
        let digest = HEXUPPER_PERMISSIVE
            .decode(hex.as_bytes())
            .map_err(|e| Error::invalid_presentation(format!("bad DS digest: {e}")))?;
        Ok(Self {
            key_tag: parse_u16(fields[0])?,
            algorithm: parse_u8(fields[1])?,
            digest_type: parse_u8(fields[2])?,
            digest,
        })
    }
}

impl fmt::Display for DS {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} {} {} {}",
            self.key_tag,
            self.algorithm,
            self.digest_type,
            HEXUPPER_PERMISSIVE.encode(&self.digest)
        )
    }
}

/// RRSet signature record data (RFC 4034 §3).
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct RRSIG {
    /// Type of the RRSet this signature covers.
    pub type_covered: RecordType,
    /// Signing algorithm number.
    pub algorithm: u8,
    /// Label count of the owner name, wildcards excluded.
    pub labels: u8,
    /// TTL of the covered RRSet at signing time.
    pub original_ttl: u32,
    /// Expiration, seconds since the epoch.
    pub expiration: u32,
    /// Inception, seconds since the epoch.
    pub inception: u32,
    /// Key tag of the signing DNSKEY.
    pub key_tag: u16,
    /// Zone that produced the signature.
    pub signer_name: Name,
    /// The signature octets.
    pub signature: Vec<u8>,
}

impl RRSIG {
    pub(crate) fn parse(msg: &[u8], offset: usize, rdlength: u16) -> Result<Self> {
        let end = offset + usize::from(rdlength);
        let fixed = msg
            .get(offset..offset + 18)
            .ok_or(Error::UnexpectedEof {
                offset: offset + 18,
            })?;
        let (signer_name, next) = decode_name(msg, offset + 18)?;
        let signature = msg
            .get(next..end)
            .ok_or(Error::UnexpectedEof { offset: end })?
            .to_vec();
        Ok(Self {
            type_covered: RecordType::from_u16(u16::from_be_bytes([fixed[0], fixed[1]])),
            algorithm: fixed[2],
            labels: fixed[3],
            original_ttl: u32::from_be_bytes([fixed[4], fixed[5], fixed[6], fixed[7]]),
            expiration: u32::from_be_bytes([fixed[8], fixed[9], fixed[10], fixed[11]]),
            inception: u32::from_be_bytes([fixed[12], fixed[13], fixed[14], fixed[15]]),
            key_tag: u16::from_be_bytes([fixed[16], fixed[17]]),
            signer_name,
            signature,
        })
    }

    /// The RDATA with the signature field left off: the leading portion of
    /// the signed message. The signer name is emitted uncompressed.
    pub fn rdata_without_signature(&self) -> Vec<u8> {
        let mut out = Vec::with_capacity(18 + self.signer_name.wire_len());
        out.extend_from_slice(&self.type_covered.to_u16().to_be_bytes());
        out.push(self.algorithm);
        out.push(self.labels);
        out.extend_from_slice(&self.original_ttl.to_be_bytes());
        out.extend_from_slice(&self.expiration.to_be_bytes());
        out.extend_from_slice(&self.inception.to_be_bytes());
        out.extend_from_slice(&self.key_tag.to_be_bytes());
        out.extend_from_slice(&self.signer_name.encode());
        out
    }

    pub(crate) fn encode(&self) -> Vec<u8> {
        let mut out = self.rdata_without_signature();
        out.extend_from_slice(&self.signature);
        out
    }

    /// Parses the presentation form:
    /// `type algo labels ttl expiration inception key-tag signer base64`.
    /// The base64 signature may be split across multiple fields.
    pub fn from_presentation(fields: &[&str]) -> Result<Self> {
        if fields.len() < 9 {
            return Err(Error::invalid_presentation("RRSIG needs 9 fields"));
        }
        let signature = BASE64
            .decode(join_fields(&fields[8..]).as_bytes())
            .map_err(|e| Error::invalid_presentation(format!("bad RRSIG signature: {e}")))?;
        Ok(Self {
            type_covered: RecordType::from_str(fields[0])?,
            algorithm: parse_u8(fields[1])?,
            labels: parse_u8(fields[2])?,
            original_ttl: parse_u32(fields[3])?,
            expiration: parse_timestamp(fields[4])?,
            inception: parse_timestamp(fields[5])?,
            key_tag: parse_u16(fields[6])?,
            signer_name: Name::from_str(fields[7])?,
            signature,
        })
    }
}

impl fmt::Display for RRSIG {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} {} {} {} {} {} {} {} {}",
            self.type_covered,
            self.algorithm,
            self.labels,
            self.original_ttl,
            format_timestamp(self.expiration),
            format_timestamp(self.inception),
            self.key_tag,
            self.signer_name,
            BASE64.encode(&self.signature)
        )
    }
}

/// Next-secure record data (RFC 4034 §4), type bitmap window 0 only.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct NSEC {
    /// Next owner name in canonical zone order.
    pub next_domain: Name,
    /// Types present at the owner, from bitmap window 0.
    pub types: Vec<RecordType>,
}

impl NSEC {
    pub(crate) fn parse(msg: &[u8], offset: usize, rdlength: u16) -> Result<Self> {
        let end = offset + usize::from(rdlength);
        let (next_domain, mut pos) = decode_name(msg, offset)?;

        let mut types = Vec::new();
        while pos + 2 <= end {
            let window = msg[pos];
            let len = usize::from(msg[pos + 1]);
            let bitmap = msg
                .get(pos + 2..pos + 2 + len)
                .ok_or(Error::UnexpectedEof {
                    offset: pos + 2 + len,
                })?;
            if window == 0 {
                for (byte_index, &byte) in bitmap.iter().enumerate() {
                    for bit in 0..8usize {
                        if byte >> (7 - bit) & 1 == 1 {
                            types.push(RecordType::from_u16((byte_index * 8 + bit) as u16));
                        }
                    }
                }
            }
            pos += 2 + len;
        }

        Ok(Self { next_domain, types })
    }

    pub(crate) fn encode(&self) -> Vec<u8> {
        let mut out = self.next_domain.encode();

        let mut bitmap = [0u8; 32];
        let mut high = 0usize;
        for rtype in &self.types {
            let code = usize::from(rtype.to_u16());
            if code >= 256 {
                continue;
            }
            bitmap[code / 8] |= 0x80 >> (code % 8);
            high = high.max(code / 8 + 1);
        }
        if high > 0 {
            out.push(0);
            out.push(high as u8);
            out.extend_from_slice(&bitmap[..high]);
        }
        out
    }

    /// Parses the presentation form: `next-domain type [type ...]`.
    pub fn from_presentation(fields: &[&str]) -> Result<Self> {
        if fields.is_empty() {
            return Err(Error::invalid_presentation("NSEC needs a next domain"));
        }
        let mut types = Vec::with_capacity(fields.len() - 1);
        for field in &fields[1..] {
            types.push(RecordType::from_str(field)?);
        }
        Ok(Self {
            next_domain: Name::from_str(fields[0])?,
            types,
        })
    }
}

impl fmt::Display for NSEC {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.next_domain)?;
        for rtype in &self.types {
            write!(f, " {rtype}")?;
        }
        Ok(())
    }
}

/// Zone public key record data (RFC 4034 §2).
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct DNSKEY {
    /// Key flags; 256 marks a ZSK and 257 a KSK.
    pub flags: u16,
    /// Protocol, always 3.
    pub protocol: u8,
    /// Signing algorithm number.
    pub algorithm: u8,
    /// Public key material (RFC 3110 layout for RSA).
    pub public_key: Vec<u8>,
}

impl DNSKEY {
    /// Flags value of a zone-signing key.
    pub const ZSK_FLAGS: u16 = 256;
    /// Flags value of a key-signing key.
    pub const KSK_FLAGS: u16 = 257;

    /// Returns true for zone-signing keys.
    pub fn is_zsk(&self) -> bool {
        self.flags == Self::ZSK_FLAGS
    }

    /// Returns true for key-signing keys.
    pub fn is_ksk(&self) -> bool {
        self.flags == Self::KSK_FLAGS
    }

    pub(crate) fn parse(data: &[u8]) -> Result<Self> {
        if data.len() < 4 {
            return Err(Error::invalid_rdata(
                "DNSKEY",
                format!("{} octets", data.len()),
            ));
        }
        let protocol = data[2];
        if protocol != 3 {
            return Err(Error::invalid_rdata(
                "DNSKEY",
                format!("protocol {protocol}"),
            ));
        }
        Ok(Self {
            flags: u16::from_be_bytes([data[0], data[1]]),
            protocol,
            algorithm: data[3],
            public_key: data[4..].to_vec(),
        })
    }

    pub(crate) fn encode(&self) -> Vec<u8> {
        let mut out = self.flags.to_be_bytes().to_vec();
        out.push(self.protocol);
        out.push(self.algorithm);
        out.extend_from_slice(&self.public_key);
        out
    }

    /// Parses the presentation form: `flags protocol algorithm base64`.
    /// The base64 key may be split across multiple fields.
    pub fn from_presentation(fields: &[&str]) -> Result<Self> {
        if fields.len() < 4 {
            return Err(Error::invalid_presentation("DNSKEY needs 4 fields"));
        }
        let public_key = BASE64
            .decode(join_fields(&fields[3..]).as_bytes())
            .map_err(|e| Error::invalid_presentation(format!("bad DNSKEY key: {e}")))?;
        Ok(Self {
            flags: parse_u16(fields[0])?,
            protocol: parse_u8(fields[1])?,
            algorithm: parse_u8(fields[2])?,
            public_key,
        })
    }
}

impl fmt::Display for DNSKEY {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} {} {} {}",
            self.flags,
            self.protocol,
            self.algorithm,
            BASE64.encode(&self.public_key)
        )
    }
}
