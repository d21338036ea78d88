//! # Rootward Zone Files
//!
//! A reader for master-file zone data in the named.root style: lines of
//! whitespace-separated `name ttl class type rdata` with `$ORIGIN` and
//! `$TTL` directives and `;` comments. `@` stands for the origin and
//! unqualified names are suffixed with it.
//!
//! This is what loads the resolver's root hints; it also reads the record
//! types an authoritative data set carries (A, AAAA, NS, CNAME, MX, TXT,
//! DS, RRSIG, DNSKEY, NSEC). SOA lines are skipped. Names are lowercased
//! on load.

#![warn(missing_docs)]
#![warn(clippy::all)]

use rootward_proto::{
    rdata::{DNSKEY, DS, MX, NSEC, RRSIG, TXT},
    Name, RData, RecordClass, RecordType, ResourceRecord,
};
use std::path::Path;
use std::str::FromStr;
use thiserror::Error;
use tracing::debug;

/// Result type alias for zone loading.
pub type Result<T> = std::result::Result<T, ZoneError>;

/// Errors raised while reading a zone file.
#[derive(Error, Debug)]
pub enum ZoneError {
    /// The file could not be read.
    #[error("cannot read zone file: {0}")]
    Io(#[from] std::io::Error),

    /// A `$ORIGIN` directive without a fully-qualified name.
    #[error("$ORIGIN must be fully qualified, got {0:?}")]
    BadOrigin(String),

    /// A `$TTL` directive with a non-numeric value.
    #[error("$TTL must be numeric, got {0:?}")]
    BadTtl(String),

    /// A record line that could not be interpreted.
    #[error("invalid record on line {line}: {message}")]
    BadRecord {
        /// 1-based line number.
        line: usize,
        /// What was wrong.
        message: String,
    },

    /// Invalid name or RDATA field content.
    #[error(transparent)]
    Proto(#[from] rootward_proto::Error),
}

/// A parsed zone: its origin, default TTL and records in file order.
#[derive(Debug, Clone, Default)]
pub struct Zone {
    /// `$ORIGIN`, fully qualified, or empty if never set.
    pub origin: String,
    /// `$TTL` default, seconds.
    pub ttl: u32,
    /// The records, in file order.
    pub records: Vec<ResourceRecord>,
}

impl Zone {
    /// Reads a zone from a file.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let text = std::fs::read_to_string(path)?;
        Self::from_str(&text)
    }

    /// Reads a zone from master-file text.
    #[allow(clippy::should_implement_trait)]
    pub fn from_str(text: &str) -> Result<Self> {
        let mut zone = Zone::default();

        for (index, line) in text.lines().enumerate() {
            let fields: Vec<&str> = line.split_whitespace().collect();
            let Some(first) = fields.first() else {
                continue;
            };
            if first.starts_with(';') {
                continue;
            }

            match *first {
                "$ORIGIN" => {
                    let origin = fields.get(1).copied().unwrap_or("");
                    if !origin.ends_with('.') {
                        return Err(ZoneError::BadOrigin(origin.to_string()));
                    }
                    zone.origin = origin.to_string();
                }
                "$TTL" => {
                    let value = fields.get(1).copied().unwrap_or("");
                    zone.ttl = value
                        .parse()
                        .map_err(|_| ZoneError::BadTtl(value.to_string()))?;
                }
                _ => {
                    if let Some(record) = zone.parse_record(&fields, index + 1)? {
                        zone.records.push(record);
                    }
                }
            }
        }

        debug!(
            origin = %zone.origin,
            records = zone.records.len(),
            "zone loaded"
        );
        Ok(zone)
    }

    /// Qualifies a possibly-relative name against the origin.
    fn qualify(&self, field: &str) -> String {
        if field == "@" {
            self.origin.clone()
        } else if field.ends_with('.') {
            field.to_string()
        } else {
            format!("{}.{}", field, self.origin)
        }
    }

    fn parse_record(&self, fields: &[&str], line: usize) -> Result<Option<ResourceRecord>> {
        let bad = |message: String| ZoneError::BadRecord { line, message };

        let owner = self.qualify(fields[0]).to_lowercase();
        let mut rest = &fields[1..];

        // Optional TTL, then optional class.
        let ttl = match rest.first().and_then(|f| f.parse::<u32>().ok()) {
            Some(ttl) => {
                rest = &rest[1..];
                ttl
            }
            None => self.ttl,
        };
        if rest.first() == Some(&"IN") {
            rest = &rest[1..];
        }

        let Some((&type_field, data)) = rest.split_first() else {
            return Err(bad("missing record type".to_string()));
        };

        let rdata = match (type_field, data.len()) {
            ("A", 1) => RData::A(
                data[0]
                    .parse()
                    .map_err(|_| bad(format!("bad IPv4 address {:?}", data[0])))?,
            ),
            ("AAAA", 1) => RData::AAAA(
                data[0]
                    .parse()
                    .map_err(|_| bad(format!("bad IPv6 address {:?}", data[0])))?,
            ),
            ("NS", 1) => RData::NS(Name::from_str(&self.qualify(data[0]).to_lowercase())?),
            ("CNAME", 1) => RData::CNAME(Name::from_str(&self.qualify(data[0]))?),
            ("MX", 2) => RData::MX(MX {
                preference: data[0]
                    .parse()
                    .map_err(|_| bad(format!("bad MX preference {:?}", data[0])))?,
                exchange: Name::from_str(&self.qualify(data[1]))?,
            }),
            ("TXT", _) if !data.is_empty() => RData::TXT(TXT::new(
                data.iter().map(|f| f.trim_matches('"').to_string()).collect(),
            )?),
            ("DS", _) => RData::DS(DS::from_presentation(data)?),
            ("RRSIG", _) => RData::RRSIG(RRSIG::from_presentation(data)?),
            ("DNSKEY", _) => RData::DNSKEY(DNSKEY::from_presentation(data)?),
            ("NSEC", _) => RData::NSEC(NSEC::from_presentation(data)?),
            // SOA lines carry no data this resolver serves.
            ("SOA", _) => return Ok(None),
            _ => return Err(bad(format!("unsupported record {fields:?}"))),
        };

        Ok(Some(ResourceRecord::new(
            Name::from_str(&owner)?,
            RecordClass::IN,
            ttl,
            rdata,
        )))
    }

    /// Records of the given type, in file order.
    pub fn records_of_type(&self, rtype: RecordType) -> impl Iterator<Item = &ResourceRecord> {
        self.records.iter().filter(move |r| r.rtype == rtype)
    }
}
