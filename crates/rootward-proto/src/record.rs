//! Resource records and RRSet grouping.

use crate::class::RecordClass;
use crate::error::{Error, Result};
use crate::name::{decode_name, Name};
use crate::question::Question;
use crate::rdata::RData;
use crate::rtype::RecordType;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;

/// A single resource record.
///
/// # Wire Format
///
/// ```text
/// /                      NAME                     /
/// |                      TYPE                     |
/// |                     CLASS                     |
/// |                      TTL                      |
/// |                   RDLENGTH                    |
/// /                     RDATA                     /
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResourceRecord {
    /// Owner name.
    pub name: Name,
    /// Record type.
    pub rtype: RecordType,
    /// Record class.
    pub rclass: RecordClass,
    /// Time to live, seconds relative to observation.
    pub ttl: u32,
    /// Typed record data.
    pub rdata: RData,
}

impl ResourceRecord {
    /// Creates a record, taking the type from the RDATA.
    pub fn new(name: Name, rclass: RecordClass, ttl: u32, rdata: RData) -> Self {
        Self {
            name,
            rtype: rdata.rtype(),
            rclass,
            ttl,
            rdata,
        }
    }

    /// Parses a record at `offset`, returning it and the next offset.
    pub fn parse(msg: &[u8], offset: usize) -> Result<(Self, usize)> {
        let (name, next) = decode_name(msg, offset)?;
        let fixed = msg
            .get(next..next + 10)
            .ok_or(Error::UnexpectedEof { offset: next + 10 })?;

        let rtype = RecordType::from_u16(u16::from_be_bytes([fixed[0], fixed[1]]));
        let rclass = RecordClass::from_u16(u16::from_be_bytes([fixed[2], fixed[3]]));
        let ttl = u32::from_be_bytes([fixed[4], fixed[5], fixed[6], fixed[7]]);
        let rdlength = u16::from_be_bytes([fixed[8], fixed[9]]);

        let rdata_start = next + 10;
        let rdata = RData::parse(rtype, rclass, msg, rdata_start, rdlength)?;

        Ok((
            Self {
                name,
                rtype,
                rclass,
                ttl,
                rdata,
            },
            rdata_start + usize::from(rdlength),
        ))
    }

    /// Emits the record against the message produced so far.
    ///
    /// The owner name and any compressible names inside the RDATA point
    /// into `msg` where possible; both are resolved against the buffer as
    /// it stood before this record, so pointer targets stay valid.
    pub fn to_bytes(&self, msg: &[u8]) -> Result<Vec<u8>> {
        let name = self.name.encode_compressed(msg);
        let rdata = self.rdata.encode(msg)?;
        if rdata.len() > usize::from(u16::MAX) {
            return Err(Error::invalid_rdata("RDATA", "exceeds 65535 octets"));
        }

        let mut out = Vec::with_capacity(name.len() + 10 + rdata.len());
        out.extend_from_slice(&name);
        out.extend_from_slice(&self.rtype.to_u16().to_be_bytes());
        out.extend_from_slice(&self.rclass.to_u16().to_be_bytes());
        out.extend_from_slice(&self.ttl.to_be_bytes());
        out.extend_from_slice(&(rdata.len() as u16).to_be_bytes());
        out.extend_from_slice(&rdata);
        Ok(out)
    }

    /// The grouping key: (owner, type, class) with the owner canonicalised.
    pub fn key(&self) -> Question {
        Question::new(self.name.canonical(), self.rtype, self.rclass)
    }
}

impl fmt::Display for ResourceRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} {} {} {} {}",
            self.name, self.ttl, self.rclass, self.rtype, self.rdata
        )
    }
}

/// An RRSet: every record sharing (owner, type, class).
///
/// The RRSet is the unit of caching, TTL accounting and DNSSEC
/// verification; its TTL is the minimum across its members and its owner
/// is stored in canonical lower-case form.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Rrset {
    /// Canonical owner name.
    pub name: Name,
    /// Shared record type.
    pub rtype: RecordType,
    /// Shared record class.
    pub rclass: RecordClass,
    /// Minimum TTL across members.
    pub ttl: u32,
    /// Member record data, in arrival order.
    pub rdatas: Vec<RData>,
}

impl Rrset {
    /// Creates an RRSet from its parts.
    pub fn new(
        name: Name,
        rtype: RecordType,
        rclass: RecordClass,
        ttl: u32,
        rdatas: Vec<RData>,
    ) -> Self {
        Self {
            name: name.canonical(),
            rtype,
            rclass,
            ttl,
            rdatas,
        }
    }

    /// Expands the set back into resource records, all carrying the set
    /// TTL.
    pub fn records(&self) -> Vec<ResourceRecord> {
        self.rdatas
            .iter()
            .map(|rdata| ResourceRecord {
                name: self.name.clone(),
                rtype: self.rtype,
                rclass: self.rclass,
                ttl: self.ttl,
                rdata: rdata.clone(),
            })
            .collect()
    }

    /// Number of member records.
    pub fn len(&self) -> usize {
        self.rdatas.len()
    }

    /// Returns true if the set has no members.
    pub fn is_empty(&self) -> bool {
        self.rdatas.is_empty()
    }
}

impl fmt::Display for Rrset {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for record in self.records() {
            writeln!(f, "{record}")?;
        }
        Ok(())
    }
}

/// RRSets keyed by (owner, type, class).
pub type RrsetMap = HashMap<Question, Rrset>;

/// Groups records into RRSets.
///
/// Owners are canonicalised to lower case; each set's TTL is the minimum
/// of its members'. Grouping is idempotent: regrouping the expanded
/// records of a map yields an equal map.
pub fn group_records(records: &[ResourceRecord]) -> RrsetMap {
    let mut sets = RrsetMap::new();
    for record in records {
        let key = record.key();
        let set = sets.entry(key).or_insert_with(|| Rrset {
            name: record.name.canonical(),
            rtype: record.rtype,
            rclass: record.rclass,
            ttl: record.ttl,
            rdatas: Vec::with_capacity(1),
        });
        set.ttl = set.ttl.min(record.ttl);
        set.rdatas.push(record.rdata.clone());
    }
    sets
}
