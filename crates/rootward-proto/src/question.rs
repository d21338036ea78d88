//! The question section triple.

use crate::class::RecordClass;
use crate::error::Result;
use crate::name::{decode_name, Name};
use crate::rtype::RecordType;
use serde::{Deserialize, Serialize};
use std::fmt;

/// A DNS question: the (name, type, class) triple.
///
/// The same triple keys the RRSet cache and groups records into RRSets, so
/// equality and hashing follow the name's case-insensitive semantics.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Question {
    /// The name being queried.
    pub qname: Name,
    /// The record type being requested.
    pub qtype: RecordType,
    /// The query class.
    pub qclass: RecordClass,
}

impl Question {
    /// Creates a question.
    pub fn new(qname: Name, qtype: RecordType, qclass: RecordClass) -> Self {
        Self {
            qname,
            qtype,
            qclass,
        }
    }

    /// Creates an IN-class A question.
    pub fn a(qname: Name) -> Self {
        Self::new(qname, RecordType::A, RecordClass::IN)
    }

    /// Creates an IN-class question of the given type.
    pub fn in_class(qname: Name, qtype: RecordType) -> Self {
        Self::new(qname, qtype, RecordClass::IN)
    }

    /// Parses a question at `offset`, returning it and the next offset.
    pub fn parse(msg: &[u8], offset: usize) -> Result<(Self, usize)> {
        let (qname, next) = decode_name(msg, offset)?;
        let fixed = msg
            .get(next..next + 4)
            .ok_or(crate::error::Error::UnexpectedEof { offset: next + 4 })?;
        let qtype = RecordType::from_u16(u16::from_be_bytes([fixed[0], fixed[1]]));
        let qclass = RecordClass::from_u16(u16::from_be_bytes([fixed[2], fixed[3]]));
        Ok((
            Self {
                qname,
                qtype,
                qclass,
            },
            next + 4,
        ))
    }

    /// Emits the question; question names are never compressed.
    pub fn to_bytes(&self) -> Vec<u8> {
        let mut out = self.qname.encode();
        out.extend_from_slice(&self.qtype.to_u16().to_be_bytes());
        out.extend_from_slice(&self.qclass.to_u16().to_be_bytes());
        out
    }
}

impl fmt::Display for Question {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {} {}", self.qname, self.qclass, self.qtype)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    #[test]
    fn round_trip() {
        let q = Question::a(Name::from_str("example.com.").unwrap());
        let wire = q.to_bytes();
        let (parsed, next) = Question::parse(&wire, 0).unwrap();
        assert_eq!(parsed, q);
        assert_eq!(next, wire.len());
    }

    #[test]
    fn equality_ignores_case() {
        let a = Question::a(Name::from_str("EXAMPLE.com.").unwrap());
        let b = Question::a(Name::from_str("example.COM.").unwrap());
        assert_eq!(a, b);
    }
}
