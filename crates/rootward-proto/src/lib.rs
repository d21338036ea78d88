//! # Rootward DNS Protocol Library
//!
//! Wire-format types for the rootward resolver: domain names with RFC 1035
//! message compression, the fixed 12-octet header, questions, resource
//! records with typed RDATA, RRSet grouping, and whole-message parse/emit.
//!
//! ## Example
//!
//! ```rust,ignore
//! use rootward_proto::{Message, Name, Question, RecordClass, RecordType};
//! use std::str::FromStr;
//!
//! let question = Question::new(Name::from_str("example.com.")?, RecordType::A, RecordClass::IN);
//! let request = Message::request(question, true, true, false)?;
//! let wire = request.to_bytes()?;
//! let parsed = Message::parse(&wire)?;
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]
#![allow(clippy::module_name_repetitions)]

pub mod class;
pub mod error;
pub mod header;
pub mod message;
pub mod name;
pub mod opcode;
pub mod question;
pub mod rcode;
pub mod rdata;
pub mod record;
pub mod rtype;

pub use class::RecordClass;
pub use error::{Error, Result};
pub use header::{Header, HeaderFlags};
pub use message::Message;
pub use name::{arpa_name, Name};
pub use opcode::OpCode;
pub use question::Question;
pub use rcode::ResponseCode;
pub use rdata::RData;
pub use record::{group_records, ResourceRecord, Rrset, RrsetMap};
pub use rtype::RecordType;

/// Maximum length of a single DNS label (RFC 1035).
pub const MAX_LABEL_LENGTH: usize = 63;

/// Maximum textual length of a domain name, trailing dot excluded.
pub const MAX_NAME_LENGTH: usize = 253;

/// Maximum wire-format length of a domain name, length octets included.
pub const MAX_WIRE_NAME_LENGTH: usize = 255;

/// UDP receive buffer size; also the payload size advertised via EDNS.
pub const UDP_PAYLOAD_SIZE: u16 = 1500;

/// DNS port.
pub const DNS_PORT: u16 = 53;
