//! DNS response codes.

use num_enum::{IntoPrimitive, TryFromPrimitive};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Response code carried in the low four bits of the header flag word.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    Default,
    IntoPrimitive,
    TryFromPrimitive,
    Serialize,
    Deserialize,
)]
#[repr(u8)]
pub enum ResponseCode {
    /// No error.
    #[default]
    NoError = 0,
    /// The server could not interpret the query.
    FormErr = 1,
    /// The server failed to complete the query.
    ServFail = 2,
    /// The queried name does not exist.
    NXDomain = 3,
    /// The query kind is not implemented.
    NotImp = 4,
    /// The server refuses to answer.
    Refused = 5,
}

impl ResponseCode {
    /// Returns true for NOERROR.
    pub fn is_success(self) -> bool {
        self == Self::NoError
    }
}

impl fmt::Display for ResponseCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let text = match self {
            Self::NoError => "NOERROR",
            Self::FormErr => "FORMERR",
            Self::ServFail => "SERVFAIL",
            Self::NXDomain => "NXDOMAIN",
            Self::NotImp => "NOTIMP",
            Self::Refused => "REFUSED",
        };
        f.write_str(text)
    }
}
