//! Root server hints.
//!
//! Hints come from a named.root-style zone file; the resolver starts
//! every walk at one of the listed IPv4 addresses. A built-in copy of the
//! IANA list is available for when no file is configured.

use rootward_proto::{RecordType, ResourceRecord};
use rootward_zone::{Zone, ZoneError};
use std::net::IpAddr;
use std::path::Path;
use thiserror::Error;

/// The IANA root server list, named.root style.
const BUILTIN_ROOT_HINTS: &str = r#"
.                        3600000      NS    A.ROOT-SERVERS.NET.
.                        3600000      NS    B.ROOT-SERVERS.NET.
.                        3600000      NS    C.ROOT-SERVERS.NET.
.                        3600000      NS    D.ROOT-SERVERS.NET.
.                        3600000      NS    E.ROOT-SERVERS.NET.
.                        3600000      NS    F.ROOT-SERVERS.NET.
.                        3600000      NS    G.ROOT-SERVERS.NET.
.                        3600000      NS    H.ROOT-SERVERS.NET.
.                        3600000      NS    I.ROOT-SERVERS.NET.
.                        3600000      NS    J.ROOT-SERVERS.NET.
.                        3600000      NS    K.ROOT-SERVERS.NET.
.                        3600000      NS    L.ROOT-SERVERS.NET.
.                        3600000      NS    M.ROOT-SERVERS.NET.
A.ROOT-SERVERS.NET.      3600000      A     198.41.0.4
A.ROOT-SERVERS.NET.      3600000      AAAA  2001:503:ba3e::2:30
B.ROOT-SERVERS.NET.      3600000      A     199.9.14.201
B.ROOT-SERVERS.NET.      3600000      AAAA  2801:1b8:10::b
C.ROOT-SERVERS.NET.      3600000      A     192.33.4.12
C.ROOT-SERVERS.NET.      3600000      AAAA  2001:500:2::c
D.ROOT-SERVERS.NET.      3600000      A     199.7.91.13
D.ROOT-SERVERS.NET.      3600000      AAAA  2001:500:2d::d
E.ROOT-SERVERS.NET.      3600000      A     192.203.230.10
E.ROOT-SERVERS.NET.      3600000      AAAA  2001:500:a8::e
F.ROOT-SERVERS.NET.      3600000      A     192.5.5.241
F.ROOT-SERVERS.NET.      3600000      AAAA  2001:500:2f::f
G.ROOT-SERVERS.NET.      3600000      A     192.112.36.4
G.ROOT-SERVERS.NET.      3600000      AAAA  2001:500:12::d0d
H.ROOT-SERVERS.NET.      3600000      A     198.97.190.53
H.ROOT-SERVERS.NET.      3600000      AAAA  2001:500:1::53
I.ROOT-SERVERS.NET.      3600000      A     192.36.148.17
I.ROOT-SERVERS.NET.      3600000      AAAA  2001:7fe::53
J.ROOT-SERVERS.NET.      3600000      A     192.58.128.30
J.ROOT-SERVERS.NET.      3600000      AAAA  2001:503:c27::2:30
K.ROOT-SERVERS.NET.      3600000      A     193.0.14.129
K.ROOT-SERVERS.NET.      3600000      AAAA  2001:7fd::1
L.ROOT-SERVERS.NET.      3600000      A     199.7.83.42
L.ROOT-SERVERS.NET.      3600000      AAAA  2001:500:9f::42
M.ROOT-SERVERS.NET.      3600000      A     202.12.27.33
M.ROOT-SERVERS.NET.      3600000      AAAA  2001:dc3::35
"#;

/// Errors raised while loading root hints.
#[derive(Error, Debug)]
pub enum HintsError {
    /// The hints file could not be read or parsed.
    #[error(transparent)]
    Zone(#[from] ZoneError),

    /// The hints carried no IPv4 root server address.
    #[error("root hints contain no A record")]
    NoAddress,
}

/// Root server names and addresses, read-only after startup.
#[derive(Debug, Clone)]
pub struct RootHints {
    /// Root NS records.
    pub nameservers: Vec<ResourceRecord>,
    /// Root server address records (A and AAAA).
    pub addresses: Vec<ResourceRecord>,
    /// First IPv4 address in the hints; where every walk starts.
    primary: IpAddr,
}

impl RootHints {
    /// Loads hints from a named.root-style file.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, HintsError> {
        Self::from_zone(Zone::from_file(path)?)
    }

    /// Builds hints from an already-parsed zone.
    pub fn from_zone(zone: Zone) -> Result<Self, HintsError> {
        let mut nameservers = Vec::new();
        let mut addresses = Vec::new();
        let mut primary = None;

        for record in zone.records {
            if record.rtype == RecordType::NS {
                nameservers.push(record);
            } else {
                if primary.is_none() {
                    if let Some(addr) = record.rdata.as_a() {
                        primary = Some(IpAddr::V4(addr));
                    }
                }
                addresses.push(record);
            }
        }

        Ok(Self {
            nameservers,
            addresses,
            primary: primary.ok_or(HintsError::NoAddress)?,
        })
    }

    /// The built-in IANA root server list.
    pub fn builtin() -> Self {
        Self::from_zone(Zone::from_str(BUILTIN_ROOT_HINTS).expect("built-in hints parse"))
            .expect("built-in hints carry addresses")
    }

    /// The address iterative walks start from.
    pub fn primary_address(&self) -> IpAddr {
        self.primary
    }
}
