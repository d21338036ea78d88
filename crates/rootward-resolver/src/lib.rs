//! # Rootward Resolver
//!
//! The iterative resolution engine: starting from a root hint address it
//! walks the delegation chain one zone cut at a time, minimising query
//! names when asked to (RFC 7816), following glue from the additional
//! section and filling the shared RRSet cache. When DNSSEC is requested
//! it threads a per-call trusted DS set from the root anchor down to the
//! answer so the AD verdict rests on an unbroken chain.
//!
//! ## Example
//!
//! ```rust,ignore
//! use rootward_cache::Cache;
//! use rootward_proto::{Name, Question};
//! use rootward_resolver::{DnsClient, Resolver, ResolveOptions, RootHints};
//! use std::str::FromStr;
//!
//! let resolver = Resolver::new(RootHints::builtin());
//! let cache = Cache::new();
//! let client = DnsClient::new();
//! let question = Question::a(Name::from_str("example.com.")?);
//! let answer = resolver
//!     .resolve(&question, ResolveOptions::default(), &client, &cache)
//!     .await?;
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]

mod hints;
mod resolver;
mod transport;

pub use hints::{HintsError, RootHints};
pub use resolver::{Answer, ResolveOptions, Resolver};
pub use transport::{DnsClient, Network, Transport};

use rootward_dnssec::DnssecError;
use thiserror::Error;

/// Result type alias for resolution operations.
pub type Result<T> = std::result::Result<T, ResolveError>;

/// Why a resolution failed.
#[derive(Error, Debug)]
pub enum ResolveError {
    /// A response could not be parsed.
    #[error("malformed response: {0}")]
    Format(#[from] rootward_proto::Error),

    /// The final response carried NXDOMAIN.
    #[error("name does not exist")]
    NxDomain,

    /// A server answered SERVFAIL, or resolution hit a dead end that is
    /// not a missing delegation.
    #[error("server failure")]
    ServerFailure,

    /// A referral was required but the authority section was empty or
    /// unusable.
    #[error("no delegation available")]
    NoDelegation,

    /// The per-call query budget was exhausted.
    #[error("query budget exceeded")]
    BudgetExceeded,

    /// The socket failed or the exchange timed out.
    #[error("transport failure: {0}")]
    Transport(#[from] std::io::Error),

    /// An exchange exceeded its per-attempt timeout.
    #[error("query timed out")]
    Timeout,

    /// DNSSEC was requested but no trust anchor is configured.
    #[error("no trust anchor configured")]
    NoTrustAnchor,

    /// The chain of trust could not be established.
    #[error("dnssec validation failed: {0}")]
    Bogus(#[from] DnssecError),
}
