//! The iterative resolution walk.
//!
//! A resolution starts at a root hint address and follows referrals one
//! zone cut at a time. With QNAME minimisation each intermediate probe
//! asks only `(ancestor, NS)`; without it the caller's question goes out
//! at every step. Glue from the additional section supplies nameserver
//! addresses; a glue-less referral triggers a recursive address
//! resolution against the same client, so the per-call budget bounds the
//! whole tree of work.
//!
//! With DNSSEC enabled the walk threads a trusted DS set downward: it
//! starts as the root anchor, and every referral that carries a signed DS
//! RRSet replaces it after the parent's ZSK verifies the signature. The
//! final answer is verified under the last zone's ZSK and the result
//! reported through the `authenticated` flag.

use crate::hints::RootHints;
use crate::transport::{Network, Transport};
use crate::{ResolveError, Result};
use futures::future::{BoxFuture, FutureExt};
use rootward_cache::Cache;
use rootward_dnssec::{verify_rrset, zone_signing_key, DnssecError, KeyFetcher};
use rootward_proto::{
    group_records, rdata::DS, Message, Name, Question, RData, RecordType, ResourceRecord,
    RrsetMap, DNS_PORT,
};
use std::net::{IpAddr, SocketAddr};
use std::time::{SystemTime, UNIX_EPOCH};
use tracing::{debug, trace};

/// Per-call resolution switches.
#[derive(Debug, Clone, Copy)]
pub struct ResolveOptions {
    /// Ask each zone cut only for the next delegation (RFC 7816).
    pub qname_minimisation: bool,
    /// Validate the chain of trust and report it via
    /// [`Answer::authenticated`].
    pub dnssec: bool,
}

impl Default for ResolveOptions {
    fn default() -> Self {
        Self {
            qname_minimisation: true,
            dnssec: false,
        }
    }
}

/// A finished resolution.
#[derive(Debug, Clone)]
pub struct Answer {
    /// The answer-section records, unchanged; a CNAME pointing elsewhere
    /// is returned as-is, not chased.
    pub records: Vec<ResourceRecord>,
    /// True iff the full DNSSEC chain from the root anchor verified.
    pub authenticated: bool,
}

/// The iterative resolver.
///
/// Holds only read-only startup state (root hints and the trust anchor).
/// Per-call state, the query budget and the trusted DS set, lives in the
/// client and on the stack, so independent resolutions never share
/// anything but the cache.
#[derive(Debug)]
pub struct Resolver {
    hints: RootHints,
    trust_anchor: Option<DS>,
}

impl Resolver {
    /// Creates a resolver without DNSSEC support.
    pub fn new(hints: RootHints) -> Self {
        Self {
            hints,
            trust_anchor: None,
        }
    }

    /// Creates a resolver anchored at the given root DS.
    pub fn with_trust_anchor(hints: RootHints, anchor: DS) -> Self {
        Self {
            hints,
            trust_anchor: Some(anchor),
        }
    }

    /// Resolves `question`, consulting and filling `cache`.
    ///
    /// A cache hit returns immediately with `authenticated` false: the
    /// cache keeps no signature provenance. On a miss the delegation
    /// chain is walked from a root hint; every RRSet the walk observes is
    /// stored under its full key with an absolute expiry.
    pub async fn resolve<C>(
        &self,
        question: &Question,
        options: ResolveOptions,
        client: &C,
        cache: &Cache,
    ) -> Result<Answer>
    where
        C: Transport + KeyFetcher,
    {
        self.resolve_inner(question.clone(), options, client, cache)
            .await
    }

    /// Boxed so nameserver-address resolution can recurse.
    fn resolve_inner<'a, C>(
        &'a self,
        question: Question,
        options: ResolveOptions,
        client: &'a C,
        cache: &'a Cache,
    ) -> BoxFuture<'a, Result<Answer>>
    where
        C: Transport + KeyFetcher,
    {
        async move { self.walk(question, options, client, cache).await }.boxed()
    }

    async fn walk<C>(
        &self,
        question: Question,
        options: ResolveOptions,
        client: &C,
        cache: &Cache,
    ) -> Result<Answer>
    where
        C: Transport + KeyFetcher,
    {
        debug!(question = %question, "resolve");

        if let Some((rrset, remaining)) = cache.get(&question, unix_now()) {
            trace!(question = %question, remaining, "cache hit");
            return Ok(Answer {
                records: rrset.records(),
                authenticated: false,
            });
        }

        let mut name_server = self.hints.primary_address();
        let mut trusted_ds = if options.dnssec {
            vec![self
                .trust_anchor
                .clone()
                .ok_or(ResolveError::NoTrustAnchor)?]
        } else {
            Vec::new()
        };

        // Every ancestor below the root, then the question's own name.
        let mut probes = question.qname.ancestors();
        probes.push(question.qname.clone());
        let steps = probes.len();

        'walk: for (step, pname) in probes.into_iter().enumerate() {
            let probe = if options.qname_minimisation {
                Question::new(pname.clone(), RecordType::NS, question.qclass)
            } else {
                question.clone()
            };
            let is_final = probe == question;

            debug!(server = %name_server, probe = %probe, "probe");
            let response = client
                .exchange(
                    Network::Udp,
                    SocketAddr::new(name_server, DNS_PORT),
                    probe,
                    false,
                    options.dnssec,
                    options.dnssec,
                )
                .await?;

            if response.is_servfail() {
                return Err(ResolveError::ServerFailure);
            }
            if is_final && response.is_nxdomain() {
                return Err(ResolveError::NxDomain);
            }

            let answer_sets = group_records(&response.answers);
            let authority_sets = group_records(&response.authority);
            let additional_sets = group_records(&response.additional);

            // A referral out of a signed zone carries the child's DS set;
            // verifying it under the parent's ZSK hands trust down a zone.
            if options.dnssec {
                self.advance_trust(&mut trusted_ds, &pname, &authority_sets, name_server, client)
                    .await?;
            }

            let now = unix_now();
            for sets in [&answer_sets, &authority_sets, &additional_sets] {
                store_rrsets(cache, sets, now);
            }

            if !response.answers.is_empty() && is_final {
                return self
                    .finish(&question, &response, name_server, &trusted_ds, options, client)
                    .await;
            }

            // In-bailiwick shortcut: the additionals already answer us.
            if let Some(rrset) = additional_sets.get(&question) {
                trace!(question = %question, "answered from additional section");
                return Ok(Answer {
                    records: rrset.records(),
                    authenticated: false,
                });
            }

            if response.authority.is_empty() {
                return Err(ResolveError::NoDelegation);
            }

            // Referral: prefer a nameserver whose glue is attached.
            for rrset in authority_sets.values() {
                if rrset.rtype != RecordType::NS {
                    continue;
                }
                for rdata in &rrset.rdatas {
                    let RData::NS(ns_name) = rdata else { continue };
                    let glue_key = Question::a(ns_name.clone());
                    if let Some(glue) = additional_sets.get(&glue_key) {
                        if let Some(addr) = glue.rdatas.iter().find_map(RData::as_a) {
                            trace!(ns = %ns_name, %addr, "following glued referral");
                            name_server = IpAddr::V4(addr);
                            continue 'walk;
                        }
                    }
                }
            }

            // No glue: resolve the first delegated nameserver's address.
            let Some(ns_name) = response.authority[0].rdata.as_ns() else {
                // A non-NS authority (typically an SOA) is tolerated at
                // minimised intermediate steps.
                if options.qname_minimisation && step + 1 < steps {
                    continue;
                }
                return Err(ResolveError::NoDelegation);
            };

            trace!(ns = %ns_name, "referral without glue, resolving nameserver");
            let ns_answer = self
                .resolve_inner(Question::a(ns_name.clone()), options, client, cache)
                .await?;
            let addr = ns_answer
                .records
                .iter()
                .find_map(|record| record.rdata.as_a())
                .ok_or(ResolveError::ServerFailure)?;
            name_server = IpAddr::V4(addr);
        }

        // Minimised probes never asked the final type; do it now.
        debug!(server = %name_server, question = %question, "final query");
        let response = client
            .exchange(
                Network::Udp,
                SocketAddr::new(name_server, DNS_PORT),
                question.clone(),
                false,
                options.dnssec,
                options.dnssec,
            )
            .await?;

        if response.is_servfail() {
            return Err(ResolveError::ServerFailure);
        }
        if response.is_nxdomain() {
            return Err(ResolveError::NxDomain);
        }
        if response.answers.is_empty() {
            return Err(ResolveError::NoDelegation);
        }

        store_rrsets(cache, &group_records(&response.answers), unix_now());
        self.finish(&question, &response, name_server, &trusted_ds, options, client)
            .await
    }

    /// Replaces `trusted` with the child DS set when the referral carries
    /// one, after the parent's ZSK verifies its signature.
    async fn advance_trust<C>(
        &self,
        trusted: &mut Vec<DS>,
        pname: &Name,
        authority_sets: &RrsetMap,
        name_server: IpAddr,
        client: &C,
    ) -> Result<()>
    where
        C: Transport + KeyFetcher,
    {
        let ds_key = Question::in_class(pname.clone(), RecordType::DS);
        let Some(ds_rrset) = authority_sets.get(&ds_key) else {
            return Ok(());
        };
        let rrsig_key = Question::in_class(pname.clone(), RecordType::RRSIG);
        let rrsig_set =
            authority_sets
                .get(&rrsig_key)
                .ok_or_else(|| DnssecError::MissingRrsig {
                    name: pname.to_string(),
                    rtype: RecordType::DS.to_string(),
                })?;

        let mut last = ResolveError::Bogus(DnssecError::MissingRrsig {
            name: pname.to_string(),
            rtype: RecordType::DS.to_string(),
        });
        for rdata in &rrsig_set.rdatas {
            let RData::RRSIG(rrsig) = rdata else { continue };
            if rrsig.type_covered != RecordType::DS {
                continue;
            }

            // The DS RRSet is served and signed by the parent zone.
            let zsk =
                zone_signing_key(client, &rrsig.signer_name, name_server, trusted).await?;
            match verify_rrset(&zsk, ds_rrset, rrsig) {
                Ok(()) => {
                    debug!(zone = %pname, "trust handed down to child DS set");
                    *trusted = ds_rrset
                        .rdatas
                        .iter()
                        .filter_map(|rdata| match rdata {
                            RData::DS(ds) => Some(ds.clone()),
                            _ => None,
                        })
                        .collect();
                    return Ok(());
                }
                Err(err) => last = err.into(),
            }
        }
        Err(last)
    }

    /// Wraps up a final answer, verifying it when DNSSEC was requested.
    async fn finish<C>(
        &self,
        question: &Question,
        response: &Message,
        name_server: IpAddr,
        trusted_ds: &[DS],
        options: ResolveOptions,
        client: &C,
    ) -> Result<Answer>
    where
        C: Transport + KeyFetcher,
    {
        let records = response.answers.clone();
        if !options.dnssec {
            return Ok(Answer {
                records,
                authenticated: false,
            });
        }

        let answer_sets = group_records(&response.answers);
        let Some(rrset) = answer_sets.get(question) else {
            // The answer does not match the question directly (a CNAME
            // for an address query): hand it back unverified.
            return Ok(Answer {
                records,
                authenticated: false,
            });
        };

        let rrsig_key = Question::new(question.qname.clone(), RecordType::RRSIG, question.qclass);
        let rrsig_set = answer_sets
            .get(&rrsig_key)
            .ok_or_else(|| DnssecError::MissingRrsig {
                name: question.qname.to_string(),
                rtype: question.qtype.to_string(),
            })?;

        let mut last = ResolveError::Bogus(DnssecError::MissingRrsig {
            name: question.qname.to_string(),
            rtype: question.qtype.to_string(),
        });
        for rdata in &rrsig_set.rdatas {
            let RData::RRSIG(rrsig) = rdata else { continue };
            if rrsig.type_covered != question.qtype {
                continue;
            }

            let zsk =
                zone_signing_key(client, &rrsig.signer_name, name_server, trusted_ds).await?;
            match verify_rrset(&zsk, rrset, rrsig) {
                Ok(()) => {
                    debug!(question = %question, "answer verified, AD set");
                    return Ok(Answer {
                        records,
                        authenticated: true,
                    });
                }
                Err(err) => last = err.into(),
            }
        }
        Err(last)
    }
}

/// Stores every RRSet under its full key with an absolute expiry. The
/// OPT pseudo-record is not cacheable data.
fn store_rrsets(cache: &Cache, sets: &RrsetMap, now: u64) {
    for (key, rrset) in sets {
        if rrset.rtype == RecordType::OPT {
            continue;
        }
        cache.set(key.clone(), rrset.clone(), now + u64::from(rrset.ttl));
    }
}

fn unix_now() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or_default()
        .as_secs()
}
