//! # Rootward RRSet Cache
//!
//! A concurrency-safe map from [`Question`] to an [`Rrset`] with an
//! absolute expiry instant. Reads clamp the returned TTL to the time left
//! until expiry, so successive hits see monotonically decreasing TTLs;
//! expired entries are evicted lazily by the read that finds them.
//!
//! No negative results are stored: NXDOMAIN surfaces to the caller per
//! resolution. Keys are canonicalised (lower-cased) on both insert and
//! lookup.

#![warn(missing_docs)]
#![warn(clippy::all)]

use dashmap::DashMap;
use rootward_proto::{Question, Rrset};
use tracing::trace;

/// A cached RRSet and the instant it stops being valid.
#[derive(Debug, Clone)]
struct CacheEntry {
    /// Absolute expiry, seconds since the Unix epoch.
    expires_at: u64,
    rrset: Rrset,
}

/// Process-wide RRSet cache.
///
/// Entries are immutable once stored; re-inserting a key replaces the
/// previous entry wholesale. Concurrent `get`/`set` from independent
/// resolutions are safe; last writer wins on a racing key.
#[derive(Debug, Default)]
pub struct Cache {
    entries: DashMap<Question, CacheEntry>,
}

impl Cache {
    /// Creates an empty cache.
    pub fn new() -> Self {
        Self::default()
    }

    /// Looks up `key` at time `now` (seconds since the Unix epoch).
    ///
    /// On a hit the returned RRSet carries the remaining TTL
    /// (`expiry - now`). A hit on an expired entry removes it and reports
    /// a miss.
    pub fn get(&self, key: &Question, now: u64) -> Option<(Rrset, u32)> {
        let canonical = canonical_key(key);

        if let Some(entry) = self.entries.get(&canonical) {
            if now < entry.expires_at {
                let remaining = (entry.expires_at - now).min(u64::from(u32::MAX)) as u32;
                let mut rrset = entry.rrset.clone();
                rrset.ttl = remaining;
                trace!(key = %canonical, remaining, "cache hit");
                return Some((rrset, remaining));
            }
        } else {
            return None;
        }

        // Expired: evict outside the read guard.
        trace!(key = %canonical, "cache entry expired");
        self.entries
            .remove_if(&canonical, |_, entry| now >= entry.expires_at);
        None
    }

    /// Stores `rrset` under `key`, valid until `expires_at` (seconds since
    /// the Unix epoch). Replaces any existing entry.
    pub fn set(&self, key: Question, rrset: Rrset, expires_at: u64) {
        let canonical = canonical_key(&key);
        trace!(key = %canonical, expires_at, "cache store");
        self.entries.insert(canonical, CacheEntry { expires_at, rrset });
    }

    /// Number of entries, expired ones included until a read evicts them.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns true if the cache holds no entries.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

fn canonical_key(key: &Question) -> Question {
    Question::new(key.qname.canonical(), key.qtype, key.qclass)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rootward_proto::{Name, RData, RecordClass, RecordType};
    use std::str::FromStr;
    use std::sync::Arc;

    fn rrset(name: &str, addr: &str, ttl: u32) -> Rrset {
        Rrset::new(
            Name::from_str(name).unwrap(),
            RecordType::A,
            RecordClass::IN,
            ttl,
            vec![RData::A(addr.parse().unwrap())],
        )
    }

    fn key(name: &str) -> Question {
        Question::a(Name::from_str(name).unwrap())
    }

    #[test]
    fn hit_reports_remaining_ttl() {
        let cache = Cache::new();
        let now = 1_700_000_000;
        cache.set(key("foo.example."), rrset("foo.example.", "192.0.2.1", 600), now + 600);

        let (hit, ttl) = cache.get(&key("foo.example."), now).unwrap();
        assert_eq!(ttl, 600);
        assert_eq!(hit.ttl, 600);

        let (_, ttl) = cache.get(&key("foo.example."), now + 123).unwrap();
        assert_eq!(ttl, 477);
    }

    #[test]
    fn ttl_decreases_monotonically() {
        let cache = Cache::new();
        let now = 1_700_000_000;
        cache.set(key("foo.example."), rrset("foo.example.", "192.0.2.1", 300), now + 300);

        let (_, first) = cache.get(&key("foo.example."), now + 10).unwrap();
        let (_, second) = cache.get(&key("foo.example."), now + 200).unwrap();
        assert!(second <= first);
    }

    #[test]
    fn expiry_is_a_miss_and_evicts() {
        let cache = Cache::new();
        let now = 1_700_000_000;
        cache.set(key("foo.example."), rrset("foo.example.", "192.0.2.1", 600), now + 600);

        assert!(cache.get(&key("foo.example."), now + 600).is_none());
        assert!(cache.is_empty());
    }

    #[test]
    fn lookup_is_case_insensitive() {
        let cache = Cache::new();
        let now = 1_700_000_000;
        cache.set(
            key("FOO.Example."),
            rrset("FOO.Example.", "192.0.2.1", 60),
            now + 60,
        );

        assert!(cache.get(&key("foo.example."), now).is_some());
    }

    #[test]
    fn reinsert_replaces_entry() {
        let cache = Cache::new();
        let now = 1_700_000_000;
        cache.set(key("foo.example."), rrset("foo.example.", "192.0.2.1", 60), now + 60);
        cache.set(key("foo.example."), rrset("foo.example.", "192.0.2.9", 600), now + 600);

        let (hit, ttl) = cache.get(&key("foo.example."), now).unwrap();
        assert_eq!(ttl, 600);
        assert_eq!(hit.rdatas[0], RData::A("192.0.2.9".parse().unwrap()));
        assert_eq!(cache.len(), 1);
    }

    #[test]
    fn concurrent_access_is_safe() {
        let cache = Arc::new(Cache::new());
        let now = 1_700_000_000u64;

        let writers: Vec<_> = (0..4u32)
            .map(|i| {
                let cache = Arc::clone(&cache);
                std::thread::spawn(move || {
                    for n in 0..100 {
                        let name = format!("host{}.example.", n % 10);
                        cache.set(
                            key(&name),
                            rrset(&name, "192.0.2.1", 60 + i),
                            now + 60,
                        );
                        cache.get(&key(&name), now);
                    }
                })
            })
            .collect();
        for writer in writers {
            writer.join().unwrap();
        }

        assert_eq!(cache.len(), 10);
    }
}
