//! In-process cache of serialized public responses.
//!
//! Entries expire after a fixed TTL. Keys are namespaced by resource
//! ([`ILLUSTRATIONS`], [`CHARACTERS`], [`CATEGORIES`]) so mutations can drop
//! everything a change may have affected with [`ResponseCache::invalidate_prefix`].
//!
//! Reads go through [`ResponseCache::lookup`]. A miss hands out a
//! [`FillTicket`] recording how many invalidations had touched the key at
//! that moment; [`ResponseCache::fill`] refuses to store the body if another
//! invalidation happened while it was being loaded.

use std::collections::HashMap;
use std::time::{Duration, Instant};

use serde_json::Value;
use tokio::sync::RwLock;

/// Key prefix for illustration listings and details.
pub const ILLUSTRATIONS: &str = "illustrations:";
/// Key prefix for character listings and details.
pub const CHARACTERS: &str = "characters:";
/// Key prefix for the category tree and category details.
pub const CATEGORIES: &str = "categories:";

struct Entry {
    value: Value,
    expires_at: Instant,
}

#[derive(Default)]
struct Inner {
    entries: HashMap<String, Entry>,
    /// Invalidation count per prefix passed to `invalidate_prefix`.
    invalidations: HashMap<String, u64>,
}

impl Inner {
    /// Invalidations so far of any prefix of `key`. Only ever grows.
    fn generation(&self, key: &str) -> u64 {
        self.invalidations
            .iter()
            .filter(|(prefix, _)| key.starts_with(prefix.as_str()))
            .map(|(_, count)| count)
            .sum()
    }
}

/// Result of [`ResponseCache::lookup`].
#[derive(Debug)]
pub enum Lookup {
    Hit(Value),
    Miss(FillTicket),
}

/// Permission to store the body for one missed key.
#[derive(Debug)]
pub struct FillTicket {
    key: String,
    generation: u64,
}

impl FillTicket {
    pub fn key(&self) -> &str {
        &self.key
    }
}

/// TTL cache of JSON response bodies keyed by request path and query.
pub struct ResponseCache {
    ttl: Duration,
    inner: RwLock<Inner>,
}

impl ResponseCache {
    /// A zero `ttl` disables caching: fills are dropped.
    pub fn new(ttl: Duration) -> Self {
        Self {
            ttl,
            inner: RwLock::new(Inner::default()),
        }
    }

    pub fn is_enabled(&self) -> bool {
        !self.ttl.is_zero()
    }

    /// Return the live entry for `key`, or a ticket to fill it.
    ///
    /// Take the ticket before reading from the store: data loaded after an
    /// invalidation that the ticket predates is never cached.
    pub async fn lookup(&self, key: String) -> Lookup {
        let now = Instant::now();
        let inner = self.inner.read().await;
        match inner.entries.get(&key) {
            Some(entry) if entry.expires_at > now => Lookup::Hit(entry.value.clone()),
            _ => {
                let generation = inner.generation(&key);
                Lookup::Miss(FillTicket { key, generation })
            }
        }
    }

    /// Store `value` for the ticket's key. Returns whether it was kept.
    ///
    /// The value is discarded when caching is disabled or when a matching
    /// prefix was invalidated after the ticket was issued.
    pub async fn fill(&self, ticket: FillTicket, value: Value) -> bool {
        if !self.is_enabled() {
            return false;
        }
        let now = Instant::now();
        let mut inner = self.inner.write().await;
        if inner.generation(&ticket.key) != ticket.generation {
            tracing::debug!(key = %ticket.key, "Dropped cache fill raced by invalidation");
            return false;
        }
        inner.entries.retain(|_, entry| entry.expires_at > now);
        inner.entries.insert(
            ticket.key,
            Entry {
                value,
                expires_at: now + self.ttl,
            },
        );
        true
    }

    /// Drop every entry whose key starts with `prefix` and void outstanding
    /// fill tickets for such keys. Returns the count of entries removed.
    pub async fn invalidate_prefix(&self, prefix: &str) -> usize {
        let mut inner = self.inner.write().await;
        *inner.invalidations.entry(prefix.to_string()).or_default() += 1;
        let before = inner.entries.len();
        inner.entries.retain(|key, _| !key.starts_with(prefix));
        let removed = before - inner.entries.len();
        if removed > 0 {
            tracing::debug!(prefix, removed, "Invalidated cached responses");
        }
        removed
    }

    pub async fn len(&self) -> usize {
        self.inner.read().await.entries.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.len().await == 0
    }
}
