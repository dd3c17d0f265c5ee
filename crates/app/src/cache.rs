//! Namespaced query result cache.
//!
//! Results are stored under `(namespace, key)`. Invalidating a namespace
//! marks every entry in it stale, bumps the namespace's invalidation epoch
//! and announces the fact on the [`EventBus`] so that active queries can
//! refetch. Stale entries are still readable; they are no longer
//! authoritative.
//!
//! Each namespace holds at most `max_entries` results. Inserting past the
//! cap evicts the oldest insertion.

use std::collections::HashMap;
use std::fmt::Debug;
use std::hash::Hash;
use std::sync::Arc;

use notehub_events::{EventBus, NotesEvent};
use tokio::sync::RwLock;

/// Default per-namespace entry cap.
pub const DEFAULT_MAX_ENTRIES: usize = 64;

/// A cached result as seen by a reader.
#[derive(Debug, Clone, PartialEq)]
pub struct CachedValue<V> {
    pub value: V,
    /// `true` once the namespace was invalidated after this value was stored.
    pub stale: bool,
    /// Namespace invalidation epoch at the time of the read.
    pub epoch: u64,
}

struct CacheEntry<V> {
    value: V,
    stale: bool,
    inserted: u64,
}

struct Namespace<K, V> {
    entries: HashMap<K, CacheEntry<V>>,
    epoch: u64,
    next_insert: u64,
}

impl<K, V> Default for Namespace<K, V> {
    fn default() -> Self {
        Self {
            entries: HashMap::new(),
            epoch: 0,
            next_insert: 0,
        }
    }
}

/// Query result cache shared between the query and mutation controllers.
pub struct QueryCache<K, V> {
    namespaces: RwLock<HashMap<String, Namespace<K, V>>>,
    max_entries: usize,
    events: Option<Arc<EventBus>>,
}

impl<K, V> QueryCache<K, V>
where
    K: Eq + Hash + Clone + Debug,
    V: Clone,
{
    /// A cache that does not announce invalidations.
    pub fn new() -> Self {
        Self {
            namespaces: RwLock::new(HashMap::new()),
            max_entries: DEFAULT_MAX_ENTRIES,
            events: None,
        }
    }

    /// A cache that publishes [`NotesEvent::QueryInvalidated`] on `bus`.
    pub fn with_events(bus: Arc<EventBus>) -> Self {
        Self {
            events: Some(bus),
            ..Self::new()
        }
    }

    /// Cap each namespace at `max_entries` results (at least one).
    pub fn with_max_entries(mut self, max_entries: usize) -> Self {
        self.max_entries = max_entries.max(1);
        self
    }

    /// Look up the entry for `key`, fresh or stale.
    pub async fn get(&self, namespace: &str, key: &K) -> Option<CachedValue<V>> {
        let namespaces = self.namespaces.read().await;
        let ns = namespaces.get(namespace)?;
        ns.entries.get(key).map(|entry| CachedValue {
            value: entry.value.clone(),
            stale: entry.stale,
            epoch: ns.epoch,
        })
    }

    /// Number of invalidations `namespace` has seen.
    pub async fn epoch(&self, namespace: &str) -> u64 {
        self.namespaces
            .read()
            .await
            .get(namespace)
            .map_or(0, |ns| ns.epoch)
    }

    /// Store a fresh result, replacing any previous entry for `key`.
    pub async fn insert(&self, namespace: &str, key: K, value: V) {
        let mut namespaces = self.namespaces.write().await;
        let ns = namespaces.entry(namespace.to_string()).or_default();

        if !ns.entries.contains_key(&key) && ns.entries.len() >= self.max_entries {
            if let Some(victim) = ns
                .entries
                .iter()
                .min_by_key(|(_, entry)| entry.inserted)
                .map(|(k, _)| k.clone())
            {
                tracing::trace!(namespace, key = ?victim, "Evicting cached result");
                ns.entries.remove(&victim);
            }
        }

        ns.next_insert += 1;
        ns.entries.insert(
            key,
            CacheEntry {
                value,
                stale: false,
                inserted: ns.next_insert,
            },
        );
    }

    /// Mark every entry under `namespace` stale and announce it.
    ///
    /// The announcement is published even when nothing was cached so that
    /// queries still loading their first result pick up the change.
    /// Returns the number of entries marked.
    pub async fn invalidate(&self, namespace: &str) -> usize {
        let (marked, epoch) = {
            let mut namespaces = self.namespaces.write().await;
            let ns = namespaces.entry(namespace.to_string()).or_default();
            ns.epoch += 1;
            ns.entries.values_mut().for_each(|entry| entry.stale = true);
            (ns.entries.len(), ns.epoch)
        };

        tracing::debug!(namespace, marked, epoch, "Invalidated query namespace");

        if let Some(bus) = &self.events {
            bus.publish(NotesEvent::QueryInvalidated {
                namespace: namespace.to_string(),
            });
        }

        marked
    }

    /// Number of entries under `namespace`, fresh or stale.
    pub async fn len(&self, namespace: &str) -> usize {
        self.namespaces
            .read()
            .await
            .get(namespace)
            .map_or(0, |ns| ns.entries.len())
    }
}

impl<K, V> Default for QueryCache<K, V>
where
    K: Eq + Hash + Clone + Debug,
    V: Clone,
{
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn insert_then_get_is_fresh() {
        let cache: QueryCache<u32, &str> = QueryCache::new();
        cache.insert("notes", 1, "page one").await;

        let cached = cache.get("notes", &1).await.expect("entry present");
        assert_eq!(cached.value, "page one");
        assert!(!cached.stale);
        assert_eq!(cached.epoch, 0);
    }

    #[tokio::test]
    async fn namespaces_are_isolated() {
        let cache: QueryCache<u32, &str> = QueryCache::new();
        cache.insert("notes", 1, "note").await;
        cache.insert("tags", 1, "tag").await;

        assert_eq!(cache.invalidate("notes").await, 1);
        assert!(cache.get("notes", &1).await.unwrap().stale);
        assert!(!cache.get("tags", &1).await.unwrap().stale);
        assert_eq!(cache.epoch("notes").await, 1);
        assert_eq!(cache.epoch("tags").await, 0);
    }

    #[tokio::test]
    async fn insert_after_invalidate_is_fresh_again() {
        let cache: QueryCache<u32, &str> = QueryCache::new();
        cache.insert("notes", 1, "old").await;
        cache.invalidate("notes").await;
        cache.insert("notes", 1, "new").await;

        let cached = cache.get("notes", &1).await.unwrap();
        assert_eq!(cached.value, "new");
        assert!(!cached.stale);
        assert_eq!(cached.epoch, 1);
        assert_eq!(cache.len("notes").await, 1);
    }

    #[tokio::test]
    async fn invalidate_bumps_epoch_even_when_empty() {
        let bus = Arc::new(EventBus::default());
        let mut rx = bus.subscribe();
        let cache: QueryCache<u32, &str> = QueryCache::with_events(bus.clone());

        assert_eq!(cache.invalidate("notes").await, 0);
        assert_eq!(cache.epoch("notes").await, 1);

        let event = rx.recv().await.expect("invalidation announced");
        assert!(event.invalidates("notes"));
    }

    #[tokio::test]
    async fn oldest_insertion_is_evicted_past_the_cap() {
        let cache: QueryCache<u32, &str> = QueryCache::new().with_max_entries(2);
        cache.insert("notes", 1, "one").await;
        cache.insert("notes", 2, "two").await;
        cache.insert("notes", 1, "one again").await;
        cache.insert("notes", 3, "three").await;

        assert_eq!(cache.len("notes").await, 2);
        assert!(cache.get("notes", &2).await.is_none());
        assert_eq!(cache.get("notes", &1).await.unwrap().value, "one again");
        assert!(cache.get("notes", &3).await.is_some());
    }

    #[tokio::test]
    async fn missing_key_returns_none() {
        let cache: QueryCache<u32, &str> = QueryCache::default();
        assert!(cache.get("notes", &9).await.is_none());
        assert_eq!(cache.len("notes").await, 0);
        assert_eq!(cache.epoch("notes").await, 0);
    }
}
