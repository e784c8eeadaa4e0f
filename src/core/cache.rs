//=========================================================================
// TTL Cache
//=========================================================================
//
// Keyed cache for generated data (transformed images, collision masks)
// whose entries expire after going unused for a while.
//
// Time is supplied by the caller through advance(), so game time (not
// wall time) drives expiry and headless runs stay deterministic.
//
//=========================================================================

//=== External Dependencies ===============================================

use std::collections::HashMap;
use std::hash::Hash;

use log::trace;

//=== TtlCache ============================================================

pub(crate) struct TtlCache<K, V> {
    entries: HashMap<K, Entry<V>>,
    life: f64,
    now: f64,
}

struct Entry<V> {
    value: V,
    last_used: f64,
}

impl<K: Eq + Hash, V: Clone> TtlCache<K, V> {
    /// Creates a cache whose entries live `life` ms after their last use.
    pub(crate) fn new(life: f64) -> Self {
        Self {
            entries: HashMap::new(),
            life,
            now: 0.0,
        }
    }

    /// Returns the cached value, creating it on a miss. Either way the
    /// entry's lifetime restarts.
    pub(crate) fn get_or_insert_with(&mut self, key: K, create: impl FnOnce() -> V) -> V {
        let now = self.now;
        let entry = self.entries.entry(key).or_insert_with(|| Entry {
            value: create(),
            last_used: now,
        });
        entry.last_used = now;
        entry.value.clone()
    }

    /// Moves the cache clock forward.
    pub(crate) fn advance(&mut self, ms: f64) {
        self.now += ms;
    }

    /// Drops every entry unused for longer than the cache life.
    pub(crate) fn prune(&mut self) {
        let (now, life) = (self.now, self.life);
        let before = self.entries.len();
        self.entries.retain(|_, e| now - e.last_used <= life);
        trace!("Cache pruned: {} -> {} entries", before, self.entries.len());
    }

    pub(crate) fn clear(&mut self) {
        self.entries.clear();
    }

    pub(crate) fn len(&self) -> usize {
        self.entries.len()
    }
}

//=========================================================================
// Unit Tests
//=========================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn hit_does_not_recreate() {
        let mut cache = TtlCache::new(100.0);
        let mut calls = 0;
        for _ in 0..3 {
            let v = cache.get_or_insert_with("a", || {
                calls += 1;
                7
            });
            assert_eq!(v, 7);
        }
        assert_eq!(calls, 1);
    }

    #[test]
    fn prune_drops_only_stale_entries() {
        let mut cache = TtlCache::new(100.0);
        cache.get_or_insert_with(1, || "old");
        cache.advance(60.0);
        cache.get_or_insert_with(2, || "new");
        cache.advance(60.0);

        cache.prune();
        assert_eq!(cache.len(), 1);
        assert_eq!(cache.get_or_insert_with(2, || "recreated"), "new");
        assert_eq!(cache.get_or_insert_with(1, || "recreated"), "recreated");
    }

    #[test]
    fn use_refreshes_lifetime() {
        let mut cache = TtlCache::new(100.0);
        cache.get_or_insert_with(1, || 1);
        cache.advance(90.0);
        cache.get_or_insert_with(1, || 2);
        cache.advance(90.0);
        cache.prune();
        assert_eq!(cache.len(), 1);
    }
}
