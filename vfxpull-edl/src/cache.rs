//! Bounded cache of parse results keyed by input content.

use std::collections::{HashMap, VecDeque};
use std::sync::Arc;

use parking_lot::Mutex;
use sha2::{Digest, Sha256};

use crate::parser::ParseOutput;

/// Cache key: SHA-256 of the EDL text and the bit pattern of the frame rate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct CacheKey {
    digest: [u8; 32],
    rate_bits: u64,
}

impl CacheKey {
    pub fn new(text: &str, rate: f64) -> Self {
        Self {
            digest: Sha256::digest(text.as_bytes()).into(),
            rate_bits: rate.to_bits(),
        }
    }
}

/// Hit and miss counters.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CacheStats {
    pub hits: u64,
    pub misses: u64,
    pub entries: usize,
}

struct CacheInner {
    entries: HashMap<CacheKey, Arc<ParseOutput>>,
    /// Insertion order, oldest first.
    order: VecDeque<CacheKey>,
    capacity: usize,
    hits: u64,
    misses: u64,
}

impl CacheInner {
    fn get(&mut self, key: &CacheKey) -> Option<Arc<ParseOutput>> {
        match self.entries.get(key) {
            Some(output) => {
                self.hits += 1;
                Some(Arc::clone(output))
            }
            None => {
                self.misses += 1;
                None
            }
        }
    }

    fn insert(&mut self, key: CacheKey, output: Arc<ParseOutput>) {
        if self.capacity == 0 || self.entries.contains_key(&key) {
            return;
        }
        while self.order.len() >= self.capacity {
            if let Some(oldest) = self.order.pop_front() {
                self.entries.remove(&oldest);
            }
        }
        self.order.push_back(key);
        self.entries.insert(key, output);
    }
}

/// A thread-safe FIFO cache of [`ParseOutput`]s.
///
/// A capacity of zero disables storage; lookups still count as misses.
pub struct ParseCache {
    inner: Mutex<CacheInner>,
}

impl ParseCache {
    pub fn new(capacity: usize) -> Self {
        Self {
            inner: Mutex::new(CacheInner {
                entries: HashMap::with_capacity(capacity),
                order: VecDeque::with_capacity(capacity),
                capacity,
                hits: 0,
                misses: 0,
            }),
        }
    }

    pub fn get(&self, key: &CacheKey) -> Option<Arc<ParseOutput>> {
        self.inner.lock().get(key)
    }

    pub fn insert(&self, key: CacheKey, output: Arc<ParseOutput>) {
        self.inner.lock().insert(key, output);
    }

    /// Return the cached output for `key`, computing and storing it on a miss.
    ///
    /// The lock is not held while `compute` runs.
    pub fn get_or_insert_with<F>(&self, key: CacheKey, compute: F) -> Arc<ParseOutput>
    where
        F: FnOnce() -> ParseOutput,
    {
        if let Some(output) = self.get(&key) {
            return output;
        }
        let output = Arc::new(compute());
        self.insert(key, Arc::clone(&output));
        output
    }

    pub fn stats(&self) -> CacheStats {
        let inner = self.inner.lock();
        CacheStats {
            hits: inner.hits,
            misses: inner.misses,
            entries: inner.entries.len(),
        }
    }

    pub fn capacity(&self) -> usize {
        self.inner.lock().capacity
    }

    pub fn clear(&self) {
        let mut inner = self.inner.lock();
        inner.entries.clear();
        inner.order.clear();
    }
}

impl std::fmt::Debug for ParseCache {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ParseCache")
            .field("stats", &self.stats())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn output(title: &str) -> ParseOutput {
        ParseOutput {
            title: Some(title.into()),
            ..ParseOutput::default()
        }
    }

    #[test]
    fn test_key_depends_on_text_and_rate() {
        assert_eq!(CacheKey::new("a", 24.0), CacheKey::new("a", 24.0));
        assert_ne!(CacheKey::new("a", 24.0), CacheKey::new("b", 24.0));
        assert_ne!(CacheKey::new("a", 24.0), CacheKey::new("a", 25.0));
    }

    #[test]
    fn test_hit_and_miss() {
        let cache = ParseCache::new(4);
        let key = CacheKey::new("edl", 24.0);
        assert!(cache.get(&key).is_none());

        let first = cache.get_or_insert_with(key, || output("one"));
        let second = cache.get_or_insert_with(key, || output("two"));
        assert!(Arc::ptr_eq(&first, &second));
        assert_eq!(second.title.as_deref(), Some("one"));

        let stats = cache.stats();
        assert_eq!(stats.hits, 1);
        assert_eq!(stats.misses, 2);
        assert_eq!(stats.entries, 1);
    }

    #[test]
    fn test_fifo_eviction() {
        let cache = ParseCache::new(2);
        let keys: Vec<CacheKey> = ["a", "b", "c"]
            .iter()
            .map(|t| CacheKey::new(t, 24.0))
            .collect();
        for (key, title) in keys.iter().zip(["a", "b", "c"]) {
            cache.insert(*key, Arc::new(output(title)));
        }
        assert!(cache.get(&keys[0]).is_none());
        assert!(cache.get(&keys[1]).is_some());
        assert!(cache.get(&keys[2]).is_some());
        assert_eq!(cache.stats().entries, 2);
    }

    #[test]
    fn test_zero_capacity_stores_nothing() {
        let cache = ParseCache::new(0);
        let key = CacheKey::new("a", 24.0);
        cache.insert(key, Arc::new(output("a")));
        assert!(cache.get(&key).is_none());
        assert_eq!(cache.capacity(), 0);
    }

    #[test]
    fn test_clear() {
        let cache = ParseCache::new(2);
        let key = CacheKey::new("a", 24.0);
        cache.insert(key, Arc::new(output("a")));
        cache.clear();
        assert!(cache.get(&key).is_none());
    }
}
