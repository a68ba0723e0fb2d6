use cached::{Cached, SizedCache};
use chrono::NaiveDate;
use std::sync::{Arc, Mutex};

/// Which recurrence operation produced a cached date.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RecurrenceOp {
    DateMatch,
    ExpectedMatch,
}

/// A typed composite cache key for recurrence lookups.
///
/// Recurrence projection is a pure function of the bill's immutable rule
/// fields and the input date, so (bill, operation, date) identifies a result
/// completely.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct RecurrenceKey {
    bill_id: i32,
    op: RecurrenceOp,
    date: NaiveDate,
}

impl RecurrenceKey {
    pub fn new(bill_id: i32, op: RecurrenceOp, date: NaiveDate) -> Self {
        Self { bill_id, op, date }
    }
}

/// Memoization store for computed recurrence dates.
///
/// Entries have no TTL: they stay valid for the life of the cache because the
/// computation is deterministic. If a bill's recurrence fields are edited,
/// the caller performing the edit must call [`clear`](Self::clear) — there is
/// no automatic invalidation.
#[derive(Clone)]
pub struct RecurrenceCache {
    store: Arc<Mutex<SizedCache<RecurrenceKey, NaiveDate>>>,
}

impl RecurrenceCache {
    /// Creates a cache holding at most `capacity` entries (LRU eviction).
    pub fn new(capacity: usize) -> Self {
        Self {
            store: Arc::new(Mutex::new(SizedCache::with_size(capacity))),
        }
    }

    pub fn get(&self, key: &RecurrenceKey) -> Option<NaiveDate> {
        if let Ok(mut store) = self.store.lock() {
            store.cache_get(key).copied()
        } else {
            None
        }
    }

    pub fn put(&self, key: RecurrenceKey, value: NaiveDate) {
        if let Ok(mut store) = self.store.lock() {
            store.cache_set(key, value);
        }
    }

    /// Drops all cached dates. Call after editing any bill's recurrence rule.
    pub fn clear(&self) {
        if let Ok(mut store) = self.store.lock() {
            store.cache_clear();
        }
    }

    /// Returns the number of cached entries.
    pub fn len(&self) -> usize {
        if let Ok(store) = self.store.lock() {
            store.cache_size()
        } else {
            0
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl Default for RecurrenceCache {
    fn default() -> Self {
        Self::new(1024)
    }
}
