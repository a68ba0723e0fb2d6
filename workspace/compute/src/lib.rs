pub mod bill;
pub mod error;
pub mod recurrence;

#[cfg(test)]
pub mod testing;

use bill::BillAggregator;
use recurrence::{RecurrenceEngine, cache::RecurrenceCache};

/// Returns a default pre-configured aggregator that will be used most of the
/// time: a recurrence engine with a fresh memoization cache of default size.
///
/// Callers that edit bill recurrence rules at runtime should keep a handle on
/// the engine's cache and clear it after such edits.
pub fn default_aggregator() -> BillAggregator {
    let engine = RecurrenceEngine::with_cache(RecurrenceCache::default());
    BillAggregator::new(engine)
}
