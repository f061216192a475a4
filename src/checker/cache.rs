// src/checker/cache.rs
// =============================================================================
// Remembers the verdict for every target checked during a run, so a link
// that appears on 500 pages is only probed once.
//
// A target that is being checked right now has a pending slot. Every check
// of that target that starts before the verdict is stored waits on the same
// slot instead of sending its own request.
//
// The locks are only held for a single map operation and never across an
// .await, so plain (non-async) mutexes are enough.
// =============================================================================

use parking_lot::Mutex;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::OnceCell;

/// Filled in once by whichever check gets there first.
/// None = settled without a verdict worth caching.
pub type PendingSlot = Arc<OnceCell<Option<bool>>>;

/// Resolved target -> reachable? (true = reachable, false = broken)
#[derive(Debug, Default)]
pub struct CheckCache {
    verdicts: Mutex<HashMap<String, bool>>,
    pending: Mutex<HashMap<String, PendingSlot>>,
}

impl CheckCache {
    pub fn new() -> Self {
        Self::default()
    }

    // None = never decided; doubles as the "has" check
    pub fn get(&self, target: &str) -> Option<bool> {
        self.verdicts.lock().get(target).copied()
    }

    // Last write wins
    pub fn set(&self, target: &str, reachable: bool) {
        self.verdicts.lock().insert(target.to_string(), reachable);
    }

    // The slot for a target nobody has a verdict for yet; callers asking for
    // the same target get the same slot until it is settled
    pub fn pending(&self, target: &str) -> PendingSlot {
        Arc::clone(self.pending.lock().entry(target.to_string()).or_default())
    }

    // Stores the verdict, then retires the slot. In that order, so a check
    // arriving in between still finds one or the other.
    pub fn settle(&self, target: &str, reachable: Option<bool>) {
        if let Some(reachable) = reachable {
            self.set(target, reachable);
        }
        self.pending.lock().remove(target);
    }

    pub fn len(&self) -> usize {
        self.verdicts.lock().len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_set_then_get() {
        let cache = CheckCache::new();
        assert_eq!(cache.get("/about"), None);

        cache.set("/about", false);
        assert_eq!(cache.get("/about"), Some(false));
    }

    #[test]
    fn test_overwrite_last_write_wins() {
        let cache = CheckCache::new();
        cache.set("https://example.com/", false);
        cache.set("https://example.com/", true);
        assert_eq!(cache.get("https://example.com/"), Some(true));
        assert_eq!(cache.len(), 1);
    }

    #[test]
    fn test_pending_slot_is_shared_until_settled() {
        let cache = CheckCache::new();
        let first = cache.pending("/about");
        let second = cache.pending("/about");
        assert!(Arc::ptr_eq(&first, &second));
        assert!(!Arc::ptr_eq(&first, &cache.pending("/contact")));

        cache.settle("/about", Some(true));
        assert_eq!(cache.get("/about"), Some(true));
        assert!(!Arc::ptr_eq(&first, &cache.pending("/about")));
    }

    #[test]
    fn test_settle_without_verdict_caches_nothing() {
        let cache = CheckCache::new();
        let _slot = cache.pending("/draft");
        cache.settle("/draft", None);
        assert_eq!(cache.get("/draft"), None);
        assert_eq!(cache.len(), 0);
    }
}
