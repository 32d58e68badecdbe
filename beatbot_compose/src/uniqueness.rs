// Recent-output memory for duplicate avoidance.
//
// `UniquenessCache` remembers the fingerprints of the last `capacity`
// patterns the engine emitted. Insertion order is kept in a `VecDeque` so
// the oldest fingerprint is evicted first once the cache is full; lookups go
// through an `FxHashSet`. The state sits behind a `Mutex` so one cache can
// be shared by concurrent composition calls, and every check-then-insert is
// a single critical section.
//
// `global()` is the process-wide cache the orchestrator uses by default.
// `Composer::new()` resizes it to the configured capacity with
// `set_capacity()`, so the last composer built decides how much the process
// remembers. Tests and embedders that want isolation construct their own
// cache and hand it to `Composer::with_cache()`.
//
// `generate_unique_pattern()` is the retry loop: register the candidate; if
// it was already seen, apply a random `PatternTransform` and try again, up
// to `max_attempts` times, after which the duplicate is accepted and
// reported as such.

use crate::onset::{Fingerprint, OnsetVector, PatternTransform};
use once_cell::sync::Lazy;
use rand::Rng;
use rustc_hash::FxHashSet;
use std::collections::VecDeque;
use std::sync::Mutex;

/// Capacity of the process-wide cache.
pub const GLOBAL_CAPACITY: usize = 1024;

static GLOBAL: Lazy<UniquenessCache> = Lazy::new(|| UniquenessCache::new(GLOBAL_CAPACITY));

/// The process-wide cache.
pub fn global() -> &'static UniquenessCache {
    &GLOBAL
}

#[derive(Debug)]
struct CacheInner {
    order: VecDeque<Fingerprint>,
    seen: FxHashSet<Fingerprint>,
    capacity: usize,
}

impl CacheInner {
    fn evict_to_capacity(&mut self) {
        while self.order.len() > self.capacity {
            if let Some(old) = self.order.pop_front() {
                self.seen.remove(&old);
            }
        }
    }
}

/// Bounded, thread-safe set of recently emitted fingerprints.
#[derive(Debug)]
pub struct UniquenessCache {
    inner: Mutex<CacheInner>,
}

impl UniquenessCache {
    /// A capacity of 0 is treated as 1.
    pub fn new(capacity: usize) -> Self {
        UniquenessCache {
            inner: Mutex::new(CacheInner {
                order: VecDeque::new(),
                seen: FxHashSet::default(),
                capacity: capacity.max(1),
            }),
        }
    }

    pub fn capacity(&self) -> usize {
        self.lock().capacity
    }

    /// Change the bound, evicting the oldest entries if the cache now holds
    /// too many. A capacity of 0 is treated as 1.
    pub fn set_capacity(&self, capacity: usize) {
        let mut inner = self.lock();
        inner.capacity = capacity.max(1);
        inner.evict_to_capacity();
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, CacheInner> {
        // Set and queue are updated together; a poisoned lock is still
        // consistent.
        self.inner.lock().unwrap_or_else(|e| e.into_inner())
    }

    /// Returns `true` if `fp` was already present. Otherwise inserts it,
    /// evicting the oldest entry if the cache is over capacity, and
    /// returns `false`.
    pub fn register_and_check(&self, fp: Fingerprint) -> bool {
        let mut inner = self.lock();
        if inner.seen.contains(&fp) {
            return true;
        }
        inner.seen.insert(fp);
        inner.order.push_back(fp);
        inner.evict_to_capacity();
        false
    }

    pub fn contains(&self, fp: Fingerprint) -> bool {
        self.lock().seen.contains(&fp)
    }

    pub fn len(&self) -> usize {
        self.lock().order.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn reset(&self) {
        let mut inner = self.lock();
        inner.order.clear();
        inner.seen.clear();
    }
}

/// Result of the uniqueness retry loop.
#[derive(Debug, Clone, PartialEq)]
pub struct UniqueOutcome {
    pub pattern: OnsetVector,
    pub fingerprint: Fingerprint,
    /// Transforms applied before the pattern was accepted.
    pub attempts: usize,
    /// The attempt budget ran out and a previously seen pattern was kept.
    pub duplicate_accepted: bool,
}

/// Vary `pattern` until its fingerprint is new to `cache`, or give up after
/// `max_attempts` transforms and accept the duplicate.
pub fn generate_unique_pattern(
    pattern: OnsetVector,
    cache: &UniquenessCache,
    max_attempts: usize,
    rng: &mut impl Rng,
) -> UniqueOutcome {
    let mut candidate = pattern;
    let mut attempts = 0;
    loop {
        let fingerprint = candidate.fingerprint();
        let seen = cache.register_and_check(fingerprint);
        if !seen {
            return UniqueOutcome {
                pattern: candidate,
                fingerprint,
                attempts,
                duplicate_accepted: false,
            };
        }
        if attempts >= max_attempts {
            log::debug!(
                "accepting duplicate pattern {fingerprint} after {attempts} transforms"
            );
            return UniqueOutcome {
                pattern: candidate,
                fingerprint,
                attempts,
                duplicate_accepted: true,
            };
        }
        let transform = PatternTransform::random(rng);
        log::trace!("pattern {fingerprint} seen before, applying {transform:?}");
        candidate = transform.apply(&candidate);
        attempts += 1;
    }
}
