/// Session-scoped memo table from slot index to resolution.
///
/// Entries are only ever added, and `store` is the only way in. Overlapping
/// page loads that ask for the same uncached slot queue on a per-slot gate,
/// so only one of them runs the probe sequence.

use std::collections::hash_map::Entry;
use std::collections::HashMap;
use std::future::Future;
use std::sync::{Arc, Mutex, PoisonError};

use super::Resolution;
use crate::error::CacheError;

#[derive(Default)]
pub struct ResolutionCache {
    settled: Mutex<HashMap<u32, Resolution>>,
    /// One gate per slot whose probe has started but not settled
    in_flight: Mutex<HashMap<u32, Arc<tokio::sync::Mutex<()>>>>,
}

impl ResolutionCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// The settled result for `slot`, if one exists.
    ///
    /// A slot whose probe is still in flight is reported as `None`.
    pub fn lookup(&self, slot: u32) -> Option<Resolution> {
        let settled = self.settled.lock().unwrap_or_else(PoisonError::into_inner);
        settled.get(&slot).cloned()
    }

    /// Record the result for `slot`.
    ///
    /// Storing the same result again is a no-op. A different result is a
    /// logic bug: it is rejected and the first result stays.
    pub fn store(&self, slot: u32, result: Resolution) -> Result<(), CacheError> {
        let mut settled = self.settled.lock().unwrap_or_else(PoisonError::into_inner);
        match settled.entry(slot) {
            Entry::Vacant(entry) => {
                entry.insert(result);
                Ok(())
            }
            Entry::Occupied(entry) => Self::check_same(slot, entry.get(), result),
        }
    }

    /// Return the cached result for `slot`, or run `resolve` and store it.
    ///
    /// Concurrent callers for the same slot wait on one `resolve` call. The
    /// returned flag is true only for the caller whose `resolve` ran. If a
    /// different result was stored while `resolve` ran, that first result
    /// wins and is returned.
    pub async fn get_or_resolve<F, Fut>(&self, slot: u32, resolve: F) -> (Resolution, bool)
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = Resolution>,
    {
        if let Some(result) = self.lookup(slot) {
            return (result, false);
        }

        let gate = self.gate(slot);
        let _turn = gate.lock().await;

        // Settled while we waited for the gate
        if let Some(result) = self.lookup(slot) {
            return (result, false);
        }

        let resolved = resolve().await;
        let result = match self.store(slot, resolved.clone()) {
            Ok(()) => resolved,
            Err(CacheError::Conflict { existing, .. }) => existing,
        };

        let mut in_flight = self.in_flight.lock().unwrap_or_else(PoisonError::into_inner);
        in_flight.remove(&slot);

        (result, true)
    }

    /// Number of settled slots
    pub fn len(&self) -> usize {
        let settled = self.settled.lock().unwrap_or_else(PoisonError::into_inner);
        settled.len()
    }

    fn gate(&self, slot: u32) -> Arc<tokio::sync::Mutex<()>> {
        let mut in_flight = self.in_flight.lock().unwrap_or_else(PoisonError::into_inner);
        Arc::clone(in_flight.entry(slot).or_default())
    }

    fn check_same(slot: u32, existing: &Resolution, attempted: Resolution) -> Result<(), CacheError> {
        if *existing == attempted {
            return Ok(());
        }
        tracing::error!(slot, ?existing, ?attempted, "conflicting resolution for slot");
        Err(CacheError::Conflict {
            slot,
            existing: existing.clone(),
            attempted,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::time::Duration;

    #[test]
    fn test_lookup_empty() {
        let cache = ResolutionCache::new();
        assert_eq!(cache.lookup(1), None);
        assert_eq!(cache.len(), 0);
    }

    #[test]
    fn test_store_is_idempotent() {
        let cache = ResolutionCache::new();
        let url = Resolution::Resolved("g/1.jpg".to_string());

        cache.store(1, url.clone()).unwrap();
        cache.store(1, url.clone()).unwrap();
        cache.store(2, Resolution::Absent).unwrap();

        assert_eq!(cache.lookup(1), Some(url));
        assert_eq!(cache.lookup(2), Some(Resolution::Absent));
        assert_eq!(cache.len(), 2);
    }

    #[test]
    fn test_conflicting_store_keeps_first() {
        let cache = ResolutionCache::new();
        cache.store(4, Resolution::Absent).unwrap();

        let err = cache
            .store(4, Resolution::Resolved("g/4.png".to_string()))
            .unwrap_err();

        assert!(matches!(err, CacheError::Conflict { slot: 4, .. }));
        assert_eq!(cache.lookup(4), Some(Resolution::Absent));
    }

    #[tokio::test]
    async fn test_get_or_resolve_uses_cached_value() {
        let cache = ResolutionCache::new();
        cache.store(7, Resolution::Resolved("g/7.webp".to_string())).unwrap();

        let (result, probed) = cache
            .get_or_resolve(7, || async { Resolution::Resolved("g/7.jpg".to_string()) })
            .await;

        assert_eq!(result.url(), Some("g/7.webp"));
        assert!(!probed);
    }

    #[tokio::test(start_paused = true)]
    async fn test_concurrent_callers_share_one_probe() {
        let cache = Arc::new(ResolutionCache::new());
        let calls = Arc::new(AtomicUsize::new(0));

        let mut set = tokio::task::JoinSet::new();
        for _ in 0..4 {
            let cache = Arc::clone(&cache);
            let calls = Arc::clone(&calls);
            set.spawn(async move {
                cache
                    .get_or_resolve(3, || async move {
                        calls.fetch_add(1, Ordering::SeqCst);
                        tokio::time::sleep(Duration::from_millis(50)).await;
                        Resolution::Resolved("g/3.jpg".to_string())
                    })
                    .await
            });
        }

        let mut probed_count = 0;
        while let Some(joined) = set.join_next().await {
            let (result, probed) = joined.unwrap();
            assert_eq!(result.url(), Some("g/3.jpg"));
            probed_count += usize::from(probed);
        }

        assert_eq!(calls.load(Ordering::SeqCst), 1);
        assert_eq!(probed_count, 1);
        assert_eq!(cache.len(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_store_while_resolving_keeps_first_result() {
        let cache = Arc::new(ResolutionCache::new());

        let running = tokio::spawn({
            let cache = Arc::clone(&cache);
            async move {
                cache
                    .get_or_resolve(1, || async {
                        tokio::time::sleep(Duration::from_millis(10)).await;
                        Resolution::Absent
                    })
                    .await
            }
        });
        // Let the resolve start and park on its sleep
        tokio::task::yield_now().await;
        assert_eq!(cache.lookup(1), None);

        let url = Resolution::Resolved("g/1.jpg".to_string());
        cache.store(1, url.clone()).unwrap();

        let (result, probed) = running.await.unwrap();
        assert!(probed);
        assert_eq!(result, url);
        assert_eq!(cache.lookup(1), Some(url.clone()));

        // The late Absent was refused, so storing it now still conflicts
        assert!(matches!(
            cache.store(1, Resolution::Absent),
            Err(CacheError::Conflict { slot: 1, .. })
        ));
    }
}
