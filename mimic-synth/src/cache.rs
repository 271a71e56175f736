//! Single-flight cache of synthesized adapter types.

use std::sync::{
    Arc,
    atomic::{AtomicUsize, Ordering},
};

use dashmap::DashMap;
use mimic_core::Result;
use mimic_ir::SynthesisKey;
use once_cell::sync::OnceCell;
use tracing::debug;

use crate::AdapterType;

type Entry = Arc<OnceCell<Arc<AdapterType>>>;

/// Adapter types by synthesis key.
///
/// Each key owns one cell. Callers racing on a missing key block on the same
/// cell, so a type is built at most once. A failed build leaves the cell
/// empty and the next caller, or one already waiting, retries in it.
#[derive(Default)]
pub struct TypeCache {
    entries: DashMap<SynthesisKey, Entry>,
    builds: AtomicUsize,
}

impl TypeCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Get a built type.
    pub fn get(&self, key: &SynthesisKey) -> Option<Arc<AdapterType>> {
        self.entries
            .get(key)
            .and_then(|entry| entry.get().cloned())
    }

    /// Get the type for `key`, building it with `build` on first use.
    pub fn get_or_try_insert(
        &self,
        key: &SynthesisKey,
        build: impl FnOnce() -> Result<AdapterType>,
    ) -> Result<Arc<AdapterType>> {
        // The shard lock is released before building.
        let entry: Entry = Arc::clone(&self.entries.entry(key.clone()).or_default());

        if let Some(ty) = entry.get() {
            debug!(key = %key, "adapter cache hit");
            return Ok(Arc::clone(ty));
        }

        entry
            .get_or_try_init(|| {
                self.builds.fetch_add(1, Ordering::SeqCst);
                build().map(Arc::new)
            })
            .cloned()
    }

    /// Add a type built elsewhere. Returns false if the key is already taken.
    pub fn insert(&self, ty: Arc<AdapterType>) -> bool {
        let entry: Entry = Arc::clone(&self.entries.entry(ty.key().clone()).or_default());
        entry.set(ty).is_ok()
    }

    /// Number of built types.
    pub fn len(&self) -> usize {
        self.entries
            .iter()
            .filter(|entry| entry.value().get().is_some())
            .count()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Number of builds started, successful or not.
    pub fn builds(&self) -> usize {
        self.builds.load(Ordering::SeqCst)
    }

    pub fn keys(&self) -> Vec<SynthesisKey> {
        self.entries
            .iter()
            .filter(|entry| entry.value().get().is_some())
            .map(|entry| entry.key().clone())
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use std::{sync::Barrier, thread, time::Duration};

    use mimic_core::{Error, TypeInfo};

    use super::*;

    fn key() -> SynthesisKey {
        SynthesisKey::new("demo::Child", ["IChild"])
    }

    fn build() -> Result<AdapterType> {
        Ok(AdapterType::empty(key(), TypeInfo::builder("demo::Child").build()))
    }

    #[test]
    fn test_builds_once() {
        let cache = TypeCache::new();
        let first = cache.get_or_try_insert(&key(), build).unwrap();
        let second = cache.get_or_try_insert(&key(), build).unwrap();

        assert!(Arc::ptr_eq(&first, &second));
        assert_eq!(cache.builds(), 1);
        assert_eq!(cache.len(), 1);
    }

    #[test]
    fn test_failure_not_cached() {
        let cache = TypeCache::new();
        let err = cache
            .get_or_try_insert(&key(), || Err(Error::generation("IChild@demo::Child", "boom")))
            .unwrap_err();

        assert!(err.is_generation());
        assert!(cache.is_empty());
        assert!(cache.get(&key()).is_none());

        cache.get_or_try_insert(&key(), build).unwrap();
        assert_eq!(cache.builds(), 2);
        assert_eq!(cache.len(), 1);
    }

    #[test]
    fn test_waiter_retries_after_failed_build() {
        let cache = TypeCache::new();
        let started = Barrier::new(2);

        let waited = thread::scope(|scope| {
            let failing = scope.spawn(|| {
                cache.get_or_try_insert(&key(), || {
                    started.wait();
                    thread::sleep(Duration::from_millis(100));
                    Err(Error::generation("IChild@demo::Child", "boom"))
                })
            });
            let waiting = scope.spawn(|| {
                started.wait();
                cache.get_or_try_insert(&key(), build)
            });
            assert!(failing.join().unwrap().is_err());
            waiting.join().unwrap().unwrap()
        });

        let later = cache.get_or_try_insert(&key(), build).unwrap();
        assert!(Arc::ptr_eq(&waited, &later));
        assert_eq!(cache.builds(), 2);
        assert_eq!(cache.len(), 1);
    }

    #[test]
    fn test_insert() {
        let cache = TypeCache::new();
        assert!(cache.insert(Arc::new(build().unwrap())));
        assert!(!cache.insert(Arc::new(build().unwrap())));
        assert_eq!(cache.keys(), vec![key()]);
        assert_eq!(cache.builds(), 0);
    }
}
