//! The authoritative in-memory favorites set.

use std::collections::BTreeSet;
use std::sync::Arc;

use tokio::sync::watch;
use tracing::{debug, warn};

use crate::domain::StationId;

use super::error::PersistError;
use super::store::FavoritesStore;

/// Shared, immutable view of the favorites set.
pub type FavoriteIds = Arc<BTreeSet<StationId>>;

/// Owns the favorites set and writes every change through to a store.
///
/// Mutations are serialized, and each one is saved before `add`/`remove`
/// returns. Readers get `Arc` snapshots, never a live reference, so a
/// reconciliation running concurrently sees either the old set or the new
/// one. Subscribers are woken on every effective change.
pub struct FavoriteSetManager {
    ids: watch::Sender<FavoriteIds>,
    store: Arc<dyn FavoritesStore>,
}

impl FavoriteSetManager {
    /// Create a manager with a known initial set.
    pub fn new(store: Arc<dyn FavoritesStore>, initial: BTreeSet<StationId>) -> Self {
        let (ids, _) = watch::channel(Arc::new(initial));
        Self { ids, store }
    }

    /// Create a manager from whatever the store holds.
    pub fn load(store: Arc<dyn FavoritesStore>) -> Result<Self, PersistError> {
        let initial = store.load()?;
        debug!(count = initial.len(), "loaded favorites");
        Ok(Self::new(store, initial))
    }

    /// Add a favorite. Returns whether the set changed.
    ///
    /// Adding an id that is already present is a no-op and doesn't touch
    /// the store. If saving fails the id stays added in memory and the
    /// error is returned.
    pub fn add(&self, id: StationId) -> Result<bool, PersistError> {
        self.mutate(|ids| ids.insert(id))
    }

    /// Remove a favorite. Returns whether the set changed.
    ///
    /// Same no-op and failure semantics as `add`.
    pub fn remove(&self, id: StationId) -> Result<bool, PersistError> {
        self.mutate(|ids| ids.remove(&id))
    }

    pub fn contains(&self, id: StationId) -> bool {
        self.ids.borrow().contains(&id)
    }

    /// Current membership.
    pub fn snapshot(&self) -> FavoriteIds {
        self.ids.borrow().clone()
    }

    /// Watch for changes to the set.
    pub fn subscribe(&self) -> watch::Receiver<FavoriteIds> {
        self.ids.subscribe()
    }

    fn mutate(
        &self,
        apply: impl FnOnce(&mut BTreeSet<StationId>) -> bool,
    ) -> Result<bool, PersistError> {
        let mut saved = Ok(());

        // The sender's write lock is held for the whole closure, which
        // serializes mutations and their saves.
        let changed = self.ids.send_if_modified(|current| {
            let mut next = BTreeSet::clone(current);
            if !apply(&mut next) {
                return false;
            }
            saved = self.store.save(&next);
            *current = Arc::new(next);
            true
        });

        if let Err(e) = &saved {
            warn!(error = %e, "failed to persist favorites; change kept in memory");
        }
        saved.map(|()| changed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::favorites::MemoryStore;
    use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};

    /// Counts saves and can be told to fail them.
    #[derive(Default)]
    struct FlakyStore {
        saves: AtomicUsize,
        failing: AtomicBool,
        inner: MemoryStore,
    }

    impl FavoritesStore for FlakyStore {
        fn load(&self) -> Result<BTreeSet<StationId>, PersistError> {
            self.inner.load()
        }

        fn save(&self, ids: &BTreeSet<StationId>) -> Result<(), PersistError> {
            self.saves.fetch_add(1, Ordering::SeqCst);
            if self.failing.load(Ordering::SeqCst) {
                return Err(PersistError::Unavailable("disk full".into()));
            }
            self.inner.save(ids)
        }
    }

    fn id(n: u64) -> StationId {
        StationId::new(n)
    }

    #[test]
    fn add_then_contains() {
        let manager = FavoriteSetManager::new(Arc::new(MemoryStore::default()), BTreeSet::new());

        assert!(manager.add(id(7)).unwrap());
        assert!(manager.contains(id(7)));
        assert!(manager.snapshot().contains(&id(7)));
    }

    #[test]
    fn remove_then_absent() {
        let manager =
            FavoriteSetManager::new(Arc::new(MemoryStore::default()), BTreeSet::from([id(7)]));

        assert!(manager.remove(id(7)).unwrap());
        assert!(!manager.contains(id(7)));
        assert!(!manager.snapshot().contains(&id(7)));
    }

    #[test]
    fn add_and_remove_are_idempotent() {
        let store = Arc::new(FlakyStore::default());
        let manager = FavoriteSetManager::new(store.clone(), BTreeSet::new());

        assert!(manager.add(id(1)).unwrap());
        assert!(!manager.add(id(1)).unwrap());
        assert_eq!(manager.snapshot().len(), 1);

        assert!(manager.remove(id(1)).unwrap());
        assert!(!manager.remove(id(1)).unwrap());
        assert!(manager.snapshot().is_empty());

        // No-ops don't write
        assert_eq!(store.saves.load(Ordering::SeqCst), 2);
    }

    #[test]
    fn writes_through_before_returning() {
        let store = Arc::new(MemoryStore::default());
        let manager = FavoriteSetManager::new(store.clone(), BTreeSet::new());

        manager.add(id(3)).unwrap();
        manager.add(id(1)).unwrap();
        assert_eq!(store.load().unwrap(), BTreeSet::from([id(1), id(3)]));

        manager.remove(id(3)).unwrap();
        assert_eq!(store.load().unwrap(), BTreeSet::from([id(1)]));
    }

    #[test]
    fn failed_save_keeps_memory_change() {
        let store = Arc::new(FlakyStore::default());
        store.failing.store(true, Ordering::SeqCst);
        let manager = FavoriteSetManager::new(store.clone(), BTreeSet::new());

        let err = manager.add(id(5)).unwrap_err();
        assert!(matches!(err, PersistError::Unavailable(_)));
        assert!(manager.contains(id(5)));
        assert!(store.load().unwrap().is_empty());
    }

    #[test]
    fn load_from_store() {
        let store = Arc::new(MemoryStore::new(BTreeSet::from([id(9), id(4)])));
        let manager = FavoriteSetManager::load(store).unwrap();

        assert!(manager.contains(id(4)));
        assert!(manager.contains(id(9)));
    }

    #[test]
    fn snapshots_are_immutable() {
        let manager = FavoriteSetManager::new(Arc::new(MemoryStore::default()), BTreeSet::new());
        let before = manager.snapshot();

        manager.add(id(1)).unwrap();

        assert!(before.is_empty());
        assert_eq!(manager.snapshot().len(), 1);
    }

    #[tokio::test]
    async fn subscribers_see_changes_only() {
        let manager = FavoriteSetManager::new(Arc::new(MemoryStore::default()), BTreeSet::new());
        let mut rx = manager.subscribe();

        manager.add(id(2)).unwrap();
        assert!(rx.has_changed().unwrap());
        assert!(rx.borrow_and_update().contains(&id(2)));

        manager.add(id(2)).unwrap();
        assert!(!rx.has_changed().unwrap());
    }
}
