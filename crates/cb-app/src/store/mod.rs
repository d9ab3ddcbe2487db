//! The single writer of the persisted [`BookmarkSet`].
//!
//! Every read-modify-write runs under one mutex, so concurrent toggles from
//! different controls serialize instead of overwriting each other. Change
//! events are published after the lock is released; listeners are free to
//! call back into the store.
//!
//! Nothing here returns an error. Corrupt values are repaired, and storage
//! failures leave the store serving an in-memory shadow of the desired set
//! until a later write succeeds.

use std::sync::{Arc, Mutex, MutexGuard};

use cb_core::bookmark::BookmarkDocument;
use cb_core::ports::KeyValueStoragePort;
use cb_core::{BookmarkAction, BookmarkChangeEvent, BookmarkSet, ClipperId};
use tracing::{debug, info, warn};

use crate::bus::BookmarkEventBus;

#[derive(Default)]
struct StoreState {
    /// Last set this process read or meant to write.
    shadow: BookmarkSet,
    /// `shadow` has not reached storage yet.
    pending_flush: bool,
}

/// Result of [`BookmarkStore::toggle`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ToggleOutcome {
    pub action: BookmarkAction,
    pub set: BookmarkSet,
}

impl ToggleOutcome {
    pub fn is_bookmarked(&self) -> bool {
        self.action == BookmarkAction::Add
    }
}

pub struct BookmarkStore {
    storage: Arc<dyn KeyValueStoragePort>,
    key: String,
    bus: BookmarkEventBus,
    state: Mutex<StoreState>,
}

impl BookmarkStore {
    pub fn new(
        storage: Arc<dyn KeyValueStoragePort>,
        key: impl Into<String>,
        bus: BookmarkEventBus,
    ) -> Self {
        Self {
            storage,
            key: key.into(),
            bus,
            state: Mutex::new(StoreState::default()),
        }
    }

    pub fn bus(&self) -> &BookmarkEventBus {
        &self.bus
    }

    /// Current set. Absent → empty. Malformed → repaired to empty.
    pub fn get_all(&self) -> BookmarkSet {
        let mut state = self.lock();
        self.load(&mut state)
    }

    pub fn contains(&self, id: &ClipperId) -> bool {
        self.get_all().contains(id)
    }

    /// Idempotent. Publishes only when membership changes.
    #[tracing::instrument(name = "store.add", skip(self), fields(clipper_id = %id))]
    pub fn add(&self, id: &ClipperId) -> BookmarkSet {
        let (set, changed) = {
            let mut state = self.lock();
            let mut set = self.load(&mut state);
            let changed = set.insert(id.clone());
            if changed {
                self.persist(&mut state, &set);
            }
            (set, changed)
        };

        if changed {
            self.bus
                .publish(&BookmarkChangeEvent::added(id.clone(), &set));
        }
        set
    }

    /// Idempotent. Publishes only when membership changes.
    #[tracing::instrument(name = "store.remove", skip(self), fields(clipper_id = %id))]
    pub fn remove(&self, id: &ClipperId) -> BookmarkSet {
        let (set, changed) = {
            let mut state = self.lock();
            let mut set = self.load(&mut state);
            let changed = set.remove(id);
            if changed {
                self.persist(&mut state, &set);
            }
            (set, changed)
        };

        if changed {
            self.bus
                .publish(&BookmarkChangeEvent::removed(id.clone(), &set));
        }
        set
    }

    /// Flip membership of `id` in one critical section. The decision is made
    /// against the stored value, never a caller-held copy.
    #[tracing::instrument(name = "store.toggle", skip(self), fields(clipper_id = %id))]
    pub fn toggle(&self, id: &ClipperId) -> ToggleOutcome {
        let outcome = {
            let mut state = self.lock();
            let mut set = self.load(&mut state);
            let action = if set.remove(id) {
                BookmarkAction::Remove
            } else {
                set.insert(id.clone());
                BookmarkAction::Add
            };
            self.persist(&mut state, &set);
            ToggleOutcome { action, set }
        };

        let event = match outcome.action {
            BookmarkAction::Add => BookmarkChangeEvent::added(id.clone(), &outcome.set),
            _ => BookmarkChangeEvent::removed(id.clone(), &outcome.set),
        };
        self.bus.publish(&event);
        outcome
    }

    /// Overwrite the whole set. Publishes a `replace` event when it differs.
    pub fn replace_all(&self, next: BookmarkSet) -> BookmarkSet {
        let changed = {
            let mut state = self.lock();
            let current = self.load(&mut state);
            let changed = current != next;
            if changed {
                self.persist(&mut state, &next);
            }
            changed
        };

        if changed {
            info!(count = next.len(), "bookmark set replaced");
            self.bus.publish(&BookmarkChangeEvent::replaced(&next));
        }
        next
    }

    /// Overwrite only if the current set still equals `expected`.
    ///
    /// Returns the current set as `Err` when it moved on, so a caller that
    /// computed `next` from a stale read can back off.
    pub fn replace_if_unchanged(
        &self,
        expected: &BookmarkSet,
        next: BookmarkSet,
    ) -> Result<BookmarkSet, BookmarkSet> {
        let changed = {
            let mut state = self.lock();
            let current = self.load(&mut state);
            if &current != expected {
                return Err(current);
            }
            let changed = current != next;
            if changed {
                self.persist(&mut state, &next);
            }
            changed
        };

        if changed {
            info!(count = next.len(), "bookmark set replaced");
            self.bus.publish(&BookmarkChangeEvent::replaced(&next));
        }
        Ok(next)
    }

    /// Force the stored value to the empty document.
    pub fn reset(&self) {
        let had_ids = {
            let mut state = self.lock();
            let had_ids = !self.load(&mut state).is_empty();
            self.persist(&mut state, &BookmarkSet::new());
            had_ids
        };

        info!("bookmark storage reset");
        if had_ids {
            self.bus
                .publish(&BookmarkChangeEvent::replaced(&BookmarkSet::new()));
        }
    }

    fn lock(&self) -> MutexGuard<'_, StoreState> {
        self.state.lock().unwrap_or_else(|e| e.into_inner())
    }

    fn load(&self, state: &mut StoreState) -> BookmarkSet {
        if state.pending_flush {
            let shadow = state.shadow.clone();
            self.persist(state, &shadow);
            if state.pending_flush {
                return shadow;
            }
        }

        let raw = match self.storage.get(&self.key) {
            Ok(Some(raw)) => raw,
            Ok(None) => {
                state.shadow = BookmarkSet::new();
                return BookmarkSet::new();
            }
            Err(e) => {
                warn!(key = %self.key, error = %e, "bookmark storage read failed, serving last known set");
                return state.shadow.clone();
            }
        };

        match BookmarkDocument::decode(&raw) {
            Ok(decoded) => {
                let ids = decoded.document.ids;
                if decoded.migrated {
                    info!(key = %self.key, "migrated bookmark document to current schema");
                    self.persist(state, &ids);
                } else {
                    state.shadow = ids.clone();
                }
                ids
            }
            Err(e) => {
                warn!(key = %self.key, error = %e, "corrupt bookmark value, resetting to empty");
                self.persist(state, &BookmarkSet::new());
                BookmarkSet::new()
            }
        }
    }

    fn persist(&self, state: &mut StoreState, set: &BookmarkSet) {
        state.shadow = set.clone();
        let encoded = BookmarkDocument::new(set.clone()).encode();
        match self.storage.set(&self.key, &encoded) {
            Ok(()) => {
                if state.pending_flush {
                    debug!(key = %self.key, "pending bookmark write flushed");
                }
                state.pending_flush = false;
            }
            Err(e) => {
                warn!(key = %self.key, error = %e, "bookmark write failed, keeping in-memory copy");
                state.pending_flush = true;
            }
        }
    }
}
