use std::sync::{Arc, Mutex, Weak};

use cb_core::ClipperId;
use tracing::info;

use crate::bus::Subscription;
use crate::store::{BookmarkStore, ToggleOutcome};
use crate::usecases::RemoteMirror;

pub type ToggleCallback = Arc<dyn Fn(&ClipperId, bool) + Send + Sync>;

/// Star control bound to one clipper.
///
/// The constructor's `initial_hint` only seeds what is shown before the first
/// event or activation; activation always decides against the store. While
/// mounted the control follows bus events, so every control for the same id
/// shows the same state.
///
/// The bus listener is the only writer of the shown state. It re-reads the
/// store while holding that state's lock, so the last write always reflects
/// the newest set.
pub struct BookmarkToggle {
    clipper_id: ClipperId,
    store: Arc<BookmarkStore>,
    shown: Arc<Mutex<bool>>,
    on_change: Option<ToggleCallback>,
    mirror: Option<Arc<RemoteMirror>>,
    _subscription: Subscription,
}

impl BookmarkToggle {
    pub fn mount(store: Arc<BookmarkStore>, clipper_id: ClipperId, initial_hint: bool) -> Self {
        let shown = Arc::new(Mutex::new(initial_hint));

        let weak_store: Weak<BookmarkStore> = Arc::downgrade(&store);
        let watched_id = clipper_id.clone();
        let shown_in_listener = Arc::clone(&shown);
        let subscription = store.bus().subscribe(move |event| {
            if !event.affects(&watched_id) {
                return;
            }
            if let Some(store) = weak_store.upgrade() {
                let mut shown = shown_in_listener.lock().unwrap_or_else(|e| e.into_inner());
                *shown = store.contains(&watched_id);
            }
        });

        Self {
            clipper_id,
            store,
            shown,
            on_change: None,
            mirror: None,
            _subscription: subscription,
        }
    }

    /// Called with `(clipper_id, new_state)` after each activation. The store
    /// has already published the change by then, so every mounted control
    /// and listing shows the new state when the callback runs.
    pub fn with_callback<F>(mut self, callback: F) -> Self
    where
        F: Fn(&ClipperId, bool) + Send + Sync + 'static,
    {
        self.on_change = Some(Arc::new(callback));
        self
    }

    pub fn with_remote_mirror(mut self, mirror: Arc<RemoteMirror>) -> Self {
        self.mirror = Some(mirror);
        self
    }

    pub fn clipper_id(&self) -> &ClipperId {
        &self.clipper_id
    }

    /// State currently shown by this control.
    pub fn is_bookmarked(&self) -> bool {
        *self.shown.lock().unwrap_or_else(|e| e.into_inner())
    }

    /// Flip the bookmark and return the new state. A configured remote mirror
    /// is updated in the background, in activation order.
    pub fn activate(&self) -> bool {
        let outcome = self.apply_local();
        if let Some(mirror) = &self.mirror {
            mirror.enqueue(outcome.action, self.clipper_id.clone());
        }
        outcome.is_bookmarked()
    }

    /// Like [`BookmarkToggle::activate`] but waits for the remote mirror.
    pub async fn activate_and_mirror(&self) -> bool {
        let outcome = self.apply_local();
        if let Some(mirror) = &self.mirror {
            mirror
                .apply_in_order(outcome.action, self.clipper_id.clone())
                .await;
        }
        outcome.is_bookmarked()
    }

    fn apply_local(&self) -> ToggleOutcome {
        // Publishes before returning; the listener above updates `shown`.
        let outcome = self.store.toggle(&self.clipper_id);
        let now_bookmarked = outcome.is_bookmarked();

        info!(
            clipper_id = %self.clipper_id,
            bookmarked = now_bookmarked,
            total = outcome.set.len(),
            "bookmark toggled"
        );

        if let Some(callback) = &self.on_change {
            callback(&self.clipper_id, now_bookmarked);
        }
        outcome
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bus::BookmarkEventBus;
    use crate::usecases::remote_mirror::testing::UnevenLatencyRemote;
    use crate::usecases::{BookmarkReconciler, ReconcileOutcome};
    use cb_core::{BookerId, BookmarkSet, ReconcilePolicy};
    use cb_infra::{InMemoryKeyValueStorage, MockRemoteBookmarks};
    use std::time::Duration;

    fn store() -> Arc<BookmarkStore> {
        Arc::new(BookmarkStore::new(
            Arc::new(InMemoryKeyValueStorage::new()),
            "clipper_bookmarks",
            BookmarkEventBus::new(),
        ))
    }

    #[test]
    fn stale_hint_does_not_decide_the_action() {
        let store = store();
        store.add(&ClipperId::from("c1"));

        // Rendered from data fetched before the add landed.
        let stale = BookmarkToggle::mount(Arc::clone(&store), ClipperId::from("c1"), false);
        assert!(!stale.is_bookmarked());

        assert!(!stale.activate(), "store said starred, so activation removes");
        assert!(!store.contains(&ClipperId::from("c1")));
    }

    #[test]
    fn later_change_elsewhere_corrects_the_hint() {
        let store = store();
        let toggle = BookmarkToggle::mount(Arc::clone(&store), ClipperId::from("c1"), false);
        store.add(&ClipperId::from("c1"));
        assert!(toggle.is_bookmarked());
    }

    #[test]
    fn same_id_controls_converge() {
        let store = store();
        let a = BookmarkToggle::mount(Arc::clone(&store), ClipperId::from("c1"), false);
        let b = BookmarkToggle::mount(Arc::clone(&store), ClipperId::from("c1"), false);
        let other = BookmarkToggle::mount(Arc::clone(&store), ClipperId::from("c2"), false);

        assert!(a.activate());
        assert!(b.is_bookmarked());
        assert!(!other.is_bookmarked());

        assert!(!b.activate());
        assert!(!a.is_bookmarked());
    }

    #[test]
    fn callback_receives_new_state() {
        let store = store();
        let calls = Arc::new(Mutex::new(Vec::new()));
        let sink = Arc::clone(&calls);
        let toggle = BookmarkToggle::mount(store, ClipperId::from("c1"), false)
            .with_callback(move |id, state| sink.lock().unwrap().push((id.clone(), state)));

        toggle.activate();
        toggle.activate();

        assert_eq!(
            *calls.lock().unwrap(),
            vec![(ClipperId::from("c1"), true), (ClipperId::from("c1"), false)]
        );
    }

    #[test]
    fn callback_sees_peer_controls_already_updated() {
        let store = store();
        let peer = Arc::new(BookmarkToggle::mount(
            Arc::clone(&store),
            ClipperId::from("c1"),
            false,
        ));
        let seen = Arc::new(Mutex::new(None));
        let (peer_in_callback, sink) = (Arc::clone(&peer), Arc::clone(&seen));
        let toggle = BookmarkToggle::mount(Arc::clone(&store), ClipperId::from("c1"), false)
            .with_callback(move |_, state| {
                *sink.lock().unwrap() = Some((state, peer_in_callback.is_bookmarked()));
            });

        toggle.activate();

        assert_eq!(*seen.lock().unwrap(), Some((true, true)));
        assert!(toggle.is_bookmarked());
    }

    #[test]
    fn replace_event_updates_control() {
        let store = store();
        let toggle = BookmarkToggle::mount(Arc::clone(&store), ClipperId::from("c3"), false);
        store.replace_all(BookmarkSet::from(["c3"]));
        assert!(toggle.is_bookmarked());
    }

    #[test]
    fn unmounted_control_stops_listening() {
        let store = store();
        let toggle = BookmarkToggle::mount(Arc::clone(&store), ClipperId::from("c1"), false);
        assert_eq!(store.bus().listener_count(), 1);
        drop(toggle);
        assert_eq!(store.bus().listener_count(), 0);
    }

    #[tokio::test]
    async fn activation_is_mirrored_to_remote() {
        let store = store();
        let remote = Arc::new(MockRemoteBookmarks::default());
        let booker = BookerId::from("booker-1");
        let mirror = Arc::new(RemoteMirror::new(remote.clone(), booker.clone()));
        let toggle = BookmarkToggle::mount(store, ClipperId::from("c1"), false)
            .with_remote_mirror(mirror);

        assert!(toggle.activate_and_mirror().await);
        assert_eq!(remote.snapshot(&booker).await, BookmarkSet::from(["c1"]));

        assert!(!toggle.activate_and_mirror().await);
        assert!(remote.snapshot(&booker).await.is_empty());
    }

    #[test]
    fn racing_controls_settle_on_the_store_state() {
        let store = store();
        let controls: Vec<BookmarkToggle> = (0..4)
            .map(|_| BookmarkToggle::mount(Arc::clone(&store), ClipperId::from("c1"), false))
            .collect();

        std::thread::scope(|scope| {
            for control in &controls {
                scope.spawn(move || {
                    for _ in 0..25 {
                        control.activate();
                    }
                });
            }
        });

        // 100 flips in total, so the id ends up unstarred.
        assert!(!store.contains(&ClipperId::from("c1")));
        for control in &controls {
            assert!(!control.is_bookmarked());
        }
    }

    #[tokio::test(start_paused = true)]
    async fn quick_star_then_unstar_stays_unstarred_after_reconcile() {
        let store = store();
        let remote = Arc::new(UnevenLatencyRemote::new(
            Duration::from_millis(30),
            Duration::from_millis(5),
        ));
        let booker = BookerId::from("booker-1");
        let mirror = Arc::new(RemoteMirror::new(remote.clone(), booker.clone()));
        let star = BookmarkToggle::mount(Arc::clone(&store), ClipperId::from("c1"), false)
            .with_remote_mirror(mirror);

        assert!(star.activate());
        assert!(!star.activate());
        tokio::time::sleep(Duration::from_millis(100)).await;
        assert!(remote.inner.snapshot(&booker).await.is_empty());

        let reconciler = BookmarkReconciler::new(
            Arc::clone(&store),
            remote,
            booker,
            ReconcilePolicy::RemoteWins,
        );
        assert_eq!(reconciler.tick().await, ReconcileOutcome::InSync);
        assert!(!star.is_bookmarked());
        assert!(store.get_all().is_empty());
    }
}
