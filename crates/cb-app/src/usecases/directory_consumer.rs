//! Listing views over a clipper source with the bookmark overlay applied.
//!
//! The directory page, the dashboard widget and the marketplace listing are
//! all a [`DirectoryConsumer`] mounted with a different [`ClipperSourcePort`].
//! A mounted consumer recomputes every `is_bookmarked` from the store whenever
//! the bus reports a change, and optionally re-reads the store on a timer
//! while the page is visible.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, Weak};
use std::time::Duration;

use cb_core::ports::ClipperSourcePort;
use cb_core::{ClipperId, ClipperSummary, ClipperView, ListFilter};
use tokio::sync::watch;
use tokio::task::AbortHandle;
use tokio::time::MissedTickBehavior;
use tracing::{debug, info, info_span, trace, warn, Instrument};

use crate::bus::Subscription;
use crate::store::BookmarkStore;
use crate::visibility::VisibilityWatch;

pub struct ConsumerOptions {
    /// Name used in logs, e.g. "directory" or "dashboard".
    pub label: String,
    /// Store re-read period. `None` or zero relies on bus events alone.
    pub poll_interval: Option<Duration>,
    pub visibility: VisibilityWatch,
    /// Served when the source fails on mount.
    pub fallback: Vec<ClipperSummary>,
}

impl ConsumerOptions {
    pub fn new(label: impl Into<String>) -> Self {
        Self {
            label: label.into(),
            ..Self::default()
        }
    }

    pub fn with_poll_interval(mut self, poll_interval: Option<Duration>) -> Self {
        self.poll_interval = poll_interval;
        self
    }

    pub fn with_visibility(mut self, visibility: VisibilityWatch) -> Self {
        self.visibility = visibility;
        self
    }

    pub fn with_fallback(mut self, fallback: Vec<ClipperSummary>) -> Self {
        self.fallback = fallback;
        self
    }
}

impl Default for ConsumerOptions {
    fn default() -> Self {
        Self {
            label: "directory".to_string(),
            poll_interval: None,
            visibility: VisibilityWatch::always_visible(),
            fallback: Vec::new(),
        }
    }
}

struct ConsumerShared {
    label: String,
    store: Arc<BookmarkStore>,
    summaries: Mutex<Vec<ClipperSummary>>,
    views: Mutex<Vec<ClipperView>>,
    revision: watch::Sender<u64>,
}

impl ConsumerShared {
    /// Re-derive views from one store read. Bumps the revision only when the
    /// rendered views differ.
    ///
    /// The store is read while `views` is held, so two concurrent recomputes
    /// write in the order they read and the last write reflects the newest
    /// set. Lock order is `views`, then the store, then `summaries`.
    fn recompute(&self) -> bool {
        let mut views = lock(&self.views);
        let bookmarks = self.store.get_all();
        let next = {
            let summaries = lock(&self.summaries);
            ClipperView::project(&summaries, &bookmarks)
        };
        if *views == next {
            return false;
        }
        *views = next;

        self.revision.send_modify(|revision| *revision += 1);
        trace!(
            label = %self.label,
            bookmarked = bookmarks.len(),
            revision = *self.revision.borrow(),
            "listing recomputed"
        );
        true
    }
}

pub struct DirectoryConsumer {
    shared: Arc<ConsumerShared>,
    source: Arc<dyn ClipperSourcePort>,
    fallback: Vec<ClipperSummary>,
    using_fallback: AtomicBool,
    poller: Option<AbortHandle>,
    _subscription: Subscription,
}

impl DirectoryConsumer {
    /// Fetch the clipper list, subscribe to bookmark changes and start the
    /// optional poller. Never fails: a failing source yields the fallback
    /// list.
    pub async fn mount(
        store: Arc<BookmarkStore>,
        source: Arc<dyn ClipperSourcePort>,
        options: ConsumerOptions,
    ) -> Self {
        let span = info_span!(
            "usecase.directory_consumer.mount",
            label = %options.label,
            source = source.name()
        );

        async move {
            let ConsumerOptions {
                label,
                poll_interval,
                visibility,
                fallback,
            } = options;

            let (summaries, using_fallback) = match source.fetch_clippers().await {
                Ok(summaries) => (summaries, false),
                Err(e) => {
                    warn!(error = %e, "clipper source failed, using sample list");
                    (fallback.clone(), true)
                }
            };

            let (revision, _) = watch::channel(0);
            let shared = Arc::new(ConsumerShared {
                label,
                store: Arc::clone(&store),
                summaries: Mutex::new(summaries),
                views: Mutex::new(Vec::new()),
                revision,
            });

            // Subscribe before the first read so no change falls in between.
            let weak_shared: Weak<ConsumerShared> = Arc::downgrade(&shared);
            let subscription = store.bus().subscribe(move |_event| {
                if let Some(shared) = weak_shared.upgrade() {
                    shared.recompute();
                }
            });
            shared.recompute();

            // A zero period means no polling.
            let poller = poll_interval
                .filter(|period| !period.is_zero())
                .map(|period| spawn_poller(Arc::clone(&shared), period, visibility));

            info!(
                clippers = lock(&shared.views).len(),
                using_fallback,
                polling = poller.is_some(),
                "listing mounted"
            );

            Self {
                shared,
                source,
                fallback,
                using_fallback: AtomicBool::new(using_fallback),
                poller,
                _subscription: subscription,
            }
        }
        .instrument(span)
        .await
    }

    pub fn label(&self) -> &str {
        &self.shared.label
    }

    /// Whether the rendered list is the fallback sample list.
    pub fn is_fallback(&self) -> bool {
        self.using_fallback.load(Ordering::SeqCst)
    }

    pub fn views(&self, filter: &ListFilter) -> Vec<ClipperView> {
        filter.apply(lock(&self.shared.views).iter())
    }

    pub fn view(&self, id: &ClipperId) -> Option<ClipperView> {
        lock(&self.shared.views)
            .iter()
            .find(|view| view.id() == id)
            .cloned()
    }

    /// Ids rendered as bookmarked, in listing order.
    pub fn bookmarked_ids(&self) -> Vec<ClipperId> {
        lock(&self.shared.views)
            .iter()
            .filter(|view| view.is_bookmarked)
            .map(|view| view.id().clone())
            .collect()
    }

    /// Bumped every time the rendered views change.
    pub fn revision(&self) -> u64 {
        *self.shared.revision.borrow()
    }

    /// Wait for the next change of the rendered views and return its revision.
    pub async fn changed(&self) -> u64 {
        let mut rx = self.shared.revision.subscribe();
        // The sender lives in `self.shared`, so this cannot observe a close.
        let _ = rx.changed().await;
        let revision = *rx.borrow_and_update();
        revision
    }

    /// Re-read the store now. Returns whether the views changed.
    pub fn resync(&self) -> bool {
        self.shared.recompute()
    }

    /// Fetch the clipper list again. On failure the current list is kept.
    pub async fn refresh(&self) {
        let span = info_span!(
            "usecase.directory_consumer.refresh",
            label = %self.shared.label,
            source = self.source.name()
        );

        async {
            match self.source.fetch_clippers().await {
                Ok(summaries) => {
                    *lock(&self.shared.summaries) = summaries;
                    self.using_fallback.store(false, Ordering::SeqCst);
                    self.shared.recompute();
                    debug!("listing refreshed");
                }
                Err(e) => {
                    warn!(error = %e, "clipper source refresh failed, keeping current list");
                    if lock(&self.shared.summaries).is_empty() && !self.fallback.is_empty() {
                        *lock(&self.shared.summaries) = self.fallback.clone();
                        self.using_fallback.store(true, Ordering::SeqCst);
                        self.shared.recompute();
                    }
                }
            }
        }
        .instrument(span)
        .await
    }

    pub fn is_polling(&self) -> bool {
        self.poller
            .as_ref()
            .is_some_and(|handle| !handle.is_finished())
    }

    /// Stop polling and stop listening. Dropping the consumer does the same.
    pub fn unmount(self) {}
}

impl Drop for DirectoryConsumer {
    fn drop(&mut self) {
        if let Some(handle) = self.poller.take() {
            handle.abort();
            debug!(label = %self.shared.label, "listing poller stopped");
        }
    }
}

fn spawn_poller(
    shared: Arc<ConsumerShared>,
    period: Duration,
    visibility: VisibilityWatch,
) -> AbortHandle {
    let handle = tokio::spawn(async move {
        let mut ticker = tokio::time::interval(period);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
        // The first tick completes immediately; mount already read the store.
        ticker.tick().await;

        loop {
            ticker.tick().await;
            if !visibility.is_visible() {
                trace!(label = %shared.label, "page hidden, skipping poll");
                continue;
            }
            if shared.recompute() {
                debug!(label = %shared.label, "poll picked up an unannounced change");
            }
        }
    });
    handle.abort_handle()
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(|e| e.into_inner())
}
