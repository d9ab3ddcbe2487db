//! # Bookmark runtime
//!
//! Wires one store, one bus and one reconciler from [`BookmarkRuntimeDeps`]
//! and hands out controls and listings bound to them. Every component created
//! here shares the same store, so they all observe the same bookmark set.

use std::sync::Arc;

use cb_core::ports::{ClipperSourcePort, KeyValueStoragePort, RemoteBookmarkPort};
use cb_core::{AppConfig, ClipperId, ClipperSummary};
use tracing::info;

use crate::bus::BookmarkEventBus;
use crate::store::BookmarkStore;
use crate::usecases::{
    BookmarkReconciler, BookmarkToggle, ConsumerOptions, DirectoryConsumer, ReconcileLoop,
    RemoteMirror,
};
use crate::visibility::PageVisibility;

/// Dependency grouping for [`BookmarkRuntime`]. Just parameters, no defaults.
pub struct BookmarkRuntimeDeps {
    // Local persistence
    pub storage: Arc<dyn KeyValueStoragePort>,

    // Mocked backend
    pub remote: Arc<dyn RemoteBookmarkPort>,

    // Served by listings whose source fails
    pub fallback_clippers: Vec<ClipperSummary>,
}

pub struct BookmarkRuntime {
    config: AppConfig,
    store: Arc<BookmarkStore>,
    visibility: PageVisibility,
    mirror: Arc<RemoteMirror>,
    reconciler: Arc<BookmarkReconciler>,
    fallback_clippers: Vec<ClipperSummary>,
}

impl BookmarkRuntime {
    pub fn from_deps(config: AppConfig, deps: BookmarkRuntimeDeps) -> Self {
        let BookmarkRuntimeDeps {
            storage,
            remote,
            fallback_clippers,
        } = deps;

        let store = Arc::new(BookmarkStore::new(
            storage,
            config.storage.key.clone(),
            BookmarkEventBus::new(),
        ));
        let mirror = Arc::new(RemoteMirror::new(
            Arc::clone(&remote),
            config.booker_id.clone(),
        ));
        let reconciler = Arc::new(BookmarkReconciler::new(
            Arc::clone(&store),
            remote,
            config.booker_id.clone(),
            config.reconcile.policy,
        ));

        info!(
            booker_id = %config.booker_id,
            key = %config.storage.key,
            policy = %config.reconcile.policy,
            "bookmark runtime ready"
        );

        Self {
            config,
            store,
            visibility: PageVisibility::default(),
            mirror,
            reconciler,
            fallback_clippers,
        }
    }

    pub fn config(&self) -> &AppConfig {
        &self.config
    }

    pub fn store(&self) -> &Arc<BookmarkStore> {
        &self.store
    }

    pub fn bus(&self) -> &BookmarkEventBus {
        self.store.bus()
    }

    pub fn visibility(&self) -> &PageVisibility {
        &self.visibility
    }

    pub fn reconciler(&self) -> &Arc<BookmarkReconciler> {
        &self.reconciler
    }

    /// A star control for `clipper_id` that also mirrors to the remote.
    pub fn toggle(&self, clipper_id: impl Into<ClipperId>, initial_hint: bool) -> BookmarkToggle {
        BookmarkToggle::mount(Arc::clone(&self.store), clipper_id.into(), initial_hint)
            .with_remote_mirror(Arc::clone(&self.mirror))
    }

    /// Mount a listing over `source` with the configured poll interval.
    pub async fn mount_consumer(
        &self,
        label: &str,
        source: Arc<dyn ClipperSourcePort>,
    ) -> DirectoryConsumer {
        let options = ConsumerOptions::new(label)
            .with_poll_interval(self.config.consumers.poll_interval)
            .with_visibility(self.visibility.watch())
            .with_fallback(self.fallback_clippers.clone());
        DirectoryConsumer::mount(Arc::clone(&self.store), source, options).await
    }

    /// Start periodic reconciliation. `None` when no interval is configured.
    pub fn start_reconcile_loop(&self) -> Option<ReconcileLoop> {
        let period = self.config.reconcile.interval?;
        Some(self.reconciler.spawn_loop(period, self.visibility.watch()))
    }
}
