use std::sync::Arc;
use std::time::Duration;

use anyhow::Result;
use cb_core::ports::RemoteBookmarkPort;
use cb_core::{BookerId, BookmarkSet, ReconcilePlan, ReconcilePolicy};
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;
use tracing::{debug, info, info_span, trace, warn, Instrument};

use crate::store::BookmarkStore;
use crate::visibility::VisibilityWatch;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SkipReason {
    /// The remote list could not be read or written.
    RemoteUnavailable,
    /// Local bookmarks changed while the remote call was in flight.
    LocalChanged,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReconcileOutcome {
    InSync,
    LocalOverwritten { set: BookmarkSet },
    RemoteUpdated { inserted: usize, deleted: usize },
    Merged { set: BookmarkSet, inserted: usize },
    Skipped(SkipReason),
}

/// Compares the local bookmark set with the remote table and resolves
/// differences according to a [`ReconcilePolicy`].
///
/// A tick never fails. Errors are logged and leave local state untouched.
pub struct BookmarkReconciler {
    store: Arc<BookmarkStore>,
    remote: Arc<dyn RemoteBookmarkPort>,
    booker_id: BookerId,
    policy: ReconcilePolicy,
}

impl BookmarkReconciler {
    pub fn new(
        store: Arc<BookmarkStore>,
        remote: Arc<dyn RemoteBookmarkPort>,
        booker_id: BookerId,
        policy: ReconcilePolicy,
    ) -> Self {
        Self {
            store,
            remote,
            booker_id,
            policy,
        }
    }

    pub fn policy(&self) -> ReconcilePolicy {
        self.policy
    }

    pub async fn tick(&self) -> ReconcileOutcome {
        let span = info_span!(
            "usecase.reconcile_bookmarks.tick",
            booker_id = %self.booker_id,
            policy = %self.policy
        );

        async {
            let local = self.store.get_all();
            let remote = match self.fetch_remote().await {
                Ok(remote) => remote,
                Err(e) => {
                    warn!(error = %e, "remote bookmark list unavailable, keeping local state");
                    return ReconcileOutcome::Skipped(SkipReason::RemoteUnavailable);
                }
            };

            match ReconcilePlan::decide(self.policy, &local, &remote) {
                ReconcilePlan::InSync => {
                    trace!(count = local.len(), "bookmarks in sync");
                    ReconcileOutcome::InSync
                }
                ReconcilePlan::OverwriteLocal { with } => {
                    match self.store.replace_if_unchanged(&local, with) {
                        Ok(set) => {
                            info!(
                                local = local.len(),
                                remote = set.len(),
                                "local bookmarks overwritten from remote"
                            );
                            ReconcileOutcome::LocalOverwritten { set }
                        }
                        Err(current) => {
                            debug!(current = current.len(), "local changed during fetch, skipping");
                            ReconcileOutcome::Skipped(SkipReason::LocalChanged)
                        }
                    }
                }
                ReconcilePlan::UpdateRemote { insert, delete } => {
                    match self.apply_remote(&insert, &delete).await {
                        Ok((inserted, deleted)) => {
                            info!(inserted, deleted, "remote bookmarks updated from local");
                            ReconcileOutcome::RemoteUpdated { inserted, deleted }
                        }
                        Err(e) => {
                            warn!(error = %e, "remote bookmark update failed");
                            ReconcileOutcome::Skipped(SkipReason::RemoteUnavailable)
                        }
                    }
                }
                ReconcilePlan::Merge {
                    merged,
                    insert_remote,
                } => {
                    let inserted = match self.apply_remote(&insert_remote, &BookmarkSet::new()).await
                    {
                        Ok((inserted, _)) => inserted,
                        Err(e) => {
                            warn!(error = %e, "remote bookmark merge failed");
                            return ReconcileOutcome::Skipped(SkipReason::RemoteUnavailable);
                        }
                    };
                    match self.store.replace_if_unchanged(&local, merged) {
                        Ok(set) => {
                            info!(total = set.len(), inserted, "bookmarks merged");
                            ReconcileOutcome::Merged { set, inserted }
                        }
                        Err(_) => {
                            debug!("local changed during merge, skipping local update");
                            ReconcileOutcome::Skipped(SkipReason::LocalChanged)
                        }
                    }
                }
            }
        }
        .instrument(span)
        .await
    }

    /// Upload the local set: insert ids the remote lacks, delete ids local
    /// lacks. Returns `(inserted, deleted)`.
    pub async fn push_local(&self) -> Result<(usize, usize)> {
        let span = info_span!("usecase.reconcile_bookmarks.push_local", booker_id = %self.booker_id);

        async {
            let local = self.store.get_all();
            let remote = self.fetch_remote().await?;
            let counts = self
                .apply_remote(&local.difference(&remote), &remote.difference(&local))
                .await?;
            info!(inserted = counts.0, deleted = counts.1, "local bookmarks pushed");
            Ok(counts)
        }
        .instrument(span)
        .await
    }

    /// Tick every `period` while visible until `shutdown` flips to `true` or
    /// its sender is dropped. A zero period returns at once.
    pub async fn run(
        &self,
        period: Duration,
        visibility: VisibilityWatch,
        mut shutdown: watch::Receiver<bool>,
    ) {
        if period.is_zero() {
            warn!("reconcile period is zero, loop not started");
            return;
        }
        let mut ticker = tokio::time::interval(period);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
        ticker.tick().await;

        info!(period_ms = period.as_millis() as u64, policy = %self.policy, "reconcile loop started");
        loop {
            tokio::select! {
                _ = ticker.tick() => {
                    if !visibility.is_visible() {
                        trace!("page hidden, skipping reconcile");
                        continue;
                    }
                    let outcome = self.tick().await;
                    debug!(?outcome, "reconcile tick finished");
                }
                changed = shutdown.changed() => {
                    if changed.is_err() || *shutdown.borrow() {
                        break;
                    }
                }
            }
        }
        info!("reconcile loop stopped");
    }

    /// Run [`BookmarkReconciler::run`] on a spawned task.
    pub fn spawn_loop(self: &Arc<Self>, period: Duration, visibility: VisibilityWatch) -> ReconcileLoop {
        let (shutdown_tx, shutdown_rx) = watch::channel(false);
        let reconciler = Arc::clone(self);
        let handle = tokio::spawn(async move {
            reconciler.run(period, visibility, shutdown_rx).await;
        });
        ReconcileLoop {
            shutdown: shutdown_tx,
            handle: Some(handle),
        }
    }

    async fn fetch_remote(&self) -> Result<BookmarkSet> {
        let records = self.remote.list(&self.booker_id).await?;
        Ok(records
            .into_iter()
            .filter(|record| record.booker_id == self.booker_id)
            .map(|record| record.clipper_id)
            .collect())
    }

    async fn apply_remote(
        &self,
        insert: &BookmarkSet,
        delete: &BookmarkSet,
    ) -> Result<(usize, usize)> {
        for id in insert {
            self.remote.insert(&self.booker_id, id, None).await?;
        }
        for id in delete {
            self.remote.delete(&self.booker_id, id).await?;
        }
        Ok((insert.len(), delete.len()))
    }
}

/// Handle to a spawned reconcile loop. Dropping it aborts the task.
pub struct ReconcileLoop {
    shutdown: watch::Sender<bool>,
    handle: Option<JoinHandle<()>>,
}

impl ReconcileLoop {
    pub fn is_running(&self) -> bool {
        self.handle
            .as_ref()
            .is_some_and(|handle| !handle.is_finished())
    }

    /// Ask the loop to stop after its current tick and wait for it.
    pub async fn shutdown(mut self) {
        self.shutdown.send_replace(true);
        if let Some(handle) = self.handle.take() {
            if let Err(e) = handle.await {
                warn!(error = %e, "reconcile loop ended abnormally");
            }
        }
    }
}

impl Drop for ReconcileLoop {
    fn drop(&mut self) {
        if let Some(handle) = self.handle.take() {
            handle.abort();
        }
    }
}
