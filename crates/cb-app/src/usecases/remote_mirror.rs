use std::sync::{Arc, Mutex};

use anyhow::Result;
use cb_core::ports::RemoteBookmarkPort;
use cb_core::{BookerId, BookmarkAction, ClipperId};
use tokio::sync::{mpsc, oneshot};
use tracing::{debug, warn};

/// Best-effort forwarding of single local toggles to the remote table.
///
/// Queued operations are applied one at a time, in the order they were
/// queued, by a worker task started on first use.
pub struct RemoteMirror {
    target: Arc<MirrorTarget>,
    queue: Mutex<Option<mpsc::UnboundedSender<MirrorOp>>>,
}

struct MirrorTarget {
    remote: Arc<dyn RemoteBookmarkPort>,
    booker_id: BookerId,
}

struct MirrorOp {
    /// `None` marks a flush point.
    change: Option<(BookmarkAction, ClipperId)>,
    done: Option<oneshot::Sender<()>>,
}

impl MirrorTarget {
    async fn apply(&self, action: BookmarkAction, clipper_id: &ClipperId) -> Result<()> {
        match action {
            BookmarkAction::Add => self.remote.insert(&self.booker_id, clipper_id, None).await,
            BookmarkAction::Remove => self.remote.delete(&self.booker_id, clipper_id).await,
            // Whole-set changes are the reconciler's business.
            BookmarkAction::Replace => Ok(()),
        }
    }

    async fn apply_logged(&self, action: BookmarkAction, clipper_id: &ClipperId) {
        match self.apply(action, clipper_id).await {
            Ok(()) => debug!(clipper_id = %clipper_id, ?action, "mirrored bookmark to remote"),
            Err(e) => warn!(clipper_id = %clipper_id, ?action, error = %e, "remote mirror failed"),
        }
    }
}

impl RemoteMirror {
    pub fn new(remote: Arc<dyn RemoteBookmarkPort>, booker_id: BookerId) -> Self {
        Self {
            target: Arc::new(MirrorTarget { remote, booker_id }),
            queue: Mutex::new(None),
        }
    }

    /// Queue an operation behind everything queued before it. Returns
    /// `false` outside a Tokio runtime, in which case nothing is sent.
    pub fn enqueue(&self, action: BookmarkAction, clipper_id: ClipperId) -> bool {
        self.send(MirrorOp {
            change: Some((action, clipper_id)),
            done: None,
        })
    }

    /// Queue an operation and wait until the worker has applied it.
    /// Failures are only logged.
    pub async fn apply_in_order(&self, action: BookmarkAction, clipper_id: ClipperId) {
        self.send_and_wait(Some((action, clipper_id))).await;
    }

    /// Wait for everything queued so far to be applied.
    pub async fn flush(&self) {
        self.send_and_wait(None).await;
    }

    async fn send_and_wait(&self, change: Option<(BookmarkAction, ClipperId)>) {
        let (done_tx, done_rx) = oneshot::channel();
        let queued = self.send(MirrorOp {
            change,
            done: Some(done_tx),
        });
        if queued {
            let _ = done_rx.await;
        }
    }

    fn send(&self, op: MirrorOp) -> bool {
        let mut queue = self.queue.lock().unwrap_or_else(|e| e.into_inner());
        if let Some(tx) = queue.as_ref().filter(|tx| !tx.is_closed()) {
            return tx.send(op).is_ok();
        }

        let Ok(handle) = tokio::runtime::Handle::try_current() else {
            debug!("no runtime, remote mirror skipped");
            return false;
        };
        let (tx, rx) = mpsc::unbounded_channel();
        handle.spawn(run_worker(Arc::clone(&self.target), rx));
        let sent = tx.send(op).is_ok();
        *queue = Some(tx);
        sent
    }
}

/// Drains the queue until the owning mirror is dropped. Holds only the
/// target, never the mirror.
async fn run_worker(target: Arc<MirrorTarget>, mut rx: mpsc::UnboundedReceiver<MirrorOp>) {
    while let Some(op) = rx.recv().await {
        if let Some((action, clipper_id)) = &op.change {
            target.apply_logged(*action, clipper_id).await;
        }
        if let Some(done) = op.done {
            let _ = done.send(());
        }
    }
    debug!("remote mirror worker stopped");
}

#[cfg(test)]
pub(crate) mod testing {
    use std::time::Duration;

    use async_trait::async_trait;
    use cb_core::ports::RemoteBookmarkRecord;
    use cb_infra::MockRemoteBookmarks;

    use super::*;

    /// Remote whose inserts are slower than its deletes.
    pub(crate) struct UnevenLatencyRemote {
        pub(crate) inner: Arc<MockRemoteBookmarks>,
        pub(crate) insert_delay: Duration,
        pub(crate) delete_delay: Duration,
    }

    impl UnevenLatencyRemote {
        pub(crate) fn new(insert_delay: Duration, delete_delay: Duration) -> Self {
            Self {
                inner: Arc::new(MockRemoteBookmarks::default()),
                insert_delay,
                delete_delay,
            }
        }
    }

    #[async_trait]
    impl RemoteBookmarkPort for UnevenLatencyRemote {
        async fn list(&self, booker_id: &BookerId) -> Result<Vec<RemoteBookmarkRecord>> {
            self.inner.list(booker_id).await
        }

        async fn insert(
            &self,
            booker_id: &BookerId,
            clipper_id: &ClipperId,
            notes: Option<String>,
        ) -> Result<()> {
            tokio::time::sleep(self.insert_delay).await;
            self.inner.insert(booker_id, clipper_id, notes).await
        }

        async fn delete(&self, booker_id: &BookerId, clipper_id: &ClipperId) -> Result<()> {
            tokio::time::sleep(self.delete_delay).await;
            self.inner.delete(booker_id, clipper_id).await
        }
    }
}
