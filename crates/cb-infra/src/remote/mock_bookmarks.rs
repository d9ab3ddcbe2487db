use std::collections::BTreeMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

use anyhow::{bail, Result};
use async_trait::async_trait;
use tokio::sync::RwLock;
use tracing::debug;

use cb_core::ports::{RemoteBookmarkPort, RemoteBookmarkRecord};
use cb_core::{BookerId, BookmarkSet, ClipperId};

type BookerRows = BTreeMap<ClipperId, Option<String>>;

/// In-memory stand-in for the server-side bookmark table.
///
/// Every call sleeps for a fixed simulated latency. Calls can be made to fail
/// with [`MockRemoteBookmarks::set_failing`].
pub struct MockRemoteBookmarks {
    rows: RwLock<BTreeMap<BookerId, BookerRows>>,
    latency: Duration,
    failing: AtomicBool,
}

impl MockRemoteBookmarks {
    pub fn new(latency: Duration) -> Self {
        Self {
            rows: RwLock::new(BTreeMap::new()),
            latency,
            failing: AtomicBool::new(false),
        }
    }

    /// Replace a booker's rows, as if another device had written them.
    pub async fn seed(&self, booker_id: &BookerId, ids: &BookmarkSet) {
        let rows = ids.iter().map(|id| (id.clone(), None)).collect();
        self.rows.write().await.insert(booker_id.clone(), rows);
    }

    pub fn set_failing(&self, failing: bool) {
        self.failing.store(failing, Ordering::SeqCst);
    }

    /// Current ids for a booker, without simulated latency.
    pub async fn snapshot(&self, booker_id: &BookerId) -> BookmarkSet {
        self.rows
            .read()
            .await
            .get(booker_id)
            .map(|rows| rows.keys().cloned().collect())
            .unwrap_or_default()
    }

    async fn simulate_call(&self, op: &str) -> Result<()> {
        if !self.latency.is_zero() {
            tokio::time::sleep(self.latency).await;
        }
        if self.failing.load(Ordering::SeqCst) {
            bail!("mock remote {op} failed");
        }
        Ok(())
    }
}

impl Default for MockRemoteBookmarks {
    fn default() -> Self {
        Self::new(Duration::ZERO)
    }
}

#[async_trait]
impl RemoteBookmarkPort for MockRemoteBookmarks {
    async fn list(&self, booker_id: &BookerId) -> Result<Vec<RemoteBookmarkRecord>> {
        self.simulate_call("list").await?;

        let rows = self.rows.read().await;
        let records = rows
            .get(booker_id)
            .map(|rows| {
                rows.iter()
                    .map(|(clipper_id, notes)| RemoteBookmarkRecord {
                        booker_id: booker_id.clone(),
                        clipper_id: clipper_id.clone(),
                        notes: notes.clone(),
                    })
                    .collect()
            })
            .unwrap_or_default();

        Ok(records)
    }

    async fn insert(
        &self,
        booker_id: &BookerId,
        clipper_id: &ClipperId,
        notes: Option<String>,
    ) -> Result<()> {
        self.simulate_call("insert").await?;

        self.rows
            .write()
            .await
            .entry(booker_id.clone())
            .or_default()
            .insert(clipper_id.clone(), notes);
        debug!(booker_id = %booker_id, clipper_id = %clipper_id, "remote bookmark inserted");
        Ok(())
    }

    async fn delete(&self, booker_id: &BookerId, clipper_id: &ClipperId) -> Result<()> {
        self.simulate_call("delete").await?;

        if let Some(rows) = self.rows.write().await.get_mut(booker_id) {
            rows.remove(clipper_id);
        }
        debug!(booker_id = %booker_id, clipper_id = %clipper_id, "remote bookmark deleted");
        Ok(())
    }
}
