use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

use anyhow::{bail, Result};
use async_trait::async_trait;

use cb_core::ports::ClipperSourcePort;
use cb_core::ClipperSummary;

/// Mocked catalog client returning a canned clipper list.
pub struct MockClipperCatalog {
    name: String,
    clippers: Vec<ClipperSummary>,
    latency: Duration,
    failing: AtomicBool,
}

impl MockClipperCatalog {
    pub fn new(name: impl Into<String>, clippers: Vec<ClipperSummary>) -> Self {
        Self {
            name: name.into(),
            clippers,
            latency: Duration::ZERO,
            failing: AtomicBool::new(false),
        }
    }

    /// A catalog that fails every fetch.
    pub fn failing(name: impl Into<String>) -> Self {
        let catalog = Self::new(name, Vec::new());
        catalog.set_failing(true);
        catalog
    }

    pub fn with_latency(mut self, latency: Duration) -> Self {
        self.latency = latency;
        self
    }

    pub fn set_failing(&self, failing: bool) {
        self.failing.store(failing, Ordering::SeqCst);
    }
}

#[async_trait]
impl ClipperSourcePort for MockClipperCatalog {
    fn name(&self) -> &str {
        &self.name
    }

    async fn fetch_clippers(&self) -> Result<Vec<ClipperSummary>> {
        if !self.latency.is_zero() {
            tokio::time::sleep(self.latency).await;
        }
        if self.failing.load(Ordering::SeqCst) {
            bail!("mock catalog '{}' unavailable", self.name);
        }
        Ok(self.clippers.clone())
    }
}
