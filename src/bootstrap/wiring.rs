//! # Dependency Wiring
//!
//! The only place that knows concrete adapters. Everything it builds is
//! handed to [`BookmarkRuntime`] as port trait objects.

use std::sync::Arc;

use anyhow::Context;
use cb_app::{BookmarkRuntime, BookmarkRuntimeDeps};
use cb_core::config::{AppConfig, StorageBackend, StorageConfig};
use cb_core::ports::{ClipperSourcePort, KeyValueStoragePort};
use cb_infra::{sample_clippers, FileKeyValueStorage, InMemoryKeyValueStorage, MockClipperCatalog, MockRemoteBookmarks};
use tracing::info;

/// A runtime plus the concrete mocks the CLI needs to seed and inspect.
pub struct WiredRuntime {
    pub runtime: BookmarkRuntime,
    pub remote: Arc<MockRemoteBookmarks>,
    pub catalog: Arc<dyn ClipperSourcePort>,
}

pub fn build_storage(config: &StorageConfig) -> anyhow::Result<Arc<dyn KeyValueStoragePort>> {
    let storage: Arc<dyn KeyValueStoragePort> = match config.backend {
        StorageBackend::Memory => Arc::new(InMemoryKeyValueStorage::new()),
        StorageBackend::File => Arc::new(
            FileKeyValueStorage::new(&config.path).with_context(|| {
                format!("Failed to open bookmark storage at {}", config.path.display())
            })?,
        ),
    };
    info!(backend = ?config.backend, path = %config.path.display(), "bookmark storage ready");
    Ok(storage)
}

pub fn wire_runtime(config: AppConfig) -> anyhow::Result<WiredRuntime> {
    let storage = build_storage(&config.storage)?;
    let remote = Arc::new(MockRemoteBookmarks::new(config.remote.latency));
    let catalog: Arc<dyn ClipperSourcePort> = Arc::new(
        MockClipperCatalog::new("catalog", sample_clippers()).with_latency(config.remote.latency),
    );

    let runtime = BookmarkRuntime::from_deps(
        config,
        BookmarkRuntimeDeps {
            storage,
            remote: remote.clone(),
            fallback_clippers: sample_clippers(),
        },
    );

    Ok(WiredRuntime {
        runtime,
        remote,
        catalog,
    })
}
