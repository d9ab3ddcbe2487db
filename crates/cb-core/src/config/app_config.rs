//! Application configuration domain model

use std::path::PathBuf;
use std::time::Duration;

use anyhow::anyhow;

use crate::ids::BookerId;
use crate::reconcile::ReconcilePolicy;

/// Key the bookmark document is stored under.
pub const DEFAULT_STORAGE_KEY: &str = "clipper_bookmarks";

const DEFAULT_BOOKER_ID: &str = "booker-local";
const DEFAULT_POLL_INTERVAL_MS: u64 = 5_000;
const DEFAULT_RECONCILE_INTERVAL_MS: u64 = 30_000;
const DEFAULT_REMOTE_LATENCY_MS: u64 = 50;

/// Application configuration
///
/// Every field has a default; a missing file or section yields the same
/// values as [`AppConfig::default`].
#[derive(Debug, Clone, PartialEq)]
pub struct AppConfig {
    /// Booker whose bookmarks are synchronized
    pub booker_id: BookerId,

    pub storage: StorageConfig,
    pub consumers: ConsumerConfig,
    pub reconcile: ReconcileConfig,
    pub remote: RemoteConfig,
    pub logging: LoggingConfig,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StorageBackend {
    /// Process-local map, lost on exit
    Memory,
    /// One JSON file per key under `StorageConfig::path`
    File,
}

#[derive(Debug, Clone, PartialEq)]
pub struct StorageConfig {
    pub backend: StorageBackend,
    pub path: PathBuf,
    pub key: String,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ConsumerConfig {
    /// `None` disables the fallback poll
    pub poll_interval: Option<Duration>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ReconcileConfig {
    /// `None` disables the periodic loop; ticks can still be run by hand
    pub interval: Option<Duration>,
    pub policy: ReconcilePolicy,
}

#[derive(Debug, Clone, PartialEq)]
pub struct RemoteConfig {
    /// Simulated latency of every mocked remote call
    pub latency: Duration,
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct LoggingConfig {
    /// Directory for the file log; stdout only when absent
    pub dir: Option<PathBuf>,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            booker_id: BookerId::from(DEFAULT_BOOKER_ID),
            storage: StorageConfig {
                backend: StorageBackend::Memory,
                path: PathBuf::from("data"),
                key: DEFAULT_STORAGE_KEY.to_string(),
            },
            consumers: ConsumerConfig {
                poll_interval: interval_from_ms(DEFAULT_POLL_INTERVAL_MS),
            },
            reconcile: ReconcileConfig {
                interval: interval_from_ms(DEFAULT_RECONCILE_INTERVAL_MS),
                policy: ReconcilePolicy::default(),
            },
            remote: RemoteConfig {
                latency: Duration::from_millis(DEFAULT_REMOTE_LATENCY_MS),
            },
            logging: LoggingConfig::default(),
        }
    }
}

impl AppConfig {
    /// Create AppConfig from TOML value
    ///
    /// Missing keys fall back to [`AppConfig::default`]. Present keys with an
    /// unknown enum value (backend, policy) are errors.
    pub fn from_toml(toml_value: &toml::Value) -> anyhow::Result<Self> {
        let defaults = Self::default();

        let str_at = |section: &str, key: &str| -> Option<String> {
            toml_value
                .get(section)
                .and_then(|s| s.get(key))
                .and_then(|v| v.as_str())
                .map(str::to_string)
        };
        let ms_at = |section: &str, key: &str| -> Option<u64> {
            toml_value
                .get(section)
                .and_then(|s| s.get(key))
                .and_then(|v| v.as_integer())
                .map(|v| v.max(0) as u64)
        };

        let backend = match str_at("storage", "backend").as_deref() {
            None => defaults.storage.backend,
            Some("memory") => StorageBackend::Memory,
            Some("file") => StorageBackend::File,
            Some(other) => return Err(anyhow!("unknown storage backend: {other}")),
        };

        let policy = match str_at("reconcile", "policy") {
            None => defaults.reconcile.policy,
            Some(raw) => raw.parse::<ReconcilePolicy>().map_err(|e| anyhow!(e))?,
        };

        Ok(Self {
            booker_id: toml_value
                .get("booker_id")
                .and_then(|v| v.as_str())
                .map(BookerId::from)
                .unwrap_or(defaults.booker_id),
            storage: StorageConfig {
                backend,
                path: str_at("storage", "path")
                    .map(PathBuf::from)
                    .unwrap_or(defaults.storage.path),
                key: str_at("storage", "key").unwrap_or(defaults.storage.key),
            },
            consumers: ConsumerConfig {
                poll_interval: ms_at("consumers", "poll_interval_ms")
                    .map(interval_from_ms)
                    .unwrap_or(defaults.consumers.poll_interval),
            },
            reconcile: ReconcileConfig {
                interval: ms_at("reconcile", "interval_ms")
                    .map(interval_from_ms)
                    .unwrap_or(defaults.reconcile.interval),
                policy,
            },
            remote: RemoteConfig {
                latency: ms_at("remote", "latency_ms")
                    .map(Duration::from_millis)
                    .unwrap_or(defaults.remote.latency),
            },
            logging: LoggingConfig {
                dir: str_at("logging", "dir").map(PathBuf::from),
            },
        })
    }
}

fn interval_from_ms(ms: u64) -> Option<Duration> {
    (ms > 0).then(|| Duration::from_millis(ms))
}
