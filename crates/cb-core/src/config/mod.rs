//! Configuration data structures and the TOML → DTO mapping.

pub mod app_config;

pub use app_config::{
    AppConfig, ConsumerConfig, LoggingConfig, ReconcileConfig, RemoteConfig, StorageBackend,
    StorageConfig, DEFAULT_STORAGE_KEY,
};
