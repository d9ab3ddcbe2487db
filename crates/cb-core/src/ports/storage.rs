use thiserror::Error;

/// Key-value storage errors.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum StorageError {
    /// Storage cannot be reached at all (disabled, private mode, I/O failure).
    #[error("storage unavailable: {0}")]
    Unavailable(String),

    /// The write would exceed the storage quota.
    #[error("storage quota exceeded: {0}")]
    QuotaExceeded(String),

    #[error("storage failed: {0}")]
    Other(String),
}

/// String key-value storage, the equivalent of a browser's local storage.
///
/// Calls are synchronous; implementations must be safe to share across
/// threads.
pub trait KeyValueStoragePort: Send + Sync {
    fn get(&self, key: &str) -> Result<Option<String>, StorageError>;

    fn set(&self, key: &str, value: &str) -> Result<(), StorageError>;

    fn delete(&self, key: &str) -> Result<(), StorageError>;
}

#[cfg(test)]
mockall::mock! {
    pub KeyValueStorage {}

    impl KeyValueStoragePort for KeyValueStorage {
        fn get(&self, key: &str) -> Result<Option<String>, StorageError>;
        fn set(&self, key: &str, value: &str) -> Result<(), StorageError>;
        fn delete(&self, key: &str) -> Result<(), StorageError>;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn mock_storage_reports_quota_error() {
        let mut storage = MockKeyValueStorage::new();
        storage
            .expect_set()
            .returning(|_, _| Err(StorageError::QuotaExceeded("5MB".into())));

        let err = storage.set("k", "v").unwrap_err();
        assert_eq!(err.to_string(), "storage quota exceeded: 5MB");
    }
}
