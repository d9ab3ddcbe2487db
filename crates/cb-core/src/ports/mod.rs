//! Port interfaces for the application layer
//!
//! Ports define the contract between the bookmark use cases and the
//! infrastructure that backs them (key-value storage, the remote bookmark
//! table, clipper sources). The application layer depends only on these
//! traits.

pub mod clipper_source;
pub mod remote_bookmarks;
pub mod storage;

pub use clipper_source::ClipperSourcePort;
pub use remote_bookmarks::{RemoteBookmarkPort, RemoteBookmarkRecord};
pub use storage::{KeyValueStoragePort, StorageError};
