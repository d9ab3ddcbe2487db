pub mod catalog;
pub mod remote;
pub mod storage;

pub use catalog::{sample_clippers, MockClipperCatalog};
pub use remote::MockRemoteBookmarks;
pub use storage::{FileKeyValueStorage, InMemoryKeyValueStorage};
