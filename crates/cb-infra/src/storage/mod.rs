//! Key-value storage adapters backing the bookmark document.

mod file;
mod in_memory;

pub use file::FileKeyValueStorage;
pub use in_memory::InMemoryKeyValueStorage;
