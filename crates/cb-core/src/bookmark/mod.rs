//! Bookmark domain models: the starred set, its persisted document, and
//! the change events broadcast when it mutates.

pub mod document;
pub mod event;
pub mod set;

pub use document::{
    BookmarkDocument, BookmarkMigration, BookmarkMigrator, DecodedDocument, DocumentError,
    CURRENT_SCHEMA_VERSION, LEGACY_SCHEMA_VERSION,
};
pub use event::{BookmarkAction, BookmarkChangeEvent, EventName};
pub use set::BookmarkSet;
