//! Bookmark use cases
//!
//! [BookmarkToggle] ──toggle──▶ [BookmarkStore] ──publish──▶ [BookmarkEventBus]
//!                                    ▲                               │
//!                                    │ get_all                       ▼
//!                           [DirectoryConsumer] ◀────────── every mounted listing
//!                                    ▲
//!                                    │ replace_if_unchanged
//!                           [BookmarkReconciler] ◀── mocked remote table

pub mod directory_consumer;
pub mod reconcile_bookmarks;
pub mod remote_mirror;
pub mod toggle_bookmark;

pub use directory_consumer::{ConsumerOptions, DirectoryConsumer};
pub use reconcile_bookmarks::{BookmarkReconciler, ReconcileLoop, ReconcileOutcome, SkipReason};
pub use remote_mirror::RemoteMirror;
pub use toggle_bookmark::BookmarkToggle;
