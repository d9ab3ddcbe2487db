//! Clipper bookmark orchestration layer
//!
//! Owns the serialized bookmark store, the in-process event bus, and the use
//! cases built on them: toggle controls, directory listings, and remote
//! reconciliation.

pub mod bus;
pub mod runtime;
pub mod store;
pub mod usecases;
pub mod visibility;

pub use bus::{BookmarkEventBus, Subscription};
pub use runtime::{BookmarkRuntime, BookmarkRuntimeDeps};
pub use store::{BookmarkStore, ToggleOutcome};
pub use usecases::{
    BookmarkReconciler, BookmarkToggle, ConsumerOptions, DirectoryConsumer, ReconcileLoop,
    ReconcileOutcome, RemoteMirror, SkipReason,
};
pub use visibility::{PageVisibility, Visibility, VisibilityWatch};
