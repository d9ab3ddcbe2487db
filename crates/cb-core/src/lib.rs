//! # cb-core
//!
//! Core domain models and ports for clipper bookmark synchronization.
//!
//! This crate contains pure business logic without any infrastructure dependencies.

pub mod bookmark;
pub mod clipper;
pub mod config;
pub mod ids;
pub mod ports;
pub mod reconcile;

// Re-export commonly used types at the crate root
pub use bookmark::{BookmarkAction, BookmarkChangeEvent, BookmarkDocument, BookmarkSet, EventName};
pub use clipper::{ClipperSummary, ClipperView, ListFilter};
pub use config::AppConfig;
pub use ids::{BookerId, ClipperId};
pub use reconcile::{ReconcilePlan, ReconcilePolicy};
