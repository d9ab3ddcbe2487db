//! Clipper display records and the bookmark overlay derived from them.

pub mod filter;
pub mod summary;

pub use filter::ListFilter;
pub use summary::{ClipperSummary, ClipperView};
