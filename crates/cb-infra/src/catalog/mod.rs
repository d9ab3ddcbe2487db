//! Clipper sources for listings: the mocked catalog client and the
//! built-in sample list used when it fails.

mod mock_catalog;
mod sample;

pub use mock_catalog::MockClipperCatalog;
pub use sample::sample_clippers;
