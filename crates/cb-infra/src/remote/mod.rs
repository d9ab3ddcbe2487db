//! Mocked remote bookmark table.

mod mock_bookmarks;

pub use mock_bookmarks::MockRemoteBookmarks;
