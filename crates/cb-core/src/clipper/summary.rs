use serde::{Deserialize, Serialize};

use crate::bookmark::BookmarkSet;
use crate::ids::ClipperId;

/// Read-only display record for a clipper.
///
/// Bookmark state is deliberately absent; see [`ClipperView`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClipperSummary {
    pub id: ClipperId,
    pub display_name: String,
    pub avatar_url: String,
    pub subscriber_count: u64,
    pub view_count: u64,
    pub note: Option<String>,
}

impl ClipperSummary {
    pub fn new(id: impl Into<ClipperId>, display_name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            display_name: display_name.into(),
            avatar_url: String::new(),
            subscriber_count: 0,
            view_count: 0,
            note: None,
        }
    }

    pub fn with_avatar(mut self, avatar_url: impl Into<String>) -> Self {
        self.avatar_url = avatar_url.into();
        self
    }

    pub fn with_counts(mut self, subscriber_count: u64, view_count: u64) -> Self {
        self.subscriber_count = subscriber_count;
        self.view_count = view_count;
        self
    }

    pub fn with_note(mut self, note: impl Into<String>) -> Self {
        self.note = Some(note.into());
        self
    }
}

/// A summary with `is_bookmarked` derived from one [`BookmarkSet`] snapshot.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClipperView {
    #[serde(flatten)]
    pub summary: ClipperSummary,
    pub is_bookmarked: bool,
}

impl ClipperView {
    pub fn derive(summary: ClipperSummary, bookmarks: &BookmarkSet) -> Self {
        let is_bookmarked = bookmarks.contains(&summary.id);
        Self {
            summary,
            is_bookmarked,
        }
    }

    /// Project every summary against the same snapshot so that all rows of a
    /// render agree with each other.
    pub fn project(summaries: &[ClipperSummary], bookmarks: &BookmarkSet) -> Vec<ClipperView> {
        summaries
            .iter()
            .cloned()
            .map(|summary| Self::derive(summary, bookmarks))
            .collect()
    }

    pub fn id(&self) -> &ClipperId {
        &self.summary.id
    }
}
