use serde::{Deserialize, Serialize};

use super::BookmarkSet;
use crate::ids::ClipperId;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BookmarkAction {
    Add,
    Remove,
    /// The whole set was overwritten (reset or reconciliation).
    Replace,
}

/// One state transition of the [`BookmarkSet`], broadcast in-process.
///
/// Wire shape: `{ "clipperId": "c1", "action": "add", "bookmarkedIds": [...] }`.
/// `clipperId` is `null` for [`BookmarkAction::Replace`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BookmarkChangeEvent {
    pub clipper_id: Option<ClipperId>,
    pub action: BookmarkAction,
    pub bookmarked_ids: Vec<ClipperId>,
}

impl BookmarkChangeEvent {
    pub fn added(clipper_id: ClipperId, resulting: &BookmarkSet) -> Self {
        Self {
            clipper_id: Some(clipper_id),
            action: BookmarkAction::Add,
            bookmarked_ids: resulting.to_sorted_vec(),
        }
    }

    pub fn removed(clipper_id: ClipperId, resulting: &BookmarkSet) -> Self {
        Self {
            clipper_id: Some(clipper_id),
            action: BookmarkAction::Remove,
            bookmarked_ids: resulting.to_sorted_vec(),
        }
    }

    pub fn replaced(resulting: &BookmarkSet) -> Self {
        Self {
            clipper_id: None,
            action: BookmarkAction::Replace,
            bookmarked_ids: resulting.to_sorted_vec(),
        }
    }

    /// Whether this event may have changed the membership of `id`.
    pub fn affects(&self, id: &ClipperId) -> bool {
        match &self.clipper_id {
            Some(changed) => changed == id,
            None => true,
        }
    }

    pub fn resulting_set(&self) -> BookmarkSet {
        self.bookmarked_ids.iter().cloned().collect()
    }
}

/// Event-type names a listener can register under.
///
/// Every change is published once as a typed message; the legacy name is an
/// alias kept for listeners that predate the rename.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EventName {
    Changed,
    /// Deprecated alias of [`EventName::Changed`].
    LegacyUpdated,
}

impl EventName {
    pub fn as_str(self) -> &'static str {
        match self {
            EventName::Changed => "bookmarks:changed",
            EventName::LegacyUpdated => "clipper-bookmark-updated",
        }
    }

    pub fn is_deprecated(self) -> bool {
        self == EventName::LegacyUpdated
    }

    pub fn all() -> [EventName; 2] {
        [EventName::Changed, EventName::LegacyUpdated]
    }
}
