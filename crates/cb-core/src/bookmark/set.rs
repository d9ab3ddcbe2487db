use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

use crate::ids::ClipperId;

/// The collection of clipper ids a booker has starred.
///
/// Membership is the only meaningful property. The backing set is ordered so
/// that persisted output and equality checks are deterministic.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct BookmarkSet(BTreeSet<ClipperId>);

impl BookmarkSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn contains(&self, id: &ClipperId) -> bool {
        self.0.contains(id)
    }

    /// Returns `true` if the id was not present before.
    pub fn insert(&mut self, id: ClipperId) -> bool {
        self.0.insert(id)
    }

    /// Returns `true` if the id was present.
    pub fn remove(&mut self, id: &ClipperId) -> bool {
        self.0.remove(id)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &ClipperId> {
        self.0.iter()
    }

    /// Sorted id list, the form used for comparison with remote state and for
    /// event payloads.
    pub fn to_sorted_vec(&self) -> Vec<ClipperId> {
        self.0.iter().cloned().collect()
    }

    pub fn union(&self, other: &BookmarkSet) -> BookmarkSet {
        self.0.union(&other.0).cloned().collect()
    }

    /// Ids present in `self` but not in `other`.
    pub fn difference(&self, other: &BookmarkSet) -> BookmarkSet {
        self.0.difference(&other.0).cloned().collect()
    }
}

impl FromIterator<ClipperId> for BookmarkSet {
    fn from_iter<T: IntoIterator<Item = ClipperId>>(iter: T) -> Self {
        Self(iter.into_iter().collect())
    }
}

impl IntoIterator for BookmarkSet {
    type Item = ClipperId;
    type IntoIter = std::collections::btree_set::IntoIter<ClipperId>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.into_iter()
    }
}

impl<'a> IntoIterator for &'a BookmarkSet {
    type Item = &'a ClipperId;
    type IntoIter = std::collections::btree_set::Iter<'a, ClipperId>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.iter()
    }
}

impl<const N: usize> From<[&str; N]> for BookmarkSet {
    fn from(ids: [&str; N]) -> Self {
        ids.into_iter().map(ClipperId::from).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn insert_reports_whether_membership_changed() {
        let mut set = BookmarkSet::new();
        assert!(set.insert(ClipperId::from("c1")));
        assert!(!set.insert(ClipperId::from("c1")));
        assert_eq!(set.len(), 1);
    }

    #[test]
    fn remove_absent_id_is_noop() {
        let mut set = BookmarkSet::from(["c1"]);
        assert!(!set.remove(&ClipperId::from("c2")));
        assert_eq!(set, BookmarkSet::from(["c1"]));
    }

    #[test]
    fn insertion_order_does_not_affect_equality() {
        let a = BookmarkSet::from(["c2", "c1"]);
        let b = BookmarkSet::from(["c1", "c2"]);
        assert_eq!(a, b);
        assert_eq!(
            a.to_sorted_vec(),
            vec![ClipperId::from("c1"), ClipperId::from("c2")]
        );
    }

    #[test]
    fn union_and_difference() {
        let local = BookmarkSet::from(["c1", "c2"]);
        let remote = BookmarkSet::from(["c2", "c3"]);
        assert_eq!(local.union(&remote), BookmarkSet::from(["c1", "c2", "c3"]));
        assert_eq!(local.difference(&remote), BookmarkSet::from(["c1"]));
        assert_eq!(remote.difference(&local), BookmarkSet::from(["c3"]));
    }

    #[test]
    fn serializes_as_json_array() {
        let set = BookmarkSet::from(["b", "a"]);
        assert_eq!(serde_json::to_string(&set).unwrap(), r#"["a","b"]"#);
    }
}
