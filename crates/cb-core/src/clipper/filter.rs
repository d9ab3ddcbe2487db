use super::ClipperView;

/// Client-side list predicate. Holds no bookmark state of its own.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ListFilter {
    pub bookmarked_only: bool,
    pub query: Option<String>,
}

impl ListFilter {
    pub fn all() -> Self {
        Self::default()
    }

    pub fn bookmarked_only() -> Self {
        Self {
            bookmarked_only: true,
            query: None,
        }
    }

    pub fn with_query(mut self, query: impl Into<String>) -> Self {
        let query = query.into();
        self.query = if query.trim().is_empty() {
            None
        } else {
            Some(query)
        };
        self
    }

    pub fn matches(&self, view: &ClipperView) -> bool {
        if self.bookmarked_only && !view.is_bookmarked {
            return false;
        }

        match &self.query {
            None => true,
            Some(query) => {
                let needle = query.trim().to_lowercase();
                view.summary.display_name.to_lowercase().contains(&needle)
                    || view
                        .summary
                        .note
                        .as_deref()
                        .is_some_and(|note| note.to_lowercase().contains(&needle))
            }
        }
    }

    pub fn apply<'a>(&self, views: impl IntoIterator<Item = &'a ClipperView>) -> Vec<ClipperView> {
        views
            .into_iter()
            .filter(|view| self.matches(view))
            .cloned()
            .collect()
    }
}
