//! Item eligibility filter

use crate::source::Item;

/// Decides which items may appear on a page
///
/// An item qualifies when it is displayable (not deleted, non-blank URL) and,
/// if a query is set, its title, author, text or URL contains the query
/// case-insensitively.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StoryFilter {
    needle: Option<String>,
}

impl StoryFilter {
    /// Build a filter; blank queries match everything
    pub fn new(query: Option<&str>) -> Self {
        Self {
            needle: query
                .filter(|query| !query.trim().is_empty())
                .map(str::to_lowercase),
        }
    }

    /// Whether the item may be returned
    pub fn accepts(&self, item: &Item) -> bool {
        item.is_displayable() && self.matches(item)
    }

    /// Whether the item matches the query, ignoring displayability
    pub fn matches(&self, item: &Item) -> bool {
        let Some(needle) = &self.needle else {
            return true;
        };

        [&item.title, &item.by, &item.text, &item.url]
            .into_iter()
            .flatten()
            .any(|field| field.to_lowercase().contains(needle.as_str()))
    }
}
