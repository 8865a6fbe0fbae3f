//! The query value object owned by the UI layer.
//!
//! [`ListingQuery`] bundles everything one search request carries: free text,
//! filters, sort key and page position. Builder methods construct it.
//! Transition methods (`set_*`, `clear_filter`) return a new query with the
//! page reset to 1, since a changed result set makes the old page position
//! meaningless.

use serde::{Deserialize, Serialize};

use crate::filter::{FilterSpec, FilterValue};
use crate::pagination::{PageRequest, PageState};
use crate::sort::SortKey;

/// A complete search request.
///
/// # Example
///
/// ```
/// use mypup_query::{ListingQuery, SortKey};
///
/// let query = ListingQuery::new()
///     .search("beagle")
///     .filter("verifiedOnly", true)
///     .filter("priceRange", (0.0, 1000.0))
///     .sort_by(SortKey::PriceLow)
///     .page(3);
///
/// // Changing the sort starts over from the first page.
/// let resorted = query.clone().set_sort(SortKey::Newest);
/// assert_eq!(resorted.page, 1);
/// assert_eq!(resorted.term, "beagle");
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ListingQuery {
    /// Free-text search term.
    pub term: String,
    pub filters: FilterSpec,
    pub sort: SortKey,
    /// 1-based page number.
    pub page: usize,
    /// Page size; `None` uses the profile default.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub items_per_page: Option<usize>,
}

impl Default for ListingQuery {
    fn default() -> Self {
        ListingQuery {
            term: String::new(),
            filters: FilterSpec::new(),
            sort: SortKey::default(),
            page: 1,
            items_per_page: None,
        }
    }
}

impl ListingQuery {
    /// Creates a query that matches everything, newest first.
    pub fn new() -> Self {
        ListingQuery::default()
    }

    // ========================================================================
    // Builders
    // ========================================================================

    pub fn search(mut self, term: impl Into<String>) -> Self {
        self.term = term.into();
        self
    }

    pub fn filter(mut self, key: impl Into<String>, value: impl Into<FilterValue>) -> Self {
        self.filters.set(key, value);
        self
    }

    pub fn filters(mut self, filters: FilterSpec) -> Self {
        self.filters = filters;
        self
    }

    pub fn sort_by(mut self, sort: SortKey) -> Self {
        self.sort = sort;
        self
    }

    pub fn page(mut self, page: usize) -> Self {
        self.page = page.max(1);
        self
    }

    pub fn items_per_page(mut self, n: usize) -> Self {
        self.items_per_page = Some(n.max(1));
        self
    }

    /// Applies a normalized raw page request.
    pub fn request(self, request: PageRequest) -> Self {
        self.page(request.page).items_per_page(request.items_per_page)
    }

    // ========================================================================
    // Transitions
    // ========================================================================

    /// Changes the search term and returns to page 1.
    pub fn set_term(self, term: impl Into<String>) -> Self {
        self.search(term).reset_page()
    }

    /// Changes one filter and returns to page 1.
    pub fn set_filter(self, key: impl Into<String>, value: impl Into<FilterValue>) -> Self {
        self.filter(key, value).reset_page()
    }

    /// Removes one filter and returns to page 1.
    pub fn clear_filter(mut self, key: &str) -> Self {
        self.filters.remove(key);
        self.reset_page()
    }

    /// Removes every filter and the search term, and returns to page 1.
    pub fn clear_all(self) -> Self {
        ListingQuery {
            term: String::new(),
            filters: FilterSpec::new(),
            ..self
        }
        .reset_page()
    }

    /// Changes the sort key and returns to page 1.
    pub fn set_sort(self, sort: SortKey) -> Self {
        self.sort_by(sort).reset_page()
    }

    /// Changes the page size and returns to page 1.
    pub fn set_items_per_page(self, n: usize) -> Self {
        self.items_per_page(n).reset_page()
    }

    pub fn reset_page(mut self) -> Self {
        self.page = 1;
        self
    }

    /// Moves to the page `state` points at.
    pub fn with_page_state(self, state: PageState) -> Self {
        self.page(state.current_page)
    }
}
