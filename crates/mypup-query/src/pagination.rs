//! Page slicing and navigation state.
//!
//! [`PageState`] is the immutable navigation value the UI owns; every
//! transition returns a new state with `current_page` clamped into
//! `[1, total_pages]`. [`paginate`] slices an ordered sequence into the
//! requested [`Page`].

use serde::Serialize;

/// Raw page request from the UI, normalized to valid values.
///
/// ```
/// use mypup_query::PageRequest;
///
/// assert_eq!(PageRequest::from_raw(f64::NAN, -5.0), PageRequest::new(1, 1));
/// assert_eq!(PageRequest::from_raw(2.9, 12.0), PageRequest::new(2, 12));
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageRequest {
    pub page: usize,
    pub items_per_page: usize,
}

impl PageRequest {
    /// Creates a request, raising zero values to 1.
    pub fn new(page: usize, items_per_page: usize) -> Self {
        PageRequest {
            page: page.max(1),
            items_per_page: items_per_page.max(1),
        }
    }

    /// Normalizes untrusted numeric input: non-finite, fractional-below-one
    /// and negative values become 1, fractions truncate.
    pub fn from_raw(page: f64, items_per_page: f64) -> Self {
        PageRequest::new(clamp_raw(page), clamp_raw(items_per_page))
    }
}

fn clamp_raw(n: f64) -> usize {
    if n.is_finite() && n >= 1.0 {
        // `as` saturates at usize::MAX.
        n as usize
    } else {
        1
    }
}

/// Pagination navigation state.
///
/// ```
/// use mypup_query::PageState;
///
/// let state = PageState::new(1, 10, 25);
/// assert_eq!(state.total_pages(), 3);
/// assert_eq!(state.next_page().current_page, 2);
/// assert_eq!(state.go_to_page(99).current_page, 3);
/// assert_eq!(state.go_to_page(0).current_page, 1);
/// assert_eq!(state.prev_page(), state);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct PageState {
    pub current_page: usize,
    pub items_per_page: usize,
    pub total_items: usize,
}

impl PageState {
    /// Creates a state with `current_page` clamped into range.
    pub fn new(current_page: usize, items_per_page: usize, total_items: usize) -> Self {
        PageState {
            current_page,
            items_per_page: items_per_page.max(1),
            total_items,
        }
        .clamp()
    }

    /// `ceil(total_items / items_per_page)`, at least 1.
    pub fn total_pages(&self) -> usize {
        self.total_items.div_ceil(self.items_per_page.max(1)).max(1)
    }

    /// Returns the state with `current_page` clamped into `[1, total_pages]`.
    pub fn clamp(self) -> Self {
        PageState {
            current_page: self.current_page.clamp(1, self.total_pages()),
            ..self
        }
    }

    pub fn has_next_page(&self) -> bool {
        self.current_page < self.total_pages()
    }

    pub fn has_prev_page(&self) -> bool {
        self.current_page > 1
    }

    /// Advances one page; unchanged on the last page.
    pub fn next_page(self) -> Self {
        if self.has_next_page() {
            PageState {
                current_page: self.current_page + 1,
                ..self
            }
        } else {
            self
        }
    }

    /// Goes back one page; unchanged on the first page.
    pub fn prev_page(self) -> Self {
        if self.has_prev_page() {
            PageState {
                current_page: self.current_page - 1,
                ..self
            }
        } else {
            self
        }
    }

    /// Jumps to `page`, clamped into range.
    pub fn go_to_page(self, page: usize) -> Self {
        PageState {
            current_page: page,
            ..self
        }
        .clamp()
    }

    /// Returns to the first page.
    pub fn reset(self) -> Self {
        PageState {
            current_page: 1,
            ..self
        }
    }

    /// Returns the state for a different result count, keeping the page when
    /// it is still in range.
    pub fn with_total_items(self, total_items: usize) -> Self {
        PageState {
            total_items,
            ..self
        }
        .clamp()
    }

    /// Zero-based slice bounds of the current page.
    pub fn bounds(&self) -> (usize, usize) {
        let start = self
            .current_page
            .saturating_sub(1)
            .saturating_mul(self.items_per_page);
        let start = start.min(self.total_items);
        let end = self
            .current_page
            .saturating_mul(self.items_per_page)
            .min(self.total_items);
        (start, end)
    }

    /// 1-based index of the first item shown, or 0 when there are none.
    pub fn start_index(&self) -> usize {
        if self.total_items == 0 {
            0
        } else {
            self.bounds().0 + 1
        }
    }

    /// 1-based index of the last item shown.
    pub fn end_index(&self) -> usize {
        self.bounds().1
    }

    /// Numbered page links for a pager with at most `max_visible` numbers.
    ///
    /// When all pages fit, every page is listed. Otherwise the first and last
    /// pages are always shown with a window around the current page, and
    /// gaps become [`PageLink::Ellipsis`].
    ///
    /// ```
    /// use mypup_query::{PageLink, PageState};
    ///
    /// let state = PageState::new(6, 10, 200);
    /// assert_eq!(
    ///     state.page_links(5),
    ///     vec![
    ///         PageLink::Page(1),
    ///         PageLink::Ellipsis,
    ///         PageLink::Page(5),
    ///         PageLink::Page(6),
    ///         PageLink::Page(7),
    ///         PageLink::Ellipsis,
    ///         PageLink::Page(20),
    ///     ]
    /// );
    /// ```
    pub fn page_links(&self, max_visible: usize) -> Vec<PageLink> {
        let total = self.total_pages();
        let max_visible = max_visible.max(3);
        if total <= max_visible {
            return (1..=total).map(PageLink::Page).collect();
        }

        // Pages around the current one, besides first and last.
        let inner = max_visible - 2;
        let half = (inner - 1) / 2;
        let mut lo = self.current_page.saturating_sub(half).max(2);
        let mut hi = (lo + inner - 1).min(total - 1);
        lo = hi.saturating_sub(inner - 1).max(2);
        hi = hi.max(lo);

        let mut links = vec![PageLink::Page(1)];
        if lo > 2 {
            links.push(PageLink::Ellipsis);
        }
        links.extend((lo..=hi).map(PageLink::Page));
        if hi < total - 1 {
            links.push(PageLink::Ellipsis);
        }
        links.push(PageLink::Page(total));
        links
    }
}

/// One entry of a numbered pager.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum PageLink {
    Page(usize),
    Ellipsis,
}

/// One page of ordered results plus navigation metadata.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Page<T> {
    pub items: Vec<T>,
    pub current_page: usize,
    pub total_pages: usize,
    pub total_items: usize,
    pub items_per_page: usize,
    pub has_next_page: bool,
    pub has_prev_page: bool,
    pub start_index: usize,
    pub end_index: usize,
}

impl<T> Page<T> {
    /// The navigation state this page was cut from.
    pub fn state(&self) -> PageState {
        PageState {
            current_page: self.current_page,
            items_per_page: self.items_per_page,
            total_items: self.total_items,
        }
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Maps the items, keeping the metadata.
    pub fn map<U>(self, f: impl FnMut(T) -> U) -> Page<U> {
        Page {
            items: self.items.into_iter().map(f).collect(),
            current_page: self.current_page,
            total_pages: self.total_pages,
            total_items: self.total_items,
            items_per_page: self.items_per_page,
            has_next_page: self.has_next_page,
            has_prev_page: self.has_prev_page,
            start_index: self.start_index,
            end_index: self.end_index,
        }
    }
}

/// Cuts page `page` out of `ordered`.
///
/// `page` and `items_per_page` are raised to 1 when zero, and `page` is
/// clamped to the last page.
///
/// ```
/// use mypup_query::paginate;
///
/// let page = paginate(&["a", "b", "c"], 2, 2);
/// assert_eq!(page.items, vec![&"c"]);
/// assert_eq!((page.start_index, page.end_index), (3, 3));
/// assert!(page.has_prev_page && !page.has_next_page);
/// ```
pub fn paginate<T>(ordered: &[T], page: usize, items_per_page: usize) -> Page<&T> {
    let request = PageRequest::new(page, items_per_page);
    let state = PageState::new(request.page, request.items_per_page, ordered.len());
    page_of(ordered.iter().collect(), state)
}

/// Cuts the page described by `state` out of already-collected items.
pub(crate) fn page_of<T>(mut items: Vec<T>, state: PageState) -> Page<T> {
    let state = state.with_total_items(items.len());
    let (start, end) = state.bounds();
    items.truncate(end);
    items.drain(..start);
    Page {
        items,
        current_page: state.current_page,
        total_pages: state.total_pages(),
        total_items: state.total_items,
        items_per_page: state.items_per_page,
        has_next_page: state.has_next_page(),
        has_prev_page: state.has_prev_page(),
        start_index: state.start_index(),
        end_index: state.end_index(),
    }
}
