//! Pure paging arithmetic over an ordered list.
//!
//! Pages are 1-indexed. An empty list still has exactly one (empty) page, so
//! `min_page() <= max_page()` always holds and a page number can always be
//! clamped into range.
//!
//! ```
//! use horizon_grid::Pagination;
//!
//! let pages = Pagination::new((0..20).collect::<Vec<_>>(), 9);
//! assert_eq!(pages.max_page(), 3);
//! assert_eq!(pages.elements_for(3), &[18, 19]);
//! assert!(pages.elements_for(4).is_empty());
//! ```

/// A read-only view of `items` split into pages of `elements_per_page`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Pagination<T> {
    items: Vec<T>,
    elements_per_page: usize,
}

impl<T> Pagination<T> {
    /// The first page.
    pub const MIN_PAGE: usize = 1;

    /// Split `items` into pages. A page size of zero is treated as one.
    pub fn new(items: Vec<T>, elements_per_page: usize) -> Self {
        Self {
            items,
            elements_per_page: elements_per_page.max(1),
        }
    }

    pub fn items(&self) -> &[T] {
        &self.items
    }

    pub fn into_items(self) -> Vec<T> {
        self.items
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn elements_per_page(&self) -> usize {
        self.elements_per_page
    }

    #[inline]
    pub fn min_page(&self) -> usize {
        Self::MIN_PAGE
    }

    /// Number of pages; `1` for an empty list.
    pub fn max_page(&self) -> usize {
        self.items.len().div_ceil(self.elements_per_page).max(1)
    }

    /// The items shown on `page`, empty when `page` is out of range.
    pub fn elements_for(&self, page: usize) -> &[T] {
        if page < Self::MIN_PAGE {
            return &[];
        }
        let start = (page - 1).saturating_mul(self.elements_per_page);
        if start >= self.items.len() {
            return &[];
        }
        let end = start
            .saturating_add(self.elements_per_page)
            .min(self.items.len());
        &self.items[start..end]
    }

    pub fn has_next(&self, page: usize) -> bool {
        page < self.max_page()
    }

    pub fn has_previous(&self, page: usize) -> bool {
        page > self.min_page()
    }

    pub fn contains_page(&self, page: usize) -> bool {
        (self.min_page()..=self.max_page()).contains(&page)
    }

    /// Clamp `page` into `[min_page, max_page]`.
    pub fn clamp_page(&self, page: usize) -> usize {
        page.clamp(self.min_page(), self.max_page())
    }
}

impl<T> Default for Pagination<T> {
    fn default() -> Self {
        Self::new(Vec::new(), 1)
    }
}
