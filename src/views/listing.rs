//! Client-side search and pagination over an already fetched list.

use serde::{Deserialize, Deserializer};

/// Query string shared by every searchable table (`?q=…&page=…`).
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ListQuery {
    #[serde(default)]
    pub q: String,
    #[serde(default, deserialize_with = "lenient_page")]
    pub page: Option<usize>,
}

/// Page numbers come from hand-editable query strings. Anything that is not a
/// number reads as "no page requested" and the pager clamps the rest.
pub fn lenient_page<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Option<usize>, D::Error> {
    let raw = Option::<String>::deserialize(deserializer)?;
    Ok(raw.and_then(|s| s.trim().parse().ok()))
}

/// Case-insensitive substring match against any of `fields`.
/// An empty term matches everything.
pub fn matches_search(term: &str, fields: &[&str]) -> bool {
    let term = term.trim().to_lowercase();
    if term.is_empty() {
        return true;
    }
    fields.iter().any(|f| f.to_lowercase().contains(&term))
}

/// Pagination arithmetic for one table.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Pager {
    pub page: usize,
    pub page_size: usize,
    pub total_items: usize,
}

impl Pager {
    /// `requested` is clamped into `[1, total_pages]`.
    pub fn new(total_items: usize, page_size: usize, requested: Option<usize>) -> Self {
        let page_size = page_size.max(1);
        let mut pager = Self {
            page: 1,
            page_size,
            total_items,
        };
        pager.page = requested.unwrap_or(1).clamp(1, pager.total_pages());
        pager
    }

    /// Never zero, so an empty table still shows "page 1 of 1".
    pub fn total_pages(&self) -> usize {
        self.total_items.div_ceil(self.page_size).max(1)
    }

    pub fn range(&self) -> std::ops::Range<usize> {
        let start = ((self.page - 1) * self.page_size).min(self.total_items);
        let end = (start + self.page_size).min(self.total_items);
        start..end
    }

    pub fn slice<'a, T>(&self, items: &'a [T]) -> &'a [T] {
        &items[self.range()]
    }

    pub fn prev(&self) -> usize {
        self.page.saturating_sub(1).max(1)
    }

    pub fn next(&self) -> usize {
        (self.page + 1).min(self.total_pages())
    }

    pub fn has_prev(&self) -> bool {
        self.page > 1
    }

    pub fn has_next(&self) -> bool {
        self.page < self.total_pages()
    }

    pub fn links(&self) -> Vec<PageLink> {
        (1..=self.total_pages())
            .map(|number| PageLink {
                number,
                current: number == self.page,
            })
            .collect()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageLink {
    pub number: usize,
    pub current: bool,
}

/// One rendered page of a filtered list.
#[derive(Debug, Clone)]
pub struct Listing<T> {
    pub rows: Vec<T>,
    pub pager: Pager,
    pub search: String,
    pub filtered_count: usize,
}

impl<T: Clone> Listing<T> {
    /// Filter `items` with `keep`, then cut out the requested page.
    pub fn build<F>(items: &[T], query: &ListQuery, page_size: usize, keep: F) -> Self
    where
        F: Fn(&T, &str) -> bool,
    {
        let filtered: Vec<&T> = items.iter().filter(|item| keep(*item, query.q.as_str())).collect();
        let pager = Pager::new(filtered.len(), page_size, query.page);
        let rows = filtered[pager.range()].iter().map(|item| (*item).clone()).collect();
        Self {
            rows,
            pager,
            search: query.q.clone(),
            filtered_count: filtered.len(),
        }
    }

    /// Paginate without a search box.
    pub fn unfiltered(items: &[T], page_size: usize, page: Option<usize>) -> Self {
        let pager = Pager::new(items.len(), page_size, page);
        Self {
            rows: pager.slice(items).to_vec(),
            pager,
            search: String::new(),
            filtered_count: items.len(),
        }
    }
}
