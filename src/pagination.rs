//! In-memory paging of fetched lists.

use serde::Serialize;

/// Rows shown per page on list screens.
pub const DEFAULT_ITEMS_PER_PAGE: usize = 25;

/// Page links around `current`: the first and last two pages, two before and
/// four after the current one, `None` marking a gap.
fn page_links(total_pages: usize, current: usize) -> Vec<Option<usize>> {
    if total_pages == 0 {
        return Vec::new();
    }

    let shown = |page: usize| {
        page <= 2 || page + 2 > total_pages || (page + 2 >= current && page <= current + 4)
    };

    let mut links = Vec::new();
    for page in 1..=total_pages {
        if shown(page) {
            links.push(Some(page));
        } else if links.last().is_some_and(Option::is_some) {
            links.push(None);
        }
    }
    links
}

#[derive(Debug, Serialize)]
pub struct Paginated<T> {
    pub items: Vec<T>,
    pub pages: Vec<Option<usize>>,
    pub page: usize,
    pub total: usize,
}

impl<T> Paginated<T> {
    /// Cuts page `page` (1-based, clamped) out of the full result set.
    pub fn from_all(all: Vec<T>, page: usize, per_page: usize) -> Self {
        let total = all.len();
        let per_page = per_page.max(1);
        let total_pages = total.div_ceil(per_page);
        let page = page.clamp(1, total_pages.max(1));

        let items = all
            .into_iter()
            .skip((page - 1) * per_page)
            .take(per_page)
            .collect();

        Self {
            items,
            pages: page_links(total_pages, page),
            page,
            total,
        }
    }
}
