//! Offset pagination over any ordered, already-filtered sequence.

use async_trait::async_trait;
use serde::Serialize;

use crate::errors::AppResult;

pub const FIRST_PAGE: i64 = 1;

/// An ordered result set that can report its size and hand out slices of itself.
#[async_trait]
pub trait PageSource<T>: Send + Sync {
    async fn count(&self) -> AppResult<i64>;

    async fn fetch(&self, offset: i64, limit: i64) -> AppResult<Vec<T>>;
}

/// One page of results plus the metadata needed to render paging controls.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Page<T> {
    pub items: Vec<T>,
    pub page_index: i64,
    pub page_size: i64,
    pub total_count: i64,
    pub total_pages: i64,
    pub has_previous_page: bool,
    pub has_next_page: bool,
}

/// Pages below the first collapse to the first; pages past the end are kept as asked.
pub fn normalize_page(requested: Option<i64>) -> i64 {
    requested.unwrap_or(FIRST_PAGE).max(FIRST_PAGE)
}

pub fn total_pages(total_count: i64, page_size: i64) -> i64 {
    if page_size <= 0 || total_count <= 0 {
        return 0;
    }
    (total_count + page_size - 1) / page_size
}

impl<T> Page<T> {
    pub fn new(items: Vec<T>, page_index: i64, page_size: i64, total_count: i64) -> Self {
        let total_pages = total_pages(total_count, page_size);
        Self {
            items,
            page_index,
            page_size,
            total_count,
            total_pages,
            has_previous_page: page_index > FIRST_PAGE,
            has_next_page: page_index < total_pages,
        }
    }

    /// Slices an in-memory sequence the same way `paginate` slices a query.
    pub fn from_items(all: Vec<T>, requested_page: Option<i64>, page_size: i64) -> Self {
        let page_index = normalize_page(requested_page);
        let total_count = all.len() as i64;
        let skip = offset(page_index, page_size) as usize;
        let items = all
            .into_iter()
            .skip(skip)
            .take(page_size.max(0) as usize)
            .collect();
        Self::new(items, page_index, page_size, total_count)
    }

    pub fn map<U>(self, f: impl FnMut(T) -> U) -> Page<U> {
        Page {
            items: self.items.into_iter().map(f).collect(),
            page_index: self.page_index,
            page_size: self.page_size,
            total_count: self.total_count,
            total_pages: self.total_pages,
            has_previous_page: self.has_previous_page,
            has_next_page: self.has_next_page,
        }
    }
}

fn offset(page_index: i64, page_size: i64) -> i64 {
    (page_index - FIRST_PAGE).saturating_mul(page_size.max(0))
}

/// Counts the full source once, then fetches the requested window.
pub async fn paginate<T, S>(source: &S, requested_page: Option<i64>, page_size: i64) -> AppResult<Page<T>>
where
    S: PageSource<T> + ?Sized,
{
    let page_index = normalize_page(requested_page);
    let total_count = source.count().await?;

    let items = if total_count == 0 || page_size <= 0 {
        Vec::new()
    } else {
        source.fetch(offset(page_index, page_size), page_size).await?
    };

    log::debug!(
        "Paginated {} item(s) into page {} of {}",
        total_count,
        page_index,
        total_pages(total_count, page_size)
    );

    Ok(Page::new(items, page_index, page_size, total_count))
}
