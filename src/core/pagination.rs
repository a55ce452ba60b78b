//! Page parameters and paged results shared by every list operation.

use crate::errors::Result;
use sea_orm::{ConnectionTrait, PaginatorTrait, SelectorTrait};
use serde::{Deserialize, Serialize};

/// Default number of rows per page.
pub const DEFAULT_PER_PAGE: u64 = 50;
/// Upper bound on rows per page.
pub const MAX_PER_PAGE: u64 = 200;
/// Largest row offset a page may start at; SQL offsets are signed 64-bit.
const MAX_OFFSET: u64 = i64::MAX.unsigned_abs();

/// 1-based page request, usually taken from the query string.
#[derive(Debug, Clone, Copy, Default, Deserialize)]
pub struct PageParams {
    /// Page number starting at 1
    pub page: Option<u64>,
    /// Rows per page, clamped to [`MAX_PER_PAGE`]
    pub per_page: Option<u64>,
}

impl PageParams {
    /// Page number, never below 1 and never past the largest addressable offset.
    #[must_use]
    pub fn page(&self) -> u64 {
        self.page
            .unwrap_or(1)
            .clamp(1, MAX_OFFSET / self.per_page() + 1)
    }

    /// Rows per page, between 1 and [`MAX_PER_PAGE`].
    #[must_use]
    pub fn per_page(&self) -> u64 {
        self.per_page
            .unwrap_or(DEFAULT_PER_PAGE)
            .clamp(1, MAX_PER_PAGE)
    }

    /// Zero-based index of the page for `Paginator::fetch_page`.
    #[must_use]
    pub fn page_index(&self) -> u64 {
        self.page() - 1
    }
}

/// One page of results plus the total row count.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Page<T> {
    /// Rows on this page
    pub data: Vec<T>,
    /// Rows matching the query across all pages
    pub total: u64,
    /// Page number (1-based)
    pub page: u64,
    /// Rows per page
    pub per_page: u64,
}

impl<T> Page<T> {
    /// Assembles a page from fetched rows and the request that produced them.
    #[must_use]
    pub fn new(data: Vec<T>, total: u64, params: &PageParams) -> Self {
        Self {
            data,
            total,
            page: params.page(),
            per_page: params.per_page(),
        }
    }
}

/// Runs `query` through `SeaORM`'s paginator and returns the requested page.
pub async fn fetch_page<'db, C, Q>(
    db: &'db C,
    query: Q,
    params: &PageParams,
) -> Result<Page<<Q::Selector as SelectorTrait>::Item>>
where
    C: ConnectionTrait,
    Q: PaginatorTrait<'db, C>,
{
    let paginator = query.paginate(db, params.per_page());
    let total = paginator.num_items().await?;
    let data = paginator.fetch_page(params.page_index()).await?;
    Ok(Page::new(data, total, params))
}

#[cfg(test)]
mod tests {
    use super::*;
    use sea_orm::EntityTrait;

    #[test]
    fn test_defaults() {
        let params = PageParams::default();
        assert_eq!(params.page(), 1);
        assert_eq!(params.per_page(), DEFAULT_PER_PAGE);
        assert_eq!(params.page_index(), 0);
    }

    #[test]
    fn test_clamping() {
        let params = PageParams {
            page: Some(0),
            per_page: Some(10_000),
        };
        assert_eq!(params.page(), 1);
        assert_eq!(params.per_page(), MAX_PER_PAGE);

        let params = PageParams {
            page: Some(3),
            per_page: Some(0),
        };
        assert_eq!(params.page_index(), 2);
        assert_eq!(params.per_page(), 1);
    }

    #[test]
    fn test_huge_page_is_capped() {
        let params = PageParams {
            page: Some(u64::MAX),
            per_page: Some(MAX_PER_PAGE),
        };
        let offset = params.page_index().checked_mul(params.per_page());
        assert!(offset.is_some_and(|offset| offset <= MAX_OFFSET));
    }

    #[tokio::test]
    async fn test_huge_page_returns_empty() -> crate::errors::Result<()> {
        let db = crate::test_utils::setup_test_db().await?;
        crate::test_utils::create_test_customer(&db, "Acme").await?;

        let params = PageParams {
            page: Some(u64::MAX),
            per_page: Some(MAX_PER_PAGE),
        };
        let page = fetch_page(&db, crate::entities::Customer::find(), &params).await?;
        assert!(page.data.is_empty());
        assert_eq!(page.total, 1);
        Ok(())
    }
}
