//! Result pages and the source abstraction that produces them.

use async_trait::async_trait;
use serde::Serialize;

use crate::descriptor::QueryDescriptor;
use crate::error::SearchError;

/// One page of results for a descriptor.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ResultPage<T> {
    /// Rows on this page.
    pub items: Vec<T>,
    /// Matching rows across all pages.
    pub total_count: u64,
    /// Pages available at the requested page size.
    pub total_pages: u32,
    /// Page these rows belong to (1-based; 0 before anything loaded).
    pub current_page: u32,
}

impl<T> ResultPage<T> {
    /// Page with no rows, shown before the first fetch completes.
    #[must_use]
    pub const fn empty() -> Self {
        Self {
            items: Vec::new(),
            total_count: 0,
            total_pages: 0,
            current_page: 0,
        }
    }

    /// Number of rows on this page.
    #[must_use]
    pub const fn len(&self) -> usize {
        self.items.len()
    }

    /// Whether this page holds no rows.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Whether a later page exists.
    #[must_use]
    pub const fn has_next(&self) -> bool {
        self.current_page < self.total_pages
    }

    /// Whether an earlier page exists.
    #[must_use]
    pub const fn has_previous(&self) -> bool {
        self.current_page > 1
    }
}

impl<T> Default for ResultPage<T> {
    fn default() -> Self {
        Self::empty()
    }
}

/// Produces result pages for descriptors, typically over HTTP.
#[async_trait]
pub trait ResultSource<T>: Send + Sync {
    /// Fetch the page described by `query`.
    ///
    /// # Errors
    /// Returns [`SearchError`] when the page cannot be produced.
    async fn fetch_page(&self, query: &QueryDescriptor) -> Result<ResultPage<T>, SearchError>;
}

/// The failure of the most recent fetch.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FetchFailure {
    /// What went wrong.
    pub error: SearchError,
    /// Sequence number of the failed fetch.
    pub seq: u64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn navigation_flags_follow_pagination() {
        let page = ResultPage {
            items: vec![1, 2],
            total_count: 12,
            total_pages: 3,
            current_page: 2,
        };
        assert!(page.has_next());
        assert!(page.has_previous());
        assert_eq!(page.len(), 2);

        let empty: ResultPage<u8> = ResultPage::empty();
        assert!(empty.is_empty());
        assert!(!empty.has_next());
        assert!(!empty.has_previous());
    }
}
