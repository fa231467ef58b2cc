use serde::{Deserialize, Serialize};

pub const DEFAULT_PAGE_SIZE: usize = 10;
pub const MAX_PAGE_SIZE: usize = 100;

/// `?page=&limit=` as sent by list endpoints. Values are clamped, never rejected.
#[derive(Debug, Deserialize, Clone, Copy, Default)]
pub struct PageRequest {
    pub page: Option<usize>,
    pub limit: Option<usize>,
}

impl PageRequest {
    pub fn new(page: usize, limit: usize) -> Self {
        Self {
            page: Some(page),
            limit: Some(limit),
        }
    }

    pub fn page(&self) -> usize {
        self.page.unwrap_or(1).max(1)
    }

    pub fn limit(&self) -> usize {
        self.limit
            .unwrap_or(DEFAULT_PAGE_SIZE)
            .clamp(1, MAX_PAGE_SIZE)
    }

    /// Slices an already filtered and ordered result set.
    pub fn paginate<T>(&self, items: Vec<T>) -> Paginated<T> {
        let page = self.page();
        let limit = self.limit();
        let total = items.len();
        let items = items
            .into_iter()
            .skip((page - 1) * limit)
            .take(limit)
            .collect();
        Paginated {
            items,
            pagination: Pagination {
                page,
                limit,
                total,
                pages: total.div_ceil(limit),
            },
        }
    }
}

#[derive(Debug, Serialize, Deserialize, PartialEq, Eq, Clone, Copy)]
pub struct Pagination {
    pub page: usize,
    pub limit: usize,
    pub total: usize,
    pub pages: usize,
}

#[derive(Debug, Clone)]
pub struct Paginated<T> {
    pub items: Vec<T>,
    pub pagination: Pagination,
}

impl<T> Paginated<T> {
    pub fn map<U>(self, f: impl FnMut(T) -> U) -> Paginated<U> {
        Paginated {
            items: self.items.into_iter().map(f).collect(),
            pagination: self.pagination,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let req = PageRequest::default();
        assert_eq!(req.page(), 1);
        assert_eq!(req.limit(), DEFAULT_PAGE_SIZE);
    }

    #[test]
    fn test_clamping() {
        let req = PageRequest::new(0, 10_000);
        assert_eq!(req.page(), 1);
        assert_eq!(req.limit(), MAX_PAGE_SIZE);
        assert_eq!(PageRequest::new(1, 0).limit(), 1);
    }

    #[test]
    fn test_paginate_second_page() {
        let page = PageRequest::new(2, 3).paginate((1..=7).collect::<Vec<_>>());
        assert_eq!(page.items, vec![4, 5, 6]);
        assert_eq!(
            page.pagination,
            Pagination {
                page: 2,
                limit: 3,
                total: 7,
                pages: 3
            }
        );
    }

    #[test]
    fn test_paginate_past_end_is_empty() {
        let page = PageRequest::new(5, 10).paginate(vec![1, 2]);
        assert!(page.items.is_empty());
        assert_eq!(page.pagination.pages, 1);
        assert_eq!(page.pagination.total, 2);
    }
}
