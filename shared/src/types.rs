//! Common types for the shared crate

use serde::{Deserialize, Serialize};

/// One page of a listing plus the numbers a pager needs
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PaginatedResponse<T> {
    pub data: Vec<T>,
    /// Matching records across all pages
    pub total: u64,
    /// 1-based page number
    pub page: u32,
    pub limit: u32,
    /// ceil(total / limit)
    pub total_pages: u32,
}

impl<T> PaginatedResponse<T> {
    pub fn new(data: Vec<T>, total: u64, page: u32, limit: u32) -> Self {
        let total_pages = if limit > 0 {
            total.div_ceil(limit as u64) as u32
        } else {
            1
        };

        Self {
            data,
            total,
            page,
            limit,
            total_pages,
        }
    }

    /// Number of records to skip for a 1-based page
    pub fn offset(page: u32, limit: u32) -> usize {
        (page.max(1) as usize - 1) * limit as usize
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_paginated_response() {
        let items: Vec<i32> = (1..=10).collect();
        let resp = PaginatedResponse::new(items, 100, 2, 10);

        assert_eq!(resp.total, 100);
        assert_eq!(resp.page, 2);
        assert_eq!(resp.total_pages, 10);
    }

    #[test]
    fn test_total_pages_rounds_up() {
        let resp = PaginatedResponse::new(vec![1, 2, 3], 21, 3, 10);
        assert_eq!(resp.total_pages, 3);

        let empty: PaginatedResponse<i32> = PaginatedResponse::new(vec![], 0, 1, 10);
        assert_eq!(empty.total_pages, 0);
    }

    #[test]
    fn test_offset() {
        assert_eq!(PaginatedResponse::<()>::offset(1, 10), 0);
        assert_eq!(PaginatedResponse::<()>::offset(3, 20), 40);
        assert_eq!(PaginatedResponse::<()>::offset(0, 20), 0);
    }
}
