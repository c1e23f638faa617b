//! Product listing query

use shared::error::{AppError, AppResult, ErrorCode};
use shared::models::{Category, Product};

/// Upper bound for a requested page size
pub const MAX_PAGE_SIZE: u32 = 100;

/// Who is listing: shoppers only ever see active products
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Audience {
    #[default]
    Public,
    Admin,
}

/// Filters and paging for a product listing
#[derive(Debug, Clone, Default)]
pub struct ProductQuery {
    pub audience: Audience,
    /// Category label, `"all"` or blank means no filter
    pub category: Option<String>,
    /// Case-insensitive substring over title or description
    pub search: Option<String>,
    /// 1-based
    pub page: Option<u32>,
    pub limit: Option<u32>,
    /// Admin-only active filter; ignored for public listings
    pub is_active: Option<bool>,
}

impl ProductQuery {
    pub fn public() -> Self {
        Self::default()
    }

    pub fn admin() -> Self {
        Self {
            audience: Audience::Admin,
            ..Self::default()
        }
    }

    pub fn category(mut self, category: impl Into<String>) -> Self {
        self.category = Some(category.into());
        self
    }

    pub fn search(mut self, text: impl Into<String>) -> Self {
        self.search = Some(text.into());
        self
    }

    pub fn page(mut self, page: u32) -> Self {
        self.page = Some(page);
        self
    }

    pub fn limit(mut self, limit: u32) -> Self {
        self.limit = Some(limit);
        self
    }

    pub fn active(mut self, is_active: bool) -> Self {
        self.is_active = Some(is_active);
        self
    }

    /// Parsed category filter
    pub(crate) fn category_filter(&self) -> AppResult<Option<Category>> {
        match self.category.as_deref().map(str::trim) {
            None | Some("") => Ok(None),
            Some(label) if label.eq_ignore_ascii_case("all") => Ok(None),
            Some(label) => label.parse().map(Some).map_err(|_| {
                AppError::new(ErrorCode::ProductInvalidCategory).with_detail("category", label)
            }),
        }
    }

    /// Active-flag filter after applying the audience rule
    pub(crate) fn active_filter(&self) -> Option<bool> {
        match self.audience {
            Audience::Public => Some(true),
            Audience::Admin => self.is_active,
        }
    }

    pub(crate) fn page_number(&self) -> u32 {
        self.page.filter(|p| *p > 0).unwrap_or(1)
    }

    pub(crate) fn page_size(&self, default: u32) -> u32 {
        self.limit
            .filter(|l| *l > 0)
            .unwrap_or(default)
            .min(MAX_PAGE_SIZE)
    }

    /// Lowercased search needle, `None` when blank
    pub(crate) fn needle(&self) -> Option<String> {
        self.search
            .as_deref()
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(str::to_lowercase)
    }
}

/// Case-insensitive match of a lowercased needle against title or description
pub(crate) fn matches_search(product: &Product, needle: &str) -> bool {
    product.title.to_lowercase().contains(needle)
        || product
            .description
            .as_deref()
            .is_some_and(|d| d.to_lowercase().contains(needle))
}
