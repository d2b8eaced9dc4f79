//! Pagination utilities for API responses.
//!
//! List endpoints accept `limit` (items per page, 1-100, default 10) and either
//! `page` (1-indexed) or a raw `offset`. When `page` is provided it takes
//! precedence over `offset`.
//!
//! Responses carry a [`PaginationMeta`] block:
//!
//! ```json
//! {
//!   "data": [...],
//!   "meta": {
//!     "page": 2,
//!     "total_pages": 5,
//!     "total_items": 42,
//!     "items_per_page": 10,
//!     "has_more": true
//!   }
//! }
//! ```

use serde::{Deserialize, Deserializer, Serialize};
use utoipa::{IntoParams, ToSchema};

pub const DEFAULT_LIMIT: i64 = 10;
pub const MAX_LIMIT: i64 = 100;

/// Deserializes an optional string into an optional i64.
///
/// Query parameters may arrive as empty strings, which are treated as `None`.
fn deserialize_optional_i64<'de, D>(deserializer: D) -> Result<Option<i64>, D::Error>
where
    D: Deserializer<'de>,
{
    let s: Option<String> = Option::deserialize(deserializer)?;
    match s {
        Some(s) if s.is_empty() => Ok(None),
        Some(s) => s.parse::<i64>().map(Some).map_err(serde::de::Error::custom),
        None => Ok(None),
    }
}

/// Metadata about a paginated response.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct PaginationMeta {
    /// Current page number (1-indexed)
    pub page: i64,
    /// Number of pages needed to hold every item
    pub total_pages: i64,
    /// Total number of items across all pages
    pub total_items: i64,
    /// Maximum items per page (the limit that was applied)
    pub items_per_page: i64,
    /// Whether there are more items after this page
    pub has_more: bool,
}

impl PaginationMeta {
    pub fn new(params: &PaginationParams, total_items: i64) -> Self {
        let items_per_page = params.limit();
        let offset = params.offset();
        let total_items = total_items.max(0);

        Self {
            page: (offset / items_per_page).saturating_add(1),
            total_pages: total_items / items_per_page + i64::from(total_items % items_per_page != 0),
            total_items,
            items_per_page,
            has_more: offset.saturating_add(items_per_page) < total_items,
        }
    }
}

/// Query parameters for pagination.
#[derive(Debug, Clone, Hash, Deserialize, ToSchema, IntoParams)]
pub struct PaginationParams {
    /// Maximum number of items to return (1-100, default: 10)
    #[serde(default, deserialize_with = "deserialize_optional_i64")]
    pub limit: Option<i64>,
    /// Number of items to skip (default: 0, ignored if `page` is set)
    #[serde(default, deserialize_with = "deserialize_optional_i64")]
    pub offset: Option<i64>,
    /// Page number (1-indexed, default: 1)
    #[serde(default, deserialize_with = "deserialize_optional_i64")]
    pub page: Option<i64>,
}

impl Default for PaginationParams {
    fn default() -> Self {
        Self {
            limit: Some(DEFAULT_LIMIT),
            offset: None,
            page: Some(1),
        }
    }
}

impl PaginationParams {
    pub fn with_page(page: i64, limit: i64) -> Self {
        Self {
            limit: Some(limit),
            offset: None,
            page: Some(page),
        }
    }

    /// Returns the effective limit, clamped to [1, 100].
    #[must_use]
    pub fn limit(&self) -> i64 {
        self.limit.unwrap_or(DEFAULT_LIMIT).clamp(1, MAX_LIMIT)
    }

    /// Returns the effective offset, derived from `page` when present.
    ///
    /// Saturates at `i64::MAX` so huge client values yield an empty page.
    #[must_use]
    pub fn offset(&self) -> i64 {
        if let Some(page) = self.page {
            (page.max(1) - 1).saturating_mul(self.limit())
        } else {
            self.offset.unwrap_or(0).max(0)
        }
    }

    /// Returns the page number if provided, clamped to a minimum of 1.
    #[must_use]
    pub fn page(&self) -> Option<i64> {
        self.page.map(|p| p.max(1))
    }

    /// Slices an in-memory collection the same way a `LIMIT/OFFSET` query would.
    pub fn apply<T>(&self, items: Vec<T>) -> Vec<T> {
        items
            .into_iter()
            .skip(self.offset() as usize)
            .take(self.limit() as usize)
            .collect()
    }
}
