//! Shared response envelope types for API handlers.
//!
//! List endpoints all return the same `{ items, limit, offset, total }`
//! page shape; use [`PageResponse`] instead of ad-hoc `serde_json::json!`
//! to get compile-time type safety and consistent serialization.

use serde::Serialize;
use stagedoor_db::repositories::{clamp_limit, clamp_offset};

/// Standard paginated list body.
#[derive(Debug, Serialize)]
pub struct PageResponse<T: Serialize> {
    pub items: Vec<T>,
    pub limit: i64,
    pub offset: i64,
    pub total: i64,
}

impl<T: Serialize> PageResponse<T> {
    /// Build a page echoing the clamped limit/offset actually applied.
    pub fn new(items: Vec<T>, limit: Option<i64>, offset: Option<i64>, total: i64) -> Self {
        Self {
            items,
            limit: clamp_limit(limit),
            offset: clamp_offset(offset),
            total,
        }
    }
}
