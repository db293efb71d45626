//! Shared wire shapes for the Notch Pay API.
//!
//! Resource payloads are lower-camel-case on the wire. Types here carry the
//! matching serde attributes; caller-defined request and response types are
//! expected to do the same (`#[serde(rename_all = "camelCase")]`, with
//! `skip_serializing_if = "Option::is_none"` on optionals so absent fields
//! are omitted rather than sent as null).

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

/// Error envelope returned alongside non-success statuses.
///
/// `message` is required; a body without it is treated as unparseable and
/// the error is classified from the status line instead.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub message: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub errors: Option<HashMap<String, Vec<String>>>,
}

/// One page of a listing endpoint.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Paginated<T> {
    pub data: Vec<T>,
    pub meta: PaginationMeta,
}

/// Paging block of a [`Paginated`] response.
///
/// Page arithmetic is computed locally and never read from the wire; a
/// server-sent `total_pages` or similar is ignored.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PaginationMeta {
    /// 1-based page index.
    pub page: u32,
    pub per_page: u32,
    /// Total number of items across all pages.
    pub total: u32,
}

impl PaginationMeta {
    /// Number of pages needed for `total` items, 0 when `per_page` is 0.
    pub fn total_pages(&self) -> u32 {
        if self.per_page == 0 {
            0
        } else {
            self.total.div_ceil(self.per_page)
        }
    }

    pub fn has_next_page(&self) -> bool {
        self.page < self.total_pages()
    }

    pub fn has_previous_page(&self) -> bool {
        self.page > 1
    }
}
