//! Offset/limit windows and the guard deciding who may use them.

use crate::error::Error;

use super::Strategy;

/// Default offset of a page.
pub const DEFAULT_OFFSET: usize = 0;
/// Default limit of a page.
pub const DEFAULT_LIMIT: usize = 100;

/// A window over the root rows.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Page {
    pub offset: usize,
    pub limit: usize,
}

impl Default for Page {
    fn default() -> Self {
        Self {
            offset: DEFAULT_OFFSET,
            limit: DEFAULT_LIMIT,
        }
    }
}

impl Page {
    /// Create a page.
    pub fn new(offset: usize, limit: usize) -> Self {
        Self { offset, limit }
    }

    /// Create a page with a default offset.
    pub fn limit(limit: usize) -> Self {
        Self {
            offset: DEFAULT_OFFSET,
            limit,
        }
    }

    /// Build a page from optional request parts.
    ///
    /// Returns `None` when neither part is given; a missing part falls back to
    /// `default_limit` or offset 0.
    pub fn from_parts(
        offset: Option<usize>,
        limit: Option<usize>,
        default_limit: usize,
    ) -> Option<Self> {
        if offset.is_none() && limit.is_none() {
            return None;
        }
        Some(Self {
            offset: offset.unwrap_or(DEFAULT_OFFSET),
            limit: limit.unwrap_or(default_limit),
        })
    }
}

/// Enforces that offset/limit is only honored when rows map 1:1 to roots.
pub struct PaginationGuard;

impl PaginationGuard {
    /// Accept or reject a page for a strategy. An absent page is always accepted.
    pub fn check(strategy: Strategy, page: Option<Page>) -> Result<(), Error> {
        match page {
            Some(_) if !strategy.is_row_per_root() => Err(Error::PaginationUnsupported {
                strategy,
                reason: "its root query joins a one-to-many relation, so offset/limit \
                         would count joined rows instead of orders and silently drop orders; \
                         use the two-phase strategy to page",
            }),
            _ => Ok(()),
        }
    }
}
