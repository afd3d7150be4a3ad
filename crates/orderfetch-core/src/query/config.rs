//! Fetch tuning knobs.

/// Limits and batch sizes applied by the fetch strategies.
#[derive(Debug, Clone)]
pub struct FetchConfig {
    /// Hard cap on roots returned by an unpaged naive or to-one query.
    /// Larger result sets are truncated; callers must paginate.
    pub max_results: usize,
    /// Page size used when a caller asks for paging without a limit.
    pub default_limit: usize,
    /// Maximum identifiers bound into one `IN (...)` clause.
    pub in_clause_batch_size: usize,
    /// Owners whose lazy collections are prefetched together. 0 disables it.
    pub batch_fetch_size: usize,
}

impl Default for FetchConfig {
    fn default() -> Self {
        Self {
            max_results: 1000,
            default_limit: 100,
            // SQLite builds before 3.32 bind at most 999 parameters.
            in_clause_batch_size: 500,
            batch_fetch_size: 100,
        }
    }
}

impl FetchConfig {
    /// Set the hard result cap.
    pub fn with_max_results(mut self, max: usize) -> Self {
        self.max_results = max;
        self
    }

    /// Set the default page size.
    pub fn with_default_limit(mut self, limit: usize) -> Self {
        self.default_limit = limit;
        self
    }

    /// Set the `IN` clause batch size.
    pub fn with_in_clause_batch_size(mut self, size: usize) -> Self {
        self.in_clause_batch_size = size.max(1);
        self
    }

    /// Set the lazy collection batch size.
    pub fn with_batch_fetch_size(mut self, size: usize) -> Self {
        self.batch_fetch_size = size;
        self
    }
}
