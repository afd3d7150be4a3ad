//! Storage configuration.

use std::path::PathBuf;
use std::time::Duration;

/// Configuration for the connection-pooled store.
#[derive(Debug, Clone)]
pub struct StorageConfig {
    /// Path to the SQLite database file. None opens a private in-memory database.
    pub path: Option<PathBuf>,

    /// Number of pooled connections. Forced to 1 for in-memory databases.
    pub pool_size: usize,

    /// How long a read waits for a free connection.
    pub acquire_timeout: Duration,

    /// How long SQLite retries a locked database before failing.
    pub busy_timeout: Duration,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            path: None,
            pool_size: 4,
            acquire_timeout: Duration::from_secs(30),
            busy_timeout: Duration::from_secs(5),
        }
    }
}

impl StorageConfig {
    /// Create a config for a database file.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: Some(path.into()),
            ..Default::default()
        }
    }

    /// Create a config for a private in-memory database.
    pub fn in_memory() -> Self {
        Self {
            pool_size: 1,
            ..Default::default()
        }
    }

    /// Set the pool size.
    pub fn with_pool_size(mut self, size: usize) -> Self {
        self.pool_size = size.max(1);
        self
    }

    /// Set the acquire timeout.
    pub fn with_acquire_timeout(mut self, timeout: Duration) -> Self {
        self.acquire_timeout = timeout;
        self
    }

    /// Set the busy timeout.
    pub fn with_busy_timeout(mut self, timeout: Duration) -> Self {
        self.busy_timeout = timeout;
        self
    }

    /// Pool size actually used.
    pub(crate) fn effective_pool_size(&self) -> usize {
        match self.path {
            Some(_) => self.pool_size.max(1),
            None => 1,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_in_memory_uses_single_connection() {
        let config = StorageConfig::in_memory().with_pool_size(8);
        assert_eq!(config.pool_size, 8);
        assert_eq!(config.effective_pool_size(), 1);
    }

    #[test]
    fn test_file_pool_size_is_at_least_one() {
        let config = StorageConfig::new("/tmp/orders.db").with_pool_size(0);
        assert_eq!(config.effective_pool_size(), 1);
    }
}
