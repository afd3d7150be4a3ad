//! Storage engine implementation.

use std::sync::atomic::{AtomicU64, Ordering};

use rusqlite::Connection;

use super::pool::{ConnectionPool, PooledConnection};
use super::schema::SCHEMA;
use super::seed::Seeder;
use super::{ReadScope, StorageConfig};
use crate::catalog::ScopeId;
use crate::error::Error;

/// Scope ids are unique per process, so a reference from one engine never
/// passes the origin check of another engine's scope.
static NEXT_SCOPE: AtomicU64 = AtomicU64::new(1);

/// A small pool of SQLite connections handing out scoped read transactions.
pub struct StorageEngine {
    pool: ConnectionPool,
    config: StorageConfig,
}

impl StorageEngine {
    /// Open the pool and make sure the schema exists.
    pub fn open(config: StorageConfig) -> Result<Self, Error> {
        let size = config.effective_pool_size();
        if config.path.is_none() && config.pool_size > 1 {
            tracing::warn!(
                requested = config.pool_size,
                "in-memory database cannot be shared; using a single connection"
            );
        }

        let mut connections = Vec::with_capacity(size);
        for _ in 0..size {
            let conn = match &config.path {
                Some(path) => Connection::open(path)?,
                None => Connection::open_in_memory()?,
            };
            conn.busy_timeout(config.busy_timeout)?;
            conn.pragma_update(None, "foreign_keys", true)?;
            connections.push(conn);
        }

        let engine = Self {
            pool: ConnectionPool::new(connections, config.acquire_timeout),
            config,
        };
        engine.acquire()?.execute_batch(SCHEMA)?;

        tracing::info!(
            path = ?engine.config.path,
            pool_size = engine.pool.size(),
            "storage engine opened"
        );
        Ok(engine)
    }

    /// Storage configuration.
    pub fn config(&self) -> &StorageConfig {
        &self.config
    }

    /// Open a read transaction on a free connection.
    pub fn read_scope(&self) -> Result<ReadScope<'_>, Error> {
        let conn = self.acquire()?;
        let id = ScopeId(NEXT_SCOPE.fetch_add(1, Ordering::Relaxed));
        ReadScope::begin(id, conn)
    }

    /// Check that a connection can be acquired and answers.
    pub fn ping(&self) -> Result<(), Error> {
        let conn = self.acquire()?;
        conn.query_row("SELECT 1", [], |row| row.get::<_, i64>(0))?;
        Ok(())
    }

    /// Load rows in one write transaction.
    pub fn seed<F>(&self, f: F) -> Result<(), Error>
    where
        F: FnOnce(&mut Seeder<'_>) -> Result<(), Error>,
    {
        let mut conn = self.acquire()?;
        let tx = conn.transaction()?;
        {
            let mut seeder = Seeder::new(&tx);
            f(&mut seeder)?;
        }
        tx.commit()?;
        Ok(())
    }

    fn acquire(&self) -> Result<PooledConnection<'_>, Error> {
        self.pool.acquire()
    }
}
