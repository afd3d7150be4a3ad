//! Blocking connection pool.

use std::ops::{Deref, DerefMut};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::{Duration, Instant};

use parking_lot::{Condvar, Mutex, MutexGuard};
use rusqlite::Connection;

use crate::error::Error;

/// Fixed set of connections. Waiters park on a condition variable that every
/// returned connection signals, so any freed slot wakes a waiter.
pub(crate) struct ConnectionPool {
    slots: Vec<Mutex<Connection>>,
    next_slot: AtomicUsize,
    gate: Mutex<()>,
    released: Condvar,
    acquire_timeout: Duration,
}

impl ConnectionPool {
    pub(crate) fn new(connections: Vec<Connection>, acquire_timeout: Duration) -> Self {
        Self {
            slots: connections.into_iter().map(Mutex::new).collect(),
            next_slot: AtomicUsize::new(0),
            gate: Mutex::new(()),
            released: Condvar::new(),
            acquire_timeout,
        }
    }

    pub(crate) fn size(&self) -> usize {
        self.slots.len()
    }

    /// Take any free connection, waiting up to the acquire timeout.
    pub(crate) fn acquire(&self) -> Result<PooledConnection<'_>, Error> {
        let deadline = Instant::now() + self.acquire_timeout;
        let mut gate = self.gate.lock();

        loop {
            if let Some(guard) = self.sweep() {
                return Ok(PooledConnection {
                    guard: Some(guard),
                    pool: self,
                });
            }
            // Releases notify under the gate, so no wakeup is lost between
            // the sweep and the wait.
            if self.released.wait_until(&mut gate, deadline).timed_out() {
                return match self.sweep() {
                    Some(guard) => Ok(PooledConnection {
                        guard: Some(guard),
                        pool: self,
                    }),
                    None => Err(Error::PoolExhausted(self.acquire_timeout)),
                };
            }
        }
    }

    fn sweep(&self) -> Option<MutexGuard<'_, Connection>> {
        let size = self.slots.len();
        let start = self.next_slot.fetch_add(1, Ordering::Relaxed) % size;
        (0..size).find_map(|offset| self.slots[(start + offset) % size].try_lock())
    }

    fn release(&self) {
        let _gate = self.gate.lock();
        self.released.notify_one();
    }
}

/// A checked-out connection, returned to the pool on drop.
pub(crate) struct PooledConnection<'a> {
    guard: Option<MutexGuard<'a, Connection>>,
    pool: &'a ConnectionPool,
}

impl Deref for PooledConnection<'_> {
    type Target = Connection;

    fn deref(&self) -> &Connection {
        // Only taken in drop.
        match &self.guard {
            Some(guard) => &**guard,
            None => unreachable!("pooled connection used after release"),
        }
    }
}

impl DerefMut for PooledConnection<'_> {
    fn deref_mut(&mut self) -> &mut Connection {
        match &mut self.guard {
            Some(guard) => &mut **guard,
            None => unreachable!("pooled connection used after release"),
        }
    }
}

impl Drop for PooledConnection<'_> {
    fn drop(&mut self) {
        if let Some(guard) = self.guard.take() {
            drop(guard);
            self.pool.release();
        }
    }
}
