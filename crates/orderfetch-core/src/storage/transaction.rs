//! Scoped read transactions.

use std::cell::{Cell, RefCell, RefMut};
use std::collections::HashMap;

use rusqlite::{Params, Row};

use crate::catalog::{Delivery, Item, Member, OrderItem, ScopeId};
use crate::error::Error;

use super::pool::PooledConnection;

/// Rows already resolved within one scope, keyed by identity.
///
/// Touching the same lazy relation twice in a scope costs one round trip.
#[derive(Debug, Default)]
pub struct IdentityMap {
    pub(crate) members: HashMap<i64, Member>,
    pub(crate) deliveries: HashMap<i64, Delivery>,
    pub(crate) items: HashMap<i64, Item>,
    /// Order items by owning order id.
    pub(crate) order_items: HashMap<i64, Vec<OrderItem>>,
}

/// One read transaction on one pooled connection.
///
/// Every statement issued through [`ReadScope::query`] counts as a round trip.
/// Dropping the scope without [`ReadScope::commit`] rolls it back.
pub struct ReadScope<'a> {
    id: ScopeId,
    conn: PooledConnection<'a>,
    round_trips: Cell<usize>,
    identity: RefCell<IdentityMap>,
    finished: bool,
}

impl<'a> ReadScope<'a> {
    pub(crate) fn begin(id: ScopeId, conn: PooledConnection<'a>) -> Result<Self, Error> {
        conn.execute_batch("BEGIN DEFERRED")?;
        tracing::trace!(scope = %id, "read scope opened");
        Ok(Self {
            id,
            conn,
            round_trips: Cell::new(0),
            identity: RefCell::new(IdentityMap::default()),
            finished: false,
        })
    }

    /// Identity of this scope.
    pub fn id(&self) -> ScopeId {
        self.id
    }

    /// Statements issued so far.
    pub fn round_trips(&self) -> usize {
        self.round_trips.get()
    }

    /// Run one statement and map every row.
    pub fn query<T, P, F>(&self, sql: &str, params: P, map: F) -> Result<Vec<T>, Error>
    where
        P: Params,
        F: FnMut(&Row<'_>) -> rusqlite::Result<T>,
    {
        let trip = self.round_trips.get() + 1;
        self.round_trips.set(trip);
        tracing::debug!(scope = %self.id, round_trip = trip, sql, "query");

        let mut stmt = self.conn.prepare_cached(sql)?;
        let rows = stmt
            .query_map(params, map)?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(rows)
    }

    /// Fail fast when a reference was produced by another scope.
    pub(crate) fn check_origin(
        &self,
        entity: &'static str,
        key: i64,
        origin: ScopeId,
    ) -> Result<(), Error> {
        if origin == self.id {
            Ok(())
        } else {
            Err(Error::StaleReference {
                entity,
                key,
                origin: origin.get(),
                current: self.id.get(),
            })
        }
    }

    pub(crate) fn identity(&self) -> RefMut<'_, IdentityMap> {
        self.identity.borrow_mut()
    }

    /// End the transaction.
    pub fn commit(mut self) -> Result<(), Error> {
        self.conn.execute_batch("COMMIT")?;
        self.finished = true;
        tracing::trace!(scope = %self.id, round_trips = self.round_trips.get(), "read scope closed");
        Ok(())
    }
}

impl Drop for ReadScope<'_> {
    fn drop(&mut self) {
        if !self.finished {
            if let Err(e) = self.conn.execute_batch("ROLLBACK") {
                tracing::warn!(scope = %self.id, error = %e, "rollback of read scope failed");
            }
        }
    }
}
