//! Explicit resolution of lazy relations.
//!
//! Nothing is resolved behind the caller's back: touching a relation means
//! calling [`Loader::resolve`] with the scope the entity came from. The first
//! touch of a key costs one round trip; later touches in the same scope are
//! served from the scope's identity map.

use std::collections::HashMap;

use crate::catalog::{Children, Delivery, Item, Member, Order, OrderItem, Ref};
use crate::error::Error;
use crate::storage::{IdentityMap, ReadScope};

use super::config::FetchConfig;
use super::executor::order_items_by_owner;
use super::join::group_by_owner;
use super::row_codec::{self, DELIVERY_COLUMNS, ITEM_COLUMNS, MEMBER_COLUMNS, ORDER_ITEM_COLUMNS};

mod sealed {
    pub trait Sealed {}

    impl Sealed for crate::catalog::Member {}
    impl Sealed for crate::catalog::Delivery {}
    impl Sealed for crate::catalog::Item {}
}

/// An entity that a single-valued relation can point at.
///
/// Sealed: the identity map only has slots for the entities below.
///
/// ```compile_fail
/// use std::collections::HashMap;
/// use orderfetch_core::query::Resolvable;
/// use orderfetch_core::storage::{IdentityMap, ReadScope};
/// use orderfetch_core::Error;
///
/// #[derive(Clone)]
/// struct Coupon;
///
/// impl Resolvable for Coupon {
///     const ENTITY: &'static str = "Coupon";
///     fn slot(_: &mut IdentityMap) -> &mut HashMap<i64, Self> { unimplemented!() }
///     fn fetch(_: &ReadScope<'_>, _: i64) -> Result<Option<Self>, Error> { Ok(None) }
/// }
/// ```
pub trait Resolvable: sealed::Sealed + Clone + Sized {
    /// Entity name used in errors and logs.
    const ENTITY: &'static str;

    /// Identity map slot for this entity.
    fn slot(map: &mut IdentityMap) -> &mut HashMap<i64, Self>;

    /// Load one row by key. One round trip.
    fn fetch(scope: &ReadScope<'_>, key: i64) -> Result<Option<Self>, Error>;
}

impl Resolvable for Member {
    const ENTITY: &'static str = "Member";

    fn slot(map: &mut IdentityMap) -> &mut HashMap<i64, Self> {
        &mut map.members
    }

    fn fetch(scope: &ReadScope<'_>, key: i64) -> Result<Option<Self>, Error> {
        let sql = format!("SELECT {MEMBER_COLUMNS} FROM member m WHERE m.id = ?1");
        let rows = scope.query(&sql, [key], |row| row_codec::member(row, 0))?;
        Ok(rows.into_iter().next())
    }
}

impl Resolvable for Delivery {
    const ENTITY: &'static str = "Delivery";

    fn slot(map: &mut IdentityMap) -> &mut HashMap<i64, Self> {
        &mut map.deliveries
    }

    fn fetch(scope: &ReadScope<'_>, key: i64) -> Result<Option<Self>, Error> {
        let sql = format!("SELECT {DELIVERY_COLUMNS} FROM delivery d WHERE d.id = ?1");
        let rows = scope.query(&sql, [key], |row| row_codec::delivery(row, 0))?;
        Ok(rows.into_iter().next())
    }
}

impl Resolvable for Item {
    const ENTITY: &'static str = "Item";

    fn slot(map: &mut IdentityMap) -> &mut HashMap<i64, Self> {
        &mut map.items
    }

    fn fetch(scope: &ReadScope<'_>, key: i64) -> Result<Option<Self>, Error> {
        let sql = format!("SELECT {ITEM_COLUMNS} FROM item i WHERE i.id = ?1");
        let rows = scope.query(&sql, [key], |row| row_codec::item(row, 0))?;
        Ok(rows.into_iter().next())
    }
}

/// Resolves lazy relations within their originating scope.
#[derive(Debug, Clone, Default)]
pub struct Loader {
    batch_fetch_size: usize,
}

impl Loader {
    /// Loader using the configured collection batch size.
    pub fn new(config: &FetchConfig) -> Self {
        Self {
            batch_fetch_size: config.batch_fetch_size.min(config.in_clause_batch_size),
        }
    }

    /// Loader that never prefetches collections.
    pub fn unbatched() -> Self {
        Self::default()
    }

    /// Owners prefetched per collection query. 0 means no prefetching.
    pub fn batch_fetch_size(&self) -> usize {
        self.batch_fetch_size
    }

    /// Resolve a single-valued relation.
    ///
    /// Fails with [`Error::StaleReference`] when `scope` is not the scope the
    /// reference was loaded in, even if its target is already attached.
    pub fn resolve<T: Resolvable>(&self, reference: &Ref<T>, scope: &ReadScope<'_>) -> Result<T, Error> {
        scope.check_origin(T::ENTITY, reference.key(), reference.scope())?;

        if let Some(value) = reference.get() {
            return Ok(value.clone());
        }
        if let Some(value) = T::slot(&mut scope.identity()).get(&reference.key()) {
            return Ok(value.clone());
        }

        let value = T::fetch(scope, reference.key())?.ok_or_else(|| {
            Error::InvalidData(format!(
                "{} #{} is referenced but missing",
                T::ENTITY,
                reference.key()
            ))
        })?;
        T::slot(&mut scope.identity()).insert(reference.key(), value.clone());
        Ok(value)
    }

    /// Resolve the order items of one order. Items inside stay lazy unless
    /// they were fetch-joined or prefetched.
    pub fn resolve_order_items(
        &self,
        children: &Children<OrderItem>,
        scope: &ReadScope<'_>,
    ) -> Result<Vec<OrderItem>, Error> {
        scope.check_origin("OrderItem", children.owner(), children.scope())?;

        if let Some(values) = children.get() {
            return Ok(values.to_vec());
        }
        if let Some(values) = scope.identity().order_items.get(&children.owner()) {
            return Ok(values.clone());
        }

        let sql = format!(
            "SELECT {ORDER_ITEM_COLUMNS} FROM order_item oi WHERE oi.order_id = ?1 ORDER BY oi.id"
        );
        let scope_id = scope.id();
        let values = scope.query(&sql, [children.owner()], |row| {
            row_codec::lazy_order_item(row, 0, scope_id)
        })?;
        scope
            .identity()
            .order_items
            .insert(children.owner(), values.clone());
        Ok(values)
    }

    /// Load the still-lazy item collections of `orders` in batches of
    /// `batch_fetch_size` owners, so later resolves hit the identity map.
    ///
    /// Does nothing when batching is disabled.
    pub fn prefetch_order_items(&self, orders: &[Order], scope: &ReadScope<'_>) -> Result<(), Error> {
        if self.batch_fetch_size == 0 {
            return Ok(());
        }

        let mut owners = Vec::new();
        {
            let identity = scope.identity();
            for order in orders {
                scope.check_origin("OrderItem", order.id, order.order_items.scope())?;
                if !order.order_items.is_loaded() && !identity.order_items.contains_key(&order.id) {
                    owners.push(order.id);
                }
            }
        }
        if owners.is_empty() {
            return Ok(());
        }

        let mut groups = group_by_owner(order_items_by_owner(scope, &owners, self.batch_fetch_size)?);
        let mut identity = scope.identity();
        for owner in owners {
            let items = groups.remove(&owner).unwrap_or_default();
            identity.order_items.insert(owner, items);
        }
        Ok(())
    }
}
