//! In-memory collapsing and grouping of joined rows.
//!
//! - `dedup_roots`: collapse a one-to-many fetch-join back to one entry per root
//! - `group_by_owner`: hash-build children by owner id for a later probe by root

use std::collections::HashMap;

use crate::catalog::{Children, Order, OrderItem, ScopeId};

/// One raw row of the full fetch-join.
#[derive(Debug)]
pub(crate) struct JoinedRow {
    pub order: Order,
    /// None when the order has no items (left join).
    pub child: Option<OrderItem>,
}

/// Collapse joined rows on order identity.
///
/// Roots keep first-seen order; children of each root are merged and sorted
/// by their own id.
pub(crate) fn dedup_roots(rows: Vec<JoinedRow>, scope: ScopeId) -> Vec<Order> {
    let mut position: HashMap<i64, usize> = HashMap::new();
    let mut roots: Vec<Order> = Vec::new();
    let mut children: Vec<Vec<OrderItem>> = Vec::new();

    for JoinedRow { order, child } in rows {
        let slot = match position.get(&order.id) {
            Some(&slot) => slot,
            None => {
                position.insert(order.id, roots.len());
                roots.push(order);
                children.push(Vec::new());
                roots.len() - 1
            }
        };
        if let Some(child) = child {
            children[slot].push(child);
        }
    }

    for (root, mut items) in roots.iter_mut().zip(children) {
        items.sort_by_key(|item| item.id);
        root.order_items = Children::loaded(root.id, scope, items);
    }
    roots
}

/// Build phase of a hash join: children by owning order id, each group
/// sorted by child id.
pub(crate) fn group_by_owner(order_items: Vec<OrderItem>) -> HashMap<i64, Vec<OrderItem>> {
    let mut groups: HashMap<i64, Vec<OrderItem>> = HashMap::new();
    for order_item in order_items {
        groups.entry(order_item.order_id).or_default().push(order_item);
    }
    for group in groups.values_mut() {
        group.sort_by_key(|item| item.id);
    }
    groups
}

/// Probe phase: attach each root's group, or an empty collection.
pub(crate) fn attach_children(orders: &mut [Order], mut groups: HashMap<i64, Vec<OrderItem>>) {
    for order in orders {
        let items = groups.remove(&order.id).unwrap_or_default();
        order.order_items.attach(items);
    }
}
