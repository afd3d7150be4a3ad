//! Column layouts and row decoders shared by the executor and the loader.
//!
//! Each `*_COLUMNS` constant lists the columns a decoder expects, starting at
//! the `base` index it is given.

use rusqlite::Row;

use crate::catalog::{Address, Children, Delivery, Item, Member, Order, OrderItem, Ref, ScopeId};

pub(crate) const ORDER_COLUMNS: &str = "o.id, o.order_date, o.status, o.member_id, o.delivery_id";
pub(crate) const MEMBER_COLUMNS: &str = "m.id, m.name, m.city, m.street, m.zipcode";
pub(crate) const DELIVERY_COLUMNS: &str = "d.id, d.city, d.street, d.zipcode, d.status";
pub(crate) const ORDER_ITEM_COLUMNS: &str = "oi.id, oi.order_id, oi.item_id, oi.order_price, oi.count";
pub(crate) const ITEM_COLUMNS: &str = "i.id, i.name, i.price, i.stock_quantity";

pub(crate) const ORDER_WIDTH: usize = 5;
pub(crate) const MEMBER_WIDTH: usize = 5;
pub(crate) const DELIVERY_WIDTH: usize = 5;
pub(crate) const ORDER_ITEM_WIDTH: usize = 5;

fn address(row: &Row<'_>, base: usize) -> rusqlite::Result<Address> {
    Ok(Address {
        city: row.get(base)?,
        street: row.get(base + 1)?,
        zipcode: row.get(base + 2)?,
    })
}

pub(crate) fn member(row: &Row<'_>, base: usize) -> rusqlite::Result<Member> {
    Ok(Member {
        id: row.get(base)?,
        name: row.get(base + 1)?,
        address: address(row, base + 2)?,
    })
}

pub(crate) fn delivery(row: &Row<'_>, base: usize) -> rusqlite::Result<Delivery> {
    Ok(Delivery {
        id: row.get(base)?,
        address: address(row, base + 1)?,
        status: row.get(base + 4)?,
    })
}

pub(crate) fn item(row: &Row<'_>, base: usize) -> rusqlite::Result<Item> {
    Ok(Item {
        id: row.get(base)?,
        name: row.get(base + 1)?,
        price: row.get(base + 2)?,
        stock_quantity: row.get(base + 3)?,
    })
}

/// Order with every relation left lazy.
pub(crate) fn lazy_order(row: &Row<'_>, base: usize, scope: ScopeId) -> rusqlite::Result<Order> {
    let id: i64 = row.get(base)?;
    Ok(Order {
        id,
        order_date: row.get(base + 1)?,
        status: row.get(base + 2)?,
        member: Ref::lazy(row.get(base + 3)?, scope),
        delivery: Ref::lazy(row.get(base + 4)?, scope),
        order_items: Children::lazy(id, scope),
    })
}

/// Order followed by member and delivery columns, both attached.
pub(crate) fn order_with_member_delivery(
    row: &Row<'_>,
    scope: ScopeId,
) -> rusqlite::Result<Order> {
    let mut order = lazy_order(row, 0, scope)?;
    let member = member(row, ORDER_WIDTH)?;
    let delivery = delivery(row, ORDER_WIDTH + MEMBER_WIDTH)?;
    order.member = Ref::loaded(member.id, scope, member);
    order.delivery = Ref::loaded(delivery.id, scope, delivery);
    Ok(order)
}

/// Order item whose item is left lazy.
pub(crate) fn lazy_order_item(
    row: &Row<'_>,
    base: usize,
    scope: ScopeId,
) -> rusqlite::Result<OrderItem> {
    Ok(OrderItem {
        id: row.get(base)?,
        order_id: row.get(base + 1)?,
        item: Ref::lazy(row.get(base + 2)?, scope),
        order_price: row.get(base + 3)?,
        count: row.get(base + 4)?,
    })
}

/// Order item followed by item columns, item attached.
pub(crate) fn order_item_with_item(
    row: &Row<'_>,
    base: usize,
    scope: ScopeId,
) -> rusqlite::Result<OrderItem> {
    let mut order_item = lazy_order_item(row, base, scope)?;
    let item = item(row, base + ORDER_ITEM_WIDTH)?;
    order_item.item = Ref::loaded(item.id, scope, item);
    Ok(order_item)
}
