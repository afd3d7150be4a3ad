//! Entity query executor.
//!
//! Runs the root queries of each strategy inside one read scope. Results are
//! always ordered by order id so that every strategy sees roots in the same
//! order.

use chrono::NaiveDateTime;
use rusqlite::params_from_iter;
use rusqlite::types::Value;

use crate::catalog::{Order, OrderItem, OrderStatus};
use crate::error::Error;
use crate::storage::ReadScope;

use super::config::FetchConfig;
use super::filter::Predicate;
use super::join::{dedup_roots, JoinedRow};
use super::pagination::Page;
use super::row_codec::{
    self, DELIVERY_COLUMNS, DELIVERY_WIDTH, ITEM_COLUMNS, MEMBER_COLUMNS, MEMBER_WIDTH,
    ORDER_COLUMNS, ORDER_ITEM_COLUMNS, ORDER_WIDTH,
};

/// Scalar tuple produced by the flat projection. Carries no entity or reference.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OrderFlatRow {
    pub order_id: i64,
    pub member_name: String,
    pub order_date: NaiveDateTime,
    pub order_status: OrderStatus,
    pub city: String,
    pub street: String,
    pub zipcode: String,
    /// Present when the order has at least one line.
    pub line: Option<FlatLine>,
}

/// Line part of a flat row.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FlatLine {
    pub order_item_id: i64,
    pub item_name: String,
    pub order_price: i64,
    pub count: i64,
}

/// Executes root queries against one read scope.
pub struct QueryExecutor<'a> {
    scope: &'a ReadScope<'a>,
    config: &'a FetchConfig,
}

impl<'a> QueryExecutor<'a> {
    /// Create an executor bound to a scope.
    pub fn new(scope: &'a ReadScope<'a>, config: &'a FetchConfig) -> Self {
        Self { scope, config }
    }

    /// Scope the executor runs in.
    pub fn scope(&self) -> &'a ReadScope<'a> {
        self.scope
    }

    /// Fetch configuration.
    pub fn config(&self) -> &'a FetchConfig {
        self.config
    }

    /// Naive fetch: roots only, relations left lazy.
    ///
    /// Without a page the result is capped at `max_results` rows.
    pub fn find_all(&self, predicate: &Predicate, page: Option<Page>) -> Result<Vec<Order>, Error> {
        let (filter, mut params) = predicate.to_sql();
        let window = self.window(page, &mut params);
        let sql = format!(
            "SELECT {ORDER_COLUMNS} FROM orders o JOIN member m ON m.id = o.member_id{filter} \
             ORDER BY o.id{window}"
        );

        let scope_id = self.scope.id();
        let orders = self.scope.query(&sql, params_from_iter(params), |row| {
            row_codec::lazy_order(row, 0, scope_id)
        })?;
        tracing::debug!(strategy = "naive", roots = orders.len(), "fetched orders");
        Ok(orders)
    }

    /// To-one fetch-join: member and delivery arrive with the roots.
    ///
    /// Row count equals root count, so offset/limit is safe here.
    pub fn find_all_with_member_delivery(
        &self,
        predicate: &Predicate,
        page: Option<Page>,
    ) -> Result<Vec<Order>, Error> {
        let (filter, mut params) = predicate.to_sql();
        let window = self.window(page, &mut params);
        let sql = format!(
            "SELECT {ORDER_COLUMNS}, {MEMBER_COLUMNS}, {DELIVERY_COLUMNS} \
             FROM orders o \
             JOIN member m ON m.id = o.member_id \
             JOIN delivery d ON d.id = o.delivery_id{filter} \
             ORDER BY o.id{window}"
        );

        let scope_id = self.scope.id();
        let orders = self.scope.query(&sql, params_from_iter(params), |row| {
            row_codec::order_with_member_delivery(row, scope_id)
        })?;
        tracing::debug!(strategy = "to-one-join", roots = orders.len(), "fetched orders");
        Ok(orders)
    }

    /// Full fetch-join: the whole aggregate in one query.
    ///
    /// One row comes back per (order, order item) pair; rows are collapsed
    /// per order preserving first-seen order. Never paged.
    pub fn find_all_with_items(&self, predicate: &Predicate) -> Result<Vec<Order>, Error> {
        let (filter, params) = predicate.to_sql();
        self.full_join(&filter, params)
    }

    /// One order with its whole aggregate, or `NotFound`.
    pub fn find_one(&self, order_id: i64) -> Result<Order, Error> {
        let filter = " WHERE o.id = ?".to_string();
        self.full_join(&filter, vec![Value::Integer(order_id)])?
            .into_iter()
            .next()
            .ok_or(Error::NotFound)
    }

    /// Order items (with their item) of the given orders, one query per
    /// `chunk_size` identifiers.
    ///
    /// Any failing chunk fails the whole call.
    pub fn find_order_items(
        &self,
        order_ids: &[i64],
        chunk_size: usize,
    ) -> Result<Vec<OrderItem>, Error> {
        order_items_by_owner(self.scope, order_ids, chunk_size)
    }

    /// Flat projection: only the scalar columns an order DTO needs.
    pub fn find_flat(&self, predicate: &Predicate) -> Result<Vec<OrderFlatRow>, Error> {
        let (filter, params) = predicate.to_sql();
        let sql = format!(
            "SELECT o.id, m.name, o.order_date, o.status, d.city, d.street, d.zipcode, \
                    oi.id, i.name, oi.order_price, oi.count \
             FROM orders o \
             JOIN member m ON m.id = o.member_id \
             JOIN delivery d ON d.id = o.delivery_id \
             LEFT JOIN order_item oi ON oi.order_id = o.id \
             LEFT JOIN item i ON i.id = oi.item_id{filter} \
             ORDER BY o.id, oi.id"
        );

        let rows = self.scope.query(&sql, params_from_iter(params), |row| {
            let line = match row.get::<_, Option<i64>>(7)? {
                Some(order_item_id) => Some(FlatLine {
                    order_item_id,
                    item_name: row.get(8)?,
                    order_price: row.get(9)?,
                    count: row.get(10)?,
                }),
                None => None,
            };
            Ok(OrderFlatRow {
                order_id: row.get(0)?,
                member_name: row.get(1)?,
                order_date: row.get(2)?,
                order_status: row.get(3)?,
                city: row.get(4)?,
                street: row.get(5)?,
                zipcode: row.get(6)?,
                line,
            })
        })?;
        tracing::debug!(strategy = "flat-projection", rows = rows.len(), "fetched flat rows");
        Ok(rows)
    }

    fn full_join(&self, filter: &str, params: Vec<Value>) -> Result<Vec<Order>, Error> {
        let sql = format!(
            "SELECT {ORDER_COLUMNS}, {MEMBER_COLUMNS}, {DELIVERY_COLUMNS}, \
                    {ORDER_ITEM_COLUMNS}, {ITEM_COLUMNS} \
             FROM orders o \
             JOIN member m ON m.id = o.member_id \
             JOIN delivery d ON d.id = o.delivery_id \
             LEFT JOIN order_item oi ON oi.order_id = o.id \
             LEFT JOIN item i ON i.id = oi.item_id{filter} \
             ORDER BY o.id, oi.id"
        );

        let scope_id = self.scope.id();
        let child_base = ORDER_WIDTH + MEMBER_WIDTH + DELIVERY_WIDTH;
        let rows = self.scope.query(&sql, params_from_iter(params), |row| {
            let order = row_codec::order_with_member_delivery(row, scope_id)?;
            let child = match row.get::<_, Option<i64>>(child_base)? {
                Some(_) => Some(row_codec::order_item_with_item(row, child_base, scope_id)?),
                None => None,
            };
            Ok(JoinedRow { order, child })
        })?;

        let row_count = rows.len();
        let orders = dedup_roots(rows, scope_id);
        tracing::debug!(
            strategy = "full-join",
            rows = row_count,
            roots = orders.len(),
            "fetched and collapsed orders"
        );
        Ok(orders)
    }

    /// Append ` LIMIT ? OFFSET ?` for a page, or the hard cap without one.
    fn window(&self, page: Option<Page>, params: &mut Vec<Value>) -> &'static str {
        let (limit, offset) = match page {
            Some(page) => (page.limit, page.offset),
            None => (self.config.max_results, 0),
        };
        params.push(Value::Integer(to_sql_int(limit)));
        params.push(Value::Integer(to_sql_int(offset)));
        " LIMIT ? OFFSET ?"
    }
}

/// Order items with their item for a set of owners, chunked by `chunk_size`.
pub(crate) fn order_items_by_owner(
    scope: &ReadScope<'_>,
    order_ids: &[i64],
    chunk_size: usize,
) -> Result<Vec<OrderItem>, Error> {
    let chunk_size = chunk_size.max(1);
    let scope_id = scope.id();
    let mut order_items = Vec::new();

    for chunk in order_ids.chunks(chunk_size) {
        let placeholders = vec!["?"; chunk.len()].join(", ");
        let sql = format!(
            "SELECT {ORDER_ITEM_COLUMNS}, {ITEM_COLUMNS} \
             FROM order_item oi \
             JOIN item i ON i.id = oi.item_id \
             WHERE oi.order_id IN ({placeholders}) \
             ORDER BY oi.order_id, oi.id"
        );
        let rows = scope.query(&sql, params_from_iter(chunk.iter()), |row| {
            row_codec::order_item_with_item(row, 0, scope_id)
        })?;
        order_items.extend(rows);
    }

    tracing::debug!(
        owners = order_ids.len(),
        chunks = order_ids.len().div_ceil(chunk_size),
        rows = order_items.len(),
        "fetched order items by owner"
    );
    Ok(order_items)
}

fn to_sql_int(n: usize) -> i64 {
    i64::try_from(n).unwrap_or(i64::MAX)
}
