//! Data loading for fixtures, benches and the demo dataset.
//!
//! Placing or cancelling orders is not part of this crate; the seeder only
//! writes rows so that the read path has something to fetch.

use chrono::NaiveDateTime;
use rusqlite::{params, Connection};

use crate::catalog::{Address, DeliveryStatus, OrderStatus};
use crate::error::Error;

/// One order line to insert: item id, unit price snapshot, quantity.
#[derive(Debug, Clone, Copy)]
pub struct Line {
    pub item_id: i64,
    pub order_price: i64,
    pub count: i64,
}

impl Line {
    pub fn new(item_id: i64, order_price: i64, count: i64) -> Self {
        Self {
            item_id,
            order_price,
            count,
        }
    }
}

/// Inserts rows inside the write transaction opened by
/// [`StorageEngine::seed`](super::StorageEngine::seed).
pub struct Seeder<'a> {
    conn: &'a Connection,
}

impl<'a> Seeder<'a> {
    pub(crate) fn new(conn: &'a Connection) -> Self {
        Self { conn }
    }

    /// Insert a member and return its id.
    pub fn member(&mut self, name: &str, address: &Address) -> Result<i64, Error> {
        if name.trim().is_empty() {
            return Err(Error::InvalidData("member name must not be blank".to_string()));
        }
        self.conn.execute(
            "INSERT INTO member (name, city, street, zipcode) VALUES (?1, ?2, ?3, ?4)",
            params![name, address.city, address.street, address.zipcode],
        )?;
        Ok(self.conn.last_insert_rowid())
    }

    /// Insert an item and return its id.
    pub fn item(&mut self, name: &str, price: i64, stock_quantity: i64) -> Result<i64, Error> {
        self.conn.execute(
            "INSERT INTO item (name, price, stock_quantity) VALUES (?1, ?2, ?3)",
            params![name, price, stock_quantity],
        )?;
        Ok(self.conn.last_insert_rowid())
    }

    /// Insert an order with its delivery and lines; returns the order id.
    pub fn order(
        &mut self,
        member_id: i64,
        ship_to: &Address,
        status: OrderStatus,
        order_date: NaiveDateTime,
        lines: &[Line],
    ) -> Result<i64, Error> {
        self.conn.execute(
            "INSERT INTO delivery (city, street, zipcode, status) VALUES (?1, ?2, ?3, ?4)",
            params![ship_to.city, ship_to.street, ship_to.zipcode, DeliveryStatus::Ready],
        )?;
        let delivery_id = self.conn.last_insert_rowid();

        self.conn.execute(
            "INSERT INTO orders (member_id, delivery_id, order_date, status) VALUES (?1, ?2, ?3, ?4)",
            params![member_id, delivery_id, order_date, status],
        )?;
        let order_id = self.conn.last_insert_rowid();

        let mut stmt = self.conn.prepare_cached(
            "INSERT INTO order_item (order_id, item_id, order_price, count) VALUES (?1, ?2, ?3, ?4)",
        )?;
        for line in lines {
            stmt.execute(params![order_id, line.item_id, line.order_price, line.count])?;
        }

        Ok(order_id)
    }
}

/// Two members with one two-line order each.
pub fn demo(seeder: &mut Seeder<'_>) -> Result<(), Error> {
    let placed_at = |s: &str| {
        NaiveDateTime::parse_from_str(s, "%Y-%m-%d %H:%M:%S")
            .map_err(|e| Error::InvalidData(e.to_string()))
    };

    let seoul = Address::new("Seoul", "1", "1111");
    let user_a = seeder.member("userA", &seoul)?;
    let jpa1 = seeder.item("JPA1 BOOK", 10_000, 100)?;
    let jpa2 = seeder.item("JPA2 BOOK", 20_000, 100)?;
    seeder.order(
        user_a,
        &seoul,
        OrderStatus::Placed,
        placed_at("2024-03-01 10:00:00")?,
        &[Line::new(jpa1, 10_000, 1), Line::new(jpa2, 20_000, 2)],
    )?;

    let busan = Address::new("Busan", "2", "2222");
    let user_b = seeder.member("userB", &busan)?;
    let spring1 = seeder.item("SPRING1 BOOK", 20_000, 200)?;
    let spring2 = seeder.item("SPRING2 BOOK", 40_000, 300)?;
    seeder.order(
        user_b,
        &busan,
        OrderStatus::Placed,
        placed_at("2024-03-02 15:30:00")?,
        &[Line::new(spring1, 20_000, 3), Line::new(spring2, 40_000, 4)],
    )?;

    Ok(())
}
