//! Response records.
//!
//! Plain immutable data: no references, no scope, safe to cache and to hand
//! to any serializer. Field sets are exactly what the HTTP contract promises.

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

use crate::catalog::{Address, Delivery, Item, Member, OrderStatus};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AddressDto {
    pub city: String,
    pub street: String,
    pub zipcode: String,
}

impl From<&Address> for AddressDto {
    fn from(address: &Address) -> Self {
        Self {
            city: address.city.clone(),
            street: address.street.clone(),
            zipcode: address.zipcode.clone(),
        }
    }
}

/// One order line as exposed to callers.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderItemDto {
    pub item_name: String,
    /// Unit price at the time of the order.
    pub order_price: i64,
    pub count: i64,
}

/// An order with its lines.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderDto {
    pub order_id: i64,
    pub member_name: String,
    pub order_date: NaiveDateTime,
    pub order_status: OrderStatus,
    /// Delivery address.
    pub address: AddressDto,
    /// Sorted by order item id.
    pub order_items: Vec<OrderItemDto>,
}

/// An order without its lines.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SimpleOrderDto {
    pub order_id: i64,
    pub name: String,
    pub order_date: NaiveDateTime,
    pub order_status: OrderStatus,
    pub address: AddressDto,
}

/// Fully resolved entity graph, identifiers included. Exposes internals.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderGraph {
    pub id: i64,
    pub order_date: NaiveDateTime,
    pub status: OrderStatus,
    pub member: Member,
    pub delivery: Delivery,
    pub order_items: Vec<OrderItemGraph>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderItemGraph {
    pub id: i64,
    pub order_price: i64,
    pub count: i64,
    pub item: Item,
}
