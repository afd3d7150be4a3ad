//! Domain catalog for the order aggregate.
//!
//! Entities, their relations, and the scope-bound references that connect them.

mod entity;
mod reference;
mod relation;

pub use entity::{
    Address, Delivery, DeliveryStatus, Item, Member, Order, OrderItem, OrderStatus, UnknownStatus,
};
pub use reference::{Children, Ref, ScopeId};
pub use relation::{Cardinality, Relation};
