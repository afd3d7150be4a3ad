//! orderfetch core - fetch strategies for the order aggregate.
//!
//! This crate reads orders together with their member, delivery and lines
//! from a relational store, trading round trips, join row duplication and
//! pagination safety against each other through named strategies.

pub mod assemble;
pub mod catalog;
pub mod error;
pub mod query;
pub mod storage;

pub use assemble::{OrderDto, OrderGraph, SimpleOrderDto};
pub use catalog::{OrderStatus, ScopeId};
pub use error::Error;
pub use query::{FetchConfig, FetchPlanner, Loader, OrderSearch, Page, PaginationGuard, Predicate, Strategy};
pub use storage::{ReadScope, StorageConfig, StorageEngine};
