//! Storage layer for the order aggregate.
//!
//! This module provides a pooled SQLite engine handing out scoped read
//! transactions that count their round trips.

mod config;
mod engine;
mod pool;
mod schema;
mod transaction;

pub mod seed;

pub use config::StorageConfig;
pub use engine::StorageEngine;
pub use seed::{Line, Seeder};
pub use transaction::{IdentityMap, ReadScope};
