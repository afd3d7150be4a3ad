//! Fetch strategies for the order aggregate.
//!
//! This module builds predicates, runs the root queries of each strategy,
//! resolves lazy relations explicitly, and plans the two-phase fetch.

mod config;
mod executor;
mod filter;
mod join;
mod loader;
mod pagination;
mod planner;
mod row_codec;
mod strategy;

pub use config::FetchConfig;
pub use executor::{FlatLine, OrderFlatRow, QueryExecutor};
pub use filter::{Clause, OrderSearch, Predicate};
pub use loader::{Loader, Resolvable};
pub use pagination::{Page, PaginationGuard, DEFAULT_LIMIT, DEFAULT_OFFSET};
pub use planner::FetchPlanner;
pub use strategy::Strategy;
