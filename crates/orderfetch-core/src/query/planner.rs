//! Fetch planner: picks the queries for a strategy and assembles the result.
//!
//! The two-phase plan is the recommended path:
//! 1. Roots with their to-one relations, paged safely (one row per root)
//! 2. Order items of those roots by `IN (...)`, chunked by `in_clause_batch_size`
//! 3. Group phase-2 rows by owner and attach them to the phase-1 roots
//!
//! Round trips are `1 + ceil(n / in_clause_batch_size)` for `n` roots.

use crate::assemble::{self, OrderDto};
use crate::catalog::Order;
use crate::error::Error;
use crate::storage::ReadScope;

use super::config::FetchConfig;
use super::executor::{OrderFlatRow, QueryExecutor};
use super::filter::Predicate;
use super::join::{attach_children, group_by_owner};
use super::loader::Loader;
use super::pagination::{Page, PaginationGuard};
use super::strategy::Strategy;

/// Runs a strategy end to end inside one read scope.
pub struct FetchPlanner<'a> {
    executor: QueryExecutor<'a>,
    loader: Loader,
}

impl<'a> FetchPlanner<'a> {
    /// Create a planner for a scope.
    pub fn new(scope: &'a ReadScope<'a>, config: &'a FetchConfig) -> Self {
        Self {
            executor: QueryExecutor::new(scope, config),
            loader: Loader::new(config),
        }
    }

    /// Replace the loader used for lazy relations.
    pub fn with_loader(mut self, loader: Loader) -> Self {
        self.loader = loader;
        self
    }

    /// Underlying executor.
    pub fn executor(&self) -> &QueryExecutor<'a> {
        &self.executor
    }

    /// Loader used for lazy relations.
    pub fn loader(&self) -> &Loader {
        &self.loader
    }

    /// Fetch order entities with the given strategy.
    ///
    /// The page is checked by the [`PaginationGuard`] first. The flat
    /// projection yields rows rather than entities; use [`Self::flat`].
    pub fn fetch_orders(
        &self,
        strategy: Strategy,
        predicate: &Predicate,
        page: Option<Page>,
    ) -> Result<Vec<Order>, Error> {
        PaginationGuard::check(strategy, page)?;

        match strategy {
            Strategy::Naive => self.executor.find_all(predicate, page),
            Strategy::ToOneJoin => self.executor.find_all_with_member_delivery(predicate, page),
            Strategy::FullJoin => self.executor.find_all_with_items(predicate),
            Strategy::TwoPhase => self.two_phase(predicate, page),
            Strategy::FlatProjection => Err(Error::InvalidData(
                "the flat-projection strategy yields rows, not order entities".to_string(),
            )),
        }
    }

    /// Two-phase fetch: roots with to-one relations, then their items in
    /// identifier-keyed batches.
    pub fn two_phase(&self, predicate: &Predicate, page: Option<Page>) -> Result<Vec<Order>, Error> {
        let mut orders = self.executor.find_all_with_member_delivery(predicate, page)?;
        if orders.is_empty() {
            return Ok(orders);
        }

        let order_ids: Vec<i64> = orders.iter().map(|order| order.id).collect();
        let batch = self.executor.config().in_clause_batch_size;
        let order_items = self.executor.find_order_items(&order_ids, batch)?;
        attach_children(&mut orders, group_by_owner(order_items));

        tracing::debug!(
            strategy = "two-phase",
            roots = orders.len(),
            round_trips = self.executor.scope().round_trips(),
            "assembled orders"
        );
        Ok(orders)
    }

    /// Flat projection rows. Never paged.
    pub fn flat(&self, predicate: &Predicate, page: Option<Page>) -> Result<Vec<OrderFlatRow>, Error> {
        PaginationGuard::check(Strategy::FlatProjection, page)?;
        self.executor.find_flat(predicate)
    }

    /// Fetch with a strategy and map to order DTOs.
    ///
    /// The to-one strategy prefetches item collections when the loader has a
    /// batch size; the naive strategy always resolves them one by one.
    pub fn order_dtos(
        &self,
        strategy: Strategy,
        predicate: &Predicate,
        page: Option<Page>,
    ) -> Result<Vec<OrderDto>, Error> {
        if strategy == Strategy::FlatProjection {
            return Ok(assemble::group_flat_rows(self.flat(predicate, page)?));
        }

        let orders = self.fetch_orders(strategy, predicate, page)?;
        let scope = self.executor.scope();
        if strategy == Strategy::ToOneJoin {
            self.loader.prefetch_order_items(&orders, scope)?;
        }
        assemble::order_dtos(&orders, &self.loader, scope)
    }

    /// One order DTO by id.
    pub fn order_dto(&self, order_id: i64) -> Result<OrderDto, Error> {
        let order = self.executor.find_one(order_id)?;
        let mut dtos = assemble::order_dtos(std::slice::from_ref(&order), &self.loader, self.executor.scope())?;
        dtos.pop().ok_or(Error::NotFound)
    }
}
