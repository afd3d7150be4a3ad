//! Order fetch HTTP/JSON gateway.
//!
//! Exposes every fetch strategy behind its own view so callers can compare
//! results and round trips side by side.

pub mod config;
pub mod error;
pub mod json;
pub mod routes;

pub use config::{Args, GatewayConfig};
pub use error::AppError;

use std::sync::Arc;

use axum::http::HeaderName;
use axum::response::{IntoResponse, Response};
use axum::{Json, Router};
use orderfetch_core::{Error, FetchPlanner, StorageEngine};
use serde::Serialize;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

/// Header carrying the number of statements a request issued.
pub const ROUND_TRIPS_HEADER: &str = "x-round-trips";

/// Application state shared across all routes.
#[derive(Clone)]
pub struct AppState {
    /// Pooled order store.
    pub store: Arc<StorageEngine>,
    /// Gateway configuration.
    pub config: GatewayConfig,
}

/// Result of one read scope, with the statements it issued.
#[derive(Debug)]
pub struct Fetched<T> {
    /// Value produced inside the scope.
    pub value: T,
    /// Round trips the scope issued.
    pub round_trips: usize,
}

impl<T: Serialize> IntoResponse for Fetched<T> {
    fn into_response(self) -> Response {
        (
            [(ROUND_TRIPS_HEADER, self.round_trips.to_string())],
            Json(self.value),
        )
            .into_response()
    }
}

impl AppState {
    /// Create new application state.
    pub fn new(store: StorageEngine, config: GatewayConfig) -> Self {
        Self {
            store: Arc::new(store),
            config,
        }
    }

    /// Run `f` inside one read scope on the blocking pool.
    ///
    /// The scope commits when `f` succeeds and rolls back otherwise. The whole
    /// read is bounded by the configured request timeout.
    pub async fn execute_read<T, F>(&self, f: F) -> Result<Fetched<T>, AppError>
    where
        T: Send + 'static,
        F: FnOnce(&FetchPlanner<'_>) -> Result<T, Error> + Send + 'static,
    {
        let store = Arc::clone(&self.store);
        let fetch = self.config.fetch.clone();
        let timeout = self.config.request_timeout;

        let task = tokio::task::spawn_blocking(move || -> Result<Fetched<T>, Error> {
            let scope = store.read_scope()?;
            let planner = FetchPlanner::new(&scope, &fetch);
            let value = f(&planner)?;
            let round_trips = scope.round_trips();
            scope.commit()?;
            Ok(Fetched { value, round_trips })
        });

        let joined = tokio::time::timeout(timeout, task)
            .await
            .map_err(|_| AppError::Timeout(timeout))?
            .map_err(|err| AppError::Internal(format!("read task failed: {err}")))?;
        Ok(joined?)
    }
}

/// Create the router with all routes.
pub fn create_router(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any)
        .expose_headers([HeaderName::from_static(ROUND_TRIPS_HEADER)]);

    Router::new()
        .merge(routes::health::routes())
        .merge(routes::orders::routes())
        .merge(routes::simple_orders::routes())
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .with_state(state)
}
