//! Line-less order listing endpoint.

use axum::extract::{Query, State};
use axum::response::{IntoResponse, Response};
use axum::routing::get;
use axum::Router;
use orderfetch_core::assemble;

use crate::error::AppError;
use crate::json::SimpleOrdersParams;
use crate::AppState;

/// Simple order routes.
pub fn routes() -> Router<AppState> {
    Router::new().route("/simple-orders", get(list_simple_orders))
}

/// List orders without their lines.
async fn list_simple_orders(
    State(state): State<AppState>,
    Query(params): Query<SimpleOrdersParams>,
) -> Result<Response, AppError> {
    let strategy = params.view.unwrap_or_default().strategy();
    let predicate = params.predicate()?;

    let fetched = state
        .execute_read(move |planner| {
            let orders = planner.fetch_orders(strategy, &predicate, None)?;
            assemble::simple_order_dtos(&orders, planner.loader(), planner.executor().scope())
        })
        .await?;
    Ok(fetched.into_response())
}
