//! Order listing endpoints.

use axum::extract::{Path, Query, State};
use axum::response::{IntoResponse, Response};
use axum::routing::get;
use axum::Router;
use orderfetch_core::{assemble, Page};

use crate::error::AppError;
use crate::json::{OrdersParams, View};
use crate::AppState;

/// Order routes.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/orders", get(list_orders))
        .route("/orders/:id", get(get_order))
}

/// List orders in the requested view.
async fn list_orders(
    State(state): State<AppState>,
    Query(params): Query<OrdersParams>,
) -> Result<Response, AppError> {
    let view = params.view.unwrap_or_default();
    let strategy = view.strategy();
    let predicate = params.predicate()?;
    let default_limit = state.config.fetch.default_limit;
    let page = match view {
        View::DtoPage => Some(
            params
                .page(default_limit)
                .unwrap_or_else(|| Page::limit(default_limit)),
        ),
        _ => params.page(default_limit),
    };

    tracing::debug!(?view, %strategy, ?page, "listing orders");

    let response = match view {
        View::Raw => state
            .execute_read(move |planner| {
                let orders = planner.fetch_orders(strategy, &predicate, page)?;
                let scope = planner.executor().scope();
                assemble::order_graphs(&orders, planner.loader(), scope)
            })
            .await?
            .into_response(),
        _ => state
            .execute_read(move |planner| planner.order_dtos(strategy, &predicate, page))
            .await?
            .into_response(),
    };
    Ok(response)
}

/// One order with its lines.
async fn get_order(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<Response, AppError> {
    let fetched = state
        .execute_read(move |planner| planner.order_dto(id))
        .await?;
    Ok(fetched.into_response())
}
