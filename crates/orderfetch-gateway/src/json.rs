//! JSON request and response types for the HTTP gateway.

use orderfetch_core::{OrderSearch, OrderStatus, Page, Predicate, Strategy};
use serde::{Deserialize, Serialize};

use crate::error::AppError;

/// Response shape and strategy of the `/orders` endpoint.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum View {
    /// Raw entity graph, naive fetch.
    Raw,
    /// Order DTOs, naive fetch.
    Dto,
    /// Order DTOs, full fetch-join.
    DtoJoin,
    /// Order DTOs, to-one fetch-join with paging.
    DtoPage,
    /// Order DTOs, two-phase plan.
    #[default]
    DtoDirect,
    /// Order DTOs grouped from the flat projection.
    DtoFlat,
}

impl View {
    /// Strategy that backs the view.
    pub fn strategy(self) -> Strategy {
        match self {
            View::Raw | View::Dto => Strategy::Naive,
            View::DtoJoin => Strategy::FullJoin,
            View::DtoPage => Strategy::ToOneJoin,
            View::DtoDirect => Strategy::TwoPhase,
            View::DtoFlat => Strategy::FlatProjection,
        }
    }
}

/// Response shape and strategy of the `/simple-orders` endpoint.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum SimpleView {
    /// Naive fetch, member and delivery resolved per order.
    Dto,
    /// To-one fetch-join.
    #[default]
    DtoJoin,
}

impl SimpleView {
    /// Strategy that backs the view.
    pub fn strategy(self) -> Strategy {
        match self {
            SimpleView::Dto => Strategy::Naive,
            SimpleView::DtoJoin => Strategy::ToOneJoin,
        }
    }
}

/// Query string of the order listing endpoints.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OrdersParams {
    /// Requested view.
    pub view: Option<View>,
    /// Rows to skip.
    pub offset: Option<usize>,
    /// Rows to return.
    pub limit: Option<usize>,
    /// Order status filter. Blank means no constraint.
    pub status: Option<String>,
    /// Member name substring filter. Blank means no constraint.
    pub member_name: Option<String>,
}

impl OrdersParams {
    /// Build the search from the filter parameters.
    pub fn search(&self) -> Result<OrderSearch, AppError> {
        let status = match self.status.as_deref().map(str::trim) {
            None | Some("") => None,
            Some(raw) => Some(
                raw.parse::<OrderStatus>()
                    .map_err(|err| AppError::BadRequest(err.to_string()))?,
            ),
        };

        Ok(OrderSearch {
            status,
            member_name: self.member_name.clone(),
        })
    }

    /// Predicate for the filter parameters.
    pub fn predicate(&self) -> Result<Predicate, AppError> {
        Ok(Predicate::from(&self.search()?))
    }

    /// Page requested by the caller, filling a missing offset or limit
    /// from the defaults.
    pub fn page(&self, default_limit: usize) -> Option<Page> {
        Page::from_parts(self.offset, self.limit, default_limit)
    }
}

/// Query string of the `/simple-orders` endpoint.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SimpleOrdersParams {
    /// Requested view.
    pub view: Option<SimpleView>,
    /// Order status filter.
    pub status: Option<String>,
    /// Member name substring filter.
    pub member_name: Option<String>,
}

impl SimpleOrdersParams {
    /// Predicate for the filter parameters.
    pub fn predicate(&self) -> Result<Predicate, AppError> {
        OrdersParams {
            status: self.status.clone(),
            member_name: self.member_name.clone(),
            ..Default::default()
        }
        .predicate()
    }
}

/// Health check response.
#[derive(Debug, Serialize, Deserialize)]
pub struct HealthResponse {
    /// Health status.
    pub status: String,
    /// Gateway version.
    pub version: String,
    /// Whether the store answered a ping.
    pub store_connected: bool,
}
