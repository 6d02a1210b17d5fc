//! HTTP surface of the balancer.
//!
//! Provides axum route handlers for the two balancing endpoints the roster form calls.
//!
//! # API Routes
//!
//! | Method | Path | Description |
//! |---|---|---|
//! | POST | `/balance/csv` | Multipart upload (`file` field), parameters in the query string |
//! | POST | `/balance/json` | JSON body `{ players, num_teams, time_limit, num_attempts }` |
//! | GET | `/health` | Liveness probe |
//!
//! Both balancing routes answer with a [`BalanceResponse`](crate::aggregator::BalanceResponse).
//! Failures answer with `{ "error": <kind>, "message": <text> }`: `400` for validation errors and
//! invalid parameters, `422` for rosters too small for the requested teams, `500` otherwise.

pub mod handlers;

use std::sync::Arc;

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Json, Router};
use serde::Serialize;
use tracing::{error, warn};

use crate::balancer::Balancer;
use crate::error::BalanceError;

/// Shared state for API handlers.
#[derive(Clone)]
pub struct ApiState {
    /// The balancer serving every request.
    pub balancer: Arc<Balancer>,
}

/// Build the API router.
pub fn build_router(balancer: Balancer) -> Router {
    let state = ApiState {
        balancer: Arc::new(balancer),
    };

    Router::new()
        .route("/balance/csv", post(handlers::balance_csv))
        .route("/balance/json", post(handlers::balance_json))
        .route("/health", get(handlers::health))
        .with_state(state)
}

/// Body of every error response.
#[derive(Debug, Serialize)]
struct ErrorBody {
    error: &'static str,
    message: String,
}

impl BalanceError {
    /// HTTP status reported for this error.
    pub fn status_code(&self) -> StatusCode {
        match self {
            BalanceError::Validation(_) | BalanceError::InvalidParameter(_) => {
                StatusCode::BAD_REQUEST
            }
            BalanceError::InsufficientPlayers { .. } => StatusCode::UNPROCESSABLE_ENTITY,
            BalanceError::SearchExhausted(_) | BalanceError::Internal(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }
}

impl IntoResponse for BalanceError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        if self.is_client_error() {
            warn!(%status, error = %self, "rejected balancing request");
        } else {
            error!(%status, error = %self, "balancing request failed");
        }

        let body = ErrorBody {
            error: self.kind(),
            message: self.to_string(),
        };
        (status, Json(body)).into_response()
    }
}
