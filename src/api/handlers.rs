//! Route handlers.
//!
//! Both balancing handlers decode their input into raw rows, build a validated request with the
//! configured defaults, then run the search on the blocking pool.

use std::sync::{
    atomic::{AtomicBool, Ordering},
    Arc,
};

use axum::extract::multipart::MultipartRejection;
use axum::extract::rejection::{JsonRejection, QueryRejection};
use axum::extract::{Multipart, Query, State};
use axum::Json;
use serde::Deserialize;
use tracing::{info, instrument};

use crate::aggregator::BalanceResponse;
use crate::error::{BalanceError, BalanceResult};
use crate::normalizer::{BalanceRequestBuilder, RawPlayer};
use crate::roster::read_csv_roster;

use super::ApiState;

/// Name of the multipart field carrying the CSV roster.
const FILE_FIELD: &str = "file";

/// Request parameters, shared by the query string of `/balance/csv` and the body of
/// `/balance/json`. Anything left out falls back to the configured defaults.
#[derive(Debug, Default, Deserialize)]
pub struct BalanceParams {
    /// Number of teams.
    pub num_teams: Option<i64>,
    /// Search budget in seconds.
    pub time_limit: Option<f64>,
    /// Attempt ceiling.
    pub num_attempts: Option<i64>,
    /// Optional fixed seed.
    pub seed: Option<u64>,
}

impl BalanceParams {
    fn apply(&self, mut builder: BalanceRequestBuilder) -> BalanceResult<BalanceRequestBuilder> {
        if let Some(num_teams) = self.num_teams {
            builder = builder.with_num_teams(non_negative("num_teams", num_teams)?);
        }
        if let Some(secs) = self.time_limit {
            builder = builder.with_time_limit_secs(secs);
        }
        if let Some(num_attempts) = self.num_attempts {
            builder = builder.with_num_attempts(non_negative("num_attempts", num_attempts)?);
        }
        if let Some(seed) = self.seed {
            builder = builder.with_seed(seed);
        }
        Ok(builder)
    }
}

fn non_negative(name: &str, value: i64) -> BalanceResult<usize> {
    usize::try_from(value).map_err(|_| {
        BalanceError::InvalidParameter(format!("{name} must not be negative, got {value}"))
    })
}

/// Body of `POST /balance/json`.
#[derive(Debug, Deserialize)]
pub struct JsonBalanceRequest {
    /// Raw roster.
    #[serde(default)]
    pub players: Vec<RawPlayer>,
    /// Number of teams.
    pub num_teams: Option<i64>,
    /// Search budget in seconds.
    pub time_limit: Option<f64>,
    /// Attempt ceiling.
    pub num_attempts: Option<i64>,
    /// Optional fixed seed.
    pub seed: Option<u64>,
}

/// Sets the flag when dropped, i.e. when axum drops the handler future of a disconnected client.
struct CancelOnDrop(Arc<AtomicBool>);

impl Drop for CancelOnDrop {
    fn drop(&mut self) {
        self.0.store(true, Ordering::Relaxed);
    }
}

/// POST /balance/csv
#[instrument(skip_all)]
pub async fn balance_csv(
    State(state): State<ApiState>,
    params: Result<Query<BalanceParams>, QueryRejection>,
    multipart: Result<Multipart, MultipartRejection>,
) -> Result<Json<BalanceResponse>, BalanceError> {
    let Query(params) =
        params.map_err(|e| BalanceError::InvalidParameter(format!("bad query string: {e}")))?;
    let mut multipart = multipart
        .map_err(|e| BalanceError::Validation(format!("expected a multipart body: {e}")))?;

    let mut file = None;
    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| BalanceError::Validation(format!("malformed multipart body: {e}")))?
    {
        if field.name() == Some(FILE_FIELD) {
            let bytes = field
                .bytes()
                .await
                .map_err(|e| BalanceError::Validation(format!("could not read upload: {e}")))?;
            file = Some(bytes);
            break;
        }
    }
    let file = file.ok_or_else(|| {
        BalanceError::Validation(format!("missing multipart field '{FILE_FIELD}'"))
    })?;

    let players = read_csv_roster(&file[..])?;
    run_balance(state, players, params).await.map(Json)
}

/// POST /balance/json
#[instrument(skip_all)]
pub async fn balance_json(
    State(state): State<ApiState>,
    payload: Result<Json<JsonBalanceRequest>, JsonRejection>,
) -> Result<Json<BalanceResponse>, BalanceError> {
    let Json(payload) =
        payload.map_err(|e| BalanceError::Validation(format!("invalid JSON body: {e}")))?;
    let params = BalanceParams {
        num_teams: payload.num_teams,
        time_limit: payload.time_limit,
        num_attempts: payload.num_attempts,
        seed: payload.seed,
    };
    run_balance(state, payload.players, params).await.map(Json)
}

/// GET /health
pub async fn health() -> Json<serde_json::Value> {
    Json(serde_json::json!({ "status": "ok" }))
}

async fn run_balance(
    state: ApiState,
    players: Vec<RawPlayer>,
    params: BalanceParams,
) -> BalanceResult<BalanceResponse> {
    let request = params.apply(state.balancer.request_builder(players))?.build()?;
    info!(
        players = request.players().len(),
        num_teams = request.num_teams(),
        num_attempts = request.num_attempts(),
        time_limit = ?request.time_limit(),
        "balancing request"
    );

    let cancel = Arc::new(AtomicBool::new(false));
    let _guard = CancelOnDrop(cancel.clone());
    let balancer = state.balancer.clone();
    tokio::task::spawn_blocking(move || balancer.balance_with_cancel(request, &cancel))
        .await
        .map_err(|e| BalanceError::Internal(format!("balancing task failed: {e}")))?
}
