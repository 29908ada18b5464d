use std::sync::{Arc, Mutex, MutexGuard};

use axum::{
    extract::{Path, Query, State},
    http::header,
    response::IntoResponse,
    routing::get,
    Json, Router,
};
use serde::{Deserialize, Serialize};

use pixelplace_shared::{
    constants::FEED_LIMIT,
    wire::{FeedResponse, StatsResponse, UserStatsResponse},
    shard_address, Pubkey, ShardKey,
};

use crate::{
    api::error::{ApiError, ApiResult},
    index::PersistentIndex,
};

/// Shared state of the read api handlers
#[derive(Clone)]
pub struct ApiState {
    index: Arc<Mutex<PersistentIndex>>,
    feed_limit: usize,
    program_id: Pubkey,
}

impl ApiState {
    pub fn new(index: PersistentIndex, feed_limit: usize, program_id: Pubkey) -> Self {
        Self {
            index: Arc::new(Mutex::new(index)),
            feed_limit: feed_limit.min(FEED_LIMIT),
            program_id,
        }
    }

    fn index(&self) -> ApiResult<MutexGuard<'_, PersistentIndex>> {
        self.index
            .lock()
            .map_err(|_| ApiError::internal("index handle poisoned"))
    }
}

#[derive(Debug, Serialize)]
pub struct ShardAccountResponse {
    pub address: Pubkey,
    pub bump: u8,
}

#[derive(Debug, Deserialize)]
pub struct UserQuery {
    address: Option<String>,
}

/// Builds the read api router.
pub fn router(state: ApiState) -> Router {
    Router::new()
        .route("/feed", get(feed))
        .route("/stats", get(stats))
        .route("/user", get(user))
        .route("/shard/:shard_x/:shard_y", get(shard_canvas))
        .route("/shard/:shard_x/:shard_y/address", get(shard_account))
        .with_state(state)
}

async fn feed(State(state): State<ApiState>) -> ApiResult<Json<FeedResponse>> {
    let feed = state.index()?.feed(state.feed_limit)?;
    Ok(Json(feed))
}

async fn stats(State(state): State<ApiState>) -> ApiResult<Json<StatsResponse>> {
    let stats = state.index()?.global_stats()?;
    Ok(Json(stats))
}

async fn user(
    State(state): State<ApiState>,
    Query(query): Query<UserQuery>,
) -> ApiResult<Json<UserStatsResponse>> {
    let address = match query.address.as_deref().map(str::trim) {
        Some(address) if !address.is_empty() => address,
        _ => return Err(ApiError::bad_request("address is required")),
    };
    let actor: Pubkey = address
        .parse()
        .map_err(|err| ApiError::bad_request(format!("invalid address: {}", err)))?;
    let stats = state.index()?.user_stats(&actor)?;
    Ok(Json(stats))
}

/// Latest values of one shard as its raw 8100-byte blob
async fn shard_canvas(
    State(state): State<ApiState>,
    Path((shard_x, shard_y)): Path<(u32, u32)>,
) -> ApiResult<impl IntoResponse> {
    let key = ShardKey::new(shard_x, shard_y)
        .map_err(|err| ApiError::bad_request(err.to_string()))?;
    let canvas = state
        .index()?
        .shard_canvas(&key)?
        .ok_or_else(|| ApiError::not_found(format!("shard {} has no pixels", key)))?;
    Ok((
        [(header::CONTENT_TYPE, "application/octet-stream")],
        canvas.into_bytes(),
    ))
}

/// Ledger account that holds the shard's state
async fn shard_account(
    State(state): State<ApiState>,
    Path((shard_x, shard_y)): Path<(u32, u32)>,
) -> ApiResult<Json<ShardAccountResponse>> {
    let key = ShardKey::new(shard_x, shard_y)
        .map_err(|err| ApiError::bad_request(err.to_string()))?;
    let account = shard_address(&key, &state.program_id)
        .map_err(|err| ApiError::internal(err.to_string()))?;
    Ok(Json(ShardAccountResponse {
        address: account.address,
        bump: account.bump,
    }))
}
