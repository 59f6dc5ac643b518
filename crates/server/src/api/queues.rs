//! Raw queue API handlers.

use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use serde::Serialize;
use std::sync::Arc;
use strmkit_core::{MediaItem, QueueKind};
use tracing::debug;

use super::{error_response, ApiError};
use crate::state::AppState;

/// Response for an accepted item
#[derive(Debug, Serialize)]
pub struct EnqueueResponse {
    pub queue: QueueKind,
    pub item_id: i64,
    pub depth: usize,
}

/// Append an item to a queue, bypassing the ingestion rules
pub async fn enqueue_item(
    State(state): State<Arc<AppState>>,
    Path(queue): Path<String>,
    Json(item): Json<MediaItem>,
) -> Result<(StatusCode, Json<EnqueueResponse>), ApiError> {
    let kind: QueueKind = queue
        .parse()
        .map_err(|e| error_response(StatusCode::NOT_FOUND, e))?;

    let item_id = item.id;
    state.service().enqueue(kind, item);
    let depth = state.service().queue(kind).len();
    debug!(queue = %kind, item_id, depth, "Item enqueued via API");

    Ok((
        StatusCode::ACCEPTED,
        Json(EnqueueResponse {
            queue: kind,
            item_id,
            depth,
        }),
    ))
}
