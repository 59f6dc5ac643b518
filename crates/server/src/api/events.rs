//! Library event API handlers.

use axum::{extract::State, Json};
use serde::Serialize;
use std::sync::Arc;
use strmkit_core::{LibraryEvent, QueueKind};

use crate::state::AppState;

/// Queues the event was routed to
#[derive(Debug, Serialize)]
pub struct EventResponse {
    pub event: &'static str,
    pub item_id: i64,
    pub queued: Vec<QueueKind>,
}

/// Route a library event through ingestion
pub async fn post_event(
    State(state): State<Arc<AppState>>,
    Json(event): Json<LibraryEvent>,
) -> Json<EventResponse> {
    let queued = state.service().handle_event(&event);
    Json(EventResponse {
        event: event.label(),
        item_id: event.item().id,
        queued,
    })
}
