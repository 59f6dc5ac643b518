//! Runtime options API handlers.

use axum::{extract::State, http::StatusCode, Json};
use std::sync::Arc;
use strmkit_core::{AppliedChanges, OptionsUpdate, ServiceError};
use tracing::info;

use super::{error_response, ApiError};
use crate::state::AppState;

/// Apply new concurrency and ingestion options
pub async fn put_options(
    State(state): State<Arc<AppState>>,
    Json(update): Json<OptionsUpdate>,
) -> Result<Json<AppliedChanges>, ApiError> {
    match state.service().apply_options(&update) {
        Ok(changes) => {
            if changes.capacity_changed() {
                info!(
                    "Concurrency limit changed from {} to {}",
                    changes.previous_capacity, changes.capacity
                );
            }
            Ok(Json(changes))
        }
        Err(e @ ServiceError::InvalidOptions(_)) => {
            Err(error_response(StatusCode::BAD_REQUEST, e))
        }
        Err(e @ ServiceError::Gate(_)) => {
            Err(error_response(StatusCode::SERVICE_UNAVAILABLE, e))
        }
    }
}
