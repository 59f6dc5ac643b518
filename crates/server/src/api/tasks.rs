//! Scheduled task API handlers.

use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use serde::Serialize;
use std::sync::Arc;
use strmkit_core::{SchedulerError, TaskStatus};

use super::{error_response, ApiError};
use crate::state::AppState;

/// Simple message response
#[derive(Debug, Serialize)]
pub struct MessageResponse {
    pub message: String,
}

fn scheduler_error(e: SchedulerError) -> ApiError {
    let status = match e {
        SchedulerError::UnknownTask(_) => StatusCode::NOT_FOUND,
        SchedulerError::AlreadyRunning(_) | SchedulerError::NotRunning(_) => StatusCode::CONFLICT,
        SchedulerError::ShuttingDown => StatusCode::SERVICE_UNAVAILABLE,
    };
    error_response(status, e)
}

/// List every registered task
pub async fn list_tasks(State(state): State<Arc<AppState>>) -> Json<Vec<TaskStatus>> {
    Json(state.scheduler().status())
}

/// Start a task run
pub async fn run_task(
    State(state): State<Arc<AppState>>,
    Path(key): Path<String>,
) -> Result<(StatusCode, Json<MessageResponse>), ApiError> {
    state.scheduler().run(&key).map_err(scheduler_error)?;
    Ok((
        StatusCode::ACCEPTED,
        Json(MessageResponse {
            message: format!("Task {} started", key),
        }),
    ))
}

/// Request cancellation of a running task
pub async fn cancel_task(
    State(state): State<Arc<AppState>>,
    Path(key): Path<String>,
) -> Result<Json<MessageResponse>, ApiError> {
    state.scheduler().cancel(&key).map_err(scheduler_error)?;
    Ok(Json(MessageResponse {
        message: format!("Cancellation requested for task {}", key),
    }))
}
