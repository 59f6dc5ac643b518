use axum::{
    middleware,
    routing::{get, post, put},
    Router,
};
use std::sync::Arc;
use tower_http::trace::TraceLayer;

use super::{events, handlers, middleware::metrics_middleware, options, queues, tasks};
use crate::state::AppState;

pub fn create_router(state: Arc<AppState>) -> Router {
    // API routes
    let api_routes = Router::new()
        // Health, config and status
        .route("/health", get(handlers::health))
        .route("/config", get(handlers::get_config))
        .route("/status", get(handlers::get_status))
        // Queues and ingestion
        .route("/queues/{queue}/items", post(queues::enqueue_item))
        .route("/events", post(events::post_event))
        .route("/options", put(options::put_options))
        // Tasks
        .route("/tasks", get(tasks::list_tasks))
        .route("/tasks/{key}/run", post(tasks::run_task))
        .route("/tasks/{key}/cancel", post(tasks::cancel_task));

    Router::new()
        .nest("/api/v1", api_routes)
        .route("/metrics", get(handlers::get_metrics))
        .with_state(state)
        .layer(middleware::from_fn(metrics_middleware))
        .layer(TraceLayer::new_for_http())
}
