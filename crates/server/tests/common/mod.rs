//! Common test utilities for in-process API testing with mocks.
//!
//! This module provides a test fixture that builds the router around a real
//! extraction service and scheduler, with the worker and library inspector
//! replaced by mocks.

use std::sync::Arc;
use std::time::Duration;

use axum::body::Body;
use axum::http::{Request, StatusCode};
use axum::Router;
use http_body_util::BodyExt;
use serde_json::Value;
use tower::ServiceExt;

use strmkit_core::testing::{MockInspector, MockWorker};
use strmkit_core::{
    Config, DrainTask, ExtractionService, QueueKind, TaskScheduler, TaskState,
};
use strmkit_server::state::AppState;

/// Re-export fixtures for test convenience
pub use strmkit_core::testing::fixtures;

/// Test fixture for API testing with mock dependencies.
///
/// # Example
///
/// ```rust,ignore
/// #[tokio::test]
/// async fn test_enqueue() {
///     let fixture = TestFixture::new();
///
///     let response = fixture.post("/api/v1/queues/media_info/items", json!({
///         "id": 1, "name": "Movie", "path": "/media/movie.strm"
///     })).await;
///
///     assert_eq!(response.status, 202);
/// }
/// ```
pub struct TestFixture {
    /// The Axum router for testing
    pub router: Router,
    /// The service behind the router
    pub service: Arc<ExtractionService>,
    /// The scheduler behind the router
    pub scheduler: TaskScheduler,
    /// Worker shared by both drain tasks
    pub worker: Arc<MockWorker>,
}

/// Response from a test request
#[derive(Debug)]
pub struct TestResponse {
    pub status: StatusCode,
    pub body: Value,
}

impl TestFixture {
    /// Create a new test fixture with default mocks.
    pub fn new() -> Self {
        Self::with_worker(MockWorker::new(), MockInspector::new())
    }

    /// Create a test fixture with a custom worker and inspector.
    pub fn with_worker(worker: MockWorker, inspector: MockInspector) -> Self {
        let mut config = Config::default();
        config.general.max_concurrent_count = 2;

        let service = Arc::new(
            ExtractionService::from_config(&config, Arc::new(inspector))
                .expect("Failed to create service"),
        );
        let scheduler = TaskScheduler::new();
        let worker = Arc::new(worker);

        for kind in QueueKind::ALL {
            let runner = service.drain_runner(kind, worker.clone());
            scheduler.register(Arc::new(DrainTask::new(runner)), None);
        }
        scheduler.start();

        let state = Arc::new(AppState::new(
            config,
            Arc::clone(&service),
            scheduler.clone(),
        ));
        let router = strmkit_server::api::create_router(state);

        Self {
            router,
            service,
            scheduler,
            worker,
        }
    }

    /// Wait until `key` has finished a run.
    pub async fn wait_idle(&self, key: &str) {
        for _ in 0..500 {
            if let Some(status) = self.scheduler.task_status(key) {
                if status.state == TaskState::Idle && status.last_result.is_some() {
                    return;
                }
            }
            tokio::time::sleep(Duration::from_millis(5)).await;
        }
        panic!("task {} never finished", key);
    }

    /// Send a GET request to the test server.
    pub async fn get(&self, path: &str) -> TestResponse {
        self.request("GET", path, None).await
    }

    /// Send a POST request with JSON body.
    pub async fn post(&self, path: &str, body: Value) -> TestResponse {
        self.request("POST", path, Some(body)).await
    }

    /// Send a POST request without a body.
    pub async fn post_empty(&self, path: &str) -> TestResponse {
        self.request("POST", path, None).await
    }

    /// Send a PUT request with JSON body.
    pub async fn put(&self, path: &str, body: Value) -> TestResponse {
        self.request("PUT", path, Some(body)).await
    }

    /// Send a GET request and return the raw body text.
    pub async fn get_text(&self, path: &str) -> (StatusCode, String) {
        let request = Request::builder()
            .method("GET")
            .uri(path)
            .body(Body::empty())
            .unwrap();

        let response = self
            .router
            .clone()
            .oneshot(request)
            .await
            .expect("Failed to send request");

        let status = response.status();
        let bytes = response
            .into_body()
            .collect()
            .await
            .expect("Failed to collect body")
            .to_bytes();

        (status, String::from_utf8_lossy(&bytes).into_owned())
    }

    /// Send a request to the test server.
    async fn request(&self, method: &str, path: &str, body: Option<Value>) -> TestResponse {
        let mut request_builder = Request::builder().method(method).uri(path);

        let body = if let Some(json_body) = body {
            request_builder = request_builder.header("Content-Type", "application/json");
            Body::from(serde_json::to_vec(&json_body).unwrap())
        } else {
            Body::empty()
        };

        let request = request_builder.body(body).unwrap();

        let response = self
            .router
            .clone()
            .oneshot(request)
            .await
            .expect("Failed to send request");

        let status = response.status();
        let body_bytes = response
            .into_body()
            .collect()
            .await
            .expect("Failed to collect body")
            .to_bytes();

        let body: Value = if body_bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&body_bytes).unwrap_or(Value::Null)
        };

        TestResponse { status, body }
    }
}
