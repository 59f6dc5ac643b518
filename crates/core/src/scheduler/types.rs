//! Types for the task scheduler.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Errors returned by scheduler operations.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SchedulerError {
    /// No task is registered under this key.
    #[error("unknown task: {0}")]
    UnknownTask(String),

    /// The task already has a run in progress.
    #[error("task already running: {0}")]
    AlreadyRunning(String),

    /// Cancel was requested for a task that is not running.
    #[error("task not running: {0}")]
    NotRunning(String),

    /// The scheduler is shutting down.
    #[error("scheduler is shutting down")]
    ShuttingDown,
}

/// Whether a task currently has a run in progress.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TaskState {
    Idle,
    Running,
    /// Cancel was requested; the run is finishing in-flight work.
    Cancelling,
}

/// Result of the most recent finished run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "result", rename_all = "snake_case")]
pub enum LastResult {
    Succeeded { summary: String },
    Cancelled { summary: String },
    Failed { error: String },
}

/// Status snapshot of one registered task.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TaskStatus {
    pub key: String,
    pub name: String,
    pub description: String,
    pub state: TaskState,
    /// Last reported progress percentage.
    pub progress: f64,
    /// Automatic run interval, if any.
    pub interval_secs: Option<u64>,
    pub last_started_at: Option<DateTime<Utc>>,
    pub last_finished_at: Option<DateTime<Utc>>,
    pub last_result: Option<LastResult>,
}
