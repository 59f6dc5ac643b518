//! Trait definitions for scheduled tasks.

use std::sync::Arc;

use async_trait::async_trait;
use thiserror::Error;
use tokio_util::sync::CancellationToken;

use crate::drain::ProgressSink;

/// Successful end of a task run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TaskOutcome {
    /// One-line description of what the run did.
    pub summary: String,
    /// The run stopped early because it was cancelled.
    pub cancelled: bool,
}

impl TaskOutcome {
    pub fn completed(summary: impl Into<String>) -> Self {
        Self {
            summary: summary.into(),
            cancelled: false,
        }
    }

    pub fn cancelled(summary: impl Into<String>) -> Self {
        Self {
            summary: summary.into(),
            cancelled: true,
        }
    }
}

/// Run-level task failure.
#[derive(Debug, Error)]
#[error("{0}")]
pub struct TaskError(pub String);

impl From<crate::drain::DrainError> for TaskError {
    fn from(err: crate::drain::DrainError) -> Self {
        Self(err.to_string())
    }
}

/// A unit of background work the scheduler can run.
#[async_trait]
pub trait ScheduledTask: Send + Sync {
    /// Stable key used to trigger the task.
    fn key(&self) -> &str;

    /// Human-readable name.
    fn name(&self) -> &str;

    /// Short description.
    fn description(&self) -> &str;

    /// Runs the task once.
    async fn execute(
        &self,
        cancel: &CancellationToken,
        progress: Arc<dyn ProgressSink>,
    ) -> Result<TaskOutcome, TaskError>;
}
