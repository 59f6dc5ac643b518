//! Trait definitions for the drain module.

use async_trait::async_trait;
use thiserror::Error;
use tokio_util::sync::CancellationToken;

use crate::queue::MediaItem;

/// Errors an extraction worker can report for a single item.
#[derive(Debug, Error)]
pub enum WorkerError {
    /// The worker observed cancellation and stopped early.
    #[error("extraction cancelled")]
    Cancelled,

    /// Extraction failed for this item.
    #[error("extraction failed: {reason}")]
    Failed { reason: String },
}

impl WorkerError {
    /// Creates a failure with the given reason.
    pub fn failed(reason: impl Into<String>) -> Self {
        Self::Failed {
            reason: reason.into(),
        }
    }
}

/// The per-item unit of work run by a drain.
///
/// Implementations may check `cancel` and return [`WorkerError::Cancelled`]
/// to stop early; the drain never aborts a running worker on cancellation.
#[async_trait]
pub trait ExtractionWorker: Send + Sync {
    /// Returns the name of this worker implementation.
    fn name(&self) -> &str;

    /// Processes one item.
    async fn extract(&self, item: &MediaItem, cancel: &CancellationToken)
        -> Result<(), WorkerError>;
}
