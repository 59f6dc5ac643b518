//! Types for drain runs.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;
use uuid::Uuid;

use crate::queue::{MediaItem, QueueKind};

/// Terminal outcome of one item in a drain.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum ItemOutcome {
    Succeeded,
    Failed { reason: String },
    Cancelled,
}

impl ItemOutcome {
    /// Label used in logs and metrics.
    pub fn label(&self) -> &'static str {
        match self {
            ItemOutcome::Succeeded => "succeeded",
            ItemOutcome::Failed { .. } => "failed",
            ItemOutcome::Cancelled => "cancelled",
        }
    }
}

/// Outcome of one snapshotted item.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ItemReport {
    /// Position in the snapshot.
    pub index: usize,
    pub item_id: i64,
    pub item_name: String,
    #[serde(flatten)]
    pub outcome: ItemOutcome,
}

impl ItemReport {
    pub(crate) fn new(index: usize, item: &MediaItem, outcome: ItemOutcome) -> Self {
        Self {
            index,
            item_id: item.id,
            item_name: item.name.clone(),
            outcome,
        }
    }
}

/// Terminal state of a drain run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DrainState {
    /// Every item was accounted for without cancellation.
    Completed,
    /// At least one item was cancelled, either skipped at admission or stopped by its worker.
    CancelledComplete,
}

impl DrainState {
    /// Label used in logs and metrics.
    pub fn label(&self) -> &'static str {
        match self {
            DrainState::Completed => "completed",
            DrainState::CancelledComplete => "cancelled",
        }
    }
}

/// Result of a finished drain run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DrainSummary {
    pub run_id: Uuid,
    pub queue: QueueKind,
    pub state: DrainState,
    /// Items in the snapshot.
    pub total: usize,
    pub succeeded: usize,
    pub failed: usize,
    pub cancelled: usize,
    pub started_at: DateTime<Utc>,
    pub duration_ms: u64,
    /// Whether the follow-up task was requested.
    pub follow_up_triggered: bool,
    /// Per-item outcomes in snapshot order.
    pub items: Vec<ItemReport>,
}

impl DrainSummary {
    /// Items that reached a terminal outcome.
    pub fn processed(&self) -> usize {
        self.succeeded + self.failed + self.cancelled
    }
}

impl fmt::Display for DrainSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} drain {}: {}/{} processed ({} succeeded, {} failed, {} cancelled)",
            self.queue,
            self.state.label(),
            self.processed(),
            self.total,
            self.succeeded,
            self.failed,
            self.cancelled
        )
    }
}

/// Run-level fatal conditions.
#[derive(Debug, Error)]
pub enum DrainError {
    /// The admission gate was closed while the run was admitting items.
    #[error("admission gate closed after admitting {admitted} of {total} items")]
    GateClosed { admitted: usize, total: usize },
}
