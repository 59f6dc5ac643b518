//! Types for the admission gate.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Errors returned by the admission gate.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum GateError {
    /// The caller's cancellation signal fired before a permit was granted.
    #[error("admission cancelled")]
    Cancelled,

    /// The gate was closed and will never grant permits again.
    #[error("admission gate is closed")]
    Closed,

    /// Capacity must be at least one.
    #[error("invalid gate capacity: {0} (must be >= 1)")]
    InvalidCapacity(usize),
}

/// Snapshot of the gate's counters.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct GateStatus {
    /// Configured capacity.
    pub capacity: usize,
    /// Permits currently held by running jobs.
    pub held: usize,
    /// Permits that can be granted right now.
    pub available: usize,
    /// Permits still to be withheld after a shrink.
    pub pending_shrink: usize,
    /// Whether the gate has been closed.
    pub closed: bool,
}
