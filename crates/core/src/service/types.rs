//! Types for the extraction service.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::gate::{GateError, GateStatus};
use crate::ingest::IngestRules;
use crate::queue::QueueStatus;

/// Errors returned by service operations.
#[derive(Debug, Error)]
pub enum ServiceError {
    /// Rejected option values; nothing was changed.
    #[error("invalid options: {0}")]
    InvalidOptions(String),

    /// Admission gate error.
    #[error("admission gate error: {0}")]
    Gate(#[from] GateError),
}

/// Runtime option changes. Absent fields keep their current value.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct OptionsUpdate {
    #[serde(default)]
    pub max_concurrent_count: Option<usize>,
    #[serde(default)]
    pub catchup_mode: Option<bool>,
    #[serde(default)]
    pub exclusive_extract: Option<bool>,
    #[serde(default)]
    pub intro_skip_enabled: Option<bool>,
    #[serde(default)]
    pub include_extra: Option<bool>,
}

impl OptionsUpdate {
    pub fn with_max_concurrent_count(mut self, count: usize) -> Self {
        self.max_concurrent_count = Some(count);
        self
    }

    pub fn with_catchup_mode(mut self, enabled: bool) -> Self {
        self.catchup_mode = Some(enabled);
        self
    }

    pub fn with_intro_skip(mut self, enabled: bool) -> Self {
        self.intro_skip_enabled = Some(enabled);
        self
    }

    /// Applies the rule fields to `rules`.
    pub(crate) fn merge_rules(&self, rules: IngestRules) -> IngestRules {
        IngestRules {
            catchup_mode: self.catchup_mode.unwrap_or(rules.catchup_mode),
            exclusive_extract: self.exclusive_extract.unwrap_or(rules.exclusive_extract),
            intro_skip_enabled: self.intro_skip_enabled.unwrap_or(rules.intro_skip_enabled),
            include_extra: self.include_extra.unwrap_or(rules.include_extra),
        }
    }
}

/// What `apply_options` changed.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppliedChanges {
    pub previous_capacity: usize,
    pub capacity: usize,
    pub rules: IngestRules,
}

impl AppliedChanges {
    pub fn capacity_changed(&self) -> bool {
        self.previous_capacity != self.capacity
    }
}

/// Service-wide status snapshot.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServiceStatus {
    pub gate: GateStatus,
    pub queues: Vec<QueueStatus>,
    pub rules: IngestRules,
}
