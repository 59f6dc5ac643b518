//! Extraction service: owns the gate, the queues and event routing.

use std::sync::Arc;

use tracing::{debug, info};

use crate::config::{validate_concurrent_count, Config};
use crate::drain::{DrainRunner, ExtractionWorker};
use crate::gate::AdmissionGate;
use crate::ingest::{EventIngestion, IngestRules, LibraryEvent, LibraryInspector};
use crate::queue::{ItemQueue, MediaItem, QueueKind};

use super::types::{AppliedChanges, OptionsUpdate, ServiceError, ServiceStatus};

/// Shared state of the extraction engine.
///
/// One admission gate bounds jobs from every queue. Constructed once at
/// startup and shared through `Arc`.
pub struct ExtractionService {
    gate: AdmissionGate,
    media_info: Arc<ItemQueue>,
    intro_fingerprint: Arc<ItemQueue>,
    ingestion: EventIngestion,
}

impl ExtractionService {
    /// Creates a service with the given concurrency limit and rules.
    pub fn new(
        max_concurrent_count: usize,
        rules: IngestRules,
        inspector: Arc<dyn LibraryInspector>,
    ) -> Result<Self, ServiceError> {
        validate_concurrent_count(max_concurrent_count)
            .map_err(|e| ServiceError::InvalidOptions(e.to_string()))?;

        let gate = AdmissionGate::new(max_concurrent_count)?;
        let media_info = Arc::new(ItemQueue::new(QueueKind::MediaInfo));
        let intro_fingerprint = Arc::new(ItemQueue::new(QueueKind::IntroFingerprint));
        let ingestion = EventIngestion::new(
            Arc::clone(&media_info),
            Arc::clone(&intro_fingerprint),
            inspector,
            rules,
        );

        info!(
            max_concurrent_count,
            catchup_mode = rules.catchup_mode,
            intro_skip = rules.intro_skip_enabled,
            "Extraction service created"
        );

        Ok(Self {
            gate,
            media_info,
            intro_fingerprint,
            ingestion,
        })
    }

    /// Creates a service from loaded configuration.
    pub fn from_config(
        config: &Config,
        inspector: Arc<dyn LibraryInspector>,
    ) -> Result<Self, ServiceError> {
        Self::new(
            config.general.max_concurrent_count,
            IngestRules::from(config),
            inspector,
        )
    }

    /// Appends `item` to the `kind` queue, bypassing eligibility rules.
    pub fn enqueue(&self, kind: QueueKind, item: MediaItem) {
        self.queue(kind).enqueue(item);
    }

    /// Routes a library event. Returns the queues the item went to.
    pub fn handle_event(&self, event: &LibraryEvent) -> Vec<QueueKind> {
        self.ingestion.handle(event)
    }

    /// The queue for `kind`.
    pub fn queue(&self, kind: QueueKind) -> &Arc<ItemQueue> {
        match kind {
            QueueKind::MediaInfo => &self.media_info,
            QueueKind::IntroFingerprint => &self.intro_fingerprint,
        }
    }

    /// The shared admission gate.
    pub fn gate(&self) -> &AdmissionGate {
        &self.gate
    }

    /// Current ingestion rules.
    pub fn rules(&self) -> IngestRules {
        self.ingestion.rules()
    }

    /// Builds a drain runner for `kind` sharing this service's gate.
    pub fn drain_runner(&self, kind: QueueKind, worker: Arc<dyn ExtractionWorker>) -> DrainRunner {
        DrainRunner::new(Arc::clone(self.queue(kind)), self.gate.clone(), worker)
    }

    /// Applies runtime option changes.
    ///
    /// All values are validated before anything changes. A new concurrency
    /// limit takes effect for future admissions; running jobs keep their permits.
    pub fn apply_options(&self, update: &OptionsUpdate) -> Result<AppliedChanges, ServiceError> {
        if let Some(count) = update.max_concurrent_count {
            validate_concurrent_count(count)
                .map_err(|e| ServiceError::InvalidOptions(e.to_string()))?;
        }

        let previous_capacity = self.gate.capacity();
        let capacity = match update.max_concurrent_count {
            Some(count) if count != previous_capacity => {
                self.gate.resize(count)?;
                count
            }
            _ => previous_capacity,
        };

        let rules = update.merge_rules(self.ingestion.rules());
        self.ingestion.set_rules(rules);

        debug!(previous_capacity, capacity, ?rules, "Options applied");

        Ok(AppliedChanges {
            previous_capacity,
            capacity,
            rules,
        })
    }

    /// Gate, queue and rule snapshot.
    pub fn status(&self) -> ServiceStatus {
        ServiceStatus {
            gate: self.gate.status(),
            queues: QueueKind::ALL
                .iter()
                .map(|kind| self.queue(*kind).status())
                .collect(),
            rules: self.rules(),
        }
    }

    /// Closes the gate; in-flight jobs finish, waiting admissions fail.
    pub fn shutdown(&self) {
        info!("Shutting down extraction service");
        self.gate.close();
    }
}
