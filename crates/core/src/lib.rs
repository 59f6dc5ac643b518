pub mod config;
pub mod drain;
pub mod extractor;
pub mod gate;
pub mod ingest;
pub mod metrics;
pub mod queue;
pub mod scheduler;
pub mod service;
pub mod testing;

pub use config::{
    load_config, load_config_from_str, validate_config, Config, ConfigError, SanitizedConfig,
};
pub use drain::{
    DrainError, DrainRunner, DrainState, DrainSummary, ExtractionWorker, ItemOutcome, ItemReport,
    NoopProgress, ProgressSink, WorkerError,
};
pub use extractor::{ExtractMode, ExtractorError, FfmpegExtractor, MediaInfo, SidecarInspector};
pub use gate::{AdmissionGate, AdmissionPermit, GateError, GateStatus};
pub use ingest::{EventIngestion, IngestRules, LibraryEvent, LibraryInspector};
pub use queue::{ItemKind, ItemQueue, MediaItem, QueueKind, QueueStatus, UnknownQueue};
pub use scheduler::{
    DrainTask, LastResult, ScheduledTask, SchedulerError, TaskError, TaskOutcome, TaskScheduler,
    TaskState, TaskStatus, TaskTrigger,
};
pub use service::{AppliedChanges, ExtractionService, OptionsUpdate, ServiceError, ServiceStatus};
