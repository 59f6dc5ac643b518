//! Bounded drain of an item queue.
//!
//! A drain run snapshots a queue, admits items one at a time through the
//! shared [`AdmissionGate`](crate::gate::AdmissionGate), runs each admitted
//! item on an [`ExtractionWorker`] and reports progress until every item in
//! the snapshot has an outcome.
//!
//! # Example
//!
//! ```ignore
//! use strmkit_core::drain::{DrainRunner, NoopProgress};
//!
//! let runner = DrainRunner::new(queue, gate, worker);
//! let summary = runner.execute(&cancel, Arc::new(NoopProgress)).await?;
//! println!("{}", summary);
//! ```

mod progress;
mod runner;
mod traits;
mod types;

pub use progress::{NoopProgress, ProgressSink};
pub use runner::DrainRunner;
pub use traits::{ExtractionWorker, WorkerError};
pub use types::{DrainError, DrainState, DrainSummary, ItemOutcome, ItemReport};
