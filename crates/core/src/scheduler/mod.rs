//! Background task scheduler.
//!
//! Runs registered tasks on demand, on a fixed interval, or when another task
//! requests them through a [`TaskTrigger`]. Each task key has at most one run
//! in progress; each run gets its own cancellation token.
//!
//! # Example
//!
//! ```ignore
//! use strmkit_core::scheduler::{DrainTask, TaskScheduler};
//!
//! let scheduler = TaskScheduler::new();
//! scheduler.register(Arc::new(DrainTask::new(runner)), Some(Duration::from_secs(3600)));
//! scheduler.start();
//! scheduler.run("extract_media_info")?;
//! ```

mod drain_task;
mod runner;
mod traits;
mod trigger;
mod types;

pub use drain_task::{drain_task_key, DrainTask, INTRO_FINGERPRINT_TASK_KEY, MEDIA_INFO_TASK_KEY};
pub use runner::TaskScheduler;
pub use traits::{ScheduledTask, TaskError, TaskOutcome};
pub use trigger::{TaskTrigger, TriggerRequest};
pub use types::{LastResult, SchedulerError, TaskState, TaskStatus};
