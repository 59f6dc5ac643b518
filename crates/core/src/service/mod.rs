//! The extraction service.
//!
//! Owns the process-wide [`AdmissionGate`](crate::gate::AdmissionGate), one
//! [`ItemQueue`](crate::queue::ItemQueue) per workload class and the event
//! routing rules, and applies runtime option changes to them.
//!
//! # Example
//!
//! ```ignore
//! use strmkit_core::service::{ExtractionService, OptionsUpdate};
//!
//! let service = Arc::new(ExtractionService::from_config(&config, inspector)?);
//! service.handle_event(&event);
//! service.apply_options(&OptionsUpdate::default().with_max_concurrent_count(4))?;
//! ```

mod extraction;
mod types;

pub use extraction::ExtractionService;
pub use types::{AppliedChanges, OptionsUpdate, ServiceError, ServiceStatus};
