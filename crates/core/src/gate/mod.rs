//! Admission gate bounding how many extraction jobs run at once.
//!
//! The gate is a counting permit pool shared by every drain in the process.
//! Its capacity can be changed at runtime:
//! - Growing makes the extra permits available immediately
//! - Shrinking never revokes held permits; it withholds returned permits
//!   until usage has dropped below the new capacity
//!
//! # Example
//!
//! ```ignore
//! use strmkit_core::gate::AdmissionGate;
//! use tokio_util::sync::CancellationToken;
//!
//! let gate = AdmissionGate::new(2)?;
//! let cancel = CancellationToken::new();
//!
//! let permit = gate.acquire(&cancel).await?;
//! // ... run the job ...
//! drop(permit);
//!
//! gate.resize(4)?;
//! ```

mod admission;
mod types;

pub use admission::{AdmissionGate, AdmissionPermit};
pub use types::{GateError, GateStatus};
