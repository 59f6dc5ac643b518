//! Library event ingestion.
//!
//! Turns change notifications into queue entries according to the current
//! [`IngestRules`] and the host's [`LibraryInspector`] answers.

mod router;
mod traits;
mod types;

pub use router::EventIngestion;
pub use traits::LibraryInspector;
pub use types::{IngestRules, LibraryEvent};
