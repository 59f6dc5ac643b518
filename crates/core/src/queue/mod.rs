//! FIFO item queues, one per workload class.
//!
//! Producers (event callbacks) append with [`ItemQueue::enqueue`], which never
//! waits on anything but a single push. A drain claims everything queued so far
//! with [`ItemQueue::drain_snapshot`]; items arriving afterwards stay for the
//! next drain. Duplicates are kept and processed independently.

mod item_queue;
mod types;

pub use item_queue::ItemQueue;
pub use types::{ItemKind, MediaItem, QueueKind, QueueStatus, UnknownQueue};
