//! In-memory FIFO queue.

use std::collections::VecDeque;

use parking_lot::Mutex;
use tracing::debug;

use crate::metrics::QUEUE_DEPTH;

use super::types::{MediaItem, QueueKind, QueueStatus};

/// FIFO of items awaiting one workload class.
#[derive(Debug)]
pub struct ItemQueue {
    kind: QueueKind,
    items: Mutex<VecDeque<MediaItem>>,
}

impl ItemQueue {
    /// Creates an empty queue.
    pub fn new(kind: QueueKind) -> Self {
        QUEUE_DEPTH.with_label_values(&[kind.as_str()]).set(0);
        Self {
            kind,
            items: Mutex::new(VecDeque::new()),
        }
    }

    /// Workload class of this queue.
    pub fn kind(&self) -> QueueKind {
        self.kind
    }

    /// Appends an item to the tail.
    pub fn enqueue(&self, item: MediaItem) {
        let item_id = item.id;
        let depth = {
            let mut items = self.items.lock();
            items.push_back(item);
            items.len()
        };

        QUEUE_DEPTH
            .with_label_values(&[self.kind.as_str()])
            .set(depth as i64);
        debug!(queue = %self.kind, item_id, depth, "Item enqueued");
    }

    /// Removes and returns everything currently queued, in insertion order.
    pub fn drain_snapshot(&self) -> Vec<MediaItem> {
        let items = std::mem::take(&mut *self.items.lock());
        QUEUE_DEPTH.with_label_values(&[self.kind.as_str()]).set(0);
        Vec::from(items)
    }

    /// Number of queued items.
    pub fn len(&self) -> usize {
        self.items.lock().len()
    }

    /// Whether the queue is empty.
    pub fn is_empty(&self) -> bool {
        self.items.lock().is_empty()
    }

    /// Returns the queue depth report.
    pub fn status(&self) -> QueueStatus {
        QueueStatus {
            queue: self.kind,
            depth: self.len(),
        }
    }
}
