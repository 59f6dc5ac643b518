//! Non-blocking task trigger handle.

use tokio::sync::mpsc;
use tracing::warn;

/// A request to start a scheduled task.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TriggerRequest {
    /// Key of the task to start.
    pub task_key: String,
    /// Who asked for it (for logs).
    pub requested_by: String,
}

/// Cloneable handle that asks the scheduler to start a task.
///
/// Sending never blocks; the scheduler's dispatch loop picks requests up.
#[derive(Debug, Clone)]
pub struct TaskTrigger {
    tx: mpsc::UnboundedSender<TriggerRequest>,
}

impl TaskTrigger {
    /// Creates a trigger and the receiving end consumed by the scheduler.
    pub fn channel() -> (Self, mpsc::UnboundedReceiver<TriggerRequest>) {
        let (tx, rx) = mpsc::unbounded_channel();
        (Self { tx }, rx)
    }

    /// Requests `task_key`. Returns false if the scheduler is gone.
    pub fn fire(&self, task_key: &str, requested_by: &str) -> bool {
        let request = TriggerRequest {
            task_key: task_key.to_string(),
            requested_by: requested_by.to_string(),
        };

        match self.tx.send(request) {
            Ok(()) => true,
            Err(_) => {
                warn!(task = task_key, "Task trigger dropped, scheduler not running");
                false
            }
        }
    }
}
