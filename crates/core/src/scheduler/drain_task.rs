//! Scheduled task that drains one queue.

use std::sync::Arc;

use async_trait::async_trait;
use tokio_util::sync::CancellationToken;

use crate::drain::{DrainRunner, DrainState, ProgressSink};
use crate::queue::QueueKind;

use super::traits::{ScheduledTask, TaskError, TaskOutcome};

/// Task key of the media info drain.
pub const MEDIA_INFO_TASK_KEY: &str = "extract_media_info";
/// Task key of the intro fingerprint drain.
pub const INTRO_FINGERPRINT_TASK_KEY: &str = "extract_intro_fingerprint";

/// Returns the task key that drains `queue`.
pub fn drain_task_key(queue: QueueKind) -> &'static str {
    match queue {
        QueueKind::MediaInfo => MEDIA_INFO_TASK_KEY,
        QueueKind::IntroFingerprint => INTRO_FINGERPRINT_TASK_KEY,
    }
}

/// Wraps a [`DrainRunner`] so the scheduler can run it.
pub struct DrainTask {
    runner: DrainRunner,
}

impl DrainTask {
    pub fn new(runner: DrainRunner) -> Self {
        Self { runner }
    }
}

#[async_trait]
impl ScheduledTask for DrainTask {
    fn key(&self) -> &str {
        drain_task_key(self.runner.queue_kind())
    }

    fn name(&self) -> &str {
        match self.runner.queue_kind() {
            QueueKind::MediaInfo => "Extract MediaInfo",
            QueueKind::IntroFingerprint => "Extract Intro Fingerprint",
        }
    }

    fn description(&self) -> &str {
        match self.runner.queue_kind() {
            QueueKind::MediaInfo => "Extracts technical metadata for queued items",
            QueueKind::IntroFingerprint => "Extracts audio fingerprints for queued episodes",
        }
    }

    async fn execute(
        &self,
        cancel: &CancellationToken,
        progress: Arc<dyn ProgressSink>,
    ) -> Result<TaskOutcome, TaskError> {
        let summary = self.runner.execute(cancel, progress).await?;

        Ok(match summary.state {
            DrainState::Completed => TaskOutcome::completed(summary.to_string()),
            DrainState::CancelledComplete => TaskOutcome::cancelled(summary.to_string()),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::gate::AdmissionGate;
    use crate::queue::ItemQueue;
    use crate::testing::{fixtures, MockWorker};

    #[tokio::test]
    async fn test_drain_task_outcome() {
        let queue = Arc::new(ItemQueue::new(QueueKind::IntroFingerprint));
        for item in fixtures::episodes(3) {
            queue.enqueue(item);
        }
        let runner = DrainRunner::new(
            queue,
            AdmissionGate::new(2).unwrap(),
            Arc::new(MockWorker::new()),
        );
        let task = DrainTask::new(runner);

        assert_eq!(task.key(), INTRO_FINGERPRINT_TASK_KEY);

        let outcome = task
            .execute(&CancellationToken::new(), Arc::new(crate::drain::NoopProgress))
            .await
            .unwrap();

        assert!(!outcome.cancelled);
        assert_eq!(
            outcome.summary,
            "intro_fingerprint drain completed: 3/3 processed (3 succeeded, 0 failed, 0 cancelled)"
        );
    }

    #[tokio::test]
    async fn test_closed_gate_fails_task() {
        let queue = Arc::new(ItemQueue::new(QueueKind::MediaInfo));
        queue.enqueue(fixtures::movie(1));
        let gate = AdmissionGate::new(1).unwrap();
        gate.close();
        let task = DrainTask::new(DrainRunner::new(queue, gate, Arc::new(MockWorker::new())));

        let err = task
            .execute(&CancellationToken::new(), Arc::new(crate::drain::NoopProgress))
            .await
            .unwrap_err();

        assert_eq!(err.to_string(), "admission gate closed after admitting 0 of 1 items");
    }
}
