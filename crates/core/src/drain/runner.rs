//! Drain runner implementation.

use std::panic::AssertUnwindSafe;
use std::sync::Arc;
use std::time::Instant;

use chrono::Utc;
use futures::FutureExt;
use tokio::task::JoinSet;
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, warn};
use uuid::Uuid;

use crate::gate::{AdmissionGate, AdmissionPermit, GateError};
use crate::metrics::{DRAIN_DURATION, DRAIN_RUNS, ITEMS_PROCESSED};
use crate::queue::{ItemQueue, MediaItem, QueueKind};
use crate::scheduler::TaskTrigger;

use super::progress::{ProgressSink, ProgressTracker};
use super::traits::{ExtractionWorker, WorkerError};
use super::types::{DrainError, DrainState, DrainSummary, ItemOutcome, ItemReport};

/// Follow-up task requested after a completed drain.
#[derive(Clone)]
struct FollowUp {
    trigger: TaskTrigger,
    task_key: String,
}

/// Holds an item's permit and accounts the item exactly once.
///
/// `complete` is the normal path; `Drop` covers panics and aborted jobs.
struct JobGuard {
    permit: Option<AdmissionPermit>,
    tracker: Arc<ProgressTracker>,
    accounted: bool,
}

impl JobGuard {
    fn new(permit: AdmissionPermit, tracker: Arc<ProgressTracker>) -> Self {
        Self {
            permit: Some(permit),
            tracker,
            accounted: false,
        }
    }

    /// Releases the permit and advances progress. Returns the completed count.
    fn complete(mut self) -> usize {
        self.accounted = true;
        drop(self.permit.take());
        self.tracker.advance(1)
    }
}

impl Drop for JobGuard {
    fn drop(&mut self) {
        if !self.accounted {
            drop(self.permit.take());
            self.tracker.advance(1);
        }
    }
}

/// Empties one queue under the shared admission gate.
///
/// Each call to [`execute`](Self::execute) is one drain run: it claims the
/// queue's current contents, admits items in order as permits become free,
/// runs admitted items concurrently and reports progress until every item has
/// an outcome.
pub struct DrainRunner {
    queue: Arc<ItemQueue>,
    gate: AdmissionGate,
    worker: Arc<dyn ExtractionWorker>,
    follow_up: Option<FollowUp>,
}

impl DrainRunner {
    /// Creates a runner for `queue`.
    pub fn new(queue: Arc<ItemQueue>, gate: AdmissionGate, worker: Arc<dyn ExtractionWorker>) -> Self {
        Self {
            queue,
            gate,
            worker,
            follow_up: None,
        }
    }

    /// Requests `task_key` through `trigger` after every completed, non-empty run.
    pub fn with_follow_up(mut self, trigger: TaskTrigger, task_key: impl Into<String>) -> Self {
        self.follow_up = Some(FollowUp {
            trigger,
            task_key: task_key.into(),
        });
        self
    }

    /// Workload class drained by this runner.
    pub fn queue_kind(&self) -> QueueKind {
        self.queue.kind()
    }

    /// Runs one drain.
    ///
    /// Cancellation stops new admissions only; admitted items finish. The run
    /// returns [`DrainState::CancelledComplete`] when any item ended up
    /// cancelled. The only error is a closed gate.
    pub async fn execute(
        &self,
        cancel: &CancellationToken,
        progress: Arc<dyn ProgressSink>,
    ) -> Result<DrainSummary, DrainError> {
        let run_id = Uuid::new_v4();
        let queue = self.queue.kind();
        let started_at = Utc::now();
        let start = Instant::now();

        info!(
            %queue,
            %run_id,
            worker = self.worker.name(),
            max_concurrent = self.gate.capacity(),
            "Drain started"
        );

        let items = self.queue.drain_snapshot();
        let total = items.len();
        info!(%queue, %run_id, total, "Number of items: {}", total);

        if total == 0 {
            progress.report(100.0);
            DRAIN_RUNS
                .with_label_values(&[queue.as_str(), DrainState::Completed.label()])
                .inc();
            info!(%queue, %run_id, "Drain complete, nothing to do");
            return Ok(DrainSummary {
                run_id,
                queue,
                state: DrainState::Completed,
                total: 0,
                succeeded: 0,
                failed: 0,
                cancelled: 0,
                started_at,
                duration_ms: start.elapsed().as_millis() as u64,
                follow_up_triggered: false,
                items: Vec::new(),
            });
        }

        let tracker = Arc::new(ProgressTracker::new(total, progress));
        let mut jobs: JoinSet<ItemReport> = JoinSet::new();
        let mut reports: Vec<ItemReport> = Vec::with_capacity(total);
        let mut pending = items.into_iter().enumerate();
        let mut admitted = 0usize;

        while let Some((index, item)) = pending.next() {
            let permit = match self.gate.acquire(cancel).await {
                Ok(permit) => permit,
                Err(GateError::Cancelled) => {
                    info!(%queue, %run_id, admitted, total, "Drain cancelled, no further items will be started");
                    let skipped: Vec<(usize, MediaItem)> =
                        std::iter::once((index, item)).chain(pending.by_ref()).collect();
                    for (index, item) in &skipped {
                        info!(%queue, item_id = item.id, "Item cancelled: {}", item);
                        reports.push(ItemReport::new(*index, item, ItemOutcome::Cancelled));
                    }
                    tracker.advance(skipped.len());
                    break;
                }
                Err(e) => {
                    error!(%queue, %run_id, admitted, total, error = %e, "Drain aborted");
                    jobs.shutdown().await;
                    DRAIN_RUNS.with_label_values(&[queue.as_str(), "aborted"]).inc();
                    return Err(DrainError::GateClosed { admitted, total });
                }
            };

            admitted += 1;
            let guard = JobGuard::new(permit, Arc::clone(&tracker));
            let worker = Arc::clone(&self.worker);
            let cancel = cancel.clone();

            jobs.spawn(async move {
                let outcome = run_item(worker.as_ref(), &item, &cancel, queue).await;
                let completed = guard.complete();
                debug!(
                    %queue,
                    task = index + 1,
                    "Progress {}/{} - {}",
                    completed,
                    total,
                    item.path.display()
                );
                ItemReport::new(index, &item, outcome)
            });
        }

        while let Some(joined) = jobs.join_next().await {
            match joined {
                Ok(report) => reports.push(report),
                Err(e) => {
                    // Panics are caught inside the job; only an abort lands here.
                    warn!(%queue, %run_id, error = %e, "Drain job ended abnormally");
                }
            }
        }

        tracker.finish();

        reports.sort_by_key(|r| r.index);
        let mut succeeded = 0;
        let mut failed = 0;
        let mut cancelled = 0;
        for report in &reports {
            ITEMS_PROCESSED
                .with_label_values(&[queue.as_str(), report.outcome.label()])
                .inc();
            match report.outcome {
                ItemOutcome::Succeeded => succeeded += 1,
                ItemOutcome::Failed { .. } => failed += 1,
                ItemOutcome::Cancelled => cancelled += 1,
            }
        }

        // A cancel that arrives after every item was admitted changes nothing.
        let state = if cancelled > 0 {
            DrainState::CancelledComplete
        } else {
            DrainState::Completed
        };

        let mut follow_up_triggered = false;
        if state == DrainState::Completed {
            if let Some(follow_up) = &self.follow_up {
                info!(%queue, %run_id, task = %follow_up.task_key, "Triggering follow-up task");
                follow_up_triggered = follow_up.trigger.fire(&follow_up.task_key, queue.as_str());
            }
        }

        let duration = start.elapsed();
        DRAIN_RUNS
            .with_label_values(&[queue.as_str(), state.label()])
            .inc();
        DRAIN_DURATION
            .with_label_values(&[queue.as_str()])
            .observe(duration.as_secs_f64());

        let summary = DrainSummary {
            run_id,
            queue,
            state,
            total: tracker.total(),
            succeeded,
            failed,
            cancelled,
            started_at,
            duration_ms: duration.as_millis() as u64,
            follow_up_triggered,
            items: reports,
        };

        match state {
            DrainState::Completed => info!(%run_id, "Task complete: {}", summary),
            DrainState::CancelledComplete => info!(%run_id, "Task cancelled: {}", summary),
        }

        Ok(summary)
    }
}

/// Runs the worker for one admitted item and classifies the result.
///
/// An admitted item always reaches the worker; only the worker itself may
/// stop early on cancellation.
async fn run_item(
    worker: &dyn ExtractionWorker,
    item: &MediaItem,
    cancel: &CancellationToken,
    queue: QueueKind,
) -> ItemOutcome {
    match AssertUnwindSafe(worker.extract(item, cancel))
        .catch_unwind()
        .await
    {
        Ok(Ok(())) => ItemOutcome::Succeeded,
        Ok(Err(WorkerError::Cancelled)) => {
            info!(%queue, item_id = item.id, "Item cancelled: {}", item);
            ItemOutcome::Cancelled
        }
        Ok(Err(e)) => {
            error!(
                %queue,
                item_id = item.id,
                path = %item.path.display(),
                error = %e,
                "Item failed: {}",
                item.name
            );
            ItemOutcome::Failed {
                reason: e.to_string(),
            }
        }
        Err(_) => {
            error!(
                %queue,
                item_id = item.id,
                path = %item.path.display(),
                "Item failed: {} (worker panicked)",
                item.name
            );
            ItemOutcome::Failed {
                reason: "worker panicked".to_string(),
            }
        }
    }
}
