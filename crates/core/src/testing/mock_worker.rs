//! Mock extraction worker for testing.

use async_trait::async_trait;
use parking_lot::Mutex;
use std::collections::{HashMap, HashSet};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Semaphore;
use tokio_util::sync::CancellationToken;

use crate::drain::{ExtractionWorker, WorkerError};
use crate::queue::MediaItem;

/// Tracks the number of concurrently running calls, including through panics.
struct RunningGuard<'a> {
    running: &'a AtomicUsize,
}

impl<'a> RunningGuard<'a> {
    fn enter(running: &'a AtomicUsize, max_running: &AtomicUsize) -> Self {
        let now = running.fetch_add(1, Ordering::SeqCst) + 1;
        max_running.fetch_max(now, Ordering::SeqCst);
        Self { running }
    }
}

impl Drop for RunningGuard<'_> {
    fn drop(&mut self) {
        self.running.fetch_sub(1, Ordering::SeqCst);
    }
}

/// Mock implementation of the ExtractionWorker trait.
///
/// Provides controllable behavior for testing:
/// - Per-item failures and panics
/// - Fixed or per-item delays, optionally cut short by cancellation
/// - Manual release mode, where each call waits for [`release`](Self::release)
/// - Tracking of started/finished items and peak concurrency
///
/// # Example
///
/// ```rust,ignore
/// use strmkit_core::testing::MockWorker;
///
/// let worker = MockWorker::new()
///     .with_delay(Duration::from_millis(20))
///     .fail_item(3, "ffprobe failed");
///
/// runner.execute(&cancel, progress).await?;
/// assert!(worker.max_concurrent() <= 2);
/// ```
#[derive(Default)]
pub struct MockWorker {
    delay: Duration,
    item_delays: HashMap<i64, Duration>,
    failures: HashMap<i64, String>,
    panics: HashSet<i64>,
    cancel_aware: bool,
    release: Option<Arc<Semaphore>>,

    calls: AtomicUsize,
    running: AtomicUsize,
    max_running: AtomicUsize,
    started: Mutex<Vec<i64>>,
    finished: Mutex<Vec<i64>>,
}

impl MockWorker {
    /// Create a worker that succeeds immediately.
    pub fn new() -> Self {
        Self::default()
    }

    /// Sleep this long on every item.
    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = delay;
        self
    }

    /// Sleep this long on one item instead of the default delay.
    pub fn with_item_delay(mut self, item_id: i64, delay: Duration) -> Self {
        self.item_delays.insert(item_id, delay);
        self
    }

    /// Fail the given item with `reason`.
    pub fn fail_item(mut self, item_id: i64, reason: &str) -> Self {
        self.failures.insert(item_id, reason.to_string());
        self
    }

    /// Panic while processing the given item.
    pub fn panic_on_item(mut self, item_id: i64) -> Self {
        self.panics.insert(item_id);
        self
    }

    /// Return `WorkerError::Cancelled` when cancelled while waiting.
    pub fn cancel_aware(mut self) -> Self {
        self.cancel_aware = true;
        self
    }

    /// Make every call wait until [`release`](Self::release) lets it go.
    pub fn held(mut self) -> Self {
        self.release = Some(Arc::new(Semaphore::new(0)));
        self
    }

    /// Let `count` held calls proceed.
    pub fn release(&self, count: usize) {
        if let Some(release) = &self.release {
            release.add_permits(count);
        }
    }

    /// Number of extract calls so far.
    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    /// Calls currently in progress.
    pub fn running(&self) -> usize {
        self.running.load(Ordering::SeqCst)
    }

    /// Highest number of calls observed in progress at once.
    pub fn max_concurrent(&self) -> usize {
        self.max_running.load(Ordering::SeqCst)
    }

    /// Item IDs in the order their calls started.
    pub fn started(&self) -> Vec<i64> {
        self.started.lock().clone()
    }

    /// Item IDs that finished successfully.
    pub fn finished(&self) -> Vec<i64> {
        self.finished.lock().clone()
    }

    /// Wait until at least `count` calls have started.
    pub async fn wait_started(&self, count: usize) {
        while self.started.lock().len() < count {
            tokio::time::sleep(Duration::from_millis(1)).await;
        }
    }

    async fn wait(&self, cancel: &CancellationToken, delay: Duration) -> Result<(), WorkerError> {
        if self.cancel_aware {
            tokio::select! {
                _ = cancel.cancelled() => Err(WorkerError::Cancelled),
                _ = tokio::time::sleep(delay) => Ok(()),
            }
        } else {
            tokio::time::sleep(delay).await;
            Ok(())
        }
    }
}

#[async_trait]
impl ExtractionWorker for MockWorker {
    fn name(&self) -> &str {
        "mock"
    }

    async fn extract(
        &self,
        item: &MediaItem,
        cancel: &CancellationToken,
    ) -> Result<(), WorkerError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        let _running = RunningGuard::enter(&self.running, &self.max_running);
        self.started.lock().push(item.id);

        if let Some(release) = &self.release {
            let acquired = if self.cancel_aware {
                tokio::select! {
                    _ = cancel.cancelled() => return Err(WorkerError::Cancelled),
                    permit = release.acquire() => permit,
                }
            } else {
                release.acquire().await
            };
            if let Ok(permit) = acquired {
                permit.forget();
            }
        }

        let delay = self.item_delays.get(&item.id).copied().unwrap_or(self.delay);
        if !delay.is_zero() {
            self.wait(cancel, delay).await?;
        }

        if self.panics.contains(&item.id) {
            panic!("mock worker panicked on item {}", item.id);
        }

        if let Some(reason) = self.failures.get(&item.id) {
            return Err(WorkerError::failed(reason.clone()));
        }

        self.finished.lock().push(item.id);
        Ok(())
    }
}
