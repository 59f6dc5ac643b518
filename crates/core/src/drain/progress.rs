//! Progress reporting for drain runs.

use std::sync::Arc;

use parking_lot::Mutex;

/// Receives progress percentages in `[0, 100]`.
///
/// Called from worker tasks; implementations must be cheap and must not block.
pub trait ProgressSink: Send + Sync {
    fn report(&self, percent: f64);
}

impl<F> ProgressSink for F
where
    F: Fn(f64) + Send + Sync,
{
    fn report(&self, percent: f64) {
        self(percent)
    }
}

/// Discards progress.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoopProgress;

impl ProgressSink for NoopProgress {
    fn report(&self, _percent: f64) {}
}

/// Counts finished items and reports `completed / total * 100`.
///
/// Reports are issued while the counter lock is held, so the sink sees a
/// non-decreasing sequence even when items finish on different threads.
pub(crate) struct ProgressTracker {
    total: usize,
    completed: Mutex<usize>,
    sink: Arc<dyn ProgressSink>,
}

impl ProgressTracker {
    pub(crate) fn new(total: usize, sink: Arc<dyn ProgressSink>) -> Self {
        Self {
            total,
            completed: Mutex::new(0),
            sink,
        }
    }

    /// Accounts `count` more items and returns the new completed count.
    pub(crate) fn advance(&self, count: usize) -> usize {
        let mut completed = self.completed.lock();
        *completed = (*completed + count).min(self.total);
        self.sink.report(percent(*completed, self.total));
        *completed
    }

    /// Reports 100 regardless of the counter.
    pub(crate) fn finish(&self) {
        let _completed = self.completed.lock();
        self.sink.report(100.0);
    }

    pub(crate) fn total(&self) -> usize {
        self.total
    }
}

fn percent(completed: usize, total: usize) -> f64 {
    if total == 0 {
        return 100.0;
    }
    completed as f64 / total as f64 * 100.0
}
