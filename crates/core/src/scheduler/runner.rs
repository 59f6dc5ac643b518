//! Task scheduler implementation.

use std::collections::HashMap;
use std::panic::AssertUnwindSafe;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, Utc};
use futures::FutureExt;
use parking_lot::{Mutex, RwLock};
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;
use tokio_util::task::TaskTracker;
use tracing::{debug, error, info, warn};

use crate::drain::ProgressSink;

use super::traits::ScheduledTask;
use super::trigger::{TaskTrigger, TriggerRequest};
use super::types::{LastResult, SchedulerError, TaskState, TaskStatus};

/// Mutable run state of one task.
#[derive(Default)]
struct RunSlot {
    running: Option<CancellationToken>,
    progress: f64,
    last_started_at: Option<DateTime<Utc>>,
    last_finished_at: Option<DateTime<Utc>>,
    last_result: Option<LastResult>,
}

struct TaskEntry {
    task: Arc<dyn ScheduledTask>,
    interval: Option<Duration>,
    slot: Mutex<RunSlot>,
}

impl TaskEntry {
    fn status(&self) -> TaskStatus {
        let slot = self.slot.lock();
        let state = match &slot.running {
            Some(token) if token.is_cancelled() => TaskState::Cancelling,
            Some(_) => TaskState::Running,
            None => TaskState::Idle,
        };

        TaskStatus {
            key: self.task.key().to_string(),
            name: self.task.name().to_string(),
            description: self.task.description().to_string(),
            state,
            progress: slot.progress,
            interval_secs: self.interval.map(|d| d.as_secs()),
            last_started_at: slot.last_started_at,
            last_finished_at: slot.last_finished_at,
            last_result: slot.last_result.clone(),
        }
    }
}

struct SchedulerInner {
    tasks: RwLock<HashMap<String, Arc<TaskEntry>>>,
    tracker: TaskTracker,
    shutdown: CancellationToken,
    trigger: TaskTrigger,
    trigger_rx: Mutex<Option<mpsc::UnboundedReceiver<TriggerRequest>>>,
    started: AtomicBool,
}

/// Runs registered tasks on demand, on an interval, or when triggered.
///
/// At most one run per task key is in progress at any time.
#[derive(Clone)]
pub struct TaskScheduler {
    inner: Arc<SchedulerInner>,
}

impl Default for TaskScheduler {
    fn default() -> Self {
        Self::new()
    }
}

impl TaskScheduler {
    /// Creates a scheduler with no tasks.
    pub fn new() -> Self {
        let (trigger, trigger_rx) = TaskTrigger::channel();

        Self {
            inner: Arc::new(SchedulerInner {
                tasks: RwLock::new(HashMap::new()),
                tracker: TaskTracker::new(),
                shutdown: CancellationToken::new(),
                trigger,
                trigger_rx: Mutex::new(Some(trigger_rx)),
                started: AtomicBool::new(false),
            }),
        }
    }

    /// Handle for requesting tasks from elsewhere (e.g. follow-ups).
    pub fn trigger(&self) -> TaskTrigger {
        self.inner.trigger.clone()
    }

    /// Registers a task, optionally run every `interval`.
    ///
    /// Registering a key twice replaces the earlier task.
    pub fn register(&self, task: Arc<dyn ScheduledTask>, interval: Option<Duration>) {
        let key = task.key().to_string();
        let interval = interval.filter(|d| !d.is_zero());
        info!(task = %key, interval_secs = interval.map(|d| d.as_secs()), "Registered task");

        let entry = Arc::new(TaskEntry {
            task,
            interval,
            slot: Mutex::new(RunSlot::default()),
        });
        let replaced = self.inner.tasks.write().insert(key.clone(), entry);
        if replaced.is_some() {
            warn!(task = %key, "Replaced previously registered task");
        }
    }

    /// Spawns the trigger dispatch loop and one loop per interval task.
    pub fn start(&self) {
        if self.inner.started.swap(true, Ordering::SeqCst) {
            warn!("Task scheduler already started");
            return;
        }

        info!("Starting task scheduler");

        if let Some(rx) = self.inner.trigger_rx.lock().take() {
            self.spawn_dispatch_loop(rx);
        }

        let interval_tasks: Vec<(String, Duration)> = self
            .inner
            .tasks
            .read()
            .iter()
            .filter_map(|(key, entry)| entry.interval.map(|d| (key.clone(), d)))
            .collect();

        for (key, interval) in interval_tasks {
            self.spawn_interval_loop(key, interval);
        }
    }

    /// Starts a run of `key` in the background.
    pub fn run(&self, key: &str) -> Result<(), SchedulerError> {
        if self.inner.shutdown.is_cancelled() {
            return Err(SchedulerError::ShuttingDown);
        }

        let entry = self
            .inner
            .tasks
            .read()
            .get(key)
            .cloned()
            .ok_or_else(|| SchedulerError::UnknownTask(key.to_string()))?;

        let cancel = {
            let mut slot = entry.slot.lock();
            if slot.running.is_some() {
                return Err(SchedulerError::AlreadyRunning(key.to_string()));
            }
            let cancel = self.inner.shutdown.child_token();
            slot.running = Some(cancel.clone());
            slot.progress = 0.0;
            slot.last_started_at = Some(Utc::now());
            cancel
        };

        info!(task = key, "Task started");

        let progress: Arc<dyn ProgressSink> = {
            let entry = Arc::clone(&entry);
            Arc::new(move |percent: f64| {
                entry.slot.lock().progress = percent;
            })
        };

        let key = key.to_string();
        self.inner.tracker.spawn(async move {
            let result = AssertUnwindSafe(entry.task.execute(&cancel, progress))
                .catch_unwind()
                .await;

            let last = match result {
                Ok(Ok(outcome)) if outcome.cancelled => {
                    info!(task = %key, "Task cancelled: {}", outcome.summary);
                    LastResult::Cancelled {
                        summary: outcome.summary,
                    }
                }
                Ok(Ok(outcome)) => {
                    info!(task = %key, "Task complete: {}", outcome.summary);
                    LastResult::Succeeded {
                        summary: outcome.summary,
                    }
                }
                Ok(Err(e)) => {
                    error!(task = %key, error = %e, "Task failed");
                    LastResult::Failed {
                        error: e.to_string(),
                    }
                }
                Err(_) => {
                    error!(task = %key, "Task panicked");
                    LastResult::Failed {
                        error: "task panicked".to_string(),
                    }
                }
            };

            let mut slot = entry.slot.lock();
            slot.running = None;
            slot.last_finished_at = Some(Utc::now());
            slot.last_result = Some(last);
        });

        Ok(())
    }

    /// Requests cancellation of the current run of `key`.
    pub fn cancel(&self, key: &str) -> Result<(), SchedulerError> {
        let entry = self
            .inner
            .tasks
            .read()
            .get(key)
            .cloned()
            .ok_or_else(|| SchedulerError::UnknownTask(key.to_string()))?;

        let slot = entry.slot.lock();
        match &slot.running {
            Some(token) => {
                info!(task = key, "Cancelling task");
                token.cancel();
                Ok(())
            }
            None => Err(SchedulerError::NotRunning(key.to_string())),
        }
    }

    /// Status of one task.
    pub fn task_status(&self, key: &str) -> Option<TaskStatus> {
        self.inner.tasks.read().get(key).map(|entry| entry.status())
    }

    /// Status of every task, ordered by key.
    pub fn status(&self) -> Vec<TaskStatus> {
        let mut statuses: Vec<TaskStatus> = self
            .inner
            .tasks
            .read()
            .values()
            .map(|entry| entry.status())
            .collect();
        statuses.sort_by(|a, b| a.key.cmp(&b.key));
        statuses
    }

    /// Cancels running tasks, stops the loops and waits for everything to finish.
    pub async fn shutdown(&self) {
        info!("Stopping task scheduler");
        self.inner.shutdown.cancel();
        self.inner.tracker.close();
        self.inner.tracker.wait().await;
        info!("Task scheduler stopped");
    }

    fn spawn_dispatch_loop(&self, mut rx: mpsc::UnboundedReceiver<TriggerRequest>) {
        let scheduler = self.clone();
        let shutdown = self.inner.shutdown.clone();

        self.inner.tracker.spawn(async move {
            debug!("Trigger dispatch loop started");
            loop {
                tokio::select! {
                    biased;
                    _ = shutdown.cancelled() => break,
                    request = rx.recv() => {
                        let Some(request) = request else { break };
                        scheduler.dispatch(request);
                    }
                }
            }
            debug!("Trigger dispatch loop stopped");
        });
    }

    fn dispatch(&self, request: TriggerRequest) {
        match self.run(&request.task_key) {
            Ok(()) => {
                info!(
                    task = %request.task_key,
                    requested_by = %request.requested_by,
                    "Triggered task started"
                );
            }
            Err(SchedulerError::UnknownTask(key)) => {
                warn!(
                    task = %key,
                    requested_by = %request.requested_by,
                    "Triggered task is not registered"
                );
            }
            Err(e) => {
                warn!(task = %request.task_key, error = %e, "Triggered task not started");
            }
        }
    }

    fn spawn_interval_loop(&self, key: String, interval: Duration) {
        let scheduler = self.clone();
        let shutdown = self.inner.shutdown.clone();

        self.inner.tracker.spawn(async move {
            debug!(task = %key, "Interval loop started");
            loop {
                tokio::select! {
                    _ = shutdown.cancelled() => break,
                    _ = tokio::time::sleep(interval) => {
                        match scheduler.run(&key) {
                            Ok(()) => {}
                            Err(SchedulerError::AlreadyRunning(_)) => {
                                debug!(task = %key, "Skipping interval run, previous run still active");
                            }
                            Err(e) => {
                                warn!(task = %key, error = %e, "Interval run not started");
                            }
                        }
                    }
                }
            }
            debug!(task = %key, "Interval loop stopped");
        });
    }
}
