//! Resizable admission gate implementation.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use parking_lot::Mutex;
use tokio::sync::{OwnedSemaphorePermit, Semaphore};
use tokio_util::sync::CancellationToken;
use tracing::{debug, info};

use crate::metrics::{GATE_CAPACITY, GATE_PERMITS_HELD};

use super::types::{GateError, GateStatus};

/// Capacity bookkeeping, guarded by a short non-async critical section.
#[derive(Debug)]
struct Capacity {
    /// Configured capacity.
    limit: usize,
    /// Permits to swallow on release instead of returning to the pool.
    debt: usize,
}

#[derive(Debug)]
struct GateInner {
    semaphore: Arc<Semaphore>,
    capacity: Mutex<Capacity>,
    held: AtomicUsize,
}

/// A counting permit pool bounding concurrent extraction jobs.
///
/// Cheap to clone; all clones share the same pool.
#[derive(Debug, Clone)]
pub struct AdmissionGate {
    inner: Arc<GateInner>,
}

impl AdmissionGate {
    /// Creates a gate with the given capacity.
    pub fn new(capacity: usize) -> Result<Self, GateError> {
        if capacity == 0 {
            return Err(GateError::InvalidCapacity(capacity));
        }

        GATE_CAPACITY.set(capacity as i64);
        GATE_PERMITS_HELD.set(0);

        Ok(Self {
            inner: Arc::new(GateInner {
                semaphore: Arc::new(Semaphore::new(capacity)),
                capacity: Mutex::new(Capacity {
                    limit: capacity,
                    debt: 0,
                }),
                held: AtomicUsize::new(0),
            }),
        })
    }

    /// Waits for a permit.
    ///
    /// Suspends until a permit is free or `cancel` fires. Cancellation takes
    /// precedence: once the token is cancelled no permit is granted, even if
    /// one is available.
    pub async fn acquire(&self, cancel: &CancellationToken) -> Result<AdmissionPermit, GateError> {
        if cancel.is_cancelled() {
            return Err(GateError::Cancelled);
        }

        let permit = tokio::select! {
            biased;
            _ = cancel.cancelled() => return Err(GateError::Cancelled),
            permit = Arc::clone(&self.inner.semaphore).acquire_owned() => {
                permit.map_err(|_| GateError::Closed)?
            }
        };

        let held = self.inner.held.fetch_add(1, Ordering::SeqCst) + 1;
        GATE_PERMITS_HELD.set(held as i64);

        Ok(AdmissionPermit {
            permit: Some(permit),
            gate: Arc::clone(&self.inner),
        })
    }

    /// Changes the capacity for future acquisitions.
    ///
    /// Returns the previous capacity. Held permits are never revoked: when
    /// shrinking below current usage, the surplus is withheld as permits come
    /// back.
    pub fn resize(&self, new_capacity: usize) -> Result<usize, GateError> {
        if new_capacity == 0 {
            return Err(GateError::InvalidCapacity(new_capacity));
        }

        let mut capacity = self.inner.capacity.lock();
        let previous = capacity.limit;

        if new_capacity > previous {
            let mut grow = new_capacity - previous;
            let repaid = grow.min(capacity.debt);
            capacity.debt -= repaid;
            grow -= repaid;
            if grow > 0 {
                self.inner.semaphore.add_permits(grow);
            }
        } else if new_capacity < previous {
            let shrink = previous - new_capacity;
            let forgotten = self.inner.semaphore.forget_permits(shrink);
            capacity.debt += shrink - forgotten;
        }

        capacity.limit = new_capacity;
        let debt = capacity.debt;
        drop(capacity);

        GATE_CAPACITY.set(new_capacity as i64);
        if previous != new_capacity {
            info!(
                previous,
                capacity = new_capacity,
                pending_shrink = debt,
                "Admission gate resized"
            );
        }

        Ok(previous)
    }

    /// Closes the gate. Waiting and future acquisitions fail with [`GateError::Closed`].
    pub fn close(&self) {
        self.inner.semaphore.close();
        info!("Admission gate closed");
    }

    /// Whether the gate has been closed.
    pub fn is_closed(&self) -> bool {
        self.inner.semaphore.is_closed()
    }

    /// Configured capacity.
    pub fn capacity(&self) -> usize {
        self.inner.capacity.lock().limit
    }

    /// Permits currently held.
    pub fn held(&self) -> usize {
        self.inner.held.load(Ordering::SeqCst)
    }

    /// Permits that can be granted right now.
    pub fn available(&self) -> usize {
        self.inner.semaphore.available_permits()
    }

    /// Returns a snapshot of the gate's counters.
    pub fn status(&self) -> GateStatus {
        let capacity = self.inner.capacity.lock();
        GateStatus {
            capacity: capacity.limit,
            held: self.inner.held.load(Ordering::SeqCst),
            available: self.inner.semaphore.available_permits(),
            pending_shrink: capacity.debt,
            closed: self.inner.semaphore.is_closed(),
        }
    }
}

/// A granted admission. Released exactly once, when dropped.
#[derive(Debug)]
pub struct AdmissionPermit {
    permit: Option<OwnedSemaphorePermit>,
    gate: Arc<GateInner>,
}

impl Drop for AdmissionPermit {
    fn drop(&mut self) {
        let held = self.gate.held.fetch_sub(1, Ordering::SeqCst) - 1;
        GATE_PERMITS_HELD.set(held as i64);

        if let Some(permit) = self.permit.take() {
            let mut capacity = self.gate.capacity.lock();
            if capacity.debt > 0 {
                capacity.debt -= 1;
                permit.forget();
                debug!(pending_shrink = capacity.debt, "Withheld released permit");
            } else {
                drop(permit);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;
    use tokio::time::timeout;

    #[test]
    fn test_zero_capacity_rejected() {
        let result = AdmissionGate::new(0);
        assert!(matches!(result, Err(GateError::InvalidCapacity(0))));
    }

    #[tokio::test]
    async fn test_acquire_and_release() {
        let gate = AdmissionGate::new(2).unwrap();
        let cancel = CancellationToken::new();

        let first = gate.acquire(&cancel).await.unwrap();
        let second = gate.acquire(&cancel).await.unwrap();
        assert_eq!(gate.held(), 2);
        assert_eq!(gate.available(), 0);

        drop(first);
        assert_eq!(gate.held(), 1);
        assert_eq!(gate.available(), 1);

        drop(second);
        assert_eq!(gate.held(), 0);
        assert_eq!(gate.available(), 2);
    }

    #[tokio::test]
    async fn test_acquire_waits_for_release() {
        let gate = AdmissionGate::new(1).unwrap();
        let cancel = CancellationToken::new();

        let held = gate.acquire(&cancel).await.unwrap();

        let waiter = {
            let gate = gate.clone();
            let cancel = cancel.clone();
            tokio::spawn(async move { gate.acquire(&cancel).await.map(|_| ()) })
        };

        tokio::time::sleep(Duration::from_millis(20)).await;
        assert!(!waiter.is_finished());

        drop(held);
        let result = timeout(Duration::from_secs(1), waiter).await.unwrap().unwrap();
        assert!(result.is_ok());
    }

    #[tokio::test]
    async fn test_cancel_while_waiting() {
        let gate = AdmissionGate::new(1).unwrap();
        let cancel = CancellationToken::new();
        let _held = gate.acquire(&cancel).await.unwrap();

        let waiter = {
            let gate = gate.clone();
            let cancel = cancel.clone();
            tokio::spawn(async move { gate.acquire(&cancel).await.map(|_| ()) })
        };

        tokio::time::sleep(Duration::from_millis(20)).await;
        cancel.cancel();

        let result = timeout(Duration::from_secs(1), waiter).await.unwrap().unwrap();
        assert_eq!(result, Err(GateError::Cancelled));
        assert_eq!(gate.held(), 1);
    }

    #[tokio::test]
    async fn test_cancelled_token_wins_over_free_permit() {
        let gate = AdmissionGate::new(3).unwrap();
        let cancel = CancellationToken::new();
        cancel.cancel();

        let result = gate.acquire(&cancel).await;
        assert!(matches!(result, Err(GateError::Cancelled)));
        assert_eq!(gate.held(), 0);
        assert_eq!(gate.available(), 3);
    }

    #[tokio::test]
    async fn test_grow_wakes_waiter() {
        let gate = AdmissionGate::new(1).unwrap();
        let cancel = CancellationToken::new();
        let _held = gate.acquire(&cancel).await.unwrap();

        let waiter = {
            let gate = gate.clone();
            let cancel = cancel.clone();
            tokio::spawn(async move { gate.acquire(&cancel).await.map(|_| ()) })
        };

        tokio::time::sleep(Duration::from_millis(20)).await;
        assert_eq!(gate.resize(2), Ok(1));

        let result = timeout(Duration::from_secs(1), waiter).await.unwrap().unwrap();
        assert!(result.is_ok());
        assert_eq!(gate.capacity(), 2);
    }

    #[tokio::test]
    async fn test_shrink_does_not_revoke_held_permits() {
        let gate = AdmissionGate::new(3).unwrap();
        let cancel = CancellationToken::new();

        let mut permits = Vec::new();
        for _ in 0..3 {
            permits.push(gate.acquire(&cancel).await.unwrap());
        }

        gate.resize(1).unwrap();
        let status = gate.status();
        assert_eq!(status.capacity, 1);
        assert_eq!(status.held, 3);
        assert_eq!(status.available, 0);
        assert_eq!(status.pending_shrink, 2);

        // Two releases are swallowed, held drops to 1 == capacity
        permits.pop();
        permits.pop();
        assert_eq!(gate.held(), 1);
        assert_eq!(gate.available(), 0);
        assert_eq!(gate.status().pending_shrink, 0);

        let blocked = timeout(Duration::from_millis(30), gate.acquire(&cancel)).await;
        assert!(blocked.is_err(), "no admission while held >= capacity");

        permits.pop();
        assert_eq!(gate.available(), 1);
        let permit = timeout(Duration::from_secs(1), gate.acquire(&cancel)).await;
        assert!(permit.unwrap().is_ok());
    }

    #[tokio::test]
    async fn test_shrink_with_idle_permits() {
        let gate = AdmissionGate::new(4).unwrap();
        let cancel = CancellationToken::new();
        let _held = gate.acquire(&cancel).await.unwrap();

        gate.resize(2).unwrap();
        let status = gate.status();
        assert_eq!(status.available, 1);
        assert_eq!(status.pending_shrink, 0);
    }

    #[tokio::test]
    async fn test_grow_repays_pending_shrink_first() {
        let gate = AdmissionGate::new(3).unwrap();
        let cancel = CancellationToken::new();

        let mut permits = Vec::new();
        for _ in 0..3 {
            permits.push(gate.acquire(&cancel).await.unwrap());
        }

        gate.resize(1).unwrap();
        gate.resize(2).unwrap();
        let status = gate.status();
        assert_eq!(status.capacity, 2);
        assert_eq!(status.pending_shrink, 1);
        assert_eq!(status.available, 0);

        permits.pop();
        assert_eq!(gate.available(), 0);
        permits.pop();
        assert_eq!(gate.available(), 1);
        permits.pop();
        assert_eq!(gate.available(), 2);
    }

    #[tokio::test]
    async fn test_resize_to_zero_rejected() {
        let gate = AdmissionGate::new(2).unwrap();
        assert_eq!(gate.resize(0), Err(GateError::InvalidCapacity(0)));
        assert_eq!(gate.capacity(), 2);
    }

    #[tokio::test]
    async fn test_closed_gate_rejects_acquire() {
        let gate = AdmissionGate::new(1).unwrap();
        let cancel = CancellationToken::new();

        gate.close();
        assert!(gate.is_closed());
        assert!(matches!(
            gate.acquire(&cancel).await,
            Err(GateError::Closed)
        ));
    }
}
