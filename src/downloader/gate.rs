//! Rate and concurrency gate
//!
//! A counting semaphore whose permits are returned on a timer instead of
//! when the holder finishes. Each admitted request keeps its permit out of
//! the pool for `release_delay`, no matter how long the request itself takes,
//! so at most `capacity` requests start within any `release_delay` window.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{OwnedSemaphorePermit, Semaphore};

/// One unit of gate capacity, held between `acquire` and its scheduled release
#[must_use = "a token dropped without schedule_release frees its slot immediately"]
#[derive(Debug)]
pub struct GateToken {
    permit: OwnedSemaphorePermit,
}

/// A permit waiting on its release timer
///
/// Dropping it returns the permit to the pool, so the slot comes back on
/// every exit path of the timer task, cancellation included.
struct PendingRelease {
    _permit: OwnedSemaphorePermit,
    pending: Arc<AtomicUsize>,
}

impl PendingRelease {
    fn new(permit: OwnedSemaphorePermit, pending: Arc<AtomicUsize>) -> Self {
        pending.fetch_add(1, Ordering::SeqCst);
        Self {
            _permit: permit,
            pending,
        }
    }
}

impl Drop for PendingRelease {
    fn drop(&mut self) {
        self.pending.fetch_sub(1, Ordering::SeqCst);
    }
}

/// Shared admission gate for all fetch workers
///
/// Owns the release timers: workers only hand their token back via
/// `schedule_release` and never wait for it.
#[derive(Debug)]
pub struct RateGate {
    semaphore: Arc<Semaphore>,
    capacity: usize,
    release_delay: Duration,
    pending_releases: Arc<AtomicUsize>,
}

impl RateGate {
    /// Creates a gate admitting `capacity` requests per `release_delay` window
    ///
    /// A capacity of zero is raised to one.
    pub fn new(capacity: usize, release_delay: Duration) -> Self {
        let capacity = capacity.max(1);
        Self {
            semaphore: Arc::new(Semaphore::new(capacity)),
            capacity,
            release_delay,
            pending_releases: Arc::new(AtomicUsize::new(0)),
        }
    }

    /// Waits until a token is free and takes it
    ///
    /// Returns `None` once the gate has been closed.
    pub async fn acquire(&self) -> Option<GateToken> {
        let permit = Arc::clone(&self.semaphore).acquire_owned().await.ok()?;
        Some(GateToken { permit })
    }

    /// Stops admitting requests; waiting and future acquires get `None`
    ///
    /// Tokens already handed out still release on their timers.
    pub fn close(&self) {
        self.semaphore.close();
    }

    pub fn is_closed(&self) -> bool {
        self.semaphore.is_closed()
    }

    /// Returns `token` to the pool once `release_delay` has elapsed
    ///
    /// Runs on a detached task owned by the gate; the caller continues
    /// immediately. Must be called from within a Tokio runtime.
    pub fn schedule_release(&self, token: GateToken) {
        let pending = PendingRelease::new(token.permit, Arc::clone(&self.pending_releases));
        let delay = self.release_delay;

        tokio::spawn(async move {
            tokio::time::sleep(delay).await;
            drop(pending);
        });
    }

    /// Acquires a token and immediately schedules its release
    ///
    /// Returns `false` if the gate was closed before a token came free.
    pub async fn admit(&self) -> bool {
        match self.acquire().await {
            Some(token) => {
                self.schedule_release(token);
                true
            }
            None => false,
        }
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn release_delay(&self) -> Duration {
        self.release_delay
    }

    /// Number of tokens currently handed out and not yet released
    pub fn outstanding(&self) -> usize {
        self.capacity - self.semaphore.available_permits()
    }

    /// Number of release timers still running
    pub fn pending_releases(&self) -> usize {
        self.pending_releases.load(Ordering::SeqCst)
    }

    /// Upper bound on request starts per second
    pub fn max_rate_per_sec(&self) -> f64 {
        if self.release_delay.is_zero() {
            f64::INFINITY
        } else {
            self.capacity as f64 / self.release_delay.as_secs_f64()
        }
    }
}
