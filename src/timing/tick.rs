//! Periodic tick subscriptions
//!
//! Each state machine owns one [`TickSource`] and holds at most one active
//! [`TickHandle`]. Ticks carry the handle that produced them so a machine can
//! drop ticks that were already in flight when it cancelled.

use std::{
    collections::HashMap,
    sync::{
        atomic::{AtomicU64, Ordering},
        Arc, Mutex,
    },
    time::Duration,
};

use tokio::{
    runtime::Handle,
    sync::mpsc,
    task::JoinHandle,
    time::{interval, MissedTickBehavior},
};
use tracing::{debug, trace};

static NEXT_HANDLE: AtomicU64 = AtomicU64::new(1);

/// Identifies one tick subscription
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TickHandle(u64);

impl TickHandle {
    fn next() -> Self {
        Self(NEXT_HANDLE.fetch_add(1, Ordering::Relaxed))
    }
}

/// Which state machine a tick is addressed to
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TickTarget {
    Stopwatch,
    Countdown,
}

/// A single timer firing
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Tick {
    pub target: TickTarget,
    pub handle: TickHandle,
}

/// Scheduler for repeating ticks.
///
/// Timing is approximate. Consumers must derive elapsed time from clock
/// readings rather than from the number of ticks received.
pub trait TickSource: Send {
    /// Start a repeating subscription at roughly `every` cadence
    fn schedule(&mut self, every: Duration) -> TickHandle;

    /// Stop a subscription. Unknown or already cancelled handles are ignored.
    fn cancel(&mut self, handle: TickHandle);
}

/// Tick source driven by `tokio::time::interval`, delivering ticks on a channel
pub struct TokioTickSource {
    target: TickTarget,
    tx: mpsc::UnboundedSender<Tick>,
    runtime: Handle,
    tasks: HashMap<TickHandle, JoinHandle<()>>,
}

impl TokioTickSource {
    /// Must be called from within a tokio runtime
    pub fn new(target: TickTarget, tx: mpsc::UnboundedSender<Tick>) -> Self {
        Self {
            target,
            tx,
            runtime: Handle::current(),
            tasks: HashMap::new(),
        }
    }
}

impl TickSource for TokioTickSource {
    fn schedule(&mut self, every: Duration) -> TickHandle {
        let handle = TickHandle::next();
        let tick = Tick {
            target: self.target,
            handle,
        };
        let tx = self.tx.clone();

        let task = self.runtime.spawn(async move {
            let mut ticker = interval(every);
            // A suspended process should not replay a burst of missed ticks
            ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);
            // The first tick completes immediately
            ticker.tick().await;

            loop {
                ticker.tick().await;
                if tx.send(tick).is_err() {
                    trace!("Tick receiver closed, stopping {:?} ticker", tick.target);
                    break;
                }
            }
        });

        debug!("Scheduled {:?} ticks every {:?} ({:?})", self.target, every, handle);
        self.tasks.insert(handle, task);
        handle
    }

    fn cancel(&mut self, handle: TickHandle) {
        if let Some(task) = self.tasks.remove(&handle) {
            task.abort();
            debug!("Cancelled {:?} ticks ({:?})", self.target, handle);
        }
    }
}

impl Drop for TokioTickSource {
    fn drop(&mut self) {
        for (_, task) in self.tasks.drain() {
            task.abort();
        }
    }
}

#[derive(Debug, Default)]
struct ManualInner {
    active: Vec<(TickHandle, Duration)>,
    scheduled: usize,
}

/// Tick source that never fires on its own.
///
/// Clones share the same subscription table, so a test can keep one clone
/// while the state machine owns another, then feed ticks by hand.
#[derive(Debug, Clone, Default)]
pub struct ManualTickSource {
    inner: Arc<Mutex<ManualInner>>,
}

impl ManualTickSource {
    pub fn new() -> Self {
        Self::default()
    }

    fn with_inner<T>(&self, f: impl FnOnce(&mut ManualInner) -> T) -> T {
        let mut inner = self.inner.lock().unwrap_or_else(|poisoned| poisoned.into_inner());
        f(&mut inner)
    }

    /// The most recently scheduled subscription that is still active
    pub fn active(&self) -> Option<TickHandle> {
        self.with_inner(|inner| inner.active.last().map(|(handle, _)| *handle))
    }

    /// Cadence of an active subscription
    pub fn interval_of(&self, handle: TickHandle) -> Option<Duration> {
        self.with_inner(|inner| {
            inner
                .active
                .iter()
                .find(|(h, _)| *h == handle)
                .map(|(_, every)| *every)
        })
    }

    pub fn active_count(&self) -> usize {
        self.with_inner(|inner| inner.active.len())
    }

    /// Total number of subscriptions ever scheduled
    pub fn scheduled_count(&self) -> usize {
        self.with_inner(|inner| inner.scheduled)
    }
}

impl TickSource for ManualTickSource {
    fn schedule(&mut self, every: Duration) -> TickHandle {
        let handle = TickHandle::next();
        self.with_inner(|inner| {
            inner.active.push((handle, every));
            inner.scheduled += 1;
        });
        handle
    }

    fn cancel(&mut self, handle: TickHandle) {
        self.with_inner(|inner| inner.active.retain(|(h, _)| *h != handle));
    }
}
