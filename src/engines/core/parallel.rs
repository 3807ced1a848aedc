//! Parallel processing primitives
//!
//! A bounded worker pool with deterministic teardown, and the partitioner
//! that cuts an ordered input into one contiguous batch per unit of work.

use std::any::Any;
use std::ops::Range;
use std::panic::{self, AssertUnwindSafe};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use parking_lot::Mutex;
use rayon::{ThreadPool, ThreadPoolBuilder};
use thiserror::Error;

use crate::engines::core::logging::Logger;

/// Default prefix for worker thread names
pub const DEFAULT_THREAD_PREFIX: &str = "seqbatch-worker";

/// Get the default number of workers to use
pub fn default_num_threads() -> usize {
    num_cpus::get()
}

/// Raised when a batch cannot be partitioned
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PartitionError {
    #[error("worker count must be at least 1, got {0}")]
    InvalidWorkerCount(usize),
}

pub type PartitionResult<T> = Result<T, PartitionError>;

/// Errors raised by the worker pool itself
#[derive(Debug, Error)]
pub enum PoolError {
    #[error(transparent)]
    Partition(#[from] PartitionError),

    #[error("failed to build worker pool: {0}")]
    Build(#[from] rayon::ThreadPoolBuildError),

    #[error("worker pool has been shut down")]
    ShutDown,
}

pub type PoolResult<T> = Result<T, PoolError>;

/// One contiguous, order-preserving slice of the input
#[derive(Debug)]
pub struct Batch<'a, T> {
    /// Position of this batch in partition order
    pub index: usize,
    /// Offset of the first item in the full input
    pub offset: usize,
    pub items: &'a [T],
}

impl<'a, T> Batch<'a, T> {
    /// Range of the full input covered by this batch
    pub fn range(&self) -> Range<usize> {
        self.offset..self.offset + self.items.len()
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}

impl<T> Clone for Batch<'_, T> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<T> Copy for Batch<'_, T> {}

/// Size of every batch (the last one may be shorter) for `total` items
/// spread over `workers`.
///
/// `total / workers + 1` over-allocates on purpose so that no more than
/// `workers` batches are ever produced.
pub fn batch_size(total: usize, workers: usize) -> PartitionResult<usize> {
    if workers == 0 {
        return Err(PartitionError::InvalidWorkerCount(workers));
    }
    Ok(total / workers + 1)
}

/// Split `items` into contiguous batches for `workers` workers.
///
/// Yields at most `workers` batches, none of them empty; an empty input
/// yields no batches at all.
pub fn partition<T>(items: &[T], workers: usize) -> PartitionResult<Vec<Batch<'_, T>>> {
    let size = batch_size(items.len(), workers)?;

    Ok(items
        .chunks(size)
        .enumerate()
        .map(|(index, chunk)| Batch {
            index,
            offset: index * size,
            items: chunk,
        })
        .collect())
}

/// Payload of a unit of work that panicked
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnitPanic {
    pub message: String,
}

impl UnitPanic {
    fn from_payload(payload: Box<dyn Any + Send>) -> Self {
        let message = if let Some(s) = payload.downcast_ref::<&str>() {
            (*s).to_string()
        } else if let Some(s) = payload.downcast_ref::<String>() {
            s.clone()
        } else {
            "unknown panic payload".to_string()
        };
        Self { message }
    }
}

/// Outcome of one unit of work
pub type UnitOutcome<R> = Result<R, UnitPanic>;

/// Counts a unit as in flight for as long as the guard lives
struct InFlightGuard<'a> {
    counter: &'a AtomicUsize,
}

impl<'a> InFlightGuard<'a> {
    fn enter(counter: &'a AtomicUsize, peak: &AtomicUsize) -> Self {
        let now = counter.fetch_add(1, Ordering::SeqCst) + 1;
        peak.fetch_max(now, Ordering::SeqCst);
        Self { counter }
    }
}

impl Drop for InFlightGuard<'_> {
    fn drop(&mut self) {
        self.counter.fetch_sub(1, Ordering::SeqCst);
    }
}

/// Bounded worker pool
///
/// The pool is built when the `WorkerPool` is created and its capacity never
/// changes afterwards. It is released exactly once, either by an explicit
/// [`WorkerPool::shutdown`] or when the value is dropped.
pub struct WorkerPool {
    pool: Mutex<Option<Arc<ThreadPool>>>,
    capacity: usize,
    in_flight: AtomicUsize,
    peak_in_flight: AtomicUsize,
    logger: Logger,
}

impl WorkerPool {
    /// Create a pool with `capacity` worker threads
    pub fn new(capacity: usize, logger: Logger) -> PoolResult<Self> {
        Self::with_thread_prefix(capacity, DEFAULT_THREAD_PREFIX, logger)
    }

    /// Create a pool whose threads are named `{prefix}-{idx}`
    pub fn with_thread_prefix(capacity: usize, prefix: &str, logger: Logger) -> PoolResult<Self> {
        if capacity == 0 {
            return Err(PartitionError::InvalidWorkerCount(capacity).into());
        }

        let prefix = prefix.to_string();
        let pool = ThreadPoolBuilder::new()
            .num_threads(capacity)
            .thread_name(move |idx| format!("{}-{}", prefix, idx))
            .build()?;

        logger.info(format_args!("initialized worker pool with {} threads", capacity));

        Ok(Self {
            pool: Mutex::new(Some(Arc::new(pool))),
            capacity,
            in_flight: AtomicUsize::new(0),
            peak_in_flight: AtomicUsize::new(0),
            logger,
        })
    }

    /// Number of workers, fixed at construction
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Units currently executing
    pub fn in_flight(&self) -> usize {
        self.in_flight.load(Ordering::SeqCst)
    }

    /// Highest number of units ever observed executing at once
    pub fn peak_in_flight(&self) -> usize {
        self.peak_in_flight.load(Ordering::SeqCst)
    }

    pub fn is_shut_down(&self) -> bool {
        self.pool.lock().is_none()
    }

    /// Run every unit on the pool and wait for all of them.
    ///
    /// Outcomes come back in the order the units were given, whatever order
    /// they finished in. A unit that panics does not stop its siblings; its
    /// panic is captured in its own outcome.
    pub fn run_all<T, R, F>(&self, units: Vec<T>, work: F) -> PoolResult<Vec<UnitOutcome<R>>>
    where
        T: Send,
        R: Send,
        F: Fn(T) -> R + Sync,
    {
        // Running units keep the pool alive across a concurrent shutdown
        let pool = self.pool.lock().as_ref().map(Arc::clone).ok_or(PoolError::ShutDown)?;

        let mut slots: Vec<Option<UnitOutcome<R>>> = (0..units.len()).map(|_| None).collect();
        let work = &work;
        let in_flight = &self.in_flight;
        let peak = &self.peak_in_flight;

        pool.scope(|s| {
            for (slot, unit) in slots.iter_mut().zip(units) {
                s.spawn(move |_| {
                    let _guard = InFlightGuard::enter(in_flight, peak);
                    let outcome = panic::catch_unwind(AssertUnwindSafe(|| work(unit)));
                    *slot = Some(outcome.map_err(UnitPanic::from_payload));
                });
            }
        });

        // The scope only returns once every spawned unit has finished
        Ok(slots
            .into_iter()
            .map(|slot| {
                slot.unwrap_or_else(|| {
                    Err(UnitPanic {
                        message: "unit did not report an outcome".to_string(),
                    })
                })
            })
            .collect())
    }

    /// Release the pool. Later calls are no-ops.
    pub fn shutdown(&self) {
        if let Some(pool) = self.pool.lock().take() {
            let still_running = self.in_flight();
            drop(pool);
            self.logger.info(format_args!(
                "released worker pool of {} threads ({} units still in flight)",
                self.capacity, still_running
            ));
        }
    }
}

impl Drop for WorkerPool {
    fn drop(&mut self) {
        self.shutdown();
    }
}

impl std::fmt::Debug for WorkerPool {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("WorkerPool")
            .field("capacity", &self.capacity)
            .field("in_flight", &self.in_flight())
            .field("shut_down", &self.is_shut_down())
            .finish()
    }
}
