//! Testing utilities for skitter.
//!
//! This module provides utilities to make testing listeners and dispatch
//! behavior deterministic.
//!
//! # Features
//!
//! - [`ManualExecutor`]: An executor that queues tasks until the test runs them
//! - [`CallLog`]: A shared, ordered log of handler calls
//! - [`CountingListener`]: A listener that counts events of one type

use skitter_core::{Declarations, Event, Executor, Listener, Preference, Task};
use std::{
    collections::VecDeque,
    marker::PhantomData,
    sync::{
        Arc, Mutex,
        atomic::{AtomicUsize, Ordering},
    },
};

// ============================================================================
// Manual Executor
// ============================================================================

/// An executor that holds submitted tasks until told to run them.
///
/// Lets a test observe exactly which handlers were handed off to the main
/// thread or the pool, and when. Clones share the same queue.
///
/// # Example
///
/// ```rust,ignore
/// let pool = ManualExecutor::new();
/// let bus = EventBus::builder().pool_executor(pool.clone()).build();
///
/// bus.dispatch(Ping);
/// assert_eq!(pool.pending(), 1);
/// assert_eq!(pool.run_all(), 1);
/// ```
#[derive(Clone, Default)]
pub struct ManualExecutor {
    queue: Arc<Mutex<VecDeque<Task>>>,
    submitted: Arc<AtomicUsize>,
}

impl ManualExecutor {
    /// Create an empty executor.
    pub fn new() -> Self {
        Self::default()
    }

    /// Tasks waiting to run.
    pub fn pending(&self) -> usize {
        self.queue.lock().unwrap().len()
    }

    /// Tasks submitted since creation, run or not.
    pub fn submitted(&self) -> usize {
        self.submitted.load(Ordering::SeqCst)
    }

    /// Run the oldest pending task. Returns `false` if there was none.
    pub fn run_one(&self) -> bool {
        // Release the lock first: the task may submit more work.
        let task = self.queue.lock().unwrap().pop_front();
        match task {
            Some(task) => {
                task();
                true
            }
            None => false,
        }
    }

    /// Run pending tasks, including ones they submit, until none remain.
    /// Returns how many ran.
    pub fn run_all(&self) -> usize {
        let mut ran = 0;
        while self.run_one() {
            ran += 1;
        }
        ran
    }

    /// Drop every pending task without running it.
    pub fn discard(&self) -> usize {
        let mut queue = self.queue.lock().unwrap();
        let count = queue.len();
        queue.clear();
        count
    }
}

impl Executor for ManualExecutor {
    fn execute(&self, task: Task) {
        self.submitted.fetch_add(1, Ordering::SeqCst);
        self.queue.lock().unwrap().push_back(task);
    }
}

// ============================================================================
// Call Log
// ============================================================================

/// An ordered log of handler calls, shared between clones.
///
/// # Example
///
/// ```rust,ignore
/// let log = CallLog::new();
/// let listener = Arc::new(Recorder { log: log.clone() });
///
/// bus.subscribe(&listener)?;
/// bus.dispatch(Ping);
/// assert_eq!(log.entries(), ["first", "second"]);
/// ```
#[derive(Clone, Default)]
pub struct CallLog {
    entries: Arc<Mutex<Vec<String>>>,
}

impl CallLog {
    /// Create an empty log.
    pub fn new() -> Self {
        Self::default()
    }

    /// Append an entry.
    pub fn record(&self, entry: impl Into<String>) {
        self.entries.lock().unwrap().push(entry.into());
    }

    /// A copy of the entries, oldest first.
    pub fn entries(&self) -> Vec<String> {
        self.entries.lock().unwrap().clone()
    }

    /// Number of entries.
    pub fn count(&self) -> usize {
        self.entries.lock().unwrap().len()
    }

    /// Number of entries equal to `entry`.
    pub fn count_of(&self, entry: &str) -> usize {
        self.entries
            .lock()
            .unwrap()
            .iter()
            .filter(|e| e.as_str() == entry)
            .count()
    }

    /// Returns `true` if any entry equals `entry`.
    pub fn contains(&self, entry: &str) -> bool {
        self.count_of(entry) > 0
    }

    /// Remove all entries.
    pub fn clear(&self) {
        self.entries.lock().unwrap().clear();
    }
}

impl std::fmt::Debug for CallLog {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_list().entries(self.entries()).finish()
    }
}

// ============================================================================
// Counting Listener
// ============================================================================

/// A listener that counts the events of type `E` it receives.
///
/// Its single handler runs on the dispatching thread at the default
/// priority, so counts are up to date when `dispatch` returns.
pub struct CountingListener<E> {
    count: AtomicUsize,
    _event: PhantomData<fn(&E)>,
}

impl<E: Event> CountingListener<E> {
    /// Create a listener with a zero count.
    pub fn new() -> Self {
        Self {
            count: AtomicUsize::new(0),
            _event: PhantomData,
        }
    }

    /// Events received so far.
    pub fn count(&self) -> usize {
        self.count.load(Ordering::SeqCst)
    }

    /// Reset the count to zero.
    pub fn reset(&self) {
        self.count.store(0, Ordering::SeqCst);
    }

    fn on_event(&self, _event: &E) {
        self.count.fetch_add(1, Ordering::SeqCst);
    }
}

impl<E: Event> Default for CountingListener<E> {
    fn default() -> Self {
        Self::new()
    }
}

impl<E: Event> Listener for CountingListener<E> {
    fn declare(handlers: &mut Declarations<Self>) {
        handlers
            .on::<E, _, _>("on_event", Self::on_event)
            .preference(Preference::Caller);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_manual_executor_defers() {
        let executor = ManualExecutor::new();
        let log = CallLog::new();

        let sink = log.clone();
        executor.execute(Box::new(move || sink.record("task")));
        assert_eq!(executor.pending(), 1);
        assert_eq!(log.count(), 0);

        assert_eq!(executor.run_all(), 1);
        assert_eq!(log.entries(), ["task"]);
        assert_eq!(executor.submitted(), 1);
        assert!(!executor.run_one());
    }

    #[test]
    fn test_manual_executor_nested_submit() {
        let executor = ManualExecutor::new();
        let log = CallLog::new();

        let inner = executor.clone();
        let sink = log.clone();
        executor.execute(Box::new(move || {
            sink.record("outer");
            let sink = sink.clone();
            inner.execute(Box::new(move || sink.record("inner")));
        }));

        assert_eq!(executor.run_all(), 2);
        assert_eq!(log.entries(), ["outer", "inner"]);
    }

    #[test]
    fn test_discard() {
        let executor = ManualExecutor::new();
        executor.execute(Box::new(|| panic!("never runs")));
        assert_eq!(executor.discard(), 1);
        assert_eq!(executor.run_all(), 0);
    }

    #[test]
    fn test_counting_listener_declares_one_handler() {
        struct Ping;
        impl Event for Ping {}

        let handlers = Declarations::<CountingListener<Ping>>::collect();
        assert_eq!(handlers.len(), 1);

        let counter = CountingListener::<Ping>::new();
        counter.on_event(&Ping);
        assert_eq!(counter.count(), 1);
        counter.reset();
        assert_eq!(counter.count(), 0);
    }

    #[test]
    fn test_call_log_counts() {
        let log = CallLog::new();
        log.record("a");
        log.record("b");
        log.record("a");
        assert_eq!(log.count_of("a"), 2);
        assert!(log.contains("b"));
        assert!(!log.contains("c"));
        log.clear();
        assert_eq!(log.count(), 0);
    }
}
