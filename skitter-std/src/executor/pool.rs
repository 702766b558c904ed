//! Fixed-size worker pool backed by a crossbeam channel.

use crossbeam_channel::{Receiver, Sender, unbounded};
use skitter_core::{Executor, Task};
use std::{
    io,
    num::NonZeroUsize,
    panic::{AssertUnwindSafe, catch_unwind},
    thread::{self, JoinHandle},
};

/// A pool of OS threads pulling tasks from a shared queue.
///
/// Tasks run in submission order per worker but may complete in any order
/// across workers. A panicking task is logged and does not take its worker
/// down. Dropping the pool closes the queue, lets the workers finish what was
/// already submitted, then joins them.
///
/// # Example
///
/// ```rust,ignore
/// let pool = WorkerPool::builder().threads(4).thread_name("events").build()?;
/// let bus = EventBus::builder().pool_executor(pool).build();
/// ```
pub struct WorkerPool {
    sender: Option<Sender<Task>>,
    workers: Vec<JoinHandle<()>>,
    name: String,
}

impl WorkerPool {
    /// Create a pool with one worker per available CPU.
    pub fn new() -> io::Result<Self> {
        Self::builder().build()
    }

    /// Create a pool builder.
    pub fn builder() -> WorkerPoolBuilder {
        WorkerPoolBuilder::new()
    }

    /// Number of worker threads.
    pub fn threads(&self) -> usize {
        self.workers.len()
    }

    /// Tasks submitted but not yet picked up by a worker.
    pub fn queued(&self) -> usize {
        self.sender.as_ref().map_or(0, Sender::len)
    }

    fn work(name: &str, receiver: Receiver<Task>) {
        while let Ok(task) = receiver.recv() {
            if let Err(payload) = catch_unwind(AssertUnwindSafe(task)) {
                let message = payload
                    .downcast_ref::<&str>()
                    .map(|s| (*s).to_string())
                    .or_else(|| payload.downcast_ref::<String>().cloned())
                    .unwrap_or_default();
                tracing::error!(pool = name, %message, "Pool task panicked");
            }
        }
        tracing::trace!(pool = name, "Worker exiting");
    }
}

impl Executor for WorkerPool {
    fn execute(&self, task: Task) {
        let Some(sender) = &self.sender else {
            return;
        };
        if sender.send(task).is_err() {
            tracing::warn!(pool = %self.name, "Worker pool is shut down; task dropped");
        }
    }
}

impl Drop for WorkerPool {
    fn drop(&mut self) {
        drop(self.sender.take());
        let current = thread::current().id();
        for worker in self.workers.drain(..) {
            // A worker cannot join itself.
            if worker.thread().id() == current {
                continue;
            }
            if worker.join().is_err() {
                tracing::warn!(pool = %self.name, "Worker thread terminated abnormally");
            }
        }
    }
}

impl std::fmt::Debug for WorkerPool {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("WorkerPool")
            .field("name", &self.name)
            .field("threads", &self.workers.len())
            .finish()
    }
}

/// Builder for [`WorkerPool`].
#[derive(Debug, Clone)]
pub struct WorkerPoolBuilder {
    threads: usize,
    thread_name: String,
}

impl Default for WorkerPoolBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl WorkerPoolBuilder {
    /// Start with one worker per available CPU, named `skitter-pool`.
    pub fn new() -> Self {
        Self {
            threads: thread::available_parallelism().map_or(1, NonZeroUsize::get),
            thread_name: "skitter-pool".to_string(),
        }
    }

    /// Number of worker threads. Zero is treated as one.
    pub fn threads(mut self, threads: usize) -> Self {
        self.threads = threads.max(1);
        self
    }

    /// Thread name prefix; workers are named `{prefix}-{index}`.
    pub fn thread_name(mut self, name: impl Into<String>) -> Self {
        self.thread_name = name.into();
        self
    }

    /// Spawn the workers.
    pub fn build(self) -> io::Result<WorkerPool> {
        let (sender, receiver) = unbounded::<Task>();
        let mut pool = WorkerPool {
            sender: Some(sender),
            workers: Vec::with_capacity(self.threads),
            name: self.thread_name,
        };

        for index in 0..self.threads {
            let receiver = receiver.clone();
            let name = pool.name.clone();
            // On error `pool` is dropped, which joins the workers spawned so far.
            let worker = thread::Builder::new()
                .name(format!("{}-{index}", pool.name))
                .spawn(move || WorkerPool::work(&name, receiver))?;
            pool.workers.push(worker);
        }

        tracing::debug!(pool = %pool.name, threads = pool.workers.len(), "Worker pool started");
        Ok(pool)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::{
        Arc, Mutex,
        atomic::{AtomicUsize, Ordering},
    };

    #[test]
    fn test_runs_all_tasks_before_drop_returns() {
        let ran = Arc::new(AtomicUsize::new(0));
        {
            let pool = WorkerPool::builder().threads(3).build().unwrap();
            assert_eq!(pool.threads(), 3);
            for _ in 0..100 {
                let counter = ran.clone();
                pool.execute(Box::new(move || {
                    counter.fetch_add(1, Ordering::SeqCst);
                }));
            }
        }
        assert_eq!(ran.load(Ordering::SeqCst), 100);
    }

    #[test]
    fn test_thread_names() {
        let names = Arc::new(Mutex::new(Vec::new()));
        {
            let pool = WorkerPool::builder()
                .threads(1)
                .thread_name("bus")
                .build()
                .unwrap();
            let sink = names.clone();
            pool.execute(Box::new(move || {
                let name = thread::current().name().map(str::to_string);
                sink.lock().unwrap().push(name);
            }));
        }
        assert_eq!(*names.lock().unwrap(), vec![Some("bus-0".to_string())]);
    }

    #[test]
    fn test_panicking_task_keeps_worker() {
        let ran = Arc::new(AtomicUsize::new(0));
        {
            let pool = WorkerPool::builder().threads(1).build().unwrap();
            pool.execute(Box::new(|| panic!("boom")));
            let counter = ran.clone();
            pool.execute(Box::new(move || {
                counter.fetch_add(1, Ordering::SeqCst);
            }));
        }
        assert_eq!(ran.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_zero_threads_clamped() {
        let pool = WorkerPool::builder().threads(0).build().unwrap();
        assert_eq!(pool.threads(), 1);
    }
}
