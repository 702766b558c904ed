//! Executor draining on a designated thread.

use crossbeam_channel::{Receiver, Sender, unbounded};
use skitter_core::{Executor, Task};
use std::time::{Duration, Instant};

/// A task queue owned by the application's main thread.
///
/// The bus submits `Main` handlers here; they run when the owning thread
/// calls [`run_pending`](Self::run_pending), typically once per iteration of
/// its event loop. Clones share the same queue.
///
/// # Example
///
/// ```rust,ignore
/// let main = MainQueue::new();
/// let bus = EventBus::builder().main_executor(main.clone()).build();
///
/// loop {
///     // ... render, poll input ...
///     main.run_pending();
/// }
/// ```
#[derive(Clone)]
pub struct MainQueue {
    sender: Sender<Task>,
    receiver: Receiver<Task>,
}

impl MainQueue {
    /// Create an empty queue.
    pub fn new() -> Self {
        let (sender, receiver) = unbounded();
        Self { sender, receiver }
    }

    /// Number of tasks waiting to run.
    pub fn pending(&self) -> usize {
        self.receiver.len()
    }

    /// Run every task queued so far. Returns how many ran.
    ///
    /// Tasks queued while draining run in the same call.
    pub fn run_pending(&self) -> usize {
        let mut ran = 0;
        while let Ok(task) = self.receiver.try_recv() {
            task();
            ran += 1;
        }
        ran
    }

    /// Wait up to `timeout` for tasks and run them until the queue is empty
    /// or the timeout elapses. Returns how many ran.
    pub fn run_for(&self, timeout: Duration) -> usize {
        let deadline = Instant::now() + timeout;
        let mut ran = 0;
        while let Ok(task) = self.receiver.recv_deadline(deadline) {
            task();
            ran += 1;
            if self.receiver.is_empty() {
                break;
            }
        }
        ran
    }
}

impl Default for MainQueue {
    fn default() -> Self {
        Self::new()
    }
}

impl Executor for MainQueue {
    fn execute(&self, task: Task) {
        // The queue holds its own receiver, so sending cannot fail.
        let _ = self.sender.send(task);
    }
}

impl std::fmt::Debug for MainQueue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MainQueue")
            .field("pending", &self.pending())
            .finish()
    }
}
