//! Tokio runtime integration.

use ::tokio::runtime::Handle;
use skitter_core::{Executor, Task};

/// Runs tasks on a tokio runtime's blocking thread pool.
///
/// Handlers are synchronous, so they go through `spawn_blocking` rather than
/// occupying async worker threads.
#[derive(Debug, Clone)]
pub struct TokioExecutor {
    handle: Handle,
}

impl TokioExecutor {
    /// Use the runtime behind `handle`.
    pub fn new(handle: Handle) -> Self {
        Self { handle }
    }

    /// Use the runtime the caller is running in, if any.
    pub fn try_current() -> Option<Self> {
        Handle::try_current().ok().map(Self::new)
    }
}

impl Executor for TokioExecutor {
    fn execute(&self, task: Task) {
        drop(self.handle.spawn_blocking(task));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::{
        Arc,
        atomic::{AtomicUsize, Ordering},
    };

    #[tokio::test(flavor = "multi_thread", worker_threads = 2)]
    async fn test_spawns_on_runtime() {
        let executor = TokioExecutor::try_current().unwrap();
        let ran = Arc::new(AtomicUsize::new(0));
        let (tx, rx) = ::tokio::sync::oneshot::channel();

        let counter = ran.clone();
        executor.execute(Box::new(move || {
            counter.fetch_add(1, Ordering::SeqCst);
            let _ = tx.send(());
        }));

        rx.await.unwrap();
        assert_eq!(ran.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_no_runtime() {
        assert!(TokioExecutor::try_current().is_none());
    }
}
