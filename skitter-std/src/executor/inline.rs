//! Executor that runs tasks on the submitting thread.

use skitter_core::{Executor, Task};

/// Runs every task immediately, inside `execute`.
///
/// Useful as a main-thread executor in single-threaded programs and in tests
/// that want `Main` and `Pool` handlers to complete before `dispatch` returns.
#[derive(Debug, Clone, Copy, Default)]
pub struct InlineExecutor;

impl Executor for InlineExecutor {
    fn execute(&self, task: Task) {
        task();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::{
        Arc,
        atomic::{AtomicBool, Ordering},
    };

    #[test]
    fn test_runs_before_returning() {
        let ran = Arc::new(AtomicBool::new(false));
        let flag = ran.clone();
        InlineExecutor.execute(Box::new(move || flag.store(true, Ordering::SeqCst)));
        assert!(ran.load(Ordering::SeqCst));
    }
}
