//! Execution contexts for `Main` and `Pool` handlers.
//!
//! The bus never spawns threads itself. The embedding application injects one
//! executor for its main thread and one for background work; `skitter-std`
//! ships ready-made implementations.

/// A unit of work submitted to an executor.
pub type Task = Box<dyn FnOnce() + Send + 'static>;

/// Runs submitted tasks, fire-and-forget.
///
/// Closures `Fn(Task)` are executors too, so `|task: Task| task()` runs
/// everything inline.
#[diagnostic::on_unimplemented(
    message = "`{Self}` is not an Executor",
    label = "missing `Executor` implementation",
    note = "Implement `Executor::execute`, or pass a closure `Fn(Task) + Send + Sync`."
)]
pub trait Executor: Send + Sync + 'static {
    /// Submit `task`. No result is propagated back to the caller.
    fn execute(&self, task: Task);
}

impl<F> Executor for F
where
    F: Fn(Task) + Send + Sync + 'static,
{
    fn execute(&self, task: Task) {
        (self)(task)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::{
        Arc,
        atomic::{AtomicUsize, Ordering},
    };

    #[test]
    fn test_closure_executor() {
        let ran = Arc::new(AtomicUsize::new(0));
        let executor = |task: Task| task();
        let counter = ran.clone();
        executor.execute(Box::new(move || {
            counter.fetch_add(1, Ordering::SeqCst);
        }));
        assert_eq!(ran.load(Ordering::SeqCst), 1);
    }
}
