//! Ready-made [`Executor`](skitter_core::Executor) implementations.
//!
//! | Executor | Runs tasks |
//! |----------|------------|
//! | [`InlineExecutor`] | immediately, on the submitting thread |
//! | [`WorkerPool`] | on a fixed set of named OS threads |
//! | [`MainQueue`] | when the owning thread calls [`MainQueue::run_pending`] |
//! | [`TokioExecutor`] | on a tokio runtime's blocking pool (feature `tokio`) |

mod inline;
mod main_queue;
mod pool;
#[cfg(feature = "tokio")]
mod tokio;

pub use inline::InlineExecutor;
pub use main_queue::MainQueue;
pub use pool::{WorkerPool, WorkerPoolBuilder};
#[cfg(feature = "tokio")]
pub use self::tokio::TokioExecutor;
