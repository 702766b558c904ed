//! # skitter-std
//!
//! Standard implementations for the skitter event bus.
//!
//! This crate provides:
//! - **Executors**: [`InlineExecutor`], [`WorkerPool`], [`MainQueue`], and
//!   [`TokioExecutor`] behind the `tokio` feature
//! - **Testing utilities**: [`testing::ManualExecutor`], [`testing::CallLog`]
//!
//! [`InlineExecutor`]: executor::InlineExecutor
//! [`WorkerPool`]: executor::WorkerPool
//! [`MainQueue`]: executor::MainQueue
//! [`TokioExecutor`]: executor::TokioExecutor

#![deny(clippy::wildcard_imports)]
#![warn(missing_docs)]

// Re-export core traits
pub use skitter_core;

// Modules
pub mod executor;
pub mod testing;
