//! # skitter-core
//!
//! Core traits for the skitter typed event bus.
//!
//! This crate has minimal dependencies and is meant to be imported by
//! libraries that declare events and listeners without depending on a
//! concrete bus or executor implementation.
//!
//! # Building Blocks
//!
//! ## Events ([`Event`])
//!
//! Any `Send + Sync + 'static` type can be an event. An event type may fix
//! the execution preference of all of its handlers and may be [`Cancelable`],
//! carrying a per-instance [`CancelState`].
//!
//! ## Listeners ([`Listener`])
//!
//! A listener type declares its handler methods once, in a [`Declarations`]
//! table. Each declaration names an event type, a priority (higher runs
//! first) and a [`Preference`]. Declaring a handler against `dyn AnyEvent`
//! makes it a dead-event handler.
//!
//! ## Invokers ([`Invoker`])
//!
//! Subscribing a listener instance binds every declaration to it, producing
//! one invoker per handler. How invokers are built is selected with
//! [`InvokerStrategy`]; the observable behavior is identical.
//!
//! ## Dispatchers ([`Dispatcher`])
//!
//! The object-safe publishing interface. [`DispatchExt`] adds typed helpers.
//!
//! ## Executors ([`Executor`])
//!
//! Fire-and-forget task sinks injected into a bus for `Main` and `Pool`
//! handlers.
//!
//! # Error Types
//!
//! - [`Error`] - Top-level error type
//! - [`ConfigError`] - Subscribe-time errors
//! - [`InvokeError`] - Per-invocation errors

#![deny(clippy::wildcard_imports)]
#![warn(missing_docs)]

mod cancel;
mod dispatcher;
mod error;
mod event;
mod executor;
mod invoker;
mod listener;
mod preference;

// Re-exports
pub use cancel::{CancelState, Cancelable, ClearOnDrop};
pub use dispatcher::{CanceledFn, Delivery, DispatchExt, Dispatcher, typed_callback};
pub use error::{BoxError, ConfigError, Error, InvokeError};
pub use event::{AnyEvent, Event, EventKey};
pub use executor::{Executor, Task};
pub use invoker::{
    CatchAll, DirectInvoker, ErasedHandler, HandlerFn, IntoHandlerResult, Invoker,
    InvokerStrategy, Owner, OwnerId, Projected, SpecializedInvoker, Thunk, Typed, bind,
};
pub use listener::{
    DEFAULT_PRIORITY, Declaration, Declarations, HandlerId, HandlerSpec, Listener,
};
pub use preference::{Ownership, Preference};
