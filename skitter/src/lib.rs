//! # skitter - Typed In-Process Event Bus
//!
//! `skitter` delivers events to listener methods by the event's concrete
//! type. Handlers are ordered by priority, run on the thread their
//! [`Preference`] asks for, and may cancel delivery of cancelable events.
//! Events nobody handles go to catch-all (`dyn AnyEvent`) handlers.
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use skitter::prelude::*;
//!
//! #[derive(Event)]
//! #[event(cancelable)]
//! struct Chat {
//!     text: String,
//!     state: CancelState,
//! }
//!
//! struct Moderation;
//!
//! #[listener]
//! impl Moderation {
//!     #[subscribe(Caller, priority = 200)]
//!     pub fn filter(&self, chat: &Chat) {
//!         if chat.text.contains("spam") {
//!             chat.cancel();
//!         }
//!     }
//! }
//!
//! let bus = EventBus::new();
//! bus.subscribe(&Arc::new(Moderation))?;
//! bus.dispatch_with(Chat { text: "spam".into(), state: CancelState::new() }, |chat| {
//!     println!("dropped: {}", chat.text);
//! });
//! ```

#![deny(clippy::wildcard_imports)]
#![warn(missing_docs)]

mod bus;

pub use bus::{BusConfig, DEFAULT_SWEEP_EVERY, EventBus, EventBusBuilder, Subscription};

// Events
pub use skitter_core::{AnyEvent, CancelState, Cancelable, Event, EventKey};

// Listeners
pub use skitter_core::{
    DEFAULT_PRIORITY, Declaration, Declarations, ErasedHandler, HandlerId, HandlerSpec,
    IntoHandlerResult, InvokerStrategy, Listener, OwnerId, Ownership, Preference,
};

// Dispatch
pub use skitter_core::{CanceledFn, Delivery, DispatchExt, Dispatcher};

// Execution
pub use skitter_core::{Executor, Task};

// Errors
pub use skitter_core::{BoxError, ConfigError, Error, InvokeError};

/// Standard executors.
pub mod executor {
    pub use skitter_std::executor::{InlineExecutor, MainQueue, WorkerPool, WorkerPoolBuilder};

    #[cfg(feature = "tokio")]
    pub use skitter_std::executor::TokioExecutor;
}

/// Testing utilities.
pub mod testing {
    pub use skitter_std::testing::{CallLog, CountingListener, ManualExecutor};
}

/// Prelude module - common imports for skitter.
///
/// # Usage
///
/// ```rust,ignore
/// use skitter::prelude::*;
/// ```
pub mod prelude {
    pub use crate::{
        AnyEvent, CancelState, Cancelable, ConfigError, Declarations, Delivery, DispatchExt,
        Dispatcher, Event, EventBus, Listener, Ownership, Preference,
    };
    pub use std::sync::Arc;

    #[cfg(feature = "macros")]
    pub use crate::listener;
}

#[cfg(feature = "macros")]
pub use skitter_macros::{Event, listener};
