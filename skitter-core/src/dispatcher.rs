//! Dispatcher core traits.

use crate::event::{AnyEvent, Event};
use std::sync::Arc;

/// Callback invoked when a handler cancels the event being dispatched.
pub type CanceledFn<'a> = Box<dyn FnOnce(&dyn AnyEvent) + 'a>;

/// Summary of one dispatch call.
///
/// Dispatch never fails from the publisher's point of view; this is a
/// best-effort report of what happened.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Delivery {
    /// Handlers run inside the dispatch call.
    pub invoked: usize,
    /// Handlers submitted to the main or pool executor.
    pub scheduled: usize,
    /// Synchronous handlers that returned an error or panicked.
    pub failed: usize,
    /// A handler canceled the event and delivery stopped early.
    pub canceled: bool,
    /// No handler matched the event type; catch-all handlers were used.
    pub dead: bool,
}

impl Delivery {
    /// Handlers reached, synchronously or not.
    pub fn reached(&self) -> usize {
        self.invoked + self.scheduled
    }

    /// Returns `true` if nothing at all was listening.
    pub fn is_unhandled(&self) -> bool {
        self.reached() == 0
    }
}

/// Publishes events to listeners.
///
/// Object-safe, so listeners can hold an `Arc<dyn Dispatcher>` and publish
/// follow-up events. The typed helpers live on [`DispatchExt`].
#[diagnostic::on_unimplemented(
    message = "`{Self}` cannot dispatch events",
    label = "missing `Dispatcher` implementation",
    note = "Implement `Dispatcher::dispatch_erased`."
)]
pub trait Dispatcher: Send + Sync {
    /// Dispatch a type-erased event.
    ///
    /// `on_canceled` runs if a handler cancels the event; without it the
    /// dispatcher logs a warning.
    fn dispatch_erased(
        &self,
        event: Arc<dyn AnyEvent>,
        on_canceled: Option<CanceledFn<'_>>,
    ) -> Delivery;
}

/// Typed helpers for every [`Dispatcher`], including `dyn Dispatcher`.
pub trait DispatchExt: Dispatcher {
    /// Dispatch an owned event.
    fn publish<E: Event>(&self, event: E) -> Delivery {
        self.dispatch_erased(Arc::new(event), None)
    }

    /// Dispatch an owned event with a cancellation callback.
    fn publish_with<E, F>(&self, event: E, on_canceled: F) -> Delivery
    where
        E: Event,
        F: FnOnce(&E),
    {
        self.publish_shared_with(Arc::new(event), on_canceled)
    }

    /// Dispatch a shared event; the caller keeps its handle.
    fn publish_shared<E: Event>(&self, event: Arc<E>) -> Delivery {
        self.dispatch_erased(event, None)
    }

    /// Dispatch a shared event with a cancellation callback.
    fn publish_shared_with<E, F>(&self, event: Arc<E>, on_canceled: F) -> Delivery
    where
        E: Event,
        F: FnOnce(&E),
    {
        self.dispatch_erased(event, Some(typed_callback(on_canceled)))
    }
}

impl<D: Dispatcher + ?Sized> DispatchExt for D {}

/// Adapt a typed cancellation callback to [`CanceledFn`].
pub fn typed_callback<'a, E, F>(on_canceled: F) -> CanceledFn<'a>
where
    E: Event,
    F: FnOnce(&E) + 'a,
{
    Box::new(move |event: &dyn AnyEvent| {
        if let Some(event) = event.as_any().downcast_ref::<E>() {
            on_canceled(event);
        }
    })
}

impl<D: Dispatcher + ?Sized> Dispatcher for Arc<D> {
    fn dispatch_erased(
        &self,
        event: Arc<dyn AnyEvent>,
        on_canceled: Option<CanceledFn<'_>>,
    ) -> Delivery {
        (**self).dispatch_erased(event, on_canceled)
    }
}
