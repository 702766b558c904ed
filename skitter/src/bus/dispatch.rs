//! Dispatch engine: routes one event through a bucket snapshot.

use super::{EventBus, registry::Binding};
use skitter_core::{
    AnyEvent, CancelState, CanceledFn, ClearOnDrop, Delivery, EventKey, Executor, InvokeError,
    Preference,
};
use std::{
    panic::{AssertUnwindSafe, catch_unwind},
    sync::{Arc, atomic::Ordering},
};

impl EventBus {
    pub(super) fn deliver(
        &self,
        event: Arc<dyn AnyEvent>,
        mut on_canceled: Option<CanceledFn<'_>>,
    ) -> Delivery {
        // Cleared on every exit, including unwinding out of a callback.
        let _clear = ClearOnDrop::new(event.cancellation());

        let count = self.dispatches.fetch_add(1, Ordering::Relaxed) + 1;
        let periodic = self.config.sweep_every > 0 && count % self.config.sweep_every == 0;

        let (bindings, dead) = match self.registry.snapshot(event.event_key()) {
            Some(bindings) => (Some(bindings), false),
            None => (self.registry.snapshot(EventKey::catch_all()), true),
        };
        let mut delivery = Delivery {
            dead,
            ..Delivery::default()
        };
        let Some(bindings) = bindings else {
            tracing::trace!(event = event.event_name(), "No listeners");
            if periodic {
                self.schedule_sweep();
            }
            return delivery;
        };

        let mut released = false;
        for binding in bindings.iter() {
            tracing::trace!(
                event = event.event_name(),
                handler = %binding.handler,
                preference = binding.preference.as_str(),
                "Routing"
            );
            // Cancelable pool handlers run inline so their cancel is observed.
            let inline = binding.preference.is_synchronous()
                || (binding.cancelable && binding.preference == Preference::Pool);
            if inline {
                match invoke(binding, event.as_ref()) {
                    Ok(()) => delivery.invoked += 1,
                    Err(InvokeError::OwnerReleased) => released = true,
                    Err(err) => {
                        delivery.invoked += 1;
                        delivery.failed += 1;
                        report(binding, event.as_ref(), &err);
                    }
                }
            } else {
                let executor: &dyn Executor = match binding.preference {
                    Preference::Main => self.main.as_ref(),
                    _ => self.pool.as_ref(),
                };
                self.schedule(executor, binding, &event);
                delivery.scheduled += 1;
            }

            if binding.cancelable && event.cancellation().is_some_and(CancelState::is_canceled) {
                delivery.canceled = true;
                match on_canceled.take() {
                    Some(callback) => callback(event.as_ref()),
                    None => tracing::warn!(
                        "Event {} was canceled without registering a callback in dispatch",
                        event.event_name()
                    ),
                }
                break;
            }
        }

        if released || periodic {
            self.schedule_sweep();
        }

        delivery
    }

    fn schedule(&self, executor: &dyn Executor, binding: &Arc<Binding>, event: &Arc<dyn AnyEvent>) {
        let binding = Arc::clone(binding);
        let event = Arc::clone(event);
        executor.execute(Box::new(move || {
            // Off the dispatch call: a cancel here must not reach a later dispatch.
            match CancelState::detached(|| invoke(&binding, event.as_ref())) {
                Ok(()) => {}
                Err(InvokeError::OwnerReleased) => {
                    tracing::trace!(handler = %binding.handler, "Listener released before task ran");
                }
                Err(err) => report(&binding, event.as_ref(), &err),
            }
        }));
    }

    /// Submit one sweep to the pool unless one is already queued.
    pub(super) fn schedule_sweep(&self) {
        if self.sweep_pending.swap(true, Ordering::AcqRel) {
            return;
        }
        let registry = Arc::clone(&self.registry);
        let pending = Arc::clone(&self.sweep_pending);
        self.pool.execute(Box::new(move || {
            pending.store(false, Ordering::Release);
            let removed = registry.sweep();
            if removed > 0 {
                tracing::debug!(removed, "Swept released listeners");
            }
        }));
    }
}

fn invoke(binding: &Binding, event: &dyn AnyEvent) -> Result<(), InvokeError> {
    catch_unwind(AssertUnwindSafe(|| binding.invoker.invoke(event)))
        .unwrap_or_else(|payload| Err(InvokeError::from_panic(payload)))
}

fn report(binding: &Binding, event: &dyn AnyEvent, err: &InvokeError) {
    tracing::error!(
        listener = binding.handler.owner_name(),
        handler = binding.handler.method(),
        event = event.event_name(),
        error = %err,
        "Handler failed"
    );
}
