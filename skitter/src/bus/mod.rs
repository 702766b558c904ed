//! # Event Bus
//!
//! [`EventBus`] owns the listener registry and the dispatch engine.
//!
//! Subscribing a listener instance binds each of its declared handlers to
//! the instance and files the binding under the handler's event type, sorted
//! by priority (higher first). Dispatching an event walks the bindings of the
//! event's concrete type in that order, falling back to catch-all handlers
//! (`dyn AnyEvent`) when nobody handles the type.
//!
//! Each binding runs according to its effective [`Preference`]:
//!
//! | Preference | Runs |
//! |------------|------|
//! | `Caller`, `Dispatch` | inside `dispatch`, on the calling thread |
//! | `Main` | on the main executor |
//! | `Pool` | on the pool executor; inline for cancelable events |
//!
//! [`Preference`]: skitter_core::Preference

mod builder;
mod dispatch;
mod registry;

pub use builder::{BusConfig, DEFAULT_SWEEP_EVERY, EventBusBuilder};

use registry::{Binding, Registry};
use skitter_core::{
    AnyEvent, CanceledFn, ConfigError, Declarations, Delivery, Dispatcher, Event, EventKey,
    Executor, Listener, Owner, OwnerId, Ownership, typed_callback,
};
use std::{
    fmt,
    sync::{
        Arc,
        atomic::{AtomicBool, AtomicUsize},
    },
};

/// Result of a successful subscribe call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Subscription {
    /// Identity of the subscribed instance.
    pub owner: OwnerId,
    /// Bindings created.
    pub added: usize,
    /// Declarations already bound to this instance.
    pub skipped: usize,
}

/// A typed in-process publish/subscribe dispatcher.
///
/// `EventBus` is `Send + Sync`; share it behind an `Arc`.
///
/// # Example
///
/// ```rust,ignore
/// let bus = EventBus::builder().main_executor(main.clone()).build();
///
/// let chat = Arc::new(ChatLog::default());
/// bus.subscribe(&chat)?;
///
/// let delivery = bus.dispatch(Message { text: "hi".into() });
/// assert_eq!(delivery.reached(), 1);
/// ```
pub struct EventBus {
    registry: Arc<Registry>,
    config: BusConfig,
    main: Arc<dyn Executor>,
    pool: Arc<dyn Executor>,
    dispatches: AtomicUsize,
    sweep_pending: Arc<AtomicBool>,
}

impl EventBus {
    /// Create a bus with the default configuration: inline main executor,
    /// a [`WorkerPool`](skitter_std::executor::WorkerPool) for pool handlers.
    pub fn new() -> Self {
        Self::builder().build()
    }

    /// Create a bus builder.
    pub fn builder() -> EventBusBuilder {
        EventBusBuilder::new()
    }

    /// The bus configuration.
    pub fn config(&self) -> &BusConfig {
        &self.config
    }

    // ------------------------------------------------------------------
    // Registration
    // ------------------------------------------------------------------

    /// Bind every handler of `listener` with the default ownership.
    ///
    /// Subscribing the same instance again adds nothing. On error, handlers
    /// declared before the failing one stay bound.
    pub fn subscribe<L: Listener>(&self, listener: &Arc<L>) -> Result<Subscription, ConfigError> {
        self.subscribe_with(listener, self.config.default_ownership)
    }

    /// Bind every handler of `listener`, keeping it alive until unsubscribed.
    pub fn subscribe_strong<L: Listener>(
        &self,
        listener: &Arc<L>,
    ) -> Result<Subscription, ConfigError> {
        self.subscribe_with(listener, Ownership::Strong)
    }

    /// Bind every handler of `listener` without keeping it alive.
    ///
    /// Once the last `Arc` is dropped its handlers stop running and its
    /// bindings are swept.
    pub fn subscribe_weak<L: Listener>(
        &self,
        listener: &Arc<L>,
    ) -> Result<Subscription, ConfigError> {
        self.subscribe_with(listener, Ownership::Weak)
    }

    /// Bind every handler of `listener` with the given ownership.
    pub fn subscribe_with<L: Listener>(
        &self,
        listener: &Arc<L>,
        ownership: Ownership,
    ) -> Result<Subscription, ConfigError> {
        let owner = Owner::new(listener, ownership);
        let mut subscription = Subscription {
            owner: owner.id(),
            added: 0,
            skipped: 0,
        };

        for declaration in &Declarations::<L>::collect() {
            let invoker = declaration
                .bind(owner.clone(), self.config.invoker_strategy)
                .inspect_err(|err| tracing::warn!(%err, "Subscribe rejected"))?;

            let inserted = self.registry.insert(Binding {
                owner: subscription.owner,
                handler: declaration.id(),
                key: declaration.key(),
                preference: declaration.effective_preference(),
                priority: declaration.priority(),
                cancelable: declaration.is_cancelable(),
                invoker,
            });
            if inserted {
                subscription.added += 1;
            } else {
                subscription.skipped += 1;
            }
        }

        tracing::debug!(
            listener = std::any::type_name::<L>(),
            owner = %subscription.owner,
            ?ownership,
            added = subscription.added,
            skipped = subscription.skipped,
            "Subscribed"
        );
        Ok(subscription)
    }

    /// Remove every binding of `listener`. Returns how many were removed.
    pub fn unsubscribe<L>(&self, listener: &Arc<L>) -> usize {
        self.unsubscribe_id(OwnerId::of(listener))
    }

    /// Remove every binding of the instance identified by `owner`.
    pub fn unsubscribe_id(&self, owner: OwnerId) -> usize {
        let removed = self.registry.remove_owner(owner);
        tracing::debug!(%owner, removed, "Unsubscribed");
        removed
    }

    /// Remove bindings of weakly held listeners that have been dropped.
    /// Returns how many were removed.
    ///
    /// Also runs on the pool after a dispatch meets a released listener and
    /// every [`BusConfig::sweep_every`] dispatches.
    pub fn sweep(&self) -> usize {
        let removed = self.registry.sweep();
        tracing::debug!(removed, "Swept released listeners");
        removed
    }

    /// Remove every binding.
    pub fn clear(&self) {
        self.registry.clear();
    }

    // ------------------------------------------------------------------
    // Introspection
    // ------------------------------------------------------------------

    /// Total number of bindings across all event types.
    pub fn binding_count(&self) -> usize {
        self.registry.len()
    }

    /// Number of bindings for event type `E`, excluding catch-all handlers.
    pub fn listener_count<E: Event>(&self) -> usize {
        self.registry.count(EventKey::of::<E>())
    }

    /// Returns `true` if dispatching `E` would reach a handler of `E` itself.
    pub fn has_listeners<E: Event>(&self) -> bool {
        self.listener_count::<E>() > 0
    }

    /// Returns `true` if `listener` has at least one binding.
    pub fn is_subscribed<L>(&self, listener: &Arc<L>) -> bool {
        self.registry.contains_owner(OwnerId::of(listener))
    }

    // ------------------------------------------------------------------
    // Dispatch
    // ------------------------------------------------------------------

    /// Deliver `event` to its listeners.
    ///
    /// If a handler cancels the event, delivery stops and a warning is logged.
    pub fn dispatch<E: Event>(&self, event: E) -> Delivery {
        self.deliver(Arc::new(event), None)
    }

    /// Deliver `event`, calling `on_canceled` if a handler cancels it.
    pub fn dispatch_with<E, F>(&self, event: E, on_canceled: F) -> Delivery
    where
        E: Event,
        F: FnOnce(&E),
    {
        self.dispatch_shared_with(Arc::new(event), on_canceled)
    }

    /// Deliver a shared event. The caller keeps its handle, so the same
    /// instance can be inspected or dispatched again.
    pub fn dispatch_shared<E: Event>(&self, event: Arc<E>) -> Delivery {
        self.deliver(event, None)
    }

    /// Deliver a shared event, calling `on_canceled` if a handler cancels it.
    pub fn dispatch_shared_with<E, F>(&self, event: Arc<E>, on_canceled: F) -> Delivery
    where
        E: Event,
        F: FnOnce(&E),
    {
        self.deliver(event, Some(typed_callback(on_canceled)))
    }
}

impl Default for EventBus {
    fn default() -> Self {
        Self::new()
    }
}

impl Dispatcher for EventBus {
    fn dispatch_erased(
        &self,
        event: Arc<dyn AnyEvent>,
        on_canceled: Option<CanceledFn<'_>>,
    ) -> Delivery {
        self.deliver(event, on_canceled)
    }
}

impl fmt::Debug for EventBus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EventBus")
            .field("config", &self.config)
            .field("bindings", &self.registry.len())
            .finish_non_exhaustive()
    }
}
