//! # Listener Declarations
//!
//! A [`Listener`] describes its handler methods once, per type, by filling a
//! [`Declarations`] table. The registry reads that table when an instance is
//! subscribed and binds every entry to the instance.
//!
//! Each declaration records the event type it handles, its priority, its
//! execution preference, and whether the method is externally invocable.
//! The `#[listener]` attribute macro generates `declare` from
//! `#[subscribe]`-annotated methods; writing it by hand is equally supported.
//!
//! # Example
//!
//! ```rust,ignore
//! struct Chat { log: Mutex<Vec<String>> }
//!
//! impl Chat {
//!     fn on_message(&self, event: &Message) { /* ... */ }
//!     fn on_anything(&self, event: &dyn AnyEvent) { /* ... */ }
//! }
//!
//! impl Listener for Chat {
//!     fn declare(handlers: &mut Declarations<Self>) {
//!         handlers
//!             .on("on_message", Self::on_message)
//!             .priority(10)
//!             .preference(Preference::Caller);
//!         handlers.on_any("on_anything", Self::on_anything);
//!     }
//! }
//! ```

use crate::{
    error::ConfigError,
    event::{AnyEvent, Event, EventKey},
    invoker::{
        self, CatchAll, ErasedHandler, HandlerFn, IntoHandlerResult, Invoker, InvokerStrategy,
        Owner, Typed,
    },
    preference::Preference,
};
use std::{any::TypeId, fmt, sync::Arc};

/// Priority given to handlers that do not set one.
pub const DEFAULT_PRIORITY: i32 = 100;

/// A type whose instances can be subscribed to a bus.
#[diagnostic::on_unimplemented(
    message = "`{Self}` is not a Listener",
    label = "missing `Listener` implementation",
    note = "Annotate the impl block with `#[listener]`, or implement `Listener::declare` by hand."
)]
pub trait Listener: Send + Sync + Sized + 'static {
    /// Declare every handler method of this type.
    fn declare(handlers: &mut Declarations<Self>);
}

/// Identity of a handler method: declaring type plus method name.
///
/// Inherited handlers keep the identity of the type that declared them.
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub struct HandlerId {
    owner: TypeId,
    owner_name: &'static str,
    method: &'static str,
}

impl HandlerId {
    /// Handler `method` declared by `L`.
    pub fn new<L: 'static>(method: &'static str) -> Self {
        Self {
            owner: TypeId::of::<L>(),
            owner_name: std::any::type_name::<L>(),
            method,
        }
    }

    /// Type name of the declaring listener.
    pub fn owner_name(&self) -> &'static str {
        self.owner_name
    }

    /// Method name.
    pub fn method(&self) -> &'static str {
        self.method
    }
}

impl fmt::Debug for HandlerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "HandlerId({}::{})", self.owner_name, self.method)
    }
}

impl fmt::Display for HandlerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}::{}", self.owner_name, self.method)
    }
}

/// One declared handler of listener `L`.
pub struct Declaration<L> {
    key: EventKey,
    id: HandlerId,
    priority: i32,
    preference: Preference,
    event_preference: Option<Preference>,
    cancelable: bool,
    accessible: bool,
    handler: HandlerFn<L>,
}

impl<L: Send + Sync + 'static> Declaration<L> {
    /// Event type this handler is registered under.
    pub fn key(&self) -> EventKey {
        self.key
    }

    /// Handler identity.
    pub fn id(&self) -> HandlerId {
        self.id
    }

    /// Higher runs earlier.
    pub fn priority(&self) -> i32 {
        self.priority
    }

    /// Preference declared on the handler.
    pub fn preference(&self) -> Preference {
        self.preference
    }

    /// Preference fixed by the event type wins over the handler's own.
    pub fn effective_preference(&self) -> Preference {
        self.event_preference.unwrap_or(self.preference)
    }

    /// Whether the handled event type is cancelable.
    pub fn is_cancelable(&self) -> bool {
        self.cancelable
    }

    /// Whether the method may be invoked from outside its type.
    pub fn is_accessible(&self) -> bool {
        self.accessible
    }

    /// The callable behind this declaration.
    pub fn handler(&self) -> &HandlerFn<L> {
        &self.handler
    }

    /// Bind this handler to `owner`.
    pub fn bind(
        &self,
        owner: Owner<L>,
        strategy: InvokerStrategy,
    ) -> Result<Arc<dyn Invoker>, ConfigError> {
        if !self.accessible {
            return Err(ConfigError::Inaccessible {
                listener: self.id.owner_name,
                handler: self.id.method,
            });
        }
        invoker::bind(owner, self.key, &self.handler, strategy).ok_or(
            ConfigError::InvokerUnavailable {
                listener: self.id.owner_name,
                handler: self.id.method,
                strategy: strategy.as_str(),
            },
        )
    }
}

impl<L> fmt::Debug for Declaration<L> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Declaration")
            .field("key", &self.key)
            .field("id", &self.id)
            .field("priority", &self.priority)
            .field("preference", &self.preference)
            .field("accessible", &self.accessible)
            .finish_non_exhaustive()
    }
}

/// The handler table of listener `L`, in declaration order.
pub struct Declarations<L> {
    items: Vec<Declaration<L>>,
}

impl<L: Listener> Declarations<L> {
    /// Collect the declarations of `L`.
    pub fn collect() -> Self {
        let mut handlers = Self { items: Vec::new() };
        L::declare(&mut handlers);
        handlers
    }
}

impl<L: Send + Sync + 'static> Declarations<L> {
    /// Declare a handler for events of type `E`.
    pub fn on<E, F, R>(&mut self, method: &'static str, handler: F) -> HandlerSpec<'_, L>
    where
        E: Event,
        F: Fn(&L, &E) -> R + Send + Sync + 'static,
        R: IntoHandlerResult,
    {
        self.push(Declaration {
            key: EventKey::of::<E>(),
            id: HandlerId::new::<L>(method),
            priority: DEFAULT_PRIORITY,
            preference: Preference::default(),
            event_preference: E::PREFERENCE,
            cancelable: E::CANCELABLE,
            accessible: true,
            handler: HandlerFn::Specialized(Arc::new(Typed::<E, F>::new(handler))),
        })
    }

    /// Declare a handler for events no other handler receives.
    pub fn on_any<F, R>(&mut self, method: &'static str, handler: F) -> HandlerSpec<'_, L>
    where
        F: Fn(&L, &dyn AnyEvent) -> R + Send + Sync + 'static,
        R: IntoHandlerResult,
    {
        self.push(Declaration {
            key: EventKey::catch_all(),
            id: HandlerId::new::<L>(method),
            priority: DEFAULT_PRIORITY,
            preference: Preference::default(),
            event_preference: None,
            cancelable: false,
            accessible: true,
            handler: HandlerFn::Specialized(Arc::new(CatchAll::new(handler))),
        })
    }

    /// Declare a handler for `E` available only in type-erased form.
    ///
    /// Such handlers bind under [`InvokerStrategy::Direct`] only.
    pub fn erased<E: Event>(
        &mut self,
        method: &'static str,
        handler: ErasedHandler<L>,
    ) -> HandlerSpec<'_, L> {
        self.push(Declaration {
            key: EventKey::of::<E>(),
            id: HandlerId::new::<L>(method),
            priority: DEFAULT_PRIORITY,
            preference: Preference::default(),
            event_preference: E::PREFERENCE,
            cancelable: E::CANCELABLE,
            accessible: true,
            handler: HandlerFn::Erased(handler),
        })
    }

    /// Include every handler declared by `B`, which `L` embeds.
    pub fn inherit<B: Listener>(&mut self, project: fn(&L) -> &B) -> &mut Self {
        for base in Declarations::<B>::collect().items {
            self.items.push(Declaration {
                key: base.key,
                id: base.id,
                priority: base.priority,
                preference: base.preference,
                event_preference: base.event_preference,
                cancelable: base.cancelable,
                accessible: base.accessible,
                handler: base.handler.project(project),
            });
        }
        self
    }

    fn push(&mut self, declaration: Declaration<L>) -> HandlerSpec<'_, L> {
        self.items.push(declaration);
        let index = self.items.len() - 1;
        HandlerSpec {
            declaration: &mut self.items[index],
        }
    }
}

impl<L> Declarations<L> {
    /// Iterate in declaration order.
    pub fn iter(&self) -> std::slice::Iter<'_, Declaration<L>> {
        self.items.iter()
    }

    /// Number of declared handlers.
    pub fn len(&self) -> usize {
        self.items.len()
    }

    /// Returns `true` if `L` declares no handlers.
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}

impl<'a, L> IntoIterator for &'a Declarations<L> {
    type Item = &'a Declaration<L>;
    type IntoIter = std::slice::Iter<'a, Declaration<L>>;

    fn into_iter(self) -> Self::IntoIter {
        self.items.iter()
    }
}

/// Builder over a freshly declared handler.
pub struct HandlerSpec<'a, L> {
    declaration: &'a mut Declaration<L>,
}

impl<L> HandlerSpec<'_, L> {
    /// Set the priority. Higher runs earlier; the default is
    /// [`DEFAULT_PRIORITY`].
    pub fn priority(self, priority: i32) -> Self {
        self.declaration.priority = priority;
        self
    }

    /// Set the execution preference. The default is [`Preference::Pool`].
    pub fn preference(self, preference: Preference) -> Self {
        self.declaration.preference = preference;
        self
    }

    /// Mark whether the method is externally invocable.
    pub fn accessible(self, accessible: bool) -> Self {
        self.declaration.accessible = accessible;
        self
    }
}
