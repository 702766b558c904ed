//! # Invocation Binding
//!
//! An [`Invoker`] binds one listener instance to one handler method and
//! exposes a single `invoke(event)` operation. It is built once, when the
//! listener is subscribed, so dispatch pays one virtual call per binding and
//! never looks handlers up again.
//!
//! Two strategies are available and behave identically:
//!
//! - [`InvokerStrategy::Specialized`]: the handler is a monomorphized
//!   [`Thunk`] that knows its event type statically. One `TypeId` check, one
//!   direct call.
//! - [`InvokerStrategy::Direct`]: the handler is called through a type-erased
//!   [`ErasedHandler`], which checks the declared event key on every call.
//!   Handlers registered only in erased form (plugins, scripting bridges)
//!   can only be bound this way.

use crate::{
    error::{BoxError, InvokeError},
    event::{AnyEvent, Event, EventKey},
    preference::Ownership,
};
use std::{
    fmt,
    marker::PhantomData,
    sync::{Arc, Weak},
};

/// Conversion of a handler's return value into an invocation result.
///
/// # Default Implementations
///
/// - `()` → success
/// - `Result<(), E>` → success or the boxed error
#[diagnostic::on_unimplemented(
    message = "`{Self}` is not a valid handler return type",
    label = "handlers must return `()` or `Result<(), E>`",
    note = "The error type must convert into `BoxError`."
)]
pub trait IntoHandlerResult {
    /// Convert into `Ok(())` or the handler's error.
    fn into_handler_result(self) -> Result<(), BoxError>;
}

impl IntoHandlerResult for () {
    fn into_handler_result(self) -> Result<(), BoxError> {
        Ok(())
    }
}

impl<E> IntoHandlerResult for Result<(), E>
where
    E: Into<BoxError>,
{
    fn into_handler_result(self) -> Result<(), BoxError> {
        self.map_err(Into::into)
    }
}

/// Identity of a listener instance: the address of its `Arc` allocation.
///
/// Stays unique while any strong or weak handle to the allocation exists.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct OwnerId(usize);

impl OwnerId {
    /// Identity of `listener`.
    pub fn of<L>(listener: &Arc<L>) -> Self {
        Self(Arc::as_ptr(listener) as *const () as usize)
    }
}

impl fmt::Display for OwnerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:#x}", self.0)
    }
}

/// The registry's handle on a listener.
pub enum Owner<L> {
    /// Keeps the listener alive.
    Strong(Arc<L>),
    /// Does not keep the listener alive.
    Weak(Weak<L>),
}

impl<L> Owner<L> {
    /// Create a handle on `listener` with the given ownership.
    pub fn new(listener: &Arc<L>, ownership: Ownership) -> Self {
        match ownership {
            Ownership::Strong => Owner::Strong(Arc::clone(listener)),
            Ownership::Weak => Owner::Weak(Arc::downgrade(listener)),
        }
    }

    /// Identity of the listener.
    pub fn id(&self) -> OwnerId {
        match self {
            Owner::Strong(listener) => OwnerId::of(listener),
            Owner::Weak(listener) => OwnerId(Weak::as_ptr(listener) as *const () as usize),
        }
    }

    /// Returns `false` once a weakly held listener has been dropped.
    pub fn is_alive(&self) -> bool {
        match self {
            Owner::Strong(_) => true,
            Owner::Weak(listener) => listener.strong_count() > 0,
        }
    }

    /// Run `f` with the listener, or return `None` if it is gone.
    pub fn with<R>(&self, f: impl FnOnce(&L) -> R) -> Option<R> {
        match self {
            Owner::Strong(listener) => Some(f(listener)),
            Owner::Weak(listener) => listener.upgrade().map(|listener| f(&listener)),
        }
    }
}

impl<L> Clone for Owner<L> {
    fn clone(&self) -> Self {
        match self {
            Owner::Strong(listener) => Owner::Strong(Arc::clone(listener)),
            Owner::Weak(listener) => Owner::Weak(Weak::clone(listener)),
        }
    }
}

/// A statically typed handler of listener `L`.
pub trait Thunk<L>: Send + Sync + 'static {
    /// Call the handler on `listener`.
    fn call(&self, listener: &L, event: &dyn AnyEvent) -> Result<(), InvokeError>;
}

/// Handler taking a concrete event type `E`.
pub struct Typed<E, F> {
    handler: F,
    _event: PhantomData<fn(&E)>,
}

impl<E, F> Typed<E, F> {
    /// Wrap `handler`.
    pub const fn new(handler: F) -> Self {
        Self {
            handler,
            _event: PhantomData,
        }
    }
}

impl<L, E, F, R> Thunk<L> for Typed<E, F>
where
    L: 'static,
    E: Event,
    F: Fn(&L, &E) -> R + Send + Sync + 'static,
    R: IntoHandlerResult,
{
    fn call(&self, listener: &L, event: &dyn AnyEvent) -> Result<(), InvokeError> {
        let Some(typed) = event.as_any().downcast_ref::<E>() else {
            return Err(InvokeError::TypeMismatch {
                expected: std::any::type_name::<E>(),
                actual: event.event_name(),
            });
        };
        (self.handler)(listener, typed)
            .into_handler_result()
            .map_err(InvokeError::Handler)
    }
}

/// Handler taking any event: the dead-event fallback.
pub struct CatchAll<F> {
    handler: F,
}

impl<F> CatchAll<F> {
    /// Wrap `handler`.
    pub const fn new(handler: F) -> Self {
        Self { handler }
    }
}

impl<L, F, R> Thunk<L> for CatchAll<F>
where
    L: 'static,
    F: Fn(&L, &dyn AnyEvent) -> R + Send + Sync + 'static,
    R: IntoHandlerResult,
{
    fn call(&self, listener: &L, event: &dyn AnyEvent) -> Result<(), InvokeError> {
        (self.handler)(listener, event)
            .into_handler_result()
            .map_err(InvokeError::Handler)
    }
}

/// A handler of base listener `B`, reached from `L` through a projection.
pub struct Projected<L, B> {
    project: fn(&L) -> &B,
    inner: Arc<dyn Thunk<B>>,
}

impl<L, B> Projected<L, B> {
    /// Reach `inner` through `project`.
    pub fn new(project: fn(&L) -> &B, inner: Arc<dyn Thunk<B>>) -> Self {
        Self { project, inner }
    }
}

impl<L: 'static, B: 'static> Thunk<L> for Projected<L, B> {
    fn call(&self, listener: &L, event: &dyn AnyEvent) -> Result<(), InvokeError> {
        self.inner.call((self.project)(listener), event)
    }
}

/// A type-erased handler of listener `L`.
pub type ErasedHandler<L> =
    Arc<dyn Fn(&L, &dyn AnyEvent) -> Result<(), InvokeError> + Send + Sync + 'static>;

/// The callable a declaration carries.
pub enum HandlerFn<L> {
    /// Statically typed; can back either strategy.
    Specialized(Arc<dyn Thunk<L>>),
    /// Type-erased only; can back [`InvokerStrategy::Direct`] only.
    Erased(ErasedHandler<L>),
}

impl<L: 'static> HandlerFn<L> {
    /// The erased form of this handler.
    pub fn erase(&self) -> ErasedHandler<L> {
        match self {
            HandlerFn::Specialized(thunk) => {
                let thunk = Arc::clone(thunk);
                Arc::new(move |listener: &L, event: &dyn AnyEvent| thunk.call(listener, event))
            }
            HandlerFn::Erased(handler) => Arc::clone(handler),
        }
    }

    /// Re-target at listener `D`, which embeds `L` and reaches it through
    /// `project`.
    pub fn project<D: 'static>(&self, project: fn(&D) -> &L) -> HandlerFn<D> {
        match self {
            HandlerFn::Specialized(thunk) => {
                HandlerFn::Specialized(Arc::new(Projected::new(project, Arc::clone(thunk))))
            }
            HandlerFn::Erased(handler) => {
                let handler = Arc::clone(handler);
                HandlerFn::Erased(Arc::new(move |listener: &D, event: &dyn AnyEvent| {
                    handler(project(listener), event)
                }))
            }
        }
    }
}

impl<L> Clone for HandlerFn<L> {
    fn clone(&self) -> Self {
        match self {
            HandlerFn::Specialized(thunk) => HandlerFn::Specialized(Arc::clone(thunk)),
            HandlerFn::Erased(handler) => HandlerFn::Erased(Arc::clone(handler)),
        }
    }
}

/// How the registry builds invokers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum InvokerStrategy {
    /// Monomorphized thunk per binding.
    #[default]
    Specialized,
    /// Call through a type-erased handler reference.
    Direct,
}

impl InvokerStrategy {
    /// Lowercase name used in errors and logs.
    pub const fn as_str(self) -> &'static str {
        match self {
            InvokerStrategy::Specialized => "specialized",
            InvokerStrategy::Direct => "direct",
        }
    }
}

/// A listener instance bound to one handler.
pub trait Invoker: Send + Sync + 'static {
    /// Call the handler with `event`.
    fn invoke(&self, event: &dyn AnyEvent) -> Result<(), InvokeError>;

    /// Returns `false` once the bound listener is gone.
    fn is_alive(&self) -> bool {
        true
    }
}

/// Invoker built by [`InvokerStrategy::Specialized`].
pub struct SpecializedInvoker<L> {
    owner: Owner<L>,
    thunk: Arc<dyn Thunk<L>>,
}

impl<L: Send + Sync + 'static> Invoker for SpecializedInvoker<L> {
    fn invoke(&self, event: &dyn AnyEvent) -> Result<(), InvokeError> {
        self.owner
            .with(|listener| self.thunk.call(listener, event))
            .unwrap_or(Err(InvokeError::OwnerReleased))
    }

    fn is_alive(&self) -> bool {
        self.owner.is_alive()
    }
}

/// Invoker built by [`InvokerStrategy::Direct`].
pub struct DirectInvoker<L> {
    owner: Owner<L>,
    key: EventKey,
    handler: ErasedHandler<L>,
}

impl<L: Send + Sync + 'static> Invoker for DirectInvoker<L> {
    fn invoke(&self, event: &dyn AnyEvent) -> Result<(), InvokeError> {
        if !self.key.is_catch_all() && event.event_key() != self.key {
            return Err(InvokeError::TypeMismatch {
                expected: self.key.name(),
                actual: event.event_name(),
            });
        }
        self.owner
            .with(|listener| (self.handler)(listener, event))
            .unwrap_or(Err(InvokeError::OwnerReleased))
    }

    fn is_alive(&self) -> bool {
        self.owner.is_alive()
    }
}

/// Build the invoker for `handler` targeting `key`.
///
/// Returns `None` when `strategy` cannot bind this form of handler.
pub fn bind<L: Send + Sync + 'static>(
    owner: Owner<L>,
    key: EventKey,
    handler: &HandlerFn<L>,
    strategy: InvokerStrategy,
) -> Option<Arc<dyn Invoker>> {
    match (strategy, handler) {
        (InvokerStrategy::Specialized, HandlerFn::Specialized(thunk)) => {
            Some(Arc::new(SpecializedInvoker {
                owner,
                thunk: Arc::clone(thunk),
            }))
        }
        (InvokerStrategy::Specialized, HandlerFn::Erased(_)) => None,
        (InvokerStrategy::Direct, handler) => Some(Arc::new(DirectInvoker {
            owner,
            key,
            handler: handler.erase(),
        })),
    }
}
