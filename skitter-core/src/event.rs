//! Event traits and routing keys.

use crate::{cancel::CancelState, preference::Preference};
use std::{
    any::{Any, TypeId},
    fmt,
    hash::{Hash, Hasher},
};

/// A payload type that can be published on a bus.
///
/// Events must be `Send + Sync + 'static`: pool and main-thread handlers
/// receive them from other threads.
///
/// # Example
///
/// ```rust,ignore
/// struct PlayerJoined { name: String }
///
/// impl Event for PlayerJoined {}
///
/// // Every handler of this event runs on the main thread, whatever it declares.
/// struct FrameRendered;
///
/// impl Event for FrameRendered {
///     const PREFERENCE: Option<Preference> = Some(Preference::Main);
/// }
/// ```
#[diagnostic::on_unimplemented(
    message = "`{Self}` is not a valid Event",
    label = "must implement `Event`",
    note = "Events must be `Send + Sync + 'static`; use `#[derive(Event)]` or implement `Event` by hand."
)]
pub trait Event: Send + Sync + 'static {
    /// Fixed execution preference for every handler of this event type.
    const PREFERENCE: Option<Preference> = None;

    /// Whether handlers may cancel this event. Must agree with
    /// [`Event::cancel_state`] returning `Some`.
    const CANCELABLE: bool = false;

    /// Cancellation state carried by the event instance.
    fn cancel_state(&self) -> Option<&CancelState> {
        None
    }
}

/// Object-safe view of an [`Event`].
///
/// Blanket-implemented for every event. `dyn AnyEvent` is also the universal
/// base type: handlers declared against it receive events nobody else handles.
pub trait AnyEvent: Any + Send + Sync + 'static {
    /// Borrow as `&dyn Any` for downcasting.
    fn as_any(&self) -> &dyn Any;

    /// Routing key of the concrete event type.
    fn event_key(&self) -> EventKey;

    /// Type name of the concrete event type.
    fn event_name(&self) -> &'static str;

    /// Cancellation state of this instance, if the event is cancelable.
    fn cancellation(&self) -> Option<&CancelState>;
}

impl<E: Event> AnyEvent for E {
    fn as_any(&self) -> &dyn Any {
        self
    }

    fn event_key(&self) -> EventKey {
        EventKey::of::<E>()
    }

    fn event_name(&self) -> &'static str {
        std::any::type_name::<E>()
    }

    fn cancellation(&self) -> Option<&CancelState> {
        self.cancel_state()
    }
}

/// Identity of an event type in the registry.
///
/// Equality and hashing use the `TypeId` only; the name is kept for logs.
#[derive(Clone, Copy)]
pub struct EventKey {
    id: TypeId,
    name: &'static str,
}

impl EventKey {
    /// Key of type `T`.
    pub fn of<T: ?Sized + 'static>() -> Self {
        Self {
            id: TypeId::of::<T>(),
            name: std::any::type_name::<T>(),
        }
    }

    /// Key of the universal base type, used for dead-event listeners.
    pub fn catch_all() -> Self {
        Self::of::<dyn AnyEvent>()
    }

    /// Returns `true` for the catch-all key.
    pub fn is_catch_all(&self) -> bool {
        self.id == TypeId::of::<dyn AnyEvent>()
    }

    /// The underlying `TypeId`.
    pub fn type_id(&self) -> TypeId {
        self.id
    }

    /// The type name.
    pub fn name(&self) -> &'static str {
        self.name
    }
}

impl PartialEq for EventKey {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}

impl Eq for EventKey {}

impl Hash for EventKey {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.id.hash(state);
    }
}

impl fmt::Debug for EventKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("EventKey").field(&self.name).finish()
    }
}

impl fmt::Display for EventKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name)
    }
}
