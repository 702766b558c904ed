//! # Cancellation State
//!
//! A cancelable event carries a [`CancelState`]. Handlers call
//! [`Cancelable::cancel`]; the dispatcher checks the state after each
//! synchronous handler and stops delivering once it is set. The state is
//! cleared when the dispatch call that observed it ends, so an event instance
//! reused for a later dispatch starts out not canceled.
//!
//! # Example
//!
//! ```rust,ignore
//! struct Chat { text: String, state: CancelState }
//!
//! impl Event for Chat {
//!     const CANCELABLE: bool = true;
//!     fn cancel_state(&self) -> Option<&CancelState> { Some(&self.state) }
//! }
//!
//! impl Cancelable for Chat {}
//! ```

use crate::event::Event;
use std::{
    cell::Cell,
    fmt,
    sync::atomic::{AtomicBool, Ordering},
};

thread_local! {
    /// Depth of [`CancelState::detached`] scopes on this thread.
    static DETACHED: Cell<usize> = const { Cell::new(0) };
}

/// Per-instance cancellation flag.
///
/// Cloning yields a fresh, un-canceled state: a copied event is a new
/// instance and shares nothing with the original.
#[derive(Default)]
pub struct CancelState {
    canceled: AtomicBool,
}

impl CancelState {
    /// Create an un-canceled state.
    pub const fn new() -> Self {
        Self {
            canceled: AtomicBool::new(false),
        }
    }

    /// Mark as canceled. Returns `true` if this call changed the state.
    ///
    /// Has no effect inside a [`CancelState::detached`] scope.
    pub fn cancel(&self) -> bool {
        if DETACHED.with(Cell::get) > 0 {
            return false;
        }
        !self.canceled.swap(true, Ordering::AcqRel)
    }

    /// Returns `true` once canceled.
    pub fn is_canceled(&self) -> bool {
        self.canceled.load(Ordering::Acquire)
    }

    /// Reset to not canceled.
    pub fn clear(&self) {
        self.canceled.store(false, Ordering::Release);
    }

    /// Run `f` with cancellation disabled on the current thread.
    ///
    /// Handlers handed off to an executor run this way: they are outside the
    /// dispatch call that scheduled them, so a cancel from them would
    /// otherwise stay set after that call cleared the state.
    pub fn detached<R>(f: impl FnOnce() -> R) -> R {
        struct Exit;

        impl Drop for Exit {
            fn drop(&mut self) {
                DETACHED.with(|depth| depth.set(depth.get() - 1));
            }
        }

        DETACHED.with(|depth| depth.set(depth.get() + 1));
        let _exit = Exit;
        f()
    }
}

impl Clone for CancelState {
    fn clone(&self) -> Self {
        Self::new()
    }
}

impl fmt::Debug for CancelState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CancelState")
            .field("canceled", &self.is_canceled())
            .finish()
    }
}

/// Events whose delivery can be stopped by a handler.
pub trait Cancelable: Event {
    /// Stop delivery to the remaining handlers of the current dispatch.
    fn cancel(&self) {
        if let Some(state) = self.cancel_state() {
            state.cancel();
        }
    }

    /// Returns `true` if a handler canceled the current dispatch.
    fn is_canceled(&self) -> bool {
        self.cancel_state().is_some_and(CancelState::is_canceled)
    }
}

/// Clears a cancel state when dropped, including during unwinding.
#[must_use = "the state is cleared when the guard is dropped"]
pub struct ClearOnDrop<'a> {
    state: Option<&'a CancelState>,
}

impl<'a> ClearOnDrop<'a> {
    /// Guard `state`; `None` makes the guard a no-op.
    pub fn new(state: Option<&'a CancelState>) -> Self {
        Self { state }
    }
}

impl Drop for ClearOnDrop<'_> {
    fn drop(&mut self) {
        if let Some(state) = self.state {
            state.clear();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Chat {
        state: CancelState,
    }

    impl Event for Chat {
        const CANCELABLE: bool = true;

        fn cancel_state(&self) -> Option<&CancelState> {
            Some(&self.state)
        }
    }

    impl Cancelable for Chat {}

    #[test]
    fn test_cancel_once() {
        let state = CancelState::new();
        assert!(!state.is_canceled());
        assert!(state.cancel());
        assert!(!state.cancel());
        assert!(state.is_canceled());
        state.clear();
        assert!(!state.is_canceled());
    }

    #[test]
    fn test_clone_is_fresh() {
        let state = CancelState::new();
        state.cancel();
        assert!(!state.clone().is_canceled());
    }

    #[test]
    fn test_cancelable_delegates() {
        let chat = Chat {
            state: CancelState::new(),
        };
        assert!(!chat.is_canceled());
        chat.cancel();
        assert!(chat.is_canceled());
    }

    #[test]
    fn test_detached_ignores_cancel() {
        let chat = Chat {
            state: CancelState::new(),
        };
        let changed = CancelState::detached(|| {
            CancelState::detached(|| chat.cancel());
            chat.state.cancel()
        });
        assert!(!changed);
        assert!(!chat.is_canceled());

        // Scope ends even when unwinding.
        let result = std::panic::catch_unwind(|| CancelState::detached(|| panic!("boom")));
        assert!(result.is_err());
        assert!(chat.state.cancel());
        assert!(chat.is_canceled());
    }

    #[test]
    fn test_guard_clears() {
        let state = CancelState::new();
        state.cancel();
        {
            let _guard = ClearOnDrop::new(Some(&state));
        }
        assert!(!state.is_canceled());
        let _noop = ClearOnDrop::new(None);
    }
}
