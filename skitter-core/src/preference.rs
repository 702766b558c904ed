//! Execution preferences and listener ownership policies.

use std::fmt;

/// Where a handler runs when an event is dispatched.
///
/// | Preference | Context |
/// |------------|---------|
/// | `Caller`   | synchronously, on the dispatching thread |
/// | `Dispatch` | same as `Caller` |
/// | `Main`     | submitted to the bus's main-thread executor |
/// | `Pool`     | submitted to the bus's worker pool |
///
/// Handlers of cancelable events declared `Pool` run as `Caller`, since
/// cancellation is only observable between synchronous invocations.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Preference {
    /// Run on the thread that called `dispatch`.
    Caller,
    /// Run on the designated main-thread executor.
    Main,
    /// Run on the worker pool.
    #[default]
    Pool,
    /// Run on the thread that called `dispatch`.
    Dispatch,
}

impl Preference {
    /// Returns `true` if handlers with this preference run inside the
    /// `dispatch` call.
    pub const fn is_synchronous(self) -> bool {
        matches!(self, Preference::Caller | Preference::Dispatch)
    }

    /// Lowercase name used in logs.
    pub const fn as_str(self) -> &'static str {
        match self {
            Preference::Caller => "caller",
            Preference::Main => "main",
            Preference::Pool => "pool",
            Preference::Dispatch => "dispatch",
        }
    }
}

impl fmt::Display for Preference {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// How the registry holds on to a subscribed listener.
///
/// - `Strong`: the registry keeps the listener alive until it is unsubscribed.
/// - `Weak`: the registry keeps a non-owning handle; once every other owner
///   drops the listener its bindings are skipped and later swept.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Ownership {
    /// Registry owns a reference until `unsubscribe`.
    #[default]
    Strong,
    /// Registry holds a non-owning handle.
    Weak,
}
