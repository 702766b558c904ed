#![allow(dead_code)]

use skitter::{
    CancelState, Cancelable, Declarations, Event, EventBus, Listener, Preference,
    testing::{CallLog, ManualExecutor},
};

// ============================================================================
// Test Event Types
// ============================================================================

#[derive(Debug, Clone)]
pub struct Ping {
    pub value: i64,
}

impl Event for Ping {}

#[derive(Debug)]
pub struct Pong;

impl Event for Pong {}

/// Nobody declares a handler for this one.
#[derive(Debug)]
pub struct Unheard;

impl Event for Unheard {}

#[derive(Debug, Default, Clone)]
pub struct Chat {
    pub text: String,
    pub state: CancelState,
}

impl Chat {
    pub fn new(text: &str) -> Self {
        Self {
            text: text.to_string(),
            state: CancelState::new(),
        }
    }
}

impl Event for Chat {
    const CANCELABLE: bool = true;

    fn cancel_state(&self) -> Option<&CancelState> {
        Some(&self.state)
    }
}

impl Cancelable for Chat {}

/// Every handler of this event runs on the main executor.
#[derive(Debug)]
pub struct Frame;

impl Event for Frame {
    const PREFERENCE: Option<Preference> = Some(Preference::Main);
}

// ============================================================================
// Test Listeners
// ============================================================================

/// Three synchronous `Ping` handlers declared at priorities 10, 100, 50.
pub struct Ordered {
    pub log: CallLog,
}

impl Ordered {
    pub fn low(&self, _: &Ping) {
        self.log.record("low");
    }

    pub fn high(&self, _: &Ping) {
        self.log.record("high");
    }

    pub fn mid(&self, _: &Ping) {
        self.log.record("mid");
    }
}

impl Listener for Ordered {
    fn declare(handlers: &mut Declarations<Self>) {
        handlers
            .on("low", Self::low)
            .priority(10)
            .preference(Preference::Caller);
        handlers
            .on("high", Self::high)
            .priority(100)
            .preference(Preference::Caller);
        handlers
            .on("mid", Self::mid)
            .priority(50)
            .preference(Preference::Caller);
    }
}

/// Records `Ping` and `Pong` with a tag, on the calling thread.
pub struct Tagged {
    pub tag: &'static str,
    pub log: CallLog,
}

impl Tagged {
    pub fn ping(&self, _: &Ping) {
        self.log.record(format!("{}:ping", self.tag));
    }

    pub fn pong(&self, _: &Pong) {
        self.log.record(format!("{}:pong", self.tag));
    }
}

impl Listener for Tagged {
    fn declare(handlers: &mut Declarations<Self>) {
        handlers
            .on("ping", Self::ping)
            .preference(Preference::Caller);
        handlers
            .on("pong", Self::pong)
            .preference(Preference::Caller);
    }
}

// ============================================================================
// Bus Helpers
// ============================================================================

pub struct TestBus {
    pub bus: EventBus,
    pub main: ManualExecutor,
    pub pool: ManualExecutor,
}

/// A bus whose main and pool executors only run tasks when told to, with
/// periodic sweeps disabled.
pub fn manual_bus() -> TestBus {
    let main = ManualExecutor::new();
    let pool = ManualExecutor::new();
    let bus = EventBus::builder()
        .main_executor(main.clone())
        .pool_executor(pool.clone())
        .sweep_every(0)
        .build();
    TestBus { bus, main, pool }
}
