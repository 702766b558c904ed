mod common;

use common::{Ping, Pong, manual_bus};
use skitter::{Declarations, Listener, Preference, testing::CallLog};
use std::sync::Arc;

struct Base {
    log: CallLog,
}

impl Base {
    fn on_ping(&self, ping: &Ping) {
        self.log.record(format!("base:{}", ping.value));
    }
}

impl Listener for Base {
    fn declare(handlers: &mut Declarations<Self>) {
        handlers
            .on("on_ping", Self::on_ping)
            .priority(50)
            .preference(Preference::Caller);
    }
}

struct Derived {
    base: Base,
    log: CallLog,
}

impl Derived {
    fn on_pong(&self, _: &Pong) {
        self.log.record("derived:pong");
    }

    fn on_ping(&self, _: &Ping) {
        self.log.record("derived:ping");
    }
}

impl Listener for Derived {
    fn declare(handlers: &mut Declarations<Self>) {
        handlers
            .on("on_pong", Self::on_pong)
            .preference(Preference::Caller);
        handlers
            .on("on_ping", Self::on_ping)
            .preference(Preference::Caller);
        handlers.inherit::<Base>(|derived| &derived.base);
    }
}

fn derived(log: &CallLog) -> Arc<Derived> {
    Arc::new(Derived {
        base: Base { log: log.clone() },
        log: log.clone(),
    })
}

#[test]
fn test_inherited_handlers_invoked() {
    let t = manual_bus();
    let log = CallLog::new();
    let listener = derived(&log);

    let subscription = t.bus.subscribe(&listener).unwrap();
    assert_eq!(subscription.added, 3);

    t.bus.dispatch(Ping { value: 3 });
    t.bus.dispatch(Pong);

    // Own `on_ping` (priority 100) runs before the inherited one (50).
    assert_eq!(log.entries(), ["derived:ping", "base:3", "derived:pong"]);
}

#[test]
fn test_inherited_identity_distinct_from_override() {
    let t = manual_bus();
    let log = CallLog::new();
    let listener = derived(&log);

    t.bus.subscribe(&listener).unwrap();
    let again = t.bus.subscribe(&listener).unwrap();

    // Same-named methods on base and derived are different handlers, and
    // each is bound once.
    assert_eq!(again.added, 0);
    assert_eq!(again.skipped, 3);
    assert_eq!(t.bus.listener_count::<Ping>(), 2);
}

#[test]
fn test_base_and_derived_instances_independent() {
    let t = manual_bus();
    let log = CallLog::new();
    let base = Arc::new(Base { log: log.clone() });
    let listener = derived(&log);

    t.bus.subscribe(&base).unwrap();
    t.bus.subscribe(&listener).unwrap();
    assert_eq!(t.bus.listener_count::<Ping>(), 3);

    t.bus.unsubscribe(&listener);
    t.bus.dispatch(Ping { value: 1 });
    assert_eq!(log.entries(), ["base:1"]);
}
