#![cfg(feature = "macros")]

mod common;

use common::manual_bus;
use skitter::{
    AnyEvent, CancelState, Cancelable, ConfigError, Declarations, Event, Preference, listener,
    testing::CallLog,
};
use std::sync::Arc;

#[derive(Event)]
struct Joined {
    name: String,
}

#[derive(Event, Default)]
#[event(cancelable)]
struct Said {
    text: String,
    state: CancelState,
}

#[derive(Event)]
#[event(preference = Main)]
struct Tick;

#[derive(Event)]
#[event(cancelable, preference = Caller)]
struct Tuple(u32, #[event(cancel_state)] CancelState);

#[test]
fn test_derived_event_traits() {
    assert!(!Joined::CANCELABLE);
    assert!(Said::CANCELABLE);
    assert_eq!(Tick::PREFERENCE, Some(Preference::Main));
    assert_eq!(Tuple::PREFERENCE, Some(Preference::Caller));

    let said = Said::default();
    said.cancel();
    assert!(said.is_canceled());

    let tuple = Tuple(1, CancelState::new());
    tuple.cancel();
    assert!(tuple.1.is_canceled());
    assert_eq!(tuple.0, 1);
}

struct Room {
    log: CallLog,
}

#[listener]
impl Room {
    #[subscribe(Caller, priority = 200)]
    pub fn moderate(&self, said: &Said) {
        self.log.record("moderate");
        if said.text.contains("spam") {
            said.cancel();
        }
    }

    #[subscribe]
    pub fn echo(&self, said: &Said) {
        self.log.record(format!("echo:{}", said.text));
    }

    #[subscribe(preference = Caller, priority = -5)]
    pub fn welcome(&self, joined: &Joined) {
        self.log.record(format!("welcome:{}", joined.name));
    }

    #[subscribe(Caller)]
    pub fn unknown(&self, event: &dyn AnyEvent) {
        self.log.record(format!("unknown:{}", event.event_name()));
    }

    /// Not a handler.
    pub fn helper(&self) -> usize {
        self.log.count()
    }
}

#[test]
fn test_generated_listener() {
    let t = manual_bus();
    let log = CallLog::new();
    let room = Arc::new(Room { log: log.clone() });

    let subscription = t.bus.subscribe(&room).unwrap();
    assert_eq!(subscription.added, 4);

    t.bus.dispatch(Joined {
        name: "ada".to_string(),
    });
    t.bus.dispatch(Said {
        text: "hi".to_string(),
        ..Said::default()
    });
    let delivery = t.bus.dispatch_with(
        Said {
            text: "spam".to_string(),
            ..Said::default()
        },
        |_| {},
    );
    t.bus.dispatch(Tick);

    assert!(delivery.canceled);
    assert_eq!(
        log.entries(),
        [
            "welcome:ada".to_string(),
            "moderate".to_string(),
            "echo:hi".to_string(),
            "moderate".to_string(),
            format!("unknown:{}", std::any::type_name::<Tick>()),
        ]
    );
    assert_eq!(room.helper(), 5);
}

#[test]
fn test_generated_declarations() {
    let handlers = Declarations::<Room>::collect();
    let welcome = handlers
        .iter()
        .find(|d| d.id().method() == "welcome")
        .unwrap();
    assert_eq!(welcome.priority(), -5);
    assert_eq!(welcome.preference(), Preference::Caller);

    let echo = handlers.iter().find(|d| d.id().method() == "echo").unwrap();
    assert_eq!(echo.priority(), skitter::DEFAULT_PRIORITY);
    assert_eq!(echo.preference(), Preference::Pool);
    assert!(echo.is_cancelable());
}

struct Secretive;

#[listener]
impl Secretive {
    #[subscribe]
    fn private(&self, _: &Joined) {}
}

#[test]
fn test_private_method_rejected() {
    let t = manual_bus();
    let err = t.bus.subscribe(&Arc::new(Secretive)).unwrap_err();
    assert!(matches!(
        err,
        ConfigError::Inaccessible {
            handler: "private",
            ..
        }
    ));
}

struct Lobby {
    room: Room,
    log: CallLog,
}

#[listener(inherit(room: Room))]
impl Lobby {
    #[subscribe(Caller, priority = 300)]
    pub fn greet(&self, joined: &Joined) {
        self.log.record(format!("lobby:{}", joined.name));
    }
}

#[test]
fn test_inherited_through_macro() {
    let t = manual_bus();
    let log = CallLog::new();
    let lobby = Arc::new(Lobby {
        room: Room { log: log.clone() },
        log: log.clone(),
    });

    assert_eq!(t.bus.subscribe(&lobby).unwrap().added, 5);
    t.bus.dispatch(Joined {
        name: "bo".to_string(),
    });
    assert_eq!(log.entries(), ["lobby:bo", "welcome:bo"]);
}
