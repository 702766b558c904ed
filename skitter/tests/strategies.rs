mod common;

use common::{Chat, Ordered, Ping, Pong, Tagged, Unheard};
use skitter::{
    AnyEvent, Cancelable, Declarations, Delivery, EventBus, InvokerStrategy, Listener,
    Preference,
    testing::{CallLog, ManualExecutor},
};
use std::sync::Arc;

struct Everything {
    log: CallLog,
}

impl Everything {
    fn chat_first(&self, chat: &Chat) {
        self.log.record(format!("chat:{}", chat.text));
        if chat.text == "stop" {
            chat.cancel();
        }
    }

    fn chat_second(&self, _: &Chat) {
        self.log.record("chat:second");
    }

    fn dead(&self, event: &dyn AnyEvent) {
        self.log.record(format!("dead:{}", event.event_name()));
    }

    fn failing(&self, _: &Pong) -> Result<(), std::io::Error> {
        self.log.record("failing");
        Err(std::io::Error::other("nope"))
    }
}

impl Listener for Everything {
    fn declare(handlers: &mut Declarations<Self>) {
        handlers.on("chat_first", Self::chat_first).priority(150);
        handlers.on("chat_second", Self::chat_second);
        handlers
            .on_any("dead", Self::dead)
            .preference(Preference::Caller);
        handlers
            .on("failing", Self::failing)
            .preference(Preference::Caller);
    }
}

fn scenario(strategy: InvokerStrategy) -> (Vec<String>, Vec<Delivery>) {
    let bus = EventBus::builder()
        .pool_executor(ManualExecutor::new())
        .invoker_strategy(strategy)
        .sweep_every(0)
        .build();
    let log = CallLog::new();

    bus.subscribe(&Arc::new(Ordered { log: log.clone() })).unwrap();
    bus.subscribe(&Arc::new(Tagged {
        tag: "t",
        log: log.clone(),
    }))
    .unwrap();
    bus.subscribe(&Arc::new(Everything { log: log.clone() }))
        .unwrap();

    let deliveries = vec![
        bus.dispatch(Ping { value: 1 }),
        bus.dispatch(Pong),
        bus.dispatch_with(Chat::new("go"), |_| {}),
        bus.dispatch_with(Chat::new("stop"), |_| {}),
        bus.dispatch(Unheard),
    ];
    (log.entries(), deliveries)
}

#[test]
fn test_strategies_equivalent() {
    let specialized = scenario(InvokerStrategy::Specialized);
    let direct = scenario(InvokerStrategy::Direct);

    assert_eq!(specialized, direct);
    assert!(specialized.0.contains(&"chat:second".to_string()));
    assert!(specialized.1[3].canceled);
    assert_eq!(specialized.1[1].failed, 1);
    assert!(specialized.1[4].dead);
}
