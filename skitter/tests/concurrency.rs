mod common;

use common::{Ping, Tagged};
use skitter::{
    EventBus,
    executor::WorkerPool,
    testing::{CallLog, CountingListener},
};
use std::{
    sync::{Arc, Barrier},
    thread,
};

#[test]
fn test_concurrent_subscribe_unsubscribe_dispatch() {
    let pool = WorkerPool::builder().threads(4).build().unwrap();
    let bus = Arc::new(EventBus::builder().pool_executor(pool).sweep_every(8).build());
    let stable = Arc::new(CountingListener::<Ping>::new());
    bus.subscribe(&stable).unwrap();

    const THREADS: usize = 6;
    const ROUNDS: usize = 200;
    let barrier = Arc::new(Barrier::new(THREADS * 2));
    let mut handles = Vec::new();

    for i in 0..THREADS {
        let bus = bus.clone();
        let barrier = barrier.clone();
        handles.push(thread::spawn(move || {
            barrier.wait();
            let log = CallLog::new();
            for _ in 0..ROUNDS {
                let churn = Arc::new(Tagged {
                    tag: "churn",
                    log: log.clone(),
                });
                if i % 2 == 0 {
                    bus.subscribe_strong(&churn).unwrap();
                    assert_eq!(bus.unsubscribe(&churn), 2);
                } else {
                    bus.subscribe_weak(&churn).unwrap();
                    drop(churn);
                }
            }
        }));
    }

    for _ in 0..THREADS {
        let bus = bus.clone();
        let barrier = barrier.clone();
        handles.push(thread::spawn(move || {
            barrier.wait();
            for value in 0..ROUNDS {
                bus.dispatch(Ping { value: value as i64 });
            }
        }));
    }

    for handle in handles {
        handle.join().unwrap();
    }

    // Every dispatch reached the listener that stayed subscribed throughout.
    assert_eq!(stable.count(), THREADS * ROUNDS);

    bus.sweep();
    assert_eq!(bus.listener_count::<Ping>(), 1);
    assert_eq!(bus.binding_count(), 1);
}
