use appshell::events::{BusEvent, EmitReport, EventBus, Priority};
use std::cell::RefCell;
use std::rc::Rc;

#[derive(Debug, Clone, PartialEq)]
enum TestEvent {
    Ping(u32),
    Pong,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
enum TestKind {
    Ping,
    Pong,
}

impl BusEvent for TestEvent {
    type Kind = TestKind;

    fn kind(&self) -> TestKind {
        match self {
            TestEvent::Ping(_) => TestKind::Ping,
            TestEvent::Pong => TestKind::Pong,
        }
    }
}

fn recorder() -> (Rc<RefCell<Vec<String>>>, impl Fn(&str) -> Box<dyn Fn(&TestEvent) -> anyhow::Result<()>>) {
    let log = Rc::new(RefCell::new(Vec::new()));
    let sink = Rc::clone(&log);
    let make = move |name: &str| {
        let sink = Rc::clone(&sink);
        let name = name.to_string();
        Box::new(move |_: &TestEvent| {
            sink.borrow_mut().push(name.clone());
            Ok(())
        }) as Box<dyn Fn(&TestEvent) -> anyhow::Result<()>>
    };
    (log, make)
}

#[test]
fn test_handlers_run_in_registration_order() {
    let bus = EventBus::<TestEvent>::new("test");
    let (log, make) = recorder();
    bus.on(TestKind::Ping, make("a"));
    bus.on(TestKind::Ping, make("b"));
    bus.on(TestKind::Ping, make("c"));

    let report = bus.emit(&TestEvent::Ping(1));

    assert_eq!(*log.borrow(), vec!["a", "b", "c"]);
    assert_eq!(report, EmitReport { invoked: 3, failed: 0 });
}

#[test]
fn test_high_priority_runs_first_in_its_own_order() {
    let bus = EventBus::<TestEvent>::new("test");
    let (log, make) = recorder();
    bus.on(TestKind::Ping, make("normal-1"));
    bus.on_with_priority(TestKind::Ping, Priority::High, make("high-1"));
    bus.on(TestKind::Ping, make("normal-2"));
    bus.on_with_priority(TestKind::Ping, Priority::High, make("high-2"));

    bus.emit(&TestEvent::Ping(1));

    assert_eq!(*log.borrow(), vec!["high-1", "high-2", "normal-1", "normal-2"]);
}

#[test]
fn test_once_handler_fires_a_single_time() {
    let bus = EventBus::<TestEvent>::new("test");
    let (log, make) = recorder();
    bus.once(TestKind::Ping, make("once"));
    bus.on(TestKind::Ping, make("always"));

    bus.emit(&TestEvent::Ping(1));
    bus.emit(&TestEvent::Ping(2));

    assert_eq!(*log.borrow(), vec!["once", "always", "always"]);
    assert_eq!(bus.listener_count(TestKind::Ping), 1);
}

#[test]
fn test_once_handler_is_removed_before_reentrant_emit() {
    let bus = Rc::new(EventBus::<TestEvent>::new("test"));
    let count = Rc::new(RefCell::new(0));

    let inner_bus = Rc::downgrade(&bus);
    let inner_count = Rc::clone(&count);
    bus.once(TestKind::Ping, move |_| {
        *inner_count.borrow_mut() += 1;
        if let Some(bus) = inner_bus.upgrade() {
            bus.emit(&TestEvent::Ping(2));
        }
        Ok(())
    });

    bus.emit(&TestEvent::Ping(1));
    assert_eq!(*count.borrow(), 1);
}

#[test]
fn test_off_removes_one_or_all_handlers() {
    let bus = EventBus::<TestEvent>::new("test");
    let (log, make) = recorder();
    let first = bus.on(TestKind::Ping, make("first"));
    bus.on(TestKind::Ping, make("second"));
    bus.on(TestKind::Pong, make("pong"));

    assert_eq!(bus.off(TestKind::Ping, Some(first)), 1);
    bus.emit(&TestEvent::Ping(1));
    assert_eq!(*log.borrow(), vec!["second"]);

    assert_eq!(bus.off(TestKind::Ping, None), 1);
    assert_eq!(bus.emit(&TestEvent::Ping(2)).invoked, 0);

    // Other kinds are untouched
    bus.emit(&TestEvent::Pong);
    assert_eq!(*log.borrow(), vec!["second", "pong"]);
}

#[test]
fn test_off_unknown_listener_is_noop() {
    let bus = EventBus::<TestEvent>::new("test");
    let (_log, make) = recorder();
    let id = bus.on(TestKind::Pong, make("pong"));
    assert_eq!(bus.off(TestKind::Ping, Some(id)), 0);
    assert_eq!(bus.off(TestKind::Ping, None), 0);
    assert_eq!(bus.listener_count(TestKind::Pong), 1);
}

#[test]
fn test_failing_handler_does_not_stop_siblings() {
    let bus = EventBus::<TestEvent>::new("test");
    let (log, make) = recorder();
    bus.on(TestKind::Ping, make("before"));
    bus.on(TestKind::Ping, |_| anyhow::bail!("handler failure"));
    bus.on(TestKind::Ping, |_| panic!("handler panic"));
    bus.on(TestKind::Ping, make("after"));

    let report = bus.emit(&TestEvent::Ping(1));

    assert_eq!(*log.borrow(), vec!["before", "after"]);
    assert_eq!(report, EmitReport { invoked: 4, failed: 2 });
}

#[test]
fn test_handler_receives_typed_payload() {
    let bus = EventBus::<TestEvent>::new("test");
    let seen = Rc::new(RefCell::new(None));
    let sink = Rc::clone(&seen);
    bus.on(TestKind::Ping, move |event| {
        if let TestEvent::Ping(value) = event {
            *sink.borrow_mut() = Some(*value);
        }
        Ok(())
    });

    bus.emit(&TestEvent::Ping(42));
    assert_eq!(*seen.borrow(), Some(42));
}

#[test]
fn test_subscription_during_emit_applies_to_next_emit() {
    let bus = Rc::new(EventBus::<TestEvent>::new("test"));
    let (log, make) = recorder();
    let make = Rc::new(make);

    let weak = Rc::downgrade(&bus);
    let factory = Rc::clone(&make);
    bus.once(TestKind::Ping, move |_| {
        if let Some(bus) = weak.upgrade() {
            bus.on(TestKind::Ping, factory("late"));
        }
        Ok(())
    });

    assert_eq!(bus.emit(&TestEvent::Ping(1)).invoked, 1);
    assert!(log.borrow().is_empty());
    bus.emit(&TestEvent::Ping(2));
    assert_eq!(*log.borrow(), vec!["late"]);
}

#[test]
fn test_clear_drops_everything() {
    let bus = EventBus::<TestEvent>::default();
    let (_log, make) = recorder();
    bus.on(TestKind::Ping, make("a"));
    bus.on(TestKind::Pong, make("b"));
    bus.clear();
    assert_eq!(bus.listener_count(TestKind::Ping), 0);
    assert_eq!(bus.listener_count(TestKind::Pong), 0);
}
