use appshell::app::{Application, ApplicationBuilder};
use appshell::components::panel::{panel_module, Effect, PanelEvent, PanelState, Side};
use appshell::components::ComponentAdapter;
use appshell::constants::{CLASS_PANEL, CLASS_PANEL_IN, CLASS_PANEL_IN_BREAKPOINT, CLASS_PANEL_RESIZABLE};
use appshell::host::{ElementRef, HeadlessHost};
use appshell::{PanelAdapter, PanelProps};
use serde_json::json;
use std::cell::RefCell;
use std::rc::Rc;

fn setup(init: bool, with_panels: bool) -> (HeadlessHost, Application, ElementRef) {
    let host = HeadlessHost::new();
    host.append_to_body("div", Some("app"));
    let el = host.append_to_body("div", None);
    let mut builder = ApplicationBuilder::new(Rc::new(host.clone())).params(json!({ "init": init }));
    if with_panels {
        builder = builder.module(panel_module());
    }
    (host, builder.build().unwrap(), el)
}

fn left_props() -> PanelProps {
    PanelProps {
        left: true,
        ..PanelProps::default()
    }
}

#[test]
fn test_construction_waits_for_init() {
    let (_host, app, el) = setup(false, true);
    let adapter = ComponentAdapter::<PanelAdapter>::new(el, left_props());

    adapter.mount(&app);
    assert!(adapter.is_mounted());
    assert!(adapter.instance().is_none());
    assert_eq!(app.pending_ready(), 1);

    app.init();

    let panel = adapter.instance().expect("constructed after init");
    assert_eq!(panel.side(), Side::Left);
    assert!(adapter.construction_error().is_none());
}

#[test]
fn test_mount_after_init_constructs_immediately() {
    let (_host, app, el) = setup(true, true);
    let adapter = ComponentAdapter::<PanelAdapter>::new(el, PanelProps::default());
    adapter.mount(&app);
    assert_eq!(adapter.instance().map(|p| p.side()), Some(Side::Right));
}

#[test]
fn test_missing_panel_module_leaves_no_instance() {
    let (_host, app, el) = setup(true, false);
    let adapter = ComponentAdapter::<PanelAdapter>::new(el, left_props());

    adapter.mount(&app);

    assert!(adapter.instance().is_none());
    let error = adapter.construction_error().expect("failure recorded");
    assert!(error.contains("panel module"));
}

#[test]
fn test_unmount_before_construction_is_safe() {
    let (_host, app, el) = setup(false, true);
    let adapter = ComponentAdapter::<PanelAdapter>::new(el, left_props());

    adapter.mount(&app);
    adapter.unmount();
    app.init();

    assert!(!adapter.is_mounted());
    assert!(adapter.instance().is_none());
}

#[test]
fn test_remount_before_init_constructs_once() {
    let (_host, app, el) = setup(false, true);
    let adapter = ComponentAdapter::<PanelAdapter>::new(
        el,
        PanelProps {
            opened: true,
            ..left_props()
        },
    );
    let opens = Rc::new(RefCell::new(0));
    let sink = Rc::clone(&opens);
    adapter.set_callback("panelOpen", move |_| *sink.borrow_mut() += 1);

    adapter.mount(&app);
    adapter.unmount();
    adapter.mount(&app);
    app.init();

    assert_eq!(*opens.borrow(), 1);
    assert!(adapter.instance().unwrap().is_opened());
    assert_eq!(app.call("panelCount", &[]).unwrap(), json!(1));
}

#[test]
fn test_unmount_destroys_instance() {
    let (_host, app, el) = setup(true, true);
    let adapter = ComponentAdapter::<PanelAdapter>::new(el, left_props());
    adapter.mount(&app);
    let handle = adapter.handle();
    let panel = handle.instance().unwrap();

    adapter.unmount();

    assert!(panel.is_destroyed());
    assert!(handle.instance().is_none());
    assert_eq!(app.call("panelCount", &[]).unwrap(), json!(0));
}

#[test]
fn test_opened_prop_at_construction_opens_without_animation() {
    let (host, app, el) = setup(true, true);
    let adapter = ComponentAdapter::<PanelAdapter>::new(
        el,
        PanelProps {
            opened: true,
            ..left_props()
        },
    );
    let seen = Rc::new(RefCell::new(Vec::new()));
    let sink = Rc::clone(&seen);
    adapter.set_callback("panelOpened", move |event| sink.borrow_mut().push(*event));

    adapter.mount(&app);

    assert_eq!(host.pending_frames(), 0);
    assert!(adapter.instance().unwrap().is_opened());
    assert!(adapter.view().opened);
    assert_eq!(*seen.borrow(), vec![PanelEvent::Opened]);
}

#[test]
fn test_opened_watcher_drives_instance() {
    let (host, app, el) = setup(true, true);
    let adapter = ComponentAdapter::<PanelAdapter>::new(Rc::clone(&el), left_props());
    adapter.mount(&app);
    let panel = adapter.instance().unwrap();

    adapter.update(PanelProps {
        opened: true,
        ..left_props()
    });
    assert_eq!(panel.state(), PanelState::Opening);
    host.run_frames();
    assert!(panel.is_opened());
    assert!(el.has_class(CLASS_PANEL_IN));

    adapter.update(left_props());
    host.run_frames();
    assert_eq!(panel.state(), PanelState::Closed);
    assert!(!el.has_class(CLASS_PANEL_IN));
    assert!(!adapter.view().closing);
}

#[test]
fn test_resizable_watcher_toggles_flag() {
    let (_host, app, el) = setup(true, true);
    let adapter = ComponentAdapter::<PanelAdapter>::new(Rc::clone(&el), left_props());
    adapter.mount(&app);
    let panel = adapter.instance().unwrap();

    adapter.update(PanelProps {
        resizable: Some(true),
        ..left_props()
    });
    assert!(panel.is_resizable());
    assert!(el.has_class(CLASS_PANEL_RESIZABLE));

    adapter.update(PanelProps {
        resizable: Some(false),
        ..left_props()
    });
    assert!(!panel.is_resizable());
    assert!(!el.has_class(CLASS_PANEL_RESIZABLE));
}

#[test]
fn test_non_reactive_props_are_ignored_after_construction() {
    let (_host, app, el) = setup(true, true);
    let adapter = ComponentAdapter::<PanelAdapter>::new(el, left_props());
    adapter.mount(&app);
    let panel = adapter.instance().unwrap();

    adapter.update(PanelProps {
        left: false,
        swipe: Some(true),
        width: Some(50),
        ..PanelProps::default()
    });

    let same = adapter.instance().unwrap();
    assert_eq!(same.id(), panel.id());
    assert_eq!(same.side(), Side::Left);
    assert!(!same.params().swipe);
    assert_eq!(adapter.props().width, Some(50));
}

#[test]
fn test_backdrop_click_reaches_both_callbacks() {
    let (host, app, el) = setup(true, true);
    let adapter = ComponentAdapter::<PanelAdapter>::new(
        el,
        PanelProps {
            opened: true,
            ..left_props()
        },
    );
    let names = Rc::new(RefCell::new(Vec::new()));
    for name in ["click", "panelBackdropClick", "panelClose", "panelClosed"] {
        let sink = Rc::clone(&names);
        adapter.set_callback(name, move |_| sink.borrow_mut().push(name));
    }
    adapter.mount(&app);

    assert!(adapter.instance().unwrap().backdrop_click());
    host.run_frames();

    assert_eq!(
        *names.borrow(),
        vec!["click", "panelBackdropClick", "panelClose", "panelClosed"]
    );
}

#[test]
fn test_removed_callback_is_not_called() {
    let (_host, app, el) = setup(true, true);
    let adapter = ComponentAdapter::<PanelAdapter>::new(el, left_props());
    let hits = Rc::new(RefCell::new(0));
    let sink = Rc::clone(&hits);
    adapter.set_callback("panelOpen", move |_| *sink.borrow_mut() += 1);
    adapter.mount(&app);

    adapter.remove_callback("panelOpen");
    adapter.instance().unwrap().open(false);
    assert_eq!(*hits.borrow(), 0);
}

#[test]
fn test_rendered_classes_follow_props() {
    let (_host, _app, el) = setup(false, true);
    let adapter = ComponentAdapter::<PanelAdapter>::new(
        Rc::clone(&el),
        PanelProps {
            class_name: Some("wide dark".into()),
            reveal: true,
            ..left_props()
        },
    );

    assert!(el.has_class(CLASS_PANEL));
    assert!(el.has_class("wide"));
    assert!(el.has_class("dark"));
    assert!(el.has_class("panel-left"));
    assert!(el.has_class("panel-reveal"));

    adapter.update(left_props());
    assert!(!el.has_class("wide"));
    assert!(!el.has_class("panel-reveal"));
    assert!(el.has_class("panel-cover"));
}

#[test]
fn test_visible_breakpoint_replaces_panel_in() {
    let (_host, app, el) = setup(true, true);
    let adapter = ComponentAdapter::<PanelAdapter>::new(
        Rc::clone(&el),
        PanelProps {
            opened: true,
            visible_breakpoint: Some(100),
            ..left_props()
        },
    );
    adapter.mount(&app);
    let panel = adapter.instance().unwrap();
    assert!(el.has_class(CLASS_PANEL_IN));

    panel.set_viewport_width(120);
    assert!(el.has_class(CLASS_PANEL_IN_BREAKPOINT));
    assert!(!el.has_class(CLASS_PANEL_IN));

    panel.set_viewport_width(80);
    assert!(!el.has_class(CLASS_PANEL_IN_BREAKPOINT));
    assert!(el.has_class(CLASS_PANEL_IN));
}

#[test]
fn test_explicit_side_and_effect_win_over_flags() {
    let explicit = PanelProps {
        side: Some(Side::Right),
        left: true,
        effect: Some(Effect::Cover),
        reveal: true,
        ..PanelProps::default()
    };
    assert_eq!(explicit.side(), Side::Right);
    assert_eq!(explicit.effect(), Effect::Cover);

    let explicit = PanelProps {
        side: Some(Side::Left),
        effect: Some(Effect::Reveal),
        ..PanelProps::default()
    };
    assert_eq!(explicit.side(), Side::Left);
    assert_eq!(explicit.effect(), Effect::Reveal);

    let flags = PanelProps {
        left: true,
        reveal: true,
        ..PanelProps::default()
    };
    assert_eq!(flags.side(), Side::Left);
    assert_eq!(flags.effect(), Effect::Reveal);
}

#[test]
fn test_explicit_side_reaches_the_instance() {
    let (_host, app, el) = setup(true, true);
    let adapter = ComponentAdapter::<PanelAdapter>::new(
        Rc::clone(&el),
        PanelProps {
            side: Some(Side::Right),
            effect: Some(Effect::Reveal),
            ..left_props()
        },
    );
    assert!(el.has_class("panel-right"));
    assert!(el.has_class("panel-reveal"));

    adapter.mount(&app);

    assert_eq!(adapter.instance().unwrap().side(), Side::Right);
    assert!(!el.has_class("panel-left"));
}

#[test]
fn test_handle_exposes_element_and_id() {
    let (_host, app, el) = setup(true, true);
    let adapter = ComponentAdapter::<PanelAdapter>::new(
        Rc::clone(&el),
        PanelProps {
            id: Some("nav".into()),
            ..left_props()
        },
    );
    let handle = adapter.handle();
    assert!(handle.instance().is_none());

    adapter.mount(&app);

    assert_eq!(handle.el().key(), el.key());
    assert_eq!(el.attr("id").as_deref(), Some("nav"));
    assert!(handle.instance().is_some());
}
