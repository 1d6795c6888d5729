use appshell::app::{AppError, AppEvent, AppEventKind, Application, ApplicationBuilder, InitState, RootComponent};
use appshell::constants::{
    CLASS_INITIALIZING, CLASS_IOS_TRANSLUCENT_BARS, CLASS_IOS_TRANSLUCENT_MODALS, CLASS_ROOT,
};
use appshell::device::{DeviceInfo, Theme};
use appshell::host::{ElementRef, HeadlessHost, Host};
use async_trait::async_trait;
use serde_json::json;
use std::cell::{Cell, RefCell};
use std::rc::Rc;

fn host_with_root() -> (HeadlessHost, ElementRef) {
    let host = HeadlessHost::new();
    let root = host.append_to_body("div", Some("app"));
    (host, root)
}

fn count_events(app: &Application, kind: AppEventKind) -> Rc<Cell<usize>> {
    let count = Rc::new(Cell::new(0));
    let sink = Rc::clone(&count);
    app.on(kind, move |_| {
        sink.set(sink.get() + 1);
        Ok(())
    });
    count
}

#[test]
fn test_second_application_fails() {
    let (host, _root) = host_with_root();
    let host: Rc<dyn Host> = Rc::new(host);

    let first = ApplicationBuilder::new(Rc::clone(&host)).build();
    assert!(first.is_ok());

    let second = ApplicationBuilder::new(host).build();
    assert!(matches!(second, Err(AppError::DoubleInitialization)));

    let instance = Application::instance().expect("singleton is set");
    assert_eq!(instance.id(), first.unwrap().id());
}

#[test]
fn test_instance_is_none_before_construction() {
    assert!(Application::instance().is_none());
}

#[test]
fn test_init_applies_markers_and_emits_once() {
    let (host, root) = host_with_root();
    let app = ApplicationBuilder::new(Rc::new(host.clone()))
        .params(json!({ "init": false, "theme": "md" }))
        .build()
        .unwrap();
    let inits = count_events(&app, AppEventKind::Init);

    assert_eq!(app.state(), InitState::Constructed);
    app.init();
    assert_eq!(app.state(), InitState::Initialized);
    assert_eq!(inits.get(), 1);

    assert!(root.has_class(CLASS_ROOT));
    assert!(root.has_class(CLASS_INITIALIZING));
    assert!(host.document_element().has_class("md"));

    // Initializing marker goes away on the next frame
    assert_eq!(host.run_frames(), 1);
    assert!(!root.has_class(CLASS_INITIALIZING));

    // Second init is a no-op
    app.init();
    assert_eq!(inits.get(), 1);
    assert_eq!(host.pending_frames(), 0);
    assert_eq!(root.classes().iter().filter(|c| *c == CLASS_ROOT).count(), 1);
}

#[test]
fn test_init_true_initializes_during_build() {
    let (host, _root) = host_with_root();
    let app = ApplicationBuilder::new(Rc::new(host)).build().unwrap();
    assert!(app.is_initialized());
}

#[test]
fn test_theme_auto_resolves_ios() {
    let (host, _root) = host_with_root();
    let app = ApplicationBuilder::new(Rc::new(host.clone()))
        .device(DeviceInfo {
            ios: true,
            ..DeviceInfo::default()
        })
        .build()
        .unwrap();

    assert_eq!(app.theme(), Theme::Ios);
    let html = host.document_element();
    assert!(html.has_class("ios"));
    assert!(html.has_class(CLASS_IOS_TRANSLUCENT_BARS));
    assert!(html.has_class(CLASS_IOS_TRANSLUCENT_MODALS));
}

#[test]
fn test_theme_auto_resolves_aurora() {
    let (host, _root) = host_with_root();
    let app = ApplicationBuilder::new(Rc::new(host))
        .device(DeviceInfo {
            desktop: true,
            electron: true,
            ..DeviceInfo::default()
        })
        .build()
        .unwrap();
    assert_eq!(app.theme(), Theme::Aurora);
}

#[test]
fn test_theme_auto_resolves_md() {
    let (host, _root) = host_with_root();
    let app = ApplicationBuilder::new(Rc::new(host.clone())).build().unwrap();
    assert_eq!(app.theme(), Theme::Md);
    assert!(!host.document_element().has_class(CLASS_IOS_TRANSLUCENT_BARS));
}

#[test]
fn test_explicit_theme_is_used_verbatim() {
    let (host, _root) = host_with_root();
    let app = ApplicationBuilder::new(Rc::new(host))
        .device(DeviceInfo {
            ios: true,
            ..DeviceInfo::default()
        })
        .params(json!({ "theme": "aurora" }))
        .build()
        .unwrap();
    assert_eq!(app.theme(), Theme::Aurora);
}

#[test]
fn test_translucent_flags_can_be_disabled() {
    let (host, _root) = host_with_root();
    ApplicationBuilder::new(Rc::new(host.clone()))
        .device(DeviceInfo {
            ios: true,
            ..DeviceInfo::default()
        })
        .params(json!({ "iosTranslucentBars": false }))
        .build()
        .unwrap();

    let html = host.document_element();
    assert!(!html.has_class(CLASS_IOS_TRANSLUCENT_BARS));
    assert!(html.has_class(CLASS_IOS_TRANSLUCENT_MODALS));
}

#[test]
fn test_rtl_root_sets_dir_attribute() {
    let (host, root) = host_with_root();
    root.set_style("direction", Some("rtl"));

    let app = ApplicationBuilder::new(Rc::new(host.clone())).build().unwrap();

    assert!(app.is_rtl());
    assert_eq!(host.document_element().attr("dir").as_deref(), Some("rtl"));
}

#[test]
fn test_identity_and_data_params() {
    let (host, _root) = host_with_root();
    let app = ApplicationBuilder::new(Rc::new(host.with_language("fr-FR")))
        .params(json!({
            "id": "com.example.demo",
            "name": "Demo",
            "version": "2.1.0",
            "data": { "user": "ada" },
        }))
        .build()
        .unwrap();

    assert_eq!(app.id(), "com.example.demo");
    assert_eq!(app.name(), "Demo");
    assert_eq!(app.version(), "2.1.0");
    assert_eq!(app.language(), "fr-FR");
    assert_eq!(app.data()["user"], json!("ada"));
    assert_eq!(app.passed_params()["name"], json!("Demo"));
    assert!(app.passed_params().get("theme").is_none());
    assert_eq!(app.params()["theme"], json!("auto"));
}

#[test]
fn test_invalid_params_fail_construction() {
    let (host, _root) = host_with_root();
    let result = ApplicationBuilder::new(Rc::new(host))
        .params(json!({ "theme": "windows" }))
        .build();
    assert!(matches!(result, Err(AppError::InvalidParams(_))));
    assert!(Application::instance().is_none());
}

#[test]
fn test_missing_root_still_initializes() {
    let host = HeadlessHost::new();
    let app = ApplicationBuilder::new(Rc::new(host)).build().unwrap();
    assert!(app.root().is_none());
    assert!(app.is_initialized());
}

#[test]
fn test_device_ready_defers_init() {
    let (host, _root) = host_with_root();
    let app = ApplicationBuilder::new(Rc::new(host.clone()))
        .device(DeviceInfo {
            cordova: true,
            ..DeviceInfo::default()
        })
        .build()
        .unwrap();
    let inits = count_events(&app, AppEventKind::Init);

    assert_eq!(app.state(), InitState::Constructed);
    host.fire_device_ready();
    assert!(app.is_initialized());
    assert_eq!(inits.get(), 1);
}

#[test]
fn test_device_ready_deferral_can_be_turned_off() {
    let (host, _root) = host_with_root();
    let app = ApplicationBuilder::new(Rc::new(host))
        .device(DeviceInfo {
            cordova: true,
            ..DeviceInfo::default()
        })
        .params(json!({ "initOnDeviceReady": false }))
        .build()
        .unwrap();
    assert!(app.is_initialized());
}

#[test]
fn test_connectivity_changes_emit_events() {
    let (host, _root) = host_with_root();
    let app = ApplicationBuilder::new(Rc::new(host.clone())).build().unwrap();
    let seen = Rc::new(RefCell::new(Vec::new()));
    for kind in [AppEventKind::Online, AppEventKind::Offline, AppEventKind::Connection] {
        let sink = Rc::clone(&seen);
        app.on(kind, move |event| {
            sink.borrow_mut().push(event.clone());
            Ok(())
        });
    }

    assert!(app.is_online());
    host.set_online(false);
    assert!(!app.is_online());
    host.set_online(true);

    assert_eq!(
        *seen.borrow(),
        vec![
            AppEvent::Offline,
            AppEvent::Connection(false),
            AppEvent::Online,
            AppEvent::Connection(true),
        ]
    );
}

struct ShellComponent {
    fail: bool,
}

#[async_trait(?Send)]
impl RootComponent for ShellComponent {
    fn name(&self) -> &str {
        "shell"
    }

    async fn mount(&self, app: &Application, root: Option<ElementRef>) -> anyhow::Result<ElementRef> {
        tokio::task::yield_now().await;
        if self.fail {
            anyhow::bail!("template missing");
        }
        assert!(!app.is_initialized());
        let parent = root.ok_or_else(|| anyhow::anyhow!("no root"))?;
        Ok(app.host().create_element_before("div", "shell-view", &parent))
    }
}

#[tokio::test]
async fn test_root_component_loads_before_finalize() {
    let (host, root) = host_with_root();
    let app = ApplicationBuilder::new(Rc::new(host.clone()))
        .root_component(Rc::new(ShellComponent { fail: false }))
        .build()
        .unwrap();
    let inits = count_events(&app, AppEventKind::Init);

    // The load is scheduled on the host, not run inline
    assert!(!app.is_initialized());
    assert_eq!(host.pending_tasks(), 1);

    host.run_pending().await;

    assert!(app.is_initialized());
    assert_eq!(inits.get(), 1);
    let new_root = app.root().expect("root rebound");
    assert!(new_root.has_class("shell-view"));
    assert!(new_root.has_class(CLASS_ROOT));
    assert!(!root.has_class(CLASS_ROOT));
}

#[tokio::test]
async fn test_root_component_failure_reverts_state() {
    let (host, _root) = host_with_root();
    let app = ApplicationBuilder::new(Rc::new(host))
        .params(json!({ "init": false }))
        .root_component(Rc::new(ShellComponent { fail: true }))
        .build()
        .unwrap();
    let inits = count_events(&app, AppEventKind::Init);

    let result = app.initialize().await;

    assert!(matches!(result, Err(AppError::RootComponent(_))));
    assert_eq!(app.state(), InitState::Constructed);
    assert_eq!(inits.get(), 0);
}

#[tokio::test]
async fn test_repeated_init_schedules_one_load() {
    let (host, _root) = host_with_root();
    let app = ApplicationBuilder::new(Rc::new(host.clone()))
        .params(json!({ "init": false }))
        .root_component(Rc::new(ShellComponent { fail: false }))
        .build()
        .unwrap();
    let inits = count_events(&app, AppEventKind::Init);

    app.init();
    app.init();

    assert_eq!(app.state(), InitState::Initializing);
    assert_eq!(host.pending_tasks(), 1);
    assert!(matches!(app.initialize().await, Err(AppError::InitInProgress)));

    host.run_pending().await;

    assert!(app.is_initialized());
    assert_eq!(inits.get(), 1);
    assert!(app.initialize().await.is_ok());
}

#[tokio::test]
async fn test_failed_scheduled_init_can_be_retried() {
    let (host, _root) = host_with_root();
    let app = ApplicationBuilder::new(Rc::new(host.clone()))
        .params(json!({ "init": false }))
        .root_component(Rc::new(ShellComponent { fail: true }))
        .build()
        .unwrap();

    app.init();
    host.run_pending().await;

    assert_eq!(app.state(), InitState::Constructed);
    app.init();
    assert_eq!(host.pending_tasks(), 1);
}
