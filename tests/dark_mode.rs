use appshell::app::{AppEvent, AppEventKind, Application, ApplicationBuilder};
use appshell::constants::{CLASS_THEME_DARK, MEDIA_DARK, MEDIA_LIGHT};
use appshell::host::{HeadlessHost, Host};
use serde_json::json;
use std::cell::RefCell;
use std::rc::Rc;

fn build(host: &HeadlessHost, auto: bool) -> Application {
    host.append_to_body("div", Some("app"));
    ApplicationBuilder::new(Rc::new(host.clone()))
        .params(json!({ "autoDarkTheme": auto }))
        .build()
        .unwrap()
}

fn record(app: &Application) -> Rc<RefCell<Vec<bool>>> {
    let seen = Rc::new(RefCell::new(Vec::new()));
    let sink = Rc::clone(&seen);
    app.on(AppEventKind::DarkThemeChange, move |event| {
        if let AppEvent::DarkThemeChange(dark) = event {
            sink.borrow_mut().push(*dark);
        }
        Ok(())
    });
    seen
}

#[test]
fn test_enable_reports_current_dark_preference() {
    let host = HeadlessHost::new();
    host.set_media(MEDIA_DARK, true);
    host.set_media(MEDIA_LIGHT, false);
    let app = build(&host, false);
    let seen = record(&app);

    app.enable_auto_dark_theme();

    assert!(app.is_dark_theme());
    assert!(app.is_auto_dark_theme_enabled());
    assert_eq!(*seen.borrow(), vec![true]);
    assert!(host.document_element().has_class(CLASS_THEME_DARK));
}

#[test]
fn test_preference_changes_follow_the_system() {
    let host = HeadlessHost::new();
    host.set_media(MEDIA_LIGHT, true);
    let app = build(&host, false);
    let seen = record(&app);

    app.enable_auto_dark_theme();
    assert!(!app.is_dark_theme());

    host.set_media(MEDIA_LIGHT, false);
    host.set_media(MEDIA_DARK, true);
    assert!(app.is_dark_theme());

    host.set_media(MEDIA_DARK, false);
    host.set_media(MEDIA_LIGHT, true);
    assert!(!app.is_dark_theme());
    assert!(!host.document_element().has_class(CLASS_THEME_DARK));

    assert_eq!(*seen.borrow(), vec![false, true, false]);
}

#[test]
fn test_disable_stops_further_events() {
    let host = HeadlessHost::new();
    host.set_media(MEDIA_DARK, true);
    let app = build(&host, false);
    let seen = record(&app);

    app.enable_auto_dark_theme();
    app.disable_auto_dark_theme();
    assert!(!app.is_auto_dark_theme_enabled());
    assert_eq!(host.media_listener_count(MEDIA_DARK), 0);
    assert_eq!(host.media_listener_count(MEDIA_LIGHT), 0);

    host.set_media(MEDIA_DARK, false);
    host.set_media(MEDIA_LIGHT, true);
    assert_eq!(*seen.borrow(), vec![true]);
}

#[test]
fn test_disable_without_enable_is_noop() {
    let host = HeadlessHost::new();
    let app = build(&host, false);
    app.disable_auto_dark_theme();
    assert!(!app.is_auto_dark_theme_enabled());
}

#[test]
fn test_enable_twice_registers_once() {
    let host = HeadlessHost::new();
    host.set_media(MEDIA_DARK, true);
    let app = build(&host, false);
    let seen = record(&app);

    app.enable_auto_dark_theme();
    app.enable_auto_dark_theme();

    assert_eq!(host.media_listener_count(MEDIA_DARK), 1);
    assert_eq!(*seen.borrow(), vec![true]);
}

#[test]
fn test_unsupported_host_is_silent() {
    let host = HeadlessHost::new().without_media_queries();
    let app = build(&host, true);
    let seen = record(&app);

    app.enable_auto_dark_theme();

    assert!(!app.is_auto_dark_theme_enabled());
    assert!(!app.is_dark_theme());
    assert!(seen.borrow().is_empty());
}

#[test]
fn test_auto_dark_theme_param_enables_during_init() {
    let host = HeadlessHost::new();
    host.set_media(MEDIA_DARK, true);
    let app = build(&host, true);

    assert!(app.is_auto_dark_theme_enabled());
    assert!(app.is_dark_theme());
}
