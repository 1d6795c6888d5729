//! The application context.
//!
//! An [`Application`] owns the merged configuration, the installed module
//! contributions, the event bus, the device and theme facts and the init
//! state machine. Exactly one may exist on the UI thread; it lives until the
//! thread ends and is handed by reference to everything that needs it
//! (module hooks, component adapters).
//!
//! Construction goes through [`ApplicationBuilder`]:
//!
//! ```no_run
//! use appshell::app::ApplicationBuilder;
//! use appshell::host::HeadlessHost;
//! use serde_json::json;
//! use std::rc::Rc;
//!
//! let host = HeadlessHost::new();
//! host.append_to_body("div", Some("app"));
//! let app = ApplicationBuilder::new(Rc::new(host))
//!     .params(json!({ "name": "demo", "theme": "md" }))
//!     .build()
//!     .expect("first application on this thread");
//! assert!(app.is_initialized());
//! ```

use crate::constants::{
    DEFAULT_APP_ID, DEFAULT_APP_NAME, DEFAULT_APP_VERSION, DEFAULT_ROOT, RESERVED_PARAMS, STYLE_DIRECTION,
};
use crate::device::{DeviceInfo, Theme, ThemeSetting};
use crate::events::{BusEvent, EventBus, ListenerId};
use crate::host::{ElementRef, Host, Subscription};
use crate::modules::{Method, Module, ModuleRegistry};
use crate::params::{Configuration, ParamStore};
use async_trait::async_trait;
use once_cell::unsync::OnceCell;
use serde::Deserialize;
use serde_json::{json, Value};
use std::any::{Any, TypeId};
use std::cell::{Cell, RefCell};
use std::collections::HashMap;
use std::fmt;
use std::rc::{Rc, Weak};

pub mod dark_mode;
mod lifecycle;
pub mod ready;

pub use dark_mode::DarkModeWatcher;
pub use ready::ReadyQueue;

thread_local! {
    static INSTANCE: OnceCell<Application> = const { OnceCell::new() };
}

/// Events emitted on the application bus.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AppEvent {
    Init,
    DarkThemeChange(bool),
    Online,
    Offline,
    Connection(bool),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AppEventKind {
    Init,
    DarkThemeChange,
    Online,
    Offline,
    Connection,
}

impl BusEvent for AppEvent {
    type Kind = AppEventKind;

    fn kind(&self) -> AppEventKind {
        match self {
            AppEvent::Init => AppEventKind::Init,
            AppEvent::DarkThemeChange(_) => AppEventKind::DarkThemeChange,
            AppEvent::Online => AppEventKind::Online,
            AppEvent::Offline => AppEventKind::Offline,
            AppEvent::Connection(_) => AppEventKind::Connection,
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[error("application is already initialized and can't be initialized more than once")]
    DoubleInitialization,
    #[error("application initialization is already in progress")]
    InitInProgress,
    #[error("failed to load root component: {0}")]
    RootComponent(String),
    #[error("invalid application params: {0}")]
    InvalidParams(#[from] serde_json::Error),
}

/// Position in the init state machine.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InitState {
    Constructed,
    Initializing,
    Initialized,
}

/// Typed view of the core keys of the merged configuration.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AppParams {
    pub id: String,
    pub name: String,
    pub version: String,
    pub root: String,
    pub theme: ThemeSetting,
    pub language: String,
    pub init: bool,
    pub init_on_device_ready: bool,
    #[serde(default)]
    pub auto_dark_theme: bool,
    #[serde(default = "enabled")]
    pub ios_translucent_bars: bool,
    #[serde(default = "enabled")]
    pub ios_translucent_modals: bool,
    #[serde(default)]
    pub data: Value,
}

fn enabled() -> bool {
    true
}

/// A whole-application component mounted into the root element before the
/// rest of initialization runs.
#[async_trait(?Send)]
pub trait RootComponent {
    fn name(&self) -> &str;

    /// Mount into `root` (if any) and return the element that becomes the
    /// application's root.
    async fn mount(&self, app: &Application, root: Option<ElementRef>) -> anyhow::Result<ElementRef>;
}

/// Core defaults, before any module or caller layer.
pub fn core_defaults(language: &str) -> Configuration {
    let defaults = json!({
        "id": DEFAULT_APP_ID,
        "name": DEFAULT_APP_NAME,
        "version": DEFAULT_APP_VERSION,
        "root": DEFAULT_ROOT,
        "theme": "auto",
        "language": language,
        "init": true,
        "initOnDeviceReady": true,
        "autoDarkTheme": false,
        "iosTranslucentBars": true,
        "iosTranslucentModals": true,
        "data": {},
    });
    match defaults {
        Value::Object(map) => map,
        _ => Configuration::new(),
    }
}

pub struct ApplicationBuilder {
    host: Rc<dyn Host>,
    device: DeviceInfo,
    registry: ModuleRegistry,
    overrides: Configuration,
    root_component: Option<Rc<dyn RootComponent>>,
}

impl ApplicationBuilder {
    pub fn new(host: Rc<dyn Host>) -> Self {
        Self {
            host,
            device: DeviceInfo::default(),
            registry: ModuleRegistry::new(),
            overrides: Configuration::new(),
            root_component: None,
        }
    }

    pub fn device(mut self, device: DeviceInfo) -> Self {
        self.device = device;
        self
    }

    pub fn module(mut self, module: Module) -> Self {
        self.registry.install(module);
        self
    }

    pub fn modules<I>(mut self, modules: I) -> Self
    where
        I: IntoIterator<Item = Module>,
    {
        self.registry.install_all(modules);
        self
    }

    /// Caller overrides. Merged over every default; non-objects are ignored.
    pub fn params(mut self, params: Value) -> Self {
        match params {
            Value::Object(map) => crate::params::deep_merge(&mut self.overrides, &map),
            other => log::warn!("ignoring non-object application params {}", other),
        }
        self
    }

    pub fn root_component(mut self, component: Rc<dyn RootComponent>) -> Self {
        self.root_component = Some(component);
        self
    }

    pub fn build(self) -> Result<Application, AppError> {
        Application::create(self)
    }
}

pub(crate) struct AppInner {
    host: Rc<dyn Host>,
    device: DeviceInfo,
    params: Configuration,
    passed_params: Configuration,
    core: AppParams,
    theme: Theme,
    rtl: bool,
    modules: Vec<String>,
    root: RefCell<Option<ElementRef>>,
    root_component: Option<Rc<dyn RootComponent>>,
    online: Cell<bool>,
    dark_theme: Cell<bool>,
    state: Cell<InitState>,
    events: EventBus<AppEvent>,
    ready: ReadyQueue,
    dark_mode: DarkModeWatcher,
    connectivity: Cell<Option<Subscription>>,
    properties: RefCell<HashMap<String, Value>>,
    capabilities: RefCell<HashMap<TypeId, Rc<dyn Any>>>,
    methods: RefCell<HashMap<String, Method>>,
}

/// Handle to the application. Cloning is cheap and yields the same instance.
#[derive(Clone)]
pub struct Application {
    inner: Rc<AppInner>,
}

/// Non-owning handle, used by listeners the application itself registers.
#[derive(Clone)]
pub struct WeakApplication {
    inner: Weak<AppInner>,
}

impl WeakApplication {
    pub fn upgrade(&self) -> Option<Application> {
        self.inner.upgrade().map(|inner| Application { inner })
    }
}

impl Application {
    /// Build the application, install modules and, when the `init` param is
    /// set, start initialization.
    ///
    /// Fails with [`AppError::DoubleInitialization`] if an application already
    /// exists on this thread.
    pub fn create(builder: ApplicationBuilder) -> Result<Self, AppError> {
        if Self::instance().is_some() {
            return Err(AppError::DoubleInitialization);
        }

        let ApplicationBuilder {
            host,
            device,
            registry,
            overrides,
            root_component,
        } = builder;

        let store = ParamStore::new(core_defaults(&host.language()), RESERVED_PARAMS);
        let outcome = store.merge(registry.defaults(), &overrides);
        let core: AppParams = serde_json::from_value(Value::Object(outcome.config.clone()))?;

        let root = host.query(&core.root);
        if root.is_none() {
            log::warn!("root element '{}' not found", core.root);
        }
        let rtl = root
            .as_ref()
            .and_then(|el| el.style(STYLE_DIRECTION))
            .is_some_and(|dir| dir == "rtl");
        let theme = core.theme.resolve(&device);
        let dark_mode = DarkModeWatcher::new(host.as_ref());

        let inner = AppInner {
            online: Cell::new(host.is_online()),
            host,
            device,
            params: outcome.config,
            passed_params: overrides,
            theme,
            rtl,
            modules: registry.names(),
            root: RefCell::new(root),
            root_component,
            dark_theme: Cell::new(false),
            state: Cell::new(InitState::Constructed),
            events: EventBus::new("app"),
            ready: ReadyQueue::new(),
            dark_mode,
            connectivity: Cell::new(None),
            properties: RefCell::new(HashMap::new()),
            capabilities: RefCell::new(HashMap::new()),
            methods: RefCell::new(HashMap::new()),
            core,
        };
        let app = Self { inner: Rc::new(inner) };

        INSTANCE.with(|slot| slot.set(app.clone())).map_err(|_| AppError::DoubleInitialization)?;
        log::info!(
            "application '{}' ({}) created with theme {}",
            app.name(),
            app.id(),
            app.theme()
        );

        registry.attach(&app);

        if app.inner.core.init {
            if app.inner.device.cordova && app.inner.core.init_on_device_ready {
                let weak = app.downgrade();
                app.inner.host.on_device_ready(Box::new(move || {
                    if let Some(app) = weak.upgrade() {
                        app.init();
                    }
                }));
            } else {
                app.init();
            }
        }

        Ok(app)
    }

    /// The application living on this thread, if one was created.
    pub fn instance() -> Option<Self> {
        INSTANCE.with(|slot| slot.get().cloned())
    }

    pub fn downgrade(&self) -> WeakApplication {
        WeakApplication {
            inner: Rc::downgrade(&self.inner),
        }
    }

    pub fn id(&self) -> &str {
        &self.inner.core.id
    }

    pub fn name(&self) -> &str {
        &self.inner.core.name
    }

    pub fn version(&self) -> &str {
        &self.inner.core.version
    }

    pub fn language(&self) -> &str {
        &self.inner.core.language
    }

    pub fn theme(&self) -> Theme {
        self.inner.theme
    }

    pub fn is_rtl(&self) -> bool {
        self.inner.rtl
    }

    pub fn is_online(&self) -> bool {
        self.inner.online.get()
    }

    pub fn is_dark_theme(&self) -> bool {
        self.inner.dark_theme.get()
    }

    pub fn device(&self) -> &DeviceInfo {
        &self.inner.device
    }

    pub fn host(&self) -> Rc<dyn Host> {
        Rc::clone(&self.inner.host)
    }

    /// The merged, read-only configuration.
    pub fn params(&self) -> &Configuration {
        &self.inner.params
    }

    pub fn app_params(&self) -> &AppParams {
        &self.inner.core
    }

    /// Overrides exactly as the caller passed them.
    pub fn passed_params(&self) -> &Configuration {
        &self.inner.passed_params
    }

    pub fn data(&self) -> &Value {
        &self.inner.core.data
    }

    /// Names of installed modules, in install order.
    pub fn modules(&self) -> &[String] {
        &self.inner.modules
    }

    pub fn root(&self) -> Option<ElementRef> {
        self.inner.root.borrow().clone()
    }

    pub fn state(&self) -> InitState {
        self.inner.state.get()
    }

    pub fn is_initialized(&self) -> bool {
        self.state() == InitState::Initialized
    }

    pub fn events(&self) -> &EventBus<AppEvent> {
        &self.inner.events
    }

    pub fn on<F>(&self, kind: AppEventKind, handler: F) -> ListenerId
    where
        F: Fn(&AppEvent) -> anyhow::Result<()> + 'static,
    {
        self.inner.events.on(kind, handler)
    }

    pub fn once<F>(&self, kind: AppEventKind, handler: F) -> ListenerId
    where
        F: Fn(&AppEvent) -> anyhow::Result<()> + 'static,
    {
        self.inner.events.once(kind, handler)
    }

    pub fn off(&self, kind: AppEventKind, id: Option<ListenerId>) -> usize {
        self.inner.events.off(kind, id)
    }

    pub fn emit(&self, event: AppEvent) {
        self.inner.events.emit(&event);
    }

    /// Run `callback` once the application is initialized: right away if it
    /// already is, otherwise right after the `Init` event.
    pub fn on_ready<F>(&self, callback: F)
    where
        F: FnOnce(&Application) + 'static,
    {
        if self.is_initialized() {
            callback(self);
        } else {
            self.inner.ready.push(Box::new(callback));
        }
    }

    /// Callbacks still waiting for initialization.
    pub fn pending_ready(&self) -> usize {
        self.inner.ready.len()
    }

    pub fn property(&self, name: &str) -> Option<Value> {
        self.inner.properties.borrow().get(name).cloned()
    }

    pub(crate) fn set_property(&self, name: &str, value: Value) {
        self.inner.properties.borrow_mut().insert(name.to_string(), value);
    }

    /// A capability registered by a module, by type.
    pub fn capability<T: 'static>(&self) -> Option<Rc<T>> {
        let capability = self.inner.capabilities.borrow().get(&TypeId::of::<T>()).cloned()?;
        capability.downcast::<T>().ok()
    }

    /// Returns `true` when an earlier capability of the same type was replaced.
    pub(crate) fn insert_capability(&self, type_id: TypeId, capability: Rc<dyn Any>) -> bool {
        self.inner.capabilities.borrow_mut().insert(type_id, capability).is_some()
    }

    pub(crate) fn add_method(&self, name: &str, method: Method) {
        self.inner.methods.borrow_mut().insert(name.to_string(), method);
    }

    pub fn has_method(&self, name: &str) -> bool {
        self.inner.methods.borrow().contains_key(name)
    }

    /// Call a module-provided method.
    pub fn call(&self, name: &str, args: &[Value]) -> anyhow::Result<Value> {
        let method = self.inner.methods.borrow().get(name).cloned();
        match method {
            Some(method) => method(self, args),
            None => anyhow::bail!("no method named '{}' is installed", name),
        }
    }

    pub(crate) fn set_online(&self, online: bool) {
        self.inner.online.set(online);
        if online {
            self.emit(AppEvent::Online);
        } else {
            self.emit(AppEvent::Offline);
        }
        self.emit(AppEvent::Connection(online));
    }
}

impl fmt::Debug for Application {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Application")
            .field("id", &self.id())
            .field("name", &self.name())
            .field("theme", &self.theme())
            .field("state", &self.state())
            .field("modules", &self.modules())
            .finish()
    }
}
