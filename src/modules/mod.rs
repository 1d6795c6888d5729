//! Installable capability modules.
//!
//! A [`Module`] is a typed contribution record. Instead of patching the
//! application object at runtime, a module declares what it adds:
//!
//! * `params` - configuration defaults, merged before the caller's overrides
//! * properties - plain values readable through `Application::property`
//! * capabilities - typed objects built against the application, readable
//!   through `Application::capability::<T>()`
//! * methods - shared functions callable through `Application::call`
//! * hooks - lifecycle handlers registered on the application's event bus

use crate::app::{AppEvent, AppEventKind, Application};
use crate::params::Configuration;
use serde_json::Value;
use std::any::{Any, TypeId};
use std::fmt;
use std::rc::Rc;

pub mod registry;

pub use registry::ModuleRegistry;

/// A shared method contributed by a module.
pub type Method = Rc<dyn Fn(&Application, &[Value]) -> anyhow::Result<Value>>;

/// A lifecycle hook contributed by a module.
pub type Hook = Rc<dyn Fn(&Application, &AppEvent) -> anyhow::Result<()>>;

/// Builds a capability object once the application exists.
pub type CapabilityFactory = Rc<dyn Fn(&Application) -> Rc<dyn Any>>;

pub(crate) struct CapabilityEntry {
    pub type_id: TypeId,
    pub type_name: &'static str,
    pub factory: CapabilityFactory,
}

pub struct Module {
    name: String,
    params: Configuration,
    properties: Vec<(String, Value)>,
    capabilities: Vec<CapabilityEntry>,
    methods: Vec<(String, Method)>,
    hooks: Vec<(AppEventKind, Hook)>,
}

impl Module {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            params: Configuration::new(),
            properties: Vec::new(),
            capabilities: Vec::new(),
            methods: Vec::new(),
            hooks: Vec::new(),
        }
    }

    /// Configuration defaults. Only JSON objects are accepted.
    pub fn params(mut self, params: Value) -> Self {
        match params {
            Value::Object(map) => self.params = map,
            other => log::warn!("module '{}': ignoring non-object params {}", self.name, other),
        }
        self
    }

    pub fn property(mut self, name: impl Into<String>, value: Value) -> Self {
        self.properties.push((name.into(), value));
        self
    }

    /// Register a typed capability. A later module registering the same type
    /// shadows this one.
    pub fn capability<T, F>(mut self, factory: F) -> Self
    where
        T: 'static,
        F: Fn(&Application) -> T + 'static,
    {
        self.capabilities.push(CapabilityEntry {
            type_id: TypeId::of::<T>(),
            type_name: std::any::type_name::<T>(),
            factory: Rc::new(move |app: &Application| Rc::new(factory(app)) as Rc<dyn Any>),
        });
        self
    }

    pub fn method<F>(mut self, name: impl Into<String>, method: F) -> Self
    where
        F: Fn(&Application, &[Value]) -> anyhow::Result<Value> + 'static,
    {
        self.methods.push((name.into(), Rc::new(method)));
        self
    }

    pub fn on<F>(mut self, kind: AppEventKind, hook: F) -> Self
    where
        F: Fn(&Application, &AppEvent) -> anyhow::Result<()> + 'static,
    {
        self.hooks.push((kind, Rc::new(hook)));
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn defaults(&self) -> &Configuration {
        &self.params
    }

    pub(crate) fn properties(&self) -> &[(String, Value)] {
        &self.properties
    }

    pub(crate) fn capabilities(&self) -> &[CapabilityEntry] {
        &self.capabilities
    }

    pub(crate) fn methods(&self) -> &[(String, Method)] {
        &self.methods
    }

    pub(crate) fn hooks(&self) -> &[(AppEventKind, Hook)] {
        &self.hooks
    }
}

impl fmt::Debug for Module {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Module")
            .field("name", &self.name)
            .field("params", &self.params)
            .field("properties", &self.properties.len())
            .field(
                "capabilities",
                &self.capabilities.iter().map(|c| c.type_name).collect::<Vec<_>>(),
            )
            .field("methods", &self.methods.iter().map(|(n, _)| n).collect::<Vec<_>>())
            .field("hooks", &self.hooks.iter().map(|(k, _)| k).collect::<Vec<_>>())
            .finish()
    }
}
