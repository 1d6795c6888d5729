//! Ordered, idempotent module registry.
//!
//! Installation happens in two steps because configuration must be final
//! before the application exists:
//!
//! 1. [`ModuleRegistry::install`] records the module and makes its params part
//!    of the pending defaults ([`ModuleRegistry::defaults`]).
//! 2. [`ModuleRegistry::attach`] runs once the application is constructed and,
//!    per module in install order, applies properties, capabilities, methods
//!    and finally lifecycle hooks.

use super::Module;
use crate::app::Application;
use crate::params::Configuration;
use std::rc::Rc;

#[derive(Debug, Default)]
pub struct ModuleRegistry {
    modules: Vec<Rc<Module>>,
}

impl ModuleRegistry {
    pub fn new() -> Self {
        Self { modules: Vec::new() }
    }

    /// Install a module. Installing a name that is already present is a no-op.
    ///
    /// Returns `true` when the module was added.
    pub fn install(&mut self, module: Module) -> bool {
        if self.has_module(module.name()) {
            log::debug!("module '{}' is already installed", module.name());
            return false;
        }
        log::debug!("installing module '{}'", module.name());
        self.modules.push(Rc::new(module));
        true
    }

    /// Install modules in iteration order.
    pub fn install_all<I>(&mut self, modules: I) -> usize
    where
        I: IntoIterator<Item = Module>,
    {
        modules.into_iter().map(|m| self.install(m)).filter(|added| *added).count()
    }

    pub fn has_module(&self, name: &str) -> bool {
        self.modules.iter().any(|m| m.name() == name)
    }

    pub fn names(&self) -> Vec<String> {
        self.modules.iter().map(|m| m.name().to_string()).collect()
    }

    pub fn len(&self) -> usize {
        self.modules.len()
    }

    pub fn is_empty(&self) -> bool {
        self.modules.is_empty()
    }

    /// Module defaults in install order, ready for `ParamStore::merge`.
    pub fn defaults(&self) -> impl Iterator<Item = (&str, &Configuration)> {
        self.modules.iter().map(|m| (m.name(), m.defaults()))
    }

    /// Apply every module's contributions to `app`.
    pub fn attach(&self, app: &Application) {
        for module in &self.modules {
            for (name, value) in module.properties() {
                app.set_property(name, value.clone());
            }
            for entry in module.capabilities() {
                let capability = (entry.factory)(app);
                if app.insert_capability(entry.type_id, capability) {
                    log::debug!("module '{}' shadows capability {}", module.name(), entry.type_name);
                }
            }
            for (name, method) in module.methods() {
                app.add_method(name, Rc::clone(method));
            }
            for (kind, hook) in module.hooks() {
                let weak = app.downgrade();
                let hook = Rc::clone(hook);
                app.events().on(*kind, move |event| match weak.upgrade() {
                    Some(app) => hook(&app, event),
                    None => Ok(()),
                });
            }
            log::info!("module '{}' attached", module.name());
        }
    }
}
