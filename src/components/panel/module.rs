//! The `panel` module: panel defaults, the [`Panels`] factory capability and
//! a `panelCount` method.

use super::{Panel, PanelEvent, PanelParams};
use crate::app::{AppEventKind, Application};
use crate::components::{ComponentError, Forwarders};
use crate::host::{ElementRef, Host};
use crate::modules::Module;
use crate::params::{deep_merge, Configuration};
use serde_json::{json, Value};
use std::cell::RefCell;
use std::rc::{Rc, Weak};

pub const PANEL_MODULE: &str = "panel";

/// Creates panels against the application's merged `panel` params.
pub struct Panels {
    host: Rc<dyn Host>,
    defaults: Configuration,
    backdrops: super::BackdropRegistry,
    created: RefCell<Vec<Weak<super::PanelInner>>>,
}

impl Panels {
    pub fn new(host: Rc<dyn Host>, defaults: Configuration) -> Self {
        Self {
            backdrops: super::BackdropRegistry::new(Rc::clone(&host)),
            host,
            defaults,
            created: RefCell::new(Vec::new()),
        }
    }

    fn from_app(app: &Application) -> Self {
        let defaults = match app.params().get(PANEL_MODULE) {
            Some(Value::Object(map)) => map.clone(),
            _ => Configuration::new(),
        };
        Self::new(app.host(), defaults)
    }

    /// Module-level defaults as typed params.
    pub fn defaults(&self) -> Result<PanelParams, ComponentError> {
        Ok(serde_json::from_value(Value::Object(self.defaults.clone()))?)
    }

    /// Build a panel on `el`. `overrides` are deep-merged over the module
    /// defaults.
    pub fn create(
        &self,
        el: ElementRef,
        overrides: &Configuration,
        forwarders: Forwarders<PanelEvent>,
    ) -> Result<Panel, ComponentError> {
        let mut merged = self.defaults.clone();
        deep_merge(&mut merged, overrides);
        let params: PanelParams = serde_json::from_value(Value::Object(merged))?;

        if params.min_width > params.max_width {
            return Err(ComponentError::Construction(format!(
                "minWidth {} exceeds maxWidth {}",
                params.min_width, params.max_width
            )));
        }

        let backdrop = params
            .backdrop
            .then(|| self.backdrops.acquire(&el, params.backdrop_el.as_deref()));
        let panel = Panel::new(Rc::clone(&self.host), el, params, backdrop, forwarders);
        self.created.borrow_mut().push(panel.downgrade());
        Ok(panel)
    }

    pub fn backdrops(&self) -> &super::BackdropRegistry {
        &self.backdrops
    }

    /// Panels created through this factory that are neither dropped nor
    /// destroyed.
    pub fn live_count(&self) -> usize {
        let mut created = self.created.borrow_mut();
        created.retain(|weak| Panel::upgrade(weak).is_some_and(|panel| !panel.is_destroyed()));
        created.len()
    }
}

/// Build the installable panel module.
pub fn panel_module() -> Module {
    let defaults = PanelParams::default();
    let params = match serde_json::to_value(&defaults) {
        Ok(value) => value,
        Err(e) => {
            log::error!("panel defaults are not serializable: {}", e);
            Value::Object(Configuration::new())
        }
    };

    Module::new(PANEL_MODULE)
        .params(json!({ "panel": params }))
        .capability(Panels::from_app)
        .method("panelCount", |app: &Application, _args: &[Value]| {
            let count = app.capability::<Panels>().map_or(0, |panels| panels.live_count());
            Ok(json!(count))
        })
        .on(AppEventKind::Init, |app: &Application, _event| {
            log::info!("panel module ready for '{}'", app.name());
            Ok(())
        })
}
