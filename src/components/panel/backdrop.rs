//! Shared panel backdrop with reference-counted ownership.
//!
//! All panels share one backdrop element. The first lease creates it (unless
//! an existing element is supplied or already present), every panel holds a
//! lease for its lifetime, and dropping the last lease removes the element if
//! the registry created it.

use crate::constants::{CLASS_PANEL_BACKDROP, CLASS_PANEL_BACKDROP_IN};
use crate::host::{ElementRef, Host};
use std::cell::{Cell, RefCell};
use std::rc::Rc;

struct Shared {
    host: Rc<dyn Host>,
    element: RefCell<Option<ElementRef>>,
    owned: Cell<bool>,
    leases: Cell<usize>,
    visible: Cell<usize>,
}

#[derive(Clone)]
pub struct BackdropRegistry {
    shared: Rc<Shared>,
}

impl BackdropRegistry {
    pub fn new(host: Rc<dyn Host>) -> Self {
        Self {
            shared: Rc::new(Shared {
                host,
                element: RefCell::new(None),
                owned: Cell::new(false),
                leases: Cell::new(0),
                visible: Cell::new(0),
            }),
        }
    }

    /// Take a lease on the backdrop, creating it right before `panel` when
    /// none exists. `selector` names a custom backdrop element.
    pub fn acquire(&self, panel: &ElementRef, selector: Option<&str>) -> BackdropLease {
        let shared = &self.shared;
        let existing = shared.element.borrow().clone();
        let element = match existing {
            Some(element) => element,
            None => {
                let found = selector
                    .and_then(|s| shared.host.query(s))
                    .or_else(|| shared.host.query(&format!(".{}", CLASS_PANEL_BACKDROP)));
                let element = match found {
                    Some(element) => {
                        shared.owned.set(false);
                        element
                    }
                    None => {
                        log::debug!("creating shared panel backdrop");
                        shared.owned.set(true);
                        shared.host.create_element_before("div", CLASS_PANEL_BACKDROP, panel)
                    }
                };
                *shared.element.borrow_mut() = Some(Rc::clone(&element));
                element
            }
        };
        shared.leases.set(shared.leases.get() + 1);
        BackdropLease {
            shared: Rc::clone(&self.shared),
            element,
            showing: Cell::new(false),
        }
    }

    pub fn element(&self) -> Option<ElementRef> {
        self.shared.element.borrow().clone()
    }

    pub fn lease_count(&self) -> usize {
        self.shared.leases.get()
    }
}

/// One panel's share of the backdrop.
pub struct BackdropLease {
    shared: Rc<Shared>,
    element: ElementRef,
    showing: Cell<bool>,
}

impl BackdropLease {
    pub fn element(&self) -> ElementRef {
        Rc::clone(&self.element)
    }

    pub fn show(&self) {
        if self.showing.replace(true) {
            return;
        }
        self.shared.visible.set(self.shared.visible.get() + 1);
        self.element.add_class(CLASS_PANEL_BACKDROP_IN);
    }

    /// Hides the backdrop once no other lease is showing it.
    pub fn hide(&self) {
        if !self.showing.replace(false) {
            return;
        }
        let visible = self.shared.visible.get().saturating_sub(1);
        self.shared.visible.set(visible);
        if visible == 0 {
            self.element.remove_class(CLASS_PANEL_BACKDROP_IN);
        }
    }
}

impl Drop for BackdropLease {
    fn drop(&mut self) {
        self.hide();
        let leases = self.shared.leases.get().saturating_sub(1);
        self.shared.leases.set(leases);
        if leases > 0 {
            return;
        }
        if self.shared.owned.get() {
            log::debug!("removing shared panel backdrop");
            self.shared.host.remove_element(&self.element);
        }
        self.shared.element.borrow_mut().take();
    }
}
