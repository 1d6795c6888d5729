//! Init state machine: `Constructed -> Initializing -> Initialized`.
//!
//! With a root component configured, initialization runs in two phases:
//! `load_root_component` (asynchronous) and then
//! `finalize_init` (synchronous). Without one, only the second phase runs.

use super::{AppError, AppEvent, Application, InitState};
use crate::constants::{
    ATTR_DIR, CLASS_INITIALIZING, CLASS_IOS_TRANSLUCENT_BARS, CLASS_IOS_TRANSLUCENT_MODALS, CLASS_ROOT,
};
use crate::device::Theme;
use std::rc::Rc;

impl Application {
    /// Start initialization.
    ///
    /// Without a root component this completes synchronously. With one, the
    /// two-phase load is scheduled on the host and completes when the host
    /// runs it. Calling `init` again once
    /// initialization has started or finished does nothing.
    pub fn init(&self) {
        if self.state() != InitState::Constructed {
            log::debug!("init() ignored in state {:?}", self.state());
            return;
        }
        self.inner.state.set(InitState::Initializing);
        if self.inner.root_component.is_none() {
            self.finalize_init();
            return;
        }
        let app = self.clone();
        self.inner.host.spawn_local(Box::pin(async move {
            if let Err(e) = app.run_init().await {
                log::error!("application init failed: {}", e);
            }
        }));
    }

    /// Run initialization to completion.
    ///
    /// Returns `Ok` at once when already initialized and
    /// [`AppError::InitInProgress`] while another initialization is running.
    /// A root-component failure leaves the application in `Constructed`, so
    /// initialization may be attempted again.
    pub async fn initialize(&self) -> Result<(), AppError> {
        match self.state() {
            InitState::Initialized => return Ok(()),
            InitState::Initializing => return Err(AppError::InitInProgress),
            InitState::Constructed => {}
        }
        self.inner.state.set(InitState::Initializing);
        self.run_init().await
    }

    /// Both phases, entered in `Initializing`.
    async fn run_init(&self) -> Result<(), AppError> {
        if let Some(component) = self.inner.root_component.clone() {
            if let Err(e) = self.load_root_component(component).await {
                self.inner.state.set(InitState::Constructed);
                return Err(e);
            }
        }

        self.finalize_init();
        Ok(())
    }

    /// First phase: mount the root component and rebind the root element to
    /// the element it produced.
    async fn load_root_component(&self, component: Rc<dyn super::RootComponent>) -> Result<(), AppError> {
        log::info!("loading root component '{}'", component.name());
        let current = self.root();
        let element = component
            .mount(self, current)
            .await
            .map_err(|e| AppError::RootComponent(format!("{}: {:#}", component.name(), e)))?;
        *self.inner.root.borrow_mut() = Some(element);
        Ok(())
    }

    /// Second phase: apply document markers, attach watchers, emit `Init` and
    /// flush the ready queue.
    fn finalize_init(&self) {
        let html = self.inner.host.document_element();
        let root = self.root();

        if let Some(root) = &root {
            root.add_class(CLASS_INITIALIZING);
        }

        if self.is_rtl() {
            html.set_attr(ATTR_DIR, "rtl");
        }

        if self.inner.core.auto_dark_theme {
            self.enable_auto_dark_theme();
        }

        self.watch_connectivity();

        if let Some(root) = &root {
            root.add_class(CLASS_ROOT);
        }

        for theme in Theme::ALL {
            html.remove_class(theme.class_name());
        }
        html.add_class(self.theme().class_name());

        let ios = self.theme() == Theme::Ios && self.device().ios;
        if ios && self.inner.core.ios_translucent_bars {
            html.add_class(CLASS_IOS_TRANSLUCENT_BARS);
        }
        if ios && self.inner.core.ios_translucent_modals {
            html.add_class(CLASS_IOS_TRANSLUCENT_MODALS);
        }

        if let Some(root) = root {
            self.inner.host.next_frame(Box::new(move || root.remove_class(CLASS_INITIALIZING)));
        }

        self.inner.state.set(InitState::Initialized);
        log::info!("application '{}' initialized", self.name());
        self.emit(AppEvent::Init);
        self.inner.ready.flush(self);
    }

    fn watch_connectivity(&self) {
        if self.inner.connectivity.get().is_some() {
            return;
        }
        let weak = self.downgrade();
        let subscription = self.inner.host.watch_connectivity(Rc::new(move |online: bool| {
            if let Some(app) = weak.upgrade() {
                app.set_online(online);
            }
        }));
        self.inner.connectivity.set(Some(subscription));
    }
}
