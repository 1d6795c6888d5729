//! The application running in a terminal.
//!
//! [`Shell`] owns a [`HeadlessHost`] standing in for the document, the
//! [`Application`] built from the loaded [`Config`], and one declarative panel
//! bound through [`ComponentAdapter`]. The terminal is the viewport: its width
//! drives the panel breakpoints, and pointer columns drive swipes. Rendering
//! only ever reads a [`ShellStatus`] snapshot.

use crate::app::{AppEventKind, Application, ApplicationBuilder};
use crate::components::panel::{panel_module, BreakpointMode, PanelAdapter, PanelProps, PanelState, Side};
use crate::components::ComponentAdapter;
use crate::config::Config;
use crate::constants::{CLASS_PANEL_BACKDROP_IN, MEDIA_DARK, MEDIA_LIGHT, PANEL_COLLAPSED_WIDTH};
use crate::device::Theme;
use crate::host::{ElementRef, HeadlessHost, Host};
use crate::params::get_path;
use crate::ui::core::Action;
use anyhow::Result;
use serde_json::Value;
use std::rc::Rc;

/// Panel facts needed to draw it.
#[derive(Debug, Clone, PartialEq)]
pub struct PanelStatus {
    pub state: PanelState,
    pub mode: BreakpointMode,
    pub side: Side,
    pub width: u16,
    pub resizable: bool,
    pub swiping: bool,
    pub swipe_offset: Option<u16>,
    pub classes: Vec<String>,
}

impl PanelStatus {
    /// Columns the panel covers, if it is visible at all.
    pub fn visible_width(&self) -> Option<u16> {
        match self.mode {
            BreakpointMode::Visible => Some(self.width),
            BreakpointMode::Collapsed => Some(PANEL_COLLAPSED_WIDTH),
            BreakpointMode::Normal => match self.state {
                PanelState::Opened | PanelState::Opening => Some(self.width),
                PanelState::Closing | PanelState::Closed => self.swipe_offset.filter(|w| *w > 0),
            },
        }
    }
}

/// Everything the front end displays.
#[derive(Debug, Clone, PartialEq)]
pub struct ShellStatus {
    pub name: String,
    pub id: String,
    pub version: String,
    pub language: String,
    pub theme: Theme,
    pub dark: bool,
    pub online: bool,
    pub rtl: bool,
    pub initialized: bool,
    pub modules: Vec<String>,
    pub document_classes: Vec<String>,
    pub viewport: u16,
    pub backdrop_visible: bool,
    pub panel: Option<PanelStatus>,
    pub panel_error: Option<String>,
}

pub struct Shell {
    host: HeadlessHost,
    app: Application,
    panel: ComponentAdapter<PanelAdapter>,
    viewport: u16,
    pointer_down: Option<u16>,
}

impl Shell {
    /// Build the document, the application and the panel for a viewport
    /// `viewport` columns wide.
    pub fn new(config: &Config, viewport: u16) -> Result<Self> {
        let host = HeadlessHost::new();
        let root = host.append_to_body("div", Some("app"));
        let panel_el = host.append(&root, "div", Some("panel"));
        host.append(&root, "div", Some("view"));

        let app = ApplicationBuilder::new(Rc::new(host.clone()))
            .device(config.device)
            .module(panel_module())
            .params(config.app_params())
            .build()?;

        app.on(AppEventKind::DarkThemeChange, |event| {
            log::info!("dark theme change: {:?}", event);
            Ok(())
        });
        app.on(AppEventKind::Connection, |event| {
            log::info!("connection change: {:?}", event);
            Ok(())
        });

        // A hybrid shell waits for device-ready; the terminal is ready now.
        host.fire_device_ready();

        let panel = ComponentAdapter::<PanelAdapter>::new(panel_el, Self::panel_props(&app));
        for name in ["panelOpened", "panelClosed", "panelBreakpoint", "panelCollapsedBreakpoint", "panelResize"] {
            panel.set_callback(name, move |event| log::info!("{}: {:?}", name, event));
        }
        panel.set_callback("panelBackdropClick", |_| log::debug!("backdrop clicked"));
        panel.mount(&app);

        let shell = Self {
            host,
            app,
            panel,
            viewport,
            pointer_down: None,
        };
        shell.apply_viewport();
        Ok(shell)
    }

    fn panel_props(app: &Application) -> PanelProps {
        let side = get_path(app.params(), "panel.side")
            .and_then(|value| serde_json::from_value::<Side>(value.clone()).ok())
            .unwrap_or(Side::Left);
        let resizable = get_path(app.params(), "panel.resizable").and_then(Value::as_bool);
        PanelProps {
            id: Some("panel".to_string()),
            side: Some(side),
            resizable,
            ..PanelProps::default()
        }
    }

    pub fn app(&self) -> &Application {
        &self.app
    }

    pub fn host(&self) -> &HeadlessHost {
        &self.host
    }

    pub fn panel(&self) -> &ComponentAdapter<PanelAdapter> {
        &self.panel
    }

    /// Run queued frame callbacks and local tasks.
    pub async fn tick(&self) -> usize {
        self.host.run_pending().await;
        self.host.run_frames()
    }

    /// Apply one action. Returns `false` for [`Action::Quit`].
    pub fn apply(&mut self, action: Action) -> bool {
        match action {
            Action::TogglePanel => {
                let opened = !self.panel.props().opened;
                self.update_props(|props| props.opened = opened);
            }
            Action::ToggleResizable => {
                let resizable = !self.panel.props().resizable.unwrap_or(false);
                self.update_props(|props| props.resizable = Some(resizable));
            }
            Action::ResizePanel(delta) => {
                if let Some(panel) = self.panel.instance() {
                    let width = (i32::from(panel.width()) + i32::from(delta)).clamp(0, i32::from(u16::MAX));
                    panel.resize(width as u16);
                }
            }
            Action::BackdropClick => self.backdrop_click(),
            Action::PointerDown(x) => self.pointer_down(x),
            Action::PointerMove(x) => {
                if let Some(panel) = self.panel.instance() {
                    panel.swipe_move(i32::from(x));
                }
            }
            Action::PointerUp(x) => self.pointer_up(x),
            Action::FlipDarkPreference => {
                let dark = !self.app.is_dark_theme();
                self.host.set_media(MEDIA_DARK, dark);
                self.host.set_media(MEDIA_LIGHT, !dark);
            }
            Action::FlipOnline => self.host.set_online(!self.app.is_online()),
            Action::ViewportResized(width) => {
                self.viewport = width;
                self.apply_viewport();
            }
            Action::Quit => return false,
            Action::None => {}
        }
        true
    }

    fn update_props(&self, change: impl FnOnce(&mut PanelProps)) {
        let mut props = self.panel.props().clone();
        change(&mut props);
        self.panel.update(props);
    }

    fn apply_viewport(&self) {
        if let Some(panel) = self.panel.instance() {
            panel.set_viewport_width(self.viewport);
        }
    }

    fn backdrop_click(&self) {
        let Some(panel) = self.panel.instance() else {
            return;
        };
        if panel.backdrop_click() && !panel.is_opened() {
            self.sync_opened_prop(false);
        }
    }

    fn pointer_down(&mut self, x: u16) {
        self.pointer_down = Some(x);
        if let Some(panel) = self.panel.instance() {
            panel.swipe_start(i32::from(x));
        }
    }

    fn pointer_up(&mut self, x: u16) {
        let down = self.pointer_down.take();
        let Some(panel) = self.panel.instance() else {
            return;
        };
        if panel.is_swiping() {
            panel.swipe_end();
        }
        let clicked = down == Some(x);
        if clicked && panel.breakpoint_mode() == BreakpointMode::Normal && !self.inside_panel(x) {
            panel.backdrop_click();
        }
        let opened = matches!(panel.state(), PanelState::Opened | PanelState::Opening);
        self.sync_opened_prop(opened);
    }

    /// Mirror the instance state into the `opened` prop after the panel
    /// changed on its own (swipe, backdrop).
    fn sync_opened_prop(&self, opened: bool) {
        if self.panel.props().opened != opened {
            self.update_props(|props| props.opened = opened);
        }
    }

    fn inside_panel(&self, x: u16) -> bool {
        let Some(status) = self.panel_status() else {
            return false;
        };
        let Some(width) = status.visible_width() else {
            return false;
        };
        match status.side {
            Side::Left => x < width,
            Side::Right => x >= self.viewport.saturating_sub(width),
        }
    }

    fn panel_status(&self) -> Option<PanelStatus> {
        let panel = self.panel.instance()?;
        let el: ElementRef = panel.el();
        Some(PanelStatus {
            state: panel.state(),
            mode: panel.breakpoint_mode(),
            side: panel.side(),
            width: panel.width(),
            resizable: panel.is_resizable(),
            swiping: panel.is_swiping(),
            swipe_offset: el.style("swipe-offset").and_then(|v| v.parse().ok()),
            classes: el.classes(),
        })
    }

    pub fn status(&self) -> ShellStatus {
        let backdrop_visible = self
            .panel
            .instance()
            .and_then(|panel| panel.backdrop_el())
            .is_some_and(|el| el.has_class(CLASS_PANEL_BACKDROP_IN));

        ShellStatus {
            name: self.app.name().to_string(),
            id: self.app.id().to_string(),
            version: self.app.version().to_string(),
            language: self.app.language().to_string(),
            theme: self.app.theme(),
            dark: self.app.is_dark_theme(),
            online: self.app.is_online(),
            rtl: self.app.is_rtl(),
            initialized: self.app.is_initialized(),
            modules: self.app.modules().to_vec(),
            document_classes: self.host.document_element().classes(),
            viewport: self.viewport,
            backdrop_visible,
            panel: self.panel_status(),
            panel_error: self.panel.construction_error(),
        }
    }
}

impl Drop for Shell {
    fn drop(&mut self) {
        self.panel.unmount();
    }
}
