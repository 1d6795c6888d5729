//! Side panel.
//!
//! A [`Panel`] is an imperative component with an open/close state machine
//! (`Closed -> Opening -> Opened -> Closing -> Closed`) and an orthogonal
//! breakpoint mode driven by the viewport width. Swipe and resize input is
//! fed in by the host; every transition is announced on the panel's own
//! event bus.

use crate::components::{Forwarders, ImperativeComponent};
use crate::constants::{
    CLASS_PANEL, CLASS_PANEL_IN, CLASS_PANEL_IN_BREAKPOINT, CLASS_PANEL_IN_COLLAPSED, CLASS_PANEL_RESIZABLE,
    PANEL_DEFAULT_WIDTH, PANEL_MAX_WIDTH, PANEL_MIN_WIDTH,
};
use crate::events::{BusEvent, EventBus, Priority};
use crate::host::{ElementRef, Host};
use serde::{Deserialize, Serialize};
use std::cell::{Cell, RefCell};
use std::fmt;
use std::rc::{Rc, Weak};
use uuid::Uuid;

pub mod adapter;
pub mod backdrop;
pub mod module;
pub mod swipe;

pub use adapter::{PanelAdapter, PanelProps, PanelView};
pub use backdrop::{BackdropLease, BackdropRegistry};
pub use module::{panel_module, Panels};
pub use swipe::{SwipeOutcome, SwipeTracker};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Side {
    #[default]
    Left,
    Right,
}

impl Side {
    pub fn as_str(self) -> &'static str {
        match self {
            Side::Left => "left",
            Side::Right => "right",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Effect {
    #[default]
    Cover,
    Reveal,
}

impl Effect {
    pub fn as_str(self) -> &'static str {
        match self {
            Effect::Cover => "cover",
            Effect::Reveal => "reveal",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PanelState {
    #[default]
    Closed,
    Opening,
    Opened,
    Closing,
}

/// Presentation mode chosen by the viewport width. A single enum keeps the
/// visible and collapsed breakpoints mutually exclusive.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum BreakpointMode {
    #[default]
    Normal,
    Visible,
    Collapsed,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum PanelEvent {
    Open,
    Opened,
    Close,
    Closed,
    BackdropClick,
    /// Drag progress in `0.0..=1.0`.
    Swipe { progress: f32 },
    SwipeOpen,
    Breakpoint { active: bool },
    CollapsedBreakpoint { active: bool },
    Resize { width: u16 },
    BeforeDestroy,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PanelEventKind {
    Open,
    Opened,
    Close,
    Closed,
    BackdropClick,
    Swipe,
    SwipeOpen,
    Breakpoint,
    CollapsedBreakpoint,
    Resize,
    BeforeDestroy,
}

impl BusEvent for PanelEvent {
    type Kind = PanelEventKind;

    fn kind(&self) -> PanelEventKind {
        match self {
            PanelEvent::Open => PanelEventKind::Open,
            PanelEvent::Opened => PanelEventKind::Opened,
            PanelEvent::Close => PanelEventKind::Close,
            PanelEvent::Closed => PanelEventKind::Closed,
            PanelEvent::BackdropClick => PanelEventKind::BackdropClick,
            PanelEvent::Swipe { .. } => PanelEventKind::Swipe,
            PanelEvent::SwipeOpen => PanelEventKind::SwipeOpen,
            PanelEvent::Breakpoint { .. } => PanelEventKind::Breakpoint,
            PanelEvent::CollapsedBreakpoint { .. } => PanelEventKind::CollapsedBreakpoint,
            PanelEvent::Resize { .. } => PanelEventKind::Resize,
            PanelEvent::BeforeDestroy => PanelEventKind::BeforeDestroy,
        }
    }
}

/// Effective panel parameters (module defaults overlaid with per-panel ones).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct PanelParams {
    pub side: Side,
    pub effect: Effect,
    pub backdrop: bool,
    pub backdrop_el: Option<String>,
    pub container_el: Option<String>,
    pub close_by_backdrop_click: bool,
    pub resizable: bool,
    pub visible_breakpoint: Option<u16>,
    pub collapsed_breakpoint: Option<u16>,
    pub swipe: bool,
    pub swipe_no_follow: bool,
    pub swipe_only_close: bool,
    pub swipe_active_area: u16,
    pub swipe_threshold: u16,
    pub width: u16,
    pub min_width: u16,
    pub max_width: u16,
}

impl Default for PanelParams {
    fn default() -> Self {
        Self {
            side: Side::Left,
            effect: Effect::Cover,
            backdrop: true,
            backdrop_el: None,
            container_el: None,
            close_by_backdrop_click: true,
            resizable: false,
            visible_breakpoint: None,
            collapsed_breakpoint: None,
            swipe: false,
            swipe_no_follow: false,
            swipe_only_close: false,
            swipe_active_area: 0,
            swipe_threshold: 0,
            width: PANEL_DEFAULT_WIDTH,
            min_width: PANEL_MIN_WIDTH,
            max_width: PANEL_MAX_WIDTH,
        }
    }
}

struct PanelInner {
    id: Uuid,
    host: Rc<dyn Host>,
    el: ElementRef,
    params: PanelParams,
    state: Cell<PanelState>,
    mode: Cell<BreakpointMode>,
    resizable: Cell<bool>,
    width: Cell<u16>,
    viewport: Cell<Option<u16>>,
    swipe: RefCell<SwipeTracker>,
    backdrop: RefCell<Option<BackdropLease>>,
    events: EventBus<PanelEvent>,
    destroyed: Cell<bool>,
}

/// Handle to a panel instance. Clones share the same panel.
#[derive(Clone)]
pub struct Panel {
    inner: Rc<PanelInner>,
}

impl Panel {
    /// Build a panel on `el`. `forwarders` are subscribed before anything is
    /// emitted.
    pub fn new(
        host: Rc<dyn Host>,
        el: ElementRef,
        params: PanelParams,
        backdrop: Option<BackdropLease>,
        forwarders: Forwarders<PanelEvent>,
    ) -> Self {
        let events = EventBus::new("panel");
        for (kind, handler) in forwarders {
            events.on_shared(kind, Priority::Normal, handler);
        }

        let width = params.width.clamp(params.min_width, params.max_width.max(params.min_width));
        el.add_class(CLASS_PANEL);
        el.add_class(&format!("panel-{}", params.side.as_str()));
        el.add_class(&format!("panel-{}", params.effect.as_str()));
        if params.resizable {
            el.add_class(CLASS_PANEL_RESIZABLE);
        }

        let panel = Self {
            inner: Rc::new(PanelInner {
                id: Uuid::new_v4(),
                host,
                el,
                resizable: Cell::new(params.resizable),
                width: Cell::new(width),
                params,
                state: Cell::new(PanelState::Closed),
                mode: Cell::new(BreakpointMode::Normal),
                viewport: Cell::new(None),
                swipe: RefCell::new(SwipeTracker::default()),
                backdrop: RefCell::new(backdrop),
                events,
                destroyed: Cell::new(false),
            }),
        };
        log::debug!("panel {} created on the {}", panel.id(), panel.side().as_str());
        panel
    }

    pub fn id(&self) -> Uuid {
        self.inner.id
    }

    pub fn el(&self) -> ElementRef {
        Rc::clone(&self.inner.el)
    }

    pub fn params(&self) -> &PanelParams {
        &self.inner.params
    }

    pub fn side(&self) -> Side {
        self.inner.params.side
    }

    pub fn effect(&self) -> Effect {
        self.inner.params.effect
    }

    pub fn state(&self) -> PanelState {
        self.inner.state.get()
    }

    pub fn is_opened(&self) -> bool {
        self.state() == PanelState::Opened
    }

    pub fn breakpoint_mode(&self) -> BreakpointMode {
        self.inner.mode.get()
    }

    pub fn breakpoint_active(&self) -> bool {
        self.breakpoint_mode() == BreakpointMode::Visible
    }

    pub fn collapsed(&self) -> bool {
        self.breakpoint_mode() == BreakpointMode::Collapsed
    }

    pub fn is_resizable(&self) -> bool {
        self.inner.resizable.get()
    }

    pub fn width(&self) -> u16 {
        self.inner.width.get()
    }

    pub fn viewport_width(&self) -> Option<u16> {
        self.inner.viewport.get()
    }

    pub fn is_destroyed(&self) -> bool {
        self.inner.destroyed.get()
    }

    /// Whether a drag is in progress.
    pub fn is_swiping(&self) -> bool {
        self.inner.swipe.borrow().is_active()
    }

    pub fn backdrop_el(&self) -> Option<ElementRef> {
        self.inner.backdrop.borrow().as_ref().map(BackdropLease::element)
    }

    /// Open the panel. With `animate` the `Opened` step waits for the next
    /// frame; without it both steps happen now.
    ///
    /// Returns `false` (and emits nothing) unless the panel is closed or
    /// closing.
    pub fn open(&self, animate: bool) -> bool {
        if !matches!(self.state(), PanelState::Closed | PanelState::Closing) {
            return false;
        }
        self.inner.state.set(PanelState::Opening);
        match self.breakpoint_mode() {
            BreakpointMode::Visible => {}
            BreakpointMode::Collapsed => self.inner.el.add_class(CLASS_PANEL_IN),
            BreakpointMode::Normal => {
                self.inner.el.add_class(CLASS_PANEL_IN);
                self.with_backdrop(BackdropLease::show);
            }
        }
        self.emit(PanelEvent::Open);

        if animate {
            let weak = self.downgrade();
            self.inner.host.next_frame(Box::new(move || {
                if let Some(panel) = Panel::upgrade(&weak) {
                    panel.finish_open();
                }
            }));
        } else {
            self.finish_open();
        }
        true
    }

    /// Close the panel; mirror image of [`Panel::open`].
    pub fn close(&self, animate: bool) -> bool {
        if !matches!(self.state(), PanelState::Opened | PanelState::Opening) {
            return false;
        }
        self.inner.state.set(PanelState::Closing);
        self.inner.el.remove_class(CLASS_PANEL_IN);
        self.with_backdrop(BackdropLease::hide);
        self.emit(PanelEvent::Close);

        if animate {
            let weak = self.downgrade();
            self.inner.host.next_frame(Box::new(move || {
                if let Some(panel) = Panel::upgrade(&weak) {
                    panel.finish_close();
                }
            }));
        } else {
            self.finish_close();
        }
        true
    }

    pub fn toggle(&self, animate: bool) -> bool {
        match self.state() {
            PanelState::Closed | PanelState::Closing => self.open(animate),
            PanelState::Opened | PanelState::Opening => self.close(animate),
        }
    }

    fn finish_open(&self) {
        if self.state() != PanelState::Opening || self.is_destroyed() {
            return;
        }
        self.inner.state.set(PanelState::Opened);
        self.emit(PanelEvent::Opened);
    }

    fn finish_close(&self) {
        if self.state() != PanelState::Closing || self.is_destroyed() {
            return;
        }
        self.inner.state.set(PanelState::Closed);
        self.emit(PanelEvent::Closed);
    }

    /// Handle a click on the backdrop. Returns `true` if it was accepted.
    pub fn backdrop_click(&self) -> bool {
        let params = &self.inner.params;
        if !params.backdrop || params.swipe_only_close {
            return false;
        }
        if !matches!(self.state(), PanelState::Opened | PanelState::Opening) {
            return false;
        }
        self.emit(PanelEvent::BackdropClick);
        if params.close_by_backdrop_click {
            self.close(true);
        }
        true
    }

    /// Re-evaluate the breakpoints for a new viewport width.
    pub fn set_viewport_width(&self, width: u16) {
        self.inner.viewport.set(Some(width));
        let params = &self.inner.params;
        let mode = if params.visible_breakpoint.is_some_and(|bp| width >= bp) {
            BreakpointMode::Visible
        } else if params.collapsed_breakpoint.is_some_and(|bp| width >= bp) {
            BreakpointMode::Collapsed
        } else {
            BreakpointMode::Normal
        };

        let previous = self.inner.mode.replace(mode);
        if previous == mode {
            return;
        }

        let el = &self.inner.el;
        let opened = matches!(self.state(), PanelState::Opened | PanelState::Opening);
        match mode {
            // An always-visible panel is never "in"
            BreakpointMode::Visible => {
                el.remove_class(CLASS_PANEL_IN);
                el.remove_class(CLASS_PANEL_IN_COLLAPSED);
                el.add_class(CLASS_PANEL_IN_BREAKPOINT);
                self.with_backdrop(BackdropLease::hide);
            }
            BreakpointMode::Collapsed => {
                el.remove_class(CLASS_PANEL_IN_BREAKPOINT);
                el.add_class(CLASS_PANEL_IN_COLLAPSED);
                if opened {
                    el.add_class(CLASS_PANEL_IN);
                }
                self.with_backdrop(BackdropLease::hide);
            }
            BreakpointMode::Normal => {
                el.remove_class(CLASS_PANEL_IN_BREAKPOINT);
                el.remove_class(CLASS_PANEL_IN_COLLAPSED);
                if opened {
                    el.add_class(CLASS_PANEL_IN);
                    self.with_backdrop(BackdropLease::show);
                }
            }
        }

        match previous {
            BreakpointMode::Visible => self.emit(PanelEvent::Breakpoint { active: false }),
            BreakpointMode::Collapsed => self.emit(PanelEvent::CollapsedBreakpoint { active: false }),
            BreakpointMode::Normal => {}
        }
        match mode {
            BreakpointMode::Visible => self.emit(PanelEvent::Breakpoint { active: true }),
            BreakpointMode::Collapsed => self.emit(PanelEvent::CollapsedBreakpoint { active: true }),
            BreakpointMode::Normal => {}
        }
    }

    /// Start a drag at column `x`. Returns `false` if swiping is not allowed
    /// from here.
    pub fn swipe_start(&self, x: i32) -> bool {
        let viewport = i32::from(self.inner.viewport.get().unwrap_or(self.width()));
        let opened = matches!(self.state(), PanelState::Opened | PanelState::Opening);
        self.inner
            .swipe
            .borrow_mut()
            .start(&self.inner.params, viewport, x, opened)
    }

    pub fn swipe_move(&self, x: i32) -> Option<f32> {
        let progress = self
            .inner
            .swipe
            .borrow_mut()
            .update(&self.inner.params, self.width(), x)?;
        if !self.inner.params.swipe_no_follow {
            let offset = (progress * f32::from(self.width())).round() as u16;
            self.inner.el.set_style("swipe-offset", Some(&offset.to_string()));
        }
        self.emit(PanelEvent::Swipe { progress });
        Some(progress)
    }

    pub fn swipe_end(&self) -> SwipeOutcome {
        let outcome = self.inner.swipe.borrow_mut().finish(&self.inner.params);
        self.inner.el.set_style("swipe-offset", None);
        match outcome {
            SwipeOutcome::Open => {
                self.emit(PanelEvent::SwipeOpen);
                self.open(true);
            }
            SwipeOutcome::Close => {
                self.close(true);
            }
            SwipeOutcome::Cancel => {}
        }
        outcome
    }

    /// Returns `true` if the flag changed.
    pub fn enable_resizable(&self) -> bool {
        if self.inner.resizable.replace(true) {
            return false;
        }
        self.inner.el.add_class(CLASS_PANEL_RESIZABLE);
        true
    }

    /// Returns `true` if the flag changed.
    pub fn disable_resizable(&self) -> bool {
        if !self.inner.resizable.replace(false) {
            return false;
        }
        self.inner.el.remove_class(CLASS_PANEL_RESIZABLE);
        true
    }

    /// Resize through the resize handle. Ignored unless resizable; the width
    /// is clamped to the configured bounds.
    pub fn resize(&self, width: u16) -> Option<u16> {
        if !self.is_resizable() {
            return None;
        }
        let params = &self.inner.params;
        let width = width.clamp(params.min_width, params.max_width.max(params.min_width));
        if self.inner.width.replace(width) != width {
            self.inner.el.set_style("width", Some(&width.to_string()));
            self.emit(PanelEvent::Resize { width });
        }
        Some(width)
    }

    pub fn events(&self) -> &EventBus<PanelEvent> {
        &self.inner.events
    }

    fn emit(&self, event: PanelEvent) {
        self.inner.events.emit(&event);
    }

    fn with_backdrop(&self, f: impl FnOnce(&BackdropLease)) {
        if let Some(lease) = self.inner.backdrop.borrow().as_ref() {
            f(lease);
        }
    }

    fn downgrade(&self) -> Weak<PanelInner> {
        Rc::downgrade(&self.inner)
    }

    fn upgrade(weak: &Weak<PanelInner>) -> Option<Self> {
        weak.upgrade().map(|inner| Self { inner })
    }
}

impl ImperativeComponent for Panel {
    type Event = PanelEvent;

    fn events(&self) -> &EventBus<PanelEvent> {
        &self.inner.events
    }

    fn destroy(&self) {
        if self.inner.destroyed.get() {
            return;
        }
        self.emit(PanelEvent::BeforeDestroy);
        self.inner.destroyed.set(true);
        self.inner.events.clear();
        self.inner.backdrop.borrow_mut().take();

        let el = &self.inner.el;
        for class in [CLASS_PANEL_IN, CLASS_PANEL_IN_BREAKPOINT, CLASS_PANEL_IN_COLLAPSED] {
            el.remove_class(class);
        }
        el.set_style("swipe-offset", None);
        log::debug!("panel {} destroyed", self.inner.id);
    }
}

impl fmt::Debug for Panel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Panel")
            .field("id", &self.inner.id)
            .field("side", &self.side())
            .field("state", &self.state())
            .field("mode", &self.breakpoint_mode())
            .field("width", &self.width())
            .finish()
    }
}
