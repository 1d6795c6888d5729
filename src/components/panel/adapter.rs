//! Declarative binding for [`Panel`].

use super::{Effect, Panel, PanelEvent, PanelEventKind, Panels, Side};
use crate::app::Application;
use crate::components::adapter::{AdaptedComponent, KindOf, PropWatcher};
use crate::components::{ComponentError, Forwarders};
use crate::constants::{CLASS_PANEL, CLASS_PANEL_IN, CLASS_PANEL_IN_BREAKPOINT, CLASS_PANEL_IN_COLLAPSED, CLASS_PANEL_RESIZABLE};
use crate::host::ElementRef;
use crate::params::Configuration;
use serde::Serialize;
use serde_json::Value;

/// Declarative panel props. `None` fields fall back to the module defaults.
#[derive(Debug, Clone, PartialEq, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PanelProps {
    #[serde(skip)]
    pub id: Option<String>,
    #[serde(skip)]
    pub class_name: Option<String>,
    /// Explicit side; takes precedence over `left`.
    #[serde(skip)]
    pub side: Option<Side>,
    /// Left side when set and `side` is not; the declarative default is the
    /// right side.
    #[serde(skip)]
    pub left: bool,
    /// Explicit effect; takes precedence over `reveal`.
    #[serde(skip)]
    pub effect: Option<Effect>,
    /// Reveal effect when set and `effect` is not; cover otherwise.
    #[serde(skip)]
    pub reveal: bool,
    #[serde(skip)]
    pub opened: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub resizable: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub backdrop: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub backdrop_el: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub container_el: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub close_by_backdrop_click: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub visible_breakpoint: Option<u16>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub collapsed_breakpoint: Option<u16>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub swipe: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub swipe_no_follow: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub swipe_only_close: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub swipe_active_area: Option<u16>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub swipe_threshold: Option<u16>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub width: Option<u16>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub min_width: Option<u16>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_width: Option<u16>,
}

impl PanelProps {
    pub fn side(&self) -> Side {
        self.side.unwrap_or(if self.left { Side::Left } else { Side::Right })
    }

    pub fn effect(&self) -> Effect {
        self.effect.unwrap_or(if self.reveal { Effect::Reveal } else { Effect::Cover })
    }

    /// Per-panel overrides: every prop that was set, plus side and effect.
    pub fn overrides(&self) -> Result<Configuration, ComponentError> {
        let mut config = match serde_json::to_value(self)? {
            Value::Object(map) => map,
            _ => Configuration::new(),
        };
        config.insert("side".into(), serde_json::to_value(self.side())?);
        config.insert("effect".into(), serde_json::to_value(self.effect())?);
        Ok(config)
    }
}

/// What the declarative side knows from forwarded panel events.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct PanelView {
    pub opened: bool,
    pub closing: bool,
    pub breakpoint: bool,
    pub collapsed: bool,
}

pub struct PanelAdapter;

impl AdaptedComponent for PanelAdapter {
    const NAME: &'static str = "panel";

    type Props = PanelProps;
    type Instance = Panel;
    type View = PanelView;

    fn construct(
        app: &Application,
        el: &ElementRef,
        props: &PanelProps,
        forwarders: Forwarders<PanelEvent>,
    ) -> Result<Panel, ComponentError> {
        let panels = app
            .capability::<Panels>()
            .ok_or(ComponentError::CapabilityUnavailable("panel module"))?;
        if let Some(id) = &props.id {
            el.set_attr("id", id);
        }
        panels.create(el.clone(), &props.overrides()?, forwarders)
    }

    fn forwarded_events() -> Vec<(KindOf<Self>, &'static [&'static str])> {
        vec![
            (PanelEventKind::Open, &["panelOpen"]),
            (PanelEventKind::Opened, &["panelOpened"]),
            (PanelEventKind::Close, &["panelClose"]),
            (PanelEventKind::Closed, &["panelClosed"]),
            (PanelEventKind::BackdropClick, &["click", "panelBackdropClick"]),
            (PanelEventKind::Swipe, &["panelSwipe"]),
            (PanelEventKind::SwipeOpen, &["panelSwipeOpen"]),
            (PanelEventKind::Breakpoint, &["panelBreakpoint"]),
            (PanelEventKind::CollapsedBreakpoint, &["panelCollapsedBreakpoint"]),
            (PanelEventKind::Resize, &["panelResize"]),
        ]
    }

    fn watchers() -> Vec<PropWatcher<PanelProps, Panel>> {
        vec![
            PropWatcher::new(
                "opened",
                |props: &PanelProps| props.opened,
                |panel: &Panel, opened: bool| {
                    if opened {
                        panel.open(true);
                    } else {
                        panel.close(true);
                    }
                },
            ),
            PropWatcher::new(
                "resizable",
                |props: &PanelProps| props.resizable,
                |panel: &Panel, resizable: Option<bool>| {
                    if resizable.unwrap_or(false) {
                        panel.enable_resizable();
                    } else {
                        panel.disable_resizable();
                    }
                },
            ),
        ]
    }

    fn on_constructed(panel: &Panel, props: &PanelProps) {
        if props.opened {
            panel.open(false);
        }
    }

    fn reduce_view(view: &mut PanelView, event: &PanelEvent) {
        match event {
            PanelEvent::Open | PanelEvent::Opened | PanelEvent::SwipeOpen => {
                view.opened = true;
                view.closing = false;
            }
            PanelEvent::Close => {
                view.opened = false;
                view.closing = true;
            }
            PanelEvent::Closed => view.closing = false,
            PanelEvent::Breakpoint { active } => view.breakpoint = *active,
            PanelEvent::CollapsedBreakpoint { active } => view.collapsed = *active,
            _ => {}
        }
    }

    fn classes(props: &PanelProps, view: &PanelView) -> Vec<String> {
        let mut classes = vec![CLASS_PANEL.to_string()];
        if let Some(class_name) = &props.class_name {
            classes.extend(class_name.split_whitespace().map(str::to_string));
        }
        if view.opened && !view.closing && !view.breakpoint {
            classes.push(CLASS_PANEL_IN.to_string());
        }
        if view.breakpoint {
            classes.push(CLASS_PANEL_IN_BREAKPOINT.to_string());
        }
        if view.collapsed {
            classes.push(CLASS_PANEL_IN_COLLAPSED.to_string());
        }
        if props.resizable.unwrap_or(false) {
            classes.push(CLASS_PANEL_RESIZABLE.to_string());
        }
        classes.push(format!("panel-{}", props.side().as_str()));
        classes.push(format!("panel-{}", props.effect().as_str()));
        classes
    }
}
