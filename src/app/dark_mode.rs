//! Follows the system color-scheme preference.
//!
//! Watching is a progressive enhancement: on a host without media-query
//! support every operation is a silent no-op.

use super::{AppEvent, Application};
use crate::constants::{CLASS_THEME_DARK, MEDIA_DARK, MEDIA_LIGHT};
use crate::host::{Host, MediaChange, MediaListener, MediaQueryList, Subscription};
use std::cell::Cell;
use std::rc::Rc;

enum Attach {
    Unsupported,
    AlreadyEnabled,
    /// Listeners registered; carries the current preference, if any matched.
    Attached(Option<bool>),
}

pub struct DarkModeWatcher {
    dark: Option<Rc<dyn MediaQueryList>>,
    light: Option<Rc<dyn MediaQueryList>>,
    subscriptions: Cell<Option<(Subscription, Subscription)>>,
}

impl DarkModeWatcher {
    pub fn new(host: &dyn Host) -> Self {
        Self {
            dark: host.match_media(MEDIA_DARK),
            light: host.match_media(MEDIA_LIGHT),
            subscriptions: Cell::new(None),
        }
    }

    pub fn is_supported(&self) -> bool {
        self.dark.is_some() && self.light.is_some()
    }

    pub fn is_enabled(&self) -> bool {
        self.subscriptions.get().is_some()
    }

    /// Subscribe `listener` to both queries and report the current
    /// preference (`Some(true)` for dark, dark winning over light).
    fn enable(&self, listener: MediaListener) -> Attach {
        let (Some(dark), Some(light)) = (&self.dark, &self.light) else {
            return Attach::Unsupported;
        };
        if self.is_enabled() {
            return Attach::AlreadyEnabled;
        }
        let subscriptions = (dark.subscribe(Rc::clone(&listener)), light.subscribe(listener));
        self.subscriptions.set(Some(subscriptions));

        Attach::Attached(if dark.matches() {
            Some(true)
        } else if light.matches() {
            Some(false)
        } else {
            None
        })
    }

    /// Returns `true` if listeners were removed.
    fn disable(&self) -> bool {
        let Some((dark_sub, light_sub)) = self.subscriptions.take() else {
            return false;
        };
        if let Some(dark) = &self.dark {
            dark.unsubscribe(dark_sub);
        }
        if let Some(light) = &self.light {
            light.unsubscribe(light_sub);
        }
        true
    }
}

impl Application {
    /// Start following the system color scheme.
    pub fn enable_auto_dark_theme(&self) {
        let weak = self.downgrade();
        let listener: MediaListener = Rc::new(move |change: &MediaChange| {
            if !change.matches {
                return;
            }
            let Some(app) = weak.upgrade() else {
                return;
            };
            if change.media == MEDIA_DARK {
                app.set_dark_theme(true);
            } else if change.media == MEDIA_LIGHT {
                app.set_dark_theme(false);
            }
        });

        match self.inner.dark_mode.enable(listener) {
            Attach::Unsupported => log::debug!("media queries unavailable, auto dark theme stays off"),
            Attach::AlreadyEnabled => {}
            Attach::Attached(Some(dark)) => self.set_dark_theme(dark),
            Attach::Attached(None) => {}
        }
    }

    /// Stop following the system color scheme.
    pub fn disable_auto_dark_theme(&self) {
        if self.inner.dark_mode.disable() {
            log::debug!("auto dark theme disabled");
        }
    }

    pub fn is_auto_dark_theme_enabled(&self) -> bool {
        self.inner.dark_mode.is_enabled()
    }

    fn set_dark_theme(&self, dark: bool) {
        let html = self.inner.host.document_element();
        if dark {
            html.add_class(CLASS_THEME_DARK);
        } else {
            html.remove_class(CLASS_THEME_DARK);
        }
        self.inner.dark_theme.set(dark);
        self.emit(AppEvent::DarkThemeChange(dark));
    }
}
