//! Device facts and theme resolution.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Read-only capability facts about the device the application runs on.
///
/// Produced once by the host (or by the `[device]` table of the config file)
/// and never modified afterwards.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct DeviceInfo {
    pub ios: bool,
    pub android: bool,
    pub desktop: bool,
    /// Desktop application shell embedding a web engine.
    pub electron: bool,
    /// Hybrid mobile shell with a device-ready signal.
    pub cordova: bool,
    pub standalone: bool,
}

/// A concrete visual theme.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Theme {
    Ios,
    Md,
    Aurora,
}

impl Theme {
    pub const ALL: [Theme; 3] = [Theme::Ios, Theme::Md, Theme::Aurora];

    /// CSS class applied to the document element.
    pub fn class_name(self) -> &'static str {
        match self {
            Theme::Ios => "ios",
            Theme::Md => "md",
            Theme::Aurora => "aurora",
        }
    }
}

impl fmt::Display for Theme {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.class_name())
    }
}

/// The `theme` parameter: either a fixed theme or `"auto"`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ThemeSetting {
    #[default]
    Auto,
    Ios,
    Md,
    Aurora,
}

impl ThemeSetting {
    /// Resolve the setting against the device facts.
    ///
    /// `auto` picks iOS on iOS devices, Aurora on desktop application
    /// shells, and Material everywhere else.
    pub fn resolve(self, device: &DeviceInfo) -> Theme {
        match self {
            ThemeSetting::Auto if device.ios => Theme::Ios,
            ThemeSetting::Auto if device.desktop && device.electron => Theme::Aurora,
            ThemeSetting::Auto => Theme::Md,
            ThemeSetting::Ios => Theme::Ios,
            ThemeSetting::Md => Theme::Md,
            ThemeSetting::Aurora => Theme::Aurora,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn explicit_theme_ignores_device() {
        let device = DeviceInfo {
            ios: true,
            ..Default::default()
        };
        assert_eq!(ThemeSetting::Md.resolve(&device), Theme::Md);
        assert_eq!(ThemeSetting::Aurora.resolve(&device), Theme::Aurora);
    }

    #[test]
    fn electron_without_desktop_is_material() {
        let device = DeviceInfo {
            electron: true,
            ..Default::default()
        };
        assert_eq!(ThemeSetting::Auto.resolve(&device), Theme::Md);
    }

    #[test]
    fn theme_setting_parses_lowercase() {
        let setting: ThemeSetting = serde_json::from_str("\"aurora\"").unwrap();
        assert_eq!(setting, ThemeSetting::Aurora);
    }
}
