//! Constants used throughout the application
//!
//! This module centralizes class names, media queries, default parameter
//! values and UI text.

// Media queries
pub const MEDIA_DARK: &str = "(prefers-color-scheme: dark)";
pub const MEDIA_LIGHT: &str = "(prefers-color-scheme: light)";

// Document and root markers
pub const CLASS_ROOT: &str = "appshell-root";
pub const CLASS_INITIALIZING: &str = "appshell-initializing";
pub const CLASS_THEME_DARK: &str = "theme-dark";
pub const CLASS_IOS_TRANSLUCENT_BARS: &str = "ios-translucent-bars";
pub const CLASS_IOS_TRANSLUCENT_MODALS: &str = "ios-translucent-modals";
pub const ATTR_DIR: &str = "dir";
pub const STYLE_DIRECTION: &str = "direction";

// Panel markers
pub const CLASS_PANEL: &str = "panel";
pub const CLASS_PANEL_IN: &str = "panel-in";
pub const CLASS_PANEL_IN_BREAKPOINT: &str = "panel-in-breakpoint";
pub const CLASS_PANEL_IN_COLLAPSED: &str = "panel-in-collapsed";
pub const CLASS_PANEL_RESIZABLE: &str = "panel-resizable";
pub const CLASS_PANEL_BACKDROP: &str = "panel-backdrop";
pub const CLASS_PANEL_BACKDROP_IN: &str = "backdrop-in";

// Core parameter defaults
pub const DEFAULT_APP_ID: &str = "io.appshell.app";
pub const DEFAULT_APP_NAME: &str = "appshell";
pub const DEFAULT_APP_VERSION: &str = "1.0.0";
pub const DEFAULT_ROOT: &str = "#app";

/// Core keys whose JSON type modules may not change.
pub const RESERVED_PARAMS: &[&str] = &[
    "id",
    "name",
    "version",
    "root",
    "theme",
    "language",
    "init",
    "initOnDeviceReady",
];

// Panel defaults
pub const PANEL_DEFAULT_WIDTH: u16 = 30;
pub const PANEL_MIN_WIDTH: u16 = 10;
pub const PANEL_MAX_WIDTH: u16 = 80;
pub const PANEL_COLLAPSED_WIDTH: u16 = 4;

// Config
pub const CONFIG_FILE_NAME: &str = "appshell.toml";
pub const CONFIG_DIR_NAME: &str = "appshell";
pub const LOG_FILE_NAME: &str = "appshell.log";
pub const LOG_BUFFER_CAPACITY: usize = 500;
pub const CONFIG_GENERATED: &str = "✅ Default configuration written to";

// Terminal UI text
pub const UI_TITLE: &str = "appshell";
pub const UI_PANEL_TITLE: &str = "Panel";
pub const UI_HELP: &str = "p panel · r resizable · </> resize · b backdrop · d dark · o online · q quit";
pub const UI_LOG_LINES: usize = 5;
