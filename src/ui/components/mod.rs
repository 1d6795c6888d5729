//! Reusable UI components

pub mod panel_widget;
pub mod status_bar;

pub use panel_widget::PanelWidget;
pub use status_bar::StatusBar;
