//! Terminal front end for appshell
//!
//! Runs an application on a headless host and shows it in the terminal: the
//! panel, the document markers, and a status bar with recent log lines.

pub mod app_component;
pub mod components;
pub mod core;
pub mod renderer;
pub mod shell;

pub use app_component::AppComponent;
pub use renderer::run_app;
pub use shell::{Shell, ShellStatus};
