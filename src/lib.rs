//! appshell - application bootstrap and declarative component adapters
//!
//! This library provides the plumbing a stateful UI toolkit is built on: a
//! single application context with merged configuration, installable modules
//! and an event bus, plus a reusable adapter that binds declarative component
//! nodes to long-lived imperative component instances. A side panel is the
//! worked component.
//!
//! # Modules
//!
//! * [`app`] - the application context and its init lifecycle
//! * [`events`] - typed, priority-ordered event bus
//! * [`params`] - layered configuration merge
//! * [`modules`] - installable capability modules
//! * [`components`] - the adapter contract and the panel component
//! * [`host`] - host environment traits and an in-memory host
//! * [`ui`] - terminal front end

/// Application context, lifecycle, dark mode and ready queue
pub mod app;

/// Declarative adapters and imperative components
pub mod components;

/// Configuration file handling
pub mod config;

/// Application constants and default values
pub mod constants;

/// Device facts and theme resolution
pub mod device;

/// Event bus shared by the application and components
pub mod events;

/// Host environment collaborators
pub mod host;

/// Logging sink with an in-memory buffer for the UI
pub mod logger;

/// Module records and the module registry
pub mod modules;

/// Configuration merging
pub mod params;

/// Terminal user interface
pub mod ui;

pub use app::{AppError, AppEvent, AppEventKind, Application, ApplicationBuilder};
pub use components::panel::{Panel, PanelAdapter, PanelEvent, PanelProps};
pub use components::{ComponentAdapter, ComponentError};
pub use modules::Module;
