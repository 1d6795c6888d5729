//! Core UI functionality for the appshell terminal front end.
//!
//! - [`actions`] - what a key or pointer event asks the shell to do
//! - [`component`] - base component trait and rendering abstraction
//! - [`event_handler`] - terminal event polling with a tick fallback

pub mod actions;
pub mod component;
pub mod event_handler;

pub use actions::Action;
pub use component::Component;
pub use event_handler::{EventHandler, EventType};
