//! Stateful UI components and their declarative adapters.
//!
//! Each component comes in two halves:
//!
//! - an imperative instance ([`ImperativeComponent`]) owning an interaction
//!   state machine and its own event bus
//! - a declarative binding ([`adapter::ComponentAdapter`]) that builds the
//!   instance once the application is ready, pushes reactive prop changes into
//!   it, forwards its events to callbacks and destroys it on unmount

use crate::events::{BusEvent, EventBus, Handler};

pub mod adapter;
pub mod panel;

pub use adapter::{AdaptedComponent, ComponentAdapter, ComponentHandle, PropWatcher};

/// Handlers registered on a new instance before it can emit anything.
pub type Forwarders<E> = Vec<(<E as BusEvent>::Kind, Handler<E>)>;

#[derive(Debug, thiserror::Error)]
pub enum ComponentError {
    #[error("{0} is not installed")]
    CapabilityUnavailable(&'static str),
    #[error("invalid component params: {0}")]
    InvalidParams(#[from] serde_json::Error),
    #[error("construction failed: {0}")]
    Construction(String),
}

/// The imperative half of a component.
pub trait ImperativeComponent: Clone + 'static {
    type Event: BusEvent;

    fn events(&self) -> &EventBus<Self::Event>;

    /// Release listeners and owned elements. Must be the last call.
    fn destroy(&self) {}
}
