//! Narrow interfaces to the host environment.
//!
//! The application and its components never touch a concrete rendering
//! surface. Everything they need from the environment (element lookup,
//! media-preference queries, connectivity, frame scheduling, a local task
//! spawner) comes through the [`Host`] trait. [`HeadlessHost`] is the
//! in-memory implementation used by the terminal front end and the tests.

use std::fmt;
use std::future::Future;
use std::pin::Pin;
use std::rc::Rc;

pub mod headless;

pub use headless::HeadlessHost;

/// Shared handle to a host element.
pub type ElementRef = Rc<dyn Element>;

/// Future type accepted by [`Host::spawn_local`].
pub type LocalTask = Pin<Box<dyn Future<Output = ()>>>;

/// Stable identity of an element within its host.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ElementKey(pub u64);

/// Handle returned by listener registrations; pass it back to unsubscribe.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Subscription(pub u64);

/// A single element of the host's UI tree.
pub trait Element {
    fn key(&self) -> ElementKey;
    fn tag(&self) -> String;
    fn id(&self) -> Option<String>;

    fn add_class(&self, class: &str);
    fn remove_class(&self, class: &str);
    fn has_class(&self, class: &str) -> bool;
    fn classes(&self) -> Vec<String>;

    fn attr(&self, name: &str) -> Option<String>;
    fn set_attr(&self, name: &str, value: &str);
    fn remove_attr(&self, name: &str);

    /// Computed style property, e.g. `direction`.
    fn style(&self, name: &str) -> Option<String>;
    fn set_style(&self, name: &str, value: Option<&str>);

    /// Whether the element is still attached to the host tree.
    fn is_connected(&self) -> bool;
}

impl fmt::Debug for dyn Element {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Element")
            .field("key", &self.key())
            .field("tag", &self.tag())
            .field("classes", &self.classes())
            .finish()
    }
}

/// Change notification delivered to media-query listeners.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MediaChange {
    pub media: String,
    pub matches: bool,
}

pub type MediaListener = Rc<dyn Fn(&MediaChange)>;

/// A live media-preference query such as `(prefers-color-scheme: dark)`.
pub trait MediaQueryList {
    fn media(&self) -> String;
    fn matches(&self) -> bool;
    fn subscribe(&self, listener: MediaListener) -> Subscription;
    fn unsubscribe(&self, subscription: Subscription);
}

/// The host environment.
pub trait Host {
    /// Find the first element matching `#id`, `.class` or a tag name.
    fn query(&self, selector: &str) -> Option<ElementRef>;

    /// The top-level document element (`html`).
    fn document_element(&self) -> ElementRef;

    /// Create an element and insert it right before `before`.
    fn create_element_before(&self, tag: &str, class: &str, before: &ElementRef) -> ElementRef;

    /// Detach an element from the tree.
    fn remove_element(&self, element: &ElementRef);

    /// `None` when the host cannot evaluate media queries at all.
    fn match_media(&self, query: &str) -> Option<Rc<dyn MediaQueryList>>;

    fn language(&self) -> String;

    fn is_online(&self) -> bool;

    fn watch_connectivity(&self, listener: Rc<dyn Fn(bool)>) -> Subscription;

    /// Run `callback` once the host shell reports it is ready.
    fn on_device_ready(&self, callback: Box<dyn FnOnce()>);

    /// Run `callback` before the next paint.
    fn next_frame(&self, callback: Box<dyn FnOnce()>);

    /// Schedule a future on the UI thread.
    fn spawn_local(&self, task: LocalTask);
}
