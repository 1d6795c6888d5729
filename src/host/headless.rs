//! In-memory host.
//!
//! Keeps a small element tree, a set of controllable media queries, a
//! connectivity flag, a device-ready trigger and queues for frame callbacks
//! and local tasks. Nothing runs on its own: the owner drives the queues with
//! [`HeadlessHost::run_frames`] and [`HeadlessHost::run_pending`].

use super::{
    Element, ElementKey, ElementRef, Host, LocalTask, MediaChange, MediaListener, MediaQueryList, Subscription,
};
use std::cell::{Cell, RefCell};
use std::collections::{BTreeMap, HashMap};
use std::rc::Rc;

struct VirtualElement {
    key: ElementKey,
    tag: String,
    id: Option<String>,
    classes: RefCell<Vec<String>>,
    attrs: RefCell<BTreeMap<String, String>>,
    styles: RefCell<BTreeMap<String, String>>,
    parent: Cell<Option<ElementKey>>,
    children: RefCell<Vec<ElementKey>>,
    connected: Cell<bool>,
}

impl VirtualElement {
    fn new(key: ElementKey, tag: &str, id: Option<&str>) -> Self {
        Self {
            key,
            tag: tag.to_string(),
            id: id.map(str::to_string),
            classes: RefCell::new(Vec::new()),
            attrs: RefCell::new(BTreeMap::new()),
            styles: RefCell::new(BTreeMap::new()),
            parent: Cell::new(None),
            children: RefCell::new(Vec::new()),
            connected: Cell::new(true),
        }
    }

    fn matches(&self, selector: &str) -> bool {
        if let Some(id) = selector.strip_prefix('#') {
            self.id.as_deref() == Some(id)
        } else if let Some(class) = selector.strip_prefix('.') {
            self.has_class(class)
        } else {
            self.tag == selector
        }
    }
}

impl Element for VirtualElement {
    fn key(&self) -> ElementKey {
        self.key
    }

    fn tag(&self) -> String {
        self.tag.clone()
    }

    fn id(&self) -> Option<String> {
        self.id.clone()
    }

    fn add_class(&self, class: &str) {
        let mut classes = self.classes.borrow_mut();
        if !classes.iter().any(|c| c == class) {
            classes.push(class.to_string());
        }
    }

    fn remove_class(&self, class: &str) {
        self.classes.borrow_mut().retain(|c| c != class);
    }

    fn has_class(&self, class: &str) -> bool {
        self.classes.borrow().iter().any(|c| c == class)
    }

    fn classes(&self) -> Vec<String> {
        self.classes.borrow().clone()
    }

    fn attr(&self, name: &str) -> Option<String> {
        self.attrs.borrow().get(name).cloned()
    }

    fn set_attr(&self, name: &str, value: &str) {
        self.attrs.borrow_mut().insert(name.to_string(), value.to_string());
    }

    fn remove_attr(&self, name: &str) {
        self.attrs.borrow_mut().remove(name);
    }

    fn style(&self, name: &str) -> Option<String> {
        self.styles.borrow().get(name).cloned()
    }

    fn set_style(&self, name: &str, value: Option<&str>) {
        let mut styles = self.styles.borrow_mut();
        match value {
            Some(value) => styles.insert(name.to_string(), value.to_string()),
            None => styles.remove(name),
        };
    }

    fn is_connected(&self) -> bool {
        self.connected.get()
    }
}

struct HeadlessMediaQuery {
    media: String,
    matches: Cell<bool>,
    listeners: RefCell<Vec<(Subscription, MediaListener)>>,
    next_id: Cell<u64>,
}

impl HeadlessMediaQuery {
    fn set(&self, matches: bool) {
        if self.matches.replace(matches) == matches {
            return;
        }
        let change = MediaChange {
            media: self.media.clone(),
            matches,
        };
        let listeners: Vec<MediaListener> = self.listeners.borrow().iter().map(|(_, l)| Rc::clone(l)).collect();
        for listener in listeners {
            listener(&change);
        }
    }
}

impl MediaQueryList for HeadlessMediaQuery {
    fn media(&self) -> String {
        self.media.clone()
    }

    fn matches(&self) -> bool {
        self.matches.get()
    }

    fn subscribe(&self, listener: MediaListener) -> Subscription {
        let id = Subscription(self.next_id.get());
        self.next_id.set(id.0 + 1);
        self.listeners.borrow_mut().push((id, listener));
        id
    }

    fn unsubscribe(&self, subscription: Subscription) {
        self.listeners.borrow_mut().retain(|(id, _)| *id != subscription);
    }
}

struct HeadlessInner {
    elements: RefCell<HashMap<ElementKey, Rc<VirtualElement>>>,
    document: Rc<VirtualElement>,
    next_key: Cell<u64>,
    media_supported: Cell<bool>,
    media: RefCell<HashMap<String, Rc<HeadlessMediaQuery>>>,
    language: RefCell<String>,
    online: Cell<bool>,
    connectivity: RefCell<Vec<(Subscription, Rc<dyn Fn(bool)>)>>,
    next_subscription: Cell<u64>,
    device_ready: Cell<bool>,
    device_ready_callbacks: RefCell<Vec<Box<dyn FnOnce()>>>,
    frames: RefCell<Vec<Box<dyn FnOnce()>>>,
    tasks: RefCell<Vec<LocalTask>>,
}

/// In-memory [`Host`]. Cloning yields another handle to the same host.
#[derive(Clone)]
pub struct HeadlessHost {
    inner: Rc<HeadlessInner>,
}

impl Default for HeadlessHost {
    fn default() -> Self {
        Self::new()
    }
}

impl HeadlessHost {
    /// A host with an `html` document element containing a `body`.
    pub fn new() -> Self {
        let document = Rc::new(VirtualElement::new(ElementKey(1), "html", None));
        let inner = HeadlessInner {
            elements: RefCell::new(HashMap::from([(document.key, Rc::clone(&document))])),
            document,
            next_key: Cell::new(2),
            media_supported: Cell::new(true),
            media: RefCell::new(HashMap::new()),
            language: RefCell::new("en-US".to_string()),
            online: Cell::new(true),
            connectivity: RefCell::new(Vec::new()),
            next_subscription: Cell::new(1),
            device_ready: Cell::new(false),
            device_ready_callbacks: RefCell::new(Vec::new()),
            frames: RefCell::new(Vec::new()),
            tasks: RefCell::new(Vec::new()),
        };
        let host = Self { inner: Rc::new(inner) };
        let html = host.document_element();
        host.append(&html, "body", None);
        host
    }

    /// Disable media-query support, as on hosts without it.
    pub fn without_media_queries(self) -> Self {
        self.inner.media_supported.set(false);
        self
    }

    pub fn with_language(self, language: &str) -> Self {
        *self.inner.language.borrow_mut() = language.to_string();
        self
    }

    /// Append a new element under `parent`.
    pub fn append(&self, parent: &ElementRef, tag: &str, id: Option<&str>) -> ElementRef {
        let element = self.make_element(tag, id);
        element.parent.set(Some(parent.key()));
        if let Some(parent) = self.lookup(parent.key()) {
            parent.children.borrow_mut().push(element.key);
        }
        element
    }

    /// Append a new element under `body`.
    pub fn append_to_body(&self, tag: &str, id: Option<&str>) -> ElementRef {
        let body = self.body();
        self.append(&body, tag, id)
    }

    pub fn body(&self) -> ElementRef {
        match self.query("body") {
            Some(body) => body,
            None => self.document_element(),
        }
    }

    /// Set (or create) a media query result, notifying listeners on change.
    pub fn set_media(&self, query: &str, matches: bool) {
        let existing = self.inner.media.borrow().get(query).cloned();
        match existing {
            Some(mq) => mq.set(matches),
            None => {
                self.inner.media.borrow_mut().insert(query.to_string(), Rc::new(self.new_media(query, matches)));
            }
        }
    }

    pub fn set_online(&self, online: bool) {
        if self.inner.online.replace(online) == online {
            return;
        }
        let listeners: Vec<Rc<dyn Fn(bool)>> =
            self.inner.connectivity.borrow().iter().map(|(_, l)| Rc::clone(l)).collect();
        for listener in listeners {
            listener(online);
        }
    }

    /// Signal device readiness, running every waiting callback.
    pub fn fire_device_ready(&self) {
        self.inner.device_ready.set(true);
        let callbacks = std::mem::take(&mut *self.inner.device_ready_callbacks.borrow_mut());
        for callback in callbacks {
            callback();
        }
    }

    /// Run the frame callbacks queued so far. Returns how many ran.
    pub fn run_frames(&self) -> usize {
        let frames = std::mem::take(&mut *self.inner.frames.borrow_mut());
        let count = frames.len();
        for frame in frames {
            frame();
        }
        count
    }

    pub fn pending_frames(&self) -> usize {
        self.inner.frames.borrow().len()
    }

    pub fn pending_tasks(&self) -> usize {
        self.inner.tasks.borrow().len()
    }

    /// Await spawned tasks one after another until none are left.
    pub async fn run_pending(&self) {
        loop {
            let next = {
                let mut tasks = self.inner.tasks.borrow_mut();
                if tasks.is_empty() {
                    None
                } else {
                    Some(tasks.remove(0))
                }
            };
            match next {
                Some(task) => task.await,
                None => break,
            }
        }
    }

    /// Number of live listeners on a media query.
    pub fn media_listener_count(&self, query: &str) -> usize {
        self.inner
            .media
            .borrow()
            .get(query)
            .map(|mq| mq.listeners.borrow().len())
            .unwrap_or(0)
    }

    fn new_media(&self, query: &str, matches: bool) -> HeadlessMediaQuery {
        HeadlessMediaQuery {
            media: query.to_string(),
            matches: Cell::new(matches),
            listeners: RefCell::new(Vec::new()),
            next_id: Cell::new(1),
        }
    }

    fn make_element(&self, tag: &str, id: Option<&str>) -> Rc<VirtualElement> {
        let key = ElementKey(self.inner.next_key.get());
        self.inner.next_key.set(key.0 + 1);
        let element = Rc::new(VirtualElement::new(key, tag, id));
        self.inner.elements.borrow_mut().insert(key, Rc::clone(&element));
        element
    }

    fn lookup(&self, key: ElementKey) -> Option<Rc<VirtualElement>> {
        self.inner.elements.borrow().get(&key).cloned()
    }

    fn find(&self, key: ElementKey, selector: &str) -> Option<Rc<VirtualElement>> {
        let element = self.lookup(key)?;
        if element.matches(selector) {
            return Some(element);
        }
        let children = element.children.borrow().clone();
        children.into_iter().find_map(|child| self.find(child, selector))
    }
}

impl Host for HeadlessHost {
    fn query(&self, selector: &str) -> Option<ElementRef> {
        self.find(self.inner.document.key, selector).map(|e| e as ElementRef)
    }

    fn document_element(&self) -> ElementRef {
        Rc::clone(&self.inner.document) as ElementRef
    }

    fn create_element_before(&self, tag: &str, class: &str, before: &ElementRef) -> ElementRef {
        let element = self.make_element(tag, None);
        element.add_class(class);
        let parent = self.lookup(before.key()).and_then(|b| b.parent.get()).and_then(|p| self.lookup(p));
        if let Some(parent) = parent {
            element.parent.set(Some(parent.key));
            let mut children = parent.children.borrow_mut();
            let at = children.iter().position(|k| *k == before.key()).unwrap_or(children.len());
            children.insert(at, element.key);
        }
        element
    }

    fn remove_element(&self, element: &ElementRef) {
        let Some(target) = self.lookup(element.key()) else {
            return;
        };
        if let Some(parent) = target.parent.take().and_then(|p| self.lookup(p)) {
            parent.children.borrow_mut().retain(|k| *k != target.key);
        }
        target.connected.set(false);
        self.inner.elements.borrow_mut().remove(&target.key);
    }

    fn match_media(&self, query: &str) -> Option<Rc<dyn MediaQueryList>> {
        if !self.inner.media_supported.get() {
            return None;
        }
        let mq = {
            let mut media = self.inner.media.borrow_mut();
            Rc::clone(
                media
                    .entry(query.to_string())
                    .or_insert_with(|| Rc::new(self.new_media(query, false))),
            )
        };
        Some(mq)
    }

    fn language(&self) -> String {
        self.inner.language.borrow().clone()
    }

    fn is_online(&self) -> bool {
        self.inner.online.get()
    }

    fn watch_connectivity(&self, listener: Rc<dyn Fn(bool)>) -> Subscription {
        let id = Subscription(self.inner.next_subscription.get());
        self.inner.next_subscription.set(id.0 + 1);
        self.inner.connectivity.borrow_mut().push((id, listener));
        id
    }

    fn on_device_ready(&self, callback: Box<dyn FnOnce()>) {
        if self.inner.device_ready.get() {
            callback();
        } else {
            self.inner.device_ready_callbacks.borrow_mut().push(callback);
        }
    }

    fn next_frame(&self, callback: Box<dyn FnOnce()>) {
        self.inner.frames.borrow_mut().push(callback);
    }

    fn spawn_local(&self, task: LocalTask) {
        self.inner.tasks.borrow_mut().push(task);
    }
}
