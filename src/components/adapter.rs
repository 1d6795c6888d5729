//! Binding a declarative node to an imperative component instance.
//!
//! The lifecycle is strictly ordered:
//!
//! 1. [`ComponentAdapter::mount`] defers construction through the application's
//!    ready queue.
//! 2. Construction builds the instance from the current props, with one
//!    forwarding handler per imperative event registered up front.
//! 3. [`ComponentAdapter::update`] runs the prop watchers. Only props with a
//!    [`PropWatcher`] are reactive; changes to any other prop after
//!    construction are ignored. Components are not rebuilt on prop changes.
//! 4. [`ComponentAdapter::handle`] exposes the element and the instance.
//! 5. [`ComponentAdapter::unmount`] destroys the instance, if there is one.
//!
//! A failed construction leaves no instance behind and is not retried.

use super::{ComponentError, Forwarders, ImperativeComponent};
use crate::app::Application;
use crate::events::{BusEvent, Handler};
use crate::host::ElementRef;
use std::cell::{Cell, Ref, RefCell};
use std::collections::HashMap;
use std::rc::{Rc, Weak};

pub type EventOf<C> = <<C as AdaptedComponent>::Instance as ImperativeComponent>::Event;
pub type KindOf<C> = <EventOf<C> as BusEvent>::Kind;

/// Declarative callback, named like a prop (`panelOpen`, `click`, ...).
pub type Callback<E> = Rc<dyn Fn(&E)>;

/// Describes one declarative component.
pub trait AdaptedComponent: Sized + 'static {
    /// Used in log lines.
    const NAME: &'static str;

    type Props: Clone + PartialEq + 'static;
    type Instance: ImperativeComponent;
    /// State the declarative side derives from forwarded events.
    type View: Clone + Default + 'static;

    fn construct(
        app: &Application,
        el: &ElementRef,
        props: &Self::Props,
        forwarders: Forwarders<EventOf<Self>>,
    ) -> Result<Self::Instance, ComponentError>;

    /// Imperative event kinds and the callback names each one is forwarded to.
    fn forwarded_events() -> Vec<(KindOf<Self>, &'static [&'static str])>;

    fn watchers() -> Vec<PropWatcher<Self::Props, Self::Instance>>;

    /// Runs right after a successful construction.
    fn on_constructed(_instance: &Self::Instance, _props: &Self::Props) {}

    fn reduce_view(_view: &mut Self::View, _event: &EventOf<Self>) {}

    /// Classes the declarative side renders onto its element.
    fn classes(_props: &Self::Props, _view: &Self::View) -> Vec<String> {
        Vec::new()
    }
}

/// Pushes one reactive prop into the instance when its value changes.
pub struct PropWatcher<P, I> {
    name: &'static str,
    changed: Box<dyn Fn(&P, &P) -> bool>,
    apply: Box<dyn Fn(&I, &P)>,
}

impl<P: 'static, I: 'static> PropWatcher<P, I> {
    pub fn new<V, A>(name: &'static str, select: fn(&P) -> V, apply: A) -> Self
    where
        V: PartialEq + 'static,
        A: Fn(&I, V) + 'static,
    {
        Self {
            name,
            changed: Box::new(move |old: &P, new: &P| select(old) != select(new)),
            apply: Box::new(move |instance: &I, props: &P| apply(instance, select(props))),
        }
    }

    pub fn name(&self) -> &'static str {
        self.name
    }
}

struct AdapterInner<C: AdaptedComponent> {
    el: ElementRef,
    props: RefCell<C::Props>,
    instance: RefCell<Option<C::Instance>>,
    view: RefCell<C::View>,
    rendered: RefCell<Vec<String>>,
    callbacks: RefCell<HashMap<String, Callback<EventOf<C>>>>,
    watchers: Vec<PropWatcher<C::Props, C::Instance>>,
    mounted: Cell<bool>,
    /// Bumped by every mount and unmount; a queued construction only runs
    /// for the mount that scheduled it.
    generation: Cell<u64>,
    failure: RefCell<Option<String>>,
}

pub struct ComponentAdapter<C: AdaptedComponent> {
    inner: Rc<AdapterInner<C>>,
}

impl<C: AdaptedComponent> ComponentAdapter<C> {
    pub fn new(el: ElementRef, props: C::Props) -> Self {
        let adapter = Self {
            inner: Rc::new(AdapterInner {
                el,
                props: RefCell::new(props),
                instance: RefCell::new(None),
                view: RefCell::new(C::View::default()),
                rendered: RefCell::new(Vec::new()),
                callbacks: RefCell::new(HashMap::new()),
                watchers: C::watchers(),
                mounted: Cell::new(false),
                generation: Cell::new(0),
                failure: RefCell::new(None),
            }),
        };
        render(&adapter.inner);
        adapter
    }

    /// Set the callback prop `name` (e.g. `panelOpen`).
    pub fn set_callback<F>(&self, name: &str, callback: F)
    where
        F: Fn(&EventOf<C>) + 'static,
    {
        self.inner.callbacks.borrow_mut().insert(name.to_string(), Rc::new(callback));
    }

    pub fn remove_callback(&self, name: &str) {
        self.inner.callbacks.borrow_mut().remove(name);
    }

    /// Schedule construction for when `app` is initialized.
    pub fn mount(&self, app: &Application) {
        if self.inner.mounted.replace(true) {
            log::debug!("{}: already mounted", C::NAME);
            return;
        }
        let generation = self.inner.generation.get() + 1;
        self.inner.generation.set(generation);
        let weak = Rc::downgrade(&self.inner);
        app.on_ready(move |app| {
            let Some(inner) = weak.upgrade() else {
                return;
            };
            if inner.mounted.get() && inner.generation.get() == generation {
                construct(&inner, app);
            } else {
                log::debug!("{}: stale mount skipped", C::NAME);
            }
        });
    }

    /// Apply new props. Reactive props reach the instance through their
    /// watchers; other changes are ignored.
    pub fn update(&self, props: C::Props) {
        let old = self.inner.props.replace(props.clone());
        if old == props {
            return;
        }
        let instance = self.instance();
        let mut reacted = false;
        for watcher in &self.inner.watchers {
            if (watcher.changed)(&old, &props) {
                reacted = true;
                log::debug!("{}: prop '{}' changed", C::NAME, watcher.name);
                if let Some(instance) = &instance {
                    (watcher.apply)(instance, &props);
                }
            }
        }
        if !reacted {
            log::debug!("{}: non-reactive props changed after construction, ignored", C::NAME);
        }
        render(&self.inner);
    }

    /// Destroy the instance. Safe when construction never happened.
    pub fn unmount(&self) {
        self.inner.mounted.set(false);
        self.inner.generation.set(self.inner.generation.get() + 1);
        let instance = self.inner.instance.borrow_mut().take();
        if let Some(instance) = instance {
            instance.destroy();
            log::debug!("{}: instance destroyed", C::NAME);
        }
    }

    pub fn handle(&self) -> ComponentHandle<C> {
        ComponentHandle {
            inner: Rc::clone(&self.inner),
        }
    }

    pub fn el(&self) -> ElementRef {
        Rc::clone(&self.inner.el)
    }

    pub fn instance(&self) -> Option<C::Instance> {
        self.inner.instance.borrow().clone()
    }

    pub fn props(&self) -> Ref<'_, C::Props> {
        self.inner.props.borrow()
    }

    pub fn view(&self) -> C::View {
        self.inner.view.borrow().clone()
    }

    pub fn is_mounted(&self) -> bool {
        self.inner.mounted.get()
    }

    /// Message of the last failed construction, if any.
    pub fn construction_error(&self) -> Option<String> {
        self.inner.failure.borrow().clone()
    }
}

/// Consumer-facing handle: the rendered element plus an escape hatch to the
/// imperative instance.
pub struct ComponentHandle<C: AdaptedComponent> {
    inner: Rc<AdapterInner<C>>,
}

impl<C: AdaptedComponent> ComponentHandle<C> {
    pub fn el(&self) -> ElementRef {
        Rc::clone(&self.inner.el)
    }

    /// `None` before construction, after a failed construction and after
    /// unmount.
    pub fn instance(&self) -> Option<C::Instance> {
        self.inner.instance.borrow().clone()
    }
}

impl<C: AdaptedComponent> Clone for ComponentHandle<C> {
    fn clone(&self) -> Self {
        Self {
            inner: Rc::clone(&self.inner),
        }
    }
}

fn construct<C: AdaptedComponent>(inner: &Rc<AdapterInner<C>>, app: &Application) {
    if inner.instance.borrow().is_some() {
        log::debug!("{}: already constructed", C::NAME);
        return;
    }
    let props = inner.props.borrow().clone();
    let forwarders = forwarders(inner);

    match C::construct(app, &inner.el, &props, forwarders) {
        Ok(instance) => {
            *inner.instance.borrow_mut() = Some(instance.clone());
            inner.failure.borrow_mut().take();
            log::debug!("{}: instance constructed", C::NAME);
            C::on_constructed(&instance, &props);
        }
        Err(e) => {
            log::error!("{}: {}", C::NAME, e);
            *inner.failure.borrow_mut() = Some(e.to_string());
        }
    }
}

fn forwarders<C: AdaptedComponent>(inner: &Rc<AdapterInner<C>>) -> Forwarders<EventOf<C>> {
    C::forwarded_events()
        .into_iter()
        .map(|(kind, names)| {
            let weak: Weak<AdapterInner<C>> = Rc::downgrade(inner);
            let handler: Handler<EventOf<C>> = Rc::new(move |event: &EventOf<C>| {
                if let Some(inner) = weak.upgrade() {
                    forward(&inner, names, event);
                }
                Ok(())
            });
            (kind, handler)
        })
        .collect()
}

fn forward<C: AdaptedComponent>(inner: &Rc<AdapterInner<C>>, names: &[&str], event: &EventOf<C>) {
    C::reduce_view(&mut inner.view.borrow_mut(), event);
    render(inner);
    for name in names {
        let callback = inner.callbacks.borrow().get(*name).cloned();
        if let Some(callback) = callback {
            callback(event);
        }
    }
}

fn render<C: AdaptedComponent>(inner: &AdapterInner<C>) {
    let classes = {
        let props = inner.props.borrow();
        let view = inner.view.borrow();
        C::classes(&props, &view)
    };
    let mut rendered = inner.rendered.borrow_mut();
    for stale in rendered.iter().filter(|c| !classes.contains(c)) {
        inner.el.remove_class(stale);
    }
    for class in &classes {
        inner.el.add_class(class);
    }
    *rendered = classes;
}
