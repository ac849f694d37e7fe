//! Context identification, provider lookup, and subscriber notification.
//! A consumer finds its value by walking `parent` pointers up to the
//! nearest provider for its context id, rather than through a
//! `TypeId`-keyed global map.

use std::any::Any;
use std::cell::{Cell, RefCell};
use std::rc::{Rc, Weak};

use crate::any_props::{AnyProps, VProps};
use crate::document::Document;
use crate::scope::ComponentInstance;
use crate::vnode::{Key, NodeKind, VNode, VNodeData};

/// Required alongside `Clone` so the diff engine can compare a Provider's
/// new value against its stored one without ever naming `T`.
pub trait ProviderValue: PartialEq + Clone + 'static {}
impl<T: PartialEq + Clone + 'static> ProviderValue for T {}

/// A unique context identity. Two `Context<T>`s are the same context iff
/// they share an `id`.
pub struct Context<T> {
    pub(crate) id: usize,
    pub default_value: T,
}

static NEXT_CONTEXT_ID: std::sync::atomic::AtomicUsize = std::sync::atomic::AtomicUsize::new(1);

/// `createContext(default)`.
pub fn create_context<T: ProviderValue>(default: T) -> Context<T> {
    Context {
        id: NEXT_CONTEXT_ID.fetch_add(1, std::sync::atomic::Ordering::Relaxed),
        default_value: default,
    }
}

/// Props for the synthetic Provider component: a Provider is
/// "an ordinary component whose render result is its children prop."
pub struct ProviderProps<D: Document, T> {
    pub value: T,
    pub children: Vec<VNode<D>>,
}

impl<D: Document, T: Clone> Clone for ProviderProps<D, T> {
    fn clone(&self) -> Self {
        ProviderProps { value: self.value.clone(), children: self.children.clone() }
    }
}

fn provider_render<D: Document, T: Clone + 'static>(props: ProviderProps<D, T>) -> Option<VNode<D>> {
    Some(VNode::fragment_with(props.children))
}

/// Builds a Provider vnode — `createContext(default)`'s returned `Provider`.
pub fn create_provider<D: Document, T: ProviderValue>(
    ctx: &Context<T>,
    value: T,
    children: Vec<VNode<D>>,
    key: Option<Key>,
) -> VNode<D> {
    let provider_state = Rc::new(ProviderState::new(
        ctx.id,
        Rc::new(value.clone()) as Rc<dyn Any>,
        any_eq::<T>,
    ));
    let boxed: Box<dyn AnyProps<D>> = Box::new(VProps {
        render_fn: provider_render::<D, T>,
        props: ProviderProps { value, children },
        name: "Provider",
    });
    VNode(Rc::new(RefCell::new(VNodeData {
        kind: NodeKind::Component {
            fn_ptr: provider_render::<D, T> as usize,
            name: "Provider",
            props: RefCell::new(boxed),
            provider: Some(provider_state),
        },
        key,
        vref: None,
        dom: RefCell::new(None),
        children: RefCell::new(Vec::new()),
        component: RefCell::new(None),
        parent: RefCell::new(None),
        depth: Cell::new(0),
        index: Cell::new(0),
    })))
}

/// Per-Provider-vnode state: the live value (type-erased, since
/// `NodeKind::Component` is itself type-erased) and the set of subscribed
/// component instances.
pub struct ProviderState<D: Document> {
    pub(crate) context_id: usize,
    pub(crate) value: RefCell<Rc<dyn Any>>,
    pub(crate) subscribers: RefCell<Vec<Weak<RefCell<ComponentInstance<D>>>>>,
    /// Same-value-is-Object.is for the erased value, monomorphized once per
    /// `T` at [`create_provider`] time so the diff engine can compare values
    /// without ever naming `T` itself.
    pub(crate) eq: fn(&dyn Any, &dyn Any) -> bool,
}

impl<D: Document> ProviderState<D> {
    fn new(context_id: usize, value: Rc<dyn Any>, eq: fn(&dyn Any, &dyn Any) -> bool) -> Self {
        ProviderState {
            context_id,
            value: RefCell::new(value),
            subscribers: RefCell::new(Vec::new()),
            eq,
        }
    }
}

fn any_eq<T: PartialEq + 'static>(a: &dyn Any, b: &dyn Any) -> bool {
    match (a.downcast_ref::<T>(), b.downcast_ref::<T>()) {
        (Some(a), Some(b)) => a == b,
        _ => false,
    }
}

/// Walk `start`'s `parent` chain looking for a Provider vnode whose context
/// id matches `context_id` (the `useContext` lookup).
pub(crate) fn find_provider<D: Document>(
    start: &VNode<D>,
    context_id: usize,
) -> Option<Rc<ProviderState<D>>> {
    let mut cursor = start.parent();
    while let Some(node) = cursor {
        let data = node.0.borrow();
        if let NodeKind::Component { provider: Some(p), .. } = &data.kind {
            if p.context_id == context_id {
                return Some(p.clone());
            }
        }
        drop(data);
        cursor = node.parent();
    }
    None
}

pub(crate) fn subscribe<D: Document>(
    provider: &Rc<ProviderState<D>>,
    instance: &Rc<RefCell<ComponentInstance<D>>>,
) {
    let already = provider
        .subscribers
        .borrow()
        .iter()
        .any(|w| w.upgrade().is_some_and(|s| Rc::ptr_eq(&s, instance)));
    if !already {
        provider.subscribers.borrow_mut().push(Rc::downgrade(instance));
    }
    let mut inst = instance.borrow_mut();
    if !inst
        .context_subscriptions
        .iter()
        .any(|w| w.upgrade().is_some_and(|p| Rc::ptr_eq(&p, provider)))
    {
        inst.context_subscriptions.push(Rc::downgrade(provider));
    }
}

/// `notifyContextSubscribers`: enqueue every subscriber still alive,
/// dropping the rest.
pub(crate) fn notify_subscribers<D: Document>(
    provider: &Rc<ProviderState<D>>,
    scheduler: &Rc<crate::scheduler::Scheduler<D>>,
) {
    provider.subscribers.borrow_mut().retain(|w| match w.upgrade() {
        Some(instance) if instance.borrow().is_alive() => {
            scheduler.enqueue_render(&instance);
            true
        }
        _ => false,
    });
}

/// Run during unmount: remove `instance` from every provider it had
/// subscribed to.
pub(crate) fn cleanup_subscriptions<D: Document>(instance: &Rc<RefCell<ComponentInstance<D>>>) {
    let subs = std::mem::take(&mut instance.borrow_mut().context_subscriptions);
    for provider in subs.iter().filter_map(|w| w.upgrade()) {
        provider
            .subscribers
            .borrow_mut()
            .retain(|w| !w.upgrade().is_some_and(|s| Rc::ptr_eq(&s, instance)));
    }
}
