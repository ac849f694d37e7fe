//! The virtual-node model.
//!
//! Dynamic dispatch on a node's kind is a tagged enum: `Text | Element |
//! Component | Fragment | Portal`. Each [`VNode`] is a cheap handle
//! (`Rc<RefCell<..>>`) around its data so that a parent can own its
//! children in a `Vec` while children hold a non-owning [`Weak`]
//! back-reference to their structural parent.

use std::borrow::Cow;
use std::cell::{Cell, RefCell};
use std::fmt;
use std::rc::{Rc, Weak};

use crate::any_props::{AnyProps, VProps};
use crate::document::Document;
use crate::scope::ComponentInstance;

/// A reconciliation key: matches a new child against an old sibling.
pub type Key = Cow<'static, str>;

/// Either a single-slot container (`createRef`) or a callback ref.
pub enum RefTarget<D: Document> {
    Slot(Rc<RefCell<Option<RefValue<D>>>>),
    Callback(Rc<dyn Fn(Option<RefValue<D>>)>),
}

impl<D: Document> Clone for RefTarget<D> {
    fn clone(&self) -> Self {
        match self {
            RefTarget::Slot(s) => RefTarget::Slot(s.clone()),
            RefTarget::Callback(f) => RefTarget::Callback(f.clone()),
        }
    }
}

/// What a ref resolves to: a live DOM node for elements, or the component
/// instance handle for function components.
#[derive(Clone)]
pub enum RefValue<D: Document> {
    Node(D::Node),
    Component(Rc<RefCell<ComponentInstance<D>>>),
}

/// `createRef()`: a single-slot container starting empty.
pub fn create_ref<D: Document>() -> Rc<RefCell<Option<RefValue<D>>>> {
    Rc::new(RefCell::new(None))
}

/// A style value: either a raw `cssText` string or a name→value map.
#[derive(Clone, Debug)]
pub enum StyleValue {
    Text(Cow<'static, str>),
    Map(Vec<(Cow<'static, str>, StyleDecl)>),
}

/// One entry in a style map. Numbers gain a `px` suffix unless the property
/// name is in the unitless set; that rule is applied in `props.rs`,
/// not here, since it needs the property name alongside the value.
#[derive(Clone, Debug, PartialEq)]
pub enum StyleDecl {
    Text(Cow<'static, str>),
    Number(f64),
}

/// One property or attribute value — an open union of the kinds a
/// host might need to write.
pub enum PropValue<D: Document> {
    Text(Cow<'static, str>),
    Number(f64),
    Bool(bool),
    Style(StyleValue),
    DangerouslySetInnerHtml(Cow<'static, str>),
    Listener(Rc<dyn Fn(&D::RawEvent)>),
}

impl<D: Document> Clone for PropValue<D> {
    fn clone(&self) -> Self {
        match self {
            PropValue::Text(s) => PropValue::Text(s.clone()),
            PropValue::Number(n) => PropValue::Number(*n),
            PropValue::Bool(b) => PropValue::Bool(*b),
            PropValue::Style(s) => PropValue::Style(s.clone()),
            PropValue::DangerouslySetInnerHtml(s) => PropValue::DangerouslySetInnerHtml(s.clone()),
            PropValue::Listener(f) => PropValue::Listener(f.clone()),
        }
    }
}

/// An intrinsic element's property mapping. `key`/`ref`/`children` are
/// hoisted to top-level `VNode` fields at construction time and never
/// appear here.
pub struct Props<D: Document> {
    pub(crate) entries: Vec<(Cow<'static, str>, PropValue<D>)>,
}

impl<D: Document> Clone for Props<D> {
    fn clone(&self) -> Self {
        Self { entries: self.entries.clone() }
    }
}

impl<D: Document> Default for Props<D> {
    fn default() -> Self {
        Self { entries: Vec::new() }
    }
}

impl<D: Document> Props<D> {
    pub fn new() -> Self {
        Self { entries: Vec::new() }
    }

    pub fn get(&self, name: &str) -> Option<&PropValue<D>> {
        self.entries.iter().find(|(n, _)| n == name).map(|(_, v)| v)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &PropValue<D>)> {
        self.entries.iter().map(|(n, v)| (n.as_ref(), v))
    }

    pub fn set(&mut self, name: impl Into<Cow<'static, str>>, value: PropValue<D>) {
        let name = name.into();
        if let Some(slot) = self.entries.iter_mut().find(|(n, _)| *n == name) {
            slot.1 = value;
        } else {
            self.entries.push((name, value));
        }
    }
}

/// The dispatchable shape of a node's `type`.
pub enum NodeKind<D: Document> {
    /// `type === null`; `props` is the string payload.
    Text(Cow<'static, str>),
    /// An intrinsic element, addressed by tag name.
    Element { tag: Cow<'static, str>, props: Props<D> },
    /// A function component. Type-erased via [`AnyProps`] so that a
    /// heterogeneous tree of component vnodes can share one representation;
    /// `fn_ptr` is the identity the diff engine compares against the
    /// previous vnode's to decide reuse vs. replace.
    Component {
        fn_ptr: usize,
        name: &'static str,
        props: RefCell<Box<dyn AnyProps<D>>>,
        /// Present only for Provider components.
        provider: Option<Rc<crate::context::ProviderState<D>>>,
    },
    /// `Fragment` — a component whose render is `children`.
    Fragment,
    /// The portal sentinel; `container` is where children mount.
    Portal { container: D::Node },
}

impl<D: Document> NodeKind<D> {
    /// Whether `self` and `other` share the same `type`: text vs text, same
    /// tag, same component fn, fragment vs fragment, portal vs portal —
    /// container identity is checked separately since a portal can change
    /// target without changing type.
    pub(crate) fn same_type(&self, other: &NodeKind<D>) -> bool {
        match (self, other) {
            (NodeKind::Text(_), NodeKind::Text(_)) => true,
            (NodeKind::Element { tag: a, .. }, NodeKind::Element { tag: b, .. }) => a == b,
            (
                NodeKind::Component { fn_ptr: a, provider: pa, .. },
                NodeKind::Component { fn_ptr: b, provider: pb, .. },
            ) => match (pa, pb) {
                // Providers are distinguished by which `Context` they carry,
                // not by the shared monomorphized render function every
                // `Context<T>` of the same `T` would otherwise collide on.
                (Some(x), Some(y)) => x.context_id == y.context_id,
                (None, None) => a == b,
                _ => false,
            },
            (NodeKind::Fragment, NodeKind::Fragment) => true,
            (NodeKind::Portal { .. }, NodeKind::Portal { .. }) => true,
            _ => false,
        }
    }
}

/// Reconciliation bookkeeping owned by the engine, never the caller.
pub struct VNodeData<D: Document> {
    pub(crate) kind: NodeKind<D>,
    pub(crate) key: Option<Key>,
    pub(crate) vref: Option<RefTarget<D>>,

    pub(crate) dom: RefCell<Option<D::Node>>,
    pub(crate) children: RefCell<Vec<VNode<D>>>,
    pub(crate) component: RefCell<Option<Rc<RefCell<ComponentInstance<D>>>>>,
    pub(crate) parent: RefCell<Option<Weak<RefCell<VNodeData<D>>>>>,
    pub(crate) depth: Cell<u32>,
    pub(crate) index: Cell<usize>,
}

/// A handle to a vnode. Cloning is a refcount bump, not a deep copy — the
/// same handle shared between, say, a ref queue entry and the tree itself.
pub struct VNode<D: Document>(pub(crate) Rc<RefCell<VNodeData<D>>>);

impl<D: Document> Clone for VNode<D> {
    fn clone(&self) -> Self {
        VNode(self.0.clone())
    }
}

impl<D: Document> fmt::Debug for VNode<D> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let data = self.0.borrow();
        match &data.kind {
            NodeKind::Text(s) => write!(f, "Text({s:?})"),
            NodeKind::Element { tag, .. } => write!(f, "Element(<{tag}>)"),
            NodeKind::Component { name, .. } => write!(f, "Component({name})"),
            NodeKind::Fragment => write!(f, "Fragment"),
            NodeKind::Portal { .. } => write!(f, "Portal"),
        }
    }
}

impl<D: Document> VNode<D> {
    fn new(kind: NodeKind<D>, key: Option<Key>, vref: Option<RefTarget<D>>) -> Self {
        VNode(Rc::new(RefCell::new(VNodeData {
            kind,
            key,
            vref,
            dom: RefCell::new(None),
            children: RefCell::new(Vec::new()),
            component: RefCell::new(None),
            parent: RefCell::new(None),
            depth: Cell::new(0),
            index: Cell::new(0),
        })))
    }

    pub fn text(value: impl Into<Cow<'static, str>>) -> Self {
        Self::new(NodeKind::Text(value.into()), None, None)
    }

    pub fn fragment() -> Self {
        Self::new(NodeKind::Fragment, None, None)
    }

    /// A fragment wrapping an explicit child sequence — the common case for
    /// a component that wants to return several siblings without a wrapper
    /// element.
    pub fn fragment_with(children: Vec<VNode<D>>) -> Self {
        let node = Self::new(NodeKind::Fragment, None, None);
        *node.0.borrow().children.borrow_mut() = children;
        node
    }

    pub fn element(tag: impl Into<Cow<'static, str>>) -> ElementBuilder<D> {
        ElementBuilder {
            tag: tag.into(),
            props: Props::new(),
            key: None,
            vref: None,
            children: Vec::new(),
        }
    }

    /// `createPortal(children, container)`.
    pub fn portal(container: D::Node, children: Vec<VNode<D>>) -> Self {
        let node = Self::new(NodeKind::Portal { container }, None, None);
        *node.0.borrow().children.borrow_mut() = children;
        node
    }

    /// Construct a type-erased function-component vnode. `render_fn`'s
    /// pointer value is the `type` identity compared during diff.
    pub fn component<P: Clone + 'static>(
        render_fn: fn(P) -> Option<VNode<D>>,
        props: P,
        name: &'static str,
        key: Option<Key>,
    ) -> Self {
        let boxed: Box<dyn AnyProps<D>> = Box::new(VProps { render_fn, props, name });
        Self::new(
            NodeKind::Component {
                fn_ptr: render_fn as usize,
                name,
                props: RefCell::new(boxed),
                provider: None,
            },
            key,
            None,
        )
    }

    pub fn key(&self) -> Option<Key> {
        self.0.borrow().key.clone()
    }

    pub fn dom(&self) -> Option<D::Node> {
        self.0.borrow().dom.borrow().clone()
    }

    pub fn depth(&self) -> u32 {
        self.0.borrow().depth.get()
    }

    pub(crate) fn set_parent(&self, parent: &VNode<D>) {
        *self.0.borrow().parent.borrow_mut() = Some(Rc::downgrade(&parent.0));
    }

    pub(crate) fn parent(&self) -> Option<VNode<D>> {
        self.0
            .borrow()
            .parent
            .borrow()
            .as_ref()
            .and_then(|w| w.upgrade())
            .map(VNode)
    }

    pub fn is_same_handle(&self, other: &VNode<D>) -> bool {
        Rc::ptr_eq(&self.0, &other.0)
    }

    /// Whether `self` and `other` share a `type`.
    pub(crate) fn same_type(&self, other: &VNode<D>) -> bool {
        self.0.borrow().kind.same_type(&other.0.borrow().kind)
    }

    /// Descend through components/fragments/portals to find the first live
    /// DOM node owned by this vnode or one of its descendants. A
    /// portal's children live elsewhere, so a portal contributes nothing to
    /// its structural parent's DOM range.
    pub(crate) fn first_dom(&self) -> Option<D::Node> {
        let data = self.0.borrow();
        match &data.kind {
            NodeKind::Portal { .. } => None,
            NodeKind::Text(_) | NodeKind::Element { .. } => data.dom.borrow().clone(),
            NodeKind::Fragment | NodeKind::Component { .. } => {
                data.children.borrow().iter().find_map(|c| c.first_dom())
            }
        }
    }

    pub(crate) fn last_dom(&self) -> Option<D::Node> {
        let data = self.0.borrow();
        match &data.kind {
            NodeKind::Portal { .. } => None,
            NodeKind::Text(_) | NodeKind::Element { .. } => data.dom.borrow().clone(),
            NodeKind::Fragment | NodeKind::Component { .. } => {
                data.children.borrow().iter().rev().find_map(|c| c.last_dom())
            }
        }
    }

    pub(crate) fn any_child_ref(&self) -> Option<VNode<D>> {
        self.0.borrow().children.borrow().first().cloned()
    }

    pub(crate) fn set_dom(&self, node: Option<D::Node>) {
        *self.0.borrow().dom.borrow_mut() = node;
    }

    pub(crate) fn children(&self) -> Vec<VNode<D>> {
        self.0.borrow().children.borrow().clone()
    }

    pub(crate) fn set_children(&self, children: Vec<VNode<D>>) {
        *self.0.borrow().children.borrow_mut() = children;
    }

    pub(crate) fn component_instance(&self) -> Option<Rc<RefCell<ComponentInstance<D>>>> {
        self.0.borrow().component.borrow().clone()
    }

    pub(crate) fn set_component(&self, instance: Option<Rc<RefCell<ComponentInstance<D>>>>) {
        *self.0.borrow().component.borrow_mut() = instance;
    }

    pub(crate) fn set_depth_index(&self, depth: u32, index: usize) {
        let data = self.0.borrow();
        data.depth.set(depth);
        data.index.set(index);
    }

    pub(crate) fn vref(&self) -> Option<RefTarget<D>> {
        self.0.borrow().vref.clone()
    }

    /// The Provider state carried by this vnode, if it is one.
    pub(crate) fn provider(&self) -> Option<Rc<crate::context::ProviderState<D>>> {
        match &self.0.borrow().kind {
            NodeKind::Component { provider, .. } => provider.clone(),
            _ => None,
        }
    }

    /// Swaps in a (possibly reused, subscriber-carrying) Provider state. Used
    /// on Provider re-render to keep the previous state's subscriber list
    /// alive across the otherwise-fresh vnode the render body rebuilds every
    /// call.
    pub(crate) fn set_provider(&self, provider: Option<Rc<crate::context::ProviderState<D>>>) {
        if let NodeKind::Component { provider: slot, .. } = &mut self.0.borrow_mut().kind {
            *slot = provider;
        }
    }
}

/// Builder for intrinsic elements — the statically typed stand-in for
/// `make(tag, props, ...children)`.
pub struct ElementBuilder<D: Document> {
    tag: Cow<'static, str>,
    props: Props<D>,
    key: Option<Key>,
    vref: Option<RefTarget<D>>,
    children: Vec<VNode<D>>,
}

impl<D: Document> ElementBuilder<D> {
    pub fn attr(mut self, name: impl Into<Cow<'static, str>>, value: impl Into<Cow<'static, str>>) -> Self {
        self.props.set(name, PropValue::Text(value.into()));
        self
    }

    pub fn attr_number(mut self, name: impl Into<Cow<'static, str>>, value: f64) -> Self {
        self.props.set(name, PropValue::Number(value));
        self
    }

    pub fn attr_bool(mut self, name: impl Into<Cow<'static, str>>, value: bool) -> Self {
        self.props.set(name, PropValue::Bool(value));
        self
    }

    pub fn style_text(mut self, css: impl Into<Cow<'static, str>>) -> Self {
        self.props.set("style", PropValue::Style(StyleValue::Text(css.into())));
        self
    }

    pub fn style_map(mut self, decls: Vec<(Cow<'static, str>, StyleDecl)>) -> Self {
        self.props.set("style", PropValue::Style(StyleValue::Map(decls)));
        self
    }

    pub fn dangerously_set_inner_html(mut self, html: impl Into<Cow<'static, str>>) -> Self {
        self.props
            .set("dangerouslySetInnerHTML", PropValue::DangerouslySetInnerHtml(html.into()));
        self
    }

    /// Registers an event listener for the bare event name (`"click"`).
    /// Internally stored under the `on`+uppercase convention so the
    /// generic property-writer treats builder-constructed and
    /// `Props::set`-constructed listeners identically.
    pub fn on(mut self, event_name: &'static str, handler: impl Fn(&D::RawEvent) + 'static) -> Self {
        self.props.set(
            crate::props::on_prop_name(event_name),
            PropValue::Listener(Rc::new(handler)),
        );
        self
    }

    pub fn key(mut self, key: impl Into<Key>) -> Self {
        self.key = Some(key.into());
        self
    }

    pub fn vref(mut self, target: RefTarget<D>) -> Self {
        self.vref = Some(target);
        self
    }

    pub fn child(mut self, child: VNode<D>) -> Self {
        self.children.push(child);
        self
    }

    pub fn children(mut self, children: impl IntoIterator<Item = VNode<D>>) -> Self {
        self.children.extend(children);
        self
    }

    pub fn build(self) -> VNode<D> {
        let node = VNode::new(
            NodeKind::Element { tag: self.tag, props: self.props },
            self.key,
            self.vref,
        );
        *node.0.borrow().children.borrow_mut() = self.children;
        node
    }
}
