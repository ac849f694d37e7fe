//! An in-memory [`Document`] test double, for deterministic assertions
//! against DOM shape without a real browser: attributes, styles,
//! delegated listeners, and the SVG namespace switch all have inspectable
//! state here.

use std::cell::RefCell;
use std::fmt;
use std::rc::Rc;

use rustc_hash::FxHashMap;

use crate::commit::PostPaintScheduler;
use crate::document::Document;
use crate::scheduler::MicrotaskSpawner;

struct NodeData {
    id: u64,
    kind: NodeDataKind,
    parent: Option<u64>,
    children: Vec<u64>,
    attributes: FxHashMap<String, String>,
    properties: FxHashMap<String, PropertyValue>,
    style: FxHashMap<String, String>,
    listeners: FxHashMap<&'static str, Rc<dyn Fn(&TestEvent)>>,
    namespace: Option<String>,
    inner_html: Option<String>,
}

enum NodeDataKind {
    Element { tag: String },
    Text { data: String },
}

#[derive(Clone, Debug, PartialEq)]
enum PropertyValue {
    Text(String),
    Bool(bool),
}

/// An opaque raw event payload delivered to listeners registered through
/// [`RecordingDocument::set_listener`]. Tests construct one and dispatch it
/// manually with [`RecordingDocument::dispatch`]; there is no real event
/// loop here.
#[derive(Clone, Debug, Default)]
pub struct TestEvent {
    pub kind: &'static str,
}

/// A handle into a [`RecordingDocument`]'s node arena. Cheap to clone,
/// compared by the arena id it names.
#[derive(Clone)]
pub struct TestNode {
    id: u64,
    arena: Rc<RefCell<FxHashMap<u64, NodeData>>>,
}

impl PartialEq for TestNode {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}

impl fmt::Debug for TestNode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let arena = self.arena.borrow();
        match arena.get(&self.id) {
            Some(NodeData { kind: NodeDataKind::Text { data }, .. }) => {
                write!(f, "TestNode#{}({:?})", self.id, data)
            }
            Some(NodeData { kind: NodeDataKind::Element { tag }, .. }) => {
                write!(f, "TestNode#{}(<{}>)", self.id, tag)
            }
            None => write!(f, "TestNode#{}(<dropped>)", self.id),
        }
    }
}

struct RecordingDocumentInner {
    arena: Rc<RefCell<FxHashMap<u64, NodeData>>>,
    next_id: RefCell<u64>,
    microtasks: RefCell<Vec<Box<dyn FnOnce()>>>,
    post_paint_tasks: RefCell<Vec<Box<dyn FnOnce()>>>,
    insert_before_calls: std::cell::Cell<u64>,
}

/// A deterministic, in-memory stand-in for a browser DOM. Microtasks and
/// post-paint callbacks are recorded rather than run, so a test pumps them
/// explicitly with [`RecordingDocument::run_microtasks`] /
/// [`RecordingDocument::run_post_paint`] and observes batching exactly.
///
/// Cheap to clone (an `Rc` handle, like [`VNode`](crate::VNode)) so a single
/// document can be passed to [`Root::new`](crate::Root::new) as the
/// `Document`, the `MicrotaskSpawner`, and the `PostPaintScheduler` all at
/// once — every clone shares the same underlying arena and task queues.
#[derive(Clone)]
pub struct RecordingDocument(Rc<RecordingDocumentInner>);

impl Default for RecordingDocument {
    fn default() -> Self {
        Self::new()
    }
}

impl RecordingDocument {
    pub fn new() -> Self {
        RecordingDocument(Rc::new(RecordingDocumentInner {
            arena: Rc::new(RefCell::new(FxHashMap::default())),
            next_id: RefCell::new(0),
            microtasks: RefCell::new(Vec::new()),
            post_paint_tasks: RefCell::new(Vec::new()),
            insert_before_calls: std::cell::Cell::new(0),
        }))
    }

    /// Number of times [`Document::insert_before`] has run against this
    /// document so far — lets a test assert that an unchanged child sequence
    /// produced zero DOM moves, not just the right final shape.
    pub fn insert_before_call_count(&self) -> u64 {
        self.0.insert_before_calls.get()
    }

    /// Creates a detached element meant to serve as a mount container (not
    /// itself produced by the engine, since the engine only ever creates
    /// nodes via [`Document::create_element`]/[`Document::create_text_node`]).
    pub fn new_container(&self) -> TestNode {
        let id = self.alloc();
        self.0.arena.borrow_mut().insert(
            id,
            NodeData {
                id,
                kind: NodeDataKind::Element { tag: "root".into() },
                parent: None,
                children: Vec::new(),
                attributes: FxHashMap::default(),
                properties: FxHashMap::default(),
                style: FxHashMap::default(),
                listeners: FxHashMap::default(),
                namespace: None,
                inner_html: None,
            },
        );
        TestNode { id, arena: self.0.arena.clone() }
    }

    fn alloc(&self) -> u64 {
        let mut next = self.0.next_id.borrow_mut();
        let id = *next;
        *next += 1;
        id
    }

    /// Runs every microtask queued by [`MicrotaskSpawner::spawn`] since the
    /// last call, in order, including any it schedules while running.
    pub fn run_microtasks(&self) {
        loop {
            let pending = std::mem::take(&mut *self.0.microtasks.borrow_mut());
            if pending.is_empty() {
                return;
            }
            for task in pending {
                task();
            }
        }
    }

    pub fn run_post_paint(&self) {
        let pending = std::mem::take(&mut *self.0.post_paint_tasks.borrow_mut());
        for task in pending {
            task();
        }
    }

    /// Reads back an attribute set via [`Document::set_attribute`], for
    /// assertions — there is no real DOM to inspect here.
    pub fn attribute(&self, node: &TestNode, name: &str) -> Option<String> {
        self.0.arena.borrow().get(&node.id)?.attributes.get(name).cloned()
    }

    /// Reads back a style property set via [`Document::set_style_property`]
    /// or [`Document::set_custom_style_property`].
    pub fn style_property(&self, node: &TestNode, name: &str) -> Option<String> {
        self.0.arena.borrow().get(&node.id)?.style.get(name).cloned()
    }

    /// Whether `node` currently has a listener installed for `event_name`.
    pub fn has_listener(&self, node: &TestNode, event_name: &str) -> bool {
        self.0
            .arena
            .borrow()
            .get(&node.id)
            .is_some_and(|data| data.listeners.contains_key(event_name))
    }

    /// Dispatches `event` to `node`'s currently installed listener for
    /// `event_name`, if any — the test harness's substitute for a real
    /// event-delegation walk.
    pub fn dispatch(&self, node: &TestNode, event_name: &str, event: &TestEvent) {
        let handler = self
            .0
            .arena
            .borrow()
            .get(&node.id)
            .and_then(|data| data.listeners.get(event_name).cloned());
        if let Some(handler) = handler {
            handler(event);
        }
    }

    /// A readable tree dump (`<tag attr="v">text</tag>`-ish) of `container`'s
    /// children, useful for snapshot-style assertions without a real
    /// rendering surface. `container` itself is never printed — it's the
    /// mount point, not part of the rendered tree.
    pub fn debug_tree(&self, container: &TestNode) -> String {
        let mut out = String::new();
        let children = self
            .0
            .arena
            .borrow()
            .get(&container.id)
            .map(|d| d.children.clone())
            .unwrap_or_default();
        for child in children {
            self.write_tree(child, &mut out, 0);
        }
        out
    }

    fn write_tree(&self, id: u64, out: &mut String, depth: usize) {
        let indent = "  ".repeat(depth);
        let children = {
            let arena = self.0.arena.borrow();
            let Some(data) = arena.get(&id) else { return };
            match &data.kind {
                NodeDataKind::Text { data: text } => {
                    out.push_str(&format!("{indent}{text:?}\n"));
                    return;
                }
                NodeDataKind::Element { tag } => {
                    out.push_str(&format!("{indent}<{tag}>\n"));
                    data.children.clone()
                }
            }
        };
        for child in children {
            self.write_tree(child, out, depth + 1);
        }
    }
}

impl Document for RecordingDocument {
    type Node = TestNode;
    type RawEvent = TestEvent;

    fn create_element(&self, tag: &str, namespace: Option<&str>) -> Self::Node {
        let id = self.alloc();
        self.0.arena.borrow_mut().insert(
            id,
            NodeData {
                id,
                kind: NodeDataKind::Element { tag: tag.to_string() },
                parent: None,
                children: Vec::new(),
                attributes: FxHashMap::default(),
                properties: FxHashMap::default(),
                style: FxHashMap::default(),
                listeners: FxHashMap::default(),
                namespace: namespace.map(str::to_string),
                inner_html: None,
            },
        );
        TestNode { id, arena: self.0.arena.clone() }
    }

    fn create_text_node(&self, data: &str) -> Self::Node {
        let id = self.alloc();
        self.0.arena.borrow_mut().insert(
            id,
            NodeData {
                id,
                kind: NodeDataKind::Text { data: data.to_string() },
                parent: None,
                children: Vec::new(),
                attributes: FxHashMap::default(),
                properties: FxHashMap::default(),
                style: FxHashMap::default(),
                listeners: FxHashMap::default(),
                namespace: None,
                inner_html: None,
            },
        );
        TestNode { id, arena: self.0.arena.clone() }
    }

    fn set_text(&self, node: &Self::Node, data: &str) {
        if let Some(NodeData { kind: NodeDataKind::Text { data: slot }, .. }) =
            self.0.arena.borrow_mut().get_mut(&node.id)
        {
            *slot = data.to_string();
        }
    }

    fn parent_node(&self, node: &Self::Node) -> Option<Self::Node> {
        let parent_id = self.0.arena.borrow().get(&node.id)?.parent?;
        Some(TestNode { id: parent_id, arena: self.0.arena.clone() })
    }

    fn first_child(&self, node: &Self::Node) -> Option<Self::Node> {
        let child_id = *self.0.arena.borrow().get(&node.id)?.children.first()?;
        Some(TestNode { id: child_id, arena: self.0.arena.clone() })
    }

    fn next_sibling(&self, node: &Self::Node) -> Option<Self::Node> {
        let arena = self.0.arena.borrow();
        let data = arena.get(&node.id)?;
        let parent = arena.get(&data.parent?)?;
        let pos = parent.children.iter().position(|c| *c == node.id)?;
        let next_id = *parent.children.get(pos + 1)?;
        drop(arena);
        Some(TestNode { id: next_id, arena: self.0.arena.clone() })
    }

    fn insert_before(&self, parent: &Self::Node, child: &Self::Node, reference: Option<&Self::Node>) {
        self.0.insert_before_calls.set(self.0.insert_before_calls.get() + 1);
        let mut arena = self.0.arena.borrow_mut();
        if let Some(old_parent_id) = arena.get(&child.id).and_then(|d| d.parent) {
            if let Some(old_parent) = arena.get_mut(&old_parent_id) {
                old_parent.children.retain(|c| *c != child.id);
            }
        }
        let parent_data = arena.get_mut(&parent.id).expect("insert_before: parent not in arena");
        let pos = match reference {
            Some(reference) => parent_data.children.iter().position(|c| *c == reference.id).unwrap_or(parent_data.children.len()),
            None => parent_data.children.len(),
        };
        parent_data.children.insert(pos, child.id);
        if let Some(child_data) = arena.get_mut(&child.id) {
            child_data.parent = Some(parent.id);
        }
    }

    fn remove_child(&self, parent: &Self::Node, child: &Self::Node) {
        let mut arena = self.0.arena.borrow_mut();
        if let Some(parent_data) = arena.get_mut(&parent.id) {
            parent_data.children.retain(|c| *c != child.id);
        }
        if let Some(child_data) = arena.get_mut(&child.id) {
            child_data.parent = None;
        }
    }

    fn namespace_uri(&self, node: &Self::Node) -> Option<String> {
        self.0.arena.borrow().get(&node.id)?.namespace.clone()
    }

    fn set_attribute(&self, el: &Self::Node, name: &str, value: &str) {
        if let Some(data) = self.0.arena.borrow_mut().get_mut(&el.id) {
            data.attributes.insert(name.to_string(), value.to_string());
        }
    }

    fn remove_attribute(&self, el: &Self::Node, name: &str) {
        if let Some(data) = self.0.arena.borrow_mut().get_mut(&el.id) {
            data.attributes.remove(name);
        }
    }

    fn set_property_string(&self, el: &Self::Node, name: &str, value: &str) {
        if let Some(data) = self.0.arena.borrow_mut().get_mut(&el.id) {
            data.properties.insert(name.to_string(), PropertyValue::Text(value.to_string()));
        }
    }

    fn set_property_bool(&self, el: &Self::Node, name: &str, value: bool) {
        if let Some(data) = self.0.arena.borrow_mut().get_mut(&el.id) {
            data.properties.insert(name.to_string(), PropertyValue::Bool(value));
        }
    }

    fn set_inner_html(&self, el: &Self::Node, html: &str) {
        if let Some(data) = self.0.arena.borrow_mut().get_mut(&el.id) {
            data.inner_html = Some(html.to_string());
        }
    }

    fn set_css_text(&self, el: &Self::Node, text: &str) {
        if let Some(data) = self.0.arena.borrow_mut().get_mut(&el.id) {
            data.style.clear();
            if !text.is_empty() {
                data.style.insert("cssText".to_string(), text.to_string());
            }
        }
    }

    fn set_style_property(&self, el: &Self::Node, name: &str, value: &str) {
        if let Some(data) = self.0.arena.borrow_mut().get_mut(&el.id) {
            data.style.remove("cssText");
            data.style.insert(name.to_string(), value.to_string());
        }
    }

    fn set_custom_style_property(&self, el: &Self::Node, name: &str, value: &str) {
        self.set_style_property(el, name, value);
    }

    fn remove_style_property(&self, el: &Self::Node, name: &str) {
        if let Some(data) = self.0.arena.borrow_mut().get_mut(&el.id) {
            data.style.remove(name);
        }
    }

    fn set_listener(
        &self,
        el: &Self::Node,
        event_name: &'static str,
        handler: Option<Rc<dyn Fn(&Self::RawEvent)>>,
    ) {
        if let Some(data) = self.0.arena.borrow_mut().get_mut(&el.id) {
            match handler {
                Some(handler) => {
                    data.listeners.insert(event_name, handler);
                }
                None => {
                    data.listeners.remove(event_name);
                }
            }
        }
    }
}

impl MicrotaskSpawner for RecordingDocument {
    fn spawn(&self, task: Box<dyn FnOnce()>) {
        self.0.microtasks.borrow_mut().push(task);
    }
}

impl PostPaintScheduler for RecordingDocument {
    fn schedule(&self, task: Box<dyn FnOnce()>) {
        self.0.post_paint_tasks.borrow_mut().push(task);
    }
}
