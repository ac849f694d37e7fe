//! The only surface the engine consumes from a host document tree.
//!
//! `willow-core` never touches a real DOM. Every mutation goes through this
//! trait, which a renderer crate (`willow-web`, or a test double) implements
//! for its own node type. Mutations apply to live node handles directly
//! rather than being recorded into a patch list for later replay, since
//! this engine's diff is always synchronous.

use std::fmt::Debug;
use std::rc::Rc;

/// The CSS custom-property prefix marker: a leading `-` means the name
/// is a custom property and must go through [`Document::set_custom_style_property`].
pub fn is_custom_property(name: &str) -> bool {
    name.starts_with('-')
}

/// The SVG namespace URI, entered when an intrinsic element's tag is `svg`.
pub const SVG_NAMESPACE: &str = "http://www.w3.org/2000/svg";

/// Abstraction over a live document tree.
///
/// Implementors own node creation, structural mutation, property writing and
/// event-listener delegation. `willow-core` calls these methods; it never
/// inspects `Node` beyond passing it back to the same trait.
pub trait Document: 'static {
    /// A handle to a live node (element, text node, or whatever else the
    /// host's `document.firstChild`-style API hands back). Cheap to clone
    /// and compared by reference identity.
    type Node: Clone + Debug + PartialEq + 'static;

    /// The raw event payload delivered to listeners registered through
    /// [`Document::set_listener`].
    type RawEvent: 'static;

    /// Create an element. `namespace` is `Some(SVG_NAMESPACE)` when diffing
    /// inside an `<svg>` subtree, `None` otherwise.
    fn create_element(&self, tag: &str, namespace: Option<&str>) -> Self::Node;

    /// Create a text node carrying `data`.
    fn create_text_node(&self, data: &str) -> Self::Node;

    /// Overwrite a text node's payload in place.
    fn set_text(&self, node: &Self::Node, data: &str);

    fn parent_node(&self, node: &Self::Node) -> Option<Self::Node>;
    fn first_child(&self, node: &Self::Node) -> Option<Self::Node>;
    fn next_sibling(&self, node: &Self::Node) -> Option<Self::Node>;

    /// Insert `child` into `parent`, before `reference` (or appended if `None`).
    fn insert_before(&self, parent: &Self::Node, child: &Self::Node, reference: Option<&Self::Node>);

    /// Detach `child` from `parent`.
    fn remove_child(&self, parent: &Self::Node, child: &Self::Node);

    /// The namespace URI a node currently lives in, used by the render entry
    /// to seed namespace propagation from the mount container.
    fn namespace_uri(&self, node: &Self::Node) -> Option<String>;

    /// Plain attribute write. `null`/`false` should have already been turned
    /// into [`Document::remove_attribute`] by the caller.
    fn set_attribute(&self, el: &Self::Node, name: &str, value: &str);
    fn remove_attribute(&self, el: &Self::Node, name: &str);

    /// `value`/`checked` on the default namespace: written as a live
    /// property, not an attribute, every diff regardless of equality.
    fn set_property_string(&self, el: &Self::Node, name: &str, value: &str);
    fn set_property_bool(&self, el: &Self::Node, name: &str, value: bool);

    fn set_inner_html(&self, el: &Self::Node, html: &str);

    /// `style` as a verbatim string, or when transitioning from a style map
    /// back to a string.
    fn set_css_text(&self, el: &Self::Node, text: &str);
    fn set_style_property(&self, el: &Self::Node, name: &str, value: &str);
    fn set_custom_style_property(&self, el: &Self::Node, name: &str, value: &str);
    fn remove_style_property(&self, el: &Self::Node, name: &str);

    /// Install, update, or tear down the delegated listener for one
    /// (node, event-name) pair. Implementations own the stable-proxy,
    /// mutable-handler-cell policy; `willow-core` just calls this once
    /// per differing listener prop and never registers a raw listener
    /// itself.
    fn set_listener(
        &self,
        el: &Self::Node,
        event_name: &'static str,
        handler: Option<Rc<dyn Fn(&Self::RawEvent)>>,
    );
}
