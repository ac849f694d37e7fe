//! [`Document`] implemented against `web-sys`. Node creation and structural
//! mutation go straight through `web_sys::window().document()` and direct
//! node handles — there is no `ElementId`-indexed arena in between.

use std::rc::Rc;

use wasm_bindgen::JsCast;
use web_sys::{Element, Node, Text};

use willow_core::{is_custom_property, Document};

use crate::events::EventRegistry;

/// The `web-sys` renderer's `Document` impl. Holds nothing of its own beyond
/// the event-delegation registry — a side table mapping element handles to
/// per-event handler mappings.
#[derive(Clone)]
pub struct WebDocument {
    events: Rc<EventRegistry>,
}

impl WebDocument {
    /// Builds a fresh event-delegation registry. Cheap to construct; one
    /// instance per mounted root is the expected usage (see [`crate::render`]).
    pub fn new() -> Self {
        WebDocument { events: Rc::new(EventRegistry::new()) }
    }

    fn document(&self) -> web_sys::Document {
        web_sys::window()
            .expect("willow-web: no global `window` (not running in a browser?)")
            .document()
            .expect("willow-web: `window.document` is unavailable")
    }
}

impl Default for WebDocument {
    fn default() -> Self {
        Self::new()
    }
}

fn as_element(node: &Node) -> &Element {
    node.dyn_ref::<Element>()
        .expect("willow-web: expected an Element node for a property/attribute/listener write")
}

/// The `style` mixin (`ElementCSSInlineStyle`) is implemented by both
/// `HtmlElement` and `SvgElement` — an SVG intrinsic (`<circle>`, `<path>`,
/// ...) is never an `HtmlElement`, so a style write that only checked the
/// former would silently no-op on every SVG node.
fn inline_style(node: &Node) -> Option<web_sys::CssStyleDeclaration> {
    if let Some(html_el) = node.dyn_ref::<web_sys::HtmlElement>() {
        return Some(html_el.style());
    }
    node.dyn_ref::<web_sys::SvgElement>().map(|svg_el| svg_el.style())
}

impl Document for WebDocument {
    type Node = Node;
    type RawEvent = web_sys::Event;

    fn create_element(&self, tag: &str, namespace: Option<&str>) -> Self::Node {
        let el = match namespace {
            Some(ns) => self
                .document()
                .create_element_ns(Some(ns), tag)
                .unwrap_or_else(|e| panic!("willow-web: create_element_ns({tag:?}, {ns:?}) failed: {e:?}")),
            None => self
                .document()
                .create_element(tag)
                .unwrap_or_else(|e| panic!("willow-web: create_element({tag:?}) failed: {e:?}")),
        };
        el.into()
    }

    fn create_text_node(&self, data: &str) -> Self::Node {
        self.document().create_text_node(data).into()
    }

    fn set_text(&self, node: &Self::Node, data: &str) {
        node.dyn_ref::<Text>()
            .expect("willow-web: set_text called on a non-text node")
            .set_data(data);
    }

    fn parent_node(&self, node: &Self::Node) -> Option<Self::Node> {
        node.parent_node()
    }

    fn first_child(&self, node: &Self::Node) -> Option<Self::Node> {
        node.first_child()
    }

    fn next_sibling(&self, node: &Self::Node) -> Option<Self::Node> {
        node.next_sibling()
    }

    fn insert_before(&self, parent: &Self::Node, child: &Self::Node, reference: Option<&Self::Node>) {
        parent
            .insert_before(child, reference)
            .unwrap_or_else(|e| panic!("willow-web: insert_before failed: {e:?}"));
    }

    fn remove_child(&self, parent: &Self::Node, child: &Self::Node) {
        self.events.forget(child);
        let _ = parent.remove_child(child);
    }

    fn namespace_uri(&self, node: &Self::Node) -> Option<String> {
        node.dyn_ref::<Element>().and_then(|el| el.namespace_uri())
    }

    fn set_attribute(&self, el: &Self::Node, name: &str, value: &str) {
        let _ = as_element(el).set_attribute(name, value);
    }

    fn remove_attribute(&self, el: &Self::Node, name: &str) {
        let _ = as_element(el).remove_attribute(name);
    }

    fn set_property_string(&self, el: &Self::Node, name: &str, value: &str) {
        let _ = js_sys::Reflect::set(el, &wasm_bindgen::JsValue::from_str(name), &wasm_bindgen::JsValue::from_str(value));
    }

    fn set_property_bool(&self, el: &Self::Node, name: &str, value: bool) {
        let _ = js_sys::Reflect::set(el, &wasm_bindgen::JsValue::from_str(name), &wasm_bindgen::JsValue::from_bool(value));
    }

    fn set_inner_html(&self, el: &Self::Node, html: &str) {
        as_element(el).set_inner_html(html);
    }

    fn set_css_text(&self, el: &Self::Node, text: &str) {
        match inline_style(el) {
            Some(style) => style.set_css_text(text),
            None => {
                let _ = as_element(el).set_attribute("style", text);
            }
        }
    }

    fn set_style_property(&self, el: &Self::Node, name: &str, value: &str) {
        if let Some(style) = inline_style(el) {
            let _ = style.set_property(name, value);
        }
    }

    fn set_custom_style_property(&self, el: &Self::Node, name: &str, value: &str) {
        // Custom properties (a leading `-`, `is_custom_property`) go through
        // the same `CSSStyleDeclaration::set_property` as any other name —
        // there is no separate web-sys API for them.
        debug_assert!(is_custom_property(name));
        self.set_style_property(el, name, value);
    }

    fn remove_style_property(&self, el: &Self::Node, name: &str) {
        if let Some(style) = inline_style(el) {
            let _ = style.remove_property(name);
        }
    }

    fn set_listener(&self, el: &Self::Node, event_name: &'static str, handler: Option<Rc<dyn Fn(&Self::RawEvent)>>) {
        self.events.set_listener(as_element(el), event_name, handler);
    }
}
