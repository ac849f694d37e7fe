//! Event delegation: a single proxy closure installed once per
//! (element, event-name) pair, reading the current handler out of a
//! mutable cell on every dispatch. Updating a handler on a later render is
//! a cell mutation only — it never touches `addEventListener` again.

use std::cell::RefCell;
use std::rc::Rc;

use rustc_hash::FxHashMap;
use wasm_bindgen::closure::Closure;
use wasm_bindgen::{JsCast, JsValue};
use web_sys::{Element, Event, Node};

type Handler = Rc<dyn Fn(&Event)>;

/// The mutable cell a proxy closure reads from on every dispatch. Boxed
/// separately from the `Closure` itself so [`EventRegistry::set_listener`]
/// can update it without touching the installed JS function.
struct HandlerCell(RefCell<Option<Handler>>);

/// One element's proxies, keyed by event name, plus the `Closure`s
/// themselves (which must be kept alive for as long as the listener is
/// registered — dropping a `Closure` while JS can still call it is UB, so
/// `willow-web` holds it here rather than `.forget()`-leaking it).
#[derive(Default)]
struct ElementEntry {
    proxies: FxHashMap<&'static str, (Rc<HandlerCell>, Closure<dyn FnMut(Event)>)>,
}

/// Assigns every element a small integer id (stashed as a non-rendered JS
/// expando property, not an HTML attribute) and keys the real registry by
/// that id rather than by the `web_sys::Node` itself, which has no `Hash`.
pub(crate) struct EventRegistry {
    next_id: RefCell<u64>,
    entries: RefCell<FxHashMap<u64, ElementEntry>>,
}

const ID_PROPERTY: &str = "__willowEventId";

impl EventRegistry {
    pub(crate) fn new() -> Self {
        EventRegistry { next_id: RefCell::new(0), entries: RefCell::new(FxHashMap::default()) }
    }

    fn id_of(&self, el: &Element) -> u64 {
        let key = JsValue::from_str(ID_PROPERTY);
        if let Some(existing) = js_sys::Reflect::get(el, &key).ok().and_then(|v| v.as_f64()) {
            return existing as u64;
        }
        let mut next_id = self.next_id.borrow_mut();
        let id = *next_id;
        *next_id += 1;
        let _ = js_sys::Reflect::set(el, &key, &JsValue::from_f64(id as f64));
        id
    }

    /// `willow-core` calls this once per differing listener prop; it never
    /// registers a raw listener itself.
    pub(crate) fn set_listener(&self, el: &Element, event_name: &'static str, handler: Option<Handler>) {
        let id = self.id_of(el);
        let mut entries = self.entries.borrow_mut();
        let entry = entries.entry(id).or_default();

        match (entry.proxies.get(event_name), handler) {
            (Some((cell, _)), Some(handler)) => {
                *cell.0.borrow_mut() = Some(handler);
            }
            (None, Some(handler)) => {
                let cell = Rc::new(HandlerCell(RefCell::new(Some(handler))));
                let proxy_cell = cell.clone();
                let closure = Closure::wrap(Box::new(move |event: Event| {
                    if let Some(handler) = proxy_cell.0.borrow().as_ref() {
                        handler(&event);
                    }
                }) as Box<dyn FnMut(Event)>);
                el.add_event_listener_with_callback(event_name, closure.as_ref().unchecked_ref())
                    .unwrap_or_else(|e| panic!("willow-web: add_event_listener({event_name}) failed: {e:?}"));
                entry.proxies.insert(event_name, (cell, closure));
            }
            (Some(_), None) => {
                if let Some((_, closure)) = entry.proxies.remove(event_name) {
                    let _ = el.remove_event_listener_with_callback(event_name, closure.as_ref().unchecked_ref());
                }
            }
            (None, None) => {}
        }

        if entry.proxies.is_empty() {
            entries.remove(&id);
        }
    }

    /// Called from [`crate::dom::WebDocument::remove_child`] so a detached
    /// subtree's proxies (and their `Closure`s) don't linger in
    /// `entries` forever — our id-keyed table has no way to notice garbage
    /// collection on its own the way a real `WeakMap` would.
    pub(crate) fn forget(&self, node: &Node) {
        let Some(el) = node.dyn_ref::<Element>() else { return };
        let key = JsValue::from_str(ID_PROPERTY);
        if let Some(id) = js_sys::Reflect::get(el, &key).ok().and_then(|v| v.as_f64()) {
            self.entries.borrow_mut().remove(&(id as u64));
        }
        // Descendants removed as part of a bulk parent teardown never reach
        // here individually, so their entries leak for the lifetime of the
        // `Document` — see DESIGN.md.
    }
}
