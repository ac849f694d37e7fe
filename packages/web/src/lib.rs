#![deny(missing_docs)]

//! `willow-web`: the `web-sys` binding for `willow-core` — a concrete
//! [`WebDocument`] plus the `render`/`hydrate` entry points wired to a
//! browser `Element`. Deliberately thin: every diff is synchronous, so
//! there is no idle-callback work loop to drive, just a direct call into
//! `Root::render`.

mod cfg;
mod dom;
mod events;

pub use cfg::WebConfig;
pub use dom::WebDocument;
/// Re-exported so a host application can reach `willow-core`'s types (hooks,
/// `VNode`, `Options`, ...) without depending on it directly.
pub use willow_core as core;

use std::cell::RefCell;
use std::fmt;
use std::rc::Rc;

use wasm_bindgen::closure::Closure;
use wasm_bindgen::JsCast;

use willow_core::{MicrotaskSpawner, Options, PostPaintScheduler, Root, VNode};

/// Failures that can only be detected at the host boundary — everything
/// past this point is infallible per the `Document` trait's own
/// signatures.
#[derive(Debug)]
pub enum WebError {
    /// `document.getElementById(id)` found nothing, or the element is not
    /// one `willow-core` can mount into.
    ElementNotFound(String),
}

impl fmt::Display for WebError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            WebError::ElementNotFound(id) => write!(f, "willow-web: no element with id {id:?} in the document"),
        }
    }
}

impl std::error::Error for WebError {}

struct Microtasks;

impl MicrotaskSpawner for Microtasks {
    fn spawn(&self, task: Box<dyn FnOnce()>) {
        wasm_bindgen_futures::spawn_local(async move { task() });
    }
}

/// `requestAnimationFrame`, raced against a fallback timer for tabs that
/// never paint. Whichever fires first runs the task; the other is a
/// no-op against the already-emptied slot.
struct PostPaint {
    fallback_ms: u32,
}

impl PostPaintScheduler for PostPaint {
    fn schedule(&self, task: Box<dyn FnOnce()>) {
        let slot: Rc<RefCell<Option<Box<dyn FnOnce()>>>> = Rc::new(RefCell::new(Some(task)));

        let window = web_sys::window().expect("willow-web: no global `window`");

        let raf_slot = slot.clone();
        let raf_closure = Closure::wrap(Box::new(move |_timestamp: f64| {
            if let Some(task) = raf_slot.borrow_mut().take() {
                task();
            }
        }) as Box<dyn FnMut(f64)>);
        let _ = window.request_animation_frame(raf_closure.as_ref().unchecked_ref());
        raf_closure.forget();

        let timeout_slot = slot;
        gloo_timers::callback::Timeout::new(self.fallback_ms, move || {
            if let Some(task) = timeout_slot.borrow_mut().take() {
                task();
            }
        })
        .forget();
    }
}

fn mount_root(el: web_sys::Element, config: &WebConfig) -> Rc<Root<WebDocument>> {
    #[cfg(feature = "panic_hook")]
    if config.panic_hook {
        console_error_panic_hook::set_once();
    }
    #[cfg(not(feature = "panic_hook"))]
    let _ = config.panic_hook;

    #[cfg(feature = "console_log")]
    let _ = console_log::init_with_level(log::Level::Warn);

    let doc = WebDocument::new();
    Root::new(
        doc,
        el.into(),
        Options::new(),
        Box::new(Microtasks),
        Box::new(PostPaint { fallback_ms: config.post_paint_fallback_ms }),
    )
}

fn find_element(root_id: &str) -> Result<web_sys::Element, WebError> {
    web_sys::window()
        .and_then(|w| w.document())
        .and_then(|d| d.get_element_by_id(root_id))
        .ok_or_else(|| WebError::ElementNotFound(root_id.to_string()))
}

/// Mounts `vnode` into the element with id `root_id`, replacing its
/// contents.
pub fn render(root_id: &str, vnode: VNode<WebDocument>, config: WebConfig) -> Result<Rc<Root<WebDocument>>, WebError> {
    let el = find_element(root_id)?;
    let root = mount_root(el, &config);
    root.render(vnode);
    Ok(root)
}

/// Like [`render`], but mounts directly into an already-resolved element —
/// useful when the host application looked the container up some other way
/// (a `querySelector`, a ref from a parent framework, ...).
pub fn render_to(el: web_sys::Element, vnode: VNode<WebDocument>, config: WebConfig) -> Rc<Root<WebDocument>> {
    let root = mount_root(el, &config);
    root.render(vnode);
    root
}

/// This engine does not adopt server-rendered markup, so this differs
/// from [`render`] only in name — any markup already inside `root_id`'s
/// element is torn down and replaced.
pub fn hydrate(root_id: &str, vnode: VNode<WebDocument>, config: WebConfig) -> Result<Rc<Root<WebDocument>>, WebError> {
    let el = find_element(root_id)?;
    let root = mount_root(el, &config);
    root.hydrate(vnode);
    Ok(root)
}
