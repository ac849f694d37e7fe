//! Browser-executed tests for the `web-sys` renderer. Run with
//! `wasm-pack test --headless --chrome` (or `--firefox`) from
//! `packages/web`; these never run under plain `cargo test` since they
//! need a real `window`/`document`.

#![cfg(target_arch = "wasm32")]

use std::cell::Cell;
use std::rc::Rc;

use wasm_bindgen_test::wasm_bindgen_test;
use willow_core::VNode;
use willow_web::{render_to, WebConfig};

wasm_bindgen_test::wasm_bindgen_test_configure!(run_in_browser);

fn fresh_container() -> web_sys::Element {
    let document = web_sys::window().unwrap().document().unwrap();
    let el = document.create_element("div").unwrap();
    document.body().unwrap().append_child(&el).unwrap();
    el
}

#[wasm_bindgen_test]
fn mounts_a_tree_into_the_container() {
    let container = fresh_container();
    let vnode = VNode::<willow_web::WebDocument>::element("h1").child(VNode::text("hello")).build();

    let _root = render_to(container.clone(), vnode, WebConfig::new());

    assert_eq!(container.inner_html(), "<h1>hello</h1>");
}

#[wasm_bindgen_test]
fn dispatched_click_runs_the_current_handler() {
    type Doc = willow_web::WebDocument;

    let clicks: Rc<Cell<u32>> = Rc::new(Cell::new(0));

    fn app(props: Rc<Cell<u32>>) -> Option<VNode<Doc>> {
        let counter = props.clone();
        Some(
            VNode::<Doc>::element("button")
                .on("click", move |_| counter.set(counter.get() + 1))
                .child(VNode::text("click me"))
                .build(),
        )
    }

    let container = fresh_container();
    let vnode = VNode::<Doc>::component(app, clicks.clone(), "App", None);
    let _root = render_to(container.clone(), vnode, WebConfig::new());

    let button = container.query_selector("button").unwrap().unwrap();
    let event = web_sys::MouseEvent::new("click").unwrap();
    button.dispatch_event(&event).unwrap();

    assert_eq!(clicks.get(), 1);
}

#[wasm_bindgen_test]
fn style_props_apply_to_svg_elements() {
    type Doc = willow_web::WebDocument;

    let container = fresh_container();
    let vnode = VNode::<Doc>::element("svg")
        .child(
            VNode::<Doc>::element("circle")
                .style_map(vec![("fill".into(), willow_core::StyleDecl::Text("blue".into()))])
                .build(),
        )
        .build();
    let _root = render_to(container.clone(), vnode, WebConfig::new());

    let circle = container.query_selector("circle").unwrap().unwrap();
    let style = circle.get_attribute("style").unwrap_or_default();
    assert!(style.contains("fill"), "expected an inline style on the SVG element, got {style:?}");
}

#[wasm_bindgen_test]
fn removing_a_child_does_not_touch_its_siblings() {
    type Doc = willow_web::WebDocument;

    let show_second = Rc::new(Cell::new(true));

    fn app(flag: Rc<Cell<bool>>) -> Option<VNode<Doc>> {
        let mut builder = VNode::<Doc>::element("ul").child(VNode::<Doc>::element("li").child(VNode::text("one")).build());
        if flag.get() {
            builder = builder.child(VNode::<Doc>::element("li").child(VNode::text("two")).build());
        }
        Some(builder.build())
    }

    let container = fresh_container();
    let root = render_to(
        container.clone(),
        VNode::<Doc>::component(app, show_second.clone(), "App", None),
        WebConfig::new(),
    );

    assert_eq!(container.query_selector_all("li").unwrap().length(), 2);

    show_second.set(false);
    root.render(VNode::<Doc>::component(app, show_second.clone(), "App", None));

    let remaining = container.query_selector_all("li").unwrap();
    assert_eq!(remaining.length(), 1);
}
