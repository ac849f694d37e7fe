//! Prove that a render walks down to individual DOM mutations the same way
//! for a first mount as for a later diff: tree shape, node reuse across a
//! same-type re-render, node replacement on a type change, and
//! attribute/style/listener diffing against a [`RecordingDocument`].

use std::cell::RefCell;
use std::rc::Rc;

use willow_core::testing::{RecordingDocument, TestNode};
use willow_core::{create_ref, Options, RefTarget, RefValue, Root, StyleDecl, VNode};

fn new_root_with_options(options: Options<Doc>) -> (Rc<Root<Doc>>, Doc, TestNode) {
    let doc = RecordingDocument::new();
    let container = doc.new_container();
    let root = Root::new(doc.clone(), container.clone(), options, Box::new(doc.clone()), Box::new(doc.clone()));
    (root, doc, container)
}

type Doc = RecordingDocument;

fn new_root() -> (Rc<Root<Doc>>, Doc, TestNode) {
    let doc = RecordingDocument::new();
    let container = doc.new_container();
    let root = Root::new(
        doc.clone(),
        container.clone(),
        Options::new(),
        Box::new(doc.clone()),
        Box::new(doc.clone()),
    );
    (root, doc, container)
}

fn node_ref() -> Rc<RefCell<Option<RefValue<Doc>>>> {
    create_ref::<Doc>()
}

fn as_node(value: &Option<RefValue<Doc>>) -> TestNode {
    match value {
        Some(RefValue::Node(n)) => n.clone(),
        _ => panic!("expected a Node ref value"),
    }
}

#[test]
fn mounts_nested_elements_and_text() {
    let (root, doc, container) = new_root();

    let tree = VNode::element("div")
        .child(VNode::element("span").child(VNode::text("hello")).build())
        .child(VNode::text("world"))
        .build();

    root.render(tree);

    let dump = doc.debug_tree(&container);
    assert_eq!(dump, "<div>\n  <span>\n    \"hello\"\n  </span>\n  \"world\"\n</div>\n");
}

#[test]
fn reuses_dom_node_across_renders_of_the_same_type() {
    let (root, doc, container) = new_root();
    let pref = node_ref();

    root.render(VNode::element("p").vref(RefTarget::Slot(pref.clone())).child(VNode::text("one")).build());
    let first = as_node(&pref.borrow());

    root.render(VNode::element("p").vref(RefTarget::Slot(pref.clone())).child(VNode::text("two")).build());
    let second = as_node(&pref.borrow());

    assert_eq!(first, second, "same tag across renders should reuse the DOM node");
    assert_eq!(doc.debug_tree(&container), "<p>\n  \"two\"\n</p>\n");
}

#[test]
fn replaces_dom_when_element_type_changes() {
    let (root, doc, container) = new_root();

    root.render(VNode::element("div").build());
    root.render(VNode::element("section").build());

    assert_eq!(doc.debug_tree(&container), "<section>\n</section>\n");
}

#[test]
fn diffs_attributes_styles_and_listeners() {
    let (root, doc, _container) = new_root();
    let bref = node_ref();

    let clicked = Rc::new(RefCell::new(0));
    let clicked_1 = clicked.clone();
    root.render(
        VNode::element("button")
            .vref(RefTarget::Slot(bref.clone()))
            .attr("type", "button")
            .attr_bool("disabled", true)
            .style_map(vec![("color".into(), StyleDecl::Text("red".into()))])
            .on("click", move |_ev| *clicked_1.borrow_mut() += 1)
            .build(),
    );
    let button = as_node(&bref.borrow());
    assert_eq!(doc.attribute(&button, "type").as_deref(), Some("button"));
    assert_eq!(doc.attribute(&button, "disabled").as_deref(), Some(""));
    assert_eq!(doc.style_property(&button, "color").as_deref(), Some("red"));
    doc.dispatch(&button, "click", &Default::default());
    assert_eq!(*clicked.borrow(), 1);

    let clicked_2 = clicked.clone();
    root.render(
        VNode::element("button")
            .vref(RefTarget::Slot(bref.clone()))
            .attr("type", "submit")
            .style_map(vec![("color".into(), StyleDecl::Text("blue".into()))])
            .on("click", move |_ev| *clicked_2.borrow_mut() += 10)
            .build(),
    );

    let button_again = as_node(&bref.borrow());
    assert_eq!(button, button_again, "props diff should not recreate the element");
    assert_eq!(doc.attribute(&button_again, "type").as_deref(), Some("submit"));
    assert_eq!(doc.attribute(&button_again, "disabled"), None, "dropped prop should be cleared");
    assert_eq!(doc.style_property(&button_again, "color").as_deref(), Some("blue"));
    doc.dispatch(&button_again, "click", &Default::default());
    assert_eq!(*clicked.borrow(), 11, "new listener should be installed, old one dropped");
}

#[test]
fn removing_an_attribute_clears_it() {
    let (root, doc, _container) = new_root();
    let iref = node_ref();

    root.render(VNode::element("input").vref(RefTarget::Slot(iref.clone())).attr("placeholder", "name").build());
    let input = as_node(&iref.borrow());
    assert_eq!(doc.attribute(&input, "placeholder").as_deref(), Some("name"));

    root.render(VNode::element("input").vref(RefTarget::Slot(iref.clone())).build());
    assert_eq!(doc.attribute(&input, "placeholder"), None);
}

#[test]
fn dropping_a_style_key_clears_it() {
    let (root, doc, _container) = new_root();
    let dref = node_ref();

    root.render(
        VNode::element("div")
            .vref(RefTarget::Slot(dref.clone()))
            .style_map(vec![
                ("color".into(), StyleDecl::Text("red".into())),
                ("display".into(), StyleDecl::Text("none".into())),
            ])
            .build(),
    );
    let div = as_node(&dref.borrow());
    assert_eq!(doc.style_property(&div, "display").as_deref(), Some("none"));

    root.render(
        VNode::element("div")
            .vref(RefTarget::Slot(dref.clone()))
            .style_map(vec![("color".into(), StyleDecl::Text("red".into()))])
            .build(),
    );
    assert_eq!(doc.style_property(&div, "display"), None, "dropped style key should be cleared");
    assert_eq!(doc.style_property(&div, "color").as_deref(), Some("red"));
}

#[test]
fn unchanged_attributes_are_left_alone_across_a_diff() {
    let (root, doc, _container) = new_root();
    let dref = node_ref();

    root.render(VNode::element("div").vref(RefTarget::Slot(dref.clone())).attr("id", "stable").build());
    root.render(VNode::element("div").vref(RefTarget::Slot(dref.clone())).attr("id", "stable").build());

    let div = as_node(&dref.borrow());
    assert_eq!(doc.attribute(&div, "id").as_deref(), Some("stable"));
}

#[test]
fn the_vnode_hook_fires_once_per_node_built_for_a_render() {
    let seen = Rc::new(RefCell::new(Vec::new()));
    let seen_1 = seen.clone();
    let mut options = Options::new();
    options.vnode = Some(Rc::new(move |v| {
        seen_1.borrow_mut().push(format!("{v:?}"));
    }));
    let (root, _doc, _container) = new_root_with_options(options);

    root.render(VNode::element("div").child(VNode::element("span").build()).child(VNode::text("hi")).build());

    assert_eq!(*seen.borrow(), vec!["Element(<div>)", "Element(<span>)", "Text(\"hi\")"]);
}

#[test]
fn portal_mounts_children_into_a_separate_container() {
    let (root, doc, container) = new_root();
    let portal_target = doc.new_container();

    root.render(VNode::portal(
        portal_target.clone(),
        vec![VNode::element("p").child(VNode::text("over there")).build()],
    ));

    assert_eq!(doc.debug_tree(&container), "");
    assert_eq!(doc.debug_tree(&portal_target), "<p>\n  \"over there\"\n</p>\n");
}

#[test]
fn changing_a_portals_target_tears_down_and_remounts_its_children() {
    let (root, doc, _container) = new_root();
    let first_target = doc.new_container();
    let second_target = doc.new_container();

    root.render(VNode::portal(first_target.clone(), vec![VNode::element("span").build()]));
    assert_eq!(doc.debug_tree(&first_target), "<span>\n</span>\n");

    root.render(VNode::portal(second_target.clone(), vec![VNode::element("span").build()]));
    assert_eq!(doc.debug_tree(&first_target), "", "old container's children must be torn down");
    assert_eq!(doc.debug_tree(&second_target), "<span>\n</span>\n");
}
