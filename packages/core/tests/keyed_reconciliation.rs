//! Keyed and unkeyed child reconciliation: matched children keep
//! their DOM identity across reorders, new keys mount fresh nodes, and
//! dropped keys unmount without disturbing their surviving siblings.

use std::cell::RefCell;
use std::rc::Rc;

use willow_core::testing::{RecordingDocument, TestNode};
use willow_core::{create_ref, use_state, Options, RefTarget, RefValue, Root, SetStateAction, VNode};

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

fn keyed_li(key: &'static str, text: &'static str, slot: Rc<RefCell<Option<RefValue<Doc>>>>) -> VNode<Doc> {
    VNode::element("li")
        .key(key)
        .vref(RefTarget::Slot(slot))
        .child(VNode::text(text))
        .build()
}

#[test]
fn reordering_keyed_children_moves_dom_without_recreating_it() {
    let (root, doc, container) = new_root();

    let (a_ref, b_ref, c_ref) = (node_ref(), node_ref(), node_ref());
    root.render(
        VNode::element("ul")
            .child(keyed_li("a", "A", a_ref.clone()))
            .child(keyed_li("b", "B", b_ref.clone()))
            .child(keyed_li("c", "C", c_ref.clone()))
            .build(),
    );
    let (a1, b1, c1) = (as_node(&a_ref.borrow()), as_node(&b_ref.borrow()), as_node(&c_ref.borrow()));
    assert_eq!(doc.debug_tree(&container), "<ul>\n  <li>\n    \"A\"\n  </li>\n  <li>\n    \"B\"\n  </li>\n  <li>\n    \"C\"\n  </li>\n</ul>\n");

    root.render(
        VNode::element("ul")
            .child(keyed_li("c", "C", c_ref.clone()))
            .child(keyed_li("a", "A", a_ref.clone()))
            .child(keyed_li("b", "B", b_ref.clone()))
            .build(),
    );
    let (a2, b2, c2) = (as_node(&a_ref.borrow()), as_node(&b_ref.borrow()), as_node(&c_ref.borrow()));

    assert_eq!(a1, a2, "keyed child should keep its DOM node across a reorder");
    assert_eq!(b1, b2);
    assert_eq!(c1, c2);
    assert_eq!(doc.debug_tree(&container), "<ul>\n  <li>\n    \"C\"\n  </li>\n  <li>\n    \"A\"\n  </li>\n  <li>\n    \"B\"\n  </li>\n</ul>\n");
}

#[test]
fn inserting_a_new_key_mounts_only_that_child() {
    let (root, doc, container) = new_root();

    let (a_ref, b_ref) = (node_ref(), node_ref());
    root.render(
        VNode::element("ul")
            .child(keyed_li("a", "A", a_ref.clone()))
            .child(keyed_li("b", "B", b_ref.clone()))
            .build(),
    );
    let (a1, b1) = (as_node(&a_ref.borrow()), as_node(&b_ref.borrow()));

    let n_ref = node_ref();
    root.render(
        VNode::element("ul")
            .child(keyed_li("a", "A", a_ref.clone()))
            .child(keyed_li("n", "N", n_ref.clone()))
            .child(keyed_li("b", "B", b_ref.clone()))
            .build(),
    );
    let (a2, b2) = (as_node(&a_ref.borrow()), as_node(&b_ref.borrow()));

    assert_eq!(a1, a2);
    assert_eq!(b1, b2);
    assert_eq!(doc.debug_tree(&container), "<ul>\n  <li>\n    \"A\"\n  </li>\n  <li>\n    \"N\"\n  </li>\n  <li>\n    \"B\"\n  </li>\n</ul>\n");
}

#[test]
fn removing_a_key_unmounts_only_that_child() {
    let (root, doc, container) = new_root();

    let (a_ref, b_ref, c_ref) = (node_ref(), node_ref(), node_ref());
    root.render(
        VNode::element("ul")
            .child(keyed_li("a", "A", a_ref.clone()))
            .child(keyed_li("b", "B", b_ref.clone()))
            .child(keyed_li("c", "C", c_ref.clone()))
            .build(),
    );
    let (a1, c1) = (as_node(&a_ref.borrow()), as_node(&c_ref.borrow()));

    root.render(
        VNode::element("ul")
            .child(keyed_li("a", "A", a_ref.clone()))
            .child(keyed_li("c", "C", c_ref.clone()))
            .build(),
    );
    let (a2, c2) = (as_node(&a_ref.borrow()), as_node(&c_ref.borrow()));

    assert_eq!(a1, a2);
    assert_eq!(c1, c2);
    assert_eq!(doc.debug_tree(&container), "<ul>\n  <li>\n    \"A\"\n  </li>\n  <li>\n    \"C\"\n  </li>\n</ul>\n");
}

#[test]
fn unkeyed_children_match_positionally() {
    let (root, doc, container) = new_root();

    root.render(
        VNode::element("ul")
            .child(VNode::element("li").child(VNode::text("one")).build())
            .child(VNode::element("li").child(VNode::text("two")).build())
            .build(),
    );

    root.render(
        VNode::element("ul")
            .child(VNode::element("li").child(VNode::text("one")).build())
            .child(VNode::element("li").child(VNode::text("two")).build())
            .child(VNode::element("li").child(VNode::text("three")).build())
            .build(),
    );

    assert_eq!(
        doc.debug_tree(&container),
        "<ul>\n  <li>\n    \"one\"\n  </li>\n  <li>\n    \"two\"\n  </li>\n  <li>\n    \"three\"\n  </li>\n</ul>\n"
    );
}

#[derive(Clone)]
struct ListProps {
    li_ref: Rc<RefCell<Option<RefValue<Doc>>>>,
    button_ref: Rc<RefCell<Option<RefValue<Doc>>>>,
}

fn list_item(props: ListProps) -> Option<VNode<Doc>> {
    let (count, set_count) = use_state::<Doc, i32>(|| 0);
    Some(
        VNode::element("li")
            .key("only")
            .vref(RefTarget::Slot(props.li_ref))
            .child(VNode::text(format!("{count}")))
            .child(
                VNode::element("button")
                    .vref(RefTarget::Slot(props.button_ref))
                    .on("click", move |_ev| set_count(SetStateAction::Update(Box::new(|c: &i32| c + 1))))
                    .build(),
            )
            .build(),
    )
}

#[test]
fn a_components_self_rerender_does_not_move_its_dom_when_it_shares_a_parent_with_a_sibling() {
    // Regression test: the "is this child already in place" check for a
    // reconciliation's first new child used to compare against
    // `doc.first_child(parent_dom)` instead of the `reference_dom` computed
    // for this call. That's correct only when the child list owns the whole
    // of `parent_dom`'s children — here `<span>` is the div's real first
    // child, so the check always read as "out of place" and moved the `<li>`
    // on every re-render of `ListComp`, even though nothing moved.
    let (root, doc, container) = new_root();
    let (li_ref, button_ref) = (node_ref(), node_ref());

    root.render(
        VNode::element("div")
            .child(VNode::element("span").build())
            .child(VNode::component(
                list_item,
                ListProps { li_ref: li_ref.clone(), button_ref: button_ref.clone() },
                "list_item",
                None,
            ))
            .build(),
    );
    let li_before = as_node(&li_ref.borrow());
    assert_eq!(
        doc.debug_tree(&container),
        "<div>\n  <span>\n  </span>\n  <li>\n    \"0\"\n  </li>\n</div>\n"
    );

    let calls_before = doc.insert_before_call_count();
    let button = as_node(&button_ref.borrow());
    doc.dispatch(&button, "click", &Default::default());
    doc.run_microtasks();

    let li_after = as_node(&li_ref.borrow());
    assert_eq!(li_before, li_after, "the <li> must keep its DOM identity across the component's own re-render");
    assert_eq!(
        doc.insert_before_call_count(),
        calls_before,
        "an unchanged, already-in-place child must not trigger a DOM move"
    );
    assert_eq!(
        doc.debug_tree(&container),
        "<div>\n  <span>\n  </span>\n  <li>\n    \"1\"\n  </li>\n</div>\n"
    );
}
