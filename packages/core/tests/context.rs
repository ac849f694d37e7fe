//! Context: a consumer without a Provider sees the default value,
//! a Provider overrides it for its descendants, a nested Provider of the
//! same context shadows the outer one, and a later value change on the
//! Provider is observed by its consumer after the update propagates.

use std::cell::RefCell;
use std::rc::Rc;

use willow_core::testing::RecordingDocument;
use willow_core::{create_context, create_provider, use_context, use_state, Context, Options, Root, SetStateAction, VNode};

type Doc = RecordingDocument;

fn new_root() -> (Rc<Root<Doc>>, Doc, willow_core::testing::TestNode) {
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

#[derive(Clone)]
struct ConsumerProps {
    ctx: Rc<Context<i32>>,
    seen: Rc<RefCell<Vec<i32>>>,
}

fn consumer(props: ConsumerProps) -> Option<VNode<Doc>> {
    let value = use_context::<Doc, i32>(&props.ctx);
    props.seen.borrow_mut().push(value);
    Some(VNode::text(format!("{value}")))
}

#[test]
fn consumer_without_a_provider_sees_the_default_value() {
    let (root, doc, container) = new_root();
    let ctx = Rc::new(create_context(7));
    let seen = Rc::new(RefCell::new(Vec::new()));

    root.render(VNode::component(consumer, ConsumerProps { ctx, seen: seen.clone() }, "consumer", None));

    assert_eq!(*seen.borrow(), vec![7]);
    assert_eq!(doc.debug_tree(&container), "\"7\"\n");
}

#[test]
fn provider_overrides_the_default_for_descendants() {
    let (root, doc, container) = new_root();
    let ctx = Rc::new(create_context(0));
    let seen = Rc::new(RefCell::new(Vec::new()));

    let tree = create_provider(
        &ctx,
        42,
        vec![VNode::component(consumer, ConsumerProps { ctx: ctx.clone(), seen: seen.clone() }, "consumer", None)],
        None,
    );
    root.render(tree);

    assert_eq!(*seen.borrow(), vec![42]);
    assert_eq!(doc.debug_tree(&container), "\"42\"\n");
}

#[test]
fn nested_provider_of_the_same_context_shadows_the_outer_one() {
    let (root, _doc, _container) = new_root();
    let ctx = Rc::new(create_context(0));
    let seen = Rc::new(RefCell::new(Vec::new()));

    let inner = create_provider(
        &ctx,
        2,
        vec![VNode::component(consumer, ConsumerProps { ctx: ctx.clone(), seen: seen.clone() }, "consumer", None)],
        None,
    );
    let outer = create_provider(&ctx, 1, vec![inner], None);
    root.render(outer);

    assert_eq!(*seen.borrow(), vec![2], "nearest-provider-wins: the inner provider's value should win");
}

#[derive(Clone)]
struct AppProps {
    ctx: Rc<Context<i32>>,
    seen: Rc<RefCell<Vec<i32>>>,
    set_value_slot: Rc<RefCell<Option<Rc<dyn Fn(SetStateAction<i32>)>>>>,
}

fn app(props: AppProps) -> Option<VNode<Doc>> {
    let (value, set_value) = use_state::<Doc, i32>(|| 0);
    *props.set_value_slot.borrow_mut() = Some(set_value);
    Some(create_provider(
        &props.ctx,
        *value,
        vec![VNode::component(consumer, ConsumerProps { ctx: props.ctx.clone(), seen: props.seen.clone() }, "consumer", None)],
        None,
    ))
}

#[test]
fn consumer_observes_a_later_value_change_on_the_provider() {
    let (root, doc, container) = new_root();
    let ctx = Rc::new(create_context(0));
    let seen = Rc::new(RefCell::new(Vec::new()));
    let set_value_slot = Rc::new(RefCell::new(None));

    root.render(VNode::component(
        app,
        AppProps { ctx, seen: seen.clone(), set_value_slot: set_value_slot.clone() },
        "app",
        None,
    ));
    assert_eq!(*seen.borrow(), vec![0]);
    assert_eq!(doc.debug_tree(&container), "\"0\"\n");

    let set_value = set_value_slot.borrow().clone().expect("app must have run once already");
    set_value(SetStateAction::Value(9));
    doc.run_microtasks();

    assert_eq!(*seen.borrow(), vec![0, 9]);
    assert_eq!(doc.debug_tree(&container), "\"9\"\n");
}
