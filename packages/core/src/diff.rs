//! The diff engine and the unmount routine: dispatches by [`NodeKind`] and
//! mutates the live DOM directly and synchronously rather than recording a
//! patch list for later replay.

use std::cell::RefCell;
use std::rc::{Rc, Weak};

use crate::commit::RefAction;
use crate::context;
use crate::document::{Document, SVG_NAMESPACE};
use crate::options::Options;
use crate::props::diff_props;
use crate::reconcile::reconcile_children;
use crate::scheduler::Scheduler;
use crate::scope::ComponentInstance;
use crate::vnode::{NodeKind, Props, RefValue, VNode};

/// Everything one top-level render entry threads through every recursive
/// `diff` call: the host document, the option hooks, the
/// scheduler a freshly mounted component registers with, and the two queues
/// the commit pipeline drains afterward.
pub(crate) struct DiffCtx<'a, D: Document> {
    pub(crate) doc: &'a D,
    pub(crate) options: &'a Options<D>,
    pub(crate) scheduler: &'a Rc<Scheduler<D>>,
    pub(crate) commit_queue: &'a mut Vec<Weak<RefCell<ComponentInstance<D>>>>,
    pub(crate) ref_queue: &'a mut Vec<RefAction<D>>,
}

/// `diff(parentDom, newVNode, oldVNode, namespace, oldDom)`. Mutates
/// `new_vnode`'s interior in place; `old_vnode`, once this returns, is a
/// throwaway snapshot except for whatever parts (DOM handle, component
/// instance, Provider state) were transplanted onto `new_vnode` on reuse.
pub(crate) fn diff<D: Document>(
    ctx: &mut DiffCtx<D>,
    parent_dom: &D::Node,
    new_vnode: Option<&VNode<D>>,
    old_vnode: Option<&VNode<D>>,
    svg: bool,
    old_dom: Option<D::Node>,
) {
    let Some(new_vnode) = new_vnode else {
        if let Some(old) = old_vnode {
            unmount(ctx, old, false);
        }
        return;
    };

    // Every `new_vnode` reaching this point was built fresh for this render
    // pass (a component's render body constructs a new tree on each call),
    // so firing here is equivalent to firing at the factory call site itself
    // without threading `Options` through every public `VNode` constructor.
    ctx.options.fire_vnode(new_vnode);
    ctx.options.fire_diff(new_vnode);

    enum Dispatch {
        Text,
        Portal,
        Component,
        Element,
        Fragment,
    }
    let dispatch = match &new_vnode.0.borrow().kind {
        NodeKind::Text(_) => Dispatch::Text,
        NodeKind::Portal { .. } => Dispatch::Portal,
        NodeKind::Component { .. } => Dispatch::Component,
        NodeKind::Element { .. } => Dispatch::Element,
        NodeKind::Fragment => Dispatch::Fragment,
    };

    match dispatch {
        Dispatch::Text => diff_text(ctx, parent_dom, new_vnode, old_vnode, old_dom),
        Dispatch::Portal => diff_portal(ctx, new_vnode, old_vnode),
        Dispatch::Component => diff_component(ctx, parent_dom, new_vnode, old_vnode, svg, old_dom),
        Dispatch::Element => diff_element(ctx, parent_dom, new_vnode, old_vnode, svg, old_dom),
        Dispatch::Fragment => diff_fragment(ctx, parent_dom, new_vnode, old_vnode, svg, old_dom),
    }

    ctx.options.fire_diffed(new_vnode);
}

fn diff_text<D: Document>(
    ctx: &mut DiffCtx<D>,
    parent_dom: &D::Node,
    new_vnode: &VNode<D>,
    old_vnode: Option<&VNode<D>>,
    old_dom: Option<D::Node>,
) {
    let new_text = match &new_vnode.0.borrow().kind {
        NodeKind::Text(s) => s.clone(),
        _ => unreachable!(),
    };

    let reusable = old_vnode.filter(|old| old.same_type(new_vnode)).and_then(|old| old.dom());

    match reusable {
        Some(dom) => {
            let old_text = match &old_vnode.unwrap().0.borrow().kind {
                NodeKind::Text(s) => s.clone(),
                _ => unreachable!(),
            };
            if old_text != new_text {
                ctx.doc.set_text(&dom, &new_text);
            }
            new_vnode.set_dom(Some(dom));
        }
        None => {
            let dom = ctx.doc.create_text_node(&new_text);
            ctx.doc.insert_before(parent_dom, &dom, old_dom.as_ref());
            if let Some(old) = old_vnode {
                unmount(ctx, old, false);
            }
            new_vnode.set_dom(Some(dom));
        }
    }
}

fn diff_element<D: Document>(
    ctx: &mut DiffCtx<D>,
    parent_dom: &D::Node,
    new_vnode: &VNode<D>,
    old_vnode: Option<&VNode<D>>,
    svg: bool,
    old_dom: Option<D::Node>,
) {
    let tag = match &new_vnode.0.borrow().kind {
        NodeKind::Element { tag, .. } => tag.clone(),
        _ => unreachable!(),
    };
    let svg = svg || tag.as_ref() == "svg";

    let reused = old_vnode.filter(|old| old.same_type(new_vnode)).and_then(|old| old.dom());

    let dom = match reused {
        Some(dom) => dom,
        None => {
            let namespace = svg.then_some(SVG_NAMESPACE);
            let dom = ctx.doc.create_element(&tag, namespace);
            ctx.doc.insert_before(parent_dom, &dom, old_dom.as_ref());
            if let Some(old) = old_vnode {
                unmount(ctx, old, false);
            }
            dom
        }
    };
    new_vnode.set_dom(Some(dom.clone()));

    let new_props = match &new_vnode.0.borrow().kind {
        NodeKind::Element { props, .. } => props.clone(),
        _ => unreachable!(),
    };
    let old_props: Props<D> = match old_vnode.filter(|old| old.same_type(new_vnode)) {
        Some(old) => match &old.0.borrow().kind {
            NodeKind::Element { props, .. } => props.clone(),
            _ => Props::new(),
        },
        None => Props::new(),
    };
    diff_props(ctx.doc, &dom, &new_props, &old_props, svg);

    let old_children = old_vnode.map(|o| o.children()).unwrap_or_default();
    let child_reference = ctx.doc.first_child(&dom);
    reconcile_children(ctx, &dom, new_vnode.children(), new_vnode, &old_children, svg, child_reference);

    queue_ref(ctx, new_vnode, old_vnode, Some(RefValue::Node(dom)));
}

fn diff_fragment<D: Document>(
    ctx: &mut DiffCtx<D>,
    parent_dom: &D::Node,
    new_vnode: &VNode<D>,
    old_vnode: Option<&VNode<D>>,
    svg: bool,
    old_dom: Option<D::Node>,
) {
    let old_children = old_vnode.map(|o| o.children()).unwrap_or_default();
    reconcile_children(ctx, parent_dom, new_vnode.children(), new_vnode, &old_children, svg, old_dom);
}

fn diff_portal<D: Document>(ctx: &mut DiffCtx<D>, new_vnode: &VNode<D>, old_vnode: Option<&VNode<D>>) {
    let container = match &new_vnode.0.borrow().kind {
        NodeKind::Portal { container } => container.clone(),
        _ => unreachable!(),
    };

    let old_children = match old_vnode {
        Some(old) if old.same_type(new_vnode) => {
            let same_container = match &old.0.borrow().kind {
                NodeKind::Portal { container: old_container } => old_container == &container,
                _ => false,
            };
            if same_container {
                old.children()
            } else {
                // Target container changed: the old children are mounted
                // somewhere else entirely and must be torn down there before
                // the new ones mount into the new container.
                for child in old.children() {
                    unmount(ctx, &child, false);
                }
                Vec::new()
            }
        }
        Some(old) => {
            unmount(ctx, old, false);
            Vec::new()
        }
        None => Vec::new(),
    };

    let namespace = ctx.doc.namespace_uri(&container).as_deref() == Some(SVG_NAMESPACE);
    reconcile_children(ctx, &container, new_vnode.children(), new_vnode, &old_children, namespace, None);

    queue_ref(ctx, new_vnode, old_vnode, Some(RefValue::Node(container)));
}

fn diff_component<D: Document>(
    ctx: &mut DiffCtx<D>,
    parent_dom: &D::Node,
    new_vnode: &VNode<D>,
    old_vnode: Option<&VNode<D>>,
    svg: bool,
    old_dom: Option<D::Node>,
) {
    ctx.options.fire_render(new_vnode);

    let reused = old_vnode.filter(|old| old.same_type(new_vnode));
    if let Some(old) = old_vnode {
        if reused.is_none() {
            unmount(ctx, old, false);
        }
    }

    let instance = match reused.and_then(|old| old.component_instance()) {
        Some(instance) => {
            ctx.scheduler.dequeue_render(&instance);
            instance
        }
        None => Rc::new(RefCell::new(ComponentInstance::new(new_vnode, ctx.scheduler))),
    };
    new_vnode.set_component(Some(instance.clone()));

    // Context providers: reuse the old
    // Provider state (and its subscriber list) across renders, swapping in
    // just the new value, rather than letting every render's fresh
    // `create_provider` call start a subscriber-less state.
    let mut provider_value_changed = false;
    if let Some(new_provider) = new_vnode.provider() {
        match reused.and_then(|old| old.provider()) {
            Some(old_provider) => {
                let new_value = new_provider.value.borrow().clone();
                let changed = {
                    let old_value = old_provider.value.borrow();
                    !(old_provider.eq)(&**old_value, &*new_value)
                };
                *old_provider.value.borrow_mut() = new_value;
                new_vnode.set_provider(Some(old_provider));
                provider_value_changed = changed;
            }
            None => provider_value_changed = true,
        }
    }

    let render_output = {
        let vnode_borrow = new_vnode.0.borrow();
        match &vnode_borrow.kind {
            NodeKind::Component { props, .. } => {
                let props = props.borrow();
                crate::scope::with_current_component(&instance, || {
                    instance.borrow_mut().begin_render();
                    props.render()
                })
            }
            _ => unreachable!(),
        }
    };

    let new_children = match render_output {
        Some(v) => vec![v],
        None => Vec::new(),
    };

    let has_pending = {
        let inst = instance.borrow();
        !inst.pending_effects.is_empty() || !inst.pending_layout_effects.is_empty()
    };
    if has_pending {
        ctx.commit_queue.push(Rc::downgrade(&instance));
    }

    let old_children = old_vnode.map(|o| o.children()).unwrap_or_default();
    reconcile_children(ctx, parent_dom, new_children, new_vnode, &old_children, svg, old_dom);

    if provider_value_changed {
        if let Some(provider) = new_vnode.provider() {
            context::notify_subscribers(&provider, ctx.scheduler);
        }
    }

    queue_ref(ctx, new_vnode, old_vnode, Some(RefValue::Component(instance)));
}

/// Queues a ref transition iff either side actually carries a ref — a
/// `previous`/`next` pair; commit decides whether it's a no-op.
fn queue_ref<D: Document>(
    ctx: &mut DiffCtx<D>,
    new_vnode: &VNode<D>,
    old_vnode: Option<&VNode<D>>,
    value: Option<RefValue<D>>,
) {
    let next = new_vnode.vref();
    let previous = old_vnode.and_then(|o| o.vref());
    if next.is_some() || previous.is_some() {
        ctx.ref_queue.push(RefAction { previous, next, value });
    }
}

/// Tears down `vnode` and its descendants. `skip_remove`
/// is true for a structural parent's children when the parent's own DOM
/// node is about to be discarded wholesale (no point removing each child
/// individually first) — except for a Portal's children, which live in a
/// container outside that parent's DOM and must always be removed
/// individually.
pub(crate) fn unmount<D: Document>(ctx: &mut DiffCtx<D>, vnode: &VNode<D>, skip_remove: bool) {
    ctx.options.fire_unmount(vnode);

    if let Some(vref) = vnode.vref() {
        ctx.ref_queue.push(RefAction { previous: Some(vref), next: None, value: None });
    }

    let is_portal = matches!(vnode.0.borrow().kind, NodeKind::Portal { .. });
    if let Some(instance) = vnode.component_instance() {
        instance.borrow().run_unmount_cleanups();
        context::cleanup_subscriptions(&instance);
    }

    // Top-down: a child's own unmount never needs to worry about an
    // already-torn-down ancestor cycling back to it.
    let children_skip_remove = skip_remove && !is_portal;
    for child in vnode.children() {
        unmount(ctx, &child, children_skip_remove);
    }

    if !skip_remove || is_portal {
        if let Some(dom) = vnode.dom() {
            if let Some(parent) = ctx.doc.parent_node(&dom) {
                ctx.doc.remove_child(&parent, &dom);
            }
        }
    }

    vnode.set_dom(None);
    vnode.set_component(None);
}

#[cfg(test)]
mod tests {
    use std::cell::RefCell;
    use std::rc::Rc;

    use crate::context::{create_context, create_provider};
    use crate::hooks::use_context;
    use crate::options::Options;
    use crate::render::Root;
    use crate::testing::RecordingDocument;
    use crate::vnode::VNode;

    type Doc = RecordingDocument;

    #[derive(Clone)]
    struct ConsumerProps {
        ctx: Rc<crate::context::Context<i32>>,
    }

    fn consumer(props: ConsumerProps) -> Option<VNode<Doc>> {
        let _ = use_context::<Doc, i32>(&props.ctx);
        Some(VNode::element("span").build())
    }

    // Regression test: `create_provider` used to build a brand new
    // `ProviderState` with an empty subscriber list on every render, so a
    // previously subscribed consumer stopped being notified the moment its
    // Provider ancestor re-rendered with a changed value. `diff_component`
    // must transplant the old `ProviderState` (and its subscriber list)
    // onto the new vnode instead of letting the fresh one from
    // `create_provider` replace it.
    #[test]
    fn provider_reuse_preserves_subscribers_across_a_rerender() {
        let doc = RecordingDocument::new();
        let container = doc.new_container();
        let root = Root::new(
            doc.clone(),
            container,
            Options::new(),
            Box::new(doc.clone()),
            Box::new(doc.clone()),
        );

        let ctx = Rc::new(create_context(0));
        let first = create_provider(
            &ctx,
            1,
            vec![VNode::component(consumer, ConsumerProps { ctx: ctx.clone() }, "consumer", None)],
            None,
        );
        // `diff` mutates `first` in place (it becomes the committed root), so
        // this same handle keeps reflecting whatever `ProviderState` is live
        // after each render.
        root.render(first.clone());
        let provider = first.provider().expect("root should be the Provider vnode");
        assert_eq!(provider.subscribers.borrow().len(), 1, "useContext must have subscribed the consumer");

        root.render(create_provider(
            &ctx,
            2,
            vec![VNode::component(consumer, ConsumerProps { ctx: ctx.clone() }, "consumer", None)],
            None,
        ));
        let provider = first.provider().expect("root should still be the Provider vnode");
        assert_eq!(
            provider.subscribers.borrow().len(),
            1,
            "the subscriber list must survive the Provider's own re-render, not reset to empty"
        );
    }

    #[test]
    fn unrelated_context_does_not_notify_on_provider_value_change() {
        let doc = RecordingDocument::new();
        let container = doc.new_container();
        let root = Root::new(
            doc.clone(),
            container,
            Options::new(),
            Box::new(doc.clone()),
            Box::new(doc.clone()),
        );

        let ctx = Rc::new(create_context(0));
        let renders = Rc::new(RefCell::new(0));
        let renders_1 = renders.clone();
        let ctx_1 = ctx.clone();

        #[derive(Clone)]
        struct CountingProps {
            ctx: Rc<crate::context::Context<i32>>,
            renders: Rc<RefCell<u32>>,
        }
        fn counting_consumer(props: CountingProps) -> Option<VNode<Doc>> {
            *props.renders.borrow_mut() += 1;
            let _ = use_context::<Doc, i32>(&props.ctx);
            Some(VNode::element("span").build())
        }

        root.render(create_provider(
            &ctx_1,
            1,
            vec![VNode::component(counting_consumer, CountingProps { ctx: ctx_1.clone(), renders: renders_1 }, "counting_consumer", None)],
            None,
        ));
        assert_eq!(*renders.borrow(), 1);

        root.render(create_provider(
            &ctx,
            1,
            vec![VNode::component(counting_consumer, CountingProps { ctx: ctx.clone(), renders: renders.clone() }, "counting_consumer", None)],
            None,
        ));
        doc.run_microtasks();
        assert_eq!(*renders.borrow(), 2, "unchanged value should not schedule an extra async re-render beyond the structural one");
    }
}
