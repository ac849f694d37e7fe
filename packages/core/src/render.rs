//! The render entry and the scheduler's re-render procedure: a single
//! synchronous [`Document`] mutation pass, never a replayed patch list.

use std::cell::RefCell;
use std::rc::Rc;

use crate::commit::{run_commit, PostPaintScheduler};
use crate::diff::{diff, DiffCtx};
use crate::document::Document;
use crate::options::Options;
use crate::scheduler::{MicrotaskSpawner, Scheduler};
use crate::scope::ComponentInstance;
use crate::vnode::VNode;

/// One mounted tree: owns the host document, the option hooks, the
/// scheduler, the post-paint primitive, and the previously committed root
/// (wrapped in a synthetic fragment so the very first render and every
/// later one go through the same child-reconciliation path).
pub struct Root<D: Document> {
    doc: D,
    options: Options<D>,
    scheduler: Rc<Scheduler<D>>,
    post_paint: Box<dyn PostPaintScheduler>,
    container: D::Node,
    root_vnode: RefCell<Option<VNode<D>>>,
}

impl<D: Document> Root<D> {
    pub fn new(
        doc: D,
        container: D::Node,
        options: Options<D>,
        spawner: Box<dyn MicrotaskSpawner>,
        post_paint: Box<dyn PostPaintScheduler>,
    ) -> Rc<Self> {
        let scheduler = Scheduler::new(spawner);
        let root = Rc::new(Root {
            doc,
            options,
            scheduler: scheduler.clone(),
            post_paint,
            container,
            root_vnode: RefCell::new(None),
        });
        let weak_root = Rc::downgrade(&root);
        scheduler.set_drain_handler(Rc::new(move |instance: &Rc<RefCell<ComponentInstance<D>>>| {
            if let Some(root) = weak_root.upgrade() {
                root.rerender_component(instance);
            }
        }));
        root
    }

    pub fn options(&self) -> &Options<D> {
        &self.options
    }

    pub fn document(&self) -> &D {
        &self.doc
    }

    /// `render(vnode, container)`: diff `vnode` against whatever this
    /// root previously committed.
    pub fn render(self: &Rc<Self>, vnode: VNode<D>) {
        self.diff_root(vnode);
    }

    /// `hydrate(vnode, container)`. This engine does not parse
    /// server-rendered markup back into a vnode tree, so hydration here is
    /// the same top-down diff as [`Root::render`]: any DOM already in
    /// `container` is treated as unmatched and torn down rather than
    /// adopted.
    pub fn hydrate(self: &Rc<Self>, vnode: VNode<D>) {
        self.diff_root(vnode);
    }

    fn diff_root(self: &Rc<Self>, vnode: VNode<D>) {
        let new_root = VNode::fragment_with(vec![vnode]);
        self.options.fire_root(&new_root, &self.container);

        let mut commit_queue = Vec::new();
        let mut ref_queue = Vec::new();
        let old_dom = self.doc.first_child(&self.container);
        {
            let mut ctx = DiffCtx {
                doc: &self.doc,
                options: &self.options,
                scheduler: &self.scheduler,
                commit_queue: &mut commit_queue,
                ref_queue: &mut ref_queue,
            };
            let old_root = self.root_vnode.borrow().clone();
            diff(&mut ctx, &self.container, Some(&new_root), old_root.as_ref(), false, old_dom);
        }
        *self.root_vnode.borrow_mut() = Some(new_root.clone());
        run_commit(&new_root, &self.options, ref_queue, commit_queue, self.post_paint.as_ref());
    }

    /// `enqueueRender`'s drain target: re-renders a single component
    /// in place. The "old parent" and "new parent" are the same vnode —
    /// its own persisted tree is the baseline the fresh render output diffs
    /// against, rather than a parent handing it a brand new vnode.
    fn rerender_component(self: &Rc<Self>, instance: &Rc<RefCell<ComponentInstance<D>>>) {
        let Some(vnode) = instance.borrow().vnode() else { return };

        let svg = self.is_in_svg_subtree(&vnode);
        let parent_dom = self.dom_parent_of(&vnode);
        // Prefer the vnode's own previous first DOM node — the reconciler's
        // "already in place" check for a child list's first entry compares
        // against this directly, the same way it would if this list were
        // the sole owner of `parent_dom`'s children. Only a component that
        // previously rendered nothing has no such anchor, in which case the
        // nearest real sibling that follows it in the structural tree is
        // the best placement hint available.
        let old_dom = vnode.first_dom().or_else(|| self.first_sibling_after(&vnode));

        let mut commit_queue = Vec::new();
        let mut ref_queue = Vec::new();
        {
            let mut ctx = DiffCtx {
                doc: &self.doc,
                options: &self.options,
                scheduler: &self.scheduler,
                commit_queue: &mut commit_queue,
                ref_queue: &mut ref_queue,
            };
            diff(&mut ctx, &parent_dom, Some(&vnode), Some(&vnode), svg, old_dom);
        }
        run_commit(&vnode, &self.options, ref_queue, commit_queue, self.post_paint.as_ref());
    }

    /// Finds the nearest DOM node this (currently childless) component's
    /// output should be inserted before, by walking up to the structural
    /// parent and scanning its recorded children for the first one after
    /// `vnode` that owns DOM. A best-effort fallback for the case
    /// `vnode.first_dom()` can't answer directly (a component that rendered
    /// nothing last time).
    fn first_sibling_after(&self, vnode: &VNode<D>) -> Option<D::Node> {
        let parent = vnode.parent()?;
        let siblings = parent.children();
        let pos = siblings.iter().position(|s| s.is_same_handle(vnode))?;
        siblings[pos + 1..].iter().find_map(|s| s.first_dom())
    }

    /// Resolves the live DOM parent a component's output mounts into: its
    /// own first DOM descendant's parent if it has rendered one before,
    /// otherwise the nearest ancestor's own DOM node, found by walking up
    /// the vnode tree. A simplified stand-in for per-vnode parent-DOM
    /// bookkeeping, not an exact reproduction of it.
    fn dom_parent_of(&self, vnode: &VNode<D>) -> D::Node {
        if let Some(dom) = vnode.first_dom() {
            if let Some(parent) = self.doc.parent_node(&dom) {
                return parent;
            }
        }
        let mut cursor = vnode.parent();
        while let Some(p) = cursor {
            if let Some(dom) = p.dom() {
                return dom;
            }
            if let Some(dom) = p.first_dom() {
                if let Some(parent) = self.doc.parent_node(&dom) {
                    return parent;
                }
            }
            cursor = p.parent();
        }
        self.container.clone()
    }

    fn is_in_svg_subtree(&self, vnode: &VNode<D>) -> bool {
        let mut cursor = vnode.parent();
        while let Some(p) = cursor {
            if let Some(dom) = p.dom() {
                return self.doc.namespace_uri(&dom).as_deref() == Some(crate::document::SVG_NAMESPACE);
            }
            cursor = p.parent();
        }
        false
    }
}
