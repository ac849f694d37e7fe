//! The registry of optional lifecycle hooks consulted by dev-tools and
//! hot-reload adapters. `Options` is a plain struct owned by the
//! [`crate::render::Root`], not a `static`, so multiple engines in one
//! process (and each test case) get an isolated registry.

use std::rc::Rc;

use crate::document::Document;
use crate::scope::ComponentInstance;
use crate::vnode::VNode;
use std::cell::RefCell;
use std::rc::Weak;

type VNodeHook<D> = Rc<dyn Fn(&VNode<D>)>;
type UnmountHook<D> = Rc<dyn Fn(&VNode<D>)>;
type CommitHook<D> = Rc<dyn Fn(&VNode<D>, &[Weak<RefCell<ComponentInstance<D>>>])>;
type RootHook<D> = Rc<dyn Fn(&VNode<D>, &<D as Document>::Node)>;

/// The complete set of optional lifecycle hooks a host may register.
pub struct Options<D: Document> {
    /// Fires once for every vnode built for a render pass, as it reaches
    /// the diff engine.
    pub vnode: Option<VNodeHook<D>>,
    /// Beginning of each node diff.
    pub diff: Option<VNodeHook<D>>,
    /// Just before a component body is invoked.
    pub render: Option<VNodeHook<D>>,
    /// End of each node diff.
    pub diffed: Option<VNodeHook<D>>,
    /// End of render entry; `q` is the commit queue of components with
    /// pending effects.
    pub commit: Option<CommitHook<D>>,
    /// Just before a vnode is torn down.
    pub unmount: Option<UnmountHook<D>>,
    /// Before each render-entry diff, announcing root + container.
    pub root: Option<RootHook<D>>,
}

impl<D: Document> Default for Options<D> {
    fn default() -> Self {
        Self {
            vnode: None,
            diff: None,
            render: None,
            diffed: None,
            commit: None,
            unmount: None,
            root: None,
        }
    }
}

impl<D: Document> Options<D> {
    pub fn new() -> Self {
        Self::default()
    }

    pub(crate) fn fire_vnode(&self, v: &VNode<D>) {
        if let Some(f) = &self.vnode {
            f(v);
        }
    }

    pub(crate) fn fire_diff(&self, v: &VNode<D>) {
        if let Some(f) = &self.diff {
            f(v);
        }
    }

    pub(crate) fn fire_render(&self, v: &VNode<D>) {
        if let Some(f) = &self.render {
            f(v);
        }
    }

    pub(crate) fn fire_diffed(&self, v: &VNode<D>) {
        if let Some(f) = &self.diffed {
            f(v);
        }
    }

    pub(crate) fn fire_unmount(&self, v: &VNode<D>) {
        if let Some(f) = &self.unmount {
            f(v);
        }
    }

    pub(crate) fn fire_commit(&self, root: &VNode<D>, queue: &[Weak<RefCell<ComponentInstance<D>>>]) {
        if let Some(f) = &self.commit {
            f(root, queue);
        }
    }

    pub(crate) fn fire_root(&self, root: &VNode<D>, container: &D::Node) {
        if let Some(f) = &self.root {
            f(root, container);
        }
    }
}
