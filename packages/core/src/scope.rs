//! The component instance and the "current component" register hooks
//! read from. No bump-arena double-buffering: this engine mutates the
//! live DOM directly instead of building a fresh frame to diff against.

use std::any::Any;
use std::cell::RefCell;
use std::rc::{Rc, Weak};

use crate::context::ProviderState;
use crate::document::Document;
use crate::vnode::VNode;

/// One positional hook slot. Holds whatever concrete `RefCell<T>` the hook
/// that created it needs; downcast on every access.
pub(crate) type HookCell = Rc<dyn Any>;

/// A staged effect or layout-effect, ready for the commit pipeline to
/// run its prior cleanup and then its new callback. Implemented by
/// the effect hooks' internal state so the commit pipeline never needs to
/// know a component's hook types (the `use_effect`/`use_layout_effect`
/// state).
pub trait PendingEffect {
    fn flush(&self);
    fn as_any(&self) -> &dyn Any;
    /// Runs the existing cleanup, if any, without staging a new effect.
    /// Any non-null cleanup thunk left in a component's hook list is run
    /// once more during unmount.
    fn unmount_cleanup(&self);
}

/// The per-instance state every function component gets once diffed for the
/// first time and keeps for as long as its vnode identity survives.
pub struct ComponentInstance<D: Document> {
    pub(crate) vnode: Weak<RefCell<crate::vnode::VNodeData<D>>>,
    pub(crate) hooks: Vec<HookCell>,
    pub(crate) hook_cursor: usize,
    pub(crate) pending_effects: Vec<Rc<dyn PendingEffect>>,
    pub(crate) pending_layout_effects: Vec<Rc<dyn PendingEffect>>,
    pub(crate) context_subscriptions: Vec<Weak<ProviderState<D>>>,
    pub(crate) queued: bool,
    /// The engine this instance belongs to, so a setter closure captured by a
    /// hook and invoked long after render (e.g. from a click handler) can
    /// still reach `enqueueRender` without threading a scheduler
    /// handle through every hook's public signature.
    pub(crate) scheduler: Weak<crate::scheduler::Scheduler<D>>,
}

impl<D: Document> ComponentInstance<D> {
    pub(crate) fn new(vnode: &VNode<D>, scheduler: &Rc<crate::scheduler::Scheduler<D>>) -> Self {
        ComponentInstance {
            vnode: Rc::downgrade(&vnode.0),
            hooks: Vec::new(),
            hook_cursor: 0,
            pending_effects: Vec::new(),
            pending_layout_effects: Vec::new(),
            context_subscriptions: Vec::new(),
            queued: false,
            scheduler: Rc::downgrade(scheduler),
        }
    }

    /// Enqueue `self` for re-render, a no-op if the owning engine has
    /// already been torn down.
    pub(crate) fn enqueue_self(instance: &Rc<RefCell<ComponentInstance<D>>>) {
        if let Some(scheduler) = instance.borrow().scheduler.upgrade() {
            scheduler.enqueue_render(instance);
        }
    }

    /// True once the owning vnode has been unmounted and dropped from the
    /// tree.
    pub fn is_alive(&self) -> bool {
        self.vnode.strong_count() > 0
    }

    pub fn vnode(&self) -> Option<VNode<D>> {
        self.vnode.upgrade().map(VNode)
    }

    pub(crate) fn begin_render(&mut self) {
        self.hook_cursor = 0;
    }

    /// Resolve the hook slot at the current cursor position, creating it on
    /// first appearance. Hooks MUST be called in the same order every
    /// render — a later hook finding the wrong concrete type here is
    /// exactly that contract violation.
    pub fn use_hook<T: 'static>(&mut self, init: impl FnOnce() -> T) -> Rc<T> {
        let idx = self.hook_cursor;
        self.hook_cursor += 1;
        if idx == self.hooks.len() {
            self.hooks.push(Rc::new(init()));
        }
        self.hooks[idx].clone().downcast::<T>().unwrap_or_else(|_| {
            panic!(
                "willow: hook order changed between renders (slot {idx}) — \
                 hooks must be called unconditionally and in the same order every render"
            )
        })
    }

    /// Same as [`Self::use_hook`] but for hooks whose slot is interior
    /// mutable (`RefCell<T>`), which is the common case since most hooks
    /// need to mutate their own stored state from inside a closure that
    /// outlives the render (setters, effect cleanups).
    pub fn use_hook_cell<T: 'static>(&mut self, init: impl FnOnce() -> T) -> Rc<RefCell<T>> {
        self.use_hook(|| RefCell::new(init()))
    }

    /// Runs every hook slot's outstanding cleanup, in slot order, during
    /// unmount. Non-effect hook slots (state, memo, ref, ...) simply
    /// fail the downcast and are skipped — they own no cleanup thunk.
    pub(crate) fn run_unmount_cleanups(&self) {
        for hook in &self.hooks {
            if let Ok(effect) = hook.clone().downcast::<Rc<dyn PendingEffect>>() {
                effect.unmount_cleanup();
            }
        }
    }
}

thread_local! {
    /// The "current component" slot: a single process-wide register, not
    /// a stack — a component body never synchronously triggers another
    /// component's render (child components render later, during the
    /// child reconciliation that happens after this body already returned
    /// and cleared the slot).
    static CURRENT: RefCell<Option<Box<dyn Any>>> = RefCell::new(None);
}

/// Clears the current-component register on every exit path, including an
/// unwinding panic from the component body.
pub(crate) struct CurrentComponentGuard {
    previous: Option<Box<dyn Any>>,
}

impl Drop for CurrentComponentGuard {
    fn drop(&mut self) {
        CURRENT.with(|c| *c.borrow_mut() = self.previous.take());
    }
}

pub(crate) fn with_current_component<D: Document, R>(
    instance: &Rc<RefCell<ComponentInstance<D>>>,
    f: impl FnOnce() -> R,
) -> R {
    let previous = CURRENT.with(|c| c.borrow_mut().replace(Box::new(instance.clone())));
    let _guard = CurrentComponentGuard { previous };
    f()
}

/// Called by hooks. Panics if invoked outside a component body — hooks
/// only make sense synchronously inside a render.
pub fn current_component<D: Document>() -> Rc<RefCell<ComponentInstance<D>>> {
    CURRENT.with(|c| {
        let c = c.borrow();
        c.as_ref()
            .and_then(|boxed| boxed.downcast_ref::<Rc<RefCell<ComponentInstance<D>>>>())
            .cloned()
            .unwrap_or_else(|| {
                panic!(
                    "willow: a hook was called outside of a component render — \
                     hooks may only be called synchronously from within a component body"
                )
            })
    })
}
