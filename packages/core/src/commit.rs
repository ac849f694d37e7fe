//! The commit pipeline: runs after a top-level diff returns — refs, then
//! layout effects, then a scheduled pass of post-paint effects.

use std::cell::RefCell;
use std::rc::{Rc, Weak};

use crate::document::Document;
use crate::options::Options;
use crate::scope::ComponentInstance;
use crate::vnode::{RefTarget, RefValue, VNode};

/// One ref transition recorded during diff, applied during commit (
/// step 1). `value` is the live target (`None` on unmount or ref removal).
pub(crate) struct RefAction<D: Document> {
    pub(crate) previous: Option<RefTarget<D>>,
    pub(crate) next: Option<RefTarget<D>>,
    pub(crate) value: Option<RefValue<D>>,
}

fn apply_ref<D: Document>(target: &RefTarget<D>, value: Option<RefValue<D>>) {
    match target {
        RefTarget::Slot(slot) => *slot.borrow_mut() = value,
        RefTarget::Callback(f) => f(value),
    }
}

/// A host-provided "run this after the next paint" primitive.
/// `willow-web` backs it with `requestAnimationFrame` plus
/// a ~35ms fallback timer for non-visible tabs; a test double can run it
/// immediately or defer it to a manual pump.
pub trait PostPaintScheduler: 'static {
    fn schedule(&self, task: Box<dyn FnOnce()>);
}

/// Runs the full commit pipeline for one top-level diff.
pub(crate) fn run_commit<D: Document>(
    _root: &VNode<D>,
    options: &Options<D>,
    ref_queue: Vec<RefAction<D>>,
    commit_queue: Vec<Weak<RefCell<ComponentInstance<D>>>>,
    post_paint: &dyn PostPaintScheduler,
) {
    // 1. Refs.
    for action in ref_queue {
        if let (Some(prev), Some(next)) = (&action.previous, &action.next) {
            let same = match (prev, next) {
                (RefTarget::Slot(a), RefTarget::Slot(b)) => Rc::ptr_eq(a, b),
                (RefTarget::Callback(a), RefTarget::Callback(b)) => Rc::ptr_eq(a, b),
                _ => false,
            };
            if same {
                apply_ref(next, action.value);
                continue;
            }
        }
        if let Some(prev) = &action.previous {
            apply_ref(prev, None);
        }
        if let Some(next) = &action.next {
            apply_ref(next, action.value);
        }
    }

    // 2. Layout effects, in commit-queue order (post-order over the subtree:
    // a parent is appended after its descendants during diff).
    for weak in &commit_queue {
        if let Some(instance) = weak.upgrade() {
            if !instance.borrow().is_alive() {
                continue;
            }
            let pending = std::mem::take(&mut instance.borrow_mut().pending_layout_effects);
            for effect in pending {
                effect.flush();
            }
        }
    }

    options.fire_commit(_root, &commit_queue);

    // 3. Post-paint effects: deferred to the host's frame primitive.
    let commit_queue_for_paint = commit_queue;
    post_paint.schedule(Box::new(move || {
        for weak in &commit_queue_for_paint {
            if let Some(instance) = weak.upgrade() {
                if !instance.borrow().is_alive() {
                    continue;
                }
                let pending = std::mem::take(&mut instance.borrow_mut().pending_effects);
                for effect in pending {
                    effect.flush();
                }
            }
        }
    }));
}
