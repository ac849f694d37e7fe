//! The re-render queue: enqueue a dirty component, drain the queue on a
//! later turn. A single FIFO-within-depth queue — no priority tiers, no
//! fiber-style interruption, no `is-input-pending` heuristics.

use std::cell::RefCell;
use std::rc::{Rc, Weak};

use crate::context;
use crate::document::Document;
use crate::scope::ComponentInstance;

/// A host-provided "run this on the next microtask turn" primitive (Design
/// Notes). `willow-web` implements it with `wasm_bindgen_futures::spawn_local`;
/// [`crate::testing::RecordingDocument`] implements it by recording the
/// callback for a test to pump manually, so tests observe batching
/// deterministically instead of racing a real event loop.
pub trait MicrotaskSpawner: 'static {
    fn spawn(&self, task: Box<dyn FnOnce()>);
}

type Instance<D> = Rc<RefCell<ComponentInstance<D>>>;

struct SchedulerState<D: Document> {
    queue: Vec<Instance<D>>,
    scheduled: bool,
}

/// Owns the render queue for one engine instance (one [`crate::render::Root`]).
pub struct Scheduler<D: Document> {
    state: RefCell<SchedulerState<D>>,
    spawner: Box<dyn MicrotaskSpawner>,
    /// Set by the render entry / re-render procedure; invoked once per
    /// drained component with that component's instance.
    drain_one: RefCell<Option<Rc<dyn Fn(&Instance<D>)>>>,
}

impl<D: Document> Scheduler<D> {
    pub fn new(spawner: Box<dyn MicrotaskSpawner>) -> Rc<Self> {
        Rc::new(Scheduler {
            state: RefCell::new(SchedulerState { queue: Vec::new(), scheduled: false }),
            spawner,
            drain_one: RefCell::new(None),
        })
    }

    /// The render entry installs the callback that actually re-renders a
    /// single component; the scheduler itself
    /// only owns ordering and batching.
    pub fn set_drain_handler(&self, handler: Rc<dyn Fn(&Instance<D>)>) {
        *self.drain_one.borrow_mut() = Some(handler);
    }

    /// `enqueueRender(c)`: no-op if already queued, else append and
    /// schedule a drain if one is not already pending.
    pub fn enqueue_render(self: &Rc<Self>, instance: &Instance<D>) {
        let already_queued = instance.borrow().queued;
        if already_queued {
            return;
        }
        instance.borrow_mut().queued = true;
        let mut state = self.state.borrow_mut();
        state.queue.push(instance.clone());
        if !state.scheduled {
            state.scheduled = true;
            drop(state);
            let this = self.clone();
            self.spawner.spawn(Box::new(move || this.drain()));
        }
    }

    /// `dequeueRender(c)`: the tree diff already reached `c` through
    /// its parent, so its queued entry is now a no-op.
    pub fn dequeue_render(&self, instance: &Instance<D>) {
        let mut state = self.state.borrow_mut();
        if let Some(pos) = state.queue.iter().position(|i| Rc::ptr_eq(i, instance)) {
            state.queue.remove(pos);
        }
        instance.borrow_mut().queued = false;
    }

    /// Drain: sort by vnode depth ascending (parents first), shift and
    /// render each, skipping any whose vnode has since gone null.
    fn drain(self: &Rc<Self>) {
        let handler = self.drain_one.borrow().clone();
        let Some(handler) = handler else {
            log::error!("willow: scheduler drained with no render handler installed");
            return;
        };
        loop {
            let next = {
                let mut state = self.state.borrow_mut();
                if state.queue.is_empty() {
                    state.scheduled = false;
                    return;
                }
                state
                    .queue
                    .sort_by_key(|i| i.borrow().vnode().map(|v| v.depth()).unwrap_or(u32::MAX));
                state.queue.remove(0)
            };
            next.borrow_mut().queued = false;
            if !next.borrow().is_alive() {
                continue;
            }
            handler(&next);
        }
    }
}

/// Enqueue every subscriber of a provider that changed value, dropping any
/// whose component has since been unmounted.
pub(crate) fn notify_provider<D: Document>(
    provider: &Rc<context::ProviderState<D>>,
    scheduler: &Rc<Scheduler<D>>,
) {
    context::notify_subscribers(provider, scheduler);
}

/// A weak queue entry retained only long enough to be checked for liveness;
/// used by callers that need to hold a scheduled component without keeping
/// it alive past its natural lifetime.
pub(crate) type WeakInstance<D> = Weak<RefCell<ComponentInstance<D>>>;
