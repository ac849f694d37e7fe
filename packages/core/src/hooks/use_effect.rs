use std::cell::RefCell;
use std::rc::Rc;

use crate::document::Document;
use crate::scope::{current_component, PendingEffect};

type Cleanup = Box<dyn FnOnce()>;
type Effect = Box<dyn FnOnce() -> Option<Cleanup>>;

struct EffectState<Deps> {
    deps: Option<Deps>,
    cleanup: Option<Cleanup>,
    pending: Option<Effect>,
}

impl<Deps: 'static> PendingEffect for RefCell<EffectState<Deps>> {
    /// Runs the prior cleanup (if any) then the staged callback, storing
    /// whatever it returns as the next cleanup — the same commit-time
    /// procedure serves both effects and layout effects.
    fn flush(&self) {
        let mut state = self.borrow_mut();
        if let Some(prior) = state.cleanup.take() {
            prior();
        }
        if let Some(pending) = state.pending.take() {
            state.cleanup = pending();
        }
    }

    fn as_any(&self) -> &dyn std::any::Any {
        self
    }

    fn unmount_cleanup(&self) {
        if let Some(prior) = self.borrow_mut().cleanup.take() {
            prior();
        }
    }
}

fn use_effect_impl<D, Deps>(
    deps: Option<Deps>,
    effect: impl FnOnce() -> Option<Cleanup> + 'static,
    queue: impl FnOnce(&Rc<RefCell<crate::scope::ComponentInstance<D>>>, Rc<dyn PendingEffect>),
) where
    D: Document,
    Deps: PartialEq + 'static,
{
    let instance = current_component::<D>();
    let cell: Rc<Rc<dyn PendingEffect>> = instance.borrow_mut().use_hook(|| {
        Rc::new(RefCell::new(EffectState::<Deps> { deps: None, cleanup: None, pending: None })) as Rc<dyn PendingEffect>
    });

    // Downcast back to the concrete state to compare/stage deps; the trait
    // object erases the type for `flush`, but this call site still knows
    // `Deps` since it is fixed per `use_effect` call site.
    let concrete = cell
        .as_any()
        .downcast_ref::<RefCell<EffectState<Deps>>>()
        .unwrap_or_else(|| panic!("willow: hook order changed between renders — effect slot type mismatch"));

    let mut state = concrete.borrow_mut();
    let stale = match (&state.deps, &deps) {
        (_, None) => true,
        (None, Some(_)) => true,
        (Some(prev), Some(next)) => prev != next,
    };
    if stale {
        state.pending = Some(Box::new(effect));
        state.deps = deps;
        drop(state);
        queue(&instance, (*cell).clone());
    }
}

/// `useEffect`. Queued for the post-paint commit phase.
pub fn use_effect<D, Deps>(deps: Option<Deps>, effect: impl FnOnce() -> Option<Cleanup> + 'static)
where
    D: Document,
    Deps: PartialEq + 'static,
{
    use_effect_impl::<D, Deps>(deps, effect, |instance, pending| {
        instance.borrow_mut().pending_effects.push(pending);
    });
}

/// `useLayoutEffect`. Queued for the synchronous commit phase,
/// run before the browser paints.
pub fn use_layout_effect<D, Deps>(deps: Option<Deps>, effect: impl FnOnce() -> Option<Cleanup> + 'static)
where
    D: Document,
    Deps: PartialEq + 'static,
{
    use_effect_impl::<D, Deps>(deps, effect, |instance, pending| {
        instance.borrow_mut().pending_layout_effects.push(pending);
    });
}
