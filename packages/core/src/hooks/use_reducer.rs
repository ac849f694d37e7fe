use std::cell::RefCell;
use std::rc::Rc;

use crate::document::Document;
use crate::scope::{current_component, ComponentInstance};
use crate::util::same_value;

/// `useReducer`. The dispatcher's identity is stable across renders;
/// the reducer closure itself is refreshed every render so a dispatch queued
/// from a stale render still runs against the latest reducer body.
pub fn use_reducer<D, S, A, I>(
    reducer: impl Fn(&S, A) -> S + 'static,
    init_arg: I,
    init: impl FnOnce(I) -> S,
) -> (Rc<S>, Rc<dyn Fn(A)>)
where
    D: Document,
    S: PartialEq + Clone + 'static,
    A: 'static,
    I: 'static,
{
    let instance = current_component::<D>();
    let slot: Rc<RefCell<S>> = instance.borrow_mut().use_hook_cell(|| init(init_arg));

    // The slot starts holding a placeholder that is unconditionally replaced
    // below on every call (including the first), so it is never actually
    // invoked — it only exists to give the hook slot a concrete value to be
    // born with.
    let reducer_cell: Rc<RefCell<Rc<dyn Fn(&S, A) -> S>>> = instance.borrow_mut().use_hook_cell(|| {
        Rc::new(|_: &S, _: A| -> S { unreachable!("willow: reducer slot read before first assignment") }) as Rc<dyn Fn(&S, A) -> S>
    });
    *reducer_cell.borrow_mut() = Rc::new(reducer);

    let dispatcher: Rc<Rc<dyn Fn(A)>> = {
        let slot = slot.clone();
        let reducer_cell = reducer_cell.clone();
        let weak_instance = Rc::downgrade(&instance);
        instance.borrow_mut().use_hook(move || {
            let dispatch: Rc<dyn Fn(A)> = Rc::new(move |action: A| {
                let Some(instance) = weak_instance.upgrade() else { return };
                let current_reducer = reducer_cell.borrow().clone();
                let next = current_reducer(&slot.borrow(), action);
                let unchanged = same_value(&next, &*slot.borrow());
                if unchanged {
                    return;
                }
                *slot.borrow_mut() = next;
                ComponentInstance::enqueue_self(&instance);
            });
            dispatch
        })
    };

    let value = Rc::new(slot.borrow().clone());
    (value, (*dispatcher).clone())
}
