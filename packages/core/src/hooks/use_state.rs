use std::cell::RefCell;
use std::rc::Rc;

use crate::document::Document;
use crate::scope::{current_component, ComponentInstance};
use crate::util::same_value;

/// The argument to a state setter: either a direct replacement value or an
/// updater consulted with the current value (React's "functional update").
pub enum SetStateAction<T> {
    Value(T),
    Update(Box<dyn FnOnce(&T) -> T>),
}

impl<T> From<T> for SetStateAction<T> {
    fn from(value: T) -> Self {
        SetStateAction::Value(value)
    }
}

/// `useState`. `init` runs only on the slot's first access. Returns
/// the current value and a setter whose `Rc` identity is stable across
/// renders. Calling the setter with a value that is `same_value` to the
/// current one is a no-op and does not enqueue a render.
pub fn use_state<D: Document, T>(init: impl FnOnce() -> T) -> (Rc<T>, Rc<dyn Fn(SetStateAction<T>)>)
where
    T: PartialEq + Clone + 'static,
{
    let instance = current_component::<D>();
    let slot: Rc<RefCell<T>> = instance.borrow_mut().use_hook_cell(init);

    let setter: Rc<Rc<dyn Fn(SetStateAction<T>)>> = {
        let slot = slot.clone();
        let weak_instance = Rc::downgrade(&instance);
        instance.borrow_mut().use_hook(move || {
            let setter: Rc<dyn Fn(SetStateAction<T>)> = Rc::new(move |action: SetStateAction<T>| {
                let Some(instance) = weak_instance.upgrade() else { return };
                let next = {
                    let current = slot.borrow();
                    match action {
                        SetStateAction::Value(v) => v,
                        SetStateAction::Update(f) => f(&current),
                    }
                };
                let unchanged = same_value(&next, &*slot.borrow());
                if unchanged {
                    return;
                }
                *slot.borrow_mut() = next;
                ComponentInstance::enqueue_self(&instance);
            });
            setter
        })
    };

    let value = Rc::new(slot.borrow().clone());
    (value, (*setter).clone())
}
