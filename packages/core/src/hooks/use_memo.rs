use std::cell::RefCell;
use std::rc::Rc;

use crate::document::Document;
use crate::scope::current_component;
use crate::util::same_value;

/// `useMemo`. `deps = None` means "always re-evaluate"; `Some(deps)`
/// re-evaluates only when `deps` differs from the previous call's under
/// `PartialEq` (a same-value-is `Object.is` approximation — see
/// [`crate::util::same_value`]). `compute` runs at most once per call.
pub fn use_memo<D, Deps, T>(deps: Option<Deps>, compute: impl FnOnce() -> T) -> Rc<T>
where
    D: Document,
    Deps: PartialEq + 'static,
    T: 'static,
{
    let instance = current_component::<D>();
    let slot: Rc<RefCell<Option<(Option<Deps>, Rc<T>)>>> = instance.borrow_mut().use_hook_cell(|| None);
    let mut slot = slot.borrow_mut();

    let stale = match slot.as_ref() {
        None => true,
        Some(_) if deps.is_none() => true,
        Some((Some(prev), _)) => match &deps {
            Some(d) => !same_value(prev, d),
            None => true,
        },
        Some((None, _)) => true,
    };
    if stale {
        let value = Rc::new(compute());
        *slot = Some((deps, value));
    }
    slot.as_ref().unwrap().1.clone()
}

/// `useCallback(fn, deps)`: `useMemo(() => fn, deps)`.
pub fn use_callback<D, Deps, F>(deps: Option<Deps>, callback: F) -> Rc<F>
where
    D: Document,
    Deps: PartialEq + 'static,
    F: 'static,
{
    use_memo::<D, Deps, F>(deps, move || callback)
}
