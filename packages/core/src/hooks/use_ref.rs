use std::cell::RefCell;
use std::rc::Rc;

use crate::document::Document;
use crate::scope::current_component;

/// `useRef`: a memoized `{ current: initial }` cell with an implicit
/// empty dependency list, so it is one stable record for the component's
/// lifetime and mutating `.current` never triggers a render.
pub fn use_ref<D: Document, T: 'static>(init: impl FnOnce() -> T) -> Rc<RefCell<T>> {
    current_component::<D>().borrow_mut().use_hook_cell(init)
}
