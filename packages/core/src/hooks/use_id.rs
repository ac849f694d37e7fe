use std::rc::Rc;
use std::sync::atomic::{AtomicU64, Ordering};

use crate::document::Document;
use crate::scope::current_component;

static NEXT_ID: AtomicU64 = AtomicU64::new(1);

/// `useId`: stable across re-renders of the same hook slot, unique
/// across the process. IDs are not guaranteed unique across independently
/// mounted roots sharing one DOM.
pub fn use_id<D: Document>() -> Rc<String> {
    current_component::<D>()
        .borrow_mut()
        .use_hook(|| format!(":w{}:", NEXT_ID.fetch_add(1, Ordering::Relaxed)))
}
