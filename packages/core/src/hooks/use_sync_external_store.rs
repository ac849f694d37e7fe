use std::rc::Rc;

use super::use_effect::use_effect;
use super::use_state::{use_state, SetStateAction};
use crate::document::Document;

pub type Notify = Rc<dyn Fn()>;
pub type Unsubscribe = Box<dyn FnOnce()>;
pub type ExternalSubscribe = Rc<dyn Fn(Notify) -> Unsubscribe>;

/// `useSyncExternalStore(subscribe, getSnapshot, getServerSnapshot?)`.
/// The server snapshot parameter is accepted for API compatibility but
/// unused, since this engine has no server-render mode.
pub fn use_sync_external_store<D, T>(
    subscribe: ExternalSubscribe,
    get_snapshot: impl Fn() -> T + 'static,
    _get_server_snapshot: Option<impl Fn() -> T>,
) -> Rc<T>
where
    D: Document,
    T: PartialEq + Clone + 'static,
{
    let get_snapshot = Rc::new(get_snapshot);
    let (value, set_value) = use_state::<D, T>({
        let get_snapshot = get_snapshot.clone();
        move || get_snapshot()
    });

    // Re-subscribe only when the `subscribe` function's identity changes.
    let subscribe_identity = Rc::as_ptr(&subscribe) as *const () as usize;
    use_effect::<D, usize>(Some(subscribe_identity), move || {
        // Missed-update check between render and subscription.
        let latest = get_snapshot();
        set_value(SetStateAction::Value(latest));

        let notify_setter = set_value.clone();
        let notify_snapshot = get_snapshot.clone();
        let notify: Notify = Rc::new(move || {
            notify_setter(SetStateAction::Value(notify_snapshot()));
        });
        let unsubscribe = subscribe(notify);
        Some(Box::new(move || unsubscribe()) as Box<dyn FnOnce()>)
    });

    value
}
