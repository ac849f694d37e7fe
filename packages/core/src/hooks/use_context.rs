use std::rc::Rc;

use crate::context::{find_provider, subscribe};
use crate::document::Document;
use crate::scope::current_component;
use crate::vnode::VNode;

/// `useContext(ctx)`: walks the current component's vnode
/// `parent` chain for the nearest matching Provider. Subscribes to it when
/// found so a later value change re-renders this component; otherwise
/// returns the context's default value without subscribing (there is
/// nothing to subscribe to).
pub fn use_context<D: Document, T: Clone + 'static>(ctx: &crate::context::Context<T>) -> T {
    let instance = current_component::<D>();
    let vnode: VNode<D> = instance
        .borrow()
        .vnode()
        .unwrap_or_else(|| panic!("willow: useContext called from an unmounted component"));

    match find_provider(&vnode, ctx.id) {
        Some(provider) => {
            subscribe(&provider, &instance);
            provider
                .value
                .borrow()
                .clone()
                .downcast::<T>()
                .map(|v| (*v).clone())
                .unwrap_or_else(|_| {
                    log::error!("willow: context value type mismatch for context id {}", ctx.id);
                    ctx.default_value.clone()
                })
        }
        None => ctx.default_value.clone(),
    }
}

/// Helper used by the Provider component implementation to box a value for [`crate::context::ProviderState`].
pub(crate) fn boxed_value<T: 'static>(value: T) -> Rc<dyn std::any::Any> {
    Rc::new(value)
}
