//! The hook store. Each hook is a free function that resolves its slot
//! against [`current_component`] rather than taking an explicit context
//! parameter — a single thread-local-like register instead of a
//! `Scope<P>`-threaded `cx.use_hook` pattern. The tradeoff is that call
//! sites name the renderer's `Document` type explicitly
//! (`use_state::<MyDoc, _>(...)`) since nothing else pins it.
//!
//! Hooks must be called unconditionally, in the same order, every render —
//! see [`crate::scope::ComponentInstance::use_hook`].

mod use_context;
mod use_debug_value;
mod use_effect;
mod use_id;
mod use_memo;
mod use_reducer;
mod use_ref;
mod use_state;
mod use_sync_external_store;

pub use use_context::use_context;
pub use use_debug_value::use_debug_value;
pub use use_effect::{use_effect, use_layout_effect};
pub use use_id::use_id;
pub use use_memo::{use_callback, use_memo};
pub use use_reducer::use_reducer;
pub use use_ref::use_ref;
pub use use_state::{use_state, SetStateAction};
pub use use_sync_external_store::{use_sync_external_store, ExternalSubscribe, Notify, Unsubscribe};
