//! `willow-core`: a renderer-agnostic virtual-DOM reconciler and hook
//! runtime. A host renderer (e.g. `willow-web`) implements [`Document`] for
//! its own node type; this crate never touches a real DOM directly.
//!
//! The diff is synchronous and Preact-shaped: no fiber tree, no
//! time-slicing. See `DESIGN.md` for design rationale.

mod any_props;
mod commit;
mod context;
mod diff;
mod document;
mod hooks;
mod options;
mod props;
mod reconcile;
mod render;
mod scheduler;
mod scope;
mod util;
mod vnode;

pub mod testing;

pub use commit::PostPaintScheduler;
pub use context::{create_context, create_provider, Context};
pub use document::{is_custom_property, Document, SVG_NAMESPACE};
pub use options::Options;
pub use render::Root;
pub use scheduler::MicrotaskSpawner;
pub use scope::{current_component, ComponentInstance};
pub use vnode::{
    create_ref, ElementBuilder, Key, PropValue, Props, RefTarget, RefValue, StyleDecl, StyleValue,
    VNode,
};

pub use hooks::{
    use_callback, use_context, use_debug_value, use_effect, use_id, use_layout_effect, use_memo,
    use_reducer, use_ref, use_state, use_sync_external_store, ExternalSubscribe, Notify,
    SetStateAction, Unsubscribe,
};

/// Re-exports the pieces most call sites need in scope at once.
pub mod prelude {
    pub use crate::{
        create_context, create_ref, current_component, use_callback, use_context,
        use_debug_value, use_effect, use_id, use_layout_effect, use_memo, use_reducer, use_ref,
        use_state, use_sync_external_store, Context, Document, ElementBuilder, MicrotaskSpawner,
        Options, PostPaintScheduler, PropValue, Props, RefTarget, RefValue, Root, SetStateAction,
        StyleDecl, StyleValue, VNode,
    };
}
