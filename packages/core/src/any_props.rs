//! Type-erased component props: a `VProps<P>` monomorphized per props type
//! `P`, accessed through a `dyn AnyProps` so a tree of differently-typed
//! components can share one `NodeKind::Component` representation.
//!
//! `render` here does not `catch_unwind` — a component body's panic
//! propagates to the caller of the diff that triggered it. There is no
//! error boundary.

use std::any::Any;

use crate::document::Document;
use crate::vnode::VNode;

pub trait AnyProps<D: Document> {
    fn render(&self) -> Option<VNode<D>>;
    fn props_any(&self) -> &dyn Any;
    fn set_props(&mut self, props: Box<dyn Any>);
    fn fn_ptr(&self) -> usize;
    fn type_name(&self) -> &'static str;
}

pub struct VProps<D: Document, P> {
    pub render_fn: fn(P) -> Option<VNode<D>>,
    pub props: P,
    pub name: &'static str,
}

impl<D: Document, P: Clone + 'static> AnyProps<D> for VProps<D, P> {
    fn render(&self) -> Option<VNode<D>> {
        (self.render_fn)(self.props.clone())
    }

    fn props_any(&self) -> &dyn Any {
        &self.props
    }

    fn set_props(&mut self, props: Box<dyn Any>) {
        match props.downcast::<P>() {
            Ok(p) => self.props = *p,
            Err(_) => log::error!(
                "willow: props type mismatch updating component `{}` — ignoring update",
                self.name
            ),
        }
    }

    fn fn_ptr(&self) -> usize {
        self.render_fn as usize
    }

    fn type_name(&self) -> &'static str {
        self.name
    }
}
