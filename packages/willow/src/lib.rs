//! `willow`: the crate application code depends on. Re-exports
//! `willow-core`'s reconciler/hooks runtime and, behind the `web` feature
//! (default-on), `willow-web`'s `web-sys` renderer entry points.

pub use willow_core::*;

#[cfg(feature = "web")]
pub use willow_web as web;
