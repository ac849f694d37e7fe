/// `useDebugValue`: accepted for API compatibility with components
/// ported from other hook-based frameworks. No-op — this engine has no
/// dev-tools panel to surface it to.
pub fn use_debug_value(_value: impl std::fmt::Display) {}
