//! Components: objects that own per-execution-unit context state.

use crate::context::ContextType;
use crate::handle::Handle;

/// A shared service that keeps mutable state in a context slot.
///
/// The handle is the component's identity: two components with distinct
/// handles never share a slot. The handle's class, followed by
/// [`ancestors`](Component::ancestors), is searched for a registered
/// `<Class>Context` type unless the component supplies its own through
/// [`custom_context`](Component::custom_context).
///
/// # Examples
///
/// ```
/// use ferrous_wire::{Component, Handle};
///
/// struct SessionManager {
///     handle: Handle,
/// }
///
/// impl Component for SessionManager {
///     fn handle(&self) -> &Handle {
///         &self.handle
///     }
///
///     fn ancestors(&self) -> &'static [&'static str] {
///         &["Manager"]
///     }
/// }
/// ```
pub trait Component: Send + Sync {
    fn handle(&self) -> &Handle;

    /// Ancestor class names, nearest first.
    fn ancestors(&self) -> &'static [&'static str] {
        &[]
    }

    /// Context type this component creates for itself, bypassing the
    /// naming convention.
    fn custom_context(&self) -> Option<ContextType> {
        None
    }
}
