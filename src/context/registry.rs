//! Context types and the startup registration table.

use std::any::Any;
use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use crate::params::AnyArc;

/// Suffix pairing a component class with its context type.
pub const CONTEXT_SUFFIX: &str = "Context";

/// State stored in a context slot.
///
/// Set `INSEPARABLE` for contexts wrapping a resource that must never be
/// referenced by two execution units at once, such as an exclusive
/// connection handle. Such contexts are never shared with child units.
///
/// # Examples
///
/// ```
/// use ferrous_wire::ContextState;
/// use std::sync::Mutex;
///
/// #[derive(Default)]
/// struct RequestContext {
///     path: Mutex<String>,
/// }
/// impl ContextState for RequestContext {}
///
/// #[derive(Default)]
/// struct ConnectionContext {
///     in_transaction: Mutex<bool>,
/// }
/// impl ContextState for ConnectionContext {
///     const INSEPARABLE: bool = true;
/// }
/// ```
pub trait ContextState: Any + Send + Sync {
    const INSEPARABLE: bool = false;
}

/// A registered context type and how to build it.
#[derive(Clone)]
pub struct ContextType {
    name: Arc<str>,
    inseparable: bool,
    create: Arc<dyn Fn() -> AnyArc + Send + Sync>,
}

impl ContextType {
    pub fn new<C, F>(name: impl Into<Arc<str>>, create: F) -> Self
    where
        C: ContextState,
        F: Fn() -> C + Send + Sync + 'static,
    {
        Self {
            name: name.into(),
            inseparable: C::INSEPARABLE,
            create: Arc::new(move || Arc::new(create()) as AnyArc),
        }
    }

    /// Context type built with `C::default()`.
    pub fn of<C: ContextState + Default>(name: impl Into<Arc<str>>) -> Self {
        Self::new(name, C::default)
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn is_inseparable(&self) -> bool {
        self.inseparable
    }

    pub(crate) fn instantiate(&self) -> ContextSlot {
        ContextSlot {
            value: (self.create)(),
            inseparable: self.inseparable,
        }
    }
}

impl fmt::Debug for ContextType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ContextType")
            .field("name", &self.name)
            .field("inseparable", &self.inseparable)
            .finish()
    }
}

/// A created context plus the flag of its type.
#[derive(Clone)]
pub(crate) struct ContextSlot {
    pub(crate) value: AnyArc,
    pub(crate) inseparable: bool,
}

/// Context types by name, built once at startup.
///
/// # Examples
///
/// ```
/// use ferrous_wire::{ContextRegistry, ContextState, ContextType};
///
/// #[derive(Default)]
/// struct RequestContext;
/// impl ContextState for RequestContext {}
///
/// let registry = ContextRegistry::new()
///     .register(ContextType::of::<RequestContext>("RequestContext"));
/// assert!(registry.get("RequestContext").is_some());
/// assert_eq!(registry.len(), 1);
/// ```
#[derive(Default, Clone, Debug)]
pub struct ContextRegistry {
    types: HashMap<String, ContextType>,
}

impl ContextRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register(mut self, context: ContextType) -> Self {
        if let Some(previous) = self.types.insert(context.name().to_string(), context) {
            tracing::warn!(
                context = previous.name(),
                "context type registered twice; keeping the last"
            );
        }
        self
    }

    pub fn get(&self, name: &str) -> Option<&ContextType> {
        self.types.get(name)
    }

    pub fn len(&self) -> usize {
        self.types.len()
    }

    pub fn is_empty(&self) -> bool {
        self.types.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Default)]
    struct Plain(u8);
    impl ContextState for Plain {}

    struct Exclusive;
    impl ContextState for Exclusive {
        const INSEPARABLE: bool = true;
    }

    #[test]
    fn test_flag_follows_type() {
        assert!(!ContextType::of::<Plain>("PlainContext").is_inseparable());
        let exclusive = ContextType::new("ExclusiveContext", || Exclusive);
        assert!(exclusive.is_inseparable());
        assert!(exclusive.instantiate().inseparable);
    }

    #[test]
    fn test_each_instantiation_is_fresh() {
        let ty = ContextType::of::<Plain>("PlainContext");
        let a = ty.instantiate();
        let b = ty.instantiate();
        assert!(!Arc::ptr_eq(&a.value, &b.value));
        assert_eq!(a.value.downcast::<Plain>().unwrap().0, 0);
    }
}
