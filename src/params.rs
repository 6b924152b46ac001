//! Parameter overrides and resolved argument lists.

use std::any::Any;
use std::fmt;
use std::sync::Arc;

use crate::error::{DiError, DiResult};

/// Type-erased shared instance.
pub type AnyArc = Arc<dyn Any + Send + Sync>;

/// A value supplied for a parameter or property.
///
/// `Value`s are used exactly as given. `Ref`s name another service and are
/// resolved with the sigil rules: `#name` appends the variant to the
/// capability type of the parameter, `@id` and plain strings resolve the
/// identifier itself.
#[derive(Clone)]
pub enum Arg {
    /// Ready-made value, used as-is
    Value(AnyArc),
    /// Identifier reference, resolved on use
    Ref(String),
}

impl Arg {
    /// Wraps a concrete value.
    pub fn value<T: Any + Send + Sync>(value: T) -> Self {
        Arg::Value(Arc::new(value))
    }

    /// Wraps an already shared instance.
    pub fn shared(value: AnyArc) -> Self {
        Arg::Value(value)
    }

    /// References another service by identifier.
    pub fn reference(id: impl Into<String>) -> Self {
        Arg::Ref(id.into())
    }
}

impl fmt::Debug for Arg {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Arg::Value(_) => f.write_str("Value(..)"),
            Arg::Ref(id) => f.debug_tuple("Ref").field(id).finish(),
        }
    }
}

/// Positional and named overrides for a `make` or `call`.
///
/// # Examples
///
/// ```rust
/// use ferrous_wire::{Arg, Params};
///
/// let params = Params::new()
///     .push(Arg::value(8080u16))
///     .with("dsn", Arg::value("postgres://localhost".to_string()))
///     .with("logger", Arg::reference("#audit"));
///
/// assert!(params.positional(0).is_some());
/// assert!(params.named("dsn").is_some());
/// assert!(params.named("missing").is_none());
/// ```
#[derive(Clone, Default, Debug)]
pub struct Params {
    positional: Vec<Arg>,
    named: Vec<(String, Arg)>,
}

impl Params {
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends a positional override.
    pub fn push(mut self, arg: Arg) -> Self {
        self.positional.push(arg);
        self
    }

    /// Adds or replaces a named override.
    pub fn with(mut self, name: impl Into<String>, arg: Arg) -> Self {
        self.insert(name, arg);
        self
    }

    pub(crate) fn insert(&mut self, name: impl Into<String>, arg: Arg) {
        let name = name.into();
        match self.named.iter_mut().find(|(n, _)| *n == name) {
            Some(slot) => slot.1 = arg,
            None => self.named.push((name, arg)),
        }
    }

    pub fn positional(&self, index: usize) -> Option<&Arg> {
        self.positional.get(index)
    }

    pub fn named(&self, name: &str) -> Option<&Arg> {
        self.named.iter().find(|(n, _)| n == name).map(|(_, a)| a)
    }

    /// Named overrides in insertion order.
    pub fn named_iter(&self) -> impl Iterator<Item = (&str, &Arg)> {
        self.named.iter().map(|(n, a)| (n.as_str(), a))
    }

    pub fn is_empty(&self) -> bool {
        self.positional.is_empty() && self.named.is_empty()
    }
}

/// Arguments resolved for a callable, in declaration order.
pub struct Args {
    names: Vec<String>,
    values: Vec<AnyArc>,
}

impl Args {
    pub(crate) fn new(names: Vec<String>, values: Vec<AnyArc>) -> Self {
        Self { names, values }
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Type-erased argument at `index`.
    pub fn raw(&self, index: usize) -> Option<&AnyArc> {
        self.values.get(index)
    }

    /// Downcasts the argument at `index`.
    pub fn get<T: Any + Send + Sync>(&self, index: usize) -> DiResult<Arc<T>> {
        let name = self.names.get(index).map_or("<out of range>", String::as_str);
        let value = self
            .values
            .get(index)
            .ok_or_else(|| DiError::NotFound(format!("argument #{} ({})", index, name)))?;
        downcast(value.clone(), name)
    }

    /// Downcasts the argument declared as `name`.
    pub fn by_name<T: Any + Send + Sync>(&self, name: &str) -> DiResult<Arc<T>> {
        let index = self
            .names
            .iter()
            .position(|n| n == name)
            .ok_or_else(|| DiError::NotFound(format!("argument {}", name)))?;
        self.get(index)
    }
}

/// Downcasts a type-erased instance, naming `what` on failure.
pub(crate) fn downcast<T: Any + Send + Sync>(value: AnyArc, what: &str) -> DiResult<Arc<T>> {
    value
        .downcast::<T>()
        .map_err(|_| DiError::TypeMismatch(format!("{} as {}", what, std::any::type_name::<T>())))
}
