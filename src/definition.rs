//! Service definitions supplied at bootstrap.

use std::any::Any;
use std::fmt;
use std::sync::Arc;

use crate::callable::Callable;
use crate::error::{DiError, DiResult};
use crate::identifier::{is_type_name, Identifier, VARIANT_SIGIL};
use crate::params::{AnyArc, Params};

/// Recipe for producing an identifier's instance.
///
/// # Definition Forms
///
/// - **Instance**: a ready object, cached as-is
/// - **Alias**: another identifier or class name (`"@Logger"`, `"ConsoleLogger"`)
/// - **Variant**: `"#replica"`, redirecting `Db` to `Db#replica`
/// - **Method**: `"Clock::utc"`, the result of a method on another service
/// - **Factory**: a callable whose return value is cached
/// - **Spec**: a class plus named parameters for `make`
///
/// # Examples
///
/// ```rust
/// use ferrous_wire::{Definition, Identifier};
///
/// assert!(matches!(
///     Definition::parse("@Logger").unwrap(),
///     Definition::Alias(Identifier::Alias(_))
/// ));
/// assert!(matches!(
///     Definition::parse("#replica").unwrap(),
///     Definition::Variant(v) if v == "replica"
/// ));
/// assert!(matches!(
///     Definition::parse("Clock::utc").unwrap(),
///     Definition::Method { ref class, ref method } if class == "Clock" && method == "utc"
/// ));
/// ```
#[derive(Clone)]
pub enum Definition {
    Instance(AnyArc),
    Alias(Identifier),
    Variant(String),
    Method { class: String, method: String },
    Factory(Callable),
    Spec { class: String, params: Params },
}

impl Definition {
    /// Parses the string form of a definition.
    pub fn parse(raw: &str) -> DiResult<Self> {
        if let Some(variant) = raw.strip_prefix(VARIANT_SIGIL) {
            return match Identifier::parse(&format!("_{}{}", VARIANT_SIGIL, variant)) {
                Ok(_) => Ok(Definition::Variant(variant.to_string())),
                Err(_) => Err(DiError::NotFound(raw.to_string())),
            };
        }
        if let Some((class, method)) = raw.split_once("::") {
            if is_type_name(class) && is_type_name(method) && !method.contains('.') {
                return Ok(Definition::Method {
                    class: class.to_string(),
                    method: method.to_string(),
                });
            }
            return Err(DiError::NotFound(raw.to_string()));
        }
        Identifier::parse(raw).map(Definition::Alias)
    }

    /// Wraps a concrete object.
    pub fn instance<T: Any + Send + Sync>(value: T) -> Self {
        Definition::Instance(Arc::new(value))
    }

    /// Structured spec: `make(class, params)`.
    pub fn class(class: impl Into<String>, params: Params) -> Self {
        Definition::Spec {
            class: class.into(),
            params,
        }
    }

    pub fn factory(callable: Callable) -> Self {
        Definition::Factory(callable)
    }

    /// Short label for logging.
    pub(crate) fn kind(&self) -> &'static str {
        match self {
            Definition::Instance(_) => "instance",
            Definition::Alias(_) => "alias",
            Definition::Variant(_) => "variant",
            Definition::Method { .. } => "method",
            Definition::Factory(_) => "factory",
            Definition::Spec { .. } => "spec",
        }
    }
}

impl fmt::Debug for Definition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Definition::Instance(_) => f.write_str("Instance(..)"),
            Definition::Alias(id) => f.debug_tuple("Alias").field(id).finish(),
            Definition::Variant(v) => f.debug_tuple("Variant").field(v).finish(),
            Definition::Method { class, method } => write!(f, "Method({}::{})", class, method),
            Definition::Factory(c) => f.debug_tuple("Factory").field(&c.name()).finish(),
            Definition::Spec { class, params } => f
                .debug_struct("Spec")
                .field("class", class)
                .field("params", params)
                .finish(),
        }
    }
}

impl From<Callable> for Definition {
    fn from(callable: Callable) -> Self {
        Definition::Factory(callable)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_plain_string_is_alias() {
        match Definition::parse("ConsoleLogger").unwrap() {
            Definition::Alias(Identifier::Plain(name)) => assert_eq!(name, "ConsoleLogger"),
            other => panic!("unexpected {:?}", other),
        }
        match Definition::parse("Db#replica").unwrap() {
            Definition::Alias(id) => assert_eq!(id, Identifier::named("Db", "replica")),
            other => panic!("unexpected {:?}", other),
        }
    }

    #[test]
    fn test_invalid_strings() {
        for raw in ["#", "#a#b", "Clock::", "::utc", "Clock::a.b", "not valid"] {
            assert!(Definition::parse(raw).is_err(), "{raw:?} should be rejected");
        }
    }
}
