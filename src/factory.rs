//! Factories for interfaces with several named implementations.

use crate::container::Container;
use crate::definition::Definition;
use crate::error::{DiError, DiResult};
use crate::params::{AnyArc, Params};

/// Factory bound to an interface.
///
/// At bootstrap every variant is registered as `Interface#name`; a variant
/// called `default` also makes the bare `Interface` identifier an alias of
/// `Interface#default`. Any `make` of the interface (or of the factory type
/// itself) is delegated to [`ServiceFactory::make`].
///
/// # Examples
///
/// ```rust
/// use ferrous_wire::{ContainerBuilder, Definition, ServiceFactory};
/// use std::sync::Arc;
///
/// struct Connection { dsn: String }
///
/// struct DbFactory;
/// impl ServiceFactory for DbFactory {
///     fn variants(&self) -> Vec<(String, Definition)> {
///         vec![
///             ("default".into(), Definition::instance(Connection { dsn: "primary".into() })),
///             ("replica".into(), Definition::instance(Connection { dsn: "replica".into() })),
///         ]
///     }
/// }
///
/// let container = ContainerBuilder::new()
///     .factory("DbInterface", Arc::new(DbFactory))
///     .build();
///
/// let replica = container.get_as::<Connection>("DbInterface#replica").unwrap();
/// assert_eq!(replica.dsn, "replica");
/// let default = container.get("DbInterface").unwrap();
/// assert!(Arc::ptr_eq(&default, &container.get("DbInterface#default").unwrap()));
/// ```
pub trait ServiceFactory: Send + Sync + 'static {
    /// Variant names and their definitions.
    fn variants(&self) -> Vec<(String, Definition)>;

    /// Builds a fresh instance for a `make` of `class`.
    fn make(&self, container: &Container, class: &str, params: &Params) -> DiResult<AnyArc> {
        let _ = (container, params);
        Err(DiError::NotFound(class.to_string()))
    }
}

/// Name of the factory type serving `interface`: `DbInterface` -> `DbFactory`.
pub fn factory_type_name(interface: &str) -> String {
    let stem = interface.strip_suffix(INTERFACE_SUFFIX).unwrap_or(interface);
    format!("{}{}", stem, FACTORY_SUFFIX)
}

pub(crate) const INTERFACE_SUFFIX: &str = "Interface";
pub(crate) const FACTORY_SUFFIX: &str = "Factory";

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_factory_type_name() {
        assert_eq!(factory_type_name("DbInterface"), "DbFactory");
        assert_eq!(factory_type_name("app.cache.PoolInterface"), "app.cache.PoolFactory");
        assert_eq!(factory_type_name("Mailer"), "MailerFactory");
    }
}
