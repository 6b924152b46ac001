//! Deferred resolution: lazy proxies and autowired properties.

use std::any::Any;
use std::fmt;
use std::sync::Arc;

use once_cell::sync::OnceCell;

use crate::container::{Container, WeakContainer};
use crate::error::{DiError, DiResult};
use crate::handle::Handle;
use crate::params::downcast;

/// Stand-in that resolves an identifier on first use.
///
/// Holds the container weakly, so a proxy stored inside a service does not
/// keep the container alive. Handing out a proxy instead of the instance
/// lets two services depend on each other as long as one side only touches
/// the other after construction.
///
/// # Examples
///
/// ```
/// use ferrous_wire::ContainerBuilder;
///
/// let container = ContainerBuilder::new().instance("Port", 8080u16).build();
/// let port = container.lazy::<u16>("Port");
/// assert!(!port.is_resolved());
/// assert_eq!(*port.get().unwrap(), 8080);
/// assert!(port.is_resolved());
/// ```
pub struct Lazy<T> {
    container: WeakContainer,
    id: String,
    cell: OnceCell<Arc<T>>,
}

impl<T: Any + Send + Sync> Lazy<T> {
    pub fn new(container: &Container, id: impl Into<String>) -> Self {
        Self {
            container: container.downgrade(),
            id: id.into(),
            cell: OnceCell::new(),
        }
    }

    /// The resolved instance, resolving it on first call.
    ///
    /// # Errors
    ///
    /// [`DiError::ContainerDropped`] if the container is gone, or any error
    /// from [`Container::get_as`]. A failed attempt is not memoized.
    pub fn get(&self) -> DiResult<Arc<T>> {
        self.cell
            .get_or_try_init(|| {
                let container = self
                    .container
                    .upgrade()
                    .ok_or_else(|| DiError::ContainerDropped(self.id.clone()))?;
                tracing::trace!(id = %self.id, "lazy proxy resolving");
                container.get_as::<T>(&self.id)
            })
            .cloned()
    }

    pub fn is_resolved(&self) -> bool {
        self.cell.get().is_some()
    }

    pub fn id(&self) -> &str {
        &self.id
    }
}

impl<T> fmt::Debug for Lazy<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Lazy")
            .field("id", &self.id)
            .field("resolved", &self.cell.get().is_some())
            .finish()
    }
}

/// Property injected through [`Container::inject`] when first read.
///
/// # Examples
///
/// ```
/// use ferrous_wire::{Autowired, Constructor, ContainerBuilder, TypeDef};
///
/// struct Clock(u64);
/// struct Report {
///     clock: Autowired<Clock>,
/// }
///
/// let container = ContainerBuilder::new()
///     .instance("Clock", Clock(42))
///     .register_type(
///         TypeDef::concrete(
///             "Report",
///             Constructor::new(vec![], |c, handle, _| {
///                 Ok(Report { clock: Autowired::new(c, handle, "clock") })
///             }),
///         )
///         .property("clock", "Clock"),
///     )
///     .build();
///
/// let report = container.get_as::<Report>("Report").unwrap();
/// assert_eq!(report.clock.get().unwrap().0, 42);
/// ```
pub struct Autowired<T> {
    container: WeakContainer,
    owner: Handle,
    property: String,
    cell: OnceCell<Arc<T>>,
}

impl<T: Any + Send + Sync> Autowired<T> {
    pub fn new(container: &Container, owner: Handle, property: impl Into<String>) -> Self {
        Self {
            container: container.downgrade(),
            owner,
            property: property.into(),
            cell: OnceCell::new(),
        }
    }

    pub fn get(&self) -> DiResult<Arc<T>> {
        self.cell
            .get_or_try_init(|| {
                let target = format!("{}.{}", self.owner.class(), self.property);
                let container = self
                    .container
                    .upgrade()
                    .ok_or_else(|| DiError::ContainerDropped(target.clone()))?;
                let value = container.inject(&self.owner, &self.property)?;
                downcast(value, &target)
            })
            .cloned()
    }

    pub fn property(&self) -> &str {
        &self.property
    }
}

impl<T> fmt::Debug for Autowired<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Autowired")
            .field("owner", &self.owner)
            .field("property", &self.property)
            .field("resolved", &self.cell.get().is_some())
            .finish()
    }
}
