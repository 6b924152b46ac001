//! Callables with declared parameter lists.

use std::any::Any;
use std::fmt;
use std::sync::Arc;

use crate::container::Container;
use crate::error::DiResult;
use crate::handle::Handle;
use crate::lazy::Lazy;
use crate::params::{AnyArc, Args};

type Body = Arc<dyn Fn(&Container, Args) -> DiResult<AnyArc> + Send + Sync>;
pub(crate) type ProxyFn = Arc<dyn Fn(&Container, String) -> AnyArc + Send + Sync>;

/// Declared parameter of a callable or constructor.
///
/// Resolution precedence, applied by [`Container::call`]: positional
/// override, named override, default value, capability type.
#[derive(Clone)]
pub struct Param {
    name: String,
    capability: Option<String>,
    default: Option<AnyArc>,
    proxy: Option<ProxyFn>,
}

impl Param {
    /// Untyped parameter; it must be supplied or defaulted.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            capability: None,
            default: None,
            proxy: None,
        }
    }

    /// Parameter autowired from its capability type.
    pub fn typed(name: impl Into<String>, capability: impl Into<String>) -> Self {
        Self {
            capability: Some(capability.into()),
            ..Self::new(name)
        }
    }

    /// Parameter receiving a [`Lazy<T>`] proxy for its capability instead of
    /// the resolved instance.
    pub fn lazy<T: Any + Send + Sync>(
        name: impl Into<String>,
        capability: impl Into<String>,
    ) -> Self {
        let proxy: ProxyFn = Arc::new(|container: &Container, id: String| {
            Arc::new(Lazy::<T>::new(container, id)) as AnyArc
        });
        Self {
            proxy: Some(proxy),
            ..Self::typed(name, capability)
        }
    }

    pub fn with_default<T: Any + Send + Sync>(mut self, value: T) -> Self {
        self.default = Some(Arc::new(value));
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn capability(&self) -> Option<&str> {
        self.capability.as_deref()
    }

    pub(crate) fn default_value(&self) -> Option<&AnyArc> {
        self.default.as_ref()
    }

    pub(crate) fn proxy(&self) -> Option<&ProxyFn> {
        self.proxy.as_ref()
    }
}

impl fmt::Debug for Param {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Param")
            .field("name", &self.name)
            .field("capability", &self.capability)
            .field("default", &self.default.is_some())
            .field("lazy", &self.proxy.is_some())
            .finish()
    }
}

/// Invocable target for [`Container::call`].
///
/// The body receives arguments in declaration order. A callable bound to an
/// owner handle consults that owner's overrides when autowiring.
///
/// # Examples
///
/// ```rust
/// use ferrous_wire::{Arg, Callable, ContainerBuilder, Param, Params};
///
/// let container = ContainerBuilder::new().build();
/// let greet = Callable::new(
///     "greet",
///     vec![Param::new("name"), Param::new("greeting").with_default("Hello".to_string())],
///     |_, args| {
///         let name = args.get::<String>(0)?;
///         let greeting = args.get::<String>(1)?;
///         Ok(format!("{greeting}, {name}!"))
///     },
/// );
///
/// let out = container
///     .call_as::<String>(&greet, &Params::new().push(Arg::value("Ada".to_string())))
///     .unwrap();
/// assert_eq!(&*out, "Hello, Ada!");
/// ```
#[derive(Clone)]
pub struct Callable {
    name: String,
    owner: Option<Handle>,
    params: Vec<Param>,
    body: Body,
}

impl Callable {
    pub fn new<R, F>(name: impl Into<String>, params: Vec<Param>, body: F) -> Self
    where
        R: Any + Send + Sync,
        F: Fn(&Container, Args) -> DiResult<R> + Send + Sync + 'static,
    {
        Self::erased(name, params, move |c, args| Ok(Arc::new(body(c, args)?) as AnyArc))
    }

    /// Like [`Callable::new`] for bodies that already return a shared instance.
    pub fn erased<F>(name: impl Into<String>, params: Vec<Param>, body: F) -> Self
    where
        F: Fn(&Container, Args) -> DiResult<AnyArc> + Send + Sync + 'static,
    {
        Self {
            name: name.into(),
            owner: None,
            params,
            body: Arc::new(body),
        }
    }

    /// Binds the callable to the object whose overrides it should honor.
    pub fn bound(mut self, owner: Handle) -> Self {
        self.owner = Some(owner);
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn owner(&self) -> Option<&Handle> {
        self.owner.as_ref()
    }

    pub fn params(&self) -> &[Param] {
        &self.params
    }

    pub(crate) fn invoke(&self, container: &Container, args: Args) -> DiResult<AnyArc> {
        (self.body)(container, args)
    }
}

impl fmt::Debug for Callable {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Callable")
            .field("name", &self.name)
            .field("owner", &self.owner)
            .field("params", &self.params)
            .finish()
    }
}
