//! Type registrations and memoized property descriptors.

use std::any::Any;
use std::collections::{HashMap, HashSet};
use std::fmt;
use std::sync::Arc;

use parking_lot::RwLock;

use crate::callable::{Callable, Param};
use crate::container::Container;
use crate::error::DiResult;
use crate::factory::ServiceFactory;
use crate::handle::Handle;
use crate::params::{downcast, AnyArc, Args};

type BuildFn = Arc<dyn Fn(&Container, Handle, Args) -> DiResult<AnyArc> + Send + Sync>;
type MethodFn = Arc<dyn Fn(&Container, AnyArc, Args) -> DiResult<AnyArc> + Send + Sync>;

/// Constructor of a concrete type.
///
/// The build function receives the handle `make` assigned to the new object
/// so the object can keep it for later property injection.
#[derive(Clone)]
pub struct Constructor {
    params: Vec<Param>,
    build: BuildFn,
}

impl Constructor {
    pub fn new<T, F>(params: Vec<Param>, build: F) -> Self
    where
        T: Any + Send + Sync,
        F: Fn(&Container, Handle, Args) -> DiResult<T> + Send + Sync + 'static,
    {
        Self {
            params,
            build: Arc::new(move |c: &Container, h: Handle, args: Args| {
                Ok(Arc::new(build(c, h, args)?) as AnyArc)
            }),
        }
    }

    pub fn params(&self) -> &[Param] {
        &self.params
    }

    pub(crate) fn declares(&self, name: &str) -> bool {
        self.params.iter().any(|p| p.name() == name)
    }

    pub(crate) fn bind(&self, class: &str, handle: Handle) -> Callable {
        let build = self.build.clone();
        let owner = handle.clone();
        Callable::erased(format!("{}::new", class), self.params.clone(), move |c, args| {
            build(c, owner.clone(), args)
        })
        .bound(handle)
    }
}

/// Method callable through a `Class::method` definition.
#[derive(Clone)]
pub struct Method {
    params: Vec<Param>,
    body: MethodFn,
}

impl Method {
    pub fn new<S, R, F>(params: Vec<Param>, body: F) -> Self
    where
        S: Any + Send + Sync,
        R: Any + Send + Sync,
        F: Fn(&Container, Arc<S>, Args) -> DiResult<R> + Send + Sync + 'static,
    {
        Self {
            params,
            body: Arc::new(move |c: &Container, receiver: AnyArc, args: Args| {
                let receiver = downcast::<S>(receiver, "method receiver")?;
                Ok(Arc::new(body(c, receiver, args)?) as AnyArc)
            }),
        }
    }

    pub(crate) fn bind(&self, label: String, receiver: AnyArc, owner: Option<Handle>) -> Callable {
        let body = self.body.clone();
        let callable = Callable::erased(label, self.params.clone(), move |c, args| {
            body(c, receiver.clone(), args)
        });
        match owner {
            Some(handle) => callable.bound(handle),
            None => callable,
        }
    }
}

/// How `make` produces an instance of a type.
#[derive(Clone)]
pub enum TypeKind {
    Concrete(Constructor),
    /// Construction delegated to the factory's own `make`
    Factory(Arc<dyn ServiceFactory>),
    /// Capability only; never constructed directly
    Interface,
}

/// Declared property of a type.
#[derive(Debug, Clone)]
pub struct Property {
    name: String,
    capability: Option<String>,
}

/// Registered type: the Rust stand-in for a reflected class.
///
/// # Examples
///
/// ```rust
/// use ferrous_wire::{Constructor, Param, TypeDef};
///
/// struct Mailer;
///
/// let def = TypeDef::concrete(
///     "SmtpMailer",
///     Constructor::new(vec![Param::typed("logger", "LoggerInterface")], |_, _, _| Ok(Mailer)),
/// )
/// .extends("BaseMailer")
/// .property("clock", "Clock");
///
/// assert_eq!(def.name(), "SmtpMailer");
/// assert_eq!(def.parent(), Some("BaseMailer"));
/// ```
#[derive(Clone)]
pub struct TypeDef {
    name: Arc<str>,
    parent: Option<String>,
    kind: TypeKind,
    properties: Vec<Property>,
    methods: HashMap<String, Method>,
}

impl TypeDef {
    pub fn concrete(name: impl Into<Arc<str>>, constructor: Constructor) -> Self {
        Self::with_kind(name, TypeKind::Concrete(constructor))
    }

    pub fn interface(name: impl Into<Arc<str>>) -> Self {
        Self::with_kind(name, TypeKind::Interface)
    }

    pub fn factory(name: impl Into<Arc<str>>, factory: Arc<dyn ServiceFactory>) -> Self {
        Self::with_kind(name, TypeKind::Factory(factory))
    }

    fn with_kind(name: impl Into<Arc<str>>, kind: TypeKind) -> Self {
        Self {
            name: name.into(),
            parent: None,
            kind,
            properties: Vec::new(),
            methods: HashMap::new(),
        }
    }

    pub fn extends(mut self, parent: impl Into<String>) -> Self {
        self.parent = Some(parent.into());
        self
    }

    /// Declares a property with a capability type.
    pub fn property(mut self, name: impl Into<String>, capability: impl Into<String>) -> Self {
        self.properties.push(Property {
            name: name.into(),
            capability: Some(capability.into()),
        });
        self
    }

    /// Declares a property without a type; it shadows inherited declarations.
    pub fn untyped_property(mut self, name: impl Into<String>) -> Self {
        self.properties.push(Property {
            name: name.into(),
            capability: None,
        });
        self
    }

    pub fn method(mut self, name: impl Into<String>, method: Method) -> Self {
        self.methods.insert(name.into(), method);
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub(crate) fn shared_name(&self) -> Arc<str> {
        self.name.clone()
    }

    pub fn parent(&self) -> Option<&str> {
        self.parent.as_deref()
    }

    pub fn kind(&self) -> &TypeKind {
        &self.kind
    }

    pub(crate) fn find_method(&self, name: &str) -> Option<&Method> {
        self.methods.get(name)
    }
}

impl fmt::Debug for TypeDef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let kind = match self.kind {
            TypeKind::Concrete(_) => "concrete",
            TypeKind::Factory(_) => "factory",
            TypeKind::Interface => "interface",
        };
        f.debug_struct("TypeDef")
            .field("name", &self.name)
            .field("parent", &self.parent)
            .field("kind", &kind)
            .field("properties", &self.properties)
            .finish()
    }
}

/// Injectable properties of a class, inherited ones included.
///
/// Own declarations come first, then each ancestor's in turn; a property
/// redeclared lower in the chain shadows the inherited one.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TypeDescriptor {
    class: String,
    properties: Vec<(String, String)>,
}

impl TypeDescriptor {
    pub fn class(&self) -> &str {
        &self.class
    }

    /// Capability type required by `property`.
    pub fn capability(&self, property: &str) -> Option<&str> {
        self.properties
            .iter()
            .find(|(name, _)| name == property)
            .map(|(_, capability)| capability.as_str())
    }

    /// `(property, capability)` pairs in order.
    pub fn properties(&self) -> impl Iterator<Item = (&str, &str)> {
        self.properties.iter().map(|(n, c)| (n.as_str(), c.as_str()))
    }
}

/// Registered types plus the per-class descriptor memo.
#[derive(Default)]
pub(crate) struct TypeRegistry {
    types: HashMap<String, Arc<TypeDef>>,
    descriptors: RwLock<HashMap<String, Arc<TypeDescriptor>>>,
}

impl TypeRegistry {
    pub(crate) fn insert(&mut self, def: TypeDef) {
        self.descriptors.get_mut().clear();
        self.types.insert(def.name().to_string(), Arc::new(def));
    }

    pub(crate) fn get(&self, name: &str) -> Option<&Arc<TypeDef>> {
        self.types.get(name)
    }

    pub(crate) fn len(&self) -> usize {
        self.types.len()
    }

    /// The class followed by its registered ancestors, nearest first.
    ///
    /// Stops at the first unregistered ancestor or at a repeated name.
    pub(crate) fn lineage<'a>(&'a self, class: &'a str) -> Vec<Arc<TypeDef>> {
        let mut chain = Vec::new();
        let mut seen = HashSet::new();
        let mut next = Some(class);
        while let Some(name) = next {
            if !seen.insert(name) {
                tracing::warn!(class, ancestor = name, "inheritance cycle");
                break;
            }
            match self.types.get(name) {
                Some(def) => {
                    chain.push(def.clone());
                    next = def.parent();
                }
                None => break,
            }
        }
        chain
    }

    /// Memoized descriptor for `class`; `None` if the class is unknown.
    pub(crate) fn descriptor(&self, class: &str) -> Option<Arc<TypeDescriptor>> {
        if let Some(found) = self.descriptors.read().get(class) {
            return Some(found.clone());
        }

        let chain = self.lineage(class);
        if chain.is_empty() {
            return None;
        }

        let mut seen = HashSet::new();
        let mut properties = Vec::new();
        for def in &chain {
            for prop in &def.properties {
                if !seen.insert(prop.name.as_str()) {
                    continue;
                }
                if let Some(capability) = &prop.capability {
                    properties.push((prop.name.clone(), capability.clone()));
                }
            }
        }

        let descriptor = Arc::new(TypeDescriptor {
            class: class.to_string(),
            properties,
        });
        tracing::trace!(
            class,
            properties = descriptor.properties.len(),
            "type descriptor computed"
        );
        Some(
            self.descriptors
                .write()
                .entry(class.to_string())
                .or_insert(descriptor)
                .clone(),
        )
    }
}
