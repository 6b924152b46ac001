//! The service container: `get`, `make`, `call` and `inject`.
//!
//! This module contains the [`Container`] type, which turns identifiers and
//! parameter lists into instances, and its [`ContainerBuilder`].

use std::any::Any;
use std::collections::HashMap;
use std::sync::{Arc, Weak};
use std::time::Instant;

use parking_lot::RwLock;

use crate::callable::{Callable, Param, ProxyFn};
use crate::context::{Contextor, Scheduler};
use crate::definition::Definition;
use crate::error::{DiError, DiResult};
use crate::factory::{factory_type_name, INTERFACE_SUFFIX};
use crate::handle::{Handle, OverrideMap};
use crate::identifier::{Identifier, ALIAS_SIGIL, VARIANT_SIGIL};
use crate::internal::ResolutionGuard;
use crate::introspect::{TypeDef, TypeDescriptor, TypeKind, TypeRegistry};
use crate::lazy::Lazy;
use crate::observer::Observers;
use crate::params::{downcast, AnyArc, Arg, Args, Params};

mod builder;
pub use builder::{ContainerBuilder, CONTEXTOR_ID};

/// Dependency-injection container.
///
/// Every identifier resolves at most once; the instance is cached and
/// returned by every later [`get`](Container::get). [`make`](Container::make)
/// always builds a new object and never touches the cache.
///
/// # Thread Safety
///
/// `Container` is `Send + Sync` and cheap to clone (it uses `Arc`
/// internally). No lock is held while constructors or factories run; if two
/// threads race on the same identifier the first cached instance wins.
///
/// # Examples
///
/// ```
/// use ferrous_wire::{Constructor, ContainerBuilder, Definition, Params, TypeDef};
/// use std::sync::Arc;
///
/// struct ConsoleLogger;
///
/// let container = ContainerBuilder::new()
///     .register_type(TypeDef::concrete(
///         "ConsoleLogger",
///         Constructor::new(vec![], |_, _, _| Ok(ConsoleLogger)),
///     ))
///     .define("Logger", Definition::class("ConsoleLogger", Params::new()))
///     .define_str("Cache", "@Logger")
///     .build();
///
/// let logger = container.get("Logger").unwrap();
/// let cache = container.get("Cache").unwrap();
/// assert!(Arc::ptr_eq(&logger, &cache));
/// ```
#[derive(Clone)]
pub struct Container {
    inner: Arc<ContainerInner>,
}

pub(crate) struct ContainerInner {
    definitions: RwLock<HashMap<String, Definition>>,
    instances: RwLock<HashMap<String, Entry>>,
    types: TypeRegistry,
    overrides: Arc<OverrideMap>,
    observers: Observers,
    scheduler: Scheduler,
    contextor: Option<Arc<Contextor>>,
}

/// Cached instance plus the handle `make` gave it, if any.
#[derive(Clone)]
struct Entry {
    instance: AnyArc,
    handle: Option<Handle>,
}

impl Entry {
    fn bare(instance: AnyArc) -> Self {
        Self { instance, handle: None }
    }
}

/// Weak reference to a container, held by lazy proxies.
#[derive(Clone)]
pub struct WeakContainer {
    inner: Weak<ContainerInner>,
}

impl WeakContainer {
    pub fn upgrade(&self) -> Option<Container> {
        self.inner.upgrade().map(|inner| Container { inner })
    }
}

impl Container {
    fn key(&self) -> usize {
        Arc::as_ptr(&self.inner) as usize
    }

    pub fn downgrade(&self) -> WeakContainer {
        WeakContainer {
            inner: Arc::downgrade(&self.inner),
        }
    }

    pub fn scheduler(&self) -> Scheduler {
        self.inner.scheduler
    }

    /// The context propagator built from the bootstrap context registry.
    pub fn contextor(&self) -> Option<Arc<Contextor>> {
        self.inner.contextor.clone()
    }

    /// Resolves `id` to its cached instance, resolving it on first use.
    ///
    /// # Errors
    ///
    /// - [`DiError::NotFound`] if `id` has no definition and is not a
    ///   constructible type name
    /// - [`DiError::Circular`] if resolving `id` requires `id` itself
    /// - any error raised while building the instance
    pub fn get(&self, id: &str) -> DiResult<AnyArc> {
        self.fetch(id).map(|entry| entry.instance)
    }

    /// Typed [`get`](Container::get).
    pub fn get_as<T: Any + Send + Sync>(&self, id: &str) -> DiResult<Arc<T>> {
        downcast(self.get(id)?, id)
    }

    fn fetch(&self, id: &str) -> DiResult<Entry> {
        if let Some(entry) = self.inner.instances.read().get(id) {
            return Ok(entry.clone());
        }

        let _guard = ResolutionGuard::enter(self.key(), id)?;
        let observers = &self.inner.observers;
        let started = observers.has_observers().then(Instant::now);
        if started.is_some() {
            observers.resolving(id);
        }

        let result = self.resolve(id);

        if let Some(started) = started {
            match &result {
                Ok(_) => observers.resolved(id, started.elapsed()),
                Err(err) => observers.failed(id, err),
            }
        }
        result
    }

    fn resolve(&self, id: &str) -> DiResult<Entry> {
        let definition = self.inner.definitions.read().get(id).cloned();
        let entry = match definition {
            Some(definition) => {
                tracing::debug!(id, kind = definition.kind(), "resolving definition");
                self.produce(id, definition)?
            }
            None => match Identifier::parse(id)? {
                Identifier::Alias(target) => self.fetch(&target)?,
                // A bare interface served by a factory only resolves through
                // its `default` variant.
                Identifier::Plain(class) if self.served_by_factory(&class) => {
                    return Err(DiError::NotFound(id.to_string()))
                }
                Identifier::Plain(class) => {
                    tracing::debug!(id, "no definition; constructing");
                    self.construct(&class, &Params::new())?
                }
                Identifier::Named { .. } => return Err(DiError::NotFound(id.to_string())),
            },
        };

        let cached = self
            .inner
            .instances
            .write()
            .entry(id.to_string())
            .or_insert(entry)
            .clone();
        Ok(cached)
    }

    fn produce(&self, id: &str, definition: Definition) -> DiResult<Entry> {
        match definition {
            Definition::Instance(instance) => Ok(Entry::bare(instance)),
            // A bare class name builds a new instance owned by `id` alone.
            Definition::Alias(Identifier::Plain(class)) => self.construct(&class, &Params::new()),
            Definition::Alias(Identifier::Alias(target)) => self.fetch(&target),
            Definition::Alias(target) => self.fetch(&target.to_string()),
            Definition::Variant(variant) => {
                let base = Identifier::parse(id).map(|parsed| parsed.base().to_string())?;
                self.fetch(&format!("{}{}{}", base, VARIANT_SIGIL, variant))
            }
            Definition::Method { class, method } => self.produce_method(&class, &method),
            Definition::Factory(callable) => {
                let instance = self.call(&callable, &Params::new())?;
                Ok(Entry {
                    instance,
                    handle: callable.owner().cloned(),
                })
            }
            Definition::Spec { class, params } => self.construct(&class, &params),
        }
    }

    fn produce_method(&self, class: &str, method: &str) -> DiResult<Entry> {
        let receiver = self.fetch(class)?;
        // Look the method up on the receiver's actual class, which may be a
        // subclass of the one named in the definition.
        let actual = receiver.handle.as_ref().map_or(class, Handle::class);
        let found = self
            .inner
            .types
            .lineage(actual)
            .iter()
            .find_map(|def| def.find_method(method).cloned())
            .ok_or_else(|| DiError::NotFound(format!("{}::{}", class, method)))?;

        let label = format!("{}::{}", actual, method);
        let callable = found.bind(label, receiver.instance, receiver.handle);
        let instance = self.call(&callable, &Params::new())?;
        Ok(Entry::bare(instance))
    }

    /// Builds a new instance of `class`. Never cached.
    ///
    /// Named parameters that the constructor does not declare are kept as
    /// overrides for the new object's later autowiring and `inject` calls.
    ///
    /// # Errors
    ///
    /// [`DiError::NotFound`] if neither `class` nor, for an `...Interface`
    /// name, its `...Factory` type is registered.
    pub fn make(&self, class: &str, params: &Params) -> DiResult<AnyArc> {
        self.construct(class, params).map(|entry| entry.instance)
    }

    /// Typed [`make`](Container::make).
    pub fn make_as<T: Any + Send + Sync>(&self, class: &str, params: &Params) -> DiResult<Arc<T>> {
        downcast(self.make(class, params)?, class)
    }

    fn construct(&self, class: &str, params: &Params) -> DiResult<Entry> {
        let _guard = ResolutionGuard::nested(self.key())?;
        let def = self.type_for(class)?;

        match def.kind() {
            TypeKind::Factory(factory) => {
                tracing::debug!(class, factory = def.name(), "delegating construction to factory");
                factory.make(self, class, params).map(Entry::bare)
            }
            TypeKind::Interface => Err(DiError::NotFound(class.to_string())),
            TypeKind::Concrete(constructor) => {
                let handle = Handle::attached(def.shared_name(), &self.inner.overrides);

                let mut surplus = Params::new();
                for (name, arg) in params.named_iter() {
                    if !constructor.declares(name) {
                        surplus.insert(name, arg.clone());
                    }
                }
                self.inner.overrides.record(&handle, surplus);

                let callable = constructor.bind(def.name(), handle.clone());
                let instance = self.call(&callable, params)?;
                tracing::trace!(class = def.name(), handle = handle.id(), "constructed");
                Ok(Entry {
                    instance,
                    handle: Some(handle),
                })
            }
        }
    }

    fn type_for(&self, class: &str) -> DiResult<Arc<TypeDef>> {
        let types = &self.inner.types;
        let direct = types.get(class);
        if let Some(def) = direct {
            if !matches!(def.kind(), TypeKind::Interface) {
                return Ok(def.clone());
            }
        }
        if class.ends_with(INTERFACE_SUFFIX) {
            if let Some(factory) = types.get(&factory_type_name(class)) {
                return Ok(factory.clone());
            }
        }
        Err(DiError::NotFound(class.to_string()))
    }

    fn served_by_factory(&self, class: &str) -> bool {
        self.type_for(class)
            .map_or(false, |def| def.name() != class && matches!(def.kind(), TypeKind::Factory(_)))
    }

    /// Invokes `callable`, resolving each declared parameter in order.
    ///
    /// Per parameter the first applicable rule wins: positional override,
    /// named override, default value, capability type. A capability is
    /// autowired through the owner's recorded overrides (by parameter name,
    /// then by capability) before falling back to the capability itself.
    ///
    /// # Errors
    ///
    /// [`DiError::MissingParameters`] naming every parameter no rule could
    /// satisfy.
    pub fn call(&self, callable: &Callable, params: &Params) -> DiResult<AnyArc> {
        let declared = callable.params();
        let mut names = Vec::with_capacity(declared.len());
        let mut values = Vec::with_capacity(declared.len());
        let mut missing = Vec::new();

        for (index, param) in declared.iter().enumerate() {
            let supplied = params.positional(index).or_else(|| params.named(param.name()));
            let value = match (supplied, param.default_value(), param.capability()) {
                (Some(arg), _, _) => Some(self.supplied(param, arg)?),
                (None, Some(default), _) => Some(default.clone()),
                (None, None, Some(capability)) => {
                    Some(self.autowire(callable.owner(), param.name(), capability, param.proxy())?)
                }
                (None, None, None) => None,
            };
            match value {
                Some(value) => values.push(value),
                None => missing.push(param.name().to_string()),
            }
            names.push(param.name().to_string());
        }

        if !missing.is_empty() {
            return Err(DiError::MissingParameters {
                callable: callable.name().to_string(),
                missing,
            });
        }

        tracing::trace!(callable = callable.name(), args = values.len(), "invoking");
        callable.invoke(self, Args::new(names, values))
    }

    /// Typed [`call`](Container::call).
    pub fn call_as<T: Any + Send + Sync>(
        &self,
        callable: &Callable,
        params: &Params,
    ) -> DiResult<Arc<T>> {
        downcast(self.call(callable, params)?, callable.name())
    }

    fn supplied(&self, param: &Param, arg: &Arg) -> DiResult<AnyArc> {
        match arg {
            Arg::Value(value) => Ok(value.clone()),
            Arg::Ref(reference) => {
                let id = referenced_id(param.capability(), reference)?;
                self.deliver(param.proxy(), id)
            }
        }
    }

    fn autowire(
        &self,
        owner: Option<&Handle>,
        name: &str,
        capability: &str,
        proxy: Option<&ProxyFn>,
    ) -> DiResult<AnyArc> {
        let overrides = &self.inner.overrides;
        let wired = owner.and_then(|handle| {
            overrides
                .lookup(handle, name)
                .or_else(|| overrides.lookup(handle, capability))
        });

        match wired {
            Some(Arg::Value(value)) => Ok(value),
            Some(Arg::Ref(reference)) => {
                let id = referenced_id(Some(capability), &reference)?;
                self.deliver(proxy, id)
            }
            None => self.deliver(proxy, capability.to_string()),
        }
    }

    fn deliver(&self, proxy: Option<&ProxyFn>, id: String) -> DiResult<AnyArc> {
        match proxy {
            Some(proxy) => Ok(proxy(self, id)),
            None => self.get(&id),
        }
    }

    /// Resolves the declared property `property` of the object behind
    /// `owner`, honoring the overrides recorded when it was made.
    ///
    /// # Errors
    ///
    /// [`DiError::TypeHint`] if the owner's class declares no capability for
    /// the property.
    pub fn inject(&self, owner: &Handle, property: &str) -> DiResult<AnyArc> {
        let capability = self
            .inner
            .types
            .descriptor(owner.class())
            .and_then(|descriptor| descriptor.capability(property).map(str::to_string))
            .ok_or_else(|| DiError::TypeHint {
                class: owner.class().to_string(),
                property: property.to_string(),
            })?;
        self.autowire(Some(owner), property, &capability, None)
    }

    /// Whether `id` can be resolved without constructing anything.
    pub fn has(&self, id: &str) -> bool {
        if self.inner.instances.read().contains_key(id)
            || self.inner.definitions.read().contains_key(id)
        {
            return true;
        }
        match Identifier::parse(id) {
            Ok(Identifier::Alias(target)) => self.has(&target),
            Ok(Identifier::Plain(class)) => {
                self.type_for(&class).is_ok() && !self.served_by_factory(&class)
            }
            _ => false,
        }
    }

    /// Registers or replaces the definition of `id`.
    ///
    /// # Errors
    ///
    /// - [`DiError::Misuse`] if `id` already produced a cached instance
    /// - [`DiError::NotFound`] if `id` is not a plain or named identifier
    pub fn define(&self, id: &str, definition: Definition) -> DiResult<()> {
        if let Identifier::Alias(_) = Identifier::parse(id)? {
            return Err(DiError::NotFound(id.to_string()));
        }
        // Held across the insert so nothing gets cached in between.
        let instances = self.inner.instances.read();
        if instances.contains_key(id) {
            return Err(DiError::Misuse(format!("{} already has a cached instance", id)));
        }
        tracing::debug!(id, kind = definition.kind(), "definition registered");
        self.inner.definitions.write().insert(id.to_string(), definition);
        drop(instances);
        Ok(())
    }

    /// Lazy proxy resolving `id` on first use.
    pub fn lazy<T: Any + Send + Sync>(&self, id: impl Into<String>) -> Lazy<T> {
        Lazy::new(self, id)
    }

    /// Injectable properties of `class`, inherited ones included.
    pub fn describe(&self, class: &str) -> Option<Arc<TypeDescriptor>> {
        self.inner.types.descriptor(class)
    }
}

impl std::fmt::Debug for Container {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Container")
            .field("definitions", &self.inner.definitions.read().len())
            .field("instances", &self.inner.instances.read().len())
            .field("types", &self.inner.types.len())
            .field("scheduler", &self.inner.scheduler)
            .finish()
    }
}

/// Identifier an [`Arg::Ref`] points at.
///
/// `#name` appends the variant to the capability's base type; `@id` and
/// plain strings name the identifier directly.
fn referenced_id(capability: Option<&str>, reference: &str) -> DiResult<String> {
    if reference.starts_with(VARIANT_SIGIL) {
        let capability = capability.ok_or_else(|| DiError::NotFound(reference.to_string()))?;
        let base = Identifier::parse(capability)?.base().to_string();
        return Ok(format!("{}{}", base, reference));
    }
    Ok(reference
        .strip_prefix(ALIAS_SIGIL)
        .unwrap_or(reference)
        .to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_referenced_id() {
        assert_eq!(referenced_id(Some("DbInterface"), "#replica").unwrap(), "DbInterface#replica");
        assert_eq!(
            referenced_id(Some("DbInterface#users"), "#replica").unwrap(),
            "DbInterface#replica"
        );
        assert_eq!(referenced_id(Some("DbInterface"), "@Audit").unwrap(), "Audit");
        assert_eq!(referenced_id(None, "Audit").unwrap(), "Audit");
        assert!(referenced_id(None, "#replica").is_err());
    }

    #[test]
    fn test_container_is_send_sync() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<Container>();
        assert_send_sync::<WeakContainer>();
    }

    #[test]
    fn test_define_after_resolution_is_misuse() {
        let container = ContainerBuilder::new().instance("Port", 80u16).build();
        container.define("Host", Definition::instance("a".to_string())).unwrap();
        container.get("Port").unwrap();
        assert!(matches!(
            container.define("Port", Definition::instance(81u16)),
            Err(DiError::Misuse(_))
        ));
        assert!(matches!(
            container.define("@Port", Definition::instance(81u16)),
            Err(DiError::NotFound(_))
        ));
    }
}
