//! Bootstrap-time assembly of a [`Container`].

use std::any::Any;
use std::collections::HashMap;
use std::sync::Arc;

use parking_lot::RwLock;

use super::{Container, ContainerInner};
use crate::context::{ContextRegistry, Contextor, Scheduler};
use crate::definition::Definition;
use crate::error::{DiError, DiResult};
use crate::factory::{factory_type_name, ServiceFactory};
use crate::handle::OverrideMap;
use crate::identifier::{Identifier, DEFAULT_VARIANT, VARIANT_SIGIL};
use crate::introspect::{TypeDef, TypeRegistry};
use crate::observer::{Observers, ResolveObserver};
use crate::params::{AnyArc, Params};

/// Identifier under which the container exposes its context propagator.
pub const CONTEXTOR_ID: &str = "Contextor";

/// Collects definitions, types and factories, then builds a [`Container`].
///
/// Definitions are applied in registration order; a later definition of the
/// same identifier replaces the earlier one.
///
/// # Examples
///
/// ```
/// use ferrous_wire::{ContainerBuilder, Scheduler};
///
/// let container = ContainerBuilder::new()
///     .instance("AppName", "billing".to_string())
///     .define_str("Name", "@AppName")
///     .scheduler(Scheduler::Cooperative)
///     .build();
///
/// assert_eq!(*container.get_as::<String>("Name").unwrap(), "billing");
/// assert!(container.has("AppName"));
/// ```
#[derive(Default)]
pub struct ContainerBuilder {
    definitions: Vec<(String, DiResult<Definition>)>,
    types: TypeRegistry,
    observers: Observers,
    scheduler: Scheduler,
    contexts: Option<ContextRegistry>,
}

impl ContainerBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn define(mut self, id: impl Into<String>, definition: Definition) -> Self {
        self.definitions.push((id.into(), Ok(definition)));
        self
    }

    /// Defines `id` from the string form of a definition (`"@Logger"`,
    /// `"#replica"`, `"Clock::utc"`, `"ConsoleLogger"`).
    pub fn define_str(mut self, id: impl Into<String>, raw: &str) -> Self {
        self.definitions.push((id.into(), Definition::parse(raw)));
        self
    }

    pub fn instance<T: Any + Send + Sync>(self, id: impl Into<String>, value: T) -> Self {
        self.define(id, Definition::instance(value))
    }

    /// Defines `id` as `make(class, params)`.
    pub fn class(self, id: impl Into<String>, class: impl Into<String>, params: Params) -> Self {
        self.define(id, Definition::class(class, params))
    }

    pub fn register_type(mut self, def: TypeDef) -> Self {
        tracing::trace!(class = def.name(), "type registered");
        self.types.insert(def);
        self
    }

    /// Binds `factory` to `interface`.
    ///
    /// Registers the factory type (`DbInterface` -> `DbFactory`), every
    /// variant as `interface#name`, and makes `interface` an alias of
    /// `interface#default` when a `default` variant exists.
    pub fn factory(
        mut self,
        interface: impl Into<String>,
        factory: Arc<dyn ServiceFactory>,
    ) -> Self {
        let interface = interface.into();
        let variants = factory.variants();
        tracing::debug!(
            interface = %interface,
            variants = variants.len(),
            "registering factory variants"
        );

        self.types.insert(TypeDef::factory(factory_type_name(&interface), factory));
        let mut has_default = false;
        for (name, definition) in variants {
            has_default |= name == DEFAULT_VARIANT;
            self = self.define(format!("{}{}{}", interface, VARIANT_SIGIL, name), definition);
        }
        if has_default {
            self = self.define(interface, Definition::Variant(DEFAULT_VARIANT.to_string()));
        }
        self
    }

    pub fn observer(mut self, observer: Arc<dyn ResolveObserver>) -> Self {
        self.observers.add(observer);
        self
    }

    /// Scheduler model shared by the container and its context propagator.
    pub fn scheduler(mut self, scheduler: Scheduler) -> Self {
        self.scheduler = scheduler;
        self
    }

    /// Context types for the container's [`Contextor`].
    pub fn contexts(mut self, registry: ContextRegistry) -> Self {
        self.contexts = Some(registry);
        self
    }

    /// Adds every definition of a JSON document.
    #[cfg(feature = "config")]
    pub fn definitions_from_json(self, json: &str) -> DiResult<Self> {
        Ok(self.definitions_from_config(crate::config::DefinitionsConfig::from_json(json)?))
    }

    /// Adds every definition of a YAML document.
    #[cfg(feature = "config")]
    pub fn definitions_from_yaml(self, yaml: &str) -> DiResult<Self> {
        Ok(self.definitions_from_config(crate::config::DefinitionsConfig::from_yaml(yaml)?))
    }

    #[cfg(feature = "config")]
    pub fn definitions_from_config(mut self, config: crate::config::DefinitionsConfig) -> Self {
        for (id, definition) in config.into_definitions() {
            self.definitions.push((id, definition));
        }
        self
    }

    /// Builds the container, failing on the first invalid definition.
    pub fn try_build(mut self) -> DiResult<Container> {
        let pending = std::mem::take(&mut self.definitions);
        let mut definitions = HashMap::with_capacity(pending.len() + 1);
        for (id, definition) in pending {
            let definition = validate(&id, definition)?;
            definitions.insert(id, definition);
        }
        Ok(self.finish(definitions))
    }

    /// Builds the container. Invalid definitions are logged and skipped.
    pub fn build(mut self) -> Container {
        let pending = std::mem::take(&mut self.definitions);
        let mut definitions = HashMap::with_capacity(pending.len() + 1);
        for (id, definition) in pending {
            match validate(&id, definition) {
                Ok(definition) => {
                    definitions.insert(id, definition);
                }
                Err(err) => tracing::warn!(id = %id, error = %err, "skipping invalid definition"),
            }
        }
        self.finish(definitions)
    }

    fn finish(self, mut definitions: HashMap<String, Definition>) -> Container {
        let contextor = self
            .contexts
            .map(|registry| Arc::new(Contextor::new(self.scheduler, registry)));
        if let Some(contextor) = &contextor {
            definitions
                .entry(CONTEXTOR_ID.to_string())
                .or_insert_with(|| Definition::Instance(contextor.clone() as AnyArc));
        }

        tracing::debug!(
            definitions = definitions.len(),
            types = self.types.len(),
            scheduler = ?self.scheduler,
            "container built"
        );

        Container {
            inner: Arc::new(ContainerInner {
                definitions: RwLock::new(definitions),
                instances: RwLock::new(HashMap::new()),
                types: self.types,
                overrides: Arc::new(OverrideMap::default()),
                observers: self.observers,
                scheduler: self.scheduler,
                contextor,
            }),
        }
    }
}

/// Definition keys must be plain or named identifiers.
fn validate(id: &str, definition: DiResult<Definition>) -> DiResult<Definition> {
    match Identifier::parse(id)? {
        Identifier::Alias(_) => Err(DiError::NotFound(id.to_string())),
        _ => definition,
    }
}
