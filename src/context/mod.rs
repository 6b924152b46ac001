//! Context propagation: per-component, per-execution-unit state.
//!
//! A [`Contextor`] maps a `(component, execution unit)` pair to a lazily
//! created context object. Without a cooperative scheduler there is one
//! flat store for the whole process. With one, every unit has its own store
//! and a child unit inherits its parent's context by reference, unless the
//! context type is inseparable.

use std::any::Any;
use std::collections::HashMap;
use std::sync::Arc;

use parking_lot::{Mutex, RwLock};

use crate::component::Component;
use crate::error::{DiError, DiResult};
use crate::params::{downcast, AnyArc};

mod registry;
pub mod unit;

pub use registry::{ContextRegistry, ContextState, ContextType, CONTEXT_SUFFIX};
pub use unit::{Scheduler, UnitId};

use registry::ContextSlot;
use unit::UnitState;

/// Context propagator.
///
/// # Examples
///
/// ```
/// use ferrous_wire::{
///     Component, ContextRegistry, ContextState, ContextType, Contextor, Handle, Scheduler,
/// };
/// use std::sync::{Arc, Mutex};
///
/// #[derive(Default)]
/// struct RequestContext {
///     path: Mutex<String>,
/// }
/// impl ContextState for RequestContext {}
///
/// struct Request {
///     handle: Handle,
/// }
/// impl Component for Request {
///     fn handle(&self) -> &Handle {
///         &self.handle
///     }
/// }
///
/// let contextor = Contextor::new(
///     Scheduler::Inactive,
///     ContextRegistry::new().register(ContextType::of::<RequestContext>("RequestContext")),
/// );
/// let request = Request { handle: Handle::new("Request") };
///
/// let ctx = contextor.context::<RequestContext>(&request).unwrap();
/// *ctx.path.lock().unwrap() = "/users".into();
///
/// let again = contextor.context::<RequestContext>(&request).unwrap();
/// assert!(Arc::ptr_eq(&ctx, &again));
/// assert_eq!(*again.path.lock().unwrap(), "/users");
/// ```
pub struct Contextor {
    scheduler: Scheduler,
    registry: ContextRegistry,
    /// Memoized class -> context type pairing
    pairings: RwLock<HashMap<String, Option<ContextType>>>,
    /// Process-wide store used when no scheduler is active
    flat: Mutex<HashMap<u64, ContextSlot>>,
}

impl Contextor {
    pub fn new(scheduler: Scheduler, registry: ContextRegistry) -> Self {
        tracing::debug!(?scheduler, context_types = registry.len(), "contextor created");
        Self {
            scheduler,
            registry,
            pairings: RwLock::new(HashMap::new()),
            flat: Mutex::new(HashMap::new()),
        }
    }

    pub fn scheduler(&self) -> Scheduler {
        self.scheduler
    }

    /// Context type paired with the component's class.
    ///
    /// Walks the class and its ancestors outward, testing `<Class>Context`
    /// at each level. Memoized per concrete class.
    pub fn find_context_type(&self, component: &dyn Component) -> Option<ContextType> {
        let class = component.handle().class();
        if let Some(found) = self.pairings.read().get(class) {
            return found.clone();
        }

        let found = std::iter::once(class)
            .chain(component.ancestors().iter().copied())
            .find_map(|level| self.registry.get(&format!("{}{}", level, CONTEXT_SUFFIX)).cloned());
        tracing::trace!(
            class,
            context = found.as_ref().map(ContextType::name),
            "context pairing resolved"
        );

        self.pairings
            .write()
            .entry(class.to_string())
            .or_insert(found)
            .clone()
    }

    /// Builds a new context for the component, without caching it.
    pub fn create_context(&self, component: &dyn Component) -> DiResult<AnyArc> {
        self.create_slot(component).map(|slot| slot.value)
    }

    fn create_slot(&self, component: &dyn Component) -> DiResult<ContextSlot> {
        if let Some(custom) = component.custom_context() {
            return Ok(custom.instantiate());
        }
        self.find_context_type(component)
            .map(|context| context.instantiate())
            .ok_or_else(|| DiError::ContextNotFound(component.handle().class().to_string()))
    }

    /// Whether a context can be produced for the component. Creates nothing.
    pub fn has_context(&self, component: &dyn Component) -> bool {
        component.custom_context().is_some() || self.find_context_type(component).is_some()
    }

    /// The component's context for the current execution unit, downcast to `T`.
    pub fn context<T: Any + Send + Sync>(&self, component: &dyn Component) -> DiResult<Arc<T>> {
        let value = self.context_any(component)?;
        downcast(value, component.handle().class())
    }

    /// The component's context for the current execution unit.
    ///
    /// Created on first access and stable for the unit's lifetime. A child
    /// unit first looks in its parent's store: a shareable context found
    /// there is adopted by reference, an inseparable one is replaced by a
    /// fresh instance. A child whose parent already finished starts fresh.
    /// Only the current unit's store is ever written.
    pub fn context_any(&self, component: &dyn Component) -> DiResult<AnyArc> {
        let key = component.handle().id();

        let unit = if self.scheduler.is_active() {
            unit::current_state()
        } else {
            None
        };
        let Some(unit) = unit else {
            return self.flat_context(component, key);
        };

        if let Some(slot) = unit.slot(key) {
            return Ok(slot.value);
        }

        let slot = match unit.parent() {
            Some(parent) => self.inherit(component, key, &unit, &parent)?,
            None => {
                if !unit.is_root() {
                    tracing::trace!(
                        unit = unit.id().get(),
                        "parent unit finished; creating context"
                    );
                }
                self.create_slot(component)?
            }
        };
        Ok(unit.store_slot(key, slot).value)
    }

    fn inherit(
        &self,
        component: &dyn Component,
        key: u64,
        unit: &UnitState,
        parent: &UnitState,
    ) -> DiResult<ContextSlot> {
        match parent.slot(key) {
            Some(candidate) if candidate.inseparable => {
                tracing::debug!(
                    class = component.handle().class(),
                    unit = unit.id().get(),
                    parent = parent.id().get(),
                    "inseparable context; creating a private one"
                );
                self.create_slot(component)
            }
            Some(candidate) => {
                tracing::trace!(
                    class = component.handle().class(),
                    unit = unit.id().get(),
                    parent = parent.id().get(),
                    "sharing parent context"
                );
                Ok(candidate)
            }
            None => self.create_slot(component),
        }
    }

    fn flat_context(&self, component: &dyn Component, key: u64) -> DiResult<AnyArc> {
        if let Some(slot) = self.flat.lock().get(&key) {
            return Ok(slot.value.clone());
        }
        let slot = self.create_slot(component)?;
        Ok(self.flat.lock().entry(key).or_insert(slot).value.clone())
    }

    /// Drops every context cached for the current execution unit.
    ///
    /// Without an active scheduler (or outside any unit) this clears the
    /// process-wide store. Other units are untouched.
    pub fn reset_contexts(&self) {
        let unit = if self.scheduler.is_active() {
            unit::current_state()
        } else {
            None
        };
        match unit {
            Some(unit) => {
                let dropped = unit.clear();
                tracing::debug!(unit = unit.id().get(), dropped, "unit contexts reset");
            }
            None => {
                let drained = std::mem::take(&mut *self.flat.lock());
                tracing::debug!(dropped = drained.len(), "process contexts reset");
            }
        }
    }
}

impl std::fmt::Debug for Contextor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Contextor")
            .field("scheduler", &self.scheduler)
            .field("registry", &self.registry)
            .finish()
    }
}
