//! # ferrous-wire
//!
//! String-keyed dependency injection with named variants, lazy proxies and
//! autowiring, plus per-execution-unit context propagation for services
//! shared across cooperatively scheduled tasks.
//!
//! ## Features
//!
//! - **Identifier resolution**: plain type names, `@alias` redirects and
//!   `Base#variant` named instances, each cached once per identifier
//! - **Autowiring**: constructor and callable parameters resolved from their
//!   capability types, with positional, named and per-instance overrides
//! - **Factories**: one factory per interface registers every named variant
//! - **Lazy proxies**: defer resolution of rarely used dependencies
//! - **Circular dependency detection**: cycles fail with the full path
//! - **Context propagation**: per-component state scoped to tokio tasks,
//!   shared with child tasks unless the context type is inseparable
//!
//! ## Quick Start
//!
//! ```rust
//! use ferrous_wire::{Constructor, ContainerBuilder, Param, TypeDef};
//! use std::sync::Arc;
//!
//! struct Database {
//!     url: String,
//! }
//!
//! struct UserService {
//!     db: Arc<Database>,
//! }
//!
//! let container = ContainerBuilder::new()
//!     .instance("Database", Database { url: "postgres://localhost".to_string() })
//!     .register_type(TypeDef::concrete(
//!         "UserService",
//!         Constructor::new(vec![Param::typed("db", "Database")], |_, _, args| {
//!             Ok(UserService { db: args.get::<Database>(0)? })
//!         }),
//!     ))
//!     .build();
//!
//! let users = container.get_as::<UserService>("UserService").unwrap();
//! assert_eq!(users.db.url, "postgres://localhost");
//!
//! // Same identifier, same instance.
//! let again = container.get_as::<UserService>("UserService").unwrap();
//! assert!(Arc::ptr_eq(&users, &again));
//! ```
//!
//! ## Named Variants
//!
//! ```rust
//! use ferrous_wire::ContainerBuilder;
//! use std::sync::Arc;
//!
//! struct Connection(&'static str);
//!
//! let container = ContainerBuilder::new()
//!     .instance("Db#primary", Connection("primary"))
//!     .instance("Db#replica", Connection("replica"))
//!     .define_str("Db", "#primary")
//!     .build();
//!
//! let primary = container.get_as::<Connection>("Db").unwrap();
//! assert_eq!(primary.0, "primary");
//! let replica = container.get("Db#replica").unwrap();
//! assert!(!Arc::ptr_eq(&container.get("Db#primary").unwrap(), &replica));
//! ```
//!
//! ## Context Propagation
//!
//! ```rust
//! use ferrous_wire::{
//!     unit, Component, ContextRegistry, ContextState, ContextType, Contextor, Handle, Scheduler,
//! };
//! use std::sync::Mutex;
//!
//! #[derive(Default)]
//! struct RouterContext {
//!     route: Mutex<Option<String>>,
//! }
//! impl ContextState for RouterContext {}
//!
//! struct Router {
//!     handle: Handle,
//! }
//! impl Component for Router {
//!     fn handle(&self) -> &Handle {
//!         &self.handle
//!     }
//! }
//!
//! # #[tokio::main(flavor = "current_thread")]
//! # async fn main() {
//! let contextor = std::sync::Arc::new(Contextor::new(
//!     Scheduler::Cooperative,
//!     ContextRegistry::new().register(ContextType::of::<RouterContext>("RouterContext")),
//! ));
//! let router = std::sync::Arc::new(Router { handle: Handle::new("Router") });
//!
//! unit::root(async move {
//!     let ctx = contextor.context::<RouterContext>(&*router).unwrap();
//!     *ctx.route.lock().unwrap() = Some("/users".into());
//!
//!     // A child task sees the parent's context.
//!     let seen = unit::spawn({
//!         let contextor = contextor.clone();
//!         let router = router.clone();
//!         async move {
//!             let ctx = contextor.context::<RouterContext>(&*router).unwrap();
//!             let route = ctx.route.lock().unwrap().clone();
//!             route
//!         }
//!     })
//!     .await
//!     .unwrap();
//!     assert_eq!(seen.as_deref(), Some("/users"));
//! })
//! .await;
//! # }
//! ```

// Module declarations
pub mod callable;
pub mod component;
pub mod container;
pub mod context;
pub mod definition;
pub mod error;
pub mod factory;
pub mod handle;
pub mod identifier;
pub mod introspect;
pub mod lazy;
pub mod observer;
pub mod params;

#[cfg(feature = "config")]
pub mod config;

// Internal modules
mod internal;

// Re-exports
pub use callable::{Callable, Param};
pub use component::Component;
pub use container::{Container, ContainerBuilder, WeakContainer};
pub use context::{unit, ContextRegistry, ContextState, ContextType, Contextor, Scheduler, UnitId};
pub use definition::Definition;
pub use error::{DiError, DiResult};
pub use factory::{factory_type_name, ServiceFactory};
pub use handle::Handle;
pub use identifier::Identifier;
pub use introspect::{Constructor, Method, TypeDef, TypeDescriptor, TypeKind};
pub use lazy::{Autowired, Lazy};
pub use observer::{ResolveObserver, TracingObserver};
pub use params::{AnyArc, Arg, Args, Params};

#[cfg(feature = "config")]
pub use config::{DefinitionConfig, DefinitionsConfig};
