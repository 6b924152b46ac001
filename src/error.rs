//! Error types for the service resolver and context propagator.

use thiserror::Error;

/// Resolution and context errors
///
/// Every variant is a programming or configuration error. Nothing in this
/// crate retries them; they are surfaced synchronously to the caller.
///
/// # Examples
///
/// ```rust
/// use ferrous_wire::{ContainerBuilder, DiError};
///
/// let container = ContainerBuilder::new().build();
/// match container.get("Missing") {
///     Err(DiError::NotFound(id)) => assert_eq!(id, "Missing"),
///     _ => unreachable!(),
/// }
/// ```
///
/// ```rust
/// use ferrous_wire::DiError;
///
/// let missing = DiError::MissingParameters {
///     callable: "report".to_string(),
///     missing: vec!["from".to_string(), "to".to_string()],
/// };
/// assert_eq!(missing.to_string(), "Missing parameters for report: from, to");
///
/// let circular = DiError::Circular(vec!["A".into(), "B".into(), "A".into()]);
/// assert_eq!(circular.to_string(), "Circular dependency: A -> B -> A");
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DiError {
    /// Identifier, class or interface has neither a definition nor a constructible type
    #[error("Service not found: {0}")]
    NotFound(String),
    /// Parameters of a callable that no precedence rule could satisfy
    #[error("Missing parameters for {callable}: {}", .missing.join(", "))]
    MissingParameters {
        callable: String,
        missing: Vec<String>,
    },
    /// Property passed to `inject` has no discoverable capability type
    #[error("No type hint for property {class}.{property}")]
    TypeHint { class: String, property: String },
    /// No context type can be paired with the component's class
    #[error("No context type paired with {0}")]
    ContextNotFound(String),
    /// Definition changed after its identifier produced an instance
    #[error("Definition misuse: {0}")]
    Misuse(String),
    /// Downcast of a resolved instance failed
    #[error("Type mismatch for: {0}")]
    TypeMismatch(String),
    /// Circular dependency detected (includes path)
    #[error("Circular dependency: {}", .0.join(" -> "))]
    Circular(Vec<String>),
    /// Maximum recursion depth exceeded
    #[error("Max depth {0} exceeded")]
    DepthExceeded(usize),
    /// Lazy proxy or autowired property outlived its container
    #[error("Container dropped before {0} was resolved")]
    ContainerDropped(String),
    /// Definitions document could not be parsed
    #[cfg(feature = "config")]
    #[error("Invalid definitions document: {0}")]
    Config(String),
}

/// Result type for resolver and context operations.
pub type DiResult<T> = Result<T, DiError>;
