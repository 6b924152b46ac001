//! Diagnostic observers for resolution events.

use std::sync::Arc;
use std::time::Duration;

use crate::error::DiError;

/// Observer trait for resolution events.
///
/// Called synchronously on cache misses only; a cached `get` is silent.
/// Keep implementations lightweight.
///
/// # Examples
///
/// ```
/// use ferrous_wire::{ContainerBuilder, DiError, ResolveObserver};
/// use std::sync::{Arc, Mutex};
/// use std::time::Duration;
///
/// #[derive(Default)]
/// struct Recorder(Mutex<Vec<String>>);
///
/// impl ResolveObserver for Recorder {
///     fn resolving(&self, id: &str) {
///         self.0.lock().unwrap().push(format!("start {id}"));
///     }
///     fn resolved(&self, id: &str, _duration: Duration) {
///         self.0.lock().unwrap().push(format!("done {id}"));
///     }
///     fn failed(&self, id: &str, _error: &DiError) {
///         self.0.lock().unwrap().push(format!("fail {id}"));
///     }
/// }
///
/// let recorder = Arc::new(Recorder::default());
/// let container = ContainerBuilder::new()
///     .instance("Port", 8080u16)
///     .observer(recorder.clone())
///     .build();
///
/// container.get("Port").unwrap();
/// container.get("Port").unwrap();
/// assert_eq!(*recorder.0.lock().unwrap(), vec!["start Port", "done Port"]);
/// ```
pub trait ResolveObserver: Send + Sync {
    /// Called before an uncached identifier is resolved.
    fn resolving(&self, id: &str);

    /// Called after the instance was produced and cached.
    fn resolved(&self, id: &str, duration: Duration);

    /// Called when resolution failed.
    fn failed(&self, id: &str, error: &DiError);
}

/// Registered observers.
#[derive(Default, Clone)]
pub(crate) struct Observers {
    observers: Vec<Arc<dyn ResolveObserver>>,
}

impl Observers {
    pub(crate) fn add(&mut self, observer: Arc<dyn ResolveObserver>) {
        self.observers.push(observer);
    }

    #[inline]
    pub(crate) fn has_observers(&self) -> bool {
        !self.observers.is_empty()
    }

    #[inline]
    pub(crate) fn resolving(&self, id: &str) {
        for observer in &self.observers {
            observer.resolving(id);
        }
    }

    #[inline]
    pub(crate) fn resolved(&self, id: &str, duration: Duration) {
        for observer in &self.observers {
            observer.resolved(id, duration);
        }
    }

    #[inline]
    pub(crate) fn failed(&self, id: &str, error: &DiError) {
        for observer in &self.observers {
            observer.failed(id, error);
        }
    }
}

/// Built-in observer forwarding events to `tracing`.
///
/// # Examples
///
/// ```
/// use ferrous_wire::{ContainerBuilder, TracingObserver};
/// use std::sync::Arc;
///
/// let container = ContainerBuilder::new()
///     .observer(Arc::new(TracingObserver::new()))
///     .build();
/// ```
#[derive(Debug, Clone)]
pub struct TracingObserver {
    target: &'static str,
}

impl TracingObserver {
    pub fn new() -> Self {
        Self { target: "ferrous_wire" }
    }

    /// Label attached to every event as the `source` field.
    pub fn with_target(target: &'static str) -> Self {
        Self { target }
    }
}

impl Default for TracingObserver {
    fn default() -> Self {
        Self::new()
    }
}

impl ResolveObserver for TracingObserver {
    fn resolving(&self, id: &str) {
        tracing::debug!(source = self.target, id, "resolving");
    }

    fn resolved(&self, id: &str, duration: Duration) {
        tracing::debug!(
            source = self.target,
            id,
            elapsed_us = duration.as_micros() as u64,
            "resolved"
        );
    }

    fn failed(&self, id: &str, error: &DiError) {
        tracing::warn!(source = self.target, id, %error, "resolution failed");
    }
}
