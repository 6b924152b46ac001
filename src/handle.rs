//! Instance handles and the per-instance dependency override map.

use std::collections::HashMap;
use std::fmt;
use std::hash::{Hash, Hasher};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Weak};

use parking_lot::Mutex;

use crate::params::{Arg, Params};

static NEXT_HANDLE: AtomicU64 = AtomicU64::new(1);

/// Identity of a constructed object.
///
/// `make` assigns a handle before running the constructor, records any
/// surplus named parameters against it, and passes it to the constructor.
/// Objects keep their handle so later `inject` calls and context lookups can
/// find them. When the last clone of a handle drops, its overrides are
/// removed from the container.
///
/// # Examples
///
/// ```rust
/// use ferrous_wire::Handle;
///
/// let a = Handle::new("RequestHandler");
/// let b = Handle::new("RequestHandler");
/// assert_eq!(a.class(), "RequestHandler");
/// assert_ne!(a, b);
/// assert_eq!(a, a.clone());
/// ```
#[derive(Clone)]
pub struct Handle {
    inner: Arc<HandleInner>,
}

struct HandleInner {
    id: u64,
    class: Arc<str>,
    overrides: Weak<OverrideMap>,
}

impl Handle {
    /// Creates a handle for an object built outside the container.
    pub fn new(class: impl Into<Arc<str>>) -> Self {
        Self::with_overrides(class.into(), Weak::new())
    }

    pub(crate) fn attached(class: Arc<str>, overrides: &Arc<OverrideMap>) -> Self {
        Self::with_overrides(class, Arc::downgrade(overrides))
    }

    fn with_overrides(class: Arc<str>, overrides: Weak<OverrideMap>) -> Self {
        Self {
            inner: Arc::new(HandleInner {
                id: NEXT_HANDLE.fetch_add(1, Ordering::Relaxed),
                class,
                overrides,
            }),
        }
    }

    pub fn id(&self) -> u64 {
        self.inner.id
    }

    /// Exact class of the object.
    pub fn class(&self) -> &str {
        &self.inner.class
    }
}

impl Drop for HandleInner {
    fn drop(&mut self) {
        if let Some(map) = self.overrides.upgrade() {
            map.release(self.id);
        }
    }
}

impl PartialEq for Handle {
    fn eq(&self, other: &Self) -> bool {
        self.inner.id == other.inner.id
    }
}

impl Eq for Handle {}

impl Hash for Handle {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.inner.id.hash(state);
    }
}

impl fmt::Debug for Handle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Handle({}#{})", self.inner.class, self.inner.id)
    }
}

/// Named and typed values recorded at creation time, keyed by handle id.
#[derive(Default)]
pub(crate) struct OverrideMap {
    entries: Mutex<HashMap<u64, HashMap<String, Arg>>>,
}

impl OverrideMap {
    pub(crate) fn record(&self, handle: &Handle, params: Params) {
        if params.named_iter().next().is_none() {
            return;
        }
        let mut entries = self.entries.lock();
        let slot = entries.entry(handle.id()).or_default();
        for (name, arg) in params.named_iter() {
            slot.insert(name.to_string(), arg.clone());
        }
    }

    /// Override for `key` (a parameter name or a capability type).
    pub(crate) fn lookup(&self, handle: &Handle, key: &str) -> Option<Arg> {
        self.entries.lock().get(&handle.id()).and_then(|m| m.get(key).cloned())
    }

    fn release(&self, id: u64) {
        // Dropped outside the lock: values may own handles of their own.
        let removed = self.entries.lock().remove(&id);
        drop(removed);
    }

    #[cfg(test)]
    pub(crate) fn len(&self) -> usize {
        self.entries.lock().len()
    }
}
