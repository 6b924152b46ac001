//! Execution units: tokio tasks that remember the unit that spawned them.
//!
//! A unit is entered with [`root`] (or [`spawn_root`]) and children are
//! started with [`spawn`]. Each unit owns its local context store; the store
//! lives in the task-local unit state, so it is released together with the
//! task rather than by the propagator. Children refer to their parent weakly
//! and never keep a finished parent's store alive.

use std::collections::HashMap;
use std::future::Future;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Weak};

use parking_lot::Mutex;
use tokio::task::JoinHandle;

use super::registry::ContextSlot;

/// Whether a cooperative scheduler runs the process.
///
/// Decided once at startup and passed to every consumer that scopes state by
/// execution unit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Scheduler {
    /// Plain process: one flat context store
    #[default]
    Inactive,
    /// Tasks started through this module get per-unit context stores
    Cooperative,
}

impl Scheduler {
    pub fn is_active(self) -> bool {
        self == Scheduler::Cooperative
    }
}

/// Unique id of an execution unit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct UnitId(u64);

impl UnitId {
    pub fn get(self) -> u64 {
        self.0
    }
}

static NEXT_UNIT: AtomicU64 = AtomicU64::new(1);

/// Link from a child unit to the unit that spawned it.
struct ParentLink {
    id: UnitId,
    state: Weak<UnitState>,
}

pub(crate) struct UnitState {
    id: UnitId,
    parent: Option<ParentLink>,
    store: Mutex<HashMap<u64, ContextSlot>>,
}

impl UnitState {
    fn new(parent: Option<&Arc<UnitState>>) -> Arc<Self> {
        Arc::new(Self {
            id: UnitId(NEXT_UNIT.fetch_add(1, Ordering::Relaxed)),
            parent: parent.map(|p| ParentLink {
                id: p.id,
                state: Arc::downgrade(p),
            }),
            store: Mutex::new(HashMap::new()),
        })
    }

    pub(crate) fn id(&self) -> UnitId {
        self.id
    }

    pub(crate) fn is_root(&self) -> bool {
        self.parent.is_none()
    }

    /// The parent's state, if the parent unit is still running.
    pub(crate) fn parent(&self) -> Option<Arc<UnitState>> {
        self.parent.as_ref().and_then(|link| link.state.upgrade())
    }

    pub(crate) fn slot(&self, key: u64) -> Option<ContextSlot> {
        self.store.lock().get(&key).cloned()
    }

    /// Stores `slot` unless one is already present; returns the stored slot.
    pub(crate) fn store_slot(&self, key: u64, slot: ContextSlot) -> ContextSlot {
        self.store.lock().entry(key).or_insert(slot).clone()
    }

    pub(crate) fn clear(&self) -> usize {
        let drained = std::mem::take(&mut *self.store.lock());
        drained.len()
    }
}

tokio::task_local! {
    static CURRENT_UNIT: Arc<UnitState>;
}

pub(crate) fn current_state() -> Option<Arc<UnitState>> {
    CURRENT_UNIT.try_with(Arc::clone).ok()
}

/// Id of the unit the caller runs in.
pub fn current() -> Option<UnitId> {
    CURRENT_UNIT.try_with(|unit| unit.id).ok()
}

/// Id of the unit that spawned the caller's unit.
pub fn parent() -> Option<UnitId> {
    CURRENT_UNIT
        .try_with(|unit| unit.parent.as_ref().map(|link| link.id))
        .ok()
        .flatten()
}

/// Runs `future` as a new root unit.
pub async fn root<F: Future>(future: F) -> F::Output {
    CURRENT_UNIT.scope(UnitState::new(None), future).await
}

/// Runs `f` synchronously as a new root unit.
pub fn root_sync<R>(f: impl FnOnce() -> R) -> R {
    CURRENT_UNIT.sync_scope(UnitState::new(None), f)
}

/// Spawns `future` as a child of the current unit.
///
/// Outside any unit the spawned task becomes a root unit.
///
/// # Examples
///
/// ```
/// use ferrous_wire::unit;
///
/// # #[tokio::main(flavor = "current_thread")]
/// # async fn main() {
/// unit::root(async {
///     let me = unit::current();
///     let child_parent = unit::spawn(async { unit::parent() }).await.unwrap();
///     assert_eq!(child_parent, me);
/// })
/// .await;
/// # }
/// ```
pub fn spawn<F>(future: F) -> JoinHandle<F::Output>
where
    F: Future + Send + 'static,
    F::Output: Send + 'static,
{
    let unit = UnitState::new(current_state().as_ref());
    tokio::spawn(CURRENT_UNIT.scope(unit, future))
}

/// Spawns `future` as a new root unit regardless of the caller.
pub fn spawn_root<F>(future: F) -> JoinHandle<F::Output>
where
    F: Future + Send + 'static,
    F::Output: Send + 'static,
{
    tokio::spawn(CURRENT_UNIT.scope(UnitState::new(None), future))
}
