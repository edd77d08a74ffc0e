//! Two-tier instance storage: a singleton tier for the container's lifetime
//! and a scoped tier keyed by (scope id, service key).
//!
//! No lock of this module is held while a user factory runs.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::thread;

use parking_lot::{Condvar, Mutex};
use tracing::debug;

use crate::error::{DiError, DiResult};
use crate::internal::{FastMap, WaitGraph};
use crate::key::ServiceKey;
use crate::lifetime::Lifetime;
use crate::registration::{AnyArc, Registration};
use crate::scope::{ScopeId, ScopeManager};

static NEXT_SLOT_ID: AtomicU64 = AtomicU64::new(1);

/// Per-key singleton cell. Later callers wait on `ready` while one caller builds.
struct SingletonSlot {
    id: u64,
    registration: u64,
    state: Mutex<SlotState>,
    ready: Condvar,
}

enum SlotState {
    Vacant,
    Building,
    Ready(AnyArc),
}

impl SingletonSlot {
    fn new(registration: u64) -> Self {
        Self {
            id: NEXT_SLOT_ID.fetch_add(1, Ordering::Relaxed),
            registration,
            state: Mutex::new(SlotState::Vacant),
            ready: Condvar::new(),
        }
    }
}

/// Returns the slot to `Vacant` unless the build was committed, so a failing
/// or panicking factory never strands waiters.
struct BuildGuard<'a> {
    slot: &'a SingletonSlot,
    waits: &'a Mutex<WaitGraph>,
    committed: bool,
}

impl BuildGuard<'_> {
    fn commit(mut self, value: AnyArc) {
        self.finish(SlotState::Ready(value));
        self.committed = true;
    }

    // Lock order: slot state, then wait graph.
    fn finish(&self, next: SlotState) {
        let mut state = self.slot.state.lock();
        *state = next;
        self.waits.lock().built(self.slot.id);
        drop(state);
        self.slot.ready.notify_all();
    }
}

impl Drop for BuildGuard<'_> {
    fn drop(&mut self) {
        if !self.committed {
            self.finish(SlotState::Vacant);
        }
    }
}

#[derive(Clone, PartialEq, Eq, Hash)]
struct ScopedKey {
    scope: ScopeId,
    key: ServiceKey,
}

struct ScopedEntry {
    registration: u64,
    value: AnyArc,
}

pub(crate) struct InstanceCache {
    singletons: Mutex<FastMap<ServiceKey, Arc<SingletonSlot>>>,
    scoped: Mutex<FastMap<ScopedKey, ScopedEntry>>,
    waits: Mutex<WaitGraph>,
}

impl InstanceCache {
    pub(crate) fn new() -> Self {
        Self {
            singletons: Mutex::new(FastMap::default()),
            scoped: Mutex::new(FastMap::default()),
            waits: Mutex::new(WaitGraph::default()),
        }
    }

    /// Returns the cached instance for `registration` or builds one with `factory`,
    /// storing it according to the registration's lifetime.
    ///
    /// Scoped instances are stored under the scope that was current when the
    /// lookup started, and only if that scope is still current once the factory
    /// returns; otherwise the fresh instance is handed back uncached.
    pub(crate) fn get_or_create<F>(
        &self,
        registration: &Registration,
        scopes: &ScopeManager,
        factory: F,
    ) -> DiResult<AnyArc>
    where
        F: FnOnce() -> DiResult<AnyArc>,
    {
        if !registration.lifetime.is_cached() {
            return factory();
        }
        match registration.lifetime {
            Lifetime::Singleton => self.singleton(registration, factory),
            _ => self.scoped(registration, scopes, factory),
        }
    }

    fn singleton_slot(&self, registration: &Registration) -> Arc<SingletonSlot> {
        let mut slots = self.singletons.lock();
        match slots.get(&registration.key) {
            Some(slot) if slot.registration == registration.id => slot.clone(),
            _ => {
                let slot = Arc::new(SingletonSlot::new(registration.id));
                slots.insert(registration.key.clone(), slot.clone());
                slot
            }
        }
    }

    fn singleton<F>(&self, registration: &Registration, factory: F) -> DiResult<AnyArc>
    where
        F: FnOnce() -> DiResult<AnyArc>,
    {
        let slot = self.singleton_slot(registration);
        let me = thread::current().id();

        {
            let mut state = slot.state.lock();
            loop {
                match &*state {
                    SlotState::Ready(value) => return Ok(value.clone()),
                    SlotState::Vacant => break,
                    SlotState::Building => {}
                }
                // Refuse to block on a build that is itself waiting on us,
                // directly or through other threads.
                self.waits.lock().wait_for(me, slot.id).map_err(DiError::Circular)?;
                slot.ready.wait(&mut state);
                self.waits.lock().stop_waiting(me);
            }
            *state = SlotState::Building;
            self.waits
                .lock()
                .building(slot.id, registration.key.display_name(), me);
        }

        let guard = BuildGuard {
            slot: &slot,
            waits: &self.waits,
            committed: false,
        };
        let value = factory()?;
        guard.commit(value.clone());
        Ok(value)
    }

    fn scoped<F>(
        &self,
        registration: &Registration,
        scopes: &ScopeManager,
        factory: F,
    ) -> DiResult<AnyArc>
    where
        F: FnOnce() -> DiResult<AnyArc>,
    {
        let scoped_key = ScopedKey {
            scope: scopes.current_scope(),
            key: registration.key.clone(),
        };

        if let Some(entry) = self.scoped.lock().get(&scoped_key) {
            if entry.registration == registration.id {
                return Ok(entry.value.clone());
            }
        }

        let value = factory()?;

        let mut scoped = self.scoped.lock();
        if scopes.current_scope() != scoped_key.scope {
            debug!(
                service = %registration.key,
                scope = %scoped_key.scope,
                "scope superseded during construction; instance not cached"
            );
            return Ok(value);
        }
        match scoped.get(&scoped_key) {
            // Another caller in the same scope got there first.
            Some(entry) if entry.registration == registration.id => Ok(entry.value.clone()),
            _ => {
                scoped.insert(
                    scoped_key,
                    ScopedEntry {
                        registration: registration.id,
                        value: value.clone(),
                    },
                );
                Ok(value)
            }
        }
    }

    /// Supersedes the active scope and drops every scoped entry of older scopes.
    ///
    /// The swap and the eviction happen under the scoped-tier lock, so
    /// concurrent scope changes can never evict an entry of the scope that
    /// ends up current. Returns the superseded scope, the new one and the
    /// number of evicted entries.
    pub(crate) fn start_new_scope(&self, scopes: &ScopeManager) -> (ScopeId, ScopeId, usize) {
        let mut scoped = self.scoped.lock();
        let previous = scopes.start_new_scope();
        let current = scopes.current_scope();
        let before = scoped.len();
        scoped.retain(|k, _| k.scope == current);
        (previous, current, before - scoped.len())
    }

    /// Forgets every instance built for `key`, in both tiers.
    pub(crate) fn evict_key(&self, key: &ServiceKey) {
        self.singletons.lock().remove(key);
        self.scoped.lock().retain(|k, _| &k.key != key);
    }

    pub(crate) fn clear(&self) {
        self.singletons.lock().clear();
        self.scoped.lock().clear();
    }

    pub(crate) fn scoped_len(&self) -> usize {
        self.scoped.lock().len()
    }

    pub(crate) fn singleton_len(&self) -> usize {
        self.singletons
            .lock()
            .values()
            .filter(|slot| matches!(*slot.state.lock(), SlotState::Ready(_)))
            .count()
    }
}
