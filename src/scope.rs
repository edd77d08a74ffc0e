//! Scope identifiers and the manager that owns the active one.
//!
//! A scope is an epoch of resolution: scoped services are cached per scope
//! and a scope change (logout, account switch) makes all of them
//! unreachable at once. Scopes are never resumed.

use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};

static NEXT_SCOPE_ID: AtomicU64 = AtomicU64::new(1);

/// Opaque identifier of a resolution epoch.
///
/// Identifiers come from a process-wide counter, so two containers (or one
/// container before and after `reset_for_testing`) never share an id.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ScopeId(u64);

impl ScopeId {
    pub(crate) fn fresh() -> Self {
        ScopeId(NEXT_SCOPE_ID.fetch_add(1, Ordering::Relaxed))
    }
}

impl fmt::Display for ScopeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "scope-{}", self.0)
    }
}

/// Holds exactly one active scope identifier.
#[derive(Debug)]
pub struct ScopeManager {
    current: AtomicU64,
}

impl ScopeManager {
    pub fn new() -> Self {
        Self {
            current: AtomicU64::new(ScopeId::fresh().0),
        }
    }

    /// The active scope.
    #[inline]
    pub fn current_scope(&self) -> ScopeId {
        ScopeId(self.current.load(Ordering::SeqCst))
    }

    /// Replaces the active scope with a fresh one and returns the superseded id.
    pub fn start_new_scope(&self) -> ScopeId {
        let next = ScopeId::fresh();
        ScopeId(self.current.swap(next.0, Ordering::SeqCst))
    }

    /// Same as [`start_new_scope`](Self::start_new_scope), discarding the old id.
    pub fn reset_scoped(&self) {
        self.start_new_scope();
    }
}

impl Default for ScopeManager {
    fn default() -> Self {
        Self::new()
    }
}
