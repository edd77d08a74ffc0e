//! Circular dependency detection infrastructure.
//!
//! Each resolution carries the chain of keys that led to it. Factories get
//! the chain through their `ResolverContext`, so nested resolutions extend it
//! and a key that is already on the chain is reported instead of recursing.
//!
//! A factory can also reach the container without its context, through a
//! captured `Container` clone. Such a request starts a new chain, so every
//! thread additionally keeps the keys it is resolving in a thread-local
//! stack that top-level requests are checked against.

use std::cell::RefCell;

use crate::error::{DiError, DiResult};
use crate::key::ServiceKey;

// (container identity, key) for every resolution running on this thread
thread_local! {
    static ACTIVE: RefCell<Vec<(usize, ServiceKey)>> = RefCell::new(Vec::new());
}

/// Keeps `key` on this thread's active stack until dropped.
pub(crate) struct ActiveGuard(());

impl ActiveGuard {
    /// Pushes `key` for `owner`, failing with the cycle if this thread is
    /// already resolving it for the same container.
    pub(crate) fn enter(owner: usize, key: &ServiceKey) -> DiResult<Self> {
        ACTIVE.with(|active| {
            let mut active = active.borrow_mut();
            let found = active.iter().position(|(o, k)| *o == owner && k == key);
            let Some(start) = found else {
                active.push((owner, key.clone()));
                return Ok(ActiveGuard(()));
            };
            let mut path: Vec<_> = active[start..]
                .iter()
                .filter(|(o, _)| *o == owner)
                .map(|(_, k)| k.display_name())
                .collect();
            path.push(key.display_name());
            Err(DiError::Circular(path))
        })
    }
}

impl Drop for ActiveGuard {
    fn drop(&mut self) {
        ACTIVE.with(|active| {
            active.borrow_mut().pop();
        });
    }
}

/// One resolution in progress.
pub(crate) struct Frame<'a> {
    key: &'a ServiceKey,
    parent: ResolutionPath<'a>,
}

impl<'a> Frame<'a> {
    /// Pushes `key` on top of `parent` after checking for cycles and depth.
    pub(crate) fn enter(
        key: &'a ServiceKey,
        parent: ResolutionPath<'a>,
        max_depth: usize,
    ) -> DiResult<Self> {
        if parent.contains(key) {
            let mut path = parent.names();
            path.push(key.display_name());
            return Err(DiError::Circular(path));
        }
        if parent.depth >= max_depth {
            return Err(DiError::DepthExceeded(parent.depth));
        }
        Ok(Self { key, parent })
    }

    /// The chain with this frame on top.
    pub(crate) fn path(&self) -> ResolutionPath<'_> {
        ResolutionPath {
            head: Some(self),
            depth: self.parent.depth + 1,
        }
    }
}

/// Borrowed view of a resolution chain, innermost frame first.
#[derive(Clone, Copy, Default)]
pub(crate) struct ResolutionPath<'a> {
    head: Option<&'a Frame<'a>>,
    depth: usize,
}

impl<'a> ResolutionPath<'a> {
    /// The empty chain a top-level `resolve` starts from.
    pub(crate) fn root() -> Self {
        Self::default()
    }

    pub(crate) fn depth(&self) -> usize {
        self.depth
    }

    fn frames(&self) -> impl Iterator<Item = &'a Frame<'a>> {
        let mut next = self.head;
        std::iter::from_fn(move || {
            let frame = next?;
            next = frame.parent.head;
            Some(frame)
        })
    }

    fn contains(&self, key: &ServiceKey) -> bool {
        self.frames().any(|frame| frame.key == key)
    }

    /// Type names from the outermost request to the innermost.
    pub(crate) fn names(&self) -> Vec<&'static str> {
        let mut names: Vec<_> = self.frames().map(|f| f.key.display_name()).collect();
        names.reverse();
        names
    }
}
