//! Resolver context for dependency injection.
//!
//! This module contains the ResolverContext type which provides
//! the interface for factory functions to resolve dependencies.

use std::any::Any;
use std::fmt;
use std::sync::Arc;

use crate::error::DiResult;
use crate::internal::ResolutionPath;
use crate::key::ServiceKey;
use crate::scope::ScopeId;
use crate::traits::ResolverCore;

use super::Container;

/// Context passed to factory functions for resolving dependencies.
///
/// Resolving through the context keeps the request on the same resolution
/// chain, which is what lets the container report a cycle instead of
/// recursing until the stack overflows.
///
/// # Examples
///
/// ```
/// use epoch_di::{Container, Resolver};
/// use std::sync::Arc;
///
/// struct Database { url: String }
/// struct UserService { db: Arc<Database> }
///
/// let container = Container::new();
/// container.add_singleton(Database { url: "postgres://localhost".to_string() }).unwrap();
/// container.add_transient_factory(|ctx| UserService {
///     db: ctx.resolve::<Database>().expect("database registered"),
/// }).unwrap();
///
/// let users = container.resolve::<UserService>().unwrap();
/// assert_eq!(users.db.url, "postgres://localhost");
/// ```
pub struct ResolverContext<'a> {
    container: &'a Container,
    path: ResolutionPath<'a>,
}

impl<'a> ResolverContext<'a> {
    pub(crate) fn new(container: &'a Container, path: ResolutionPath<'a>) -> Self {
        Self { container, path }
    }

    /// The scope that is active right now.
    pub fn current_scope(&self) -> ScopeId {
        self.container.current_scope()
    }

    /// Number of resolutions in progress on this chain, this one included.
    pub fn depth(&self) -> usize {
        self.path.depth()
    }

    /// Type names on the chain, outermost first.
    pub fn resolution_path(&self) -> Vec<&'static str> {
        self.path.names()
    }
}

impl ResolverCore for ResolverContext<'_> {
    fn resolve_any(&self, key: &ServiceKey) -> DiResult<Arc<dyn Any + Send + Sync>> {
        self.container.resolve_in(key, self.path)
    }
}

impl fmt::Debug for ResolverContext<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ResolverContext")
            .field("path", &self.path.names())
            .finish()
    }
}
