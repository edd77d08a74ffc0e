//! Service lifetime definitions.

use std::fmt;

/// Service lifetimes controlling instance caching behavior
///
/// # Examples
///
/// ```rust
/// use epoch_di::{Container, Lifetime, Resolver};
/// use std::sync::Arc;
///
/// struct Database { url: String }
/// struct Session { user: String }
/// struct Request { id: u32 }
///
/// let container = Container::new();
/// container.add_singleton(Database { url: "postgres://localhost".to_string() }).unwrap();
/// container.add_scoped_factory(|_| Session { user: "alice".to_string() }).unwrap();
/// container.add_transient_factory(|_| Request { id: 7 }).unwrap();
///
/// // Singleton: one instance for the container's whole life
/// let db1 = container.resolve::<Database>().unwrap();
/// container.start_new_scope();
/// let db2 = container.resolve::<Database>().unwrap();
/// assert!(Arc::ptr_eq(&db1, &db2));
///
/// // Scoped: one instance per scope
/// let s1 = container.resolve::<Session>().unwrap();
/// let s2 = container.resolve::<Session>().unwrap();
/// assert!(Arc::ptr_eq(&s1, &s2));
/// container.start_new_scope();
/// let s3 = container.resolve::<Session>().unwrap();
/// assert!(!Arc::ptr_eq(&s1, &s3));
///
/// // Transient: always a fresh instance
/// let r1 = container.resolve::<Request>().unwrap();
/// let r2 = container.resolve::<Request>().unwrap();
/// assert!(!Arc::ptr_eq(&r1, &r2));
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Lifetime {
    /// Single instance per container, cached until `reset_for_testing`.
    ///
    /// Created on first resolution. Concurrent first resolutions invoke the
    /// factory exactly once; every caller observes the same instance.
    Singleton,
    /// Single instance per scope.
    ///
    /// Cached under the scope that was current when the factory was invoked.
    /// `start_new_scope` makes every scoped instance unreachable.
    Scoped,
    /// New instance per resolution, never cached.
    Transient,
}

impl Lifetime {
    /// Returns true if resolutions under this lifetime are cached.
    #[inline]
    pub fn is_cached(&self) -> bool {
        matches!(self, Lifetime::Singleton | Lifetime::Scoped)
    }
}

impl fmt::Display for Lifetime {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Lifetime::Singleton => f.write_str("singleton"),
            Lifetime::Scoped => f.write_str("scoped"),
            Lifetime::Transient => f.write_str("transient"),
        }
    }
}
