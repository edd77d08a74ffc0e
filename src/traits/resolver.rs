//! Resolver traits for service resolution.

use std::any::Any;
use std::sync::Arc;

use crate::error::{DiError, DiResult};
use crate::key::ServiceKey;

/// Core resolver trait for object-safe service resolution.
///
/// Implemented by [`Container`](crate::Container), which starts a new
/// resolution chain, and by [`ResolverContext`](crate::ResolverContext),
/// which extends the chain of the factory it was handed to.
///
/// Most users should use the [`Resolver`] trait instead, which provides
/// typed methods built on top of this one.
pub trait ResolverCore: Send + Sync {
    /// Resolves `key` to its type-erased instance.
    ///
    /// The returned value wraps an `Arc<T>` where `T` is the contract the key
    /// names; [`Resolver::resolve_key`] performs the checked downcast.
    fn resolve_any(&self, key: &ServiceKey) -> DiResult<Arc<dyn Any + Send + Sync>>;
}

/// High-level resolver interface with generic methods for type-safe service resolution.
///
/// Every [`ResolverCore`] gets these methods for free.
///
/// # Examples
///
/// ```
/// use epoch_di::{Container, Lifetime, Resolver};
/// use std::sync::Arc;
///
/// trait Logger: Send + Sync {
///     fn log(&self, msg: &str) -> String;
/// }
///
/// struct ConsoleLogger;
/// impl Logger for ConsoleLogger {
///     fn log(&self, msg: &str) -> String {
///         format!("LOG: {}", msg)
///     }
/// }
///
/// let container = Container::new();
/// container.add_singleton(42usize).unwrap();
/// container
///     .add_trait_factory::<dyn Logger, _>(Lifetime::Singleton, |_| Arc::new(ConsoleLogger))
///     .unwrap();
///
/// assert_eq!(*container.resolve::<usize>().unwrap(), 42);
/// let logger = container.resolve::<dyn Logger>().unwrap();
/// assert_eq!(logger.log("ready"), "LOG: ready");
/// ```
pub trait Resolver: ResolverCore {
    /// Resolves the unnamed binding of `T`.
    fn resolve<T>(&self) -> DiResult<Arc<T>>
    where
        T: ?Sized + Send + Sync + 'static,
    {
        self.resolve_key::<T>(&ServiceKey::of::<T>())
    }

    /// Resolves the binding of `T` registered under `name`.
    ///
    /// ```
    /// use epoch_di::{Container, Lifetime, Resolver};
    ///
    /// let container = Container::new();
    /// container.register_named("primary", Lifetime::Singleton, |_| 5432u16).unwrap();
    /// container.register_named("replica", Lifetime::Singleton, |_| 5433u16).unwrap();
    ///
    /// assert_eq!(*container.resolve_named::<u16>("replica").unwrap(), 5433);
    /// assert!(container.resolve::<u16>().is_err());
    /// ```
    fn resolve_named<T>(&self, name: &str) -> DiResult<Arc<T>>
    where
        T: ?Sized + Send + Sync + 'static,
    {
        self.resolve_key::<T>(&ServiceKey::named::<T>(name))
    }

    /// Resolves `key`, checking that its instance really is a `T`.
    fn resolve_key<T>(&self, key: &ServiceKey) -> DiResult<Arc<T>>
    where
        T: ?Sized + Send + Sync + 'static,
    {
        let any = self.resolve_any(key)?;
        any.downcast::<Arc<T>>()
            .map(|inner| (*inner).clone())
            .map_err(|_| DiError::TypeMismatch(std::any::type_name::<T>()))
    }

    /// Like [`resolve`](Self::resolve) but maps `NotRegistered` to `Ok(None)`.
    ///
    /// Any other failure, including errors of nested resolutions, is still returned.
    fn resolve_optional<T>(&self) -> DiResult<Option<Arc<T>>>
    where
        T: ?Sized + Send + Sync + 'static,
    {
        match self.resolve::<T>() {
            Ok(instance) => Ok(Some(instance)),
            Err(DiError::NotRegistered { service }) if service == ServiceKey::of::<T>().to_string() => Ok(None),
            Err(e) => Err(e),
        }
    }
}

impl<R: ResolverCore + ?Sized> Resolver for R {}
