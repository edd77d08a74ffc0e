//! Error types for the dependency injection container.

use std::error::Error as StdError;
use std::sync::Arc;

use thiserror::Error;

/// Dependency injection errors
///
/// Every failure of `register` or `resolve` is reported through this type;
/// the container never aborts the process on a recoverable condition.
///
/// # Examples
///
/// ```rust
/// use epoch_di::{Container, DiError, Resolver};
///
/// let container = Container::new();
/// match container.resolve::<String>() {
///     Err(DiError::NotRegistered { service }) => {
///         assert_eq!(service, "alloc::string::String");
///     }
///     _ => unreachable!(),
/// }
/// ```
///
/// ```rust
/// use epoch_di::DiError;
///
/// let circular = DiError::Circular(vec!["ServiceA", "ServiceB", "ServiceA"]);
/// assert_eq!(circular.to_string(), "Circular dependency: ServiceA -> ServiceB -> ServiceA");
/// ```
#[derive(Debug, Clone, Error)]
pub enum DiError {
    /// No registration exists for the requested key.
    #[error("Service not registered: {service}")]
    NotRegistered {
        /// Display form of the requested key
        service: String,
    },

    /// The key is already being resolved further up the same chain (includes path).
    #[error("Circular dependency: {}", .0.join(" -> "))]
    Circular(Vec<&'static str>),

    /// A user-supplied factory failed.
    #[error("Factory for {service} failed: {source}")]
    Factory {
        /// Display form of the key whose factory failed
        service: String,
        /// The factory's own error
        #[source]
        source: Arc<dyn StdError + Send + Sync>,
    },

    /// Type downcast failed
    #[error("Type mismatch for: {0}")]
    TypeMismatch(&'static str),

    /// A registration already exists and the container rejects duplicates.
    #[error("Service already registered: {service}")]
    DuplicateRegistration {
        /// Display form of the duplicated key
        service: String,
    },

    /// Maximum resolution depth exceeded
    #[error("Max depth {0} exceeded")]
    DepthExceeded(usize),

    /// Container configuration could not be parsed.
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),
}

impl DiError {
    /// Wraps a factory's own error.
    ///
    /// The service name is filled in by the resolver when the error leaves the
    /// factory, so factories only need `.map_err(DiError::factory)?`.
    ///
    /// ```rust
    /// use epoch_di::{Container, DiError, Lifetime, Resolver, key_of_type};
    /// use std::sync::Arc;
    ///
    /// let container = Container::new();
    /// container.try_register::<u16, _>(key_of_type::<u16>(), Lifetime::Singleton, |_| {
    ///     let port: u16 = "not-a-port".parse().map_err(DiError::factory)?;
    ///     Ok(Arc::new(port))
    /// }).unwrap();
    ///
    /// assert!(matches!(container.resolve::<u16>(), Err(DiError::Factory { .. })));
    /// ```
    pub fn factory<E>(err: E) -> Self
    where
        E: StdError + Send + Sync + 'static,
    {
        DiError::Factory {
            service: String::new(),
            source: Arc::new(err),
        }
    }

    /// Returns true for `NotRegistered`.
    pub fn is_not_registered(&self) -> bool {
        matches!(self, DiError::NotRegistered { .. })
    }

    /// Fills the service name of a factory error that does not carry one yet.
    pub(crate) fn attribute_to(self, service: &str) -> Self {
        match self {
            DiError::Factory { service: s, source } if s.is_empty() => DiError::Factory {
                service: service.to_string(),
                source,
            },
            other => other,
        }
    }
}

/// Result type for DI operations
pub type DiResult<T> = Result<T, DiError>;
