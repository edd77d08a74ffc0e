//! # epoch-di
//!
//! Thread-safe dependency injection with singleton, scoped and transient
//! lifetimes, where a scope is an application epoch such as a login session.
//!
//! ## Features
//!
//! - **Three lifetimes**: Singleton, Scoped and Transient services
//! - **Scope invalidation**: `start_new_scope` drops every scoped instance at once (logout)
//! - **Thread-safe**: every operation may run concurrently with every other one
//! - **Exactly-once singletons**: concurrent first resolutions share one factory call
//! - **Circular dependency detection**: cycles are reported with their full path
//! - **Named bindings and trait objects**: several bindings per type, `dyn Trait` contracts
//! - **Assemblies**: composable batches of registrations
//!
//! ## Quick Start
//!
//! ```rust
//! use epoch_di::{Container, Resolver};
//! use std::sync::Arc;
//!
//! struct Database {
//!     connection_string: String,
//! }
//!
//! struct UserService {
//!     db: Arc<Database>,
//! }
//!
//! let container = Container::new();
//! container.add_singleton(Database {
//!     connection_string: "postgres://localhost".to_string(),
//! }).unwrap();
//! container.add_transient_factory(|ctx| UserService {
//!     db: ctx.resolve::<Database>().expect("database"),
//! }).unwrap();
//!
//! let user_service = container.resolve::<UserService>().unwrap();
//! assert_eq!(user_service.db.connection_string, "postgres://localhost");
//! ```
//!
//! ## Scopes
//!
//! There is always exactly one active scope. Scoped services are cached in
//! it until [`Container::start_new_scope`] replaces it; singletons are not
//! affected.
//!
//! ```rust
//! use epoch_di::{Container, Resolver};
//! use std::sync::atomic::{AtomicU32, Ordering};
//!
//! struct Cart { items: AtomicU32 }
//!
//! let container = Container::new();
//! container.add_scoped_factory(|_| Cart { items: AtomicU32::new(0) }).unwrap();
//!
//! container.resolve::<Cart>().unwrap().items.fetch_add(3, Ordering::SeqCst);
//! assert_eq!(container.resolve::<Cart>().unwrap().items.load(Ordering::SeqCst), 3);
//!
//! container.start_new_scope();
//! assert_eq!(container.resolve::<Cart>().unwrap().items.load(Ordering::SeqCst), 0);
//! ```
//!
//! ## Errors
//!
//! Resolution never panics on a configuration problem. Missing bindings,
//! cycles and failing factories come back as [`DiError`] values.
//!
//! ```rust
//! use epoch_di::{key_of_type, Container, DiError, Lifetime, Resolver};
//! use std::sync::Arc;
//!
//! struct Node;
//!
//! let container = Container::new();
//! container.try_register::<Node, _>(key_of_type::<Node>(), Lifetime::Transient, |ctx| {
//!     ctx.resolve::<Node>()?;
//!     Ok(Arc::new(Node))
//! }).unwrap();
//!
//! assert!(matches!(container.resolve::<Node>(), Err(DiError::Circular(path)) if path.len() == 2));
//! assert!(matches!(container.resolve::<String>(), Err(DiError::NotRegistered { .. })));
//! ```

pub mod assembly;
pub mod config;
pub mod container;
pub mod error;
pub mod key;
pub mod lifetime;
pub mod observer;
pub mod scope;
pub mod traits;

// Internal modules
mod cache;
mod internal;
mod registration;

pub use assembly::{Assembly, FnAssembly};
pub use config::{ContainerOptions, DuplicatePolicy};
pub use container::{Container, ResolverContext};
pub use error::{DiError, DiResult};
pub use key::{key_of_type, named_key_of_type, ServiceKey};
pub use lifetime::Lifetime;
pub use observer::{DiObserver, TracingObserver};
pub use scope::{ScopeId, ScopeManager};
pub use traits::{Resolver, ResolverCore};
