//! The container: registry, scope manager and instance cache behind one handle.

use std::any::{Any, TypeId};
use std::fmt;
use std::sync::Arc;

use parking_lot::RwLock;
use tracing::{debug, warn};

use crate::assembly::Assembly;
use crate::cache::InstanceCache;
use crate::config::{ContainerOptions, DuplicatePolicy};
use crate::error::{DiError, DiResult};
use crate::internal::ResolutionPath;
use crate::key::ServiceKey;
use crate::lifetime::Lifetime;
use crate::observer::{DiObserver, Observers};
use crate::registration::{AnyArc, Ctor, Registration, Registry};
use crate::scope::{ScopeId, ScopeManager};
use crate::traits::ResolverCore;

mod context;
mod resolve;

pub use context::ResolverContext;

/// Dependency injection container.
///
/// A `Container` binds service keys to factories and resolves them under
/// their [`Lifetime`]. It is a cheap handle: clones share the same
/// registrations, caches and scope, so one container can be created during
/// application start-up and cloned into whatever needs to resolve services.
///
/// Every operation is safe to call from any thread, concurrently with any
/// other operation. No internal lock is held while a factory runs.
///
/// # Examples
///
/// ```
/// use epoch_di::{Container, Resolver};
/// use std::sync::Arc;
///
/// struct Config { api_base: String }
/// struct ApiClient { config: Arc<Config> }
/// struct UserSession { client: Arc<ApiClient> }
///
/// let container = Container::new();
/// container.add_singleton(Config { api_base: "https://api.example.com".into() }).unwrap();
/// container.add_singleton_factory(|ctx| ApiClient {
///     config: ctx.resolve().expect("config"),
/// }).unwrap();
/// container.add_scoped_factory(|ctx| UserSession {
///     client: ctx.resolve().expect("client"),
/// }).unwrap();
///
/// let before = container.resolve::<UserSession>().unwrap();
///
/// // Logout: session-bound services are rebuilt, singletons survive.
/// container.start_new_scope();
/// let after = container.resolve::<UserSession>().unwrap();
///
/// assert!(!Arc::ptr_eq(&before, &after));
/// assert!(Arc::ptr_eq(&before.client, &after.client));
/// ```
#[derive(Clone)]
pub struct Container {
    inner: Arc<ContainerInner>,
}

pub(crate) struct ContainerInner {
    pub(crate) options: ContainerOptions,
    pub(crate) registry: RwLock<Registry>,
    pub(crate) scopes: ScopeManager,
    pub(crate) cache: InstanceCache,
    pub(crate) observers: Observers,
}

impl Container {
    /// Creates an empty container with default options.
    pub fn new() -> Self {
        Self::with_options(ContainerOptions::default())
    }

    /// Creates an empty container.
    pub fn with_options(options: ContainerOptions) -> Self {
        Self {
            inner: Arc::new(ContainerInner {
                options,
                registry: RwLock::new(Registry::new()),
                scopes: ScopeManager::new(),
                cache: InstanceCache::new(),
                observers: Observers::new(),
            }),
        }
    }

    /// Creates an empty container configured from the environment.
    ///
    /// See [`ContainerOptions::from_env`].
    pub fn from_env() -> DiResult<Self> {
        Ok(Self::with_options(ContainerOptions::from_env()?))
    }

    pub fn options(&self) -> &ContainerOptions {
        &self.inner.options
    }

    /// Attaches an observer that is notified of every resolution and scope change.
    pub fn add_observer(&self, observer: Arc<dyn DiObserver>) -> &Self {
        self.inner.observers.add(observer);
        self
    }

    // ----- Registration -----

    /// Binds `key` to a fallible factory producing `Arc<T>`.
    ///
    /// Every other registration method funnels into this one. `T` may be
    /// unsized, which is how trait objects are registered. The key must name
    /// `T`; a key for any other type is refused with `TypeMismatch`.
    ///
    /// If `key` is already bound the container's [`DuplicatePolicy`] applies.
    /// A replaced binding's cached instances are discarded, so the next
    /// `resolve` goes through the new factory.
    pub fn try_register<T, F>(&self, key: ServiceKey, lifetime: Lifetime, factory: F) -> DiResult<&Self>
    where
        T: ?Sized + Send + Sync + 'static,
        F: Fn(&ResolverContext<'_>) -> DiResult<Arc<T>> + Send + Sync + 'static,
    {
        if key.type_id() != TypeId::of::<T>() {
            return Err(DiError::TypeMismatch(std::any::type_name::<T>()));
        }
        let ctor: Ctor = Arc::new(move |ctx: &ResolverContext<'_>| -> DiResult<AnyArc> {
            let instance: Arc<T> = factory(ctx)?;
            Ok(Arc::new(instance) as Arc<dyn Any + Send + Sync>)
        });
        self.insert(Registration::new(key, lifetime, ctor))
    }

    /// Binds `T` to `factory` under `lifetime`.
    pub fn register<T, F>(&self, lifetime: Lifetime, factory: F) -> DiResult<&Self>
    where
        T: Send + Sync + 'static,
        F: Fn(&ResolverContext<'_>) -> T + Send + Sync + 'static,
    {
        self.try_register::<T, _>(ServiceKey::of::<T>(), lifetime, move |ctx| Ok(Arc::new(factory(ctx))))
    }

    /// Binds `T` under `name`, alongside any other bindings of `T`.
    pub fn register_named<T, F>(&self, name: &str, lifetime: Lifetime, factory: F) -> DiResult<&Self>
    where
        T: Send + Sync + 'static,
        F: Fn(&ResolverContext<'_>) -> T + Send + Sync + 'static,
    {
        self.try_register::<T, _>(ServiceKey::named::<T>(name), lifetime, move |ctx| {
            Ok(Arc::new(factory(ctx)))
        })
    }

    /// Registers an already constructed singleton.
    pub fn add_singleton<T: Send + Sync + 'static>(&self, value: T) -> DiResult<&Self> {
        let instance = Arc::new(value);
        self.try_register::<T, _>(ServiceKey::of::<T>(), Lifetime::Singleton, move |_| Ok(instance.clone()))
    }

    /// Registers a singleton factory that creates the instance on first request.
    pub fn add_singleton_factory<T, F>(&self, factory: F) -> DiResult<&Self>
    where
        T: Send + Sync + 'static,
        F: Fn(&ResolverContext<'_>) -> T + Send + Sync + 'static,
    {
        self.register(Lifetime::Singleton, factory)
    }

    /// Registers a factory that creates one instance per scope.
    pub fn add_scoped_factory<T, F>(&self, factory: F) -> DiResult<&Self>
    where
        T: Send + Sync + 'static,
        F: Fn(&ResolverContext<'_>) -> T + Send + Sync + 'static,
    {
        self.register(Lifetime::Scoped, factory)
    }

    /// Registers a factory that creates a new instance on every request.
    pub fn add_transient_factory<T, F>(&self, factory: F) -> DiResult<&Self>
    where
        T: Send + Sync + 'static,
        F: Fn(&ResolverContext<'_>) -> T + Send + Sync + 'static,
    {
        self.register(Lifetime::Transient, factory)
    }

    /// Binds a trait object contract such as `dyn AuthClient`.
    pub fn add_trait_factory<T, F>(&self, lifetime: Lifetime, factory: F) -> DiResult<&Self>
    where
        T: ?Sized + Send + Sync + 'static,
        F: Fn(&ResolverContext<'_>) -> Arc<T> + Send + Sync + 'static,
    {
        self.try_register::<T, _>(ServiceKey::of::<T>(), lifetime, move |ctx| Ok(factory(ctx)))
    }

    /// Runs `assembly` against this container.
    pub fn register_assembly<A>(&self, assembly: &A) -> DiResult<&Self>
    where
        A: Assembly + ?Sized,
    {
        debug!(assembly = assembly.name(), "assembling registrations");
        assembly.assemble(self)?;
        Ok(self)
    }

    /// Runs each assembly in order, stopping at the first failure.
    pub fn register_assemblies(&self, assemblies: &[&dyn Assembly]) -> DiResult<&Self> {
        for assembly in assemblies {
            self.register_assembly(*assembly)?;
        }
        Ok(self)
    }

    fn insert(&self, registration: Registration) -> DiResult<&Self> {
        let key = registration.key.clone();
        let lifetime = registration.lifetime;
        let policy = self.inner.options.duplicate_policy();

        let replaced = self.inner.registry.write().insert(registration, policy)?;

        match replaced {
            Some(previous) => {
                if policy == DuplicatePolicy::Warn {
                    warn!(service = %key, old = %previous.lifetime, new = %lifetime, "replacing existing registration");
                } else {
                    debug!(service = %key, %lifetime, "replaced registration");
                }
                self.inner.cache.evict_key(&key);
            }
            None => debug!(service = %key, %lifetime, "registered service"),
        }
        Ok(self)
    }

    // ----- Introspection -----

    pub fn is_registered<T: ?Sized + 'static>(&self) -> bool {
        self.is_registered_key(&ServiceKey::of::<T>())
    }

    pub fn is_registered_key(&self, key: &ServiceKey) -> bool {
        self.inner.registry.read().contains_key(key)
    }

    pub fn lifetime_of(&self, key: &ServiceKey) -> Option<Lifetime> {
        self.inner.registry.read().get(key).map(|r| r.lifetime)
    }

    pub fn registration_count(&self) -> usize {
        self.inner.registry.read().len()
    }

    /// Keys of every current registration, in no particular order.
    pub fn registered_keys(&self) -> Vec<ServiceKey> {
        self.inner.registry.read().keys().cloned().collect()
    }

    // ----- Scopes -----

    pub fn current_scope(&self) -> ScopeId {
        self.inner.scopes.current_scope()
    }

    /// Supersedes the active scope, e.g. on logout.
    ///
    /// Scoped instances of the old scope become unreachable and are dropped
    /// from the cache; singletons are untouched. A scoped resolution that is
    /// still running when the scope changes returns its instance to its caller
    /// without caching it.
    pub fn start_new_scope(&self) {
        let (previous, current, evicted) = self.inner.cache.start_new_scope(&self.inner.scopes);
        debug!(%previous, %current, evicted, "started new scope");
        self.inner.observers.scope_started(previous, current);
    }

    /// Same as [`start_new_scope`](Self::start_new_scope).
    pub fn reset_scoped(&self) {
        self.start_new_scope();
    }

    /// Returns the container to its freshly constructed state.
    ///
    /// Drops every registration and cached instance and begins a new scope.
    /// Observers and options are kept. Intended for test isolation.
    pub fn reset_for_testing(&self) {
        let mut registry = self.inner.registry.write();
        registry.clear();
        self.inner.cache.start_new_scope(&self.inner.scopes);
        self.inner.cache.clear();
        drop(registry);
        debug!(scope = %self.current_scope(), "container reset");
    }
}

impl Default for Container {
    fn default() -> Self {
        Self::new()
    }
}

impl ResolverCore for Container {
    fn resolve_any(&self, key: &ServiceKey) -> DiResult<Arc<dyn Any + Send + Sync>> {
        self.resolve_in(key, ResolutionPath::root())
    }
}

impl fmt::Debug for Container {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Container")
            .field("registrations", &self.registration_count())
            .field("scope", &self.current_scope())
            .field("cached_singletons", &self.inner.cache.singleton_len())
            .field("cached_scoped", &self.inner.cache.scoped_len())
            .finish()
    }
}
