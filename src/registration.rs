//! Service registration types.

use std::any::Any;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use crate::config::DuplicatePolicy;
use crate::container::ResolverContext;
use crate::error::{DiError, DiResult};
use crate::internal::FastMap;
use crate::key::ServiceKey;
use crate::lifetime::Lifetime;

// Type-erased Arc for storage. The payload is always an `Arc<T>` so that
// unsized contracts (`dyn Trait`) share one representation with sized ones.
pub(crate) type AnyArc = Arc<dyn Any + Send + Sync>;

pub(crate) type Ctor = Arc<dyn for<'a> Fn(&ResolverContext<'a>) -> DiResult<AnyArc> + Send + Sync>;

static NEXT_REGISTRATION_ID: AtomicU64 = AtomicU64::new(1);

/// Service registration with lifetime and constructor
pub(crate) struct Registration {
    /// Unique per `register` call; cached instances remember which binding built them.
    pub(crate) id: u64,
    pub(crate) key: ServiceKey,
    pub(crate) lifetime: Lifetime,
    pub(crate) ctor: Ctor,
}

impl Registration {
    pub(crate) fn new(key: ServiceKey, lifetime: Lifetime, ctor: Ctor) -> Self {
        Self {
            id: NEXT_REGISTRATION_ID.fetch_add(1, Ordering::Relaxed),
            key,
            lifetime,
            ctor,
        }
    }
}

/// Service registry holding all registrations
#[derive(Default)]
pub(crate) struct Registry {
    bindings: FastMap<ServiceKey, Arc<Registration>>,
}

impl Registry {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    /// Stores `registration`, applying `policy` if its key is already bound.
    ///
    /// Returns the replaced registration, if any.
    pub(crate) fn insert(
        &mut self,
        registration: Registration,
        policy: DuplicatePolicy,
    ) -> DiResult<Option<Arc<Registration>>> {
        if policy == DuplicatePolicy::Reject && self.bindings.contains_key(&registration.key) {
            return Err(DiError::DuplicateRegistration {
                service: registration.key.to_string(),
            });
        }
        let key = registration.key.clone();
        Ok(self.bindings.insert(key, Arc::new(registration)))
    }

    #[inline]
    pub(crate) fn get(&self, key: &ServiceKey) -> Option<&Arc<Registration>> {
        self.bindings.get(key)
    }

    #[inline]
    pub(crate) fn contains_key(&self, key: &ServiceKey) -> bool {
        self.bindings.contains_key(key)
    }

    pub(crate) fn len(&self) -> usize {
        self.bindings.len()
    }

    pub(crate) fn keys(&self) -> impl Iterator<Item = &ServiceKey> {
        self.bindings.keys()
    }

    pub(crate) fn clear(&mut self) {
        self.bindings.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::key::key_of_type;

    fn unit_ctor() -> Ctor {
        Arc::new(|_: &ResolverContext<'_>| Ok(Arc::new(Arc::new(())) as AnyArc))
    }

    #[test]
    fn overwrite_returns_previous_binding() {
        let mut registry = Registry::new();
        let first = Registration::new(key_of_type::<()>(), Lifetime::Singleton, unit_ctor());
        let first_id = first.id;

        assert!(registry.insert(first, DuplicatePolicy::Overwrite).unwrap().is_none());
        let replaced = registry
            .insert(
                Registration::new(key_of_type::<()>(), Lifetime::Transient, unit_ctor()),
                DuplicatePolicy::Warn,
            )
            .unwrap()
            .expect("previous binding");

        assert_eq!(replaced.id, first_id);
        assert_eq!(registry.len(), 1);
        let current = registry.get(&key_of_type::<()>()).unwrap();
        assert_eq!(current.lifetime, Lifetime::Transient);
    }

    #[test]
    fn reject_policy_keeps_original() {
        let mut registry = Registry::new();
        registry
            .insert(
                Registration::new(key_of_type::<()>(), Lifetime::Singleton, unit_ctor()),
                DuplicatePolicy::Reject,
            )
            .unwrap();

        let err = registry
            .insert(
                Registration::new(key_of_type::<()>(), Lifetime::Scoped, unit_ctor()),
                DuplicatePolicy::Reject,
            )
            .err()
            .expect("duplicate rejected");
        assert!(matches!(err, DiError::DuplicateRegistration { .. }));
        assert_eq!(registry.get(&key_of_type::<()>()).unwrap().lifetime, Lifetime::Singleton);
    }

    #[test]
    fn registration_ids_are_unique() {
        let a = Registration::new(key_of_type::<()>(), Lifetime::Singleton, unit_ctor());
        let b = Registration::new(key_of_type::<()>(), Lifetime::Singleton, unit_ctor());
        assert_ne!(a.id, b.id);
    }
}
