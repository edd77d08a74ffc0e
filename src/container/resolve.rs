//! The lifetime-policy resolution algorithm.

use std::sync::Arc;
use std::time::Instant;

use crate::error::{DiError, DiResult};
use crate::internal::{ActiveGuard, Frame, ResolutionPath};
use crate::key::ServiceKey;
use crate::registration::{AnyArc, Registration};

use super::{Container, ResolverContext};

impl Container {
    /// Resolves `key` as one step of the chain `path`.
    pub(crate) fn resolve_in(&self, key: &ServiceKey, path: ResolutionPath<'_>) -> DiResult<AnyArc> {
        let registration = self.registration(key)?;

        let Some(observers) = self.inner.observers.snapshot() else {
            return self.resolve_registration(&registration, path);
        };

        for observer in &observers {
            observer.resolving(key, registration.lifetime);
        }
        let start = Instant::now();
        let result = self.resolve_registration(&registration, path);
        match &result {
            Ok(_) => {
                let elapsed = start.elapsed();
                for observer in &observers {
                    observer.resolved(key, registration.lifetime, elapsed);
                }
            }
            Err(error) => {
                for observer in &observers {
                    observer.resolution_failed(key, error);
                }
            }
        }
        result
    }

    /// Distinguishes this container (and its clones) from others on the active stack.
    fn identity(&self) -> usize {
        Arc::as_ptr(&self.inner) as usize
    }

    fn registration(&self, key: &ServiceKey) -> DiResult<Arc<Registration>> {
        // Clone the binding out so no registry lock is held while factories run.
        self.inner
            .registry
            .read()
            .get(key)
            .cloned()
            .ok_or_else(|| DiError::NotRegistered {
                service: key.to_string(),
            })
    }

    fn resolve_registration(
        &self,
        registration: &Registration,
        path: ResolutionPath<'_>,
    ) -> DiResult<AnyArc> {
        let frame = Frame::enter(&registration.key, path, self.inner.options.max_depth())?;
        // Also catches chains restarted through a captured clone of the container.
        let _active = ActiveGuard::enter(self.identity(), &registration.key)?;
        let ctx = ResolverContext::new(self, frame.path());

        self.inner
            .cache
            .get_or_create(registration, &self.inner.scopes, || {
                (registration.ctor)(&ctx).map_err(|e| e.attribute_to(&registration.key.to_string()))
            })
    }
}
