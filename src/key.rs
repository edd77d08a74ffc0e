//! Service key types for the dependency injection container.

use std::any::TypeId;
use std::fmt;
use std::hash::{Hash, Hasher};
use std::sync::Arc;

/// Key for service storage and lookup.
///
/// A key is the type identity of a service contract plus an optional
/// discriminator name, so several bindings of the same type can coexist
/// (for example a `production` and a `mock` API client).
///
/// The type may be unsized, which is how trait objects are addressed:
/// `key_of_type::<dyn Logger>()` is a perfectly valid key.
///
/// # Examples
///
/// ```rust
/// use epoch_di::{key_of_type, named_key_of_type};
///
/// let plain = key_of_type::<u32>();
/// let port = named_key_of_type::<u32>("port");
///
/// assert_eq!(plain, key_of_type::<u32>());
/// assert_ne!(plain, port);
/// assert_eq!(port.service_name(), Some("port"));
/// assert_eq!(plain.display_name(), "u32");
/// ```
#[derive(Clone)]
pub struct ServiceKey {
    type_id: TypeId,
    type_name: &'static str,
    name: Option<Arc<str>>,
}

impl ServiceKey {
    /// Key for the unnamed binding of `T`.
    #[inline]
    pub fn of<T: ?Sized + 'static>() -> Self {
        Self {
            type_id: TypeId::of::<T>(),
            type_name: std::any::type_name::<T>(),
            name: None,
        }
    }

    /// Key for the binding of `T` registered under `name`.
    pub fn named<T: ?Sized + 'static>(name: impl Into<Arc<str>>) -> Self {
        Self {
            type_id: TypeId::of::<T>(),
            type_name: std::any::type_name::<T>(),
            name: Some(name.into()),
        }
    }

    /// Returns the same type identity with `name` attached.
    ///
    /// This is what `resolve_named` builds on: the name becomes part of the
    /// identity rather than being concatenated into a lookup string.
    pub fn with_name(&self, name: impl Into<Arc<str>>) -> Self {
        Self {
            type_id: self.type_id,
            type_name: self.type_name,
            name: Some(name.into()),
        }
    }

    /// The `TypeId` of the service contract.
    #[inline]
    pub fn type_id(&self) -> TypeId {
        self.type_id
    }

    /// Get the type name for display
    ///
    /// This is the `std::any::type_name` of the contract and is used in
    /// error messages and resolution paths.
    #[inline]
    pub fn display_name(&self) -> &'static str {
        self.type_name
    }

    /// Get the service name for named services, or None for unnamed services
    pub fn service_name(&self) -> Option<&str> {
        self.name.as_deref()
    }

    /// Returns true if this key carries a discriminator name.
    #[inline]
    pub fn is_named(&self) -> bool {
        self.name.is_some()
    }
}

// The type name is diagnostic only; identity is TypeId plus name.
impl PartialEq for ServiceKey {
    #[inline]
    fn eq(&self, other: &Self) -> bool {
        self.type_id == other.type_id && self.name == other.name
    }
}

impl Eq for ServiceKey {}

impl Hash for ServiceKey {
    #[inline]
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.type_id.hash(state);
        self.name.hash(state);
    }
}

impl fmt::Debug for ServiceKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.name {
            Some(name) => write!(f, "ServiceKey({} @ {:?})", self.type_name, name),
            None => write!(f, "ServiceKey({})", self.type_name),
        }
    }
}

impl fmt::Display for ServiceKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.name {
            Some(name) => write!(f, "{} (\"{}\")", self.type_name, name),
            None => f.write_str(self.type_name),
        }
    }
}

/// Helper for creating the unnamed key of `T`.
#[inline(always)]
pub fn key_of_type<T: ?Sized + 'static>() -> ServiceKey {
    ServiceKey::of::<T>()
}

/// Helper for creating the key of `T` registered under `name`.
#[inline]
pub fn named_key_of_type<T: ?Sized + 'static>(name: impl Into<Arc<str>>) -> ServiceKey {
    ServiceKey::named::<T>(name)
}
