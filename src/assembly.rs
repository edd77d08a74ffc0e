//! Assemblies: named, composable batches of registrations.
//!
//! An assembly groups the `register` calls of one area of an application
//! (networking, session services, view models) so start-up code can apply
//! them in one call. Assemblies may run other assemblies; they hold no state
//! of their own.

use crate::container::Container;
use crate::error::DiResult;

/// A batch of registrations that can be applied to a [`Container`].
///
/// # Example
///
/// ```rust
/// use epoch_di::{Assembly, Container, DiResult, Lifetime, Resolver};
/// use std::sync::Arc;
///
/// struct HttpConfig { base_url: String }
/// struct HttpClient { config: Arc<HttpConfig> }
/// struct AuthClient { http: Arc<HttpClient> }
///
/// struct NetworkAssembly;
///
/// impl Assembly for NetworkAssembly {
///     fn assemble(&self, container: &Container) -> DiResult<()> {
///         container.add_singleton(HttpConfig { base_url: "https://api.example.com".into() })?;
///         container.add_singleton_factory(|ctx| HttpClient {
///             config: ctx.resolve().expect("http config"),
///         })?;
///         Ok(())
///     }
/// }
///
/// struct AppAssembly;
///
/// impl Assembly for AppAssembly {
///     fn name(&self) -> &str {
///         "app"
///     }
///
///     fn assemble(&self, container: &Container) -> DiResult<()> {
///         container.register_assembly(&NetworkAssembly)?;
///         container.add_scoped_factory(|ctx| AuthClient {
///             http: ctx.resolve().expect("http client"),
///         })?;
///         Ok(())
///     }
/// }
///
/// # fn main() -> DiResult<()> {
/// let container = Container::new();
/// container.register_assembly(&AppAssembly)?;
/// let auth = container.resolve::<AuthClient>()?;
/// assert_eq!(auth.http.config.base_url, "https://api.example.com");
/// # Ok(())
/// # }
/// ```
pub trait Assembly {
    /// Name used in logs. Defaults to the implementing type's name.
    fn name(&self) -> &str {
        std::any::type_name::<Self>()
    }

    /// Applies this assembly's registrations to `container`.
    fn assemble(&self, container: &Container) -> DiResult<()>;
}

/// An assembly made from a closure.
///
/// ```rust
/// use epoch_di::{Container, FnAssembly, Resolver};
///
/// let defaults = FnAssembly::new("defaults", |c: &Container| {
///     c.add_singleton(30u64)?;
///     Ok(())
/// });
///
/// let container = Container::new();
/// container.register_assembly(&defaults).unwrap();
/// assert_eq!(*container.resolve::<u64>().unwrap(), 30);
/// ```
pub struct FnAssembly<F> {
    name: String,
    assemble: F,
}

impl<F> FnAssembly<F>
where
    F: Fn(&Container) -> DiResult<()>,
{
    pub fn new(name: impl Into<String>, assemble: F) -> Self {
        Self {
            name: name.into(),
            assemble,
        }
    }
}

impl<F> Assembly for FnAssembly<F>
where
    F: Fn(&Container) -> DiResult<()>,
{
    fn name(&self) -> &str {
        &self.name
    }

    fn assemble(&self, container: &Container) -> DiResult<()> {
        (self.assemble)(container)
    }
}
