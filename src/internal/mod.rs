//! Internal implementation details.

pub(crate) mod circular;
pub(crate) mod waits;

pub(crate) use circular::{ActiveGuard, Frame, ResolutionPath};
pub(crate) use waits::WaitGraph;

#[cfg(feature = "ahash")]
pub(crate) type FastMap<K, V> = std::collections::HashMap<K, V, ahash::RandomState>;
#[cfg(not(feature = "ahash"))]
pub(crate) type FastMap<K, V> = std::collections::HashMap<K, V>;
