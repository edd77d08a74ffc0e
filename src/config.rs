//! Container configuration.
//!
//! Options can be built in code, read from the process environment, or
//! (with the `config` feature) deserialized from JSON.

use std::fmt;
use std::str::FromStr;

#[cfg(feature = "config")]
use serde::{Deserialize, Serialize};

use crate::error::{DiError, DiResult};

/// Environment variable selecting the [`DuplicatePolicy`].
pub const ENV_DUPLICATE_POLICY: &str = "EPOCH_DI_DUPLICATE_POLICY";
/// Environment variable overriding [`ContainerOptions::max_depth`].
pub const ENV_MAX_DEPTH: &str = "EPOCH_DI_MAX_DEPTH";

const DEFAULT_MAX_DEPTH: usize = 256;

/// What `register` does when the key is already bound.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "config", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "config", serde(rename_all = "lowercase"))]
pub enum DuplicatePolicy {
    /// Replace the binding silently.
    Overwrite,
    /// Replace the binding and emit a `tracing` warning.
    #[default]
    Warn,
    /// Keep the existing binding and fail with `DuplicateRegistration`.
    Reject,
}

impl FromStr for DuplicatePolicy {
    type Err = DiError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "overwrite" => Ok(DuplicatePolicy::Overwrite),
            "warn" => Ok(DuplicatePolicy::Warn),
            "reject" => Ok(DuplicatePolicy::Reject),
            other => Err(DiError::InvalidConfig(format!(
                "unknown duplicate policy '{other}' (expected overwrite, warn or reject)"
            ))),
        }
    }
}

impl fmt::Display for DuplicatePolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DuplicatePolicy::Overwrite => f.write_str("overwrite"),
            DuplicatePolicy::Warn => f.write_str("warn"),
            DuplicatePolicy::Reject => f.write_str("reject"),
        }
    }
}

/// Tunables for a [`Container`](crate::Container).
///
/// # Examples
///
/// ```
/// use epoch_di::{Container, ContainerOptions, DuplicatePolicy};
///
/// # fn main() -> epoch_di::DiResult<()> {
/// let options = ContainerOptions::default()
///     .with_duplicate_policy(DuplicatePolicy::Reject)
///     .with_max_depth(32)?;
/// let container = Container::with_options(options);
/// assert_eq!(container.options().max_depth(), 32);
///
/// // A chain must be allowed at least one resolution.
/// assert!(ContainerOptions::default().with_max_depth(0).is_err());
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "config", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "config", serde(default))]
pub struct ContainerOptions {
    duplicate_policy: DuplicatePolicy,
    max_depth: usize,
}

impl Default for ContainerOptions {
    fn default() -> Self {
        Self {
            duplicate_policy: DuplicatePolicy::default(),
            max_depth: DEFAULT_MAX_DEPTH,
        }
    }
}

impl ContainerOptions {
    pub fn with_duplicate_policy(mut self, policy: DuplicatePolicy) -> Self {
        self.duplicate_policy = policy;
        self
    }

    /// Sets the longest resolution chain; zero is refused with `InvalidConfig`.
    pub fn with_max_depth(mut self, max_depth: usize) -> DiResult<Self> {
        self.max_depth = max_depth;
        self.validate()?;
        Ok(self)
    }

    /// Behavior on re-registration of a bound key.
    pub fn duplicate_policy(&self) -> DuplicatePolicy {
        self.duplicate_policy
    }

    /// Longest resolution chain before `DepthExceeded` is reported.
    pub fn max_depth(&self) -> usize {
        self.max_depth
    }

    fn validate(&self) -> DiResult<()> {
        if self.max_depth == 0 {
            return Err(DiError::InvalidConfig("max_depth must be greater than zero".to_string()));
        }
        Ok(())
    }

    /// Reads `EPOCH_DI_DUPLICATE_POLICY` and `EPOCH_DI_MAX_DEPTH`.
    ///
    /// Unset variables keep their defaults; malformed ones are an error.
    pub fn from_env() -> DiResult<Self> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Same as [`from_env`](Self::from_env) with a caller-supplied variable source.
    pub fn from_lookup<F>(lookup: F) -> DiResult<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut options = Self::default();

        if let Some(policy) = lookup(ENV_DUPLICATE_POLICY) {
            options.duplicate_policy = policy.parse()?;
        }

        if let Some(depth) = lookup(ENV_MAX_DEPTH) {
            let depth: usize = depth.trim().parse().map_err(|_| {
                DiError::InvalidConfig(format!("{ENV_MAX_DEPTH} must be a positive integer, got '{depth}'"))
            })?;
            options = options.with_max_depth(depth)?;
        }

        Ok(options)
    }

    /// Parses options from JSON; absent fields keep their defaults.
    #[cfg(feature = "config")]
    pub fn from_json_str(json: &str) -> DiResult<Self> {
        let options: Self = serde_json::from_str(json).map_err(|e| DiError::InvalidConfig(e.to_string()))?;
        options.validate()?;
        Ok(options)
    }
}
