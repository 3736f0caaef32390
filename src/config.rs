//! Injector options.
//!
//! Options can be set in code, read from the environment, or (with the
//! `config` feature) deserialized from JSON.

use std::env;

#[cfg(feature = "config")]
use serde::{Deserialize, Serialize};

use crate::adapter::DEFAULT_MAX_ARITY;
use crate::error::{InjectError, InjectResult};
use crate::supplier::DEFAULT_ENHANCE_AFTER;

/// Environment variable overriding [`InjectorOptions::max_arity`].
pub const ENV_MAX_ARITY: &str = "FERROUS_INJECTOR_MAX_ARITY";

/// Environment variable overriding [`InjectorOptions::enhance_after`].
pub const ENV_ENHANCE_AFTER: &str = "FERROUS_INJECTOR_ENHANCE_AFTER";

/// Tunables of an [`Injector`](crate::Injector).
///
/// # Examples
///
/// ```rust
/// use ferrous_injector::InjectorOptions;
///
/// let options = InjectorOptions::new().with_max_arity(4).with_enhance_after(8);
/// assert_eq!(options.max_arity, 4);
/// assert_eq!(options.enhance_after, 8);
///
/// let defaults = InjectorOptions::default();
/// assert_eq!(defaults.max_arity, 10);
/// assert_eq!(defaults.enhance_after, 3);
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "config", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "config", serde(default))]
pub struct InjectorOptions {
    /// Highest number of positional parameters the default adapter invokes
    pub max_arity: usize,
    /// Calls a deferred handle serves by store lookup before caching the
    /// looked-up supplier
    pub enhance_after: usize,
}

impl Default for InjectorOptions {
    fn default() -> Self {
        Self {
            max_arity: DEFAULT_MAX_ARITY,
            enhance_after: DEFAULT_ENHANCE_AFTER,
        }
    }
}

impl InjectorOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_max_arity(mut self, max_arity: usize) -> Self {
        self.max_arity = max_arity;
        self
    }

    pub fn with_enhance_after(mut self, enhance_after: usize) -> Self {
        self.enhance_after = enhance_after;
        self
    }

    /// Defaults overridden by `FERROUS_INJECTOR_*` environment variables.
    ///
    /// Unset variables keep their defaults; values that are not unsigned
    /// integers fail with [`InjectError::TypeMismatch`] naming the variable.
    pub fn from_env() -> InjectResult<Self> {
        let mut options = Self::default();
        if let Some(max_arity) = read_usize(ENV_MAX_ARITY)? {
            options.max_arity = max_arity;
        }
        if let Some(enhance_after) = read_usize(ENV_ENHANCE_AFTER)? {
            options.enhance_after = enhance_after;
        }
        Ok(options)
    }

    /// Parses options from JSON; missing fields keep their defaults.
    #[cfg(feature = "config")]
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }
}

fn read_usize(name: &'static str) -> InjectResult<Option<usize>> {
    match env::var(name) {
        Ok(raw) => raw
            .trim()
            .parse::<usize>()
            .map(Some)
            .map_err(|_| InjectError::TypeMismatch(name)),
        Err(_) => Ok(None),
    }
}
