//! Error types for the injector.

use thiserror::Error;

/// Injection errors
///
/// Every failure is raised synchronously from the call that triggered graph
/// expansion or construction. A failed build never publishes partial results
/// to the binding store.
///
/// # Examples
///
/// ```rust
/// use ferrous_injector::InjectError;
///
/// let cycle = InjectError::CycleDetected(vec!["A", "B", "A"]);
/// assert_eq!(cycle.to_string(), "Cycle detected: A -> B -> A");
///
/// let arity = InjectError::ArityExceeded { name: "Wide", count: 11, max: 10 };
/// assert_eq!(arity.to_string(), "Wide takes 11 parameters, at most 10 are supported");
/// ```
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum InjectError {
    /// A missing key, module list or other required argument
    #[error("Null argument: {0}")]
    NullArgument(&'static str),
    /// Non-deferred key repeated on the active resolution path
    #[error("Cycle detected: {}", .0.join(" -> "))]
    CycleDetected(Vec<&'static str>),
    /// No executable is registered for the key
    #[error("Unable to locate constructor for {0}")]
    UnresolvedDependency(&'static str),
    /// The executable has more positional parameters than the adapter supports
    #[error("{name} takes {count} parameters, at most {max} are supported")]
    ArityExceeded {
        name: &'static str,
        count: usize,
        max: usize,
    },
    /// A module binding points at an implementation nobody provides
    #[error("No provider bound for {0}")]
    MissingBinding(&'static str),
    /// A type-erased value did not have the requested type
    #[error("Type mismatch for: {0}")]
    TypeMismatch(&'static str),
    /// A deferred handle was used after its injector was dropped
    #[error("Injector dropped before {0} was resolved")]
    InjectorDropped(&'static str),
}

/// Result type for injector operations
pub type InjectResult<T> = Result<T, InjectError>;
