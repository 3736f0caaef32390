//! Dependency key types for the injector.

use std::any::TypeId;
use std::fmt;

/// Identity of a requested dependency.
///
/// A key combines the nominal type, an optional qualifier and a flag telling
/// whether the caller wants a deferred handle ([`Deferred<T>`](crate::Deferred))
/// rather than the instance itself. Two keys are equal when all three parts
/// are equal; the stored type name only serves diagnostics.
///
/// # Examples
///
/// ```rust
/// use ferrous_injector::Key;
///
/// struct Database;
///
/// let plain = Key::of::<Database>();
/// let primary = Key::named::<Database>("primary");
/// let deferred = plain.deferred();
///
/// assert_ne!(plain, primary);
/// assert_ne!(plain, deferred);
/// assert_eq!(deferred.direct(), plain);
/// assert_eq!(primary.qualifier(), Some("primary"));
/// assert!(deferred.is_deferred());
/// ```
#[derive(Clone, Copy)]
pub struct Key {
    type_id: TypeId,
    type_name: &'static str,
    qualifier: Option<&'static str>,
    deferred: bool,
}

impl Key {
    /// Key for an unqualified, direct dependency on `T`.
    #[inline(always)]
    pub fn of<T: ?Sized + 'static>() -> Self {
        Self {
            type_id: TypeId::of::<T>(),
            type_name: std::any::type_name::<T>(),
            qualifier: None,
            deferred: false,
        }
    }

    /// Key for a qualified, direct dependency on `T`.
    pub fn named<T: ?Sized + 'static>(qualifier: &'static str) -> Self {
        Self::of::<T>().qualified(qualifier)
    }

    /// Returns a copy of this key carrying `qualifier`.
    pub fn qualified(self, qualifier: &'static str) -> Self {
        Self { qualifier: Some(qualifier), ..self }
    }

    /// Returns the deferred (supplier-of-T) form of this key.
    pub fn deferred(self) -> Self {
        Self { deferred: true, ..self }
    }

    /// Returns the direct form of this key.
    pub fn direct(self) -> Self {
        Self { deferred: false, ..self }
    }

    /// Whether this key asks for a deferred handle.
    #[inline]
    pub fn is_deferred(&self) -> bool {
        self.deferred
    }

    /// Qualifier of this key, if any.
    pub fn qualifier(&self) -> Option<&'static str> {
        self.qualifier
    }

    /// The `std::any::type_name` of the keyed type.
    pub fn type_name(&self) -> &'static str {
        self.type_name
    }

    /// The `TypeId` of the keyed type.
    pub fn type_id(&self) -> TypeId {
        self.type_id
    }
}

// Type name is diagnostics only, TypeId carries identity
impl PartialEq for Key {
    #[inline(always)]
    fn eq(&self, other: &Self) -> bool {
        self.type_id == other.type_id
            && self.deferred == other.deferred
            && self.qualifier == other.qualifier
    }
}

impl Eq for Key {}

impl std::hash::Hash for Key {
    #[inline(always)]
    fn hash<H: std::hash::Hasher>(&self, state: &mut H) {
        self.type_id.hash(state);
        self.deferred.hash(state);
        self.qualifier.hash(state);
    }
}

// Ordering is by name so diagnostic dumps are stable across runs
impl PartialOrd for Key {
    fn partial_cmp(&self, other: &Self) -> Option<std::cmp::Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Key {
    fn cmp(&self, other: &Self) -> std::cmp::Ordering {
        self.type_name
            .cmp(other.type_name)
            .then_with(|| self.qualifier.cmp(&other.qualifier))
            .then_with(|| self.deferred.cmp(&other.deferred))
            .then_with(|| self.type_id.cmp(&other.type_id))
    }
}

impl fmt::Display for Key {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.deferred {
            f.write_str("Deferred<")?;
        }
        f.write_str(self.type_name)?;
        if let Some(qualifier) = self.qualifier {
            write!(f, " @ \"{}\"", qualifier)?;
        }
        if self.deferred {
            f.write_str(">")?;
        }
        Ok(())
    }
}

impl fmt::Debug for Key {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Key({})", self)
    }
}

/// Shorthand for [`Key::of`].
#[inline(always)]
pub fn key_of_type<T: ?Sized + 'static>() -> Key {
    Key::of::<T>()
}
