//! Binding lifetime definitions.

/// Lifetimes controlling how the supplier bound for a key caches instances
///
/// # Lifetime Characteristics
///
/// - **Transient**: every `get` runs the executable again
/// - **Singleton**: the executable runs once, on the first `get`
/// - **Singleton (eager)**: the executable runs once, when its supplier is created
///
/// # Examples
///
/// ```rust
/// use ferrous_injector::{ConstructorCollection, Resolver};
/// use std::sync::Arc;
/// use std::sync::atomic::{AtomicUsize, Ordering};
///
/// struct Connection(usize);
/// struct Request(usize);
///
/// static OPENED: AtomicUsize = AtomicUsize::new(0);
///
/// let mut services = ConstructorCollection::new();
/// services.add_singleton::<Connection, _, _>(|| {
///     Connection(OPENED.fetch_add(1, Ordering::SeqCst))
/// });
/// services.add_transient::<Request, _, _>(|conn: Arc<Connection>| Request(conn.0));
///
/// let injector = services.build();
///
/// let a = injector.get_required::<Request>();
/// let b = injector.get_required::<Request>();
/// assert!(!Arc::ptr_eq(&a, &b)); // transient
/// assert_eq!(OPENED.load(Ordering::SeqCst), 1); // singleton
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "config", derive(serde::Serialize, serde::Deserialize))]
pub enum Lifetime {
    /// New instance per `get`, never cached
    #[default]
    Transient,
    /// Single instance per injector
    ///
    /// With `eager` set the instance is built as soon as the supplier is
    /// created; otherwise it is built by the first caller and every other
    /// caller waits for that result.
    Singleton {
        /// Build at supplier creation rather than first use
        eager: bool,
    },
}

impl Lifetime {
    /// Lazy singleton lifetime.
    pub const SINGLETON: Lifetime = Lifetime::Singleton { eager: false };

    /// Eager singleton lifetime.
    pub const EAGER_SINGLETON: Lifetime = Lifetime::Singleton { eager: true };

    /// Whether instances are cached.
    pub fn is_singleton(&self) -> bool {
        matches!(self, Lifetime::Singleton { .. })
    }

    /// Whether the instance is built when the supplier is created.
    pub fn is_eager(&self) -> bool {
        matches!(self, Lifetime::Singleton { eager: true })
    }
}
