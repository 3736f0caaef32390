//! Memoization strategies for suppliers.
//!
//! These combinators are independent of the graph builder. The injector uses
//! [`factory_lazy`] for every node it binds, [`singleton`] for singleton
//! executables and [`enhancing`] inside deferred handles.

use std::sync::atomic::{AtomicUsize, Ordering};

use once_cell::sync::OnceCell;

use super::Supplier;

/// Number of calls served by the initial supplier of [`enhancing`].
pub const DEFAULT_ENHANCE_AFTER: usize = 3;

/// Creates the real supplier on first use and delegates to it afterwards.
///
/// `factory` runs at most once, on the first `get`, no matter how many
/// threads race for it. Threads losing the race park until the winner has
/// stored the delegate, then call it as well.
///
/// # Examples
///
/// ```rust
/// use ferrous_injector::supplier::{factory_lazy, Supplier};
/// use std::sync::atomic::{AtomicUsize, Ordering};
/// use std::sync::Arc;
///
/// let built = Arc::new(AtomicUsize::new(0));
/// let counter = built.clone();
/// let supplier = factory_lazy(move || {
///     counter.fetch_add(1, Ordering::SeqCst);
///     Supplier::new(|| "ready")
/// });
///
/// assert_eq!(built.load(Ordering::SeqCst), 0);
/// assert_eq!(supplier.get(), "ready");
/// assert_eq!(supplier.get(), "ready");
/// assert_eq!(built.load(Ordering::SeqCst), 1);
/// ```
pub fn factory_lazy<T, F>(factory: F) -> Supplier<T>
where
    T: 'static,
    F: Fn() -> Supplier<T> + Send + Sync + 'static,
{
    let delegate: OnceCell<Supplier<T>> = OnceCell::new();
    Supplier::new(move || delegate.get_or_init(&factory).get())
}

/// Runs `factory` once and hands out the cached instance afterwards.
///
/// ```rust
/// use ferrous_injector::supplier::lazy;
/// use std::sync::Arc;
///
/// let supplier = lazy(|| Arc::new(String::from("config")));
/// assert!(Arc::ptr_eq(&supplier.get(), &supplier.get()));
/// ```
pub fn lazy<T, F>(factory: F) -> Supplier<T>
where
    T: Clone + Send + Sync + 'static,
    F: Fn() -> T + Send + Sync + 'static,
{
    factory_lazy(move || Supplier::constant(factory()))
}

/// Singleton supplier, built immediately when `eager` is set.
///
/// An eager singleton calls `factory` before this function returns; a lazy
/// one behaves like [`lazy`].
pub fn singleton<T, F>(factory: F, eager: bool) -> Supplier<T>
where
    T: Clone + Send + Sync + 'static,
    F: Fn() -> T + Send + Sync + 'static,
{
    if eager {
        Supplier::constant(factory())
    } else {
        lazy(factory)
    }
}

/// Progressively enhancing supplier with the default threshold.
///
/// Equivalent to `enhancing_after(DEFAULT_ENHANCE_AFTER, initial, enhanced)`.
///
/// ```rust
/// use ferrous_injector::supplier::{enhancing, Supplier};
///
/// let supplier = enhancing(|| 1, || Supplier::new(|| 2));
/// let seen: Vec<i32> = (0..4).map(|_| supplier.get()).collect();
/// assert_eq!(seen, vec![1, 1, 1, 2]);
/// ```
pub fn enhancing<T, I, F>(initial: I, enhanced: F) -> Supplier<T>
where
    T: 'static,
    I: Fn() -> T + Send + Sync + 'static,
    F: Fn() -> Supplier<T> + Send + Sync + 'static,
{
    enhancing_after(DEFAULT_ENHANCE_AFTER, initial, enhanced)
}

/// Serves the first `threshold` calls from `initial`, then switches over.
///
/// The call after the threshold invokes `enhanced` exactly once to obtain a
/// replacement supplier, and that call and every later one are delegated to
/// it. Cheap-to-create paths serve rare calls; the cost of building a faster
/// path is only paid once repeated use warrants it.
pub fn enhancing_after<T, I, F>(threshold: usize, initial: I, enhanced: F) -> Supplier<T>
where
    T: 'static,
    I: Fn() -> T + Send + Sync + 'static,
    F: Fn() -> Supplier<T> + Send + Sync + 'static,
{
    let calls = AtomicUsize::new(0);
    let upgraded: OnceCell<Supplier<T>> = OnceCell::new();

    Supplier::new(move || {
        if let Some(supplier) = upgraded.get() {
            return supplier.get();
        }
        if calls.fetch_add(1, Ordering::AcqRel) < threshold {
            return initial();
        }
        upgraded.get_or_init(&enhanced).get()
    })
}
