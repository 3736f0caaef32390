//! Invocation adapter: turns an executable plus parameter suppliers into a supplier.

use crate::error::{InjectError, InjectResult};
use crate::executable::{AnySupplier, Args, Executable};
use crate::key::Key;
use crate::lifetime::Lifetime;
use crate::supplier::{singleton, Supplier};

/// Highest number of positional parameters supported by default.
pub const DEFAULT_MAX_ARITY: usize = 10;

/// Creates suppliers for executables.
///
/// The injector calls [`validate`](InvocationAdapter::validate) while
/// building the dependency graph and [`create`](InvocationAdapter::create)
/// the first time a bound key is demanded.
pub trait InvocationAdapter: Send + Sync {
    /// Rejects executables this adapter cannot invoke.
    fn validate(&self, executable: &Executable) -> InjectResult<()>;

    /// Supplier that calls `executable` with the values of `parameters`.
    ///
    /// `parameters` are positional and match `executable.dependencies()`.
    fn create(&self, executable: &Executable, parameters: Vec<(Key, AnySupplier)>) -> AnySupplier;
}

/// Default adapter: positional invocation with an arity limit, caching
/// according to the executable's [`Lifetime`]. Post-construct hooks run
/// inside the cache, once per constructed value.
#[derive(Debug, Clone)]
pub struct DefaultAdapter {
    max_arity: usize,
}

impl DefaultAdapter {
    pub fn new(max_arity: usize) -> Self {
        Self { max_arity }
    }

    pub fn max_arity(&self) -> usize {
        self.max_arity
    }
}

impl Default for DefaultAdapter {
    fn default() -> Self {
        Self::new(DEFAULT_MAX_ARITY)
    }
}

impl InvocationAdapter for DefaultAdapter {
    fn validate(&self, executable: &Executable) -> InjectResult<()> {
        if executable.arity() > self.max_arity {
            return Err(InjectError::ArityExceeded {
                name: executable.name(),
                count: executable.arity(),
                max: self.max_arity,
            });
        }
        Ok(())
    }

    fn create(&self, executable: &Executable, parameters: Vec<(Key, AnySupplier)>) -> AnySupplier {
        let executable = executable.clone();
        let lifetime = executable.lifetime();
        let invoke = move || {
            let values = parameters
                .iter()
                .map(|(key, supplier)| supplier.get().map(|value| (*key, value)))
                .collect::<InjectResult<Vec<_>>>()?;
            let value = executable.invoke(Args::new(values))?;
            executable.post_construct(&value)?;
            Ok(value)
        };

        match lifetime {
            Lifetime::Transient => Supplier::new(invoke),
            Lifetime::Singleton { eager } => singleton(invoke, eager),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::executable::AnyArc;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    struct Wide;

    fn wide(count: usize) -> Executable {
        let dependencies = (0..count).map(|_| Key::of::<u8>()).collect();
        Executable::dynamic::<Wide, _>(dependencies, Lifetime::Transient, |_| Ok(Wide))
    }

    #[test]
    fn arity_limit_is_inclusive() {
        let adapter = DefaultAdapter::default();
        assert!(adapter.validate(&wide(10)).is_ok());
        assert_eq!(
            adapter.validate(&wide(11)),
            Err(InjectError::ArityExceeded { name: std::any::type_name::<Wide>(), count: 11, max: 10 })
        );
    }

    #[test]
    fn eager_singleton_invokes_on_create() {
        let calls = Arc::new(AtomicUsize::new(0));
        let counter = calls.clone();
        let executable = Executable::dynamic::<usize, _>(vec![], Lifetime::EAGER_SINGLETON, move |_| {
            Ok(counter.fetch_add(1, Ordering::SeqCst))
        });

        let supplier = DefaultAdapter::default().create(&executable, Vec::new());
        assert_eq!(calls.load(Ordering::SeqCst), 1);

        let first = supplier.get().unwrap();
        let second = supplier.get().unwrap();
        assert!(Arc::ptr_eq(&first, &second));
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn post_construct_runs_once_per_singleton() {
        struct Pool {
            started: AtomicUsize,
        }

        let executable = Executable::from_constructor::<Pool, _, _>(
            || Pool { started: AtomicUsize::new(0) },
            Lifetime::SINGLETON,
        )
        .with_post_construct(|pool: &Pool| {
            pool.started.fetch_add(1, Ordering::SeqCst);
        });

        let supplier = DefaultAdapter::default().create(&executable, Vec::new());
        let first = supplier.get().unwrap().downcast::<Pool>().unwrap();
        let second = supplier.get().unwrap().downcast::<Pool>().unwrap();
        assert!(Arc::ptr_eq(&first, &second));
        assert_eq!(first.started.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn post_construct_for_wrong_type_fails_construction() {
        let executable = Executable::from_constructor::<u8, _, _>(|| 1u8, Lifetime::Transient)
            .with_post_construct(|_: &u16| {});

        let supplier = DefaultAdapter::default().create(&executable, Vec::new());
        assert_eq!(supplier.get().unwrap_err(), InjectError::TypeMismatch("u8"));
    }

    #[test]
    fn parameters_are_passed_in_order() {
        let executable = Executable::dynamic::<String, _>(
            vec![Key::of::<u32>(), Key::of::<&'static str>()],
            Lifetime::Transient,
            |mut args| {
                let number = args.next::<Arc<u32>>()?;
                let text = args.next::<Arc<&'static str>>()?;
                Ok(format!("{}-{}", text, number))
            },
        );
        let parameters = vec![
            (Key::of::<u32>(), Supplier::new(|| Ok(Arc::new(7u32) as AnyArc))),
            (Key::of::<&'static str>(), Supplier::new(|| Ok(Arc::new("seven") as AnyArc))),
        ];

        let supplier = DefaultAdapter::default().create(&executable, parameters);
        let value = supplier.get().unwrap().downcast::<String>().unwrap();
        assert_eq!(*value, "seven-7");
    }
}
