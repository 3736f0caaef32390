use ferrous_injector::config::{ENV_ENHANCE_AFTER, ENV_MAX_ARITY};
use ferrous_injector::{ConstructorCollection, Executable, InjectError, InjectorOptions, Key, Lifetime, Resolver};
use serial_test::serial;
use std::env;
use std::sync::Arc;

fn clear() {
    env::remove_var(ENV_MAX_ARITY);
    env::remove_var(ENV_ENHANCE_AFTER);
}

#[test]
#[serial]
fn test_env_defaults() {
    clear();
    assert_eq!(InjectorOptions::from_env().unwrap(), InjectorOptions::default());
}

#[test]
#[serial]
fn test_env_overrides() {
    clear();
    env::set_var(ENV_MAX_ARITY, "4");
    env::set_var(ENV_ENHANCE_AFTER, " 7 ");

    let options = InjectorOptions::from_env().unwrap();
    assert_eq!(options.max_arity, 4);
    assert_eq!(options.enhance_after, 7);
    clear();
}

#[test]
#[serial]
fn test_env_rejects_garbage() {
    clear();
    env::set_var(ENV_MAX_ARITY, "ten");
    assert_eq!(InjectorOptions::from_env().unwrap_err(), InjectError::TypeMismatch(ENV_MAX_ARITY));
    clear();
}

#[test]
#[serial]
fn test_env_options_drive_the_injector() {
    clear();
    env::set_var(ENV_MAX_ARITY, "2");

    let mut sc = ConstructorCollection::new();
    sc.with_options(InjectorOptions::from_env().unwrap());
    sc.add_singleton::<u8, _, _>(|| 1u8);
    sc.add_executable(
        Key::of::<u32>(),
        Executable::dynamic::<u32, _>(vec![Key::of::<u8>(); 3], Lifetime::Transient, |mut args| {
            let mut sum = 0u32;
            while args.remaining() > 0 {
                sum += *args.next::<Arc<u8>>()? as u32;
            }
            Ok(sum)
        }),
    );
    clear();

    let injector = sc.build();
    assert_eq!(injector.options().max_arity, 2);
    assert!(matches!(injector.get::<u32>(), Err(InjectError::ArityExceeded { count: 3, max: 2, .. })));
}

#[test]
fn test_zero_enhance_after_still_resolves() {
    use ferrous_injector::Deferred;

    struct Lazy {
        value: Deferred<u16>,
    }

    let mut sc = ConstructorCollection::new();
    sc.with_options(InjectorOptions::new().with_enhance_after(0));
    sc.add_singleton::<u16, _, _>(|| 16u16);
    sc.add_transient::<Lazy, _, _>(|value: Deferred<u16>| Lazy { value });

    let injector = sc.build();
    let lazy = injector.get_required::<Lazy>();
    for _ in 0..5 {
        assert_eq!(*lazy.value.get_required(), 16);
    }
}

#[cfg(feature = "config")]
#[test]
fn test_json_options() {
    let options = InjectorOptions::from_json(r#"{ "max_arity": 6 }"#).unwrap();
    assert_eq!(options.max_arity, 6);
    assert_eq!(options.enhance_after, 3);

    let round = serde_json::to_string(&options).unwrap();
    assert_eq!(InjectorOptions::from_json(&round).unwrap(), options);
}
