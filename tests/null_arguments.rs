use ferrous_injector::{ConstructorCollection, InjectError, ResolverCore};

#[test]
fn test_missing_key_is_rejected() {
    let mut sc = ConstructorCollection::new();
    sc.add_transient::<u8, _, _>(|| 1u8);

    let injector = sc.build();
    assert_eq!(injector.supplier_any(None).unwrap_err(), InjectError::NullArgument("key"));
    assert_eq!(injector.resolve_any(None).unwrap_err(), InjectError::NullArgument("key"));
    assert!(injector.bound_keys().is_empty());
}

#[test]
fn test_missing_module_list_is_rejected() {
    let injector = ConstructorCollection::new().build();
    assert_eq!(
        injector.configure(None).map(|_| ()).unwrap_err(),
        InjectError::NullArgument("modules")
    );
}

#[test]
fn test_object_safe_resolution() {
    let mut sc = ConstructorCollection::new();
    sc.add_singleton::<u32, _, _>(|| 11u32);

    let injector = sc.build();
    let core: &dyn ResolverCore = &injector;
    let value = core
        .resolve_any(Some(&ferrous_injector::Key::of::<u32>()))
        .unwrap()
        .downcast::<u32>()
        .unwrap();
    assert_eq!(*value, 11);
}
