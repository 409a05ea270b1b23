use crate::CimInstance;
use crate::CimValue;

fn account(
    uid: u32,
    name: &str,
) -> CimInstance {
    CimInstance::new("LMI_Account")
        .with_key("UserID", CimValue::Uint32(uid))
        .with_property("Name", CimValue::Str(name.to_string()))
}

#[test]
fn test_property_lookup_is_name_indexed() {
    let inst = account(1, "alice");

    assert!(inst.property("UserID").is_some());
    assert!(inst.property("Name").is_some());
    assert!(inst.property("Missing").is_none());
    assert_eq!(inst.key_count(), 1);
    assert_eq!(inst.property_count(), 2);
}

#[test]
fn test_full_eq_ignores_property_order() {
    let a = CimInstance::new("LMI_Account")
        .with_key("UserID", CimValue::Uint32(1))
        .with_property("Name", CimValue::Str("alice".into()));
    let b = CimInstance::new("LMI_Account")
        .with_property("Name", CimValue::Str("alice".into()))
        .with_key("UserID", CimValue::Uint32(1));

    assert!(a.full_eq(&b));
    assert!(b.full_eq(&a));
}

#[test]
fn test_full_eq_detects_value_change() {
    let a = account(1, "alice");
    let b = account(1, "bob");

    assert!(!a.full_eq(&b));
}

#[test]
fn test_full_eq_requires_same_property_count() {
    let a = account(1, "alice");
    let b = account(1, "alice").with_property("Shell", CimValue::Str("/bin/sh".into()));

    assert!(!a.full_eq(&b));
}

#[test]
fn test_value_type_mismatch_is_not_equal() {
    assert_ne!(CimValue::Uint32(1), CimValue::Sint32(1));
    assert_ne!(CimValue::Str("1".into()), CimValue::Uint32(1));
    assert_ne!(CimValue::Boolean(false), CimValue::Opaque);
}

#[test]
fn test_opaque_values_compare_equal() {
    // Permissive fallback for unsupported CIM types.
    assert_eq!(CimValue::Opaque, CimValue::Opaque);
}

#[test]
fn test_array_comparison_is_order_sensitive() {
    let a = CimValue::Array(vec![CimValue::Uint8(1), CimValue::Uint8(2)]);
    let b = CimValue::Array(vec![CimValue::Uint8(2), CimValue::Uint8(1)]);
    let c = CimValue::Array(vec![CimValue::Uint8(1), CimValue::Uint8(2)]);
    let short = CimValue::Array(vec![CimValue::Uint8(1)]);

    assert_ne!(a, b);
    assert_eq!(a, c);
    assert_ne!(a, short);
}

#[test]
fn test_embedded_instance_compares_recursively() {
    let inner_a = account(7, "carol");
    let inner_b = account(7, "carol");
    let inner_c = account(7, "dave");

    assert_eq!(
        CimValue::Instance(Box::new(inner_a.clone())),
        CimValue::Instance(Box::new(inner_b))
    );
    assert_ne!(
        CimValue::Instance(Box::new(inner_a)),
        CimValue::Instance(Box::new(inner_c))
    );
}

#[test]
fn test_set_property_overwrites_in_place() {
    let mut inst = account(1, "alice");
    inst.set_property("Name", CimValue::Str("bob".into()));

    assert_eq!(inst.property_count(), 2);
    assert_eq!(
        inst.property("Name").unwrap().value,
        CimValue::Str("bob".into())
    );
}
