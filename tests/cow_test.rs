use polyarray::{
    init_array_runtime, intern_or_get, Array, ArrayConfig, ArrayError, ArrayKind, Key, Reference,
    Value, VarTable,
};

#[ctor::ctor]
fn init() {
    init_array_runtime(ArrayConfig {
        recursion_limit: 64,
        ..ArrayConfig::default()
    })
    .ok();
}

#[test]
fn handles_behave_as_values() {
    let mut a = Array::from_values([1, 2, 3]);
    let b = a.clone();
    assert_eq!(a.refcount(), 2);

    a.set_int(0, 10).unwrap();
    assert_eq!(a.get_int(0), Value::Int(10));
    assert_eq!(b.get_int(0), Value::Int(1));
    assert_eq!(a.refcount(), 1);
    assert_eq!(b.refcount(), 1);
    assert_ne!(a.id(), b.id());
}

#[test]
fn sole_owner_writes_in_place() {
    let mut a = Array::from_values([1]);
    let id = a.id();
    a.append(2).unwrap();
    a.set_int(0, 5).unwrap();
    assert_eq!(a.id(), id);
    assert_eq!(a.kind(), ArrayKind::Dense);
}

#[test]
fn escalation_keeps_contents_and_position() {
    let mut a = Array::from_values(["a", "b", "c"]);
    a.next().unwrap();
    a.set_str("key", "d").unwrap();
    assert_eq!(a.kind(), ArrayKind::General);
    assert_eq!(a.position(), Some(1));
    assert_eq!(a.current(), Value::from("b"));
    let keys: Vec<Key> = a.iter().map(|(k, _)| k).collect();
    assert_eq!(keys, [Key::Int(0), Key::Int(1), Key::Int(2), Key::from("key")]);
}

#[test]
fn escalation_never_reverses() {
    let mut a = Array::from_values([1, 2]);
    a.escalate().unwrap();
    assert_eq!(a.kind(), ArrayKind::General);
    a.renumber().unwrap();
    a.append(3).unwrap();
    assert_eq!(a.kind(), ArrayKind::General);
    assert_eq!(
        a.escalate(),
        Err(ArrayError::Unimplemented {
            kind: ArrayKind::General,
            op: "escalate"
        })
    );
}

#[test]
fn static_arrays_copy_before_any_write() {
    let interned = intern_or_get(&Array::from_pairs([("x", 1)]), None).unwrap();
    let mut mine = interned.clone();
    mine.set_str("x", 2).unwrap();
    assert_eq!(interned.get_str("x"), Value::Int(1));
    assert_eq!(mine.get_str("x"), Value::Int(2));
    assert!(interned.is_static());
    assert!(!mine.is_static());
}

#[test]
fn references_are_shared_between_copies() {
    let r = Reference::new(1);
    let mut a = Array::new();
    a.append_ref(r.clone()).unwrap();
    let mut b = a.clone();

    // Both copies now hold the same cell.
    b.set_int(0, 2).unwrap();
    assert_eq!(r.get(), Value::Int(2));
    assert_eq!(a.get_int(0).unref(), Value::Int(2));
    // Writing through the cell never touched the array itself.
    assert!(Array::ptr_eq(&a, &b));

    a.remove_int(0).unwrap();
    assert!(b.exists(&Key::Int(0)));
}

#[test]
fn tables_alias_instead_of_copying() {
    let vars = VarTable::new();
    vars.set("x", 1);
    let mut a = Array::table(vars.clone());
    let b = a.clone();

    a.set_str("y", 2).unwrap();
    assert_eq!(a.kind(), ArrayKind::TableAdapter);
    assert_eq!(b.get_str("y"), Value::Int(2));
    assert_eq!(vars.get("y"), Some(Value::Int(2)));

    let copy = a.copy();
    vars.set("z", 3);
    assert_eq!(copy.get_str("z"), Value::Int(3));
}

#[test]
fn unimplemented_writes_are_recoverable() {
    let mut a = Array::table(VarTable::new());
    let err = a.append(1).unwrap_err();
    assert!(err.is_recoverable());
    assert_eq!(a.len(), 0);
}

#[test]
fn invalid_keys_are_fatal() {
    let mut a = Array::new();
    let err = a.set_dyn(&Value::Double(1.5), 1).unwrap_err();
    assert!(matches!(err, ArrayError::InvalidKey(_)));
    assert!(err.is_fatal());
    assert!(a.is_empty());
}
