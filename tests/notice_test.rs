mod common;

use common::capture_notices;
use polyarray::{init_array_runtime, Array, ArrayConfig, Key, Value, VarTable};

#[ctor::ctor]
fn init() {
    init_array_runtime(ArrayConfig::default()).ok();
}

#[test]
fn missing_keys_raise_a_notice() {
    let dense = Array::from_values([1, 2]);
    let general = Array::from_pairs([("a", 1)]);
    let keys = capture_notices(|| {
        assert_eq!(dense.get_int(7), Value::Null);
        assert_eq!(general.get_str("nope"), Value::Null);
        assert_eq!(general.get(&Key::Int(-1)), Value::Null);
    });
    assert_eq!(keys, ["7", "nope", "-1"]);
}

#[test]
fn present_keys_are_silent() {
    let a = Array::from_pairs([("a", 1)]);
    let keys = capture_notices(|| {
        assert_eq!(a.get_str("a"), Value::Int(1));
        assert_eq!(a.try_get(&Key::from("b")), None);
        assert!(!a.exists(&Key::Int(0)));
    });
    assert!(keys.is_empty());
}

#[test]
fn tables_never_raise_a_notice() {
    let vars = VarTable::new();
    vars.set("x", 1);
    let t = Array::table(vars);
    let keys = capture_notices(|| {
        assert_eq!(t.get_str("x"), Value::Int(1));
        assert_eq!(t.get_str("y"), Value::Null);
        assert_eq!(t.get_int(0), Value::Null);
    });
    assert!(keys.is_empty());
}
