use std::cmp::Ordering;

use polyarray::{
    init_array_runtime, Array, ArrayConfig, ArrayError, ArrayKind, Key, Reference, SortFlags,
    Value, VarTable,
};

const LIMIT: usize = 64;

#[ctor::ctor]
fn init() {
    init_array_runtime(ArrayConfig {
        recursion_limit: LIMIT,
        ..ArrayConfig::default()
    })
    .ok();
}

fn samples() -> Vec<Array> {
    vec![
        Array::new(),
        Array::from_values([1, 2, 3]),
        Array::from_pairs([(Key::Int(2), 3), (Key::Int(0), 1), (Key::Int(1), 2)]),
        Array::from_pairs([("a", Value::Null), ("b", Value::Bool(false))]),
        Array::from_pairs([("b", Value::Int(0)), ("a", Value::Null)]),
        Array::from_values([Value::Array(Array::from_values(["x"]))]),
        Array::immutable_from_pairs([(0, 1), (1, 2), (2, 3)]),
    ]
}

#[test]
fn equality_laws() {
    let all = samples();
    for a in &all {
        assert!(a.equal(a).unwrap());
        assert!(a.same(a).unwrap());
        assert_eq!(a.compare(a), Ok(Ordering::Equal));
        for b in &all {
            let ab = a.equal(b).unwrap();
            assert_eq!(ab, b.equal(a).unwrap());
            if a.same(b).unwrap() {
                assert!(ab);
            }
        }
    }
    // Same content, different order.
    assert!(all[1].equal(&all[2]).unwrap());
    assert!(!all[1].same(&all[2]).unwrap());
    // Representation does not matter.
    assert!(all[1].same(&all[6]).unwrap());
}

#[test]
fn dequeue_renumbers_integer_keys() {
    let mut a = Array::from_pairs([
        (Key::Int(5), Value::from("a")),
        (Key::Int(7), Value::from("b")),
        (Key::from("k"), Value::from("c")),
    ]);
    assert_eq!(a.dequeue().unwrap(), Value::from("a"));
    let pairs: Vec<(Key, Value)> = a.iter().collect();
    assert_eq!(
        pairs,
        [
            (Key::Int(0), Value::from("b")),
            (Key::from("k"), Value::from("c")),
        ]
    );
    a.append("d").unwrap();
    assert_eq!(a.get_int(1), Value::from("d"));
}

#[test]
fn missing_keys_read_as_null_every_time() {
    let a = Array::from_values([1]);
    for _ in 0..3 {
        assert_eq!(a.get_int(7), Value::Null);
        assert_eq!(a.get_str("nope"), Value::Null);
    }
    assert_eq!(a.try_get(&Key::Int(7)), None);
    assert_eq!(a.len(), 1);
}

#[test]
fn cycles_hit_the_recursion_limit() {
    let r = Reference::new(Value::Null);
    let mut a = Array::new();
    a.append_ref(r.clone()).unwrap();
    r.set(a.clone());

    assert_eq!(a.equal(&a), Err(ArrayError::RecursionLimit(LIMIT)));
    assert_eq!(a.compare(&a), Err(ArrayError::RecursionLimit(LIMIT)));
    // Aliased cells are identical without looking inside.
    assert_eq!(a.same(&a), Ok(true));
    assert!(a.has_internal_reference());

    r.set(Value::Null);
    assert_eq!(a.equal(&a), Ok(true));
}

#[test]
fn deep_nesting_hits_the_recursion_limit() {
    let mut deep = Array::from_values([0]);
    for _ in 0..LIMIT + 1 {
        deep = Array::from_values([Value::Array(deep)]);
    }
    assert_eq!(
        deep.equal(&deep.copy()),
        Err(ArrayError::RecursionLimit(LIMIT))
    );
    assert!(deep.canonical_key().is_err());
}

#[test]
fn tables_do_not_sort() {
    let vars = VarTable::new();
    vars.set("b", 1);
    vars.set("a", 2);
    let mut t = Array::table(vars);
    let err = t.ksort(SortFlags::Regular, true).unwrap_err();
    assert_eq!(
        err,
        ArrayError::Unimplemented {
            kind: ArrayKind::TableAdapter,
            op: "ksort"
        }
    );
    assert!(err.is_recoverable());
}

#[test]
fn sort_family() {
    let mut a = Array::from_pairs([("b", 2), ("c", 1), ("a", 3)]);
    a.ksort(SortFlags::Regular, true).unwrap();
    let keys: Vec<Key> = a.iter().map(|(k, _)| k).collect();
    assert_eq!(keys, [Key::from("a"), Key::from("b"), Key::from("c")]);

    a.asort(SortFlags::Regular, false).unwrap();
    let keys: Vec<Key> = a.iter().map(|(k, _)| k).collect();
    assert_eq!(keys, [Key::from("a"), Key::from("b"), Key::from("c")]);

    a.sort(SortFlags::Regular, true).unwrap();
    let pairs: Vec<(Key, Value)> = a.iter().collect();
    assert_eq!(
        pairs,
        [
            (Key::Int(0), Value::Int(1)),
            (Key::Int(1), Value::Int(2)),
            (Key::Int(2), Value::Int(3)),
        ]
    );

    let mut words = Array::from_values(["10", "9", "100"]);
    words.sort(SortFlags::String, true).unwrap();
    assert_eq!(words.get_int(0), Value::from("10"));
    words.sort(SortFlags::Numeric, true).unwrap();
    assert_eq!(words.get_int(0), Value::from("9"));

    let mut by_len = Array::from_pairs([("x", "ccc"), ("y", "a"), ("z", "bb")]);
    by_len
        .uasort(|a, b| a.to_text().len().cmp(&b.to_text().len()))
        .unwrap();
    assert_eq!(by_len.key_at(0), Some(Key::from("y")));
    by_len.uksort(|a, b| b.sort_cmp(a, SortFlags::Regular)).unwrap();
    assert_eq!(by_len.key_at(0), Some(Key::from("z")));
}

#[test]
fn prepend_renumbers_and_resets() {
    let mut a = Array::from_pairs([(Key::Int(3), Value::from("x")), (Key::from("k"), Value::from("y"))]);
    a.next().unwrap();
    a.prepend("w").unwrap();
    assert_eq!(a.key_at(0), Some(Key::Int(0)));
    assert_eq!(a.get_int(1), Value::from("x"));
    assert_eq!(a.current(), Value::from("w"));
}

#[test]
fn union_and_merge_policies() {
    let right = Array::from_pairs([(Key::Int(0), Value::from("r0")), (Key::from("k"), Value::from("rk"))]);

    let mut plus = Array::from_pairs([(Key::Int(0), Value::from("l0")), (Key::from("k"), Value::from("lk"))]);
    plus.plus(&right).unwrap();
    assert_eq!(plus.len(), 2);
    assert_eq!(plus.get_int(0), Value::from("l0"));
    assert_eq!(plus.get_str("k"), Value::from("lk"));

    let mut merged = Array::from_pairs([(Key::Int(0), Value::from("l0")), (Key::from("k"), Value::from("lk"))]);
    merged.merge(&right).unwrap();
    assert_eq!(merged.len(), 3);
    assert_eq!(merged.get_int(1), Value::from("r0"));
    assert_eq!(merged.get_str("k"), Value::from("rk"));
}

fn mixed_keys() -> Array {
    Array::from_pairs((0..200).map(|i: i64| {
        let n = (i * 7919) % 1000;
        let key = if i % 2 == 0 {
            Key::Int(n)
        } else {
            Key::from(format!("{}a", n))
        };
        (key, i)
    }))
}

#[test]
fn ksort_of_mixed_keys_is_ordered() {
    for flags in [SortFlags::Regular, SortFlags::Numeric, SortFlags::String] {
        for ascending in [true, false] {
            let mut a = mixed_keys();
            let len = a.len();
            a.ksort(flags, ascending).unwrap();
            assert_eq!(a.len(), len);
            let keys: Vec<Key> = a.iter().map(|(k, _)| k).collect();
            for pair in keys.windows(2) {
                let ord = pair[0].sort_cmp(&pair[1], flags);
                if ascending {
                    assert_ne!(ord, Ordering::Greater, "{:?}", pair);
                } else {
                    assert_ne!(ord, Ordering::Less, "{:?}", pair);
                }
            }
        }
    }

    let mut a = mixed_keys();
    a.ksort(SortFlags::Regular, true).unwrap();
    assert_eq!(a.key_at(0), Some(Key::Int(0)));
    assert!(matches!(a.key_at(a.len() - 1), Some(Key::Str(_))));
}

fn mixed_values() -> Vec<Value> {
    let pool = [
        Value::from("b"),
        Value::Int(10),
        Value::Double(f64::NAN),
        Value::Bool(true),
        Value::Null,
        Value::from("10a"),
        Value::from("9"),
        Value::Double(2.5),
        Value::Array(Array::from_values([1])),
        Value::Array(Array::from_pairs([("k", "v")])),
        Value::Array(Array::new()),
        Value::Bool(false),
        Value::from(""),
        Value::Int(-3),
        Value::from("010"),
    ];
    (0..200).map(|i| pool[(i * 7) % pool.len()].clone()).collect()
}

#[test]
fn value_sorts_of_mixed_types_are_ordered() {
    for flags in [SortFlags::Regular, SortFlags::Numeric, SortFlags::String] {
        let mut a = Array::from_values(mixed_values());
        a.sort(flags, true).unwrap();
        assert_eq!(a.len(), 200);
        let values: Vec<Value> = a.iter().map(|(_, v)| v).collect();
        if flags == SortFlags::Regular {
            for pair in values.windows(2) {
                assert_ne!(pair[0].sort_cmp(&pair[1]), Ok(Ordering::Greater), "{:?}", pair);
            }
            assert_eq!(values[0], Value::Null);
            assert!(values[199].as_array().is_some());
        }

        let mut b = Array::from_pairs(mixed_values().into_iter().enumerate().map(|(i, v)| (i as i64, v)));
        b.asort(flags, false).unwrap();
        assert_eq!(b.len(), 200);
    }
}

#[test]
fn sorting_a_cycle_fails_cleanly() {
    let r = Reference::new(Value::Null);
    let mut a = Array::from_values([2, 1]);
    a.append_ref(r.clone()).unwrap();
    r.set(a.clone());

    assert_eq!(a.sort(SortFlags::Regular, true), Err(ArrayError::RecursionLimit(LIMIT)));
    assert_eq!(a.asort(SortFlags::Regular, true), Err(ArrayError::RecursionLimit(LIMIT)));
    assert_eq!(a.get_int(0), Value::Int(2));

    r.set(Value::Null);
    a.sort(SortFlags::Regular, true).unwrap();
    assert_eq!(a.get_int(1), Value::Int(1));
    assert_eq!(a.get_int(2), Value::Int(2));
}

#[test]
fn numeric_strings_are_equal_both_ways() {
    let a = Array::from_values(["1"]);
    let b = Array::from_values(["01"]);
    assert!(a.equal(&b).unwrap());
    assert_eq!(a.compare(&b), Ok(Ordering::Equal));

    let c = Array::from_values(["1a"]);
    assert!(!a.equal(&c).unwrap());
    assert_ne!(a.compare(&c), Ok(Ordering::Equal));
}
