#![no_main]

use arbitrary::Arbitrary;
use libfuzzer_sys::fuzz_target;
use polyarray::{Array, Key, SortFlags, Value};

#[derive(Arbitrary, Debug)]
enum Op {
    SetInt(i8, i32),
    SetStr(u8, i32),
    Append(i32),
    Remove(i8),
    RemoveStr(u8),
    Snapshot,
    Restore,
    Escalate,
    Sort,
    Ksort,
    Renumber,
    Pop,
}

fn str_key(k: u8) -> String {
    format!("s{}", k % 8)
}

fn contents(arr: &Array) -> Vec<(Key, Value)> {
    arr.iter().collect()
}

// Every operation keeps `arr` a value: snapshots taken earlier never change.
fuzz_target!(|ops: Vec<Op>| {
    let mut arr = Array::new();
    let mut snapshots: Vec<(Array, Vec<(Key, Value)>)> = Vec::new();

    for op in ops {
        match op {
            Op::SetInt(k, v) => arr.set_int(i64::from(k), v).unwrap(),
            Op::SetStr(k, v) => arr.set_str(&str_key(k), v).unwrap(),
            Op::Append(v) => arr.append(v).unwrap(),
            Op::Remove(k) => {
                arr.remove_int(i64::from(k)).unwrap();
            }
            Op::RemoveStr(k) => {
                arr.remove_str(&str_key(k)).unwrap();
            }
            Op::Snapshot => {
                let snapshot = contents(&arr);
                snapshots.push((arr.clone(), snapshot));
            }
            Op::Restore => {
                if let Some((old, _)) = snapshots.pop() {
                    arr = old;
                }
            }
            Op::Escalate => {
                let _ = arr.escalate();
            }
            Op::Sort => arr.sort(SortFlags::Regular, true).unwrap(),
            Op::Ksort => arr.ksort(SortFlags::Regular, true).unwrap(),
            Op::Renumber => arr.renumber().unwrap(),
            Op::Pop => {
                arr.pop().unwrap();
            }
        }
        assert_eq!(arr.len(), contents(&arr).len());
        assert!(arr.equal(&arr).unwrap());
    }

    for (arr, expected) in &snapshots {
        assert_eq!(&contents(arr), expected);
    }
});
