use polyarray::{init_array_runtime, Array, ArrayConfig, ArrayError, Key, Value};

#[ctor::ctor]
fn init() {
    init_array_runtime(ArrayConfig {
        recursion_limit: 64,
        ..ArrayConfig::default()
    })
    .ok();
}

#[test]
fn copy_with_strong_iterators_moves_every_cursor() {
    let mut a = Array::from_values([1, 2, 3]);
    let first = a.new_full_pos().unwrap();
    let second = a.new_full_pos().unwrap();
    a.advance_full_pos(&second);

    let b = a.copy_with_strong_iterators().unwrap();
    assert_eq!(a.strong_iterator_count(), 0);
    assert_eq!(b.strong_iterator_count(), 2);
    assert_eq!(first.owner(), Some(b.id()));
    assert_eq!(b.full_pos_value(&second), Some(Value::Int(2)));
    assert!(!a.full_pos_valid(&first));

    drop(a);
    assert_eq!(second.owner(), Some(b.id()));
    assert_eq!(b.full_pos_key(&first), Some(Key::Int(0)));
}

#[test]
fn plain_copies_leave_cursors_behind() {
    let mut a = Array::from_values([1, 2]);
    let it = a.new_full_pos().unwrap();
    let b = a.copy();
    assert_eq!(it.owner(), Some(a.id()));
    assert_eq!(b.strong_iterator_count(), 0);
}

#[test]
fn copy_on_write_follows_the_writer() {
    let mut a = Array::from_values(["x", "y"]);
    let it = a.new_full_pos().unwrap();
    let reader = a.clone();

    a.set_int(1, "z").unwrap();
    assert!(!Array::ptr_eq(&a, &reader));
    assert_eq!(it.owner(), Some(a.id()));
    assert_eq!(reader.strong_iterator_count(), 0);
    assert!(a.advance_full_pos(&it));
    assert_eq!(a.full_pos_value(&it), Some(Value::from("z")));
}

#[test]
fn escalation_keeps_cursors() {
    let mut a = Array::from_values([1, 2, 3]);
    let it = a.new_full_pos().unwrap();
    a.advance_full_pos(&it);
    a.set_str("k", 4).unwrap();
    assert_eq!(it.owner(), Some(a.id()));
    assert_eq!(a.full_pos_value(&it), Some(Value::Int(2)));
}

#[test]
fn removal_invalidates_only_the_removed_slot() {
    let mut a = Array::from_values(["a", "b", "c"]);
    let on_b = a.new_full_pos().unwrap();
    a.advance_full_pos(&on_b);
    let on_c = a.new_full_pos().unwrap();
    a.advance_full_pos(&on_c);
    a.advance_full_pos(&on_c);

    a.remove_int(1).unwrap();
    assert!(!a.full_pos_valid(&on_b));
    assert!(on_b.is_attached());
    assert_eq!(a.full_pos_value(&on_c), Some(Value::from("c")));
    assert_eq!(a.full_pos_key(&on_c), Some(Key::Int(2)));
}

#[test]
fn freeing_a_cursor() {
    let mut a = Array::from_values([1]);
    let it = a.new_full_pos().unwrap();
    a.free_full_pos(&it).unwrap();
    assert!(!it.is_attached());
    assert_eq!(a.strong_iterator_count(), 0);
    assert!(matches!(a.free_full_pos(&it), Err(ArrayError::Internal(_))));
}

#[test]
fn destroying_the_owner_detaches() {
    let mut a = Array::from_values([1]);
    let it = a.new_full_pos().unwrap();
    drop(a);
    assert!(!it.is_attached());
    assert_eq!(it.owner(), None);
}

#[test]
fn cursors_run_off_the_end() {
    let mut a = Array::from_pairs([("k", 1)]);
    let it = a.new_full_pos().unwrap();
    assert!(a.full_pos_valid(&it));
    assert!(!a.advance_full_pos(&it));
    assert!(!a.full_pos_valid(&it));
    assert_eq!(it.pos(), None);
}
