mod common;

use common::capture_notices;
use polyarray::{init_array_runtime, Array, ArrayConfig, Value};

#[ctor::ctor]
fn init() {
    init_array_runtime(ArrayConfig {
        missing_key_notices: false,
        ..ArrayConfig::default()
    })
    .ok();
}

#[test]
fn disabled_notices_stay_silent() {
    let dense = Array::from_values([1]);
    let general = Array::from_pairs([("a", 1)]);
    let keys = capture_notices(|| {
        assert_eq!(dense.get_int(3), Value::Null);
        assert_eq!(general.get_str("b"), Value::Null);
    });
    assert!(keys.is_empty());
}
