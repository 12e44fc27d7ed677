//! Snapshot persistence through the filesystem

mod common;

use pcc_runtime::{TypedValue, Value, ValueSnapshot, key};
use std::fs;
use tempfile::TempDir;

fn inventory() -> Value {
    Value::record(vec![
        (key!(owner), Value::from("warehouse 7")),
        (
            key!(items),
            Value::from(vec![
                Value::data([Value::from(1), Value::from(String::from("bolt")), Value::from(40)]),
                Value::data([Value::from(1), Value::from("nut"), Value::from(125)]),
                Value::data([Value::from(0)]),
            ]),
        ),
        (key!(open), Value::from(true)),
    ])
}

#[test]
fn test_snapshot_survives_file_round_trip() {
    common::init_tracing();
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("inventory.bin");

    let original = inventory();
    fs::write(&path, original.to_bytes().unwrap()).unwrap();

    let restored = TypedValue::from_bytes(&fs::read(&path).unwrap())
        .unwrap()
        .to_value();

    assert_eq!(restored.lookup(key!(owner)), "warehouse 7");
    assert!(restored.lookup(key!(open)).as_bool());

    let items = restored.lookup(key!(items));
    assert_eq!(items.size(), 3);
    assert_eq!(items.at(0).field(1), "bolt");
    assert_eq!(items.at(1).field(2), 125);
    assert_eq!(items.at(2).ctor(), 0);
    assert_eq!(items.at(2).field_count(), 1);
}

#[test]
fn test_restored_graph_is_independent() {
    let original = inventory();
    let restored = original.to_typed().unwrap().to_value();

    restored.lookup(key!(items)).push(Value::from(0));
    assert_eq!(restored.lookup(key!(items)).size(), 4);
    assert_eq!(original.lookup(key!(items)).size(), 3);
}

#[test]
fn test_snapshot_bytes_are_deterministic() {
    let dir = TempDir::new().unwrap();
    let first = dir.path().join("a.bin");
    let second = dir.path().join("b.bin");

    fs::write(&first, inventory().to_bytes().unwrap()).unwrap();
    fs::write(&second, inventory().to_bytes().unwrap()).unwrap();
    assert_eq!(fs::read(first).unwrap(), fs::read(second).unwrap());
}

#[test]
fn test_debug_string_of_restored_record() {
    let typed = inventory().to_typed().unwrap();
    assert_eq!(
        typed.to_debug_string(),
        "{ owner: \"warehouse 7\", items: [(Data 1 \"bolt\" 40), (Data 1 \"nut\" 125), (Data 0)], open: true }"
    );
}
