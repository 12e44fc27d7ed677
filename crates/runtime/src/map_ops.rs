//! Record (Map variant) operations
//!
//! A record is a fixed-size list of `(Key, Value)` slots in construction
//! order. Lookup is a linear scan comparing keys by identity (one pointer
//! compare per slot); key names are never compared.
//!
//! # Examples
//!
//! ```ignore
//! let person = Value::from([
//!     (key!(name), Value::from("Alice")),
//!     (key!(age), Value::from(30)),
//! ]);
//!
//! person.lookup(key!(name));          // -> "Alice"
//! person.contains_key(key!(email));   // -> false
//! person.entry_at(1);                 // -> 30
//! ```
//!
//! An absent key is a contract violation for `lookup`: generated code only
//! reads fields the record was built with.

use crate::error::{ContractViolation, OrRaise};
use crate::value::{Tag, Value};
use pcc_core::Key;

/// Value stored under `key`
pub fn try_lookup(map: &Value, key: Key) -> Result<Value, ContractViolation> {
    let forced = map.force();
    match &*forced {
        Value::Map(entries) => entries
            .iter()
            .find(|(k, _)| *k == key)
            .map(|(_, v)| v.clone())
            .ok_or_else(|| {
                ContractViolation::new("lookup", "record containing the key", Tag::Map)
                    .with_detail(format!("key `{}` not found", key.name()))
            }),
        other => Err(ContractViolation::new("lookup", "Map", other.tag())),
    }
}

/// Whether the record has a slot for `key`
pub fn try_contains_key(map: &Value, key: Key) -> Result<bool, ContractViolation> {
    match &*map.force() {
        Value::Map(entries) => Ok(entries.iter().any(|(k, _)| *k == key)),
        other => Err(ContractViolation::new("contains_key", "Map", other.tag())),
    }
}

/// Value in slot `index` (construction order)
pub fn try_entry_at(map: &Value, index: usize) -> Result<Value, ContractViolation> {
    match &*map.force() {
        Value::Map(entries) => entries.get(index).map(|(_, v)| v.clone()).ok_or_else(|| {
            ContractViolation::new("entry_at", "slot index within bounds", Tag::Map)
                .with_detail(format!("index {}, {} slots", index, entries.len()))
        }),
        other => Err(ContractViolation::new("entry_at", "Map", other.tag())),
    }
}

/// Keys of the record in construction order
pub fn try_keys(map: &Value) -> Result<Vec<Key>, ContractViolation> {
    match &*map.force() {
        Value::Map(entries) => Ok(entries.iter().map(|(k, _)| *k).collect()),
        other => Err(ContractViolation::new("keys", "Map", other.tag())),
    }
}

impl Value {
    pub fn lookup(&self, key: Key) -> Value {
        try_lookup(self, key).or_raise()
    }

    pub fn contains_key(&self, key: Key) -> bool {
        try_contains_key(self, key).or_raise()
    }

    pub fn entry_at(&self, index: usize) -> Value {
        try_entry_at(self, index).or_raise()
    }

    pub fn keys(&self) -> Vec<Key> {
        try_keys(self).or_raise()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pcc_core::key;

    fn point() -> Value {
        Value::from([
            (key!(x), Value::from(1)),
            (key!(y), Value::from(2)),
            (key!(z), Value::from(3)),
        ])
    }

    #[test]
    fn test_lookup_by_identity() {
        let p = point();
        assert_eq!(p.lookup(key!(y)).as_int(), 2);
        assert_eq!(p.lookup(Key::declare("z")).as_int(), 3);
    }

    #[test]
    fn test_lookup_forces_map() {
        let p = Value::thunk(point);
        assert_eq!(p.lookup(key!(x)).as_int(), 1);
    }

    #[test]
    fn test_contains_key() {
        let p = point();
        assert!(p.contains_key(key!(x)));
        assert!(!p.contains_key(key!(map_ops_never_stored)));
    }

    #[test]
    fn test_absent_key_is_violation() {
        let err = try_lookup(&point(), key!(w)).unwrap_err();
        assert_eq!(err.operation, "lookup");
        assert_eq!(err.detail.as_deref(), Some("key `w` not found"));
    }

    #[test]
    fn test_empty_record() {
        let empty = Value::record(Vec::<(Key, Value)>::new());
        assert!(!empty.contains_key(key!(x)));
        assert!(try_lookup(&empty, key!(x)).is_err());
    }

    #[test]
    fn test_positional_access() {
        let p = point();
        assert_eq!(p.entry_at(0).as_int(), 1);
        assert_eq!(p.entry_at(2).as_int(), 3);
        assert!(try_entry_at(&p, 3).is_err());
    }

    #[test]
    fn test_keys_in_construction_order() {
        let keys = point().keys();
        assert_eq!(keys, vec![key!(x), key!(y), key!(z)]);
    }

    #[test]
    fn test_non_map_is_violation() {
        let data = Value::data([Value::from(0)]);
        assert_eq!(try_contains_key(&data, key!(x)).unwrap_err().actual, Tag::Data);
    }

    #[test]
    fn test_first_matching_slot_wins() {
        let dup = Value::record(vec![(key!(a), Value::from(1)), (key!(a), Value::from(2))]);
        assert_eq!(dup.lookup(key!(a)).as_int(), 1);
    }
}
