//! Array operations
//!
//! An `Array` is a shared, mutable sequence of values. Every holder of the
//! same array sees appends and removals made through any other holder; there
//! is no copy-on-write. The element cell is a `RefCell`, so an array (and
//! any value holding one) stays on the thread that built it under either
//! counting backend.
//!
//! Borrows of the element sequence are short: each method takes the inner
//! borrow for its own duration only, so an element may itself be (or
//! contain) the array without a borrow conflict during ordinary access.

use crate::error::{ContractViolation, OrRaise};
use crate::value::{Tag, Value};
use pcc_core::{Managed, make_managed};
use std::cell::RefCell;

/// Shared handle to an array payload
#[derive(Clone)]
pub struct Array {
    items: Managed<RefCell<Vec<Value>>>,
}

impl Array {
    pub fn new() -> Self {
        Array::from(Vec::new())
    }

    pub fn len(&self) -> usize {
        self.items.borrow().len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.borrow().is_empty()
    }

    /// Element at `index`, or None past the end
    pub fn get(&self, index: usize) -> Option<Value> {
        self.items.borrow().get(index).cloned()
    }

    pub fn push(&self, value: Value) {
        self.items.borrow_mut().push(value);
    }

    pub fn pop(&self) -> Option<Value> {
        self.items.borrow_mut().pop()
    }

    /// Insert at `index`, shifting later elements; `index` may equal `len`
    pub fn insert(&self, index: usize, value: Value) -> Result<(), ContractViolation> {
        let mut items = self.items.borrow_mut();
        if index > items.len() {
            return Err(out_of_bounds("insert", index, items.len()));
        }
        items.insert(index, value);
        Ok(())
    }

    /// Remove and return the element at `index`
    pub fn remove(&self, index: usize) -> Result<Value, ContractViolation> {
        let mut items = self.items.borrow_mut();
        if index >= items.len() {
            return Err(out_of_bounds("remove", index, items.len()));
        }
        Ok(items.remove(index))
    }

    /// Copy of the current elements (element payloads are shared, not deep-copied)
    pub fn to_vec(&self) -> Vec<Value> {
        self.items.borrow().clone()
    }

    /// True when both handles share one payload
    pub fn ptr_eq(&self, other: &Array) -> bool {
        Managed::ptr_eq(&self.items, &other.items)
    }

    /// Payload address, the identity `ptr_eq` compares
    pub fn as_ptr(&self) -> *const () {
        Managed::as_ptr(&self.items)
    }

    /// Number of holders sharing this array
    pub fn holders(&self) -> usize {
        Managed::strong_count(&self.items)
    }
}

impl Default for Array {
    fn default() -> Self {
        Array::new()
    }
}

impl From<Vec<Value>> for Array {
    fn from(items: Vec<Value>) -> Self {
        Array {
            items: make_managed(RefCell::new(items)),
        }
    }
}

impl FromIterator<Value> for Array {
    fn from_iter<I: IntoIterator<Item = Value>>(iter: I) -> Self {
        Array::from(iter.into_iter().collect::<Vec<_>>())
    }
}

fn out_of_bounds(operation: &'static str, index: usize, len: usize) -> ContractViolation {
    ContractViolation::new(operation, "index within bounds", Tag::Array)
        .with_detail(format!("index {}, length {}", index, len))
}

/// Element of an Array value at a native index
pub fn try_at(array: &Value, index: usize) -> Result<Value, ContractViolation> {
    let forced = array.force();
    match &*forced {
        Value::Array(a) => a.get(index).ok_or_else(|| out_of_bounds("at", index, a.len())),
        other => Err(ContractViolation::new("at", "Array", other.tag())),
    }
}

/// Element of an Array value at a dynamic Integer index
pub fn try_at_value(array: &Value, index: &Value) -> Result<Value, ContractViolation> {
    let index = index.try_as_usize()?;
    try_at(array, index)
}

impl Value {
    pub fn at(&self, index: usize) -> Value {
        try_at(self, index).or_raise()
    }

    pub fn at_value(&self, index: &Value) -> Value {
        try_at_value(self, index).or_raise()
    }

    /// Append to an Array value in place (visible to every holder)
    pub fn try_push(&self, element: Value) -> Result<(), ContractViolation> {
        self.try_as_array().map(|a| a.push(element)).map_err(|mut v| {
            v.operation = "push";
            v
        })
    }

    pub fn push(&self, element: Value) {
        self.try_push(element).or_raise()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn numbers() -> Value {
        Value::from(vec![Value::from(10), Value::from(20), Value::from(30)])
    }

    #[test]
    fn test_at_native_index() {
        let xs = numbers();
        assert_eq!(xs.at(0).as_int(), 10);
        assert_eq!(xs.at(2).as_int(), 30);
    }

    #[test]
    fn test_at_dynamic_index() {
        let xs = numbers();
        assert_eq!(xs.at_value(&Value::from(1)).as_int(), 20);
    }

    #[test]
    fn test_at_forces_array() {
        let xs = Value::thunk(numbers);
        assert_eq!(xs.at(1).as_int(), 20);
    }

    #[test]
    fn test_out_of_bounds_is_violation() {
        let err = try_at(&numbers(), 3).unwrap_err();
        assert_eq!(err.detail.as_deref(), Some("index 3, length 3"));

        assert!(try_at_value(&numbers(), &Value::from(-1)).is_err());
        assert!(try_at_value(&numbers(), &Value::from("0")).is_err());
    }

    #[test]
    fn test_at_on_non_array_is_violation() {
        let err = try_at(&Value::from("abc"), 0).unwrap_err();
        assert_eq!(err.actual, Tag::StringLiteral);
    }

    #[test]
    fn test_mutation_visible_to_all_holders() {
        let xs = numbers();
        let alias = xs.clone();

        xs.push(Value::from(40));
        assert_eq!(alias.size(), 4);
        assert_eq!(alias.at(3).as_int(), 40);

        let handle = alias.as_array();
        assert_eq!(handle.remove(0).unwrap().as_int(), 10);
        assert_eq!(xs.at(0).as_int(), 20);
        assert!(handle.ptr_eq(&xs.as_array()));
    }

    #[test]
    fn test_insert_and_pop() {
        let a = Array::new();
        a.push(Value::from(1));
        a.insert(0, Value::from(0)).unwrap();
        a.insert(2, Value::from(2)).unwrap();
        assert!(a.insert(9, Value::from(9)).is_err());
        assert!(a.remove(3).is_err());

        assert_eq!(a.len(), 3);
        assert_eq!(a.pop().map(|v| v.as_int()), Some(2));
        assert_eq!(a.get(5).map(|v| v.as_int()), None);
    }

    #[test]
    fn test_array_can_hold_itself() {
        let a = Array::new();
        a.push(Value::from(a.clone()));
        {
            let inner = a.get(0).unwrap().as_array();
            assert!(inner.ptr_eq(&a));
            assert_eq!(a.holders(), 3);
        }
        // Break the cycle so the payload is released
        a.pop();
        assert_eq!(a.holders(), 1);
    }

    #[test]
    fn test_push_on_non_array_is_violation() {
        let err = Value::from(1).try_push(Value::from(2)).unwrap_err();
        assert_eq!(err.operation, "push");
    }

    #[test]
    fn test_collect_into_array() {
        let a: Array = (1..=3).map(Value::from).collect();
        assert_eq!(a.len(), 3);
        assert_eq!(Value::from(a).at(2).as_int(), 3);
    }
}
