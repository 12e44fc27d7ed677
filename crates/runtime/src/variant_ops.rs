//! Data constructor operations
//!
//! A Data value is one algebraic data type constructor applied to its
//! fields, stored as a fixed-size list. By convention field 0 is an Integer
//! identifying the constructor; pattern matching in generated code branches
//! on it (`ctor`) and then reads the remaining fields by position.

use crate::error::{ContractViolation, OrRaise};
use crate::value::{Tag, Value};

/// Field at `index` (0 is the constructor tag)
pub fn try_field(data: &Value, index: usize) -> Result<Value, ContractViolation> {
    match &*data.force() {
        Value::Data(fields) => fields.get(index).cloned().ok_or_else(|| {
            ContractViolation::new("field", "field index within bounds", Tag::Data)
                .with_detail(format!("index {}, {} fields", index, fields.len()))
        }),
        other => Err(ContractViolation::new("field", "Data", other.tag())),
    }
}

/// Constructor tag (field 0 read as an Integer)
pub fn try_ctor(data: &Value) -> Result<i32, ContractViolation> {
    let tag = try_field(data, 0).map_err(|mut v| {
        v.operation = "ctor";
        v
    })?;
    tag.try_as_int().map_err(|mut v| {
        v.operation = "ctor";
        v
    })
}

/// Number of fields, including the constructor tag
pub fn try_field_count(data: &Value) -> Result<usize, ContractViolation> {
    match &*data.force() {
        Value::Data(fields) => Ok(fields.len()),
        other => Err(ContractViolation::new("field_count", "Data", other.tag())),
    }
}

impl Value {
    pub fn field(&self, index: usize) -> Value {
        try_field(self, index).or_raise()
    }

    pub fn ctor(&self) -> i32 {
        try_ctor(self).or_raise()
    }

    pub fn field_count(&self) -> usize {
        try_field_count(self).or_raise()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const NOTHING: i32 = 0;
    const JUST: i32 = 1;

    fn nothing() -> Value {
        Value::data([Value::from(NOTHING)])
    }

    fn just(v: Value) -> Value {
        Value::data([Value::from(JUST), v])
    }

    fn from_maybe(default: &Value, maybe: &Value) -> Value {
        match maybe.ctor() {
            JUST => maybe.field(1),
            _ => default.clone(),
        }
    }

    #[test]
    fn test_ctor_drives_matching() {
        let fallback = Value::from(-1);
        assert_eq!(from_maybe(&fallback, &just(Value::from(8))).as_int(), 8);
        assert_eq!(from_maybe(&fallback, &nothing()).as_int(), -1);
    }

    #[test]
    fn test_field_positions() {
        let pair = Value::data([Value::from(0), Value::from("left"), Value::from('r')]);
        assert_eq!(pair.field_count(), 3);
        assert_eq!(pair.field(1).as_text(), "left");
        assert_eq!(pair.field(2).as_char(), 'r');
    }

    #[test]
    fn test_field_forces_data() {
        let lazy = Value::thunk(nothing);
        assert_eq!(lazy.ctor(), NOTHING);
    }

    #[test]
    fn test_field_out_of_range_is_violation() {
        let err = try_field(&nothing(), 1).unwrap_err();
        assert_eq!(err.detail.as_deref(), Some("index 1, 1 fields"));
    }

    #[test]
    fn test_ctor_requires_integer_tag() {
        let odd = Value::data([Value::from("not a tag")]);
        let err = try_ctor(&odd).unwrap_err();
        assert_eq!(err.operation, "ctor");
        assert_eq!(err.actual, Tag::StringLiteral);

        let empty = Value::data(Vec::<Value>::new());
        assert!(try_ctor(&empty).is_err());
    }

    #[test]
    fn test_non_data_is_violation() {
        assert_eq!(try_field_count(&Value::from(1)).unwrap_err().actual, Tag::Integer);
    }
}
