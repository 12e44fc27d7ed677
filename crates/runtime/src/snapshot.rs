//! Snapshots of value graphs
//!
//! A `Value` graph holds thunks, function pointers and managed handles, none
//! of which can be written out. `TypedValue` is its owned, fully forced
//! mirror: plain data that serde and bincode understand.
//!
//! # What survives
//!
//! - Integer, Double (finite only), Character, Boolean
//! - text of either storage, as one `String` form
//! - Array, Map and Data, recursively
//!
//! Map slots keep construction order and store the key's declared name.
//! Rebuilding a value declares those names again, which yields the same
//! process-wide keys the rest of the program uses.
//!
//! Code (Function, EffFunction, Closure, EffClosure) and foreign handles
//! (RawPointer, Pointer) are rejected. A cycle through a shared Array is
//! rejected too; only arrays are mutable after construction, so every cycle
//! passes through one.
//!
//! Lazy structure can still be unbounded without any cycle: a cons cell
//! whose tail thunk builds another cell never runs out. Descent into Array,
//! Map and Data is capped at [`MAX_SNAPSHOT_DEPTH`] levels.
//!
//! # Usage
//!
//! ```ignore
//! let typed = TypedValue::from_value(&value)?;
//! std::fs::write(path, typed.to_bytes()?)?;
//!
//! let restored = TypedValue::from_bytes(&std::fs::read(path)?)?.to_value();
//! ```

use crate::list_ops::Array;
use crate::value::{Tag, Value};
use pcc_core::Key;
use serde::{Deserialize, Serialize};

/// Maximum nesting of Array, Map and Data captured in one snapshot
pub const MAX_SNAPSHOT_DEPTH: usize = 256;

/// Error while taking or decoding a snapshot
#[derive(Debug)]
pub enum SnapshotError {
    /// Code or foreign handles cannot be snapshotted
    NotSerializable(Tag),
    /// Non-finite double (NaN or Infinity)
    NonFiniteDouble(f64),
    /// An array reachable from itself
    Cyclic,
    /// Nesting beyond the given limit (possibly an infinite lazy structure)
    TooDeep(usize),
    /// Bincode encoding/decoding error
    BincodeError(Box<bincode::Error>),
}

impl std::fmt::Display for SnapshotError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SnapshotError::NotSerializable(tag) => {
                write!(f, "{} values cannot be serialized", tag)
            }
            SnapshotError::NonFiniteDouble(v) => {
                write!(f, "Cannot serialize non-finite double: {}", v)
            }
            SnapshotError::Cyclic => write!(f, "Array contains itself"),
            SnapshotError::TooDeep(limit) => {
                write!(f, "Value nested deeper than {} levels", limit)
            }
            SnapshotError::BincodeError(e) => write!(f, "Bincode error: {}", e),
        }
    }
}

impl std::error::Error for SnapshotError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            SnapshotError::BincodeError(e) => Some(e.as_ref()),
            _ => None,
        }
    }
}

impl From<bincode::Error> for SnapshotError {
    fn from(e: bincode::Error) -> Self {
        SnapshotError::BincodeError(Box::new(e))
    }
}

/// Serializable mirror of a forced value graph
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub enum TypedValue {
    Integer(i32),
    Double(f64),
    Character(char),
    Boolean(bool),
    String(String),
    Array(Vec<TypedValue>),
    /// Slots in construction order, keyed by declared name
    Map(Vec<(String, TypedValue)>),
    /// Fields, constructor tag first
    Data(Vec<TypedValue>),
}

impl TypedValue {
    /// Force and copy a value graph
    pub fn from_value(value: &Value) -> Result<Self, SnapshotError> {
        let mut path = Vec::new();
        Self::capture(value, &mut path, 0)
    }

    fn capture(value: &Value, path: &mut Vec<Array>, depth: usize) -> Result<Self, SnapshotError> {
        let forced = value.force();
        if depth >= MAX_SNAPSHOT_DEPTH
            && matches!(&*forced, Value::Array(_) | Value::Map(_) | Value::Data(_))
        {
            return Err(SnapshotError::TooDeep(MAX_SNAPSHOT_DEPTH));
        }
        match &*forced {
            Value::Integer(n) => Ok(TypedValue::Integer(*n)),
            Value::Double(d) => {
                if !d.is_finite() {
                    return Err(SnapshotError::NonFiniteDouble(*d));
                }
                Ok(TypedValue::Double(*d))
            }
            Value::Character(c) => Ok(TypedValue::Character(*c)),
            Value::Boolean(b) => Ok(TypedValue::Boolean(*b)),
            Value::StringLiteral(s) => Ok(TypedValue::String(s.to_string())),
            Value::String(s) => Ok(TypedValue::String(s.as_str().to_string())),
            Value::Array(array) => {
                if path.iter().any(|seen| seen.ptr_eq(array)) {
                    return Err(SnapshotError::Cyclic);
                }
                path.push(array.clone());
                let items = array
                    .to_vec()
                    .iter()
                    .map(|item| Self::capture(item, path, depth + 1))
                    .collect::<Result<Vec<_>, _>>();
                path.pop();
                Ok(TypedValue::Array(items?))
            }
            Value::Map(entries) => {
                let mut slots = Vec::with_capacity(entries.len());
                for (key, slot) in entries.iter() {
                    slots.push((key.name().to_string(), Self::capture(slot, path, depth + 1)?));
                }
                Ok(TypedValue::Map(slots))
            }
            Value::Data(fields) => {
                let mut typed_fields = Vec::with_capacity(fields.len());
                for field in fields.iter() {
                    typed_fields.push(Self::capture(field, path, depth + 1)?);
                }
                Ok(TypedValue::Data(typed_fields))
            }
            other => Err(SnapshotError::NotSerializable(other.tag())),
        }
    }

    /// Rebuild a runtime value
    ///
    /// Text comes back as owned String; map keys are declared by name.
    pub fn to_value(&self) -> Value {
        match self {
            TypedValue::Integer(n) => Value::Integer(*n),
            TypedValue::Double(d) => Value::Double(*d),
            TypedValue::Character(c) => Value::Character(*c),
            TypedValue::Boolean(b) => Value::Boolean(*b),
            TypedValue::String(s) => Value::from(s.clone()),
            TypedValue::Array(items) => items.iter().map(TypedValue::to_value).collect::<Array>().into(),
            TypedValue::Map(slots) => Value::record(
                slots
                    .iter()
                    .map(|(name, v)| (Key::declare(name), v.to_value())),
            ),
            TypedValue::Data(fields) => Value::data(fields.iter().map(TypedValue::to_value)),
        }
    }

    /// Serialize to binary format (bincode)
    pub fn to_bytes(&self) -> Result<Vec<u8>, SnapshotError> {
        bincode::serialize(self).map_err(SnapshotError::from)
    }

    /// Deserialize from binary format (bincode)
    pub fn from_bytes(bytes: &[u8]) -> Result<Self, SnapshotError> {
        bincode::deserialize(bytes).map_err(SnapshotError::from)
    }

    /// Convert to human-readable debug string
    pub fn to_debug_string(&self) -> String {
        match self {
            TypedValue::Integer(n) => format!("{}", n),
            TypedValue::Double(d) => format!("{:?}", d),
            TypedValue::Character(c) => format!("{:?}", c),
            TypedValue::Boolean(b) => format!("{}", b),
            TypedValue::String(s) => format!("{:?}", s),
            TypedValue::Array(items) => {
                let items: Vec<String> = items.iter().map(|i| i.to_debug_string()).collect();
                format!("[{}]", items.join(", "))
            }
            TypedValue::Map(slots) => {
                let entries: Vec<String> = slots
                    .iter()
                    .map(|(k, v)| format!("{}: {}", k, v.to_debug_string()))
                    .collect();
                format!("{{ {} }}", entries.join(", "))
            }
            TypedValue::Data(fields) => {
                let fields: Vec<String> = fields.iter().map(|f| f.to_debug_string()).collect();
                format!("(Data {})", fields.join(" "))
            }
        }
    }
}

/// Extension trait for Value to add snapshot methods
pub trait ValueSnapshot {
    /// Convert to serializable TypedValue
    fn to_typed(&self) -> Result<TypedValue, SnapshotError>;

    /// Serialize directly to bytes
    fn to_bytes(&self) -> Result<Vec<u8>, SnapshotError>;
}

impl ValueSnapshot for Value {
    fn to_typed(&self) -> Result<TypedValue, SnapshotError> {
        TypedValue::from_value(self)
    }

    fn to_bytes(&self) -> Result<Vec<u8>, SnapshotError> {
        TypedValue::from_value(self)?.to_bytes()
    }
}
