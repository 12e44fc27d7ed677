//! Equality and ordering
//!
//! Both operands are forced. Supported pairings:
//!
//! - Integer, Double, Character, Boolean against the same variant (native order)
//! - text against text, whichever storage backs either side (byte order)
//! - Pointer against Pointer (payload address, identity for `==`)
//!
//! Anything else is a contract violation, so `Value == Value` may raise. A
//! NaN operand makes every ordering and `==` false, as for `f64`.
//!
//! Comparing against a native `i32`, `f64`, `char`, `bool` or `&str` coerces
//! the dynamic side and works in both operand orders.

use crate::error::{ContractViolation, OrRaise};
use crate::value::{Tag, Value};
use pcc_core::Managed;
use std::cmp::Ordering;

const COMPARABLE: &str = "Integer, Double, Character, Boolean, text or Pointer";

/// Order two dynamic values; None when unordered (NaN)
pub fn try_compare(lhs: &Value, rhs: &Value) -> Result<Option<Ordering>, ContractViolation> {
    let l = lhs.force();
    let r = rhs.force();
    match (&*l, &*r) {
        (Value::Integer(a), Value::Integer(b)) => Ok(Some(a.cmp(b))),
        (Value::Double(a), Value::Double(b)) => Ok(a.partial_cmp(b)),
        (Value::Character(a), Value::Character(b)) => Ok(Some(a.cmp(b))),
        (Value::Boolean(a), Value::Boolean(b)) => Ok(Some(a.cmp(b))),
        (Value::Pointer(a), Value::Pointer(b)) => {
            Ok(Some(Managed::as_ptr(a).cmp(&Managed::as_ptr(b))))
        }
        (a, b) => match (a.text_ref(), b.text_ref()) {
            (Some(x), Some(y)) => Ok(Some(x.cmp(y))),
            _ => Err(reject(a.tag(), b.tag())),
        },
    }
}

/// Order a dynamic value against native text
pub fn try_compare_str(lhs: &Value, rhs: &str) -> Result<Ordering, ContractViolation> {
    let l = lhs.force();
    l.text_ref()
        .map(|s| s.cmp(rhs))
        .ok_or_else(|| ContractViolation::new("compare", "String or StringLiteral", l.tag()))
}

/// `==` without raising
pub fn try_equals(lhs: &Value, rhs: &Value) -> Result<bool, ContractViolation> {
    try_compare(lhs, rhs).map(|o| o == Some(Ordering::Equal))
}

fn comparable(tag: Tag) -> bool {
    matches!(
        tag,
        Tag::Integer | Tag::Double | Tag::Character | Tag::Boolean | Tag::Pointer
    ) || tag.is_text()
}

fn reject(left: Tag, right: Tag) -> ContractViolation {
    let detail = format!("{} against {}", left, right);
    if comparable(left) {
        ContractViolation::new("compare", "operands of the same variant", right).with_detail(detail)
    } else {
        ContractViolation::new("compare", COMPARABLE, left).with_detail(detail)
    }
}

impl PartialEq for Value {
    fn eq(&self, other: &Value) -> bool {
        try_equals(self, other).or_raise()
    }
}

impl PartialOrd for Value {
    fn partial_cmp(&self, other: &Value) -> Option<Ordering> {
        try_compare(self, other).or_raise()
    }
}

macro_rules! native_compare {
    ($native:ty) => {
        impl PartialEq<$native> for Value {
            fn eq(&self, other: &$native) -> bool {
                try_equals(self, &Value::from(*other)).or_raise()
            }
        }

        impl PartialEq<Value> for $native {
            fn eq(&self, other: &Value) -> bool {
                <Value as PartialEq<$native>>::eq(other, self)
            }
        }

        impl PartialOrd<$native> for Value {
            fn partial_cmp(&self, other: &$native) -> Option<Ordering> {
                try_compare(self, &Value::from(*other)).or_raise()
            }
        }

        impl PartialOrd<Value> for $native {
            fn partial_cmp(&self, other: &Value) -> Option<Ordering> {
                <Value as PartialOrd<$native>>::partial_cmp(other, self).map(Ordering::reverse)
            }
        }
    };
}

native_compare!(i32);
native_compare!(f64);
native_compare!(char);
native_compare!(bool);

impl PartialEq<str> for Value {
    fn eq(&self, other: &str) -> bool {
        try_compare_str(self, other).or_raise() == Ordering::Equal
    }
}

impl PartialEq<&str> for Value {
    fn eq(&self, other: &&str) -> bool {
        try_compare_str(self, other).or_raise() == Ordering::Equal
    }
}

impl PartialEq<Value> for str {
    fn eq(&self, other: &Value) -> bool {
        try_compare_str(other, self).or_raise() == Ordering::Equal
    }
}

impl PartialEq<Value> for &str {
    fn eq(&self, other: &Value) -> bool {
        try_compare_str(other, self).or_raise() == Ordering::Equal
    }
}

impl PartialOrd<&str> for Value {
    fn partial_cmp(&self, other: &&str) -> Option<Ordering> {
        Some(try_compare_str(self, other).or_raise())
    }
}

impl PartialOrd<Value> for &str {
    fn partial_cmp(&self, other: &Value) -> Option<Ordering> {
        Some(try_compare_str(other, self).or_raise().reverse())
    }
}
