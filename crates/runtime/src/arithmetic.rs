//! Arithmetic operators
//!
//! Both operands are forced, then dispatched on their terminal variants.
//! Operands must share a variant; nothing is auto-coerced.
//!
//! | operator | Integer | Double | Character | text |
//! |----------|---------|--------|-----------|------|
//! | `+`      | yes     | yes    | yes       | concatenation |
//! | `- * /`  | yes     | yes    | yes       |      |
//! | `%`      | yes     |        | yes       |      |
//! | unary `-`| yes     | yes    |           |      |
//!
//! "text" is either String or StringLiteral, in any combination; the result
//! of concatenation is always an owned String.
//!
//! # Overflow Behavior
//!
//! Integer operations use **wrapping semantics**:
//! - `+`: i32::MAX + 1 wraps to i32::MIN
//! - `/`: i32::MIN / -1 wraps to i32::MIN
//!
//! Division or remainder by zero is a contract violation for Integer and
//! Character. Character arithmetic works on code points; a result that is not
//! a Unicode scalar value is a contract violation.
//!
//! This differs from a byte-wide character type, where the code-point sum
//! would wrap to the character width. `char` has no wrapping representation:
//! truncating to 21 bits can still land on a surrogate or past U+10FFFF, so
//! there is no wrapped result to return.
//!
//! # Mixed operands
//!
//! A dynamic value combined with a native `i32`, `f64` or `char` coerces the
//! dynamic side and produces the native type. `&Value + &str` (either order)
//! concatenates into a `String`.

use crate::error::{ContractViolation, OrRaise};
use crate::value::{Tag, Value};
use std::ops::{Add, Div, Mul, Neg, Rem, Sub};

/// Binary arithmetic operator
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ArithOp {
    Add,
    Sub,
    Mul,
    Div,
    Rem,
}

impl ArithOp {
    pub fn symbol(self) -> &'static str {
        match self {
            ArithOp::Add => "+",
            ArithOp::Sub => "-",
            ArithOp::Mul => "*",
            ArithOp::Div => "/",
            ArithOp::Rem => "%",
        }
    }

    fn accepts(self, tag: Tag) -> bool {
        match self {
            ArithOp::Add => {
                matches!(tag, Tag::Integer | Tag::Double | Tag::Character) || tag.is_text()
            }
            ArithOp::Sub | ArithOp::Mul | ArithOp::Div => {
                matches!(tag, Tag::Integer | Tag::Double | Tag::Character)
            }
            ArithOp::Rem => matches!(tag, Tag::Integer | Tag::Character),
        }
    }

    fn accepted(self) -> &'static str {
        match self {
            ArithOp::Add => "Integer, Double, Character or text",
            ArithOp::Sub | ArithOp::Mul | ArithOp::Div => "Integer, Double or Character",
            ArithOp::Rem => "Integer or Character",
        }
    }
}

/// Apply `op` to two dynamic operands
pub fn try_arith(op: ArithOp, lhs: &Value, rhs: &Value) -> Result<Value, ContractViolation> {
    let l = lhs.force();
    let r = rhs.force();
    match (&*l, &*r) {
        (Value::Integer(a), Value::Integer(b)) => int_op(op, *a, *b).map(Value::Integer),
        (Value::Double(a), Value::Double(b)) => double_op(op, *a, *b).map(Value::Double),
        (Value::Character(a), Value::Character(b)) => char_op(op, *a, *b).map(Value::Character),
        (a, b) => match (op, a.text_ref(), b.text_ref()) {
            (ArithOp::Add, Some(x), Some(y)) => Ok(Value::from(concat(x, y))),
            _ => Err(reject(op, a.tag(), b.tag())),
        },
    }
}

pub fn try_add(lhs: &Value, rhs: &Value) -> Result<Value, ContractViolation> {
    try_arith(ArithOp::Add, lhs, rhs)
}

pub fn try_sub(lhs: &Value, rhs: &Value) -> Result<Value, ContractViolation> {
    try_arith(ArithOp::Sub, lhs, rhs)
}

pub fn try_mul(lhs: &Value, rhs: &Value) -> Result<Value, ContractViolation> {
    try_arith(ArithOp::Mul, lhs, rhs)
}

pub fn try_div(lhs: &Value, rhs: &Value) -> Result<Value, ContractViolation> {
    try_arith(ArithOp::Div, lhs, rhs)
}

pub fn try_rem(lhs: &Value, rhs: &Value) -> Result<Value, ContractViolation> {
    try_arith(ArithOp::Rem, lhs, rhs)
}

/// Unary negation (Integer wraps, Double flips sign)
pub fn try_neg(operand: &Value) -> Result<Value, ContractViolation> {
    match &*operand.force() {
        Value::Integer(n) => Ok(Value::Integer(n.wrapping_neg())),
        Value::Double(d) => Ok(Value::Double(-d)),
        other => Err(ContractViolation::new("neg", "Integer or Double", other.tag())),
    }
}

fn reject(op: ArithOp, left: Tag, right: Tag) -> ContractViolation {
    let detail = format!("{} {} {}", left, op.symbol(), right);
    if op.accepts(left) && left != right {
        ContractViolation::new(op.symbol(), "operands of the same variant", right).with_detail(detail)
    } else {
        ContractViolation::new(op.symbol(), op.accepted(), left).with_detail(detail)
    }
}

fn divide_by_zero(op: ArithOp, tag: Tag, dividend: impl std::fmt::Display) -> ContractViolation {
    ContractViolation::new(op.symbol(), "non-zero divisor", tag)
        .with_detail(format!("attempted {} {} 0", dividend, op.symbol()))
}

fn int_op(op: ArithOp, a: i32, b: i32) -> Result<i32, ContractViolation> {
    Ok(match op {
        ArithOp::Add => a.wrapping_add(b),
        ArithOp::Sub => a.wrapping_sub(b),
        ArithOp::Mul => a.wrapping_mul(b),
        ArithOp::Div | ArithOp::Rem if b == 0 => return Err(divide_by_zero(op, Tag::Integer, a)),
        // wrapping_div / wrapping_rem handle i32::MIN / -1
        ArithOp::Div => a.wrapping_div(b),
        ArithOp::Rem => a.wrapping_rem(b),
    })
}

fn double_op(op: ArithOp, a: f64, b: f64) -> Result<f64, ContractViolation> {
    match op {
        ArithOp::Add => Ok(a + b),
        ArithOp::Sub => Ok(a - b),
        ArithOp::Mul => Ok(a * b),
        ArithOp::Div => Ok(a / b),
        ArithOp::Rem => Err(reject(op, Tag::Double, Tag::Double)),
    }
}

fn char_op(op: ArithOp, a: char, b: char) -> Result<char, ContractViolation> {
    let (x, y) = (u32::from(a), u32::from(b));
    let code = match op {
        ArithOp::Add => x.wrapping_add(y),
        ArithOp::Sub => x.wrapping_sub(y),
        ArithOp::Mul => x.wrapping_mul(y),
        ArithOp::Div | ArithOp::Rem if y == 0 => {
            return Err(divide_by_zero(op, Tag::Character, a.escape_unicode()));
        }
        ArithOp::Div => x / y,
        ArithOp::Rem => x % y,
    };
    char::from_u32(code).ok_or_else(|| {
        ContractViolation::new(op.symbol(), "result within the Unicode scalar range", Tag::Character)
            .with_detail(format!("code point {:#x}", code))
    })
}

fn concat(left: &str, right: &str) -> String {
    let mut out = String::with_capacity(left.len() + right.len());
    out.push_str(left);
    out.push_str(right);
    out
}

/// Text operand of a mixed concatenation
fn text_operand(value: &Value) -> Result<crate::value::Text, ContractViolation> {
    value.try_as_text().map_err(|mut v| {
        v.operation = "+";
        v
    })
}

// ----------------------------------------------------------------------
// Operator traits
// ----------------------------------------------------------------------

macro_rules! value_binop {
    ($trait:ident, $method:ident, $op:expr) => {
        impl $trait<&Value> for &Value {
            type Output = Value;

            fn $method(self, rhs: &Value) -> Value {
                try_arith($op, self, rhs).or_raise()
            }
        }

        impl $trait for Value {
            type Output = Value;

            fn $method(self, rhs: Value) -> Value {
                try_arith($op, &self, &rhs).or_raise()
            }
        }
    };
}

value_binop!(Add, add, ArithOp::Add);
value_binop!(Sub, sub, ArithOp::Sub);
value_binop!(Mul, mul, ArithOp::Mul);
value_binop!(Div, div, ArithOp::Div);
value_binop!(Rem, rem, ArithOp::Rem);

impl Neg for &Value {
    type Output = Value;

    fn neg(self) -> Value {
        try_neg(self).or_raise()
    }
}

impl Neg for Value {
    type Output = Value;

    fn neg(self) -> Value {
        try_neg(&self).or_raise()
    }
}

/// Dynamic operand on one side, native on the other; result is native
macro_rules! native_binop {
    ($trait:ident, $method:ident, $op:expr, $native:ty, $extract:ident) => {
        impl $trait<$native> for &Value {
            type Output = $native;

            fn $method(self, rhs: $native) -> $native {
                try_arith($op, self, &Value::from(rhs)).or_raise().$extract()
            }
        }

        impl $trait<$native> for Value {
            type Output = $native;

            fn $method(self, rhs: $native) -> $native {
                try_arith($op, &self, &Value::from(rhs)).or_raise().$extract()
            }
        }

        impl $trait<&Value> for $native {
            type Output = $native;

            fn $method(self, rhs: &Value) -> $native {
                try_arith($op, &Value::from(self), rhs).or_raise().$extract()
            }
        }

        impl $trait<Value> for $native {
            type Output = $native;

            fn $method(self, rhs: Value) -> $native {
                try_arith($op, &Value::from(self), &rhs).or_raise().$extract()
            }
        }
    };
}

native_binop!(Add, add, ArithOp::Add, i32, as_int);
native_binop!(Sub, sub, ArithOp::Sub, i32, as_int);
native_binop!(Mul, mul, ArithOp::Mul, i32, as_int);
native_binop!(Div, div, ArithOp::Div, i32, as_int);
native_binop!(Rem, rem, ArithOp::Rem, i32, as_int);

native_binop!(Add, add, ArithOp::Add, f64, as_double);
native_binop!(Sub, sub, ArithOp::Sub, f64, as_double);
native_binop!(Mul, mul, ArithOp::Mul, f64, as_double);
native_binop!(Div, div, ArithOp::Div, f64, as_double);

native_binop!(Add, add, ArithOp::Add, char, as_char);
native_binop!(Sub, sub, ArithOp::Sub, char, as_char);
native_binop!(Mul, mul, ArithOp::Mul, char, as_char);
native_binop!(Div, div, ArithOp::Div, char, as_char);
native_binop!(Rem, rem, ArithOp::Rem, char, as_char);

impl Add<&str> for &Value {
    type Output = String;

    fn add(self, rhs: &str) -> String {
        concat(&text_operand(self).or_raise(), rhs)
    }
}

impl Add<&Value> for &str {
    type Output = String;

    fn add(self, rhs: &Value) -> String {
        concat(self, &text_operand(rhs).or_raise())
    }
}
