//! Invocation: applying functions and performing effects
//!
//! Two shapes of callable exist, each in a plain and a capturing form:
//!
//! | shape              | plain          | capturing    |
//! |--------------------|----------------|--------------|
//! | one argument       | `Function`     | `Closure`    |
//! | no argument effect | `EffFunction`  | `EffClosure` |
//!
//! A plain form is a bare function pointer. A capturing form is allocated
//! once as a managed payload and reached through the single-method
//! [`Closure`] or [`EffClosure`] trait, so copies of the value share the
//! captured state.
//!
//! Multi-argument functions are curried: `f a b` is `apply(apply(f, a), b)`.
//! There is no native multi-argument calling convention.
//!
//! Effects run only when performed. Forcing an `EffFunction` value yields the
//! effect itself, not its result.

use crate::error::{ContractViolation, OrRaise};
use crate::value::Value;

/// Callable with one argument producing a value
pub trait Closure {
    fn invoke(&self, arg: &Value) -> Value;
}

impl<F> Closure for F
where
    F: Fn(&Value) -> Value,
{
    #[inline]
    fn invoke(&self, arg: &Value) -> Value {
        self(arg)
    }
}

/// Callable with no arguments producing a value (an effect)
pub trait EffClosure {
    fn invoke(&self) -> Value;
}

impl<F> EffClosure for F
where
    F: Fn() -> Value,
{
    #[inline]
    fn invoke(&self) -> Value {
        self()
    }
}

/// Apply a one-argument callable
pub fn try_apply(callee: &Value, arg: &Value) -> Result<Value, ContractViolation> {
    match &*callee.force() {
        Value::Closure(c) => Ok(c.invoke(arg)),
        Value::Function(f) => Ok(f(arg)),
        other => Err(ContractViolation::new(
            "apply",
            "Function or Closure",
            other.tag(),
        )),
    }
}

/// Perform a zero-argument effect
pub fn try_perform(callee: &Value) -> Result<Value, ContractViolation> {
    match &*callee.force() {
        Value::EffClosure(k) => Ok(k.invoke()),
        Value::EffFunction(e) => Ok(e()),
        other => Err(ContractViolation::new(
            "perform",
            "EffFunction or EffClosure",
            other.tag(),
        )),
    }
}

/// Curried application of several arguments, left to right
pub fn try_apply_all(callee: &Value, args: &[Value]) -> Result<Value, ContractViolation> {
    let mut result = callee.clone();
    for arg in args {
        result = try_apply(&result, arg)?;
    }
    Ok(result)
}

impl Value {
    pub fn apply(&self, arg: &Value) -> Value {
        try_apply(self, arg).or_raise()
    }

    pub fn perform(&self) -> Value {
        try_perform(self).or_raise()
    }

    pub fn apply_all(&self, args: &[Value]) -> Value {
        try_apply_all(self, args).or_raise()
    }

    /// True for Function and Closure (after forcing)
    pub fn is_callable(&self) -> bool {
        matches!(&*self.force(), Value::Function(_) | Value::Closure(_))
    }

    /// True for EffFunction and EffClosure (after forcing)
    pub fn is_effect(&self) -> bool {
        matches!(&*self.force(), Value::EffFunction(_) | Value::EffClosure(_))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::value::Tag;
    use std::cell::Cell;
    use std::rc::Rc;

    fn increment(v: &Value) -> Value {
        Value::from(v.as_int() + 1)
    }

    fn lazy_increment() -> Value {
        Value::function(increment)
    }

    fn hello() -> Value {
        Value::from("hello")
    }

    fn add(a: &Value) -> Value {
        let a = a.as_int();
        Value::closure(move |b: &Value| Value::from(a + b.as_int()))
    }

    #[test]
    fn test_function_and_closure_agree() {
        let plain = Value::function(increment);
        let capturing = Value::closure(|v: &Value| Value::from(v.as_int() + 1));

        for n in [-3, 0, 41] {
            let arg = Value::from(n);
            assert_eq!(plain.apply(&arg), capturing.apply(&arg));
        }
    }

    #[test]
    fn test_closure_captures_state() {
        let offset = 100;
        let f = Value::closure(move |v: &Value| Value::from(v.as_int() + offset));
        assert_eq!(f.apply(&Value::from(5)).as_int(), 105);
    }

    #[test]
    fn test_copies_share_captured_state() {
        let hits = Rc::new(Cell::new(0));
        let counter = hits.clone();
        let f = Value::closure(move |v: &Value| {
            counter.set(counter.get() + 1);
            v.clone()
        });

        let g = f.clone();
        f.apply(&Value::from(1));
        g.apply(&Value::from(2));
        assert_eq!(hits.get(), 2);
    }

    #[test]
    fn test_apply_forces_callee() {
        let f = Value::thunk(lazy_increment);
        assert_eq!(f.apply(&Value::from(1)).as_int(), 2);
    }

    #[test]
    fn test_apply_non_callable_is_violation() {
        let err = try_apply(&Value::from(3), &Value::from(1)).unwrap_err();
        assert_eq!(err.operation, "apply");
        assert_eq!(err.actual, Tag::Integer);

        // An effect is not a one-argument function
        assert!(try_apply(&Value::eff_function(hello), &Value::from(1)).is_err());
    }

    #[test]
    fn test_perform_effect_function() {
        assert_eq!(Value::eff_function(hello).perform().as_text(), "hello");
    }

    #[test]
    fn test_perform_runs_once_per_call() {
        let runs = Rc::new(Cell::new(0));
        let seen = runs.clone();
        let effect = Value::eff_closure(move || {
            seen.set(seen.get() + 1);
            Value::from(seen.get())
        });

        assert_eq!(runs.get(), 0);
        assert_eq!(effect.perform().as_int(), 1);
        assert_eq!(effect.perform().as_int(), 2);
        assert_eq!(runs.get(), 2);
    }

    #[test]
    fn test_perform_non_effect_is_violation() {
        let err = try_perform(&Value::function(increment)).unwrap_err();
        assert_eq!(err.expected, "EffFunction or EffClosure");
    }

    #[test]
    fn test_curried_application() {
        let plus = Value::function(add);
        let partial = plus.apply(&Value::from(2));
        assert!(partial.is_callable());
        assert_eq!(partial.apply(&Value::from(3)).as_int(), 5);

        let total = plus.apply_all(&[Value::from(10), Value::from(20)]);
        assert_eq!(total.as_int(), 30);
    }

    #[test]
    fn test_classification() {
        assert!(Value::function(increment).is_callable());
        assert!(!Value::function(increment).is_effect());
        assert!(Value::eff_function(hello).is_effect());
        assert!(!Value::from(1).is_callable());
    }
}
