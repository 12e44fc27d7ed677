//! Lazy forcing protocol
//!
//! A `Thunk` value holds a zero-argument function that yields the deferred
//! value, which may itself be another thunk. Forcing chases the chain until a
//! terminal (non-Thunk) value appears.
//!
//! # Memoization
//!
//! None at this layer. Every `force` re-invokes the thunk function. A thunk
//! body that wants to run once caches its own result; the runtime neither
//! imposes nor assumes either policy, so effect ordering is exactly what the
//! generated code wrote.
//!
//! # Termination
//!
//! A cyclic chain (a thunk that eventually yields itself) never terminates.
//! That is the caller's responsibility; no cycle detection is done here.

use crate::value::Value;
use std::borrow::Cow;
use tracing::trace;

/// Resolve `value` to a terminal (non-Thunk) value
///
/// Returns the value itself, borrowed, when it is already terminal.
/// Otherwise each thunk in the chain is invoked in turn and the final result
/// is returned owned.
pub fn force(value: &Value) -> Cow<'_, Value> {
    let mut current = match value {
        Value::Thunk(f) => f(),
        _ => return Cow::Borrowed(value),
    };

    let mut delegations: usize = 1;
    while let Value::Thunk(f) = current {
        current = f();
        delegations += 1;
    }

    trace!(delegations, tag = %current.tag(), "forced thunk chain");
    Cow::Owned(current)
}

impl Value {
    /// See [`force`]
    #[inline]
    pub fn force(&self) -> Cow<'_, Value> {
        force(self)
    }

    /// Resolve and take ownership of the terminal value
    pub fn into_forced(self) -> Value {
        match self {
            Value::Thunk(_) => force(&self).into_owned(),
            terminal => terminal,
        }
    }

    /// True unless this is a Thunk
    pub fn is_terminal(&self) -> bool {
        !matches!(self, Value::Thunk(_))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::value::Tag;
    use std::cell::Cell;

    thread_local! {
        static CALLS: Cell<usize> = const { Cell::new(0) };
    }

    fn count_call() {
        CALLS.with(|c| c.set(c.get() + 1));
    }

    fn calls() -> usize {
        CALLS.with(Cell::get)
    }

    fn reset_calls() {
        CALLS.with(|c| c.set(0));
    }

    fn step_three() -> Value {
        count_call();
        Value::from("done")
    }

    fn step_two() -> Value {
        count_call();
        Value::thunk(step_three)
    }

    fn step_one() -> Value {
        count_call();
        Value::thunk(step_two)
    }

    fn answer() -> Value {
        count_call();
        Value::from(42)
    }

    #[test]
    fn test_terminal_is_returned_unchanged() {
        let v = Value::from(5);
        let forced = force(&v);
        assert!(matches!(forced, Cow::Borrowed(_)));
        assert!(std::ptr::eq(forced.as_ref(), &v));
    }

    #[test]
    fn test_chain_resolves_after_each_delegation() {
        reset_calls();
        let v = Value::thunk(step_one);
        let forced = v.force();

        assert_eq!(forced.tag(), Tag::StringLiteral);
        assert_eq!(forced.as_text(), "done");
        assert_eq!(calls(), 3);
    }

    #[test]
    fn test_no_memoization() {
        reset_calls();
        let v = Value::thunk(answer);

        assert_eq!(v.force().as_int(), 42);
        assert_eq!(v.force().as_int(), 42);
        assert_eq!(calls(), 2);
    }

    #[test]
    fn test_forcing_leaves_thunk_in_place() {
        let v = Value::thunk(answer);
        let _ = v.force();
        assert_eq!(v.tag(), Tag::Thunk);
        assert!(!v.is_terminal());
    }

    #[test]
    fn test_into_forced() {
        assert_eq!(Value::thunk(step_one).into_forced().as_text(), "done");
        assert!(Value::from(1).into_forced().is_terminal());
    }
}
