//! Contract violations
//!
//! The runtime has exactly one error kind: a [`ContractViolation`]. It means
//! the value graph handed to an operation was not one the operation accepts
//! (wrong variant for a coercion, applying a non-callable, an unsupported
//! operand pairing, an absent record key, an out-of-range index). These are
//! bugs in the generated code, not conditions a program recovers from.
//!
//! Every checked operation comes in two forms:
//! - `try_*` returns `Result<T, ContractViolation>`
//! - the plain form raises: logs the violation, records it in the
//!   thread-local last-error slot, and panics with the message
//!
//! # Usage
//!
//! ```ignore
//! let n = value.as_int();                 // panics on a non-Integer
//! let n = value.try_as_int()?;            // or propagate
//!
//! let caught = std::panic::catch_unwind(|| value.as_int());
//! if caught.is_err() {
//!     let message = take_runtime_error();
//! }
//! ```

use crate::value::Tag;
use std::cell::RefCell;
use std::fmt;
use tracing::error;

thread_local! {
    /// Thread-local storage for the last raised contract violation
    static LAST_ERROR: RefCell<Option<String>> = const { RefCell::new(None) };
}

/// A discriminant mismatch or unsupported operation combination
#[derive(Debug, Clone, PartialEq)]
pub struct ContractViolation {
    /// Operation that rejected its input (`"as_int"`, `"+"`, `"lookup"`, ...)
    pub operation: &'static str,
    /// What the operation required, in words
    pub expected: &'static str,
    /// Discriminant actually found after forcing
    pub actual: Tag,
    /// Extra context (key name, index and length, ...)
    pub detail: Option<String>,
}

impl ContractViolation {
    pub fn new(operation: &'static str, expected: &'static str, actual: Tag) -> Self {
        ContractViolation {
            operation,
            expected,
            actual,
            detail: None,
        }
    }

    pub fn with_detail(mut self, detail: impl Into<String>) -> Self {
        self.detail = Some(detail.into());
        self
    }

    /// Fail fast: log, record as the thread's last error, then panic
    #[cold]
    #[track_caller]
    pub fn raise(self) -> ! {
        let message = self.to_string();
        error!(
            operation = self.operation,
            expected = self.expected,
            actual = %self.actual,
            "contract violation"
        );
        set_runtime_error(message.clone());
        panic!("{}", message)
    }
}

impl fmt::Display for ContractViolation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}: expected {}, got {}",
            self.operation, self.expected, self.actual
        )?;
        if let Some(detail) = &self.detail {
            write!(f, " ({})", detail)?;
        }
        Ok(())
    }
}

impl std::error::Error for ContractViolation {}

/// Unwrap a checked result, raising the violation on failure
pub(crate) trait OrRaise<T> {
    fn or_raise(self) -> T;
}

impl<T> OrRaise<T> for Result<T, ContractViolation> {
    #[inline]
    #[track_caller]
    fn or_raise(self) -> T {
        match self {
            Ok(value) => value,
            Err(violation) => violation.raise(),
        }
    }
}

/// Set the last runtime error message
pub fn set_runtime_error(msg: impl Into<String>) {
    LAST_ERROR.with(|e| {
        *e.borrow_mut() = Some(msg.into());
    });
}

/// Take (and clear) the last runtime error message
pub fn take_runtime_error() -> Option<String> {
    LAST_ERROR.with(|e| e.borrow_mut().take())
}

/// Check if there's a pending runtime error
pub fn has_runtime_error() -> bool {
    LAST_ERROR.with(|e| e.borrow().is_some())
}

/// Clear any pending runtime error
pub fn clear_runtime_error() {
    LAST_ERROR.with(|e| *e.borrow_mut() = None);
}

/// Format a panic payload into an error message
pub fn format_panic_payload(payload: &Box<dyn std::any::Any + Send>) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        s.to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "unknown panic".to_string()
    }
}
