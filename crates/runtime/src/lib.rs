//! pcc Runtime: the dynamic value every compiled expression evaluates to
//!
//! Key design principles:
//! - Value: one closed sum type covering scalars, text, arrays, records,
//!   data constructors, functions, effects and foreign pointers
//! - Thunk: laziness is a variant; every operation forces before it looks
//! - Managed: shared payloads go through one backend handle (Rc, or Arc with
//!   the `atomic-refcount` feature), invisible to call sites
//!
//! Generated code calls construction (`Value::from`, `Value::closure`, ...),
//! `apply`/`perform`, the accessors (`lookup`, `at`, `field`, ...) and the
//! std operator traits. Every checked entry point has a `try_*` form that
//! returns a [`ContractViolation`] instead of raising.

pub mod arithmetic;
pub mod closures;
pub mod compare;
pub mod error;
pub mod list_ops;
pub mod map_ops;
pub mod snapshot;
pub mod thunk;
pub mod value;
pub mod variant_ops;

// Re-export the core primitives generated code names directly
pub use pcc_core::{Key, Managed, key, make_managed, memory_stats};

pub use value::{DataFields, EffFunction, Function, MapEntries, Tag, Text, ThunkFn, Value};

pub use thunk::force;

pub use closures::{Closure, EffClosure, try_apply, try_apply_all, try_perform};

pub use list_ops::{Array, try_at, try_at_value};

pub use map_ops::{try_contains_key, try_entry_at, try_keys, try_lookup};

pub use variant_ops::{try_ctor, try_field, try_field_count};

pub use arithmetic::{
    ArithOp, try_add, try_arith, try_div, try_mul, try_neg, try_rem, try_sub,
};

pub use compare::{try_compare, try_compare_str, try_equals};

// Snapshot types (for persistence/exchange with external tools)
pub use snapshot::{MAX_SNAPSHOT_DEPTH, SnapshotError, TypedValue, ValueSnapshot};

// Error handling
pub use error::{
    ContractViolation, clear_runtime_error, format_panic_payload, has_runtime_error,
    set_runtime_error, take_runtime_error,
};
