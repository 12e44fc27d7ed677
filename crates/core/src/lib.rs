//! pcc Core: the foundation under the dynamic value runtime
//!
//! This crate provides the language-agnostic primitives the `Value` type in
//! `pcc-runtime` is built on. Nothing here knows about value variants.
//!
//! # Modules
//!
//! - `managed`: Backend memory interface (shared-ownership payload handles)
//! - `key`: Process-wide unique key tokens for record fields
//! - `memory_stats`: Allocation/release counters for managed payloads

pub mod key;
pub mod managed;
pub mod memory_stats;

// Re-export key types and functions
pub use key::{Key, declared_key_count};
pub use managed::{Managed, make_managed};
pub use memory_stats::{ManagedStats, global_stats, thread_stats};
