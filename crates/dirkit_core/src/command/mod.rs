//! Schema-derived CRUD commands.
//!
//! # Responsibility
//! - Derive argument/option lists from an object schema once, at finalize.
//! - Invoke backends and hold every result to its output contract.
//!
//! # Invariants
//! - The primary key is the first and only schema argument of every kind
//!   except `Search`.
//! - No name appears in both the argument and option lists of one command.
//! - Finalized commands are immutable.

pub mod crud;
pub mod error;
pub mod invoke;
pub mod method;
pub mod output;
