//! Schema model for directory-backed objects.
//!
//! # Responsibility
//! - Define parameter descriptors and the schema-bearing object that owns them.
//! - Define the ordered entry mapping exchanged with backends.
//!
//! # Invariants
//! - Parameter names are unique within one object schema.
//! - An object declares at most one primary key.
//! - Schemas are frozen once constructed; derivation only ever clones.

use once_cell::sync::Lazy;
use regex::Regex;

pub mod entry;
pub mod object;
pub mod param;

static PLUGIN_NAME_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[a-z][a-z0-9_]*$").expect("valid plugin name regex"));

/// Returns whether `value` is usable as an object, parameter or command name.
///
/// Names are lowercase ASCII identifiers: a leading letter followed by
/// letters, digits or underscores.
pub fn is_valid_name(value: &str) -> bool {
    PLUGIN_NAME_RE.is_match(value)
}
