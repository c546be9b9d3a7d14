//! Storage backend protocol for CRUD commands.
//!
//! # Responsibility
//! - Define the five operations a backend exposes to derived commands.
//! - Fail loudly, naming the backend and operation, when one is missing.
//!
//! # Invariants
//! - Absent entries are `Ok(None)` from `retrieve`/`update`, never an error.
//! - `search` returns an empty vector when nothing matches.
//! - Every operation is safe to call concurrently; the core holds no lock.

use crate::model::entry::Entry;
use std::error::Error;
use std::fmt::{Display, Formatter};

pub mod memory;

pub type BackendResult<T> = Result<T, BackendError>;

/// Backend failures surfaced through the error channel.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BackendError {
    /// The concrete backend does not provide `operation`.
    NotImplemented {
        backend: String,
        operation: &'static str,
    },
    /// The backend requires a caller-supplied primary key.
    MissingPrimaryKey { attribute: String },
    /// The backend generates primary keys and refuses supplied ones.
    UnexpectedPrimaryKey { attribute: String },
    DuplicateEntry(String),
    NotFound(String),
    Unavailable(String),
}

impl Display for BackendError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::NotImplemented { backend, operation } => write!(f, "{backend}.{operation}()"),
            Self::MissingPrimaryKey { attribute } => {
                write!(f, "primary key `{attribute}` must be supplied")
            }
            Self::UnexpectedPrimaryKey { attribute } => {
                write!(f, "primary key `{attribute}` is generated and must not be supplied")
            }
            Self::DuplicateEntry(key) => write!(f, "entry already exists: {key}"),
            Self::NotFound(key) => write!(f, "entry not found: {key}"),
            Self::Unavailable(message) => write!(f, "backend unavailable: {message}"),
        }
    }
}

impl Error for BackendError {}

/// Generic CRUD backend API.
///
/// Every operation defaults to [`BackendError::NotImplemented`]; a concrete
/// backend overrides the ones it supports.
pub trait CrudBackend: Send + Sync {
    /// Concrete backend name used in diagnostics, e.g. `"Ldap"`.
    fn name(&self) -> &str;

    /// Creates an entry from the complete attribute set.
    ///
    /// Returns the entry exactly as stored, including generated attributes.
    /// Whether the primary key is caller-supplied or generated is a fixed
    /// property of the backend.
    fn create(&self, _attributes: Entry) -> BackendResult<Entry> {
        Err(self.not_implemented("create"))
    }

    /// Retrieves one entry; `attributes = None` returns every
    /// non-operational attribute.
    fn retrieve(
        &self,
        _primary_key: &str,
        _attributes: Option<&[String]>,
    ) -> BackendResult<Option<Entry>> {
        Err(self.not_implemented("retrieve"))
    }

    /// Merges `changes` into an existing entry and returns the full result.
    fn update(&self, _primary_key: &str, _changes: Entry) -> BackendResult<Option<Entry>> {
        Err(self.not_implemented("update"))
    }

    fn delete(&self, _primary_key: &str) -> BackendResult<()> {
        Err(self.not_implemented("delete"))
    }

    /// Returns entries matching `criteria`.
    ///
    /// Keys naming entry attributes filter on that attribute; the meaning of
    /// other keys is left to the backend.
    fn search(&self, _criteria: &Entry) -> BackendResult<Vec<Entry>> {
        Err(self.not_implemented("search"))
    }

    fn not_implemented(&self, operation: &'static str) -> BackendError {
        BackendError::NotImplemented {
            backend: self.name().to_string(),
            operation,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::{BackendError, CrudBackend};
    use crate::model::entry::Entry;

    struct Ldap;

    impl CrudBackend for Ldap {
        fn name(&self) -> &str {
            "Ldap"
        }
    }

    #[test]
    fn missing_operations_name_backend_and_operation() {
        let backend = Ldap;
        let attributes = vec!["attribute".to_string()];
        assert_eq!(
            backend.create(Entry::new()).expect_err("create").to_string(),
            "Ldap.create()"
        );
        assert_eq!(
            backend
                .retrieve("primary key", Some(attributes.as_slice()))
                .expect_err("retrieve")
                .to_string(),
            "Ldap.retrieve()"
        );
        assert_eq!(
            backend
                .update("primary key", Entry::new())
                .expect_err("update")
                .to_string(),
            "Ldap.update()"
        );
        assert_eq!(
            backend.delete("primary key").expect_err("delete").to_string(),
            "Ldap.delete()"
        );
        assert_eq!(
            backend.search(&Entry::new()).expect_err("search"),
            BackendError::NotImplemented {
                backend: "Ldap".to_string(),
                operation: "search",
            }
        );
    }
}
