//! In-process reference backend.
//!
//! # Responsibility
//! - Serve derived commands from an in-memory store keyed by primary key.
//! - Stamp a server-generated `entryuuid` attribute on every created entry.
//!
//! # Invariants
//! - The primary-key policy is fixed at construction.
//! - `entryuuid` is operational: it is omitted from `retrieve(pk, None)`.
//! - The store lock is held only for the duration of one operation.

use crate::backend::{BackendError, BackendResult, CrudBackend};
use crate::command::crud::SEARCH_CRITERIA_ARG;
use crate::model::entry::Entry;
use crate::model::object::DirObject;
use log::debug;
use serde_json::Value;
use std::collections::{BTreeMap, BTreeSet};
use std::sync::{RwLock, RwLockReadGuard, RwLockWriteGuard};
use uuid::Uuid;

/// Server-generated unique identifier attribute.
pub const ENTRY_UUID_ATTRIBUTE: &str = "entryuuid";

const OPERATIONAL_ATTRIBUTES: &[&str] = &[ENTRY_UUID_ATTRIBUTE];

/// Who provides the primary key on create.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PrimaryKeyPolicy {
    CallerSupplied,
    Generated,
}

/// `RwLock`-guarded entry store for one directory object.
#[derive(Debug)]
pub struct MemoryBackend {
    name: String,
    primary_key: String,
    policy: PrimaryKeyPolicy,
    attributes: BTreeSet<String>,
    entries: RwLock<BTreeMap<String, Entry>>,
}

impl MemoryBackend {
    /// Creates a store for `object`.
    ///
    /// Objects with a primary key expect it from the caller; objects without
    /// one are keyed by generated `entryuuid` values.
    pub fn new(object: &DirObject) -> Self {
        match object.primary_key() {
            Some(pk) => Self::build(object, pk.name(), PrimaryKeyPolicy::CallerSupplied),
            None => Self::build(object, ENTRY_UUID_ATTRIBUTE, PrimaryKeyPolicy::Generated),
        }
    }

    /// Creates a store that generates primary-key values itself.
    pub fn generating_keys(object: &DirObject) -> Self {
        let primary_key = object
            .primary_key()
            .map_or(ENTRY_UUID_ATTRIBUTE, |pk| pk.name());
        Self::build(object, primary_key, PrimaryKeyPolicy::Generated)
    }

    fn build(object: &DirObject, primary_key: &str, policy: PrimaryKeyPolicy) -> Self {
        Self {
            name: "MemoryBackend".to_string(),
            primary_key: primary_key.to_string(),
            policy,
            attributes: object
                .params()
                .iter()
                .map(|param| param.name().to_string())
                .collect(),
            entries: RwLock::new(BTreeMap::new()),
        }
    }

    /// Overrides the diagnostic backend name.
    pub fn named(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    pub fn policy(&self) -> PrimaryKeyPolicy {
        self.policy
    }

    pub fn len(&self) -> BackendResult<usize> {
        Ok(self.read()?.len())
    }

    pub fn is_empty(&self) -> BackendResult<bool> {
        Ok(self.read()?.is_empty())
    }

    fn read(&self) -> BackendResult<RwLockReadGuard<'_, BTreeMap<String, Entry>>> {
        self.entries
            .read()
            .map_err(|_| BackendError::Unavailable("memory store lock poisoned".to_string()))
    }

    fn write(&self) -> BackendResult<RwLockWriteGuard<'_, BTreeMap<String, Entry>>> {
        self.entries
            .write()
            .map_err(|_| BackendError::Unavailable("memory store lock poisoned".to_string()))
    }

    fn is_recognized(&self, attribute: &str) -> bool {
        self.attributes.contains(attribute) || OPERATIONAL_ATTRIBUTES.contains(&attribute)
    }

    fn matches(&self, entry: &Entry, criteria: &Entry) -> bool {
        criteria.iter().all(|(key, wanted)| {
            if wanted.is_null() {
                return true;
            }
            if key == SEARCH_CRITERIA_ARG {
                return matches_free_text(entry, wanted);
            }
            if !self.is_recognized(key) {
                return true;
            }
            entry
                .get(key)
                .is_some_and(|actual| values_match(actual, wanted))
        })
    }
}

impl CrudBackend for MemoryBackend {
    fn name(&self) -> &str {
        &self.name
    }

    fn create(&self, mut attributes: Entry) -> BackendResult<Entry> {
        let supplied = attributes.text(&self.primary_key);
        let key = match (self.policy, supplied) {
            (PrimaryKeyPolicy::CallerSupplied, Some(key)) => key,
            (PrimaryKeyPolicy::CallerSupplied, None) => {
                return Err(BackendError::MissingPrimaryKey {
                    attribute: self.primary_key.clone(),
                });
            }
            (PrimaryKeyPolicy::Generated, Some(_)) => {
                return Err(BackendError::UnexpectedPrimaryKey {
                    attribute: self.primary_key.clone(),
                });
            }
            (PrimaryKeyPolicy::Generated, None) => {
                let key = Uuid::new_v4().to_string();
                attributes.insert(self.primary_key.as_str(), key.clone());
                key
            }
        };

        let mut entries = self.write()?;
        if entries.contains_key(&key) {
            return Err(BackendError::DuplicateEntry(key));
        }
        if !attributes.contains_key(ENTRY_UUID_ATTRIBUTE) {
            attributes.insert(ENTRY_UUID_ATTRIBUTE, Uuid::new_v4().to_string());
        }
        entries.insert(key, attributes.clone());
        debug!(
            "event=backend_call module=backend status=ok backend={} op=create",
            self.name
        );
        Ok(attributes)
    }

    fn retrieve(
        &self,
        primary_key: &str,
        attributes: Option<&[String]>,
    ) -> BackendResult<Option<Entry>> {
        let entries = self.read()?;
        let Some(entry) = entries.get(primary_key) else {
            return Ok(None);
        };
        Ok(Some(match attributes {
            Some(names) => entry.project(names),
            None => without_operational(entry),
        }))
    }

    fn update(&self, primary_key: &str, mut changes: Entry) -> BackendResult<Option<Entry>> {
        if let Some(value) = changes.get(&self.primary_key) {
            if !value.is_null() && changes.text(&self.primary_key).as_deref() != Some(primary_key) {
                return Err(BackendError::UnexpectedPrimaryKey {
                    attribute: self.primary_key.clone(),
                });
            }
        }
        changes.remove(&self.primary_key);
        changes.remove(ENTRY_UUID_ATTRIBUTE);

        let mut entries = self.write()?;
        let Some(entry) = entries.get_mut(primary_key) else {
            return Ok(None);
        };
        entry.merge(changes);
        debug!(
            "event=backend_call module=backend status=ok backend={} op=update",
            self.name
        );
        Ok(Some(without_operational(entry)))
    }

    fn delete(&self, primary_key: &str) -> BackendResult<()> {
        let mut entries = self.write()?;
        if entries.remove(primary_key).is_none() {
            return Err(BackendError::NotFound(primary_key.to_string()));
        }
        debug!(
            "event=backend_call module=backend status=ok backend={} op=delete",
            self.name
        );
        Ok(())
    }

    fn search(&self, criteria: &Entry) -> BackendResult<Vec<Entry>> {
        let entries = self.read()?;
        Ok(entries
            .values()
            .filter(|entry| self.matches(entry, criteria))
            .map(without_operational)
            .collect())
    }
}

fn without_operational(entry: &Entry) -> Entry {
    entry
        .iter()
        .filter(|(key, _)| !OPERATIONAL_ATTRIBUTES.contains(&key.as_str()))
        .map(|(key, value)| (key.clone(), value.clone()))
        .collect()
}

fn matches_free_text(entry: &Entry, wanted: &Value) -> bool {
    let Some(needle) = wanted.as_str().map(str::to_lowercase) else {
        return false;
    };
    entry
        .iter()
        .filter(|(key, _)| !OPERATIONAL_ATTRIBUTES.contains(&key.as_str()))
        .any(|(_, value)| {
            value
                .as_str()
                .is_some_and(|text| text.to_lowercase().contains(&needle))
        })
}

fn values_match(actual: &Value, wanted: &Value) -> bool {
    match (actual, wanted) {
        (Value::String(actual), Value::String(wanted)) => actual.eq_ignore_ascii_case(wanted),
        (Value::Array(values), wanted) => values.iter().any(|value| values_match(value, wanted)),
        (actual, wanted) => actual == wanted,
    }
}

#[cfg(test)]
mod tests {
    use super::{MemoryBackend, PrimaryKeyPolicy, ENTRY_UUID_ATTRIBUTE};
    use crate::backend::{BackendError, CrudBackend};
    use crate::model::entry::Entry;
    use crate::model::object::DirObject;
    use crate::model::param::Param;
    use serde_json::json;

    fn user() -> DirObject {
        DirObject::new(
            "user",
            vec![
                Param::new("givenname"),
                Param::new("sn"),
                Param::new("uid").primary_key(),
                Param::new("initials"),
            ],
        )
        .expect("valid user schema")
    }

    fn attrs(uid: &str, givenname: &str, sn: &str) -> Entry {
        Entry::from_value(json!({"uid": uid, "givenname": givenname, "sn": sn}))
            .expect("object entry")
    }

    #[test]
    fn create_returns_stored_entry_with_generated_uuid() {
        let backend = MemoryBackend::new(&user());
        let created = backend
            .create(attrs("jdoe", "John", "Doe"))
            .expect("create");
        assert!(created.contains_key(ENTRY_UUID_ATTRIBUTE));
        assert_eq!(created.get("uid"), Some(&json!("jdoe")));
        assert_eq!(backend.len().expect("len"), 1);
    }

    #[test]
    fn caller_supplied_policy_requires_primary_key() {
        let backend = MemoryBackend::new(&user());
        assert_eq!(backend.policy(), PrimaryKeyPolicy::CallerSupplied);
        let mut missing = attrs("jdoe", "John", "Doe");
        missing.remove("uid");
        let err = backend.create(missing).expect_err("pk required");
        assert_eq!(
            err,
            BackendError::MissingPrimaryKey {
                attribute: "uid".to_string()
            }
        );
    }

    #[test]
    fn generated_policy_rejects_supplied_primary_key() {
        let backend = MemoryBackend::generating_keys(&user());
        let err = backend
            .create(attrs("jdoe", "John", "Doe"))
            .expect_err("generated pk must not be supplied");
        assert!(matches!(err, BackendError::UnexpectedPrimaryKey { .. }));

        let mut without_pk = attrs("jdoe", "John", "Doe");
        without_pk.remove("uid");
        let created = backend.create(without_pk).expect("generated create");
        assert!(created.text("uid").is_some_and(|uid| !uid.is_empty()));
    }

    #[test]
    fn rejects_duplicate_primary_key() {
        let backend = MemoryBackend::new(&user());
        backend.create(attrs("jdoe", "John", "Doe")).expect("create");
        let err = backend
            .create(attrs("jdoe", "Jane", "Doe"))
            .expect_err("duplicate");
        assert_eq!(err, BackendError::DuplicateEntry("jdoe".to_string()));
    }

    #[test]
    fn retrieve_hides_operational_attributes_unless_requested() {
        let backend = MemoryBackend::new(&user());
        backend.create(attrs("jdoe", "John", "Doe")).expect("create");

        let all = backend
            .retrieve("jdoe", None)
            .expect("retrieve")
            .expect("entry exists");
        assert!(!all.contains_key(ENTRY_UUID_ATTRIBUTE));
        assert_eq!(all.len(), 3);

        let wanted = vec!["sn".to_string(), ENTRY_UUID_ATTRIBUTE.to_string()];
        let some = backend
            .retrieve("jdoe", Some(wanted.as_slice()))
            .expect("retrieve")
            .expect("entry exists");
        assert_eq!(some.keys().collect::<Vec<_>>(), vec!["entryuuid", "sn"]);

        assert_eq!(backend.retrieve("nobody", None).expect("retrieve"), None);
    }

    #[test]
    fn update_merges_partial_attributes() {
        let backend = MemoryBackend::new(&user());
        backend.create(attrs("jdoe", "John", "Doe")).expect("create");

        let mut changes = Entry::new();
        changes.insert("initials", "JD");
        let updated = backend
            .update("jdoe", changes)
            .expect("update")
            .expect("entry exists");
        assert_eq!(updated.get("initials"), Some(&json!("JD")));
        assert_eq!(updated.get("givenname"), Some(&json!("John")));

        assert_eq!(backend.update("nobody", Entry::new()).expect("update"), None);
    }

    #[test]
    fn update_rejects_primary_key_change() {
        let backend = MemoryBackend::new(&user());
        backend.create(attrs("jdoe", "John", "Doe")).expect("create");
        let mut changes = Entry::new();
        changes.insert("uid", "jsmith");
        let err = backend.update("jdoe", changes).expect_err("pk is reserved");
        assert!(matches!(err, BackendError::UnexpectedPrimaryKey { .. }));
    }

    #[test]
    fn delete_signals_missing_entry_through_error() {
        let backend = MemoryBackend::new(&user());
        backend.create(attrs("jdoe", "John", "Doe")).expect("create");
        backend.delete("jdoe").expect("delete");
        assert!(backend.is_empty().expect("is_empty"));
        let err = backend.delete("jdoe").expect_err("already deleted");
        assert_eq!(err, BackendError::NotFound("jdoe".to_string()));
    }

    #[test]
    fn search_filters_by_attribute_and_free_text() {
        let backend = MemoryBackend::new(&user());
        backend.create(attrs("jdoe", "John", "Doe")).expect("create");
        backend.create(attrs("asmith", "Alice", "Smith")).expect("create");
        backend.create(attrs("bdoe", "Bob", "Doe")).expect("create");

        let mut by_sn = Entry::new();
        by_sn.insert("sn", "doe");
        let uids: Vec<String> = backend
            .search(&by_sn)
            .expect("search")
            .iter()
            .filter_map(|entry| entry.text("uid"))
            .collect();
        assert_eq!(uids, vec!["bdoe", "jdoe"]);

        let mut free_text = Entry::new();
        free_text.insert("criteria", "smi");
        assert_eq!(backend.search(&free_text).expect("search").len(), 1);

        let mut unknown = Entry::new();
        unknown.insert("sizelimit", 1);
        assert_eq!(backend.search(&unknown).expect("search").len(), 3);

        let mut nothing = Entry::new();
        nothing.insert("givenname", "Zed");
        assert!(backend.search(&nothing).expect("search").is_empty());
    }

    #[test]
    fn named_backend_reports_custom_name() {
        let backend = MemoryBackend::new(&user()).named("Ldap");
        assert_eq!(backend.name(), "Ldap");
    }
}
