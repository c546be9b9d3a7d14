//! Output contracts for command return values.
//!
//! # Responsibility
//! - Declare the named, typed members every command result must carry.
//! - Validate a produced result against its contract.
//!
//! # Invariants
//! - A result's key set equals the contract's descriptor names exactly.
//! - A contract violation is a defect of the producer, never a user error.

use serde_json::{Map, Value};
use std::error::Error;
use std::fmt::{Display, Formatter};

/// Result mapping returned by every command.
pub type CommandOutput = Map<String, Value>;

/// Runtime type of a JSON value, as seen by output validation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ValueType {
    Null,
    Bool,
    Int,
    Float,
    Str,
    Mapping,
    List,
}

impl ValueType {
    pub fn of(value: &Value) -> Self {
        match value {
            Value::Null => Self::Null,
            Value::Bool(_) => Self::Bool,
            Value::Number(number) if number.is_i64() || number.is_u64() => Self::Int,
            Value::Number(_) => Self::Float,
            Value::String(_) => Self::Str,
            Value::Array(_) => Self::List,
            Value::Object(_) => Self::Mapping,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Null => "null",
            Self::Bool => "bool",
            Self::Int => "int",
            Self::Float => "float",
            Self::Str => "str",
            Self::Mapping => "mapping",
            Self::List => "list",
        }
    }
}

impl Display for ValueType {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Shape a descriptor requires of its value.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputKind {
    /// Any JSON value.
    Any,
    /// One of the listed types.
    Typed(&'static [ValueType]),
    /// A single entry mapping.
    Entry,
    /// A list whose every element is an entry mapping.
    ListOfEntries,
}

/// One named member of a command result.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OutputDescriptor {
    pub name: &'static str,
    pub kind: OutputKind,
    pub doc: &'static str,
}

impl OutputDescriptor {
    pub const fn any(name: &'static str, doc: &'static str) -> Self {
        Self {
            name,
            kind: OutputKind::Any,
            doc,
        }
    }

    pub const fn typed(
        name: &'static str,
        types: &'static [ValueType],
        doc: &'static str,
    ) -> Self {
        Self {
            name,
            kind: OutputKind::Typed(types),
            doc,
        }
    }

    pub const fn entry(name: &'static str) -> Self {
        Self {
            name,
            kind: OutputKind::Entry,
            doc: "A mapping representing a directory entry",
        }
    }

    pub const fn list_of_entries(name: &'static str) -> Self {
        Self {
            name,
            kind: OutputKind::ListOfEntries,
            doc: "A list of directory entries",
        }
    }

    /// Descriptor family name used in diagnostics.
    pub fn kind_name(&self) -> &'static str {
        match self.kind {
            OutputKind::Any | OutputKind::Typed(_) => "Output",
            OutputKind::Entry => "Entry",
            OutputKind::ListOfEntries => "ListOfEntries",
        }
    }

    /// Types accepted at the top level of this member.
    pub fn accepted_types(&self) -> &'static [ValueType] {
        match self.kind {
            OutputKind::Any => &[],
            OutputKind::Typed(types) => types,
            OutputKind::Entry => &[ValueType::Mapping],
            OutputKind::ListOfEntries => &[ValueType::List],
        }
    }

    /// Validates one member value produced by `command`.
    pub fn validate(&self, command: &str, value: &Value) -> Result<(), OutputError> {
        let actual = ValueType::of(value);
        let accepted = self.accepted_types();
        if !accepted.is_empty() && !accepted.contains(&actual) {
            return Err(OutputError::WrongType {
                command: command.to_string(),
                descriptor: self.name.to_string(),
                expected: accepted.to_vec(),
                actual,
                value: value.clone(),
            });
        }

        if let (OutputKind::ListOfEntries, Value::Array(items)) = (self.kind, value) {
            for (index, item) in items.iter().enumerate() {
                if !item.is_object() {
                    return Err(OutputError::NonMappingEntry {
                        command: command.to_string(),
                        descriptor: self.name.to_string(),
                        index,
                        actual: ValueType::of(item),
                        value: item.clone(),
                    });
                }
            }
        }
        Ok(())
    }
}

const SUMMARY: OutputDescriptor = OutputDescriptor::typed(
    "summary",
    &[ValueType::Str, ValueType::Null],
    "User-friendly description of action performed",
);

const VALUE: OutputDescriptor = OutputDescriptor::typed(
    "value",
    &[ValueType::Str],
    "The primary_key value of the entry, e.g. 'jdoe' for a user",
);

/// Minimal contract: a result of any shape plus a summary.
pub const STANDARD: &[OutputDescriptor] = &[
    OutputDescriptor::any("result", "All commands should at least have a result"),
    SUMMARY,
];

/// Contract for commands returning one entry.
pub const STANDARD_ENTRY: &[OutputDescriptor] =
    &[OutputDescriptor::entry("result"), VALUE, SUMMARY];

/// Contract for commands returning a list of entries.
pub const STANDARD_LIST_OF_ENTRIES: &[OutputDescriptor] = &[
    OutputDescriptor::list_of_entries("result"),
    OutputDescriptor::typed("count", &[ValueType::Int], "Number of entries returned"),
    OutputDescriptor::typed(
        "truncated",
        &[ValueType::Bool],
        "True if not all results were returned",
    ),
    SUMMARY,
];

/// Contract for deletion: a success flag, never an entry.
pub const STANDARD_DELETE: &[OutputDescriptor] = &[
    OutputDescriptor::typed(
        "result",
        &[ValueType::Bool],
        "True means the operation was successful",
    ),
    VALUE,
    SUMMARY,
];

/// Validates a full command result against `contract`.
///
/// Key-set mismatches are reported before any per-member type check.
pub fn validate_output(
    command: &str,
    contract: &[OutputDescriptor],
    output: &CommandOutput,
) -> Result<(), OutputError> {
    let missing: Vec<String> = contract
        .iter()
        .filter(|descriptor| !output.contains_key(descriptor.name))
        .map(|descriptor| descriptor.name.to_string())
        .collect();
    if !missing.is_empty() {
        return Err(OutputError::MissingKeys {
            command: command.to_string(),
            keys: missing,
        });
    }

    let unexpected: Vec<String> = output
        .keys()
        .filter(|key| !contract.iter().any(|descriptor| descriptor.name == key.as_str()))
        .cloned()
        .collect();
    if !unexpected.is_empty() {
        return Err(OutputError::UnexpectedKeys {
            command: command.to_string(),
            keys: unexpected,
        });
    }

    for descriptor in contract {
        if let Some(value) = output.get(descriptor.name) {
            descriptor.validate(command, value)?;
        }
    }
    Ok(())
}

/// Output contract violations.
#[derive(Debug, Clone, PartialEq)]
pub enum OutputError {
    MissingKeys {
        command: String,
        keys: Vec<String>,
    },
    UnexpectedKeys {
        command: String,
        keys: Vec<String>,
    },
    WrongType {
        command: String,
        descriptor: String,
        expected: Vec<ValueType>,
        actual: ValueType,
        value: Value,
    },
    NonMappingEntry {
        command: String,
        descriptor: String,
        index: usize,
        actual: ValueType,
        value: Value,
    },
}

impl Display for OutputError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::MissingKeys { command, keys } => {
                write!(f, "{command}.validate_output(): missing keys {keys:?}")
            }
            Self::UnexpectedKeys { command, keys } => {
                write!(f, "{command}.validate_output(): unexpected keys {keys:?}")
            }
            Self::WrongType {
                command,
                descriptor,
                expected,
                actual,
                value,
            } => {
                let expected = expected
                    .iter()
                    .map(|kind| kind.as_str())
                    .collect::<Vec<_>>()
                    .join(" | ");
                write!(
                    f,
                    "{command}.validate_output():\n  output[\"{descriptor}\"]: need {expected}; got {actual}: {value}"
                )
            }
            Self::NonMappingEntry {
                command,
                descriptor,
                index,
                actual,
                value,
            } => write!(
                f,
                "{command}.validate_output() => ListOfEntries.validate():\n  output[\"{descriptor}\"][{index}]: need a mapping; got a {actual}: {value}"
            ),
        }
    }
}

impl Error for OutputError {}

#[cfg(test)]
mod tests {
    use super::{
        validate_output, CommandOutput, OutputError, ValueType, STANDARD, STANDARD_DELETE,
        STANDARD_ENTRY, STANDARD_LIST_OF_ENTRIES,
    };
    use serde_json::{json, Value};

    fn output(value: Value) -> CommandOutput {
        match value {
            Value::Object(map) => map,
            other => panic!("expected object, got {other}"),
        }
    }

    #[test]
    fn contract_names_follow_declaration_order() {
        let names = |contract: &[super::OutputDescriptor]| {
            contract.iter().map(|d| d.name).collect::<Vec<_>>()
        };
        assert_eq!(names(STANDARD), vec!["result", "summary"]);
        assert_eq!(names(STANDARD_ENTRY), vec!["result", "value", "summary"]);
        assert_eq!(
            names(STANDARD_LIST_OF_ENTRIES),
            vec!["result", "count", "truncated", "summary"]
        );
        assert_eq!(names(STANDARD_DELETE), vec!["result", "value", "summary"]);
    }

    #[test]
    fn accepts_conforming_entry_output() {
        let out = output(json!({
            "result": {"uid": "jdoe"},
            "value": "jdoe",
            "summary": null,
        }));
        validate_output("user_show", STANDARD_ENTRY, &out).expect("valid output");
    }

    #[test]
    fn reports_missing_and_unexpected_keys() {
        let out = output(json!({"result": {"uid": "jdoe"}, "summary": null}));
        let err = validate_output("user_show", STANDARD_ENTRY, &out).expect_err("missing value");
        assert_eq!(
            err.to_string(),
            "user_show.validate_output(): missing keys [\"value\"]"
        );

        let out = output(json!({
            "result": true,
            "value": "jdoe",
            "summary": null,
            "extra": 1,
        }));
        let err = validate_output("user_del", STANDARD_DELETE, &out).expect_err("extra key");
        assert!(matches!(err, OutputError::UnexpectedKeys { .. }));
    }

    #[test]
    fn rejects_wrong_member_type() {
        let out = output(json!({"result": "jdoe", "value": "jdoe", "summary": null}));
        let err = validate_output("user_show", STANDARD_ENTRY, &out).expect_err("not a mapping");
        assert_eq!(
            err.to_string(),
            "user_show.validate_output():\n  output[\"result\"]: need mapping; got str: \"jdoe\""
        );

        let out = output(json!({
            "result": [],
            "count": 0,
            "truncated": false,
            "summary": 7,
        }));
        let err = validate_output("user_find", STANDARD_LIST_OF_ENTRIES, &out)
            .expect_err("summary must be str or null");
        assert!(err.to_string().contains("need str | null; got int: 7"));
    }

    #[test]
    fn list_of_entries_reports_offending_element() {
        let out = output(json!({
            "result": [{"uid": "a"}, "bad"],
            "count": 2,
            "truncated": false,
            "summary": null,
        }));
        let err = validate_output("user_find", STANDARD_LIST_OF_ENTRIES, &out)
            .expect_err("non-mapping element");
        assert_eq!(
            err,
            OutputError::NonMappingEntry {
                command: "user_find".to_string(),
                descriptor: "result".to_string(),
                index: 1,
                actual: ValueType::Str,
                value: json!("bad"),
            }
        );
        assert_eq!(
            err.to_string(),
            "user_find.validate_output() => ListOfEntries.validate():\n  output[\"result\"][1]: need a mapping; got a str: \"bad\""
        );
    }

    #[test]
    fn standard_result_accepts_any_value() {
        let out = output(json!({"result": [1, "two", null], "summary": "done"}));
        validate_output("ping", STANDARD, &out).expect("any result allowed");
    }

    #[test]
    fn value_type_distinguishes_int_and_float() {
        assert_eq!(ValueType::of(&json!(3)), ValueType::Int);
        assert_eq!(ValueType::of(&json!(3.5)), ValueType::Float);
        assert_eq!(ValueType::of(&json!(null)), ValueType::Null);
    }
}
