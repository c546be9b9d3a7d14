//! Command invocation against a backend.
//!
//! # Responsibility
//! - Bind caller input onto the frozen argument/option lists.
//! - Forward the call through `CrudBackend` and assemble the contract result.
//!
//! # Invariants
//! - Every result is validated against the output contract before return.
//! - Invocation holds no lock and mutates no command state.
//! - Logs carry command metadata only, never attribute values.

use crate::backend::CrudBackend;
use crate::command::crud::{CrudKind, SEARCH_CRITERIA_ARG};
use crate::command::error::{CommandError, CommandResult, UsageError};
use crate::command::method::Command;
use crate::command::output::{CommandOutput, ValueType};
use crate::model::entry::Entry;
use crate::model::param::Param;
use log::{debug, error, info, warn};
use serde_json::Value;
use std::time::Instant;

/// Caller input for one invocation.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CommandCall {
    /// Positional values, matched to arguments in order.
    pub args: Vec<Value>,
    /// Named values, matched to options by name.
    pub options: Entry,
}

impl CommandCall {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn arg(mut self, value: impl Into<Value>) -> Self {
        self.args.push(value.into());
        self
    }

    pub fn option(mut self, name: impl Into<String>, value: impl Into<Value>) -> Self {
        self.options.insert(name, value);
        self
    }
}

impl Command {
    /// Runs this command against `backend`.
    ///
    /// # Errors
    /// - `Usage` when input does not bind onto the argument/option lists.
    /// - `NotFound` when `Retrieve`/`Update` address a missing entry.
    /// - `Backend` for any backend failure, unchanged.
    /// - `OutputContract` when the assembled result breaks the contract.
    pub fn invoke(&self, backend: &dyn CrudBackend, call: CommandCall) -> CommandResult<CommandOutput> {
        let started_at = Instant::now();
        debug!(
            "event=command_invoke module=command status=start command={} kind={} backend={}",
            self.name(),
            self.kind().as_str(),
            backend.name()
        );

        let supplied = self.bind(call)?;
        let output = match self.dispatch(backend, &supplied) {
            Ok(output) => output,
            Err(err) => {
                warn!(
                    "event=command_invoke module=command status=error command={} duration_ms={} error={}",
                    self.name(),
                    started_at.elapsed().as_millis(),
                    err
                );
                return Err(err);
            }
        };

        if let Err(err) = self.validate_output(&output) {
            error!(
                "event=output_contract_violation module=command status=error command={} backend={}",
                self.name(),
                backend.name()
            );
            return Err(err.into());
        }

        info!(
            "event=command_invoke module=command status=ok command={} duration_ms={}",
            self.name(),
            started_at.elapsed().as_millis()
        );
        Ok(output)
    }

    /// Binds caller input, applies autofill defaults and checks requirements.
    pub fn bind(&self, call: CommandCall) -> Result<Entry, UsageError> {
        if call.args.len() > self.args().len() {
            return Err(UsageError::TooManyArguments {
                command: self.name().to_string(),
                max: self.args().len(),
                got: call.args.len(),
            });
        }

        let mut supplied = Entry::new();
        for (param, value) in self.args().iter().zip(call.args) {
            self.bind_value(&mut supplied, param, value)?;
        }
        for (name, value) in call.options {
            let Some(param) = self.option(&name) else {
                return Err(UsageError::UnknownOption {
                    command: self.name().to_string(),
                    option: name,
                });
            };
            self.bind_value(&mut supplied, param, value)?;
        }

        for param in self.params() {
            if supplied.contains_key(param.name()) || !param.autofill() {
                continue;
            }
            if let Some(value) = param.resolve_default(&supplied) {
                self.bind_value(&mut supplied, param, value)?;
            }
        }

        if let Some(missing) = self
            .params()
            .find(|param| param.is_required() && !supplied.contains_key(param.name()))
        {
            return Err(UsageError::MissingRequired {
                command: self.name().to_string(),
                param: missing.name().to_string(),
            });
        }
        Ok(supplied)
    }

    fn bind_value(&self, supplied: &mut Entry, param: &Param, value: Value) -> Result<(), UsageError> {
        if value.is_null() {
            return Ok(());
        }
        if !param.param_kind().accepts(&value) {
            return Err(UsageError::InvalidValue {
                command: self.name().to_string(),
                param: param.name().to_string(),
                expected: param.param_kind(),
                actual: ValueType::of(&value),
            });
        }
        supplied.insert(param.name(), value);
        Ok(())
    }

    fn dispatch(&self, backend: &dyn CrudBackend, supplied: &Entry) -> CommandResult<CommandOutput> {
        match self.kind() {
            CrudKind::Create => {
                let attributes = self.attribute_values(supplied, self.params());
                let entry = backend.create(attributes)?;
                let value = self.entry_key(&entry, supplied);
                Ok(self.entry_output(entry, value))
            }
            CrudKind::Retrieve => {
                let key = self.query_key(supplied);
                match backend.retrieve(&key, None)? {
                    Some(entry) => Ok(self.entry_output(entry, key)),
                    None => Err(self.not_found(key)),
                }
            }
            CrudKind::Update => {
                let key = self.query_key(supplied);
                let changes = self.attribute_values(supplied, self.options().iter());
                match backend.update(&key, changes)? {
                    Some(entry) => Ok(self.entry_output(entry, key)),
                    None => Err(self.not_found(key)),
                }
            }
            CrudKind::Delete => {
                let key = self.query_key(supplied);
                backend.delete(&key)?;
                let mut output = CommandOutput::new();
                output.insert("result".to_string(), Value::Bool(true));
                output.insert("summary".to_string(), self.render_summary(&key, None));
                output.insert("value".to_string(), Value::String(key));
                Ok(output)
            }
            CrudKind::Search => {
                let mut entries = backend.search(supplied)?;
                let truncated = match self.config().size_limit {
                    Some(limit) if entries.len() > limit => {
                        entries.truncate(limit);
                        true
                    }
                    _ => false,
                };
                let count = entries.len();
                let criteria = supplied.text(SEARCH_CRITERIA_ARG).unwrap_or_default();
                let mut output = CommandOutput::new();
                output.insert(
                    "result".to_string(),
                    Value::Array(entries.into_iter().map(Entry::into_value).collect()),
                );
                output.insert("count".to_string(), Value::from(count));
                output.insert("truncated".to_string(), Value::Bool(truncated));
                output.insert(
                    "summary".to_string(),
                    self.render_summary(&criteria, Some(count)),
                );
                Ok(output)
            }
        }
    }

    fn attribute_values<'a>(
        &self,
        supplied: &Entry,
        params: impl Iterator<Item = &'a Param>,
    ) -> Entry {
        params
            .filter(|param| param.is_attribute())
            .filter_map(|param| {
                supplied
                    .get(param.name())
                    .map(|value| (param.name().to_string(), value.clone()))
            })
            .collect()
    }

    /// Primary-key value addressed by a pk-query command, empty when the
    /// object has no primary key.
    fn query_key(&self, supplied: &Entry) -> String {
        self.args()
            .first()
            .filter(|param| param.is_primary_key())
            .and_then(|param| supplied.text(param.name()))
            .unwrap_or_default()
    }

    /// Primary-key value of a created entry, preferring the stored value so
    /// backend-generated keys are reported.
    fn entry_key(&self, entry: &Entry, supplied: &Entry) -> String {
        match self.object().primary_key() {
            Some(pk) => entry
                .text(pk.name())
                .or_else(|| supplied.text(pk.name()))
                .unwrap_or_default(),
            None => String::new(),
        }
    }

    fn entry_output(&self, entry: Entry, value: String) -> CommandOutput {
        let mut output = CommandOutput::new();
        output.insert("result".to_string(), entry.into_value());
        output.insert("summary".to_string(), self.render_summary(&value, None));
        output.insert("value".to_string(), Value::String(value));
        output
    }

    fn render_summary(&self, value: &str, count: Option<usize>) -> Value {
        match self.config().msg_summary.as_deref() {
            Some(template) => {
                let mut rendered = template.replace("{value}", value);
                if let Some(count) = count {
                    rendered = rendered.replace("{count}", &count.to_string());
                }
                Value::String(rendered)
            }
            None => Value::Null,
        }
    }

    fn not_found(&self, key: String) -> CommandError {
        CommandError::NotFound {
            object: self.object().name().to_string(),
            key,
        }
    }
}
