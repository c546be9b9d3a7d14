//! Command use-case service.
//!
//! # Responsibility
//! - Provide name-based entry points over a frozen [`Api`].
//! - Route every call to the owned backend.
//!
//! # Invariants
//! - The service never mutates the `Api`; clones share it.
//! - Service calls never bypass binding or output validation.

use crate::backend::CrudBackend;
use crate::command::error::{CommandError, CommandResult};
use crate::command::invoke::CommandCall;
use crate::command::output::CommandOutput;
use crate::prompt::PromptField;
use crate::registry::Api;
use std::sync::Arc;

/// Use-case wrapper binding commands to a backend.
pub struct CommandService<B: CrudBackend> {
    api: Arc<Api>,
    backend: B,
}

impl<B: CrudBackend> CommandService<B> {
    pub fn new(api: Arc<Api>, backend: B) -> Self {
        Self { api, backend }
    }

    pub fn api(&self) -> &Api {
        &self.api
    }

    pub fn backend(&self) -> &B {
        &self.backend
    }

    /// Invokes command `name`.
    ///
    /// # Errors
    /// - `UnknownCommand` when `name` is not registered.
    /// - Anything [`crate::command::method::Command::invoke`] returns.
    pub fn call(&self, name: &str, call: CommandCall) -> CommandResult<CommandOutput> {
        self.api.invoke(name, &self.backend, call)
    }

    /// Prompt fields for command `name` in `context`.
    pub fn prompt_fields(&self, name: &str, context: &str) -> CommandResult<Vec<PromptField>> {
        self.api
            .command(name)
            .map(|command| command.prompt_fields(context))
            .ok_or_else(|| CommandError::UnknownCommand(name.to_string()))
    }
}
