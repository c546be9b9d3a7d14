//! Plugin registry for objects and their CRUD commands.
//!
//! # Responsibility
//! - Collect object schemas and command declarations at registration time.
//! - Finalize them into a frozen [`Api`] whose commands are ready to invoke.
//!
//! # Invariants
//! - Object and command names are unique and are lowercase identifiers.
//! - A configuration error prevents the whole registry from finalizing.
//! - A finalized `Api` is immutable and shareable across threads.

use crate::backend::CrudBackend;
use crate::command::crud::CrudKind;
use crate::command::error::{CommandDefinitionError, CommandError, CommandResult};
use crate::command::invoke::CommandCall;
use crate::command::method::{Command, CommandConfig};
use crate::command::output::CommandOutput;
use crate::config::CoreConfig;
use crate::model::is_valid_name;
use crate::model::object::DirObject;
use log::{error, info};
use std::collections::BTreeMap;
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::sync::Arc;

/// Registration/finalize errors.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RegistryError {
    DuplicateObject(String),
    InvalidCommandName(String),
    DuplicateCommand(String),
    UnknownObject { command: String, object: String },
    Definition(CommandDefinitionError),
}

impl Display for RegistryError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::DuplicateObject(name) => write!(f, "object already registered: {name}"),
            Self::InvalidCommandName(name) => write!(f, "command name is invalid: {name}"),
            Self::DuplicateCommand(name) => write!(f, "command already registered: {name}"),
            Self::UnknownObject { command, object } => {
                write!(f, "command {command} references unknown object: {object}")
            }
            Self::Definition(err) => write!(f, "{err}"),
        }
    }
}

impl Error for RegistryError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Definition(err) => Some(err),
            _ => None,
        }
    }
}

impl From<CommandDefinitionError> for RegistryError {
    fn from(value: CommandDefinitionError) -> Self {
        Self::Definition(value)
    }
}

/// Declaration of one command before finalize.
#[derive(Debug, Clone)]
pub struct CommandSpec {
    pub name: String,
    pub object: String,
    pub kind: CrudKind,
    pub config: CommandConfig,
}

impl CommandSpec {
    pub fn new(name: impl Into<String>, object: impl Into<String>, kind: CrudKind) -> Self {
        Self {
            name: name.into(),
            object: object.into(),
            kind,
            config: CommandConfig::default(),
        }
    }

    pub fn with_config(mut self, config: CommandConfig) -> Self {
        self.config = config;
        self
    }
}

/// Mutable registration phase.
#[derive(Debug, Default)]
pub struct Registry {
    objects: BTreeMap<String, Arc<DirObject>>,
    commands: BTreeMap<String, CommandSpec>,
    search_size_limit: Option<usize>,
}

impl Registry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a registry whose `Search` commands default to the configured
    /// size limit.
    pub fn from_config(config: &CoreConfig) -> Self {
        Self {
            search_size_limit: config.search_size_limit,
            ..Self::default()
        }
    }

    pub fn register_object(&mut self, object: DirObject) -> Result<(), RegistryError> {
        let name = object.name().to_string();
        if self.objects.contains_key(&name) {
            return Err(RegistryError::DuplicateObject(name));
        }
        self.objects.insert(name, Arc::new(object));
        Ok(())
    }

    pub fn register_command(&mut self, spec: CommandSpec) -> Result<(), RegistryError> {
        if !is_valid_name(&spec.name) {
            return Err(RegistryError::InvalidCommandName(spec.name));
        }
        if self.commands.contains_key(&spec.name) {
            return Err(RegistryError::DuplicateCommand(spec.name));
        }
        self.commands.insert(spec.name.clone(), spec);
        Ok(())
    }

    /// Registers the five standard commands (`<object>_add`, `_show`, `_mod`,
    /// `_del`, `_find`) with default configuration.
    pub fn register_crud(&mut self, object: &str) -> Result<(), RegistryError> {
        for kind in CrudKind::all() {
            let name = format!("{object}_{}", kind.default_suffix());
            self.register_command(CommandSpec::new(name, object, kind))?;
        }
        Ok(())
    }

    pub fn len(&self) -> usize {
        self.commands.len()
    }

    pub fn is_empty(&self) -> bool {
        self.commands.is_empty()
    }

    /// Derives every registered command into a frozen [`Api`].
    pub fn finalize(self) -> Result<Api, RegistryError> {
        let mut commands = BTreeMap::new();
        for (name, spec) in self.commands {
            let Some(object) = self.objects.get(&spec.object) else {
                error!(
                    "event=registry_finalize module=registry status=error command={} error_code=unknown_object",
                    name
                );
                return Err(RegistryError::UnknownObject {
                    command: name,
                    object: spec.object,
                });
            };

            let mut config = spec.config;
            if spec.kind == CrudKind::Search && config.size_limit.is_none() {
                config.size_limit = self.search_size_limit;
            }
            let command = Command::finalize(name.clone(), spec.kind, Arc::clone(object), config)
                .map_err(|err| {
                    error!(
                        "event=registry_finalize module=registry status=error command={} error={}",
                        name, err
                    );
                    RegistryError::from(err)
                })?;
            commands.insert(name, Arc::new(command));
        }

        info!(
            "event=registry_finalize module=registry status=ok objects={} commands={}",
            self.objects.len(),
            commands.len()
        );
        Ok(Api {
            objects: self.objects,
            commands,
        })
    }
}

/// Frozen set of objects and finalized commands.
#[derive(Debug)]
pub struct Api {
    objects: BTreeMap<String, Arc<DirObject>>,
    commands: BTreeMap<String, Arc<Command>>,
}

impl Api {
    pub fn object(&self, name: &str) -> Option<&DirObject> {
        self.objects.get(name).map(Arc::as_ref)
    }

    pub fn command(&self, name: &str) -> Option<&Command> {
        self.commands.get(name).map(Arc::as_ref)
    }

    /// Sorted command names.
    pub fn command_names(&self) -> Vec<&str> {
        self.commands.keys().map(String::as_str).collect()
    }

    /// Commands bound to `object`, sorted by name.
    pub fn commands_for(&self, object: &str) -> Vec<&Command> {
        self.commands
            .values()
            .filter(|command| command.object().name() == object)
            .map(Arc::as_ref)
            .collect()
    }

    /// Invokes one command by name.
    pub fn invoke(
        &self,
        name: &str,
        backend: &dyn CrudBackend,
        call: CommandCall,
    ) -> CommandResult<CommandOutput> {
        let command = self
            .command(name)
            .ok_or_else(|| CommandError::UnknownCommand(name.to_string()))?;
        command.invoke(backend, call)
    }
}
