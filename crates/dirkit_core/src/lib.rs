//! Schema-derived CRUD command core.
//! Object schemas declare parameters once; the five standard commands derive
//! their arguments, options and output contracts from them.

pub mod backend;
pub mod command;
pub mod config;
pub mod logging;
pub mod model;
pub mod prompt;
pub mod registry;
pub mod service;

pub use backend::memory::{MemoryBackend, PrimaryKeyPolicy, ENTRY_UUID_ATTRIBUTE};
pub use backend::{BackendError, BackendResult, CrudBackend};
pub use command::crud::{CrudKind, SEARCH_CRITERIA_ARG};
pub use command::error::{CommandDefinitionError, CommandError, CommandResult, UsageError};
pub use command::invoke::CommandCall;
pub use command::method::{Command, CommandConfig};
pub use command::output::{
    validate_output, CommandOutput, OutputDescriptor, OutputError, OutputKind, ValueType,
};
pub use config::{ConfigError, CoreConfig};
pub use logging::{
    default_log_level, init_logging, init_logging_from, logging_status, LogTarget, LoggingError,
};
pub use model::entry::Entry;
pub use model::object::{DirObject, SchemaError};
pub use model::param::{DefaultValue, Param, ParamKind, ParamOverrides};
pub use prompt::{FieldMapper, FieldWidget, PromptField, WEBUI_CONTEXT};
pub use registry::{Api, CommandSpec, Registry, RegistryError};
pub use service::command_service::CommandService;

/// Returns the core crate version.
pub fn core_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}
