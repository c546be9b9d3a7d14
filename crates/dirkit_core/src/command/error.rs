//! Command definition and invocation errors.

use crate::backend::BackendError;
use crate::command::output::{OutputError, ValueType};
use crate::model::param::ParamKind;
use std::error::Error;
use std::fmt::{Display, Formatter};

pub type CommandResult<T> = Result<T, CommandError>;

/// Configuration errors raised while finalizing a command.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CommandDefinitionError {
    InvalidName(String),
    InvalidOptionName { command: String, option: String },
    /// A name appears twice across the argument and option lists.
    DuplicateParam { command: String, param: String },
}

impl Display for CommandDefinitionError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::InvalidName(value) => write!(f, "command name is invalid: {value}"),
            Self::InvalidOptionName { command, option } => {
                write!(f, "{command}: option name is invalid: {option}")
            }
            Self::DuplicateParam { command, param } => {
                write!(f, "{command}: parameter derived twice: {param}")
            }
        }
    }
}

impl Error for CommandDefinitionError {}

/// Caller input rejected before reaching the backend.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UsageError {
    TooManyArguments {
        command: String,
        max: usize,
        got: usize,
    },
    UnknownOption {
        command: String,
        option: String,
    },
    MissingRequired {
        command: String,
        param: String,
    },
    InvalidValue {
        command: String,
        param: String,
        expected: ParamKind,
        actual: ValueType,
    },
}

impl Display for UsageError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::TooManyArguments { command, max, got } => {
                write!(f, "{command}: takes at most {max} argument(s), got {got}")
            }
            Self::UnknownOption { command, option } => {
                write!(f, "{command}: unknown option: {option}")
            }
            Self::MissingRequired { command, param } => {
                write!(f, "{command}: missing required parameter: {param}")
            }
            Self::InvalidValue {
                command,
                param,
                expected,
                actual,
            } => write!(
                f,
                "{command}: parameter {param} needs a {}, got a {actual}",
                expected.as_str()
            ),
        }
    }
}

impl Error for UsageError {}

/// Errors surfaced by a command invocation.
#[derive(Debug, Clone, PartialEq)]
pub enum CommandError {
    UnknownCommand(String),
    Usage(UsageError),
    NotFound { object: String, key: String },
    Backend(BackendError),
    /// The produced result broke the output contract. Always a defect.
    OutputContract(OutputError),
}

impl Display for CommandError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::UnknownCommand(name) => write!(f, "unknown command: {name}"),
            Self::Usage(err) => write!(f, "{err}"),
            Self::NotFound { object, key } => write!(f, "{object} not found: {key}"),
            Self::Backend(err) => write!(f, "{err}"),
            Self::OutputContract(err) => write!(f, "{err}"),
        }
    }
}

impl Error for CommandError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Usage(err) => Some(err),
            Self::Backend(err) => Some(err),
            Self::OutputContract(err) => Some(err),
            Self::UnknownCommand(_) | Self::NotFound { .. } => None,
        }
    }
}

impl From<UsageError> for CommandError {
    fn from(value: UsageError) -> Self {
        Self::Usage(value)
    }
}

impl From<BackendError> for CommandError {
    fn from(value: BackendError) -> Self {
        Self::Backend(value)
    }
}

impl From<OutputError> for CommandError {
    fn from(value: OutputError) -> Self {
        Self::OutputContract(value)
    }
}
