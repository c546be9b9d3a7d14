//! Schema-bearing directory object.

use crate::model::is_valid_name;
use crate::model::param::Param;
use std::collections::BTreeSet;
use std::error::Error;
use std::fmt::{Display, Formatter};

/// Schema configuration errors detected when an object is built.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SchemaError {
    InvalidObjectName(String),
    InvalidParamName {
        object: String,
        param: String,
    },
    DuplicateParam {
        object: String,
        param: String,
    },
    DuplicatePrimaryKey {
        object: String,
        first: String,
        second: String,
    },
}

impl Display for SchemaError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::InvalidObjectName(value) => write!(f, "object name is invalid: {value}"),
            Self::InvalidParamName { object, param } => {
                write!(f, "{object}: parameter name is invalid: {param}")
            }
            Self::DuplicateParam { object, param } => {
                write!(f, "{object}: parameter declared twice: {param}")
            }
            Self::DuplicatePrimaryKey {
                object,
                first,
                second,
            } => write!(
                f,
                "{object}: primary key declared twice: {first} and {second}"
            ),
        }
    }
}

impl Error for SchemaError {}

/// A manageable directory object (e.g. `user`) and its ordered schema.
#[derive(Debug, Clone)]
pub struct DirObject {
    name: String,
    params: Vec<Param>,
    primary_key: Option<usize>,
}

impl DirObject {
    /// Builds an object after validating its schema.
    ///
    /// # Errors
    /// - Object or parameter names that are not lowercase identifiers.
    /// - A parameter name declared twice.
    /// - More than one parameter flagged as primary key.
    pub fn new(
        name: impl Into<String>,
        params: impl IntoIterator<Item = Param>,
    ) -> Result<Self, SchemaError> {
        let name = name.into();
        if !is_valid_name(&name) {
            return Err(SchemaError::InvalidObjectName(name));
        }

        let params: Vec<Param> = params.into_iter().collect();
        let mut seen = BTreeSet::new();
        let mut primary_key: Option<usize> = None;
        for (index, param) in params.iter().enumerate() {
            if !is_valid_name(param.name()) {
                return Err(SchemaError::InvalidParamName {
                    object: name,
                    param: param.name().to_string(),
                });
            }
            if !seen.insert(param.name()) {
                return Err(SchemaError::DuplicateParam {
                    object: name,
                    param: param.name().to_string(),
                });
            }
            if param.is_primary_key() {
                if let Some(first) = primary_key {
                    return Err(SchemaError::DuplicatePrimaryKey {
                        object: name,
                        first: params[first].name().to_string(),
                        second: param.name().to_string(),
                    });
                }
                primary_key = Some(index);
            }
        }

        Ok(Self {
            name,
            params,
            primary_key,
        })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Schema parameters in declaration order.
    pub fn params(&self) -> &[Param] {
        &self.params
    }

    pub fn param(&self, name: &str) -> Option<&Param> {
        self.params.iter().find(|param| param.name() == name)
    }

    pub fn primary_key(&self) -> Option<&Param> {
        self.primary_key.map(|index| &self.params[index])
    }

    /// Schema parameters whose names do not appear in `exclude`.
    pub fn params_minus<'a>(&'a self, exclude: &'a [Param]) -> impl Iterator<Item = &'a Param> {
        self.params
            .iter()
            .filter(move |param| !exclude.iter().any(|other| other.name() == param.name()))
    }

    /// Schema parameters except the primary key.
    pub fn params_minus_pk(&self) -> impl Iterator<Item = &Param> {
        self.params.iter().filter(|param| !param.is_primary_key())
    }
}
