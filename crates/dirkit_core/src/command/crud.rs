//! CRUD command kinds and their schema derivation rules.
//!
//! # Responsibility
//! - Derive positional arguments and schema options per command kind.
//! - Bind each kind to its output contract.
//!
//! # Invariants
//! - Every kind except `Search` takes the primary key (if any) as its only
//!   schema-derived argument.
//! - Derived lists keep schema declaration order.
//! - Derivation clones schema parameters and never mutates them.

use crate::command::output::{
    OutputDescriptor, STANDARD_DELETE, STANDARD_ENTRY, STANDARD_LIST_OF_ENTRIES,
};
use crate::model::object::DirObject;
use crate::model::param::{Param, ParamOverrides};

/// Name of the free-text argument taken by `Search`.
pub const SEARCH_CRITERIA_ARG: &str = "criteria";

/// The five standard command shapes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum CrudKind {
    Create,
    Retrieve,
    Update,
    Delete,
    Search,
}

impl CrudKind {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Create => "create",
            Self::Retrieve => "retrieve",
            Self::Update => "update",
            Self::Delete => "delete",
            Self::Search => "search",
        }
    }

    /// Conventional command-name suffix, e.g. `user_add` for `Create`.
    pub fn default_suffix(self) -> &'static str {
        match self {
            Self::Create => "add",
            Self::Retrieve => "show",
            Self::Update => "mod",
            Self::Delete => "del",
            Self::Search => "find",
        }
    }

    pub fn all() -> [CrudKind; 5] {
        [
            Self::Create,
            Self::Retrieve,
            Self::Update,
            Self::Delete,
            Self::Search,
        ]
    }

    /// Whether this kind addresses one entry by primary key.
    pub fn is_pk_query(self) -> bool {
        matches!(self, Self::Retrieve | Self::Update | Self::Delete)
    }

    pub fn output_contract(self) -> &'static [OutputDescriptor] {
        match self {
            Self::Create | Self::Retrieve | Self::Update => STANDARD_ENTRY,
            Self::Delete => STANDARD_DELETE,
            Self::Search => STANDARD_LIST_OF_ENTRIES,
        }
    }

    /// Derives the positional arguments for `object`.
    pub fn derive_args(self, object: &DirObject) -> Vec<Param> {
        match self {
            Self::Create => object
                .primary_key()
                .map(|pk| pk.clone_with(ParamOverrides::new().attribute(true)))
                .into_iter()
                .collect(),
            Self::Retrieve | Self::Update | Self::Delete => pk_query_args(object),
            Self::Search => vec![Param::new(SEARCH_CRITERIA_ARG).optional()],
        }
    }

    /// Derives the schema block of the option list, given the derived `args`.
    ///
    /// Base-layer options are spliced around this block by the caller.
    pub fn derive_options(self, object: &DirObject, args: &[Param]) -> Vec<Param> {
        match self {
            Self::Create => object
                .params_minus(args)
                .map(|param| param.clone_with(ParamOverrides::new().attribute(true)))
                .collect(),
            Self::Update => object
                .params_minus_pk()
                .map(|param| {
                    param.clone_with(
                        ParamOverrides::new()
                            .attribute(true)
                            .required(false)
                            .autofill(false),
                    )
                })
                .collect(),
            Self::Search => object
                .params_minus(args)
                .map(|param| {
                    param.clone_with(
                        ParamOverrides::new()
                            .attribute(true)
                            .query(true)
                            .required(false)
                            .autofill(false),
                    )
                })
                .collect(),
            Self::Retrieve | Self::Delete => Vec::new(),
        }
    }
}

fn pk_query_args(object: &DirObject) -> Vec<Param> {
    object
        .primary_key()
        .map(|pk| pk.clone_with(ParamOverrides::new().attribute(true).query(true)))
        .into_iter()
        .collect()
}
