//! Parameter descriptors.
//!
//! # Responsibility
//! - Describe one named, typed attribute of an object schema.
//! - Produce flag-overridden clones for derived argument/option lists.
//!
//! # Invariants
//! - A `Param` is immutable after construction; `clone_with` never touches the
//!   source.
//! - `required` defaults to `true`; a trailing `?` in a name spec makes the
//!   parameter optional.

use crate::model::entry::Entry;
use serde_json::Value;
use std::collections::BTreeSet;

/// Value kind accepted by a parameter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum ParamKind {
    Str,
    Int,
    Flag,
    Password,
}

impl ParamKind {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Str => "str",
            Self::Int => "int",
            Self::Flag => "flag",
            Self::Password => "password",
        }
    }

    /// Returns whether a supplied JSON value has the shape this kind expects.
    pub fn accepts(self, value: &Value) -> bool {
        match self {
            Self::Str | Self::Password => value.is_string(),
            Self::Int => value.is_i64() || value.is_u64(),
            Self::Flag => value.is_boolean(),
        }
    }
}

/// Computes a default from the values supplied so far.
pub type DefaultFrom = fn(&Entry) -> Option<Value>;

/// Default-value provider for a parameter.
#[derive(Debug, Clone)]
pub enum DefaultValue {
    Static(Value),
    From(DefaultFrom),
}

/// Flag overrides applied by [`Param::clone_with`]. `None` keeps the source flag.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ParamOverrides {
    pub required: Option<bool>,
    pub attribute: Option<bool>,
    pub query: Option<bool>,
    pub autofill: Option<bool>,
}

impl ParamOverrides {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn required(mut self, value: bool) -> Self {
        self.required = Some(value);
        self
    }

    pub fn attribute(mut self, value: bool) -> Self {
        self.attribute = Some(value);
        self
    }

    pub fn query(mut self, value: bool) -> Self {
        self.query = Some(value);
        self
    }

    pub fn autofill(mut self, value: bool) -> Self {
        self.autofill = Some(value);
        self
    }
}

/// One named, typed parameter of an object schema or command.
#[derive(Debug, Clone)]
pub struct Param {
    name: String,
    kind: ParamKind,
    label: Option<String>,
    required: bool,
    primary_key: bool,
    attribute: bool,
    query: bool,
    autofill: bool,
    exclude: BTreeSet<String>,
    default: Option<DefaultValue>,
}

impl Param {
    /// Creates a required `Str` parameter with all other flags off except
    /// `autofill`.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            kind: ParamKind::Str,
            label: None,
            required: true,
            primary_key: false,
            attribute: false,
            query: false,
            autofill: true,
            exclude: BTreeSet::new(),
            default: None,
        }
    }

    /// Parses a compact name spec: `"sn"` is required, `"initials?"` optional.
    pub fn parse(spec: &str) -> Self {
        let spec = spec.trim();
        match spec.strip_suffix('?') {
            Some(name) => Self::new(name).optional(),
            None => Self::new(spec),
        }
    }

    pub fn str(spec: &str) -> Self {
        Self::parse(spec)
    }

    pub fn int(spec: &str) -> Self {
        Self::parse(spec).kind(ParamKind::Int)
    }

    pub fn flag(spec: &str) -> Self {
        Self::parse(spec).kind(ParamKind::Flag)
    }

    pub fn password(spec: &str) -> Self {
        Self::parse(spec).kind(ParamKind::Password)
    }

    pub fn kind(mut self, kind: ParamKind) -> Self {
        self.kind = kind;
        self
    }

    pub fn label(mut self, label: impl Into<String>) -> Self {
        self.label = Some(label.into());
        self
    }

    pub fn optional(mut self) -> Self {
        self.required = false;
        self
    }

    pub fn primary_key(mut self) -> Self {
        self.primary_key = true;
        self
    }

    /// Hides the parameter from the given context, e.g. `"webui"`.
    pub fn exclude(mut self, context: impl Into<String>) -> Self {
        self.exclude.insert(context.into());
        self
    }

    pub fn default_value(mut self, value: impl Into<Value>) -> Self {
        self.default = Some(DefaultValue::Static(value.into()));
        self
    }

    pub fn default_from(mut self, provider: DefaultFrom) -> Self {
        self.default = Some(DefaultValue::From(provider));
        self
    }

    /// Returns a copy with the selected flags overridden.
    pub fn clone_with(&self, overrides: ParamOverrides) -> Self {
        let mut cloned = self.clone();
        if let Some(required) = overrides.required {
            cloned.required = required;
        }
        if let Some(attribute) = overrides.attribute {
            cloned.attribute = attribute;
        }
        if let Some(query) = overrides.query {
            cloned.query = query;
        }
        if let Some(autofill) = overrides.autofill {
            cloned.autofill = autofill;
        }
        cloned
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn param_kind(&self) -> ParamKind {
        self.kind
    }

    /// Human-readable label, falling back to the name.
    pub fn display_label(&self) -> &str {
        self.label.as_deref().unwrap_or(&self.name)
    }

    pub fn is_required(&self) -> bool {
        self.required
    }

    pub fn is_primary_key(&self) -> bool {
        self.primary_key
    }

    pub fn is_attribute(&self) -> bool {
        self.attribute
    }

    pub fn is_query(&self) -> bool {
        self.query
    }

    pub fn autofill(&self) -> bool {
        self.autofill
    }

    pub fn is_excluded_from(&self, context: &str) -> bool {
        self.exclude.contains(context)
    }

    pub fn default_provider(&self) -> Option<&DefaultValue> {
        self.default.as_ref()
    }

    /// Resolves the default against already supplied values.
    pub fn resolve_default(&self, supplied: &Entry) -> Option<Value> {
        match self.default.as_ref()? {
            DefaultValue::Static(value) => Some(value.clone()),
            DefaultValue::From(provider) => provider(supplied),
        }
    }
}
