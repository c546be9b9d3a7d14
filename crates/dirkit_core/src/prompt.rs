//! Prompt field mapping for interactive frontends.
//!
//! # Responsibility
//! - Translate command parameters into frontend-neutral prompt fields.
//!
//! # Invariants
//! - Every `ParamKind` maps to exactly one widget; unmapped kinds use the
//!   `Str` strategy.
//! - Params excluded from a context never produce a field for it.

use crate::command::method::Command;
use crate::model::param::{DefaultValue, Param, ParamKind};
use once_cell::sync::Lazy;
use serde::Serialize;
use serde_json::Value;
use std::collections::BTreeMap;

/// Context name used by the web frontend.
pub const WEBUI_CONTEXT: &str = "webui";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum FieldWidget {
    TextRow,
    PasswordRow,
    SelectRow,
}

/// One input row rendered for a parameter.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PromptField {
    pub widget: FieldWidget,
    pub name: String,
    pub label: String,
    pub required: bool,
    /// Static default only; computed defaults are resolved at invocation.
    pub default: Option<Value>,
}

type FieldStrategy = fn(&Param) -> PromptField;

/// Dispatch table from parameter kind to field strategy.
pub struct FieldMapper {
    strategies: BTreeMap<ParamKind, FieldStrategy>,
}

static STANDARD_MAPPER: Lazy<FieldMapper> = Lazy::new(FieldMapper::standard);

impl FieldMapper {
    /// `Str` → text, `Password` → password, `Flag` → select.
    ///
    /// `Int` has no entry of its own and renders through the `Str` fallback.
    pub fn standard() -> Self {
        let mut strategies: BTreeMap<ParamKind, FieldStrategy> = BTreeMap::new();
        strategies.insert(ParamKind::Str, text_row);
        strategies.insert(ParamKind::Password, password_row);
        strategies.insert(ParamKind::Flag, select_row);
        Self { strategies }
    }

    pub fn map(&self, param: &Param) -> PromptField {
        let strategy = self
            .strategies
            .get(&param.param_kind())
            .or_else(|| self.strategies.get(&ParamKind::Str))
            .copied()
            .unwrap_or(text_row as FieldStrategy);
        strategy(param)
    }

    /// Fields for `command` in `context`: arguments first, then options.
    pub fn prompt_fields(&self, command: &Command, context: &str) -> Vec<PromptField> {
        command
            .params()
            .filter(|param| !param.is_excluded_from(context))
            .map(|param| self.map(param))
            .collect()
    }
}

impl Command {
    /// Prompt fields for this command using the standard mapper.
    pub fn prompt_fields(&self, context: &str) -> Vec<PromptField> {
        STANDARD_MAPPER.prompt_fields(self, context)
    }
}

fn text_row(param: &Param) -> PromptField {
    field(FieldWidget::TextRow, param)
}

fn password_row(param: &Param) -> PromptField {
    field(FieldWidget::PasswordRow, param)
}

fn select_row(param: &Param) -> PromptField {
    field(FieldWidget::SelectRow, param)
}

fn field(widget: FieldWidget, param: &Param) -> PromptField {
    let default = match param.default_provider() {
        Some(DefaultValue::Static(value)) => Some(value.clone()),
        Some(DefaultValue::From(_)) | None => None,
    };
    PromptField {
        widget,
        name: param.name().to_string(),
        label: param.display_label().to_string(),
        required: param.is_required(),
        default,
    }
}
