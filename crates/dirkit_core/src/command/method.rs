//! Finalized command bound to one directory object.

use crate::command::crud::CrudKind;
use crate::command::error::CommandDefinitionError;
use crate::command::output::{validate_output, CommandOutput, OutputDescriptor, OutputError};
use crate::model::is_valid_name;
use crate::model::object::DirObject;
use crate::model::param::Param;
use std::collections::BTreeSet;
use std::sync::Arc;

/// Per-command configuration supplied at registration.
#[derive(Debug, Clone, Default)]
pub struct CommandConfig {
    /// Base-layer options added next to the schema-derived block.
    pub takes_options: Vec<Param>,
    /// Splice `takes_options` before (`true`) or after (`false`) the derived
    /// block.
    pub extra_options_first: bool,
    /// Summary template; `{value}` and `{count}` are substituted.
    pub msg_summary: Option<String>,
    /// Result cap for `Search`; ignored by other kinds.
    pub size_limit: Option<usize>,
}

impl CommandConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_option(mut self, option: Param) -> Self {
        self.takes_options.push(option);
        self
    }

    pub fn extra_options_first(mut self, value: bool) -> Self {
        self.extra_options_first = value;
        self
    }

    pub fn summary(mut self, template: impl Into<String>) -> Self {
        self.msg_summary = Some(template.into());
        self
    }

    pub fn size_limit(mut self, limit: usize) -> Self {
        self.size_limit = Some(limit);
        self
    }
}

/// A command whose argument and option lists are frozen.
///
/// Instances are immutable and safe to share across threads.
#[derive(Debug, Clone)]
pub struct Command {
    name: String,
    kind: CrudKind,
    object: Arc<DirObject>,
    config: CommandConfig,
    args: Vec<Param>,
    options: Vec<Param>,
}

impl Command {
    /// Derives argument and option lists for `object`.
    ///
    /// # Errors
    /// - Command or base option names that are not lowercase identifiers.
    /// - Any name appearing twice across arguments and options.
    pub fn finalize(
        name: impl Into<String>,
        kind: CrudKind,
        object: Arc<DirObject>,
        config: CommandConfig,
    ) -> Result<Self, CommandDefinitionError> {
        let name = name.into();
        if !is_valid_name(&name) {
            return Err(CommandDefinitionError::InvalidName(name));
        }
        if let Some(option) = config
            .takes_options
            .iter()
            .find(|option| !is_valid_name(option.name()))
        {
            return Err(CommandDefinitionError::InvalidOptionName {
                command: name,
                option: option.name().to_string(),
            });
        }

        let args = kind.derive_args(&object);
        let derived = kind.derive_options(&object, &args);
        let extras = config.takes_options.iter().cloned();
        let options: Vec<Param> = if config.extra_options_first {
            extras.chain(derived).collect()
        } else {
            derived.into_iter().chain(extras).collect()
        };

        let mut seen = BTreeSet::new();
        for param in args.iter().chain(options.iter()) {
            if !seen.insert(param.name()) {
                return Err(CommandDefinitionError::DuplicateParam {
                    command: name,
                    param: param.name().to_string(),
                });
            }
        }

        Ok(Self {
            name,
            kind,
            object,
            config,
            args,
            options,
        })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn kind(&self) -> CrudKind {
        self.kind
    }

    pub fn object(&self) -> &DirObject {
        &self.object
    }

    pub fn config(&self) -> &CommandConfig {
        &self.config
    }

    pub fn args(&self) -> &[Param] {
        &self.args
    }

    pub fn options(&self) -> &[Param] {
        &self.options
    }

    pub fn arg(&self, name: &str) -> Option<&Param> {
        self.args.iter().find(|param| param.name() == name)
    }

    pub fn option(&self, name: &str) -> Option<&Param> {
        self.options.iter().find(|param| param.name() == name)
    }

    pub fn arg_names(&self) -> Vec<&str> {
        self.args.iter().map(Param::name).collect()
    }

    pub fn option_names(&self) -> Vec<&str> {
        self.options.iter().map(Param::name).collect()
    }

    /// Arguments followed by options.
    pub fn params(&self) -> impl Iterator<Item = &Param> {
        self.args.iter().chain(self.options.iter())
    }

    pub fn output_contract(&self) -> &'static [OutputDescriptor] {
        self.kind.output_contract()
    }

    /// Validates a result against this command's output contract.
    pub fn validate_output(&self, output: &CommandOutput) -> Result<(), OutputError> {
        validate_output(&self.name, self.output_contract(), output)
    }
}

#[cfg(test)]
mod tests {
    use super::{Command, CommandConfig};
    use crate::command::crud::CrudKind;
    use crate::command::error::CommandDefinitionError;
    use crate::model::object::DirObject;
    use crate::model::param::Param;
    use std::sync::Arc;

    fn user() -> Arc<DirObject> {
        Arc::new(
            DirObject::new(
                "user",
                vec![
                    Param::new("givenname"),
                    Param::new("sn"),
                    Param::new("uid").primary_key(),
                    Param::new("initials"),
                ],
            )
            .expect("valid user schema"),
        )
    }

    #[test]
    fn create_splices_extra_options_after_by_default() {
        let config = CommandConfig::new().with_option(Param::parse("extra?"));
        let cmd = Command::finalize("user_add", CrudKind::Create, user(), config)
            .expect("finalize create");
        assert_eq!(cmd.arg_names(), vec!["uid"]);
        assert_eq!(
            cmd.option_names(),
            vec!["givenname", "sn", "initials", "extra"]
        );
        assert!(!cmd.option("extra").expect("extra option").is_required());
        assert!(cmd.option("givenname").expect("givenname").is_required());
    }

    #[test]
    fn extra_options_first_moves_base_options_ahead() {
        let config = CommandConfig::new()
            .with_option(Param::flag("all?"))
            .extra_options_first(true);
        let cmd = Command::finalize("user_find", CrudKind::Search, user(), config)
            .expect("finalize search");
        assert_eq!(
            cmd.option_names(),
            vec!["all", "givenname", "sn", "uid", "initials"]
        );
    }

    #[test]
    fn retrieve_and_delete_keep_only_base_options() {
        for kind in [CrudKind::Retrieve, CrudKind::Delete] {
            let cmd = Command::finalize("user_verb", kind, user(), CommandConfig::new())
                .expect("finalize");
            assert!(cmd.options().is_empty());

            let config = CommandConfig::new().with_option(Param::flag("raw?"));
            let cmd = Command::finalize("user_verb", kind, user(), config).expect("finalize");
            assert_eq!(cmd.option_names(), vec!["raw"]);
        }
    }

    #[test]
    fn rejects_base_option_colliding_with_schema() {
        let config = CommandConfig::new().with_option(Param::parse("sn?"));
        let err = Command::finalize("user_add", CrudKind::Create, user(), config)
            .expect_err("collision must fail");
        assert_eq!(
            err,
            CommandDefinitionError::DuplicateParam {
                command: "user_add".to_string(),
                param: "sn".to_string(),
            }
        );
    }

    #[test]
    fn rejects_base_option_colliding_with_argument() {
        let config = CommandConfig::new().with_option(Param::parse("uid?"));
        let err = Command::finalize("user_show", CrudKind::Retrieve, user(), config)
            .expect_err("collision with pk argument must fail");
        assert!(matches!(err, CommandDefinitionError::DuplicateParam { .. }));
    }

    #[test]
    fn rejects_invalid_names() {
        let err = Command::finalize("user-add", CrudKind::Create, user(), CommandConfig::new())
            .expect_err("invalid command name");
        assert_eq!(
            err,
            CommandDefinitionError::InvalidName("user-add".to_string())
        );

        let config = CommandConfig::new().with_option(Param::new("Bad"));
        let err = Command::finalize("user_add", CrudKind::Create, user(), config)
            .expect_err("invalid option name");
        assert!(matches!(err, CommandDefinitionError::InvalidOptionName { .. }));
    }
}
