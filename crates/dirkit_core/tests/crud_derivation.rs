use dirkit_core::{Command, CommandConfig, CrudKind, DirObject, Param, ParamOverrides};
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

fn finalize(kind: CrudKind, config: CommandConfig) -> Command {
    let name = format!("user_{}", kind.default_suffix());
    Command::finalize(name, kind, user(), config).expect("finalize command")
}

#[test]
fn create_takes_pk_argument_and_required_attribute_options() {
    let command = finalize(CrudKind::Create, CommandConfig::default());

    assert_eq!(command.arg_names(), vec!["uid"]);
    assert_eq!(command.option_names(), vec!["givenname", "sn", "initials"]);
    assert!(command.options().iter().all(|option| option.is_required()));
    assert!(command.params().all(|param| param.is_attribute()));
}

#[test]
fn update_options_are_optional_without_autofill() {
    let command = finalize(CrudKind::Update, CommandConfig::default());

    assert_eq!(command.arg_names(), vec!["uid"]);
    assert!(command.args()[0].is_required());
    assert_eq!(command.option_names(), vec!["givenname", "sn", "initials"]);
    for option in command.options() {
        assert!(!option.is_required(), "{} must be optional", option.name());
        assert!(!option.autofill(), "{} must not autofill", option.name());
    }
}

#[test]
fn pk_query_commands_take_only_the_primary_key() {
    for kind in [CrudKind::Retrieve, CrudKind::Update, CrudKind::Delete] {
        let command = finalize(kind, CommandConfig::default());
        assert_eq!(command.arg_names(), vec!["uid"]);
        let pk = command.arg("uid").expect("uid argument");
        assert!(pk.is_query());
        assert!(pk.is_primary_key());
    }
    assert!(finalize(CrudKind::Retrieve, CommandConfig::default())
        .options()
        .is_empty());
    assert!(finalize(CrudKind::Delete, CommandConfig::default())
        .options()
        .is_empty());
}

#[test]
fn search_takes_optional_criteria_and_query_options() {
    let command = finalize(CrudKind::Search, CommandConfig::default());

    assert_eq!(command.arg_names(), vec!["criteria"]);
    assert!(!command.args()[0].is_required());
    assert_eq!(
        command.option_names(),
        vec!["givenname", "sn", "uid", "initials"]
    );
    for option in command.options() {
        assert!(option.is_query());
        assert!(!option.is_required());
    }
}

#[test]
fn base_options_splice_after_schema_block_by_default() {
    let config = CommandConfig::new().with_option(Param::parse("extra?"));
    let command = finalize(CrudKind::Create, config);
    assert_eq!(
        command.option_names(),
        vec!["givenname", "sn", "initials", "extra"]
    );
    assert!(!command.option("extra").expect("extra option").is_required());

    let config = CommandConfig::new()
        .with_option(Param::parse("extra?"))
        .extra_options_first(true);
    let command = finalize(CrudKind::Update, config);
    assert_eq!(
        command.option_names(),
        vec!["extra", "givenname", "sn", "initials"]
    );
}

#[test]
fn derivation_never_mutates_schema_params() {
    let object = user();
    let _ = Command::finalize(
        "user_mod",
        CrudKind::Update,
        Arc::clone(&object),
        CommandConfig::default(),
    )
    .expect("finalize user_mod");

    let givenname = object.param("givenname").expect("givenname");
    assert!(givenname.is_required());
    assert!(givenname.autofill());
    assert!(!givenname.is_attribute());

    let clone = givenname.clone_with(ParamOverrides::new().required(false));
    assert!(!clone.is_required());
    assert!(givenname.is_required());
}
