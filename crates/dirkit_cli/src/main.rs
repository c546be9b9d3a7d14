//! CLI smoke entry point.
//!
//! # Responsibility
//! - Exercise `dirkit_core` end to end against the in-memory backend.
//! - Keep output deterministic apart from generated `entryuuid` values.
//!
//! Usage: `dirkit_cli [config.json]`

use dirkit_core::{
    init_logging_from, CommandCall, CommandService, CoreConfig, DirObject, MemoryBackend, Param,
    Registry, WEBUI_CONTEXT,
};
use log::info;
use std::error::Error;
use std::sync::Arc;

fn main() -> Result<(), Box<dyn Error>> {
    let config = match std::env::args().nth(1) {
        Some(path) => CoreConfig::load(path)?,
        None => CoreConfig::default(),
    };
    init_logging_from(&config)?;
    println!("dirkit_core version={}", dirkit_core::core_version());

    let user = DirObject::new(
        "user",
        vec![
            Param::str("givenname").label("First name"),
            Param::str("sn").label("Last name"),
            Param::str("uid").primary_key().label("User login"),
            Param::str("initials?"),
            Param::password("userpassword?").exclude(WEBUI_CONTEXT),
        ],
    )?;
    let backend = MemoryBackend::new(&user);

    let mut registry = Registry::from_config(&config);
    registry.register_object(user)?;
    registry.register_crud("user")?;
    let service = CommandService::new(Arc::new(registry.finalize()?), backend);

    for command in service.api().commands_for("user") {
        println!(
            "{} args={:?} options={:?}",
            command.name(),
            command.arg_names(),
            command.option_names()
        );
    }
    let fields = service.prompt_fields("user_add", WEBUI_CONTEXT)?;
    println!("user_add webui fields={}", serde_json::to_string(&fields)?);

    let calls = [
        (
            "user_add",
            CommandCall::new()
                .arg("jdoe")
                .option("givenname", "John")
                .option("sn", "Doe"),
        ),
        ("user_mod", CommandCall::new().arg("jdoe").option("initials", "JD")),
        ("user_show", CommandCall::new().arg("jdoe")),
        ("user_find", CommandCall::new().arg("doe")),
        ("user_del", CommandCall::new().arg("jdoe")),
    ];
    for (name, call) in calls {
        let output = service.call(name, call)?;
        println!("{name} => {}", serde_json::to_string(&output)?);
    }

    info!("event=cli_smoke module=cli status=ok");
    Ok(())
}
