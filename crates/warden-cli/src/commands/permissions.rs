//! Effective permissions command.

use std::process::ExitCode;

use anyhow::Result;
use warden::AccessEngine;
use warden_config::WardenConfig;

use super::{StateArgs, find_user};

pub fn run(config: &WardenConfig, state: &StateArgs, user: &str, json: bool) -> Result<ExitCode> {
    let snapshot = state.load(config)?;
    let principal = find_user(&snapshot, user)?.clone();
    let engine = AccessEngine::new(snapshot, config.engine_config());

    let permissions = engine.effective_permissions(&principal);
    let admin = permissions.contains(&engine.config().system_admin_permission);

    if json {
        let list: Vec<&str> = permissions.iter().collect();
        println!("{}", serde_json::to_string_pretty(&list)?);
    } else {
        println!("Effective permissions for {user} ({}):", principal.status);
        if permissions.is_empty() {
            println!("  (none)");
        }
        for permission in permissions.iter() {
            println!("  {permission}");
        }
        if admin {
            println!();
            println!("{user} holds the system admin permission and bypasses all checks.");
        }
    }

    Ok(ExitCode::SUCCESS)
}
