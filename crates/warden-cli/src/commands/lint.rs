//! Policy lint command.

use std::process::ExitCode;

use anyhow::Result;
use warden::abac::{Severity, lint_policies};
use warden_config::WardenConfig;

use super::StateArgs;

pub fn run(config: &WardenConfig, state: &StateArgs, json: bool) -> Result<ExitCode> {
    let snapshot = state.load(config)?;
    let findings = lint_policies(snapshot.all_policies());

    if json {
        println!("{}", serde_json::to_string_pretty(&findings)?);
    } else if findings.is_empty() {
        println!("{} policies checked, no findings.", snapshot.all_policies().len());
    } else {
        for finding in &findings {
            println!("{finding}");
        }
    }

    let has_errors = findings.iter().any(|f| f.severity == Severity::Error);
    Ok(if has_errors {
        ExitCode::FAILURE
    } else {
        ExitCode::SUCCESS
    })
}
