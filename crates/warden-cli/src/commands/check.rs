//! Access check command.

use std::process::ExitCode;

use anyhow::{Context, Result, bail};
use chrono::{DateTime, Utc};
use serde_json::Value;
use warden::AccessEngine;
use warden::types::{Context as RequestContext, ResourceCategory};
use warden_config::WardenConfig;

use super::{StateArgs, find_user};

/// Exit code for a denied request.
const DENIED: u8 = 2;

pub struct CheckArgs {
    pub user: String,
    pub action: String,
    pub category: String,
    pub resource: Option<String>,
    pub context: Option<String>,
    pub at: Option<String>,
    pub json: bool,
}

pub fn run(config: &WardenConfig, state: &StateArgs, args: &CheckArgs) -> Result<ExitCode> {
    let category: ResourceCategory = args
        .category
        .parse()
        .with_context(|| format!("Unknown resource category '{}'", args.category))?;
    let context = args.context.as_deref().map(parse_context).transpose()?;
    let at = match &args.at {
        Some(raw) => parse_instant(raw)?,
        None => Utc::now(),
    };

    let snapshot = state.load(config)?;
    let principal = find_user(&snapshot, &args.user)?.clone();
    let engine = AccessEngine::new(snapshot, config.engine_config());

    let decision = engine.evaluate_access_at(
        &principal,
        &args.action,
        category,
        args.resource.as_deref(),
        context.as_ref(),
        at,
    );
    let allowed = decision.is_allowed();

    if args.json {
        println!("{}", serde_json::to_string_pretty(&decision)?);
    } else {
        let target = match &args.resource {
            Some(resource) => format!("{category}/{resource}"),
            None => category.to_string(),
        };
        match decision.reason() {
            None => println!("ALLOW {} {} on {target}", args.user, args.action),
            Some(reason) => println!("DENY {} {} on {target}: {reason}", args.user, args.action),
        }
    }

    Ok(if allowed {
        ExitCode::SUCCESS
    } else {
        ExitCode::from(DENIED)
    })
}

fn parse_context(raw: &str) -> Result<RequestContext> {
    match serde_json::from_str::<Value>(raw).context("Context is not valid JSON")? {
        Value::Object(map) => Ok(map),
        other => bail!("Context must be a JSON object, got {other}"),
    }
}

fn parse_instant(raw: &str) -> Result<DateTime<Utc>> {
    let instant = DateTime::parse_from_rfc3339(raw)
        .with_context(|| format!("Invalid --at instant '{raw}', expected RFC 3339"))?;
    Ok(instant.with_timezone(&Utc))
}
