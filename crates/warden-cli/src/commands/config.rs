//! Configuration commands.

use anyhow::{Result, bail};
use warden_config::WardenConfig;

/// Show the effective configuration.
pub fn show(config: &WardenConfig, format: &str) -> Result<()> {
    match format {
        "json" => println!("{}", serde_json::to_string_pretty(config)?),
        "toml" => println!("{}", toml::to_string_pretty(config)?),
        "text" => {
            println!("Warden Configuration");
            println!("====================\n");

            println!("Engine:");
            println!("  System admin permission: {}", config.engine.system_admin_permission);
            println!(
                "  Business hours (UTC): {:02}:00-{:02}:00",
                config.engine.business_hours_start, config.engine.business_hours_end
            );
            println!();

            println!("Environment:");
            if config.environment.is_empty() {
                println!("  (none)");
            }
            for (key, value) in &config.environment {
                println!("  {key} = {value}");
            }
            println!();

            println!("Logging:");
            println!("  Level: {}", config.logging.level);
            println!();

            println!("State:");
            println!(
                "  Snapshot: {}",
                config
                    .state
                    .snapshot
                    .as_ref()
                    .map_or("(not set)".to_string(), |p| p.display().to_string())
            );
        }
        other => bail!("Unknown format '{other}'. Use text, json or toml."),
    }

    Ok(())
}
