//! CLI command implementations.

pub mod check;
pub mod config;
pub mod lint;
pub mod permissions;
pub mod version;

use std::path::PathBuf;

use anyhow::{Context, Result, bail};
use clap::Args;
use tracing::debug;
use warden::Snapshot;
use warden::types::{Principal, UserId};
use warden_config::WardenConfig;

/// Where to read the state snapshot from.
#[derive(Args)]
pub struct StateArgs {
    /// JSON state snapshot. Defaults to `state.snapshot` from warden.toml.
    #[arg(short, long)]
    pub state: Option<PathBuf>,
}

impl StateArgs {
    /// Loads the snapshot named on the command line or in configuration.
    pub fn load(&self, config: &WardenConfig) -> Result<Snapshot> {
        let Some(path) = self.state.as_ref().or(config.state.snapshot.as_ref()) else {
            bail!("No state snapshot given. Pass --state or set [state] snapshot in warden.toml.");
        };

        let snapshot = Snapshot::from_json_file(path)
            .with_context(|| format!("Failed to load state from {}", path.display()))?;
        debug!(path = %path.display(), "Loaded state snapshot");
        Ok(snapshot)
    }
}

/// Looks up a user in the snapshot.
pub fn find_user<'a>(snapshot: &'a Snapshot, user: &str) -> Result<&'a Principal> {
    snapshot
        .user(&UserId::from(user))
        .with_context(|| format!("User '{user}' not found in state snapshot"))
}
