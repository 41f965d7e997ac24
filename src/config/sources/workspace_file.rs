//! Workspace-local config files: a shared base plus one overlay per environment

use config::builder::DefaultState;
use config::{ConfigBuilder, ConfigError, File, FileFormat};
use std::path::{Path, PathBuf};
use tracing::debug;

pub const ENVIRONMENT_VAR: &str = "DRUI_ENV";
pub const DEFAULT_ENVIRONMENT: &str = "development";

/// Environment whose overlay is loaded; an unset or blank `DRUI_ENV` means development.
pub fn active_environment() -> String {
    std::env::var(ENVIRONMENT_VAR)
        .ok()
        .map(|name| name.trim().to_string())
        .filter(|name| !name.is_empty())
        .unwrap_or_else(|| DEFAULT_ENVIRONMENT.to_string())
}

/// Candidate files under `<workspace>/config`, lowest precedence first.
pub fn candidate_paths(workspace_root: &Path, environment: &str) -> [PathBuf; 2] {
    let dir = workspace_root.join("config");
    [
        dir.join("config.toml"),
        dir.join(format!("{}.toml", environment)),
    ]
}

/// Layer whichever workspace files exist onto `builder`.
pub fn add_to_builder(
    builder: ConfigBuilder<DefaultState>,
    workspace_root: &Path,
) -> Result<ConfigBuilder<DefaultState>, ConfigError> {
    let environment = active_environment();
    let layered = candidate_paths(workspace_root, &environment)
        .into_iter()
        .filter(|path| path.is_file())
        .fold(builder, |builder, path| {
            debug!(config_path = %path.display(), environment = %environment, "Workspace config layer");
            builder.add_source(File::from(path).format(FileFormat::Toml))
        });
    Ok(layered)
}
