//! Config loading entry point.

use super::merge::merge_policy;
use super::sources::{environment, global_file, workspace_file};
use super::DruiConfig;
use crate::error::DruiError;
use config::File;
use std::path::{Path, PathBuf};
use tracing::debug;

/// Loads [`DruiConfig`] from the layered sources.
pub struct ConfigLoader;

impl ConfigLoader {
    /// Defaults, then the user-level file, then `config/config.toml` and
    /// `config/{DRUI_ENV}.toml` under `workspace_root`, then `DRUI_*` variables.
    pub fn load(workspace_root: &Path) -> Result<DruiConfig, DruiError> {
        let builder = merge_policy::builder_with_defaults()?;
        let builder = global_file::add_to_builder(builder)?;
        let builder = workspace_file::add_to_builder(builder, workspace_root)?;
        let builder = environment::add_to_builder(builder);

        let config: DruiConfig = builder.build()?.try_deserialize()?;
        debug!(
            workspace_root = %workspace_root.display(),
            endpoint = %config.registry.endpoint,
            "Configuration loaded"
        );
        Ok(config)
    }

    /// Defaults, then `path` (required), then `DRUI_*` variables.
    pub fn load_from_file(path: &Path) -> Result<DruiConfig, DruiError> {
        if !path.exists() {
            return Err(DruiError::Config(format!(
                "Configuration file not found: {}",
                path.display()
            )));
        }
        let builder = merge_policy::builder_with_defaults()?
            .add_source(File::from(path.to_path_buf()).required(true));
        let builder = environment::add_to_builder(builder);

        let config: DruiConfig = builder.build()?.try_deserialize()?;
        debug!(path = %path.display(), "Configuration loaded from file");
        Ok(config)
    }

    /// Path of the user-level config file, whether or not it exists.
    pub fn global_config_path() -> Option<PathBuf> {
        global_file::global_config_path()
    }
}
