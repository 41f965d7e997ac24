//! Merge rules: defaults applied before any file or environment layer.

use config::Config;
use config::ConfigBuilder;
use config::ConfigError;

/// Create a Config builder with merge policy defaults applied.
pub fn builder_with_defaults() -> Result<ConfigBuilder<config::builder::DefaultState>, ConfigError>
{
    Config::builder()
        .set_default("registry.endpoint", "")?
        .set_default("registry.timeout_secs", 30)?
        .set_default("ui.images_per_page", 50)?
        .set_default("ui.delete_concurrency", 5)?
        .set_default("ui.disable_delete", false)
}
