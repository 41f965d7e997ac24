//! CLI output: error mapping from domain errors to stable CLI surface.

use crate::error::{DruiError, RegistryError};

/// Map domain/service errors to a string for CLI output.
pub fn map_error(e: &DruiError) -> String {
    match e {
        DruiError::Registry(RegistryError::Unauthorized(_)) => format!(
            "{}\nSet registry.username and registry.password (or DRUI_REGISTRY__USERNAME / DRUI_REGISTRY__PASSWORD).",
            e
        ),
        DruiError::Registry(RegistryError::Connection(_)) => {
            format!("{}\nCheck registry.endpoint and that the registry is reachable.", e)
        }
        _ => e.to_string(),
    }
}
