//! CLI help and command-name contract for logging and routing.

use crate::cli::parse::{Commands, ThemeCommands};

/// Command name string for log records (e.g. "delete", "theme.toggle").
pub fn command_name(command: &Commands) -> String {
    match command {
        Commands::Repositories { .. } => "repositories".to_string(),
        Commands::Tags { .. } => "tags".to_string(),
        Commands::Inspect { .. } => "inspect".to_string(),
        Commands::Delete { .. } => "delete".to_string(),
        Commands::Login => "login".to_string(),
        Commands::Theme { command } => format!("theme.{}", theme_command_name(command.as_ref())),
        Commands::Broadcast { .. } => "broadcast".to_string(),
    }
}

pub fn theme_command_name(command: Option<&ThemeCommands>) -> &'static str {
    match command {
        None | Some(ThemeCommands::Show) => "show",
        Some(ThemeCommands::Toggle) => "toggle",
        Some(ThemeCommands::Set { .. }) => "set",
    }
}

/// Whether the command talks to the registry.
pub fn requires_registry(command: &Commands) -> bool {
    !matches!(command, Commands::Theme { .. } | Commands::Broadcast { .. })
}
