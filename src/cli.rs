//! CLI domain: parse, route, help, output, and presentation only.
//! No registry orchestration; single route table dispatches to domain services.

mod help;
mod output;
mod parse;
mod presentation;
mod route;
mod surface;

pub use help::command_name;
pub use output::map_error;
pub use parse::{Cli, Commands, ThemeCommands};
pub use presentation::{
    default_tag, filter_repositories, format_batch_report_json, format_batch_report_text,
    format_broadcast_json, format_broadcast_text, format_inspect_json, format_inspect_text,
    format_repositories_json, format_repositories_text, format_tags_json, format_tags_text,
    repository_rows, InspectView, RepositoryRow,
};
pub use route::{RunContext, BROADCAST_NOT_FOUND, DELETE_CANCELLED};
pub use surface::TerminalSurface;
