//! CLI presentation: text and json formatters per command family.

mod delete;
mod image;
mod repositories;
mod shared;

pub use delete::{format_batch_report_json, format_batch_report_text};
pub use image::{
    default_tag, format_inspect_json, format_inspect_text, format_tags_json, format_tags_text,
    InspectView,
};
pub use repositories::{
    filter_repositories, format_repositories_json, format_repositories_text, repository_rows,
    RepositoryRow,
};
pub use shared::{format_broadcast_json, format_broadcast_text, to_pretty_json};
