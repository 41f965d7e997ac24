//! Image presentation: tag lists and the manifest summary of one tag.

use super::shared::to_pretty_json;
use crate::error::DruiError;
use crate::format::{format_created, format_size, strip_scheme};
use crate::registry::{ImageMark, Manifest};
use crate::theme::Theme;
use comfy_table::presets::UTF8_FULL;
use comfy_table::{ContentArrangement, Table};
use serde_json::{json, Value};

/// `latest` when present, else the newest tag of a sorted list.
pub fn default_tag(tags: &[String]) -> Option<&str> {
    tags.iter()
        .find(|tag| tag.as_str() == "latest")
        .or_else(|| tags.last())
        .map(String::as_str)
}

pub fn format_tags_text(image: &str, tags: &[String], theme: Theme) -> String {
    if tags.is_empty() {
        return format!("No tags found for {}.", image);
    }
    let mut output = format!("Tags of {}:\n", theme.accent(image));
    for tag in tags {
        output.push_str(&format!("  {}\n", tag));
    }
    output.push_str(&format!("\nTotal: {} tag(s)", tags.len()));
    output
}

pub fn format_tags_json(image: &str, tags: &[String]) -> Result<String, DruiError> {
    to_pretty_json(&json!({ "name": image, "tags": tags }))
}

/// Everything the inspect command shows for one tag.
pub struct InspectView<'a> {
    pub image: &'a str,
    pub tag: &'a str,
    pub manifest: &'a Manifest,
    pub tags: &'a [String],
    pub pull_endpoint: &'a str,
    pub mark: Option<ImageMark>,
}

fn join_strings(value: &Value, separator: &str) -> Option<String> {
    match value {
        Value::Array(items) => Some(
            items
                .iter()
                .map(|item| item.as_str().map(str::to_string).unwrap_or_else(|| item.to_string()))
                .collect::<Vec<_>>()
                .join(separator),
        ),
        Value::String(text) => Some(text.clone()),
        _ => None,
    }
}

fn object_keys(value: &Value) -> Option<String> {
    value
        .as_object()
        .map(|object| object.keys().cloned().collect::<Vec<_>>().join(", "))
}

/// Summary rows in display order; missing fields are skipped.
fn summary_rows(manifest: &Manifest) -> Vec<(&'static str, String)> {
    let mut rows = Vec::new();
    let mut push = |label: &'static str, value: Option<String>| {
        if let Some(value) = value.filter(|value| !value.is_empty()) {
            rows.push((label, value));
        }
    };

    push("Size", manifest.size().map(format_size));
    push("OS", manifest.os().map(str::to_string));
    push("Architecture", manifest.architecture().map(str::to_string));
    push("Created", manifest.created().map(format_created));
    push("ID", manifest.id().map(str::to_string));
    push("Digest", manifest.digest().map(str::to_string));
    push("Cmd", manifest.config_field("Cmd").and_then(|v| join_strings(v, " ")));
    push("Labels", manifest.config_field("Labels").map(Value::to_string));
    push("Volumes", manifest.config_field("Volumes").and_then(object_keys));
    push(
        "Entrypoint",
        manifest.config_field("Entrypoint").and_then(|v| join_strings(v, " ")),
    );
    push("Env", manifest.config_field("Env").and_then(|v| join_strings(v, "\n")));
    push(
        "Exposed ports",
        manifest.config_field("ExposedPorts").and_then(object_keys),
    );
    push(
        "Working dir",
        manifest.config_field("WorkingDir").and_then(|v| join_strings(v, " ")),
    );
    push("Docker version", manifest.docker_version().map(str::to_string));
    rows
}

pub fn format_inspect_text(view: &InspectView<'_>, theme: Theme) -> String {
    let mut output = format!("{}:{}", theme.accent(view.image), view.tag);
    if let Some(mark) = view.mark {
        output.push_str(&format!("  [{}]", mark.title()));
    }
    output.push('\n');

    let mut summary = Table::new();
    summary
        .load_preset(UTF8_FULL)
        .set_content_arrangement(ContentArrangement::Dynamic);
    for (label, value) in summary_rows(view.manifest) {
        summary.add_row(vec![label.to_string(), value]);
    }
    output.push_str(&summary.to_string());

    let platforms = view.manifest.platforms();
    if !platforms.is_empty() {
        let mut table = Table::new();
        table
            .load_preset(UTF8_FULL)
            .set_content_arrangement(ContentArrangement::Dynamic)
            .set_header(vec!["Platform", "Digest"]);
        for platform in &platforms {
            table.add_row(vec![
                platform.label(),
                theme.muted(platform.digest.as_deref().unwrap_or("")),
            ]);
        }
        output.push_str("\n\nPlatforms:\n");
        output.push_str(&table.to_string());
    }

    let history = view.manifest.history();
    if !history.is_empty() {
        output.push_str("\n\nHistory:\n");
        for (index, step) in history.iter().enumerate() {
            output.push_str(&format!("  {:>3}  {}\n", index + 1, step));
        }
        output.pop();
    }

    if !view.tags.is_empty() {
        let newest_first: Vec<&str> = view.tags.iter().rev().map(String::as_str).collect();
        output.push_str(&format!("\n\nTags: {}", newest_first.join(", ")));
    }

    output.push_str(&format!(
        "\n\n{}",
        theme.muted(&format!(
            "docker pull {}/{}:{}",
            strip_scheme(view.pull_endpoint),
            view.image,
            view.tag
        ))
    ));
    output
}

/// Tags plus the merged manifest document.
pub fn format_inspect_json(view: &InspectView<'_>) -> Result<String, DruiError> {
    to_pretty_json(&json!({
        "name": view.image,
        "tag": view.tag,
        "tags": view.tags,
        "mark": view.mark,
        "manifest": view.manifest.as_value(),
    }))
}
