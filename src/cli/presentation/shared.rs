//! Shared presentation: json helper and the broadcast message.

use crate::error::DruiError;
use crate::theme::Theme;
use serde::Serialize;
use serde_json::json;

pub fn to_pretty_json<T: Serialize + ?Sized>(value: &T) -> Result<String, DruiError> {
    serde_json::to_string_pretty(value)
        .map_err(|e| DruiError::Config(format!("Failed to serialize output: {}", e)))
}

/// First line is the title, the rest is the message body.
fn split_broadcast(content: &str) -> (&str, &str) {
    let content = content.trim();
    match content.split_once('\n') {
        Some((title, body)) => (title.trim(), body.trim()),
        None => (content, ""),
    }
}

pub fn format_broadcast_text(content: &str, theme: Theme) -> String {
    let (title, body) = split_broadcast(content);
    if title.is_empty() {
        return "No broadcast message.".to_string();
    }
    if body.is_empty() {
        theme.accent(title)
    } else {
        format!("{}\n\n{}", theme.accent(title), body)
    }
}

pub fn format_broadcast_json(content: &str) -> Result<String, DruiError> {
    let (title, body) = split_broadcast(content);
    to_pretty_json(&json!({ "title": title, "message": body }))
}
