//! Repository catalog presentation: filtering, marks, table and json.

use super::shared::to_pretty_json;
use crate::config::UiConfig;
use crate::error::DruiError;
use crate::registry::{image_mark, split_image_name, ImageMark};
use crate::theme::Theme;
use comfy_table::presets::UTF8_FULL;
use comfy_table::{ContentArrangement, Table};
use regex::Regex;
use serde::Serialize;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RepositoryRow {
    pub name: String,
    pub repository: Option<String>,
    pub application: String,
    pub mark: Option<ImageMark>,
}

/// Keep names under `repository/` (when given) that match `pattern` (when given).
pub fn filter_repositories(
    names: Vec<String>,
    repository: Option<&str>,
    pattern: Option<&str>,
) -> Result<Vec<String>, DruiError> {
    let regex = pattern
        .map(Regex::new)
        .transpose()
        .map_err(|e| DruiError::Input(format!("Invalid filter expression: {}", e)))?;
    let prefix = repository.map(|repository| format!("{}/", repository.trim_end_matches('/')));

    Ok(names
        .into_iter()
        .filter(|name| prefix.as_deref().map_or(true, |prefix| name.starts_with(prefix)))
        .filter(|name| regex.as_ref().map_or(true, |regex| regex.is_match(name)))
        .collect())
}

pub fn repository_rows(names: &[String], ui: &UiConfig) -> Vec<RepositoryRow> {
    names
        .iter()
        .map(|name| {
            let (repository, application) = split_image_name(name);
            RepositoryRow {
                name: name.clone(),
                repository: repository.map(str::to_string),
                application: application.to_string(),
                mark: image_mark(name, &ui.official_prefix, &ui.verified_prefix),
            }
        })
        .collect()
}

/// Table of the first `limit` rows followed by a count line.
pub fn format_repositories_text(rows: &[RepositoryRow], limit: usize, theme: Theme) -> String {
    if rows.is_empty() {
        return "No repositories found.".to_string();
    }

    let mut table = Table::new();
    table
        .load_preset(UTF8_FULL)
        .set_content_arrangement(ContentArrangement::Dynamic)
        .set_header(vec!["Repository", "Application", "Mark"]);
    for row in rows.iter().take(limit) {
        table.add_row(vec![
            row.repository.clone().unwrap_or_default(),
            theme.accent(&row.application),
            row.mark.map(|mark| mark.title().to_string()).unwrap_or_default(),
        ]);
    }

    let shown = rows.len().min(limit);
    let mut output = table.to_string();
    if shown < rows.len() {
        output.push_str(&format!(
            "\n{}",
            theme.muted(&format!(
                "Showing {} of {} repositories (use --limit or --filter to see more)",
                shown,
                rows.len()
            ))
        ));
    } else {
        output.push_str(&format!("\nTotal: {} repositories", rows.len()));
    }
    output
}

/// JSON list of repository names, as served to API clients.
pub fn format_repositories_json(rows: &[RepositoryRow], limit: usize) -> Result<String, DruiError> {
    let names: Vec<&str> = rows.iter().take(limit).map(|row| row.name.as_str()).collect();
    to_pretty_json(&names)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn names(list: &[&str]) -> Vec<String> {
        list.iter().map(|name| name.to_string()).collect()
    }

    #[test]
    fn test_filter_by_repository_prefix() {
        let filtered = filter_repositories(
            names(&["library/nginx", "librarian/tool", "alpine"]),
            Some("library"),
            None,
        )
        .unwrap();
        assert_eq!(filtered, vec!["library/nginx"]);
    }

    #[test]
    fn test_filter_by_pattern() {
        let filtered =
            filter_repositories(names(&["web/api", "web/ui", "db/pg"]), None, Some("^web/.*i$"))
                .unwrap();
        assert_eq!(filtered, vec!["web/api", "web/ui"]);
    }

    #[test]
    fn test_invalid_pattern_is_input_error() {
        let result = filter_repositories(names(&["a"]), None, Some("("));
        assert!(matches!(result, Err(DruiError::Input(_))));
    }

    #[test]
    fn test_rows_carry_marks() {
        let ui = UiConfig {
            official_prefix: vec!["library/".to_string()],
            ..UiConfig::default()
        };
        let rows = repository_rows(&names(&["library/nginx", "alpine"]), &ui);
        assert_eq!(rows[0].repository.as_deref(), Some("library"));
        assert_eq!(rows[0].application, "nginx");
        assert_eq!(rows[0].mark, Some(ImageMark::Official));
        assert_eq!(rows[1].repository, None);
        assert_eq!(rows[1].mark, None);
    }

    #[test]
    fn test_text_output_pages() {
        let rows = repository_rows(&names(&["a", "b", "c"]), &UiConfig::default());
        let text = format_repositories_text(&rows, 2, Theme::Light);
        assert!(text.contains("Showing 2 of 3 repositories"));

        let text = format_repositories_text(&rows, 10, Theme::Light);
        assert!(text.contains("Total: 3 repositories"));
        assert_eq!(format_repositories_text(&[], 10, Theme::Light), "No repositories found.");
    }

    #[test]
    fn test_json_output_is_name_list() {
        let rows = repository_rows(&names(&["a", "b", "c"]), &UiConfig::default());
        let out = format_repositories_json(&rows, 2).unwrap();
        let value: Vec<String> = serde_json::from_str(&out).unwrap();
        assert_eq!(value, vec!["a", "b"]);
    }
}
