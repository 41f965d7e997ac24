//! Batch delete presentation.

use super::shared::to_pretty_json;
use crate::error::DruiError;
use crate::flow::BatchReport;
use serde_json::json;

pub fn format_batch_report_text(report: &BatchReport) -> String {
    let mut output = format!(
        "Deleted {} of {} tag(s) from {}",
        report.deleted.len(),
        report.total(),
        report.image
    );
    for tag in &report.deleted {
        output.push_str(&format!("\n  - {}", tag));
    }
    let failures = report.failure_lines();
    if !failures.is_empty() {
        output.push_str(&format!("\n\nFailed ({}):", failures.len()));
        for line in &failures {
            output.push_str(&format!("\n  - {}", line));
        }
    }
    output
}

pub fn format_batch_report_json(report: &BatchReport) -> Result<String, DruiError> {
    let failed: Vec<_> = report
        .failed
        .iter()
        .map(|completion| {
            json!({
                "tag": completion.item,
                "status": completion.response.status,
                "message": completion.response.body,
            })
        })
        .collect();
    to_pretty_json(&json!({
        "image": report.image,
        "deleted": report.deleted,
        "failed": failed,
    }))
}
