//! Markdown table report

use crate::store::ReportEntry;

use super::{format_base_score, format_string};

/// Generate a Markdown table from report entries.
pub fn format_markdown(entries: &[ReportEntry]) -> String {
    let mut out = String::new();

    out.push_str("| Ecosystem | Package | Source | Published | Modified | Severity: Base Score | Severity: Vector String |\n");
    out.push_str("| --- | --- | --- | --- | --- | --- | --- |\n");

    for e in entries {
        out.push_str(&format!(
            "| {} | {} | {} | {} | {} | {} | {} |\n",
            escape_markdown(&e.ecosystem),
            escape_markdown(&e.package),
            escape_markdown(&e.id),
            escape_markdown(format_string(&e.published)),
            escape_markdown(format_string(&e.modified)),
            format_base_score(e.severity_base_score),
            escape_markdown(format_string(&e.severity_vector)),
        ));
    }

    out
}

/// Escape characters that would break table structure or be read as
/// Markdown syntax. Single pass so inserted backslashes are not
/// re-escaped.
fn escape_markdown(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for c in s.chars() {
        match c {
            '|' | '*' | '_' | '[' | ']' | '<' | '>' | '`' | '#' | '\\' => {
                out.push('\\');
                out.push(c);
            }
            _ => out.push(c),
        }
    }
    out
}
