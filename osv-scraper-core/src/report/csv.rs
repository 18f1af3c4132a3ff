//! CSV report with formula-injection escaping

use crate::store::ReportEntry;

use super::{format_base_score, format_string};

/// Generate CSV output (RFC 4180 quoting) from report entries.
pub fn format_csv(entries: &[ReportEntry]) -> String {
    let mut out = String::new();

    write_record(
        &mut out,
        [
            "ecosystem",
            "package",
            "source",
            "published",
            "modified",
            "severity_base_score",
            "severity_vector",
        ],
    );

    for e in entries {
        write_record(
            &mut out,
            [
                escape_formula_injection(&e.ecosystem),
                escape_formula_injection(&e.package),
                escape_formula_injection(&e.id),
                escape_formula_injection(format_string(&e.published)),
                escape_formula_injection(format_string(&e.modified)),
                escape_formula_injection(&format_base_score(e.severity_base_score)),
                escape_formula_injection(format_string(&e.severity_vector)),
            ],
        );
    }

    out
}

fn write_record<S: AsRef<str>>(out: &mut String, fields: impl IntoIterator<Item = S>) {
    let mut first = true;
    for field in fields {
        if !first {
            out.push(',');
        }
        first = false;
        out.push_str(&quote_field(field.as_ref()));
    }
    out.push('\n');
}

/// Quote a field per RFC 4180 when it contains a delimiter, quote, or
/// line break; embedded quotes are doubled.
fn quote_field(field: &str) -> String {
    if field.contains(',') || field.contains('"') || field.contains('\n') || field.contains('\r') {
        format!("\"{}\"", field.replace('"', "\"\""))
    } else {
        field.to_string()
    }
}

/// Prevent spreadsheet formula injection: a field whose first
/// non-whitespace rune is one of `= + - @` gets a leading single quote.
/// Leading whitespace includes space, tab, CR, and LF.
fn escape_formula_injection(s: &str) -> String {
    let trimmed = s.trim_start_matches([' ', '\t', '\r', '\n']);
    match trimmed.chars().next() {
        Some('=' | '+' | '-' | '@') => format!("'{s}"),
        _ => s.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn entry(package: &str) -> ReportEntry {
        ReportEntry {
            id: "GHSA-a".to_string(),
            ecosystem: "npm".to_string(),
            package: package.to_string(),
            published: String::new(),
            modified: "2025-10-04T12:00:00Z".to_string(),
            severity_base_score: Some(7.5),
            severity_vector: String::new(),
        }
    }

    #[test]
    fn test_header_and_row() {
        let output = format_csv(&[entry("left-pad")]);
        let lines: Vec<&str> = output.lines().collect();
        assert_eq!(
            lines[0],
            "ecosystem,package,source,published,modified,severity_base_score,severity_vector"
        );
        assert_eq!(lines[1], "npm,left-pad,GHSA-a,NA,2025-10-04T12:00:00Z,7.5,NA");
    }

    #[test]
    fn test_formula_injection_prefixes() {
        for dangerous in ["=cmd()", "+1+1", "-2", "@SUM(A1)"] {
            let output = format_csv(&[entry(dangerous)]);
            let row = output.lines().nth(1).unwrap();
            assert!(
                row.contains(&format!("'{dangerous}")),
                "expected quote prefix for {dangerous}: {row}"
            );
        }
    }

    #[test]
    fn test_formula_injection_checks_after_leading_whitespace() {
        for field in [" =cmd()", "\t=cmd()", "\r=cmd()", "\n=cmd()"] {
            let output = format_csv(&[entry(field)]);
            // The original field is preserved behind the quote prefix;
            // CR/LF containing fields additionally get RFC 4180 quoting.
            assert!(output.contains("'"), "expected prefix for {field:?}");
        }
    }

    #[test]
    fn test_safe_fields_untouched() {
        let output = format_csv(&[entry("lodash")]);
        let row = output.lines().nth(1).unwrap();
        assert!(!row.contains('\''));
    }

    #[test]
    fn test_rfc4180_quoting() {
        let output = format_csv(&[entry("a,b")]);
        assert!(output.contains("\"a,b\""));

        let output = format_csv(&[entry("say \"hi\"")]);
        assert!(output.contains("\"say \"\"hi\"\"\""));
    }

    #[test]
    fn test_negative_score_would_be_prefixed() {
        // A "-" leading field goes through the same guard as any other.
        let escaped = escape_formula_injection("-1.0");
        assert_eq!(escaped, "'-1.0");
    }

    #[test]
    fn test_whitespace_only_field_untouched() {
        assert_eq!(escape_formula_injection("   "), "   ");
        assert_eq!(escape_formula_injection(""), "");
    }
}
