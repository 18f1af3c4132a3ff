//! Report formatting and output

pub mod csv;
pub mod jsonl;
pub mod markdown;
pub mod writer;

use crate::{Error, Result};

pub use writer::write_report;

/// Supported report output formats
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReportFormat {
    Markdown,
    Csv,
    Jsonl,
}

impl ReportFormat {
    pub fn parse(s: &str) -> Result<Self> {
        match s {
            "markdown" => Ok(Self::Markdown),
            "csv" => Ok(Self::Csv),
            "jsonl" => Ok(Self::Jsonl),
            other => Err(Error::Report(format!(
                "unknown report format: {other} (supported: markdown, csv, jsonl)"
            ))),
        }
    }
}

impl std::str::FromStr for ReportFormat {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        Self::parse(s)
    }
}

/// Render an optional text field, with "NA" for absent values.
pub(crate) fn format_string(val: &str) -> &str {
    if val.is_empty() {
        "NA"
    } else {
        val
    }
}

/// Render a base score with one decimal place, or "NA" when absent.
pub(crate) fn format_base_score(val: Option<f64>) -> String {
    match val {
        Some(score) => format!("{score:.1}"),
        None => "NA".to_string(),
    }
}
