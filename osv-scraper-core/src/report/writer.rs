//! Report file output

use std::io::Write;
use std::path::Path;

use crate::store::ReportEntry;
use crate::Result;

use super::{csv, jsonl, markdown, ReportFormat};

/// Render entries in the given format and write them to `path` with
/// owner-only permissions.
pub fn write_report(path: &Path, format: ReportFormat, entries: &[ReportEntry]) -> Result<()> {
    let content = match format {
        ReportFormat::Markdown => markdown::format_markdown(entries),
        ReportFormat::Csv => csv::format_csv(entries),
        ReportFormat::Jsonl => jsonl::format_jsonl(entries)?,
    };

    let mut options = std::fs::OpenOptions::new();
    options.write(true).create(true).truncate(true);
    #[cfg(unix)]
    {
        use std::os::unix::fs::OpenOptionsExt;
        options.mode(0o600);
    }

    let mut file = options.open(path)?;
    file.write_all(content.as_bytes())?;
    Ok(())
}
