//! Top-level fetch and report drivers

pub mod fetch;
pub mod report;

pub use fetch::{fetch, process_source, Source, StoreWriter};
pub use report::{generate_report, generate_report_at, ReportOptions};
