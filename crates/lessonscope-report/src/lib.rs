//! lessonscope-report: export formats for analyses.
//!
//! CSV is the primary export (one header row, one data row); HTML renders a
//! self-contained page for reading, and JSON is handled by
//! [`lessonscope_core::Analysis::save_json`].

pub mod csv;
pub mod html;

pub use csv::{record_to_csv, write_csv_report, DEFAULT_CSV_FILE};
pub use html::{generate_html, write_html_report};
