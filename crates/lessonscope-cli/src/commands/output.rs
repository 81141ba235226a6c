//! Shared display and export for `analyze` and `parse`.

use std::path::{Path, PathBuf};

use anyhow::Result;
use comfy_table::{Cell, ContentArrangement, Table};

use lessonscope_core::Analysis;
use lessonscope_report::csv::{write_csv_report, DEFAULT_CSV_FILE};
use lessonscope_report::html::write_html_report;

const JSON_FILE: &str = "assessment_analysis.json";
const HTML_FILE: &str = "assessment_analysis.html";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExportFormat {
    Csv,
    Json,
    Html,
}

/// Parse a `--format` value such as `csv`, `csv,json`, or `all`.
pub fn parse_formats(format: &str) -> Result<Vec<ExportFormat>> {
    if format.trim() == "all" {
        return Ok(vec![ExportFormat::Csv, ExportFormat::Json, ExportFormat::Html]);
    }

    let mut formats = Vec::new();
    for name in format.split(',').map(str::trim).filter(|s| !s.is_empty()) {
        let fmt = match name {
            "csv" => ExportFormat::Csv,
            "json" => ExportFormat::Json,
            "html" => ExportFormat::Html,
            other => anyhow::bail!("unknown format '{other}' (expected csv, json, html, or all)"),
        };
        if !formats.contains(&fmt) {
            formats.push(fmt);
        }
    }
    anyhow::ensure!(!formats.is_empty(), "at least one output format is required");
    Ok(formats)
}

/// Print the parsed record as a two-column table on stdout.
pub fn print_record(analysis: &Analysis) {
    let mut table = Table::new();
    table.set_content_arrangement(ContentArrangement::Dynamic);
    table.set_header(vec!["Field", "Content"]);

    for (field, value) in analysis.record.iter() {
        table.add_row(vec![Cell::new(field.key()), Cell::new(value)]);
    }

    println!("{table}");
}

/// Warn on stderr about anything the parser could not place.
pub fn report_diagnostics(analysis: &Analysis) {
    if analysis.record.is_empty() {
        eprintln!(
            "Warning: no expected headings found in the model output; every field is empty."
        );
    }
    if !analysis.unrecognized_headers.is_empty() {
        eprintln!(
            "Warning: ignored {} unrecognized heading(s): {}",
            analysis.unrecognized_headers.len(),
            analysis.unrecognized_headers.join(", ")
        );
    }
    if analysis.discarded_lines > 0 {
        eprintln!(
            "Warning: {} line(s) appeared outside any recognized heading and were dropped.",
            analysis.discarded_lines
        );
    }
}

/// Write the requested exports into `output`, returning the written paths.
pub fn write_exports(
    analysis: &Analysis,
    output: &Path,
    formats: &[ExportFormat],
) -> Result<Vec<PathBuf>> {
    tracing::debug!(output = %output.display(), ?formats, "writing exports");
    std::fs::create_dir_all(output)?;

    let mut written = Vec::new();
    for fmt in formats {
        match fmt {
            ExportFormat::Csv => {
                let path = output.join(DEFAULT_CSV_FILE);
                write_csv_report(&analysis.record, &path)?;
                eprintln!("CSV saved to: {}", path.display());
                written.push(path);
            }
            ExportFormat::Json => {
                let path = output.join(JSON_FILE);
                analysis.save_json(&path)?;
                eprintln!("Results saved to: {}", path.display());
                written.push(path);
            }
            ExportFormat::Html => {
                let path = output.join(HTML_FILE);
                write_html_report(analysis, &path)?;
                eprintln!("HTML report: {}", path.display());
                written.push(path);
            }
        }
    }
    Ok(written)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn all_expands_to_every_format() {
        assert_eq!(
            parse_formats("all").unwrap(),
            vec![ExportFormat::Csv, ExportFormat::Json, ExportFormat::Html]
        );
    }

    #[test]
    fn comma_list_is_deduplicated() {
        assert_eq!(
            parse_formats("json, csv,json").unwrap(),
            vec![ExportFormat::Json, ExportFormat::Csv]
        );
    }

    #[test]
    fn unknown_format_is_rejected() {
        let err = parse_formats("sarif").unwrap_err();
        assert!(err.to_string().contains("unknown format 'sarif'"));
        assert!(parse_formats(" , ").is_err());
    }

    #[test]
    fn exports_land_in_output_dir() {
        let dir = tempfile::tempdir().unwrap();
        let analysis =
            Analysis::from_response_text("offline", "Scaffolding:\n- sentence frames".to_string());

        let written = write_exports(&analysis, dir.path(), &parse_formats("all").unwrap()).unwrap();

        assert_eq!(written.len(), 3);
        assert!(written.iter().all(|p| p.exists()));
        let loaded = Analysis::load_json(&dir.path().join(JSON_FILE)).unwrap();
        assert_eq!(loaded.record, analysis.record);
    }
}
