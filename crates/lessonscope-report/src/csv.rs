//! Single-row CSV export.
//!
//! Header row is the nine field keys in record order. Quoting follows
//! RFC 4180: a value is wrapped in `"` when it contains a comma, quote, or
//! line break, with embedded quotes doubled. Rows end in `\r\n`.

use std::path::Path;

use anyhow::{Context, Result};

use lessonscope_core::model::{Field, ParsedRecord};

/// File name used when no explicit CSV path is given.
pub const DEFAULT_CSV_FILE: &str = "assessment_analysis.csv";

const LINE_END: &str = "\r\n";

fn needs_quoting(value: &str) -> bool {
    value.contains([',', '"', '\r', '\n'])
}

fn push_cell(out: &mut String, value: &str) {
    if needs_quoting(value) {
        out.push('"');
        out.push_str(&value.replace('"', "\"\""));
        out.push('"');
    } else {
        out.push_str(value);
    }
}

fn push_row<'a>(out: &mut String, cells: impl Iterator<Item = &'a str>) {
    for (i, cell) in cells.enumerate() {
        if i > 0 {
            out.push(',');
        }
        push_cell(out, cell);
    }
    out.push_str(LINE_END);
}

/// Render a record as CSV: a header row followed by one data row.
pub fn record_to_csv(record: &ParsedRecord) -> String {
    let mut out = String::new();
    push_row(&mut out, Field::ALL.iter().map(|f| f.key()));
    push_row(&mut out, record.iter().map(|(_, value)| value));
    out
}

/// Write a record as a UTF-8 CSV file, creating parent directories.
pub fn write_csv_report(record: &ParsedRecord, path: &Path) -> Result<()> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    std::fs::write(path, record_to_csv(record))
        .with_context(|| format!("failed to write CSV to {}", path.display()))?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn header_row_lists_fields_in_order() {
        let csv = record_to_csv(&ParsedRecord::default());
        let header = csv.split("\r\n").next().unwrap();
        assert_eq!(
            header,
            "QA_Knowledge-and-skills,QA_Key-Vocabulary,QA_Common-misconceptions,\
             VA_Vocabulary-Terms,VA_Definitions,VA_Special-Attention,\
             IR_Teaching-Approaches,IR_Scaffolding,IR_Sequencing"
        );
    }

    #[test]
    fn empty_record_has_eight_separators() {
        let csv = record_to_csv(&ParsedRecord::default());
        assert!(csv.ends_with("\r\n,,,,,,,,\r\n"));
    }

    #[test]
    fn multiline_and_comma_values_are_quoted() {
        let record = ParsedRecord::from_pairs([
            (Field::KeyVocabulary, "apple\nbanana"),
            (Field::Definitions, "ratio, a comparison"),
            (Field::Scaffolding, "plain"),
        ]);
        let csv = record_to_csv(&record);
        let row = csv.split_once("\r\n").unwrap().1;
        assert_eq!(
            row,
            ",\"apple\nbanana\",,,\"ratio, a comparison\",,,plain,\r\n"
        );
    }

    #[test]
    fn embedded_quotes_are_doubled() {
        let record = ParsedRecord::from_pairs([(Field::Sequencing, r#"the "big idea" first"#)]);
        let csv = record_to_csv(&record);
        assert!(csv.ends_with("\"the \"\"big idea\"\" first\"\r\n"));
    }

    #[test]
    fn writes_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("out").join(DEFAULT_CSV_FILE);
        let record = ParsedRecord::from_pairs([(Field::Definitions, "x")]);

        write_csv_report(&record, &path).unwrap();
        let content = std::fs::read_to_string(&path).unwrap();
        assert_eq!(content, record_to_csv(&record));
    }
}
