//! The `lessonscope parse` command.

use std::path::PathBuf;

use anyhow::{Context, Result};

use lessonscope_core::Analysis;

use super::output::{parse_formats, print_record, report_diagnostics, write_exports};

const OFFLINE_MODEL: &str = "offline";

pub fn execute(response: PathBuf, output: PathBuf, format: String) -> Result<()> {
    let formats = parse_formats(&format)?;

    let text = std::fs::read_to_string(&response)
        .with_context(|| format!("failed to read response: {}", response.display()))?;
    let analysis = Analysis::from_response_text(OFFLINE_MODEL, text);

    print_record(&analysis);
    report_diagnostics(&analysis);
    write_exports(&analysis, &output, &formats)?;

    Ok(())
}
