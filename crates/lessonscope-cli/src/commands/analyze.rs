//! The `lessonscope analyze` command.

use std::io::Read;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::{Context, Result};

use lessonscope_core::traits::LlmProvider;
use lessonscope_core::{AnalysisError, Analyzer};
use lessonscope_providers::config::load_config_from;
use lessonscope_providers::create_provider;

use super::output::{parse_formats, print_record, report_diagnostics, write_exports};

pub async fn execute(
    input: Option<PathBuf>,
    model: Option<String>,
    output: Option<PathBuf>,
    format: String,
    show_raw: bool,
    config_path: Option<PathBuf>,
) -> Result<()> {
    let formats = parse_formats(&format)?;

    let user_input = read_input(input.as_deref())?;
    if user_input.trim().is_empty() {
        return Err(AnalysisError::EmptyInput.into());
    }

    let config = load_config_from(config_path.as_deref())?;
    let provider: Arc<dyn LlmProvider> = Arc::from(create_provider(&config.provider)?);
    let analyzer = Analyzer::new(provider, config.analyzer_config());

    let requested = model.or_else(|| config.default_model.clone());
    eprintln!("Generating analysis...");
    let analysis = analyzer.analyze(&user_input, requested.as_deref()).await?;

    match analysis.selection {
        Some(selection) => eprintln!("Using model: {} ({selection})", analysis.model),
        None => eprintln!("Using model: {}", analysis.model),
    }

    if show_raw {
        println!("{}\n", analysis.raw_output);
    }
    print_record(&analysis);
    report_diagnostics(&analysis);

    let output = output.unwrap_or_else(|| config.output_dir.clone());
    write_exports(&analysis, &output, &formats)?;

    Ok(())
}

/// Read assessment data from a file, or stdin when no file is given.
fn read_input(path: Option<&Path>) -> Result<String> {
    match path {
        Some(path) => std::fs::read_to_string(path)
            .with_context(|| format!("failed to read input: {}", path.display())),
        None => {
            let mut buf = String::new();
            std::io::stdin()
                .read_to_string(&mut buf)
                .context("failed to read assessment data from stdin")?;
            Ok(buf)
        }
    }
}
