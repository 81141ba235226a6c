//! The `lessonscope check` command.

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::Result;

use lessonscope_core::engine::ConnectionStatus;
use lessonscope_core::traits::LlmProvider;
use lessonscope_core::Analyzer;
use lessonscope_providers::config::{load_config_from, API_KEY_ENV};
use lessonscope_providers::create_provider;

/// Model names shown per list in the summary.
const SUMMARY_LIMIT: usize = 5;

pub async fn execute(config_path: Option<PathBuf>) -> Result<()> {
    match connect(config_path).await {
        Ok(status) => {
            println!("{}", status.summary(SUMMARY_LIMIT));
            Ok(())
        }
        Err(e) => {
            eprintln!("Connection test failed.\n");
            eprintln!("Troubleshooting tips:");
            eprintln!("  1. Set {API_KEY_ENV}=your_key, or api_key in lessonscope.toml");
            eprintln!("  2. Run `lessonscope init` to create a starter config");
            eprintln!("  3. Verify your API key is active in Google AI Studio");
            eprintln!("  4. Run with RUST_LOG=lessonscope=debug for request details\n");
            Err(e.context("connection check failed"))
        }
    }
}

async fn connect(config_path: Option<PathBuf>) -> Result<ConnectionStatus> {
    let config = load_config_from(config_path.as_deref())?;
    let provider: Arc<dyn LlmProvider> = Arc::from(create_provider(&config.provider)?);
    Analyzer::new(provider, config.analyzer_config())
        .check_connection()
        .await
}
