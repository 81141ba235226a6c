//! The `lessonscope list-models` command.

use std::path::PathBuf;

use anyhow::Result;

use lessonscope_core::selection::{model_options, resolve_model};
use lessonscope_providers::config::load_config_from;
use lessonscope_providers::create_provider;

/// Fallback count when none of the preferred models is listed.
const OPTION_LIMIT: usize = 5;

pub async fn execute(config_path: Option<PathBuf>) -> Result<()> {
    let config = load_config_from(config_path.as_deref())?;
    let provider = create_provider(&config.provider)?;
    let models = provider.list_models().await?;

    if models.is_empty() {
        println!("No models available for this API key.");
        return Ok(());
    }

    println!("Provider: {}", provider.name());
    for model in &models {
        if model.display_name.is_empty() {
            println!("  {} ({})", model.short_name(), model.name);
        } else {
            println!(
                "  {} ({}) - {}",
                model.short_name(),
                model.name,
                model.display_name
            );
        }
    }

    let names: Vec<&str> = models.iter().map(|m| m.name.as_str()).collect();
    let options = model_options(&names, &config.model_preferences, OPTION_LIMIT);
    println!("\nModel options:");
    for option in &options {
        println!("  {option}");
    }

    if let Some(choice) = resolve_model(
        &names,
        config.default_model.as_deref(),
        &config.model_preferences,
    ) {
        println!("\nDefault choice: {} ({})", choice.name, choice.selection);
    }

    Ok(())
}
