//! Analysis pipeline orchestrator.
//!
//! Builds the prompt, discovers models, picks one, calls the provider once,
//! and parses the response. No retries: a failed call is reported as is.

use std::sync::Arc;

use anyhow::{Context, Result};
use tracing::instrument;

use crate::error::AnalysisError;
use crate::parser::parse_with_diagnostics;
use crate::prompt::build_prompt;
use crate::report::Analysis;
use crate::selection::{resolve_model, short_model_name, DEFAULT_PREFERENCES};
use crate::traits::{GenerateRequest, GenerationConfig, LlmProvider};

/// Configuration for the analyzer.
#[derive(Debug, Clone)]
pub struct AnalyzerConfig {
    /// Preferred model name fragments, most preferred first.
    pub preferences: Vec<String>,
    /// Sampling parameters.
    pub generation: GenerationConfig,
}

impl Default for AnalyzerConfig {
    fn default() -> Self {
        Self {
            preferences: DEFAULT_PREFERENCES.iter().map(|p| p.to_string()).collect(),
            generation: GenerationConfig::default(),
        }
    }
}

/// Outcome of a connection check.
#[derive(Debug, Clone)]
pub struct ConnectionStatus {
    /// Full model names as listed by the provider.
    pub model_names: Vec<String>,
}

impl ConnectionStatus {
    pub fn model_count(&self) -> usize {
        self.model_names.len()
    }

    /// Model names without their resource path.
    pub fn short_names(&self) -> Vec<&str> {
        self.model_names.iter().map(|n| short_model_name(n)).collect()
    }

    /// Human-readable summary listing at most `limit` names of each kind.
    pub fn summary(&self, limit: usize) -> String {
        let full: Vec<&str> = self
            .model_names
            .iter()
            .take(limit)
            .map(String::as_str)
            .collect();
        let short: Vec<&str> = self.short_names().into_iter().take(limit).collect();
        format!(
            "Connection successful. Found {} models.\n\nFull model names: {}...\n\nShort names: {}...",
            self.model_count(),
            full.join(", "),
            short.join(", ")
        )
    }
}

/// Runs one assessment analysis against a provider.
pub struct Analyzer {
    provider: Arc<dyn LlmProvider>,
    config: AnalyzerConfig,
}

impl Analyzer {
    pub fn new(provider: Arc<dyn LlmProvider>, config: AnalyzerConfig) -> Self {
        Self { provider, config }
    }

    pub fn config(&self) -> &AnalyzerConfig {
        &self.config
    }

    /// List the provider's models as a connectivity test.
    pub async fn check_connection(&self) -> Result<ConnectionStatus> {
        let models = self
            .provider
            .list_models()
            .await
            .context("connected to API but couldn't list models")?;
        Ok(ConnectionStatus {
            model_names: models.into_iter().map(|m| m.name).collect(),
        })
    }

    /// Analyze assessment data.
    ///
    /// `requested_model` is honored when the provider lists it; otherwise the
    /// configured preferences decide.
    #[instrument(skip(self, user_input), fields(provider = self.provider.name()))]
    pub async fn analyze(
        &self,
        user_input: &str,
        requested_model: Option<&str>,
    ) -> Result<Analysis> {
        let prompt = build_prompt(user_input)?;

        let available: Vec<String> = self
            .provider
            .list_models()
            .await
            .context("failed to list available models")?
            .into_iter()
            .map(|m| m.name)
            .collect();

        let choice = resolve_model(&available, requested_model, &self.config.preferences)
            .ok_or(AnalysisError::NoModelsAvailable)?;
        tracing::info!(model = %choice.name, selection = %choice.selection, "using model");

        let request = GenerateRequest {
            model: choice.name.clone(),
            prompt,
            generation: self.config.generation.clone(),
        };
        let response = self
            .provider
            .generate(&request)
            .await
            .with_context(|| format!("error during text generation with {}", choice.name))?;

        let outcome = parse_with_diagnostics(&response.content);
        if outcome.record.is_empty() {
            tracing::warn!("model output contained none of the expected headings");
        }

        let mut analysis = Analysis::from_outcome(choice.name, response.content, outcome);
        analysis.selection = Some(choice.selection);
        analysis.token_usage = response.token_usage;
        analysis.latency_ms = response.latency_ms;
        Ok(analysis)
    }
}
