//! Analysis results with JSON persistence.

use std::path::Path;

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::model::ParsedRecord;
use crate::parser::ParseOutcome;
use crate::selection::Selection;
use crate::traits::TokenUsage;

/// One complete analysis run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Analysis {
    /// Unique run identifier.
    pub id: Uuid,
    /// When the analysis was created.
    pub created_at: DateTime<Utc>,
    /// Model that produced the output.
    pub model: String,
    /// How the model was chosen. `None` for offline parses.
    #[serde(default)]
    pub selection: Option<Selection>,
    /// Full model output, unmodified.
    pub raw_output: String,
    /// Fields extracted from the output.
    pub record: ParsedRecord,
    /// Header-like lines the parser did not recognize.
    #[serde(default)]
    pub unrecognized_headers: Vec<String>,
    /// Body lines dropped for lack of an active heading.
    #[serde(default)]
    pub discarded_lines: usize,
    #[serde(default)]
    pub token_usage: TokenUsage,
    /// Generation latency in milliseconds.
    #[serde(default)]
    pub latency_ms: u64,
}

impl Analysis {
    /// Build an analysis from an already parsed response.
    pub fn from_outcome(model: impl Into<String>, raw_output: String, outcome: ParseOutcome) -> Self {
        Self {
            id: Uuid::new_v4(),
            created_at: Utc::now(),
            model: model.into(),
            selection: None,
            raw_output,
            record: outcome.record,
            unrecognized_headers: outcome.unrecognized_headers,
            discarded_lines: outcome.discarded_lines,
            token_usage: TokenUsage::default(),
            latency_ms: 0,
        }
    }

    /// Parse a saved model response without calling any provider.
    pub fn from_response_text(model: impl Into<String>, raw_output: String) -> Self {
        let outcome = crate::parser::parse_with_diagnostics(&raw_output);
        Self::from_outcome(model, raw_output, outcome)
    }

    /// Save the analysis as JSON to a file.
    pub fn save_json(&self, path: &Path) -> Result<()> {
        let json = serde_json::to_string_pretty(self).context("failed to serialize analysis")?;
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        std::fs::write(path, json)
            .with_context(|| format!("failed to write analysis to {}", path.display()))?;
        Ok(())
    }

    /// Load an analysis from a JSON file.
    pub fn load_json(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read analysis from {}", path.display()))?;
        let analysis: Analysis =
            serde_json::from_str(&content).context("failed to parse analysis JSON")?;
        Ok(analysis)
    }
}
