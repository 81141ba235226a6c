//! The LLM provider seam.
//!
//! Implemented by `lessonscope-providers`; the analyzer only talks to this
//! trait, so tests can swap in an in-process provider.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

/// Trait for text-generation backends.
#[async_trait]
pub trait LlmProvider: Send + Sync {
    /// Human-readable provider name (e.g. "gemini").
    fn name(&self) -> &str;

    /// List the models this provider can currently reach.
    async fn list_models(&self) -> anyhow::Result<Vec<ModelInfo>>;

    /// Generate text for a prompt.
    async fn generate(&self, request: &GenerateRequest) -> anyhow::Result<GenerateResponse>;
}

/// Sampling parameters for a generation request.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GenerationConfig {
    #[serde(default = "default_temperature")]
    pub temperature: f64,
    #[serde(default = "default_top_p")]
    pub top_p: f64,
    #[serde(default = "default_top_k")]
    pub top_k: u32,
    #[serde(default = "default_max_output_tokens")]
    pub max_output_tokens: u32,
}

fn default_temperature() -> f64 {
    0.7
}
fn default_top_p() -> f64 {
    0.95
}
fn default_top_k() -> u32 {
    64
}
fn default_max_output_tokens() -> u32 {
    8192
}

impl Default for GenerationConfig {
    fn default() -> Self {
        Self {
            temperature: default_temperature(),
            top_p: default_top_p(),
            top_k: default_top_k(),
            max_output_tokens: default_max_output_tokens(),
        }
    }
}

/// Request to generate text from an LLM.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GenerateRequest {
    /// Model name as listed by the provider (e.g. "models/gemini-1.5-flash").
    pub model: String,
    /// The full prompt, instructions included.
    pub prompt: String,
    #[serde(default)]
    pub generation: GenerationConfig,
}

/// Response from a generation request.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GenerateResponse {
    /// The raw response text.
    pub content: String,
    /// Model that produced the response.
    pub model: String,
    /// Token usage, when the provider reports it.
    #[serde(default)]
    pub token_usage: TokenUsage,
    /// Latency in milliseconds.
    pub latency_ms: u64,
}

/// Token accounting for one request.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenUsage {
    pub prompt_tokens: u32,
    pub completion_tokens: u32,
    pub total_tokens: u32,
}

/// Information about an available model.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ModelInfo {
    /// Resource name (e.g. "models/gemini-1.5-flash").
    pub name: String,
    /// Human-readable model name.
    #[serde(default)]
    pub display_name: String,
    #[serde(default)]
    pub description: String,
    /// Generation methods the model supports (e.g. "generateContent").
    #[serde(default)]
    pub supported_methods: Vec<String>,
    #[serde(default)]
    pub input_token_limit: u32,
    #[serde(default)]
    pub output_token_limit: u32,
}

impl ModelInfo {
    /// Model name without the resource path.
    pub fn short_name(&self) -> &str {
        crate::selection::short_model_name(&self.name)
    }
}
