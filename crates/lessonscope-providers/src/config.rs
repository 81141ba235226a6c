//! Configuration loading and provider factory.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use lessonscope_core::error::AnalysisError;
use lessonscope_core::selection::DEFAULT_PREFERENCES;
use lessonscope_core::traits::{GenerationConfig, LlmProvider};
use lessonscope_core::AnalyzerConfig;

use crate::gemini::{GeminiProvider, DEFAULT_TIMEOUT_SECS};
use crate::mock::{MockProvider, DEFAULT_MOCK_MODEL};

/// Environment variable holding the Gemini API key.
pub const API_KEY_ENV: &str = "GEMINI_API_KEY";
/// Environment variable overriding the Gemini endpoint.
pub const BASE_URL_ENV: &str = "LESSONSCOPE_GEMINI_BASE_URL";
/// Config file looked up in the current directory.
pub const LOCAL_CONFIG_FILE: &str = "lessonscope.toml";

/// Configuration for the LLM provider.
///
/// Note: Custom Debug impl masks API keys to prevent accidental exposure in logs.
#[derive(Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum ProviderConfig {
    Gemini {
        #[serde(default)]
        api_key: String,
        #[serde(default)]
        base_url: Option<String>,
        #[serde(default = "default_timeout_secs")]
        timeout_secs: u64,
    },
    /// Canned responses, no network.
    Mock {
        #[serde(default)]
        response: String,
        #[serde(default = "default_mock_models")]
        models: Vec<String>,
    },
}

impl std::fmt::Debug for ProviderConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ProviderConfig::Gemini {
                api_key: _,
                base_url,
                timeout_secs,
            } => f
                .debug_struct("Gemini")
                .field("api_key", &"***")
                .field("base_url", base_url)
                .field("timeout_secs", timeout_secs)
                .finish(),
            ProviderConfig::Mock { response, models } => f
                .debug_struct("Mock")
                .field("response_len", &response.len())
                .field("models", models)
                .finish(),
        }
    }
}

impl Default for ProviderConfig {
    fn default() -> Self {
        ProviderConfig::Gemini {
            api_key: String::new(),
            base_url: None,
            timeout_secs: default_timeout_secs(),
        }
    }
}

fn default_timeout_secs() -> u64 {
    DEFAULT_TIMEOUT_SECS
}

fn default_mock_models() -> Vec<String> {
    vec![DEFAULT_MOCK_MODEL.to_string()]
}

/// Top-level lessonscope configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LessonscopeConfig {
    /// The provider to analyze with.
    #[serde(default)]
    pub provider: ProviderConfig,
    /// Model to request when none is given on the command line.
    #[serde(default)]
    pub default_model: Option<String>,
    /// Preferred model name fragments, most preferred first.
    #[serde(default = "default_preferences")]
    pub model_preferences: Vec<String>,
    /// Sampling parameters.
    #[serde(default)]
    pub generation: GenerationConfig,
    /// Directory for exported files.
    #[serde(default = "default_output_dir")]
    pub output_dir: PathBuf,
}

fn default_preferences() -> Vec<String> {
    DEFAULT_PREFERENCES.iter().map(|p| p.to_string()).collect()
}

fn default_output_dir() -> PathBuf {
    PathBuf::from(".")
}

impl Default for LessonscopeConfig {
    fn default() -> Self {
        Self {
            provider: ProviderConfig::default(),
            default_model: None,
            model_preferences: default_preferences(),
            generation: GenerationConfig::default(),
            output_dir: default_output_dir(),
        }
    }
}

impl LessonscopeConfig {
    /// Analyzer settings derived from this configuration.
    pub fn analyzer_config(&self) -> AnalyzerConfig {
        AnalyzerConfig {
            preferences: self.model_preferences.clone(),
            generation: self.generation.clone(),
        }
    }
}

/// Resolve environment variable references like `${VAR_NAME}` in a string.
///
/// Substituted values are copied verbatim and never scanned again.
fn resolve_env_vars(s: &str) -> String {
    let mut result = String::with_capacity(s.len());
    let mut rest = s;
    while let Some(start) = rest.find("${") {
        let Some(len) = rest[start + 2..].find('}') else {
            break;
        };
        let var_name = &rest[start + 2..start + 2 + len];
        result.push_str(&rest[..start]);
        result.push_str(&std::env::var(var_name).unwrap_or_default());
        rest = &rest[start + 2 + len + 1..];
    }
    result.push_str(rest);
    result
}

fn resolve_provider_config(config: &ProviderConfig) -> ProviderConfig {
    match config {
        ProviderConfig::Gemini {
            api_key,
            base_url,
            timeout_secs,
        } => ProviderConfig::Gemini {
            api_key: resolve_env_vars(api_key),
            base_url: base_url.as_ref().map(|u| resolve_env_vars(u)),
            timeout_secs: *timeout_secs,
        },
        ProviderConfig::Mock { .. } => config.clone(),
    }
}

/// Load configuration from well-known paths.
///
/// Search order:
/// 1. `lessonscope.toml` in the current directory
/// 2. `~/.config/lessonscope/config.toml`
///
/// Environment variable overrides: `GEMINI_API_KEY`, `LESSONSCOPE_GEMINI_BASE_URL`.
pub fn load_config() -> Result<LessonscopeConfig> {
    load_config_from(None)
}

/// Load config from an explicit path, or search the default locations.
pub fn load_config_from(path: Option<&Path>) -> Result<LessonscopeConfig> {
    let config_path = if let Some(p) = path {
        if p.exists() {
            Some(p.to_path_buf())
        } else {
            anyhow::bail!("config file not found: {}", p.display());
        }
    } else {
        let local = PathBuf::from(LOCAL_CONFIG_FILE);
        if local.exists() {
            Some(local)
        } else {
            dirs_path()
                .map(|home| home.join("config.toml"))
                .filter(|global| global.exists())
        }
    };

    let config = match config_path {
        Some(path) => {
            tracing::debug!(path = %path.display(), "loading config");
            let content = std::fs::read_to_string(&path)
                .with_context(|| format!("failed to read config: {}", path.display()))?;
            parse_config_str(&content)
                .with_context(|| format!("failed to parse config: {}", path.display()))?
        }
        None => LessonscopeConfig::default(),
    };

    Ok(apply_env_overrides(config))
}

/// Parse a TOML config string (no environment overrides applied).
pub fn parse_config_str(content: &str) -> Result<LessonscopeConfig> {
    let config: LessonscopeConfig = toml::from_str(content)?;
    Ok(config)
}

fn apply_env_overrides(mut config: LessonscopeConfig) -> LessonscopeConfig {
    config.provider = resolve_provider_config(&config.provider);

    if let ProviderConfig::Gemini {
        api_key, base_url, ..
    } = &mut config.provider
    {
        if let Ok(key) = std::env::var(API_KEY_ENV) {
            if !key.trim().is_empty() {
                *api_key = key;
            }
        }
        if let Ok(url) = std::env::var(BASE_URL_ENV) {
            if !url.trim().is_empty() {
                *base_url = Some(url);
            }
        }
    }

    config
}

fn dirs_path() -> Option<PathBuf> {
    std::env::var("HOME")
        .ok()
        .map(|h| PathBuf::from(h).join(".config").join("lessonscope"))
}

/// Create a provider instance from its configuration.
pub fn create_provider(config: &ProviderConfig) -> Result<Box<dyn LlmProvider>> {
    match config {
        ProviderConfig::Gemini {
            api_key,
            base_url,
            timeout_secs,
        } => {
            if api_key.trim().is_empty() {
                return Err(
                    AnalysisError::MissingApiKey("Gemini".into(), API_KEY_ENV.into()).into(),
                );
            }
            Ok(Box::new(GeminiProvider::new(
                api_key,
                base_url.clone(),
                *timeout_secs,
            )?))
        }
        ProviderConfig::Mock { response, models } => {
            Ok(Box::new(MockProvider::new(response, models.clone())))
        }
    }
}
