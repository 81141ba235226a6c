//! lessonscope-providers: LLM provider integrations.
//!
//! Implements the `LlmProvider` trait for the Google Gemini API and an
//! in-process mock, and loads the configuration that selects between them.

pub mod config;
pub mod error;
pub mod gemini;
pub mod mock;

pub use config::{create_provider, load_config, LessonscopeConfig, ProviderConfig};
pub use error::ProviderError;
pub use gemini::GeminiProvider;
pub use mock::MockProvider;
