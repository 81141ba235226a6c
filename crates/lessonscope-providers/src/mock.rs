//! Mock provider for testing and offline runs.

use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::Mutex;

use async_trait::async_trait;

use lessonscope_core::traits::{
    GenerateRequest, GenerateResponse, LlmProvider, ModelInfo, TokenUsage,
};

pub const DEFAULT_MOCK_MODEL: &str = "models/mock-model";

/// A mock LLM provider that answers every prompt with the same text.
pub struct MockProvider {
    /// Response returned for every request.
    response: String,
    /// Model names reported by `list_models`.
    models: Vec<String>,
    /// Number of generate calls made.
    call_count: AtomicU32,
    /// Last request received.
    last_request: Mutex<Option<GenerateRequest>>,
}

impl MockProvider {
    /// Create a mock that lists the given models and always returns `response`.
    pub fn new(response: &str, models: Vec<String>) -> Self {
        Self {
            response: response.to_string(),
            models,
            call_count: AtomicU32::new(0),
            last_request: Mutex::new(None),
        }
    }

    /// Create a mock with a single model that always returns `response`.
    pub fn with_fixed_response(response: &str) -> Self {
        Self::new(response, vec![DEFAULT_MOCK_MODEL.to_string()])
    }

    /// Get the number of generate calls made to this provider.
    pub fn call_count(&self) -> u32 {
        self.call_count.load(Ordering::Relaxed)
    }

    /// Get the last request made to this provider.
    pub fn last_request(&self) -> Option<GenerateRequest> {
        self.last_request
            .lock()
            .map(|guard| guard.clone())
            .unwrap_or_default()
    }
}

#[async_trait]
impl LlmProvider for MockProvider {
    fn name(&self) -> &str {
        "mock"
    }

    async fn list_models(&self) -> anyhow::Result<Vec<ModelInfo>> {
        Ok(self
            .models
            .iter()
            .map(|name| ModelInfo {
                name: name.clone(),
                display_name: "Mock Model".into(),
                supported_methods: vec!["generateContent".into()],
                ..Default::default()
            })
            .collect())
    }

    async fn generate(&self, request: &GenerateRequest) -> anyhow::Result<GenerateResponse> {
        self.call_count.fetch_add(1, Ordering::Relaxed);
        if let Ok(mut last) = self.last_request.lock() {
            *last = Some(request.clone());
        }

        // Rough token estimate
        let prompt_tokens = (request.prompt.len() / 4) as u32;
        let completion_tokens = (self.response.len() / 4) as u32;

        Ok(GenerateResponse {
            content: self.response.clone(),
            model: request.model.clone(),
            token_usage: TokenUsage {
                prompt_tokens,
                completion_tokens,
                total_tokens: prompt_tokens + completion_tokens,
            },
            latency_ms: 1,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    use lessonscope_core::model::Field;
    use lessonscope_core::{Analyzer, AnalyzerConfig, Selection};

    #[tokio::test]
    async fn fixed_response() {
        let provider = MockProvider::with_fixed_response("Scaffolding:\n- worked examples");
        let request = GenerateRequest {
            model: DEFAULT_MOCK_MODEL.into(),
            prompt: "anything".into(),
            generation: Default::default(),
        };

        let response = provider.generate(&request).await.unwrap();
        assert_eq!(response.content, "Scaffolding:\n- worked examples");
        assert_eq!(provider.call_count(), 1);
        assert_eq!(provider.last_request().unwrap().prompt, "anything");
    }

    #[tokio::test]
    async fn drives_the_analyzer_end_to_end() {
        let provider = Arc::new(MockProvider::new(
            "Vocabulary Terms:\n- ratio\n- rate\nSequencing:\n1. ratios\n2. rates",
            vec!["models/gemini-1.0-pro".into(), "models/gemini-1.5-pro".into()],
        ));
        let analyzer = Analyzer::new(provider.clone(), AnalyzerConfig::default());

        let analysis = analyzer.analyze("DOK Low MC Item 1: ...", None).await.unwrap();

        assert_eq!(analysis.model, "models/gemini-1.5-pro");
        assert_eq!(analysis.selection, Some(Selection::Preferred));
        assert_eq!(analysis.record.get(Field::VocabularyTerms), "ratio\nrate");
        assert_eq!(analysis.record.get(Field::Sequencing), "1. ratios\n2. rates");
        assert_eq!(provider.call_count(), 1);
        assert!(provider
            .last_request()
            .unwrap()
            .prompt
            .starts_with("[INTERNAL INSTRUCTIONS APPENDED]"));
    }
}
