use async_trait::async_trait;
use serde::Serialize;

use crate::errors::ProviderResult;
use crate::types::{GenerationRequest, ThinkingResponse};

/// Common trait for all completion providers
#[async_trait]
pub trait CompletionProvider: Send + Sync {
    /// Generate a reply for the request
    async fn generate(&self, request: &GenerationRequest) -> ProviderResult<String>;

    /// Generate a reply together with the model's reasoning, when it has any
    async fn generate_with_thinking(
        &self,
        request: &GenerationRequest,
    ) -> ProviderResult<ThinkingResponse> {
        let response = self.generate(request).await?;
        Ok(ThinkingResponse {
            response,
            thinking: String::new(),
        })
    }

    /// Whether [`CompletionProvider::generate_with_thinking`] can return reasoning
    fn supports_thinking(&self) -> bool {
        false
    }

    /// Get the provider name (for logging/debugging)
    fn provider_name(&self) -> &'static str;

    /// Get the model name being used
    fn model_name(&self) -> String;

    fn status(&self) -> ProviderStatus;
}

/// Snapshot of how a provider is configured
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ProviderStatus {
    pub provider: &'static str,
    pub model: String,
    pub endpoint: String,
    pub has_api_key: bool,
}
