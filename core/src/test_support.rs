use async_trait::async_trait;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;
use std::time::Duration;

use crate::errors::{ProviderError, ProviderResult};
use crate::provider::{CompletionProvider, ProviderStatus};
use crate::types::{GenerationRequest, ThinkingResponse};

/// Scripted provider that always answers the same way and records calls
pub struct MockProvider {
    name: &'static str,
    outcome: ProviderResult<String>,
    thinking: Option<String>,
    delay: Option<Duration>,
    calls: AtomicUsize,
    requests: Mutex<Vec<GenerationRequest>>,
}

impl MockProvider {
    pub fn replying(name: &'static str, text: &str) -> Self {
        Self::with_outcome(name, Ok(text.to_string()))
    }

    pub fn failing(name: &'static str, error: ProviderError) -> Self {
        Self::with_outcome(name, Err(error))
    }

    fn with_outcome(name: &'static str, outcome: ProviderResult<String>) -> Self {
        Self {
            name,
            outcome,
            thinking: None,
            delay: None,
            calls: AtomicUsize::new(0),
            requests: Mutex::new(Vec::new()),
        }
    }

    /// Turn on reasoning support with a fixed reasoning text
    pub fn thinking(mut self, thinking: &str) -> Self {
        self.thinking = Some(thinking.to_string());
        self
    }

    pub fn delayed(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    pub fn requests(&self) -> Vec<GenerationRequest> {
        self.requests.lock().unwrap().clone()
    }

    async fn respond(&self, request: &GenerationRequest) -> ProviderResult<String> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.requests.lock().unwrap().push(request.clone());
        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }
        self.outcome.clone()
    }
}

#[async_trait]
impl CompletionProvider for MockProvider {
    async fn generate(&self, request: &GenerationRequest) -> ProviderResult<String> {
        self.respond(request).await
    }

    async fn generate_with_thinking(
        &self,
        request: &GenerationRequest,
    ) -> ProviderResult<ThinkingResponse> {
        let response = self.respond(request).await?;
        Ok(ThinkingResponse {
            response,
            thinking: self.thinking.clone().unwrap_or_default(),
        })
    }

    fn supports_thinking(&self) -> bool {
        self.thinking.is_some()
    }

    fn provider_name(&self) -> &'static str {
        self.name
    }

    fn model_name(&self) -> String {
        format!("{}-model", self.name)
    }

    fn status(&self) -> ProviderStatus {
        ProviderStatus {
            provider: self.name,
            model: self.model_name(),
            endpoint: format!("mock://{}", self.name),
            has_api_key: true,
        }
    }
}
