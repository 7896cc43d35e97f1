use std::borrow::Cow;
use std::sync::Arc;
use std::time::Duration;
use tracing::{error, info, warn};

use crate::config::{AssistantConfig, DEFAULT_WEBSITE_URL};
use crate::errors::{
    AssistantError, AssistantResult, ErrorCategory, ProviderError, ProviderFailure, ProviderResult,
};
use crate::groq::GroqCompoundClient;
use crate::openrouter::OpenRouterClient;
use crate::provider::{CompletionProvider, ProviderStatus};
use crate::types::{ChatMessage, GenerationRequest, ThinkingResponse};

const CONNECTION_TEST_MESSAGE: &str = "Hello, this is a test message.";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Mode {
    Plain,
    Thinking,
}

/// Single entry point that hides failover across an ordered provider list.
///
/// Every call tries the providers in order, exactly once each, and returns
/// the first success. Later providers receive the user message rewritten to
/// point the model at the school website.
pub struct FallbackOrchestrator {
    providers: Vec<Arc<dyn CompletionProvider>>,
    website_url: String,
    call_timeout: Duration,
}

impl FallbackOrchestrator {
    pub fn new(providers: Vec<Arc<dyn CompletionProvider>>) -> AssistantResult<Self> {
        if providers.is_empty() {
            return Err(AssistantError::NoProviders);
        }

        Ok(Self {
            providers,
            website_url: DEFAULT_WEBSITE_URL.to_string(),
            call_timeout: Duration::from_secs(30),
        })
    }

    /// OpenRouter first, Groq Compound as the fallback
    pub fn from_config(config: &AssistantConfig) -> AssistantResult<Self> {
        let openrouter = OpenRouterClient::from_config(config).map_err(|e| {
            AssistantError::ConfigError(format!("Failed to build OpenRouter client: {}", e))
        })?;
        let groq = GroqCompoundClient::from_config(config).map_err(|e| {
            AssistantError::ConfigError(format!("Failed to build Groq client: {}", e))
        })?;

        let providers: Vec<Arc<dyn CompletionProvider>> = vec![
            Arc::new(openrouter) as Arc<dyn CompletionProvider>,
            Arc::new(groq) as Arc<dyn CompletionProvider>,
        ];
        let orchestrator = Self::new(providers)?
            .with_website_url(config.website_url())
            .with_call_timeout(config.request_timeout());

        info!(
            primary = orchestrator.providers[0].provider_name(),
            fallbacks = orchestrator.providers.len() - 1,
            "Fallback orchestrator initialized"
        );
        Ok(orchestrator)
    }

    pub fn with_website_url(mut self, website_url: impl Into<String>) -> Self {
        self.website_url = website_url.into();
        self
    }

    /// Deadline for each individual provider attempt
    pub fn with_call_timeout(mut self, call_timeout: Duration) -> Self {
        self.call_timeout = call_timeout;
        self
    }

    pub async fn generate(&self, request: &GenerationRequest) -> AssistantResult<String> {
        self.run(request, Mode::Plain)
            .await
            .map(|reply| reply.response)
    }

    pub async fn generate_with_thinking(
        &self,
        request: &GenerationRequest,
    ) -> AssistantResult<ThinkingResponse> {
        self.run(request, Mode::Thinking).await
    }

    pub async fn generate_response(
        &self,
        user_message: &str,
        context: Option<&str>,
        history: &[ChatMessage],
        sources: &[String],
    ) -> AssistantResult<String> {
        let request = build_request(user_message, context, history, sources);
        self.generate(&request).await
    }

    pub async fn generate_response_with_thinking(
        &self,
        user_message: &str,
        context: Option<&str>,
        history: &[ChatMessage],
        sources: &[String],
    ) -> AssistantResult<ThinkingResponse> {
        let request = build_request(user_message, context, history, sources);
        self.generate_with_thinking(&request).await
    }

    pub fn provider_statuses(&self) -> Vec<ProviderStatus> {
        self.providers.iter().map(|p| p.status()).collect()
    }

    /// Sends a short test message through the chain
    pub async fn test_connection(&self) -> bool {
        match self
            .generate(&GenerationRequest::new(CONNECTION_TEST_MESSAGE))
            .await
        {
            Ok(reply) => {
                info!(preview = %preview(&reply), "Connection test succeeded");
                true
            }
            Err(e) => {
                error!(error = %e, "Connection test failed");
                false
            }
        }
    }

    async fn run(&self, request: &GenerationRequest, mode: Mode) -> AssistantResult<ThinkingResponse> {
        if request.user_message.trim().is_empty() {
            return Err(AssistantError::EmptyMessage);
        }

        let mut failures = Vec::with_capacity(self.providers.len());

        for (index, provider) in self.providers.iter().enumerate() {
            let attempt_request = if index == 0 {
                Cow::Borrowed(request)
            } else {
                Cow::Owned(self.fallback_request(request))
            };

            match self
                .attempt(provider.as_ref(), &attempt_request, mode, index > 0)
                .await
            {
                Ok(reply) => {
                    if index > 0 {
                        info!(
                            provider = provider.provider_name(),
                            attempt = index + 1,
                            "Fallback provider answered"
                        );
                    }
                    return Ok(reply);
                }
                Err(error) => {
                    warn!(
                        provider = provider.provider_name(),
                        model = %provider.model_name(),
                        category = %error.category(),
                        error = %error,
                        "Provider failed"
                    );
                    failures.push(ProviderFailure {
                        provider: provider.provider_name(),
                        error,
                    });
                }
            }
        }

        let category = final_category(&failures);
        error!(category = %category, attempts = failures.len(), "All providers failed");
        Err(AssistantError::Exhausted { category, failures })
    }

    async fn attempt(
        &self,
        provider: &dyn CompletionProvider,
        request: &GenerationRequest,
        mode: Mode,
        is_fallback: bool,
    ) -> ProviderResult<ThinkingResponse> {
        let call = async {
            match mode {
                Mode::Thinking if provider.supports_thinking() => {
                    provider.generate_with_thinking(request).await
                }
                _ => {
                    let response = provider.generate(request).await?;
                    let thinking = if mode == Mode::Thinking && is_fallback {
                        self.website_thinking()
                    } else {
                        String::new()
                    };
                    Ok(ThinkingResponse { response, thinking })
                }
            }
        };

        // Dropping the future on expiry cancels the in-flight request
        tokio::time::timeout(self.call_timeout, call)
            .await
            .map_err(|_| ProviderError::Timeout(self.call_timeout))?
    }

    fn fallback_request(&self, request: &GenerationRequest) -> GenerationRequest {
        request.with_user_message(format!(
            "{}\n\nPlease visit {} to find the most current and accurate information \
             about St. Louis Demonstration JHS before answering.",
            request.user_message, self.website_url
        ))
    }

    fn website_thinking(&self) -> String {
        format!(
            "The primary assistant was unavailable, so I searched the web and visited the \
             school website ({}) to gather current information for this answer.",
            self.website_url
        )
    }
}

/// Category reported once every provider has failed.
///
/// The primary's category wins; an unrecognized primary failure is shown
/// as high traffic.
fn final_category(failures: &[ProviderFailure]) -> ErrorCategory {
    failures
        .first()
        .map(|failure| failure.error.category())
        .filter(|category| !category.is_generic())
        .unwrap_or(ErrorCategory::HighTraffic)
}

fn build_request(
    user_message: &str,
    context: Option<&str>,
    history: &[ChatMessage],
    sources: &[String],
) -> GenerationRequest {
    GenerationRequest::new(user_message)
        .with_context(context.unwrap_or_default())
        .with_history(history.to_vec())
        .with_sources(sources.to_vec())
}

fn preview(text: &str) -> String {
    text.chars().take(50).collect()
}
