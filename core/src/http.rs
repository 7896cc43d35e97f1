use reqwest::header::HeaderMap;
use reqwest::Client;
use serde::Serialize;
use std::time::Duration;
use tracing::{debug, error, warn};

use crate::config::AssistantConfig;
use crate::errors::{ProviderError, ProviderResult};
use crate::types::ChatCompletionResponse;

/// Build the HTTP client shared by a provider with the configured timeouts
pub fn build_http_client(config: &AssistantConfig) -> ProviderResult<Client> {
    build_client_with_timeouts(config.request_timeout(), config.connect_timeout())
}

pub fn build_client_with_timeouts(request: Duration, connect: Duration) -> ProviderResult<Client> {
    Client::builder()
        .timeout(request)
        .connect_timeout(connect)
        .build()
        .map_err(|e| ProviderError::Network(format!("Failed to create HTTP client: {}", e)))
}

/// A chat completion call ready to be sent
pub struct CompletionCall<'a, B: Serialize> {
    pub provider: &'static str,
    pub url: &'a str,
    pub api_key: Option<&'a str>,
    pub headers: HeaderMap,
    pub body: &'a B,
}

/// POST a chat completion request and return the first choice's text.
///
/// Transport failures and non-success statuses are mapped onto
/// [`ProviderError`] so callers only ever see categorized failures.
pub async fn send_chat_completion<B: Serialize>(
    client: &Client,
    call: CompletionCall<'_, B>,
) -> ProviderResult<String> {
    let api_key = call.api_key.ok_or_else(|| {
        error!(provider = call.provider, "No API key configured");
        ProviderError::MissingApiKey
    })?;

    let response = client
        .post(call.url)
        .bearer_auth(api_key)
        .headers(call.headers)
        .json(call.body)
        .send()
        .await
        .map_err(|e| {
            warn!(provider = call.provider, error = %e, "Request failed before a response arrived");
            if e.is_timeout() {
                ProviderError::Network(format!("Request timed out: {}", e))
            } else {
                ProviderError::Network(format!("Failed to send request: {}", e))
            }
        })?;

    let status = response.status();
    let response_text = response
        .text()
        .await
        .map_err(|e| ProviderError::Network(format!("Failed to read response: {}", e)))?;

    if !status.is_success() {
        error!(
            provider = call.provider,
            status = status.as_u16(),
            body = %response_text,
            "Provider returned an error status"
        );
        return Err(ProviderError::from_status(status.as_u16(), &response_text));
    }

    let parsed: ChatCompletionResponse = serde_json::from_str(&response_text)?;

    if let Some(usage) = &parsed.usage {
        debug!(
            provider = call.provider,
            model = parsed.model.as_deref().unwrap_or("unknown"),
            prompt_tokens = usage.prompt_tokens,
            completion_tokens = usage.completion_tokens,
            total_tokens = usage.total_tokens,
            "Token usage"
        );
    }

    if let Some(reason) = parsed
        .choices
        .first()
        .and_then(|choice| choice.finish_reason.as_deref())
    {
        if reason != "stop" {
            warn!(provider = call.provider, finish_reason = reason, "Generation did not finish normally");
        }
    }

    parsed
        .first_content()
        .map(str::to_string)
        .ok_or(ProviderError::EmptyResponse)
}

/// Join a base URL and the chat completions path
pub fn completions_url(base_url: &str) -> String {
    format!("{}/chat/completions", base_url.trim_end_matches('/'))
}
