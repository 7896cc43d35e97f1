use async_trait::async_trait;
use reqwest::header::{HeaderMap, HeaderValue, REFERER};
use reqwest::Client;
use serde::Serialize;
use tracing::{debug, warn};

use crate::config::{AssistantConfig, ProviderConfig, DEFAULT_WEBSITE_URL};
use crate::errors::{ProviderError, ProviderResult};
use crate::http::{self, CompletionCall};
use crate::prompt::{self, Persona};
use crate::provider::{CompletionProvider, ProviderStatus};
use crate::types::{GenerationRequest, ThinkingResponse, WireMessage};

pub const OPENROUTER_BASE_URL: &str = "https://openrouter.ai/api/v1";
pub const DEFAULT_OPENROUTER_MODEL: &str = "deepseek/deepseek-chat-v3-0324:free";
const APP_TITLE: &str = "St. Louis Demo JHS";
const REQUEST_USER: &str = "stlouisdemojhs-user";

#[derive(Serialize)]
struct OpenRouterRequest<'a> {
    model: &'a str,
    messages: Vec<WireMessage<'a>>,
    temperature: f32,
    max_tokens: u32,
    top_p: f32,
    frequency_penalty: f32,
    presence_penalty: f32,
    user: &'static str,
}

/// OpenRouter chat completion client, the preferred provider
#[derive(Debug, Clone)]
pub struct OpenRouterClient {
    api_key: Option<String>,
    model_name: String,
    endpoint: String,
    referer: String,
    temperature: f32,
    max_tokens: u32,
    http_client: Client,
}

impl OpenRouterClient {
    /// Create a new OpenRouter client.
    ///
    /// A missing API key is accepted here; calls fail with
    /// `API_KEY_INVALID` until one is configured.
    pub fn new(config: &ProviderConfig, http_client: Client) -> Self {
        let base_url = config.base_url.as_deref().unwrap_or(OPENROUTER_BASE_URL);
        Self {
            api_key: config.api_key().map(str::to_string),
            model_name: config
                .model_name
                .clone()
                .unwrap_or_else(|| DEFAULT_OPENROUTER_MODEL.to_string()),
            endpoint: http::completions_url(base_url),
            referer: DEFAULT_WEBSITE_URL.to_string(),
            temperature: config.temperature.unwrap_or(0.7),
            max_tokens: config.max_tokens.unwrap_or(2048),
            http_client,
        }
    }

    pub fn from_config(config: &AssistantConfig) -> ProviderResult<Self> {
        let http_client = http::build_http_client(config)?;
        Ok(Self::new(&config.openrouter, http_client).with_referer(config.website_url()))
    }

    /// Site reported to OpenRouter in the `Referer` header
    pub fn with_referer(mut self, referer: impl Into<String>) -> Self {
        self.referer = referer.into();
        self
    }

    fn headers(&self) -> HeaderMap {
        let mut headers = HeaderMap::new();
        if let Ok(value) = HeaderValue::from_str(&self.referer) {
            headers.insert(REFERER, value);
        }
        headers.insert("X-Title", HeaderValue::from_static(APP_TITLE));
        headers
    }

    /// One request, reply returned with any reasoning block intact
    async fn complete(&self, request: &GenerationRequest) -> ProviderResult<String> {
        debug!(
            model = %self.model_name,
            endpoint = %self.endpoint,
            has_api_key = self.api_key.is_some(),
            message_length = request.user_message.len(),
            "OpenRouter request"
        );

        let system_prompt = prompt::build_system_prompt(Persona::Standard, &request.context);
        let body = OpenRouterRequest {
            model: &self.model_name,
            messages: prompt::build_messages(&system_prompt, request),
            temperature: self.temperature,
            max_tokens: self.max_tokens,
            top_p: 0.9,
            frequency_penalty: 0.1,
            presence_penalty: 0.1,
            user: REQUEST_USER,
        };

        http::send_chat_completion(
            &self.http_client,
            CompletionCall {
                provider: self.provider_name(),
                url: &self.endpoint,
                api_key: self.api_key.as_deref(),
                headers: self.headers(),
                body: &body,
            },
        )
        .await
    }
}

#[async_trait]
impl CompletionProvider for OpenRouterClient {
    async fn generate(&self, request: &GenerationRequest) -> ProviderResult<String> {
        let full = self.complete(request).await?;
        let answer = prompt::strip_thinking(&full);
        if answer.trim().is_empty() {
            warn!("OpenRouter reply had no answer outside the reasoning block");
            return Err(ProviderError::EmptyResponse);
        }
        Ok(answer)
    }

    async fn generate_with_thinking(
        &self,
        request: &GenerationRequest,
    ) -> ProviderResult<ThinkingResponse> {
        let full = self.complete(request).await?;
        let split = prompt::split_thinking(&full);
        if split.response.trim().is_empty() {
            warn!("OpenRouter reply had no answer outside the reasoning block");
            return Err(ProviderError::EmptyResponse);
        }
        Ok(split)
    }

    fn supports_thinking(&self) -> bool {
        true
    }

    fn provider_name(&self) -> &'static str {
        "openrouter"
    }

    fn model_name(&self) -> String {
        self.model_name.clone()
    }

    fn status(&self) -> ProviderStatus {
        ProviderStatus {
            provider: self.provider_name(),
            model: self.model_name.clone(),
            endpoint: self.endpoint.clone(),
            has_api_key: self.api_key.is_some(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::errors::ProviderError;
    use crate::types::ChatMessage;
    use serde_json::{json, Value};
    use std::time::Duration;
    use wiremock::matchers::{header, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn client_for(server: &MockServer, api_key: Option<&str>) -> OpenRouterClient {
        let config = ProviderConfig {
            api_key: api_key.map(str::to_string),
            base_url: Some(server.uri()),
            ..Default::default()
        };
        let http_client =
            http::build_client_with_timeouts(Duration::from_secs(5), Duration::from_secs(5))
                .unwrap();
        OpenRouterClient::new(&config, http_client)
    }

    fn reply(content: &str) -> ResponseTemplate {
        ResponseTemplate::new(200).set_body_json(json!({
            "id": "gen-1",
            "model": DEFAULT_OPENROUTER_MODEL,
            "choices": [{"finish_reason": "stop", "message": {"role": "assistant", "content": content}}]
        }))
    }

    #[tokio::test]
    async fn test_request_shape_and_headers() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/chat/completions"))
            .and(header("authorization", "Bearer sk-or-test"))
            .and(header("referer", DEFAULT_WEBSITE_URL))
            .and(header("x-title", APP_TITLE))
            .respond_with(reply("Welcome!"))
            .expect(1)
            .mount(&server)
            .await;

        let client = client_for(&server, Some("sk-or-test"));
        let request = GenerationRequest::new("Hello")
            .with_context("[Source 1: home] Motto: Knowledge is power")
            .with_history(vec![ChatMessage::user("Hi"), ChatMessage::assistant("Hello there")]);
        assert_eq!(client.generate(&request).await.unwrap(), "Welcome!");

        let received = server.received_requests().await.unwrap();
        let body: Value = serde_json::from_slice(&received[0].body).unwrap();
        assert_eq!(body["model"], DEFAULT_OPENROUTER_MODEL);
        assert_eq!(body["max_tokens"], 2048);
        let messages = body["messages"].as_array().unwrap();
        assert_eq!(messages.len(), 4);
        assert_eq!(messages[0]["role"], "system");
        let system = messages[0]["content"].as_str().unwrap();
        assert!(system.contains("Motto: Knowledge is power"));
        assert!(!system.contains("[Source 1"));
        assert_eq!(messages[3]["role"], "user");
        assert_eq!(messages[3]["content"], "Hello");
    }

    #[tokio::test]
    async fn test_generate_strips_thinking() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(reply("<think>address lookup</think>\nWe are in Kumasi."))
            .mount(&server)
            .await;

        let client = client_for(&server, Some("k"));
        let request = GenerationRequest::new("Where is the school?");
        assert_eq!(client.generate(&request).await.unwrap(), "We are in Kumasi.");

        let split = client.generate_with_thinking(&request).await.unwrap();
        assert_eq!(split.thinking, "address lookup");
        assert_eq!(split.response, "We are in Kumasi.");
    }

    #[tokio::test]
    async fn test_reasoning_without_answer_is_empty_response() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "choices": [{
                    "finish_reason": "length",
                    "message": {"content": "<think>long reasoning cut off</think>"}
                }]
            })))
            .mount(&server)
            .await;

        let client = client_for(&server, Some("k"));
        let request = GenerationRequest::new("Who is the headmaster?");
        assert_eq!(
            client.generate(&request).await.unwrap_err(),
            ProviderError::EmptyResponse
        );
        assert_eq!(
            client.generate_with_thinking(&request).await.unwrap_err(),
            ProviderError::EmptyResponse
        );
    }

    #[tokio::test]
    async fn test_whitespace_reply_is_empty_response() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(reply("  \n\t "))
            .mount(&server)
            .await;

        let client = client_for(&server, Some("k"));
        let err = client
            .generate(&GenerationRequest::new("Hi"))
            .await
            .unwrap_err();
        assert_eq!(err, ProviderError::EmptyResponse);
    }

    #[tokio::test]
    async fn test_rate_limit_is_high_traffic() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(429))
            .expect(1)
            .mount(&server)
            .await;

        let client = client_for(&server, Some("k"));
        let err = client
            .generate(&GenerationRequest::new("Hi"))
            .await
            .unwrap_err();
        assert_eq!(err, ProviderError::HighTraffic);
    }

    #[tokio::test]
    async fn test_missing_key_reported_in_status() {
        let server = MockServer::start().await;
        let client = client_for(&server, None);
        let status = client.status();
        assert!(!status.has_api_key);
        assert_eq!(status.provider, "openrouter");
        assert!(status.endpoint.ends_with("/chat/completions"));

        let err = client
            .generate(&GenerationRequest::new("Hi"))
            .await
            .unwrap_err();
        assert_eq!(err, ProviderError::MissingApiKey);
    }
}
