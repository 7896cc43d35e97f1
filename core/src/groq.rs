use async_trait::async_trait;
use reqwest::header::{HeaderMap, HeaderValue};
use reqwest::Client;
use serde::Serialize;
use tracing::debug;

use crate::config::{AssistantConfig, ProviderConfig};
use crate::errors::ProviderResult;
use crate::http::{self, CompletionCall};
use crate::prompt::{self, Persona};
use crate::provider::{CompletionProvider, ProviderStatus};
use crate::types::{GenerationRequest, WireMessage};

pub const GROQ_BASE_URL: &str = "https://api.groq.com/openai/v1";
pub const GROQ_COMPOUND_MODEL: &str = "groq/compound";

/// Server-side tools the compound model may call
pub const ENABLED_TOOLS: [&str; 3] = ["web_search", "code_interpreter", "visit_website"];

#[derive(Serialize)]
struct CompoundRequest<'a> {
    model: &'a str,
    messages: Vec<WireMessage<'a>>,
    temperature: f32,
    max_completion_tokens: u32,
    top_p: f32,
    stream: bool,
    stop: Option<Vec<String>>,
    compound_custom: CompoundCustom,
}

#[derive(Serialize)]
struct CompoundCustom {
    tools: CompoundTools,
}

#[derive(Serialize)]
struct CompoundTools {
    enabled_tools: Vec<&'static str>,
}

/// Groq Compound client with web search and page visiting enabled
#[derive(Debug, Clone)]
pub struct GroqCompoundClient {
    api_key: Option<String>,
    model_name: String,
    endpoint: String,
    temperature: f32,
    max_completion_tokens: u32,
    http_client: Client,
}

impl GroqCompoundClient {
    pub fn new(config: &ProviderConfig, http_client: Client) -> Self {
        let base_url = config.base_url.as_deref().unwrap_or(GROQ_BASE_URL);
        Self {
            api_key: config.api_key().map(str::to_string),
            model_name: config
                .model_name
                .clone()
                .unwrap_or_else(|| GROQ_COMPOUND_MODEL.to_string()),
            endpoint: http::completions_url(base_url),
            temperature: config.temperature.unwrap_or(1.0),
            max_completion_tokens: config.max_tokens.unwrap_or(1024),
            http_client,
        }
    }

    pub fn from_config(config: &AssistantConfig) -> ProviderResult<Self> {
        let http_client = http::build_http_client(config)?;
        Ok(Self::new(&config.groq, http_client))
    }
}

#[async_trait]
impl CompletionProvider for GroqCompoundClient {
    async fn generate(&self, request: &GenerationRequest) -> ProviderResult<String> {
        debug!(
            model = %self.model_name,
            endpoint = %self.endpoint,
            has_api_key = self.api_key.is_some(),
            message_length = request.user_message.len(),
            "Groq Compound request"
        );

        let system_prompt = prompt::build_system_prompt(Persona::WebSearch, &request.context);
        let body = CompoundRequest {
            model: &self.model_name,
            messages: prompt::build_messages(&system_prompt, request),
            temperature: self.temperature,
            max_completion_tokens: self.max_completion_tokens,
            top_p: 1.0,
            stream: false,
            stop: None,
            compound_custom: CompoundCustom {
                tools: CompoundTools {
                    enabled_tools: ENABLED_TOOLS.to_vec(),
                },
            },
        };

        let mut headers = HeaderMap::new();
        headers.insert("Groq-Model-Version", HeaderValue::from_static("latest"));

        http::send_chat_completion(
            &self.http_client,
            CompletionCall {
                provider: self.provider_name(),
                url: &self.endpoint,
                api_key: self.api_key.as_deref(),
                headers,
                body: &body,
            },
        )
        .await
    }

    fn provider_name(&self) -> &'static str {
        "groq-compound"
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
    use crate::errors::{ErrorCategory, ProviderError};
    use serde_json::{json, Value};
    use std::time::Duration;
    use wiremock::matchers::{header, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn client_for(server: &MockServer) -> GroqCompoundClient {
        let config = ProviderConfig {
            api_key: Some("gsk_test".to_string()),
            base_url: Some(server.uri()),
            ..Default::default()
        };
        let http_client =
            http::build_client_with_timeouts(Duration::from_secs(5), Duration::from_secs(5))
                .unwrap();
        GroqCompoundClient::new(&config, http_client)
    }

    #[tokio::test]
    async fn test_compound_request_body() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/chat/completions"))
            .and(header("authorization", "Bearer gsk_test"))
            .and(header("groq-model-version", "latest"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "model": "groq/compound",
                "choices": [{"finish_reason": "stop", "message": {"role": "assistant", "content": "123 Main St"}}],
                "usage": {"prompt_tokens": 120, "completion_tokens": 4, "total_tokens": 124}
            })))
            .expect(1)
            .mount(&server)
            .await;

        let client = client_for(&server);
        let reply = client
            .generate(&GenerationRequest::new("What is the school address?"))
            .await
            .unwrap();
        assert_eq!(reply, "123 Main St");

        let received = server.received_requests().await.unwrap();
        let body: Value = serde_json::from_slice(&received[0].body).unwrap();
        assert_eq!(body["model"], "groq/compound");
        assert_eq!(body["max_completion_tokens"], 1024);
        assert_eq!(body["stream"], false);
        assert!(body["stop"].is_null());
        assert_eq!(
            body["compound_custom"]["tools"]["enabled_tools"],
            json!(["web_search", "code_interpreter", "visit_website"])
        );
        assert!(body.get("max_tokens").is_none());
    }

    #[tokio::test]
    async fn test_unauthorized_is_api_key_invalid() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(
                ResponseTemplate::new(401).set_body_json(json!({"error": {"message": "Invalid API Key"}})),
            )
            .mount(&server)
            .await;

        let err = client_for(&server)
            .generate(&GenerationRequest::new("Hi"))
            .await
            .unwrap_err();
        assert_eq!(err, ProviderError::ApiKeyInvalid);
        assert_eq!(err.category(), ErrorCategory::ApiKeyInvalid);
    }

    #[tokio::test]
    async fn test_no_thinking_support() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "choices": [{"message": {"content": "<think>kept</think> answer"}}]
            })))
            .mount(&server)
            .await;

        let client = client_for(&server);
        assert!(!client.supports_thinking());
        let result = client
            .generate_with_thinking(&GenerationRequest::new("Hi"))
            .await
            .unwrap();
        assert_eq!(result.thinking, "");
        assert_eq!(result.response, "<think>kept</think> answer");
    }
}
