use serde::{Deserialize, Serialize};
use std::fmt;
use std::time::Duration;
use thiserror::Error;

/// Error kinds the chat widget knows how to present
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ErrorCategory {
    NetworkError,
    HighTraffic,
    ApiKeyInvalid,
    ServiceUnavailable,
    UnknownError,
}

impl ErrorCategory {
    pub fn as_str(&self) -> &'static str {
        match self {
            ErrorCategory::NetworkError => "NETWORK_ERROR",
            ErrorCategory::HighTraffic => "HIGH_TRAFFIC",
            ErrorCategory::ApiKeyInvalid => "API_KEY_INVALID",
            ErrorCategory::ServiceUnavailable => "SERVICE_UNAVAILABLE",
            ErrorCategory::UnknownError => "UNKNOWN_ERROR",
        }
    }

    /// Friendly text shown to visitors for this category
    pub fn user_message(&self) -> &'static str {
        match self {
            ErrorCategory::NetworkError => {
                "I couldn't reach the network. Please check your internet connection and try again."
            }
            ErrorCategory::HighTraffic => {
                "Louis AI is experiencing high traffic right now. Please try again in a moment."
            }
            ErrorCategory::ApiKeyInvalid => {
                "Louis AI is not configured correctly at the moment. Please contact the school if this continues."
            }
            ErrorCategory::ServiceUnavailable => {
                "The AI service is temporarily unavailable. Please try again shortly."
            }
            ErrorCategory::UnknownError => {
                "Something went wrong while generating a response. Please try again."
            }
        }
    }

    /// True for the catch-all kind
    pub fn is_generic(&self) -> bool {
        matches!(self, ErrorCategory::UnknownError)
    }
}

impl fmt::Display for ErrorCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Failure of a single provider call
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ProviderError {
    #[error("Network Error: {0}")]
    Network(String),

    #[error("Request timed out after {0:?}")]
    Timeout(Duration),

    #[error("Rate limited by provider (HTTP 429)")]
    HighTraffic,

    #[error("API key invalid or expired (HTTP 401)")]
    ApiKeyInvalid,

    #[error("API key is not configured")]
    MissingApiKey,

    #[error("Service unavailable (HTTP {0})")]
    ServiceUnavailable(u16),

    #[error("HTTP Error: {status_code} - {message}")]
    Http { status_code: u16, message: String },

    #[error("No response generated")]
    EmptyResponse,

    #[error("Parsing Error: {0}")]
    Parsing(String),
}

impl ProviderError {
    pub fn category(&self) -> ErrorCategory {
        match self {
            ProviderError::Network(_) | ProviderError::Timeout(_) => ErrorCategory::NetworkError,
            ProviderError::HighTraffic => ErrorCategory::HighTraffic,
            ProviderError::ApiKeyInvalid | ProviderError::MissingApiKey => {
                ErrorCategory::ApiKeyInvalid
            }
            ProviderError::ServiceUnavailable(_) => ErrorCategory::ServiceUnavailable,
            ProviderError::Http { .. } | ProviderError::EmptyResponse | ProviderError::Parsing(_) => {
                ErrorCategory::UnknownError
            }
        }
    }

    /// Map a non-success HTTP status and its body onto the taxonomy
    pub fn from_status(status_code: u16, body: &str) -> Self {
        match status_code {
            429 => ProviderError::HighTraffic,
            401 => ProviderError::ApiKeyInvalid,
            500.. => ProviderError::ServiceUnavailable(status_code),
            _ => ProviderError::Http {
                status_code,
                message: body.to_string(),
            },
        }
    }
}

impl From<serde_json::Error> for ProviderError {
    fn from(e: serde_json::Error) -> Self {
        ProviderError::Parsing(e.to_string())
    }
}

/// One failed attempt recorded by the orchestrator
#[derive(Debug, Clone, PartialEq)]
pub struct ProviderFailure {
    pub provider: &'static str,
    pub error: ProviderError,
}

impl fmt::Display for ProviderFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.provider, self.error)
    }
}

/// Errors surfaced to callers of the assistant
#[derive(Error, Debug)]
pub enum AssistantError {
    #[error("{category}: all providers failed ({})", join_failures(.failures))]
    Exhausted {
        category: ErrorCategory,
        failures: Vec<ProviderFailure>,
    },

    #[error("User message must not be empty")]
    EmptyMessage,

    #[error("No completion providers configured")]
    NoProviders,

    #[error("Configuration Error: {0}")]
    ConfigError(String),
}

impl AssistantError {
    /// Category shown to the user; always one of the known kinds
    pub fn category(&self) -> ErrorCategory {
        match self {
            AssistantError::Exhausted { category, .. } => *category,
            AssistantError::NoProviders | AssistantError::ConfigError(_) => {
                ErrorCategory::ServiceUnavailable
            }
            AssistantError::EmptyMessage => ErrorCategory::UnknownError,
        }
    }
}

fn join_failures(failures: &[ProviderFailure]) -> String {
    failures
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join("; ")
}

/// Result type for single provider calls
pub type ProviderResult<T> = Result<T, ProviderError>;

/// Result type for assistant operations
pub type AssistantResult<T> = Result<T, AssistantError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_classification() {
        assert_eq!(ProviderError::from_status(429, "").category(), ErrorCategory::HighTraffic);
        assert_eq!(ProviderError::from_status(401, "").category(), ErrorCategory::ApiKeyInvalid);
        assert_eq!(
            ProviderError::from_status(500, "").category(),
            ErrorCategory::ServiceUnavailable
        );
        assert_eq!(
            ProviderError::from_status(503, "").category(),
            ErrorCategory::ServiceUnavailable
        );
        assert_eq!(
            ProviderError::from_status(400, "bad request").category(),
            ErrorCategory::UnknownError
        );
    }

    #[test]
    fn test_generic_http_error_keeps_status_and_payload() {
        let err = ProviderError::from_status(404, r#"{"error":"no such model"}"#);
        let text = err.to_string();
        assert!(text.contains("404"));
        assert!(text.contains("no such model"));
    }

    #[test]
    fn test_category_wire_names() {
        assert_eq!(ErrorCategory::HighTraffic.to_string(), "HIGH_TRAFFIC");
        assert_eq!(
            serde_json::to_string(&ErrorCategory::ApiKeyInvalid).unwrap(),
            "\"API_KEY_INVALID\""
        );
        assert_eq!(
            serde_json::to_string(&ErrorCategory::ServiceUnavailable).unwrap(),
            "\"SERVICE_UNAVAILABLE\""
        );
    }

    #[test]
    fn test_missing_key_is_api_key_invalid() {
        assert_eq!(ProviderError::MissingApiKey.category(), ErrorCategory::ApiKeyInvalid);
        assert_eq!(
            ProviderError::Timeout(Duration::from_secs(30)).category(),
            ErrorCategory::NetworkError
        );
    }

    #[test]
    fn test_timeout_message_keeps_sub_second_deadlines() {
        let err = ProviderError::Timeout(Duration::from_millis(250));
        assert_eq!(err.to_string(), "Request timed out after 250ms");
    }

    #[test]
    fn test_exhausted_message_lists_failures() {
        let err = AssistantError::Exhausted {
            category: ErrorCategory::HighTraffic,
            failures: vec![
                ProviderFailure {
                    provider: "openrouter",
                    error: ProviderError::HighTraffic,
                },
                ProviderFailure {
                    provider: "groq-compound",
                    error: ProviderError::EmptyResponse,
                },
            ],
        };
        let text = err.to_string();
        assert!(text.starts_with("HIGH_TRAFFIC"));
        assert!(text.contains("openrouter"));
        assert!(text.contains("groq-compound"));
        assert_eq!(err.category(), ErrorCategory::HighTraffic);
    }
}
