use serde::{Deserialize, Serialize};

/// Author of a chat message
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    User,
    Assistant,
    System,
}

/// A single chat message, in conversation order
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatMessage {
    pub role: Role,
    pub content: String,
}

impl ChatMessage {
    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: Role::User,
            content: content.into(),
        }
    }

    pub fn assistant(content: impl Into<String>) -> Self {
        Self {
            role: Role::Assistant,
            content: content.into(),
        }
    }
}

/// Everything a provider needs to answer one user query.
///
/// Built per call and dropped once the call returns.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct GenerationRequest {
    pub user_message: String,
    /// Retrieved school data; only used to build the system prompt
    pub context: String,
    pub history: Vec<ChatMessage>,
    pub sources: Vec<String>,
}

impl GenerationRequest {
    pub fn new(user_message: impl Into<String>) -> Self {
        Self {
            user_message: user_message.into(),
            ..Default::default()
        }
    }

    pub fn with_context(mut self, context: impl Into<String>) -> Self {
        self.context = context.into();
        self
    }

    pub fn with_history(mut self, history: Vec<ChatMessage>) -> Self {
        self.history = history;
        self
    }

    pub fn with_sources(mut self, sources: Vec<String>) -> Self {
        self.sources = sources;
        self
    }

    /// Copy of this request carrying a different user message
    pub fn with_user_message(&self, user_message: impl Into<String>) -> Self {
        Self {
            user_message: user_message.into(),
            ..self.clone()
        }
    }
}

/// Reply split into the user-facing answer and the model's reasoning
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ThinkingResponse {
    pub response: String,
    pub thinking: String,
}

/// Message shape sent to OpenAI-compatible chat completion endpoints
#[derive(Serialize, Debug, Clone)]
pub struct WireMessage<'a> {
    pub role: Role,
    pub content: &'a str,
}

/// Response from an OpenAI-compatible chat completion endpoint
#[derive(Deserialize, Debug, Default)]
pub struct ChatCompletionResponse {
    #[serde(default)]
    pub id: Option<String>,
    #[serde(default)]
    pub model: Option<String>,
    #[serde(default)]
    pub choices: Vec<Choice>,
    #[serde(default)]
    pub usage: Option<Usage>,
}

/// Candidate completion in the response
#[derive(Deserialize, Debug)]
pub struct Choice {
    #[serde(default)]
    pub finish_reason: Option<String>,
    #[serde(default)]
    pub message: Option<ChoiceMessage>,
}

#[derive(Deserialize, Debug)]
pub struct ChoiceMessage {
    #[serde(default)]
    pub role: Option<String>,
    #[serde(default)]
    pub content: Option<String>,
}

/// Token accounting reported by the provider; absent counters read as zero
#[derive(Deserialize, Debug, Clone, Copy, Default)]
pub struct Usage {
    #[serde(default, deserialize_with = "null_as_zero")]
    pub prompt_tokens: u32,
    #[serde(default, deserialize_with = "null_as_zero")]
    pub completion_tokens: u32,
    #[serde(default, deserialize_with = "null_as_zero")]
    pub total_tokens: u32,
}

fn null_as_zero<'de, D>(deserializer: D) -> Result<u32, D::Error>
where
    D: serde::Deserializer<'de>,
{
    Ok(Option::<u32>::deserialize(deserializer)?.unwrap_or_default())
}

impl ChatCompletionResponse {
    /// Content of the first choice, if it carries any text
    pub fn first_content(&self) -> Option<&str> {
        self.choices
            .first()
            .and_then(|choice| choice.message.as_ref())
            .and_then(|message| message.content.as_deref())
            .filter(|content| !content.trim().is_empty())
    }
}
