// This crate contains the Louis AI assistant backend:
// - Provider clients for OpenRouter and Groq Compound
// - Fallback orchestration across providers
// - Prompt building and context cleaning
// - Configuration loading
// - Shared error types
// - Knowledge bank diagnostics

// Export types module - Request/response data structures
pub mod types;
pub use types::*;

// Export errors module - Shared error types
pub mod errors;
pub use errors::*;

// Export config module - Configuration loading
pub mod config;
pub use config::*;

pub mod prompt;

// Provider plumbing and the two concrete clients
pub mod http;
pub mod provider;
pub use provider::{CompletionProvider, ProviderStatus};
pub mod groq;
pub mod openrouter;
pub use groq::GroqCompoundClient;
pub use openrouter::OpenRouterClient;

// Export orchestrator module - Multi-provider fallback
pub mod orchestrator;
pub use orchestrator::FallbackOrchestrator;

pub mod diagnostics;
pub use diagnostics::{KnowledgeBankTester, KnowledgeSource, TestReport, TestResult};

#[cfg(test)]
pub(crate) mod test_support;
