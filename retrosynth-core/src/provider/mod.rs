//! # Generative Predictor Interface
//!
//! A trait-based abstraction for the reactant-prediction model.
//!
//! ## Design
//! - `Predictor` trait defines the core interface: (product, reaction class)
//!   in, free-text completion out
//! - `OpenAiPredictor` implements it against an OpenAI-compatible
//!   chat-completions endpoint (typically a fine-tuned model)
//! - The completion text is opaque here; candidate extraction is the
//!   refinement loop's job

pub mod openai;

pub use openai::OpenAiPredictor;

use crate::error::Result;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};

// ============================================================================
// Core Types
// ============================================================================

/// A chat message in the prediction conversation
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatMessage {
    pub role: Role,
    pub content: String,
}

impl ChatMessage {
    pub fn system(content: impl Into<String>) -> Self {
        Self {
            role: Role::System,
            content: content.into(),
        }
    }

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

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    System,
    User,
    Assistant,
}

/// Token usage information
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Usage {
    #[serde(default)]
    pub prompt_tokens: usize,
    #[serde(default)]
    pub completion_tokens: usize,
    #[serde(default)]
    pub total_tokens: usize,
}

/// Response from a prediction request
#[derive(Debug, Clone)]
pub struct Completion {
    pub model: String,
    /// Free text that should contain a candidate molecule. May be absent
    /// or garbled; the caller must tolerate both.
    pub content: Option<String>,
    pub usage: Usage,
}

// ============================================================================
// Predictor Trait
// ============================================================================

/// The generative reactant predictor
#[async_trait]
pub trait Predictor: Send + Sync {
    /// Get the predictor name (e.g., "openai")
    fn name(&self) -> &str;

    /// Ask the model for a precursor of `product` under `reaction_class`.
    ///
    /// Exactly one upstream call per invocation; callers decide whether a
    /// failed call is retried.
    async fn predict(&self, product: &str, reaction_class: &str) -> Result<Completion>;
}

// ============================================================================
// Predictor Configuration
// ============================================================================

/// Configuration for creating predictors
#[derive(Debug, Clone)]
pub struct PredictorConfig {
    pub api_key: Option<String>,
    pub base_url: String,
    pub model: String,
    pub system_prompt: String,
    pub timeout_secs: u64,
}

impl PredictorConfig {
    /// OpenAI-compatible endpoint with the given API key
    pub fn openai(api_key: impl Into<String>) -> Self {
        Self {
            api_key: Some(api_key.into()),
            base_url: "https://api.openai.com/v1".into(),
            model: "gpt-3.5-turbo".into(),
            system_prompt: "You are a helpful assistant.".into(),
            timeout_secs: 10,
        }
    }

    /// Point at a different OpenAI-compatible server (vLLM, Ollama, ...)
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    /// Select the model, e.g. a fine-tuned checkpoint id
    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = model.into();
        self
    }

    pub fn with_system_prompt(mut self, prompt: impl Into<String>) -> Self {
        self.system_prompt = prompt.into();
        self
    }

    pub fn with_timeout(mut self, secs: u64) -> Self {
        self.timeout_secs = secs;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_chat_message_constructors() {
        let sys = ChatMessage::system("You are a helpful assistant.");
        assert_eq!(sys.role, Role::System);
        assert_eq!(sys.content, "You are a helpful assistant.");

        let user = ChatMessage::user("product: CCO, Class: Oxidation");
        assert_eq!(user.role, Role::User);

        let asst = ChatMessage::assistant("The predicted reactant is: CC=O");
        assert_eq!(asst.role, Role::Assistant);
    }

    #[test]
    fn test_role_serialization() {
        let json = serde_json::to_string(&ChatMessage::user("hi")).unwrap();
        assert!(json.contains("\"role\":\"user\""));
    }

    #[test]
    fn test_predictor_config_builder() {
        let config = PredictorConfig::openai("sk-test")
            .with_model("ft:gpt-3.5-turbo:demo")
            .with_timeout(30);

        assert_eq!(config.api_key.as_deref(), Some("sk-test"));
        assert_eq!(config.model, "ft:gpt-3.5-turbo:demo");
        assert_eq!(config.timeout_secs, 30);
        assert!(config.base_url.contains("api.openai.com"));
    }
}
