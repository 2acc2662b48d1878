//! OpenAI-compatible predictor implementation
//!
//! Works with OpenAI, Azure OpenAI, vLLM, Ollama, and other OpenAI-compatible
//! chat-completions APIs. The prompt follows the fine-tune conversation
//! format: a fixed system message plus `product: {product}, Class: {class}`.

use super::{ChatMessage, Completion, Predictor, PredictorConfig, Usage};
use crate::error::{self, Error, Result};
use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use tracing::debug;

/// OpenAI-compatible predictor
pub struct OpenAiPredictor {
    client: Client,
    config: PredictorConfig,
}

impl OpenAiPredictor {
    pub fn new(config: PredictorConfig) -> Result<Self> {
        let client = Client::builder()
            .timeout(std::time::Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| {
                error::config_invalid("failed to build HTTP client")
                    .with_operation("predictor::new")
                    .set_source(e)
            })?;

        Ok(Self { client, config })
    }

    fn prompt_messages(&self, product: &str, reaction_class: &str) -> Vec<ChatMessage> {
        vec![
            ChatMessage::system(&self.config.system_prompt),
            ChatMessage::user(format!("product: {}, Class: {}", product, reaction_class)),
        ]
    }
}

#[async_trait]
impl Predictor for OpenAiPredictor {
    fn name(&self) -> &str {
        "openai"
    }

    async fn predict(&self, product: &str, reaction_class: &str) -> Result<Completion> {
        let api_request = ChatRequest {
            model: self.config.model.clone(),
            messages: self.prompt_messages(product, reaction_class),
        };

        debug!(model = %self.config.model, product, reaction_class, "requesting prediction");

        let mut req = self
            .client
            .post(format!("{}/chat/completions", self.config.base_url))
            .json(&api_request);

        if let Some(api_key) = &self.config.api_key {
            if !api_key.is_empty() {
                req = req.header("Authorization", format!("Bearer {}", api_key));
            }
        }

        let response = req.send().await.map_err(transport_error)?;

        let status = response.status().as_u16();
        if !response.status().is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(status_error(status, &body));
        }

        let api_response: ChatResponse = response.json().await.map_err(|e| {
            error::parse_error("predictor returned unparseable JSON")
                .with_operation("predictor::predict")
                .set_source(e)
        })?;

        completion_from(api_response)
    }
}

/// Map a transport-level failure into the error taxonomy
fn transport_error(err: reqwest::Error) -> Error {
    if err.is_timeout() {
        Error::timeout("predictor")
            .with_operation("predictor::predict")
            .set_source(err)
    } else {
        Error::network_failed(err.to_string())
            .with_operation("predictor::predict")
            .set_source(err)
    }
}

/// Map a non-success HTTP status into the error taxonomy
fn status_error(status: u16, body: &str) -> Error {
    let err = match status {
        401 | 403 => Error::auth_failed("predictor rejected the API key"),
        429 => Error::rate_limited(None),
        500..=599 => Error::provider_unavailable(format!("predictor returned {}", status)),
        _ => Error::prediction_failed(format!("predictor returned {}", status)).permanent(),
    };
    err.with_operation("predictor::predict")
        .with_context("status", status.to_string())
        .with_context("body", truncate(body, 200))
}

/// Pull the first choice out of a chat response
fn completion_from(api_response: ChatResponse) -> Result<Completion> {
    let choice = api_response.choices.into_iter().next().ok_or_else(|| {
        error::prediction_failed("no choices in predictor response")
            .with_operation("predictor::predict")
    })?;

    Ok(Completion {
        model: api_response.model,
        content: choice.message.content,
        usage: api_response.usage.unwrap_or_default(),
    })
}

fn truncate(s: &str, max_len: usize) -> String {
    if s.len() <= max_len {
        s.to_string()
    } else {
        let cut = s
            .char_indices()
            .take_while(|(idx, _)| *idx < max_len)
            .last()
            .map(|(idx, c)| idx + c.len_utf8())
            .unwrap_or(0);
        format!("{}…", &s[..cut])
    }
}

// ============================================================================
// Wire Types
// ============================================================================

#[derive(Debug, Serialize)]
struct ChatRequest {
    model: String,
    messages: Vec<ChatMessage>,
}

#[derive(Debug, Deserialize)]
struct ChatResponse {
    model: String,
    choices: Vec<ChatChoice>,
    usage: Option<Usage>,
}

#[derive(Debug, Deserialize)]
struct ChatChoice {
    message: WireMessage,
}

#[derive(Debug, Deserialize)]
struct WireMessage {
    content: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorKind;

    #[test]
    fn test_completion_from_response() {
        let body = r#"{
            "id": "chatcmpl-123",
            "model": "ft:gpt-3.5-turbo:demo",
            "choices": [
                {"message": {"role": "assistant", "content": "The predicted reactant is: CCO"}}
            ],
            "usage": {"prompt_tokens": 21, "completion_tokens": 9, "total_tokens": 30}
        }"#;
        let api: ChatResponse = serde_json::from_str(body).unwrap();
        let completion = completion_from(api).unwrap();

        assert_eq!(completion.model, "ft:gpt-3.5-turbo:demo");
        assert_eq!(
            completion.content.as_deref(),
            Some("The predicted reactant is: CCO")
        );
        assert_eq!(completion.usage.total_tokens, 30);
    }

    #[test]
    fn test_completion_without_content() {
        let body = r#"{
            "model": "ft:gpt-3.5-turbo:demo",
            "choices": [{"message": {"role": "assistant"}}]
        }"#;
        let api: ChatResponse = serde_json::from_str(body).unwrap();
        let completion = completion_from(api).unwrap();
        assert!(completion.content.is_none());
    }

    #[test]
    fn test_empty_choices_is_an_error() {
        let body = r#"{"model": "m", "choices": []}"#;
        let api: ChatResponse = serde_json::from_str(body).unwrap();
        let err = completion_from(api).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::PredictionFailed);
    }

    #[test]
    fn test_status_mapping() {
        assert_eq!(status_error(401, "").kind(), ErrorKind::AuthFailed);
        assert_eq!(status_error(429, "").kind(), ErrorKind::RateLimited);
        assert_eq!(status_error(503, "").kind(), ErrorKind::ProviderUnavailable);
        assert_eq!(status_error(400, "").kind(), ErrorKind::PredictionFailed);
        assert!(!status_error(400, "").is_retryable());
    }

    #[test]
    fn test_prompt_format() {
        let config = PredictorConfig::openai("sk-test");
        let predictor = OpenAiPredictor::new(config).unwrap();
        let messages = predictor.prompt_messages("C1=CC=CC=C1", "Hydrogenation");

        assert_eq!(messages.len(), 2);
        assert_eq!(messages[0].content, "You are a helpful assistant.");
        assert_eq!(
            messages[1].content,
            "product: C1=CC=CC=C1, Class: Hydrogenation"
        );
    }
}
