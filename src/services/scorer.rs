use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use thiserror::Error;

/// Errors that can occur when calling the scoring model
#[derive(Debug, Error)]
pub enum ScorerError {
    #[error("HTTP request failed: {0}")]
    RequestError(#[from] reqwest::Error),

    #[error("API returned error {status}: {body}")]
    ApiError { status: u16, body: String },

    #[error("Invalid response format: {0}")]
    InvalidResponse(String),

    #[error("Scoring call timed out")]
    Timeout,
}

/// Text-in, text-out relevance scoring capability
///
/// Implementations return best-effort text that should contain a number from 1 to 10.
#[async_trait]
pub trait RelevanceScorer: Send + Sync {
    async fn score(&self, system_context: &str, prompt: &str) -> Result<String, ScorerError>;
}

#[derive(Debug, Serialize)]
struct ChatMessage<'a> {
    role: &'a str,
    content: &'a str,
}

#[derive(Debug, Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: [ChatMessage<'a>; 2],
    temperature: f32,
    max_tokens: u32,
}

#[derive(Debug, Deserialize)]
struct ChatResponse {
    choices: Vec<ChatChoice>,
}

#[derive(Debug, Deserialize)]
struct ChatChoice {
    message: ChatChoiceMessage,
}

#[derive(Debug, Deserialize)]
struct ChatChoiceMessage {
    content: Option<String>,
}

/// Scorer backed by an OpenAI-compatible `/chat/completions` endpoint
pub struct ChatCompletionsScorer {
    base_url: String,
    api_key: Option<String>,
    model: String,
    temperature: f32,
    client: Client,
}

impl ChatCompletionsScorer {
    /// Create a new chat-completions scorer
    pub fn new(
        base_url: String,
        api_key: Option<String>,
        model: String,
        temperature: f32,
        timeout: Duration,
    ) -> Result<Self, ScorerError> {
        let client = Client::builder().timeout(timeout).build()?;

        Ok(Self {
            base_url,
            api_key,
            model,
            temperature,
            client,
        })
    }

    pub fn model(&self) -> &str {
        &self.model
    }
}

#[async_trait]
impl RelevanceScorer for ChatCompletionsScorer {
    async fn score(&self, system_context: &str, prompt: &str) -> Result<String, ScorerError> {
        let url = format!("{}/chat/completions", self.base_url.trim_end_matches('/'));

        let body = ChatRequest {
            model: &self.model,
            messages: [
                ChatMessage {
                    role: "system",
                    content: system_context,
                },
                ChatMessage {
                    role: "user",
                    content: prompt,
                },
            ],
            temperature: self.temperature,
            max_tokens: 4,
        };

        let mut request = self.client.post(&url).json(&body);
        if let Some(api_key) = &self.api_key {
            request = request.bearer_auth(api_key);
        }

        let response = request.send().await.map_err(|e| {
            if e.is_timeout() {
                ScorerError::Timeout
            } else {
                ScorerError::RequestError(e)
            }
        })?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(ScorerError::ApiError {
                status: status.as_u16(),
                body,
            });
        }

        let parsed: ChatResponse = response
            .json()
            .await
            .map_err(|e| ScorerError::InvalidResponse(format!("Failed to parse completion: {}", e)))?;

        parsed
            .choices
            .into_iter()
            .next()
            .and_then(|choice| choice.message.content)
            .ok_or_else(|| ScorerError::InvalidResponse("Missing choices[0].message.content".into()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn scorer(base_url: String) -> ChatCompletionsScorer {
        ChatCompletionsScorer::new(
            base_url,
            Some("test-key".to_string()),
            "gpt-4o-mini".to_string(),
            0.0,
            Duration::from_secs(5),
        )
        .unwrap()
    }

    #[tokio::test]
    async fn test_score_returns_message_content() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("POST", "/chat/completions")
            .match_header("authorization", "Bearer test-key")
            .match_body(mockito::Matcher::PartialJson(serde_json::json!({
                "model": "gpt-4o-mini",
                "messages": [
                    {"role": "system", "content": "system"},
                    {"role": "user", "content": "prompt"}
                ]
            })))
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(r#"{"choices":[{"message":{"role":"assistant","content":" 8 "}}]}"#)
            .create_async()
            .await;

        let text = scorer(server.url()).score("system", "prompt").await.unwrap();

        assert_eq!(text, " 8 ");
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn test_api_error_status() {
        let mut server = mockito::Server::new_async().await;
        let _mock = server
            .mock("POST", "/chat/completions")
            .with_status(429)
            .with_body("rate limited")
            .create_async()
            .await;

        let err = scorer(server.url()).score("system", "prompt").await.unwrap_err();

        assert!(matches!(err, ScorerError::ApiError { status: 429, .. }));
    }

    #[tokio::test]
    async fn test_missing_choices() {
        let mut server = mockito::Server::new_async().await;
        let _mock = server
            .mock("POST", "/chat/completions")
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(r#"{"choices":[]}"#)
            .create_async()
            .await;

        let err = scorer(server.url()).score("system", "prompt").await.unwrap_err();

        assert!(matches!(err, ScorerError::InvalidResponse(_)));
    }
}
