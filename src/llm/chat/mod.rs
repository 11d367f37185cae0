
use std::time::Duration;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use tracing::debug;
use url::Url;

use super::ChatModel;
use crate::RagError;
use crate::config::LlmConfig;
use crate::http::{HttpClient, join_path};

/// Client for OpenAI-compatible `/chat/completions` endpoints
#[derive(Debug, Clone)]
pub struct OpenAiChatClient {
    endpoint: Url,
    model: String,
    temperature: f32,
    max_tokens: u32,
    http: HttpClient,
}

#[derive(Debug, Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: [ChatMessage<'a>; 2],
    temperature: f32,
    max_tokens: u32,
}

#[derive(Debug, Serialize)]
struct ChatMessage<'a> {
    role: &'static str,
    content: &'a str,
}

#[derive(Debug, Deserialize)]
struct ChatResponse {
    choices: Vec<ChatChoice>,
}

#[derive(Debug, Deserialize)]
struct ChatChoice {
    message: ChatReply,
}

#[derive(Debug, Deserialize)]
struct ChatReply {
    content: Option<String>,
}

impl OpenAiChatClient {
    /// Create a client, reading the API key from the environment variable named in `config`
    #[inline]
    pub fn new(config: &LlmConfig) -> crate::Result<Self> {
        let endpoint = config
            .endpoint_url()
            .map_err(|e| RagError::Config(e.to_string()))?;
        let api_key = std::env::var(&config.api_key_env).ok();
        if api_key.is_none() {
            debug!(
                "No API key found in {}, sending unauthenticated requests",
                config.api_key_env
            );
        }

        Ok(Self {
            endpoint,
            model: config.model.clone(),
            temperature: config.temperature,
            max_tokens: config.max_tokens,
            http: HttpClient::new(Duration::from_secs(config.timeout_seconds))
                .with_bearer_token(api_key),
        })
    }

    #[inline]
    pub fn with_http_client(mut self, http: HttpClient) -> Self {
        self.http = http;
        self
    }

    #[inline]
    pub fn has_api_key(&self) -> bool {
        self.http.has_bearer_token()
    }

    fn request_completion(&self, system: &str, user: &str) -> Result<String> {
        let url = join_path(&self.endpoint, "chat/completions")?;
        let request = ChatRequest {
            model: &self.model,
            messages: [
                ChatMessage {
                    role: "system",
                    content: system,
                },
                ChatMessage {
                    role: "user",
                    content: user,
                },
            ],
            temperature: self.temperature,
            max_tokens: self.max_tokens,
        };

        let response_text = self
            .http
            .post_json(&url, &request)
            .context("Chat completion request failed")?;
        let response: ChatResponse =
            serde_json::from_str(&response_text).context("Failed to parse chat response")?;

        response
            .choices
            .into_iter()
            .next()
            .and_then(|choice| choice.message.content)
            .map(|content| content.trim().to_string())
            .filter(|content| !content.is_empty())
            .context("Chat response contained no answer")
    }
}

impl ChatModel for OpenAiChatClient {
    #[inline]
    fn model(&self) -> &str {
        &self.model
    }

    #[inline]
    fn complete(&self, system: &str, user: &str) -> crate::Result<String> {
        debug!("Requesting completion from {}", self.model);
        self.request_completion(system, user)
            .map_err(|e| RagError::Llm(format!("{:#}", e)))
    }
}
