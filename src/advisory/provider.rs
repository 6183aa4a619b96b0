use anyhow::{Context, Result};
use async_trait::async_trait;
use ollama_rs::generation::chat::{request::ChatMessageRequest, ChatMessage};
use ollama_rs::models::ModelOptions;
use reqwest::Client;
use serde_json::{json, Value};
use std::time::Duration;

/// One narrative completion: the advisor decides the wording and sampling,
/// the backend only has to deliver it.
#[derive(Debug, Clone, PartialEq)]
pub struct CompletionRequest {
    pub model: String,
    pub system: String,
    pub prompt: String,
    pub temperature: f32,
    pub max_tokens: Option<u32>,
}

#[async_trait]
pub trait CompletionProvider: Send + Sync {
    async fn complete(&self, request: &CompletionRequest) -> Result<String>;
}

/// Local Ollama daemon, via `ollama-rs`.
pub struct OllamaProvider {
    client: ollama_rs::Ollama,
}

impl OllamaProvider {
    pub fn new(client: ollama_rs::Ollama) -> Self {
        Self { client }
    }

    pub fn from_url(base_url: &str) -> Result<Self> {
        let url = reqwest::Url::parse(base_url).with_context(|| format!("Invalid Ollama URL: {}", base_url))?;
        let host = format!("{}://{}", url.scheme(), url.host_str().unwrap_or("localhost"));
        let port = url.port_or_known_default().unwrap_or(11434);
        Ok(Self::new(ollama_rs::Ollama::new(host, port)))
    }

    pub fn chat_request(request: &CompletionRequest) -> ChatMessageRequest {
        let mut options = ModelOptions::default().temperature(request.temperature);
        if let Some(limit) = request.max_tokens {
            options = options.num_predict(i32::try_from(limit).unwrap_or(i32::MAX));
        }
        let messages = vec![
            ChatMessage::system(request.system.clone()),
            ChatMessage::user(request.prompt.clone()),
        ];
        ChatMessageRequest::new(request.model.clone(), messages).options(options)
    }
}

#[async_trait]
impl CompletionProvider for OllamaProvider {
    async fn complete(&self, request: &CompletionRequest) -> Result<String> {
        let res = self
            .client
            .send_chat_messages(Self::chat_request(request))
            .await
            .context("Ollama chat request failed")?;
        Ok(res.message.content)
    }
}

/// Any server speaking the `/chat/completions` dialect.
pub struct OpenAICompatibleProvider {
    client: Client,
    base_url: String,
    api_key: Option<String>,
}

impl OpenAICompatibleProvider {
    pub fn with_timeout(base_url: String, api_key: Option<String>, timeout: Duration) -> Result<Self> {
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .context("Failed to build HTTP client for advisory provider")?;
        Ok(Self { client, base_url, api_key })
    }

    pub fn request_body(request: &CompletionRequest) -> Value {
        let mut body = json!({
            "model": request.model,
            "messages": [
                { "role": "system", "content": request.system },
                { "role": "user", "content": request.prompt },
            ],
            "temperature": request.temperature,
        });
        if let Some(limit) = request.max_tokens {
            body["max_tokens"] = json!(limit);
        }
        body
    }
}

#[async_trait]
impl CompletionProvider for OpenAICompatibleProvider {
    async fn complete(&self, request: &CompletionRequest) -> Result<String> {
        let mut http = self
            .client
            .post(format!("{}/chat/completions", self.base_url.trim_end_matches('/')))
            .json(&Self::request_body(request));
        if let Some(ref key) = self.api_key {
            http = http.bearer_auth(key);
        }

        let res: Value = http.send().await?.error_for_status()?.json().await?;
        res["choices"][0]["message"]["content"]
            .as_str()
            .map(str::to_string)
            .context("completion response has no message content")
    }
}
