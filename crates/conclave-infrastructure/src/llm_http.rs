//! HTTP LLM client for OpenAI-compatible chat-completion endpoints.

use std::time::Duration;

use anyhow::Result;
use async_trait::async_trait;
use serde_json::json;
use tokio::time::timeout;
use tracing::debug;

use conclave_core::llm::{ChatRole, CompletionRequest, CompletionResponse, LlmClient};

const DEFAULT_BASE_URL: &str = "https://api.openai.com/v1";

/// Chat-completions client. Works against any endpoint speaking the
/// OpenAI wire format (hosted APIs, local gateways).
pub struct HttpLlmClient {
    base_url: String,
    api_key: Option<String>,
    timeout_secs: u64,
    client: reqwest::Client,
}

impl HttpLlmClient {
    pub fn new(base_url: Option<String>, api_key: Option<String>, timeout_secs: u64) -> Self {
        Self {
            base_url: base_url.unwrap_or_else(|| DEFAULT_BASE_URL.to_string()),
            api_key,
            timeout_secs,
            client: reqwest::Client::new(),
        }
    }

    fn endpoint(&self) -> String {
        format!("{}/chat/completions", self.base_url.trim_end_matches('/'))
    }
}

fn role_name(role: ChatRole) -> &'static str {
    match role {
        ChatRole::System => "system",
        ChatRole::User => "user",
        ChatRole::Assistant => "assistant",
    }
}

#[async_trait]
impl LlmClient for HttpLlmClient {
    async fn complete(&self, request: CompletionRequest) -> Result<CompletionResponse> {
        let mut messages = vec![json!({
            "role": "system",
            "content": request.system_prompt,
        })];
        for message in &request.messages {
            messages.push(json!({
                "role": role_name(message.role),
                "content": message.content,
            }));
        }

        let body = json!({
            "model": request.model,
            "messages": messages,
            "temperature": request.temperature,
            "max_tokens": request.max_tokens,
        });

        debug!(model = %request.model, "[HttpLlmClient] Sending completion request");

        let mut builder = self.client.post(self.endpoint()).json(&body);
        if let Some(ref api_key) = self.api_key {
            builder = builder.bearer_auth(api_key);
        }

        let duration = Duration::from_secs(self.timeout_secs);
        let response = timeout(duration, builder.send())
            .await
            .map_err(|_| anyhow::anyhow!("request timed out after {}s", self.timeout_secs))??;

        let status = response.status();
        let text = response.text().await?;
        if !status.is_success() {
            anyhow::bail!("provider error {}: {}", status, text);
        }

        let parsed: serde_json::Value = serde_json::from_str(&text)?;
        let content = parsed
            .get("choices")
            .and_then(|choices| choices.get(0))
            .and_then(|choice| choice.get("message"))
            .and_then(|message| message.get("content"))
            .and_then(|content| content.as_str())
            .ok_or_else(|| anyhow::anyhow!("malformed completion response: {}", text))?
            .to_string();

        Ok(CompletionResponse { content })
    }
}
