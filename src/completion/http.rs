use std::time::Duration;

use anyhow::Result;
use async_trait::async_trait;
use log::{debug, error, info};
use reqwest::{Client, StatusCode};
use serde::Serialize;
use serde_json::{json, Value};

use super::{CompletionClient, CompletionResult};
use crate::config::Config;
use crate::error::CompletionFailure;
use crate::session::ChatTurn;

// A client for an OpenAI-style /chat/completions endpoint
pub struct HttpCompletionClient {
    api_url: String,
    api_key: String,
    model: String,
    client: Client,
}

#[derive(Serialize)]
struct WireMessage<'a> {
    role: &'a str,
    content: &'a str,
}

impl HttpCompletionClient {
    pub fn new(api_url: String, api_key: String, model: String, timeout: Duration) -> Result<Self> {
        info!("Using completion endpoint {} with model {}", api_url, model);

        let client = Client::builder().timeout(timeout).build()?;
        Ok(Self {
            api_url,
            api_key,
            model,
            client,
        })
    }

    pub fn from_config(config: &Config) -> Result<Self> {
        Self::new(
            config.api_url.clone(),
            config.api_key.clone(),
            config.model.clone(),
            config.request_timeout,
        )
    }

    fn payload(&self, system_role: &str, messages: &[ChatTurn]) -> Value {
        let mut wire = Vec::with_capacity(messages.len() + 1);
        wire.push(WireMessage { role: "system", content: system_role });
        wire.extend(messages.iter().map(|turn| WireMessage {
            role: turn.role().as_str(),
            content: turn.content(),
        }));

        json!({
            "model": self.model,
            "messages": wire,
        })
    }
}

#[async_trait]
impl CompletionClient for HttpCompletionClient {
    async fn complete(&self, system_role: &str, messages: &[ChatTurn]) -> CompletionResult {
        debug_assert!(!system_role.is_empty());
        debug_assert!(!messages.is_empty());

        let payload = self.payload(system_role, messages);
        info!("Sending completion request with {} message(s)", messages.len() + 1);
        debug!("Payload: {}", payload);

        let response = self
            .client
            .post(&self.api_url)
            .bearer_auth(&self.api_key)
            .json(&payload)
            .send()
            .await
            .map_err(|e| {
                error!("Completion request failed: {}", e);
                CompletionFailure::network(e.is_timeout(), e.to_string())
            })?;

        let status = response.status();
        let body = response.text().await;

        if status != StatusCode::OK {
            error!("Completion endpoint returned {}", status);
            // Keep the upstream status even when the body cannot be read
            let detail = body.unwrap_or_else(|e| format!("<unreadable response body: {e}>"));
            return Err(CompletionFailure::http(status.as_u16(), detail));
        }

        let body = body.map_err(|e| {
            error!("Failed to read completion response body: {}", e);
            CompletionFailure::network(e.is_timeout(), e.to_string())
        })?;

        let response_json: Value = serde_json::from_str(&body).map_err(|e| {
            CompletionFailure::malformed(status.as_u16(), format!("invalid JSON ({e}): {body}"))
        })?;
        debug!("Response JSON: {}", response_json);

        // Extract the generated text from the first choice
        let content = response_json
            .get("choices")
            .and_then(|choices| choices.get(0))
            .and_then(|choice| choice.get("message"))
            .and_then(|message| message.get("content"))
            .and_then(|content| content.as_str())
            .ok_or_else(|| {
                CompletionFailure::malformed(
                    status.as_u16(),
                    format!("missing choices[0].message.content: {body}"),
                )
            })?;

        info!("Response length: {} characters", content.len());
        Ok(content.to_string())
    }
}
