use std::time::Duration;

use async_trait::async_trait;
use prospector_core::config::GatewayConfig;
use secrecy::{ExposeSecret, SecretString};
use serde::Deserialize;
use serde_json::json;
use thiserror::Error;
use tracing::debug;

/// Boundary abstraction over the language-model backend: one prompt in, raw
/// text out. No retry, no streaming, no caching; every call is a fresh
/// generation.
#[async_trait]
pub trait ModelGateway: Send + Sync {
    async fn complete(&self, prompt: &str) -> Result<String, GatewayError>;
}

#[derive(Debug, Error)]
pub enum GatewayError {
    #[error("model backend timed out")]
    Timeout,
    #[error("model backend unavailable: {0}")]
    Unavailable(#[source] reqwest::Error),
    #[error("model backend returned status {status}: {body}")]
    BadStatus { status: u16, body: String },
    #[error("model backend returned a malformed payload: {0}")]
    MalformedResponse(String),
}

/// The backend wraps completions in a response envelope; only the generated
/// text matters here.
#[derive(Debug, Deserialize)]
struct CompletionEnvelope {
    llm_response: String,
}

pub struct HttpModelGateway {
    client: reqwest::Client,
    base_url: String,
    app_name: String,
    username: String,
    password: SecretString,
}

impl HttpModelGateway {
    pub fn new(config: &GatewayConfig) -> Result<Self, GatewayError> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(GatewayError::Unavailable)?;

        Ok(Self {
            client,
            base_url: config.base_url.clone(),
            app_name: config.app_name.clone(),
            username: config.username.clone(),
            password: config.password.clone(),
        })
    }
}

#[async_trait]
impl ModelGateway for HttpModelGateway {
    async fn complete(&self, prompt: &str) -> Result<String, GatewayError> {
        debug!(
            event_name = "gateway.complete.request",
            prompt_chars = prompt.len(),
            "sending prompt to model backend"
        );

        let response = self
            .client
            .post(&self.base_url)
            .basic_auth(&self.username, Some(self.password.expose_secret()))
            .json(&json!({ "prompt": prompt, "app_name": self.app_name }))
            .send()
            .await
            .map_err(classify_transport_error)?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(GatewayError::BadStatus { status: status.as_u16(), body });
        }

        let envelope = response
            .json::<CompletionEnvelope>()
            .await
            .map_err(|error| GatewayError::MalformedResponse(error.to_string()))?;

        debug!(
            event_name = "gateway.complete.response",
            response_chars = envelope.llm_response.len(),
            "received completion from model backend"
        );

        Ok(envelope.llm_response)
    }
}

fn classify_transport_error(error: reqwest::Error) -> GatewayError {
    if error.is_timeout() {
        GatewayError::Timeout
    } else {
        GatewayError::Unavailable(error)
    }
}
