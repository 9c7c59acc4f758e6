//! Gemini implementation of the LLM gateway port

use super::types::{GenerateContentRequest, GenerateContentResponse};
use crate::config::FileModelConfig;
use async_trait::async_trait;
use concierge_application::ports::llm_gateway::{GatewayError, LlmGateway};
use concierge_domain::util::preview;
use reqwest::StatusCode;
use std::time::Duration;
use tracing::debug;

const API_KEY_HEADER: &str = "x-goog-api-key";
const CONNECT_TIMEOUT: Duration = Duration::from_secs(10);

pub struct GeminiGateway {
    http: reqwest::Client,
    api_base: String,
    model: String,
    api_key: String,
}

impl GeminiGateway {
    pub fn new(
        api_key: impl Into<String>,
        model: impl Into<String>,
        api_base: impl Into<String>,
        timeout: Duration,
    ) -> Result<Self, GatewayError> {
        let api_key = api_key.into();
        if api_key.trim().is_empty() {
            return Err(GatewayError::ConnectionError(
                "Gemini API key is not set".to_string(),
            ));
        }

        let http = reqwest::Client::builder()
            .connect_timeout(CONNECT_TIMEOUT)
            .timeout(timeout)
            .build()
            .map_err(|e| {
                GatewayError::ConnectionError(format!("failed to build HTTP client: {e}"))
            })?;

        Ok(Self {
            http,
            api_base: api_base.into().trim_end_matches('/').to_string(),
            model: model.into(),
            api_key,
        })
    }

    /// Build from the `[model]` section
    pub fn from_config(config: &FileModelConfig) -> Result<Self, GatewayError> {
        let api_key = config.api_key().ok_or_else(|| {
            GatewayError::ConnectionError("Gemini API key is not set".to_string())
        })?;
        Self::new(
            api_key,
            config.model.clone(),
            config.api_base.clone(),
            Duration::from_secs(config.timeout_seconds),
        )
    }

    fn url(&self) -> String {
        format!("{}/models/{}:generateContent", self.api_base, self.model)
    }
}

fn status_error(status: StatusCode, model: &str, body: &str) -> GatewayError {
    match status {
        StatusCode::NOT_FOUND => GatewayError::ModelNotAvailable(model.to_string()),
        StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => {
            GatewayError::RequestFailed(format!("HTTP {}: API key rejected", status.as_u16()))
        }
        _ => GatewayError::RequestFailed(format!(
            "HTTP {}: {}",
            status.as_u16(),
            preview(body.trim(), 300)
        )),
    }
}

#[async_trait]
impl LlmGateway for GeminiGateway {
    fn model_id(&self) -> &str {
        &self.model
    }

    async fn generate(&self, prompt: &str) -> Result<String, GatewayError> {
        let url = self.url();
        debug!(model = %self.model, prompt_bytes = prompt.len(), "Gemini request");

        let response = self
            .http
            .post(&url)
            .header(API_KEY_HEADER, &self.api_key)
            .json(&GenerateContentRequest::from_prompt(prompt))
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    GatewayError::Timeout
                } else if e.is_connect() {
                    GatewayError::ConnectionError(format!("{url}: {e}"))
                } else {
                    GatewayError::RequestFailed(e.to_string())
                }
            })?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(status_error(status, &self.model, &body));
        }

        let body: GenerateContentResponse = response
            .json()
            .await
            .map_err(|e| GatewayError::RequestFailed(format!("invalid response body: {e}")))?;

        if let Some(reason) = body.block_reason() {
            return Err(GatewayError::RequestFailed(format!(
                "prompt blocked: {}",
                reason
            )));
        }

        let text = body.text().ok_or(GatewayError::EmptyResponse)?;
        debug!(model = %self.model, reply_bytes = text.len(), "Gemini reply");
        Ok(text)
    }
}
