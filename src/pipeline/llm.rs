//! Inference: one blocking request/response exchange with the local model.
//!
//! The wire surface is Ollama's generate API:
//!
//! ```text
//! POST {endpoint}            (default http://localhost:11434/api/generate)
//! {"model": "...", "prompt": "...", "stream": false}
//! → {"response": "...", ...}
//! ```
//!
//! ## Error mapping
//!
//! | Condition | Error |
//! |-----------|-------|
//! | connection refused / host unreachable | [`DocSumError::ServiceUnavailable`] |
//! | timeout, other transport error, non-2xx, undecodable body | [`DocSumError::RequestFailed`] |
//! | 2xx with blank `response` | [`DocSumError::EmptyResponse`] |
//!
//! There is no retry: the request either completes, times out, or fails,
//! and the caller sees exactly that.

use crate::config::SummarizerConfig;
use crate::error::DocSumError;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::time::{Duration, Instant};
use tracing::{debug, info};

/// Something that turns a prompt into generated text.
///
/// [`OllamaClient`] is the production implementation; tests inject scripted
/// backends through [`crate::config::SummarizerConfig::backend`].
#[async_trait]
pub trait InferenceBackend: Send + Sync {
    /// Generate a complete (non-streamed) response for `prompt`.
    async fn generate(&self, model: &str, prompt: &str) -> Result<String, DocSumError>;
}

#[derive(Serialize)]
struct GenerateRequest<'a> {
    model: &'a str,
    prompt: &'a str,
    stream: bool,
}

#[derive(Deserialize)]
struct GenerateResponse {
    #[serde(default)]
    response: String,
}

/// HTTP client for a local Ollama server.
#[derive(Debug, Clone)]
pub struct OllamaClient {
    client: reqwest::Client,
    endpoint: String,
}

impl OllamaClient {
    /// Create a client for `endpoint` with a whole-request timeout.
    pub fn new(endpoint: impl Into<String>, timeout: Duration) -> Result<Self, DocSumError> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| DocSumError::Internal(format!("Failed to build HTTP client: {}", e)))?;

        Ok(Self {
            client,
            endpoint: endpoint.into(),
        })
    }

    /// Create a client from the endpoint and timeout in `config`.
    pub fn from_config(config: &SummarizerConfig) -> Result<Self, DocSumError> {
        Self::new(
            config.endpoint.clone(),
            Duration::from_secs(config.request_timeout_secs),
        )
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    fn map_transport_error(&self, e: reqwest::Error) -> DocSumError {
        if e.is_connect() {
            DocSumError::ServiceUnavailable {
                endpoint: self.endpoint.clone(),
            }
        } else if e.is_timeout() {
            DocSumError::RequestFailed {
                detail: format!("request to {} timed out: {}", self.endpoint, e),
            }
        } else {
            DocSumError::RequestFailed {
                detail: e.to_string(),
            }
        }
    }
}

#[async_trait]
impl InferenceBackend for OllamaClient {
    async fn generate(&self, model: &str, prompt: &str) -> Result<String, DocSumError> {
        let start = Instant::now();
        info!("Sending {} prompt chars to model '{}'", prompt.len(), model);

        let body = GenerateRequest {
            model,
            prompt,
            stream: false,
        };

        let response = self
            .client
            .post(&self.endpoint)
            .json(&body)
            .send()
            .await
            .map_err(|e| self.map_transport_error(e))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(DocSumError::RequestFailed {
                detail: format!("HTTP {}: {}", status, body.trim()),
            });
        }

        let parsed: GenerateResponse = response
            .json()
            .await
            .map_err(|e| self.map_transport_error(e))?;

        debug!(
            "Model '{}' returned {} chars in {:?}",
            model,
            parsed.response.len(),
            start.elapsed()
        );

        if parsed.response.trim().is_empty() {
            return Err(DocSumError::EmptyResponse);
        }
        Ok(parsed.response)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn request_body_shape() {
        let body = GenerateRequest {
            model: "llama3.2:3b",
            prompt: "hi",
            stream: false,
        };
        let json = serde_json::to_value(&body).unwrap();
        assert_eq!(
            json,
            serde_json::json!({"model": "llama3.2:3b", "prompt": "hi", "stream": false})
        );
    }

    #[test]
    fn response_ignores_extra_fields() {
        let r: GenerateResponse = serde_json::from_str(
            r#"{"model":"m","response":"text","done":true,"eval_count":12}"#,
        )
        .unwrap();
        assert_eq!(r.response, "text");
    }

    #[test]
    fn missing_response_field_is_empty() {
        let r: GenerateResponse = serde_json::from_str(r#"{"done":true}"#).unwrap();
        assert!(r.response.is_empty());
    }

    #[test]
    fn from_config_uses_endpoint() {
        let config = SummarizerConfig::builder()
            .endpoint("http://127.0.0.1:9/api/generate")
            .build()
            .unwrap();
        let client = OllamaClient::from_config(&config).unwrap();
        assert_eq!(client.endpoint(), "http://127.0.0.1:9/api/generate");
    }

    #[test]
    fn refused_connection_is_service_unavailable() {
        // Bind then drop to get a port with nothing listening on it.
        let port = std::net::TcpListener::bind("127.0.0.1:0")
            .unwrap()
            .local_addr()
            .unwrap()
            .port();
        let client = OllamaClient::new(
            format!("http://127.0.0.1:{port}/api/generate"),
            Duration::from_secs(5),
        )
        .unwrap();

        let err = tokio_test::block_on(client.generate("m", "p")).unwrap_err();
        assert!(
            matches!(err, DocSumError::ServiceUnavailable { .. }),
            "got {err:?}"
        );
    }
}
