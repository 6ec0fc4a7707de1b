//! Downstream generation service seam.
//!
//! The service is an opaque HTTP endpoint: it receives the bound payload and
//! returns generated outputs. Timeouts, auth, and retries belong to it; from
//! here every transport or non-2xx failure is `UpstreamUnavailable`.

use async_trait::async_trait;
use serde_json::Value;
use std::time::Duration;

use crate::error::FlowError;

#[async_trait]
pub trait GenerationBackend: Send + Sync {
    /// Submit one bound payload and wait for its outputs.
    async fn generate(&self, payload: &Value) -> Result<Value, FlowError>;
}

#[derive(Debug, Clone)]
pub struct HttpBackendConfig {
    pub endpoint: String,
    pub timeout: Duration,
    pub pool_max_idle_per_host: usize,
}

impl Default for HttpBackendConfig {
    fn default() -> Self {
        Self {
            endpoint: "http://127.0.0.1:8188/prompt".to_string(),
            timeout: Duration::from_secs(120),
            pool_max_idle_per_host: 10,
        }
    }
}

/// Pooled reqwest client against one generation endpoint.
#[derive(Debug, Clone)]
pub struct HttpGenerationBackend {
    client: reqwest::Client,
    endpoint: String,
}

impl HttpGenerationBackend {
    pub fn new(config: HttpBackendConfig) -> Result<Self, FlowError> {
        let client = reqwest::Client::builder()
            .timeout(config.timeout)
            .pool_max_idle_per_host(config.pool_max_idle_per_host)
            .build()
            .map_err(|e| FlowError::Internal(format!("http client: {e}")))?;
        Ok(Self {
            client,
            endpoint: config.endpoint,
        })
    }
}

#[async_trait]
impl GenerationBackend for HttpGenerationBackend {
    async fn generate(&self, payload: &Value) -> Result<Value, FlowError> {
        let response = self
            .client
            .post(&self.endpoint)
            .json(payload)
            .send()
            .await
            .map_err(|e| FlowError::UpstreamUnavailable(e.to_string()))?;
        let status = response.status();
        if !status.is_success() {
            return Err(FlowError::UpstreamUnavailable(format!(
                "upstream returned {status}"
            )));
        }
        response
            .json()
            .await
            .map_err(|e| FlowError::UpstreamUnavailable(format!("invalid upstream body: {e}")))
    }
}
