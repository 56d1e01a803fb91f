//! Replicate backend.
//!
//! Creates a prediction with `Prefer: wait` and, when the API hands back a
//! prediction that is still running, polls its `urls.get` until it reaches a
//! terminal state. That is the provider's synchronous `run`, not a retry.

mod types;

use std::time::Duration;

use async_trait::async_trait;
use serde::de::DeserializeOwned;
use serde_json::{Map, Value};
use studio_models::ModelPath;
use url::Url;

use crate::error::ProviderError;
use crate::provider::{InferenceBackend, ModelInfo, Provider};
use types::{ApiErrorBody, CreatePrediction, ModelResponse, Prediction};

pub const DEFAULT_BASE_URL: &str = "https://api.replicate.com/v1";

const POLL_INTERVAL: Duration = Duration::from_millis(500);

// ---------------------------------------------------------------------------
// Public API
// ---------------------------------------------------------------------------

/// Configuration for the Replicate provider.
#[derive(Debug, Clone)]
pub struct ReplicateConfig {
    pub base_url: String,
}

impl Default for ReplicateConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.into(),
        }
    }
}

impl ReplicateConfig {
    /// Reads `REPLICATE_API_BASE`, falling back to the public API.
    pub fn from_env() -> Self {
        match std::env::var("REPLICATE_API_BASE") {
            Ok(base_url) if !base_url.trim().is_empty() => Self { base_url },
            _ => Self::default(),
        }
    }
}

/// Create a Replicate provider with the given config.
pub fn provider(config: ReplicateConfig) -> Result<Provider, ProviderError> {
    Ok(Provider::new(ReplicateBackend::new(config)?))
}

// ---------------------------------------------------------------------------
// Internals
// ---------------------------------------------------------------------------

struct ReplicateBackend {
    client: reqwest::Client,
    base_url: Url,
}

impl ReplicateBackend {
    fn new(config: ReplicateConfig) -> Result<Self, ProviderError> {
        let base_url = Url::parse(&config.base_url)
            .map_err(|e| ProviderError::Other(format!("invalid base url '{}': {e}", config.base_url)))?;
        if base_url.cannot_be_a_base() {
            return Err(ProviderError::Other(format!(
                "invalid base url '{}'",
                config.base_url
            )));
        }
        Ok(Self {
            client: reqwest::Client::new(),
            base_url,
        })
    }

    /// `base_url` with `segments` appended, each percent-encoded.
    fn endpoint(&self, segments: &[&str]) -> Url {
        let mut url = self.base_url.clone();
        if let Ok(mut path) = url.path_segments_mut() {
            path.pop_if_empty().extend(segments);
        }
        url
    }

    fn prediction_endpoint(&self, model: &ModelPath) -> Url {
        match model.version() {
            Some(_) => self.endpoint(&["predictions"]),
            None => self.endpoint(&["models", model.owner(), model.model(), "predictions"]),
        }
    }
}

#[async_trait]
impl InferenceBackend for ReplicateBackend {
    fn name(&self) -> &str {
        "replicate"
    }

    async fn run(
        &self,
        token: &str,
        model: &ModelPath,
        input: &Map<String, Value>,
    ) -> Result<Value, ProviderError> {
        let body = CreatePrediction {
            version: model.version(),
            input,
        };
        let resp = self
            .client
            .post(self.prediction_endpoint(model))
            .bearer_auth(token)
            .header("Prefer", "wait")
            .json(&body)
            .send()
            .await
            .map_err(|e| ProviderError::Http(Box::new(e)))?;
        let mut prediction: Prediction = read_json(resp).await?;

        while !prediction.is_terminal() {
            let poll_url = prediction.poll_url().map(str::to_string).ok_or_else(|| {
                ProviderError::Other(format!(
                    "prediction {} is {} but has no status url",
                    prediction.id.as_deref().unwrap_or("<unknown>"),
                    prediction.status
                ))
            })?;
            tokio::time::sleep(POLL_INTERVAL).await;
            tracing::debug!(url = %poll_url, status = %prediction.status, "polling prediction");

            let resp = self
                .client
                .get(&poll_url)
                .bearer_auth(token)
                .send()
                .await
                .map_err(|e| ProviderError::Http(Box::new(e)))?;
            prediction = read_json(resp).await?;
        }

        if prediction.status == "succeeded" {
            return Ok(prediction.output.unwrap_or(Value::Null));
        }
        Err(ProviderError::Prediction {
            message: prediction.error_message(),
            status: prediction.status,
        })
    }

    async fn model_info(
        &self,
        token: &str,
        owner: &str,
        model: &str,
    ) -> Result<ModelInfo, ProviderError> {
        let resp = self
            .client
            .get(self.endpoint(&["models", owner, model]))
            .header("Authorization", format!("Token {token}"))
            .send()
            .await
            .map_err(|e| ProviderError::Http(Box::new(e)))?;
        let data: ModelResponse = read_json(resp).await?;
        Ok(ModelInfo {
            name: data.name,
            latest_version: data.latest_version.map(|v| v.id),
        })
    }
}

/// Decode a success body, or turn an error status into [`ProviderError::Api`].
async fn read_json<T: DeserializeOwned>(resp: reqwest::Response) -> Result<T, ProviderError> {
    let status = resp.status();
    let body = resp
        .text()
        .await
        .map_err(|e| ProviderError::Http(Box::new(e)))?;

    if !status.is_success() {
        let detail = serde_json::from_str::<ApiErrorBody>(&body)
            .ok()
            .and_then(|b| b.detail);
        return Err(ProviderError::Api {
            status: status.as_u16(),
            body,
            detail,
        });
    }
    Ok(serde_json::from_str(&body)?)
}
