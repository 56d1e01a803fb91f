//! The relay: validate a request, forward it to the provider once, reshape
//! the answer.
//!
//! Each call moves through received → validated → in-flight → completed or
//! failed, and each step is logged. Nothing is shared between calls except
//! the provider's HTTP client.

use std::time::Instant;

use chrono::Utc;
use serde_json::{Map, Value};
use studio_models::ModelPath;

use crate::envelope::{Health, Invocation, ModelLookup, PredictionResponse, RunResponse, Timing};
use crate::error::{ProviderError, RelayError};
use crate::provider::Provider;

/// Credential and other per-deployment settings.
#[derive(Clone, Default)]
pub struct RelayConfig {
    pub api_token: Option<String>,
}

impl RelayConfig {
    pub fn new(api_token: impl Into<String>) -> Self {
        Self {
            api_token: Some(api_token.into()),
        }
    }

    /// Reads `REPLICATE_API_TOKEN`. An empty value counts as missing.
    pub fn from_env() -> Self {
        Self {
            api_token: std::env::var("REPLICATE_API_TOKEN")
                .ok()
                .filter(|t| !t.is_empty()),
        }
    }

    pub fn has_token(&self) -> bool {
        self.api_token.is_some()
    }
}

impl std::fmt::Debug for RelayConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RelayConfig")
            .field("api_token", &self.api_token.as_ref().map(|_| "<redacted>"))
            .finish()
    }
}

/// Stateless proxy in front of an inference [`Provider`].
#[derive(Debug)]
pub struct Relay {
    config: RelayConfig,
    provider: Provider,
}

impl Relay {
    pub fn new(config: RelayConfig, provider: Provider) -> Self {
        Self { config, provider }
    }

    /// Handle a `{ model, input }` body.
    pub async fn generate(&self, body: &[u8]) -> Result<PredictionResponse, RelayError> {
        tracing::debug!(bytes = body.len(), "generate request received");
        let token = self.token()?;
        let body = parse_object(body)?;

        let path = body
            .get("model")
            .and_then(Value::as_str)
            .and_then(|model| ModelPath::parse(model).ok())
            .ok_or(RelayError::InvalidModelPath)?;
        let input = input_object(body.get("input"))?;
        tracing::debug!(model = %path, "generate request validated");

        Ok(self.call(token, &path, input).await?.into())
    }

    /// Handle an `{ owner, model, input }` body.
    pub async fn run(&self, body: &[u8]) -> Result<RunResponse, RelayError> {
        tracing::debug!(bytes = body.len(), "run request received");
        let token = self.token()?;
        let body = parse_object(body)?;

        let owner = non_empty_str(body.get("owner")).ok_or(RelayError::MissingRunParams)?;
        let model = non_empty_str(body.get("model")).ok_or(RelayError::MissingRunParams)?;
        let path =
            ModelPath::parse(&format!("{owner}/{model}")).map_err(|_| RelayError::InvalidModelPath)?;
        let input = input_object(body.get("input"))?;
        tracing::debug!(model = %path, "run request validated");

        Ok(self.call(token, &path, input).await?.into())
    }

    /// Run an already-parsed request. The input must have at least one key.
    pub async fn invoke(
        &self,
        path: &ModelPath,
        input: &Map<String, Value>,
    ) -> Result<Invocation, RelayError> {
        let token = self.token()?;
        if input.is_empty() {
            return Err(RelayError::InvalidInput);
        }
        tracing::debug!(model = %path, "invocation validated");
        self.call(token, path, input).await
    }

    pub fn health(&self) -> Result<Health, RelayError> {
        self.token()?;
        Ok(Health {
            status: "ok",
            has_token: true,
        })
    }

    /// Check that `owner/model` exists upstream and report its latest version.
    pub async fn lookup(
        &self,
        owner: Option<&str>,
        model: Option<&str>,
    ) -> Result<ModelLookup, RelayError> {
        let token = self.token()?;
        let (Some(owner), Some(model)) = (
            owner.filter(|s| !s.is_empty()),
            model.filter(|s| !s.is_empty()),
        ) else {
            return Err(RelayError::MissingLookupParams);
        };

        match self.provider.model_info(token, owner, model).await {
            Ok(info) => Ok(ModelLookup {
                valid: true,
                model: info.name,
                latest_version: info.latest_version,
            }),
            Err(ProviderError::Api { status, body, .. }) => {
                tracing::warn!(%owner, %model, status, "model lookup rejected");
                Err(RelayError::Upstream { status, body })
            }
            Err(err) => {
                tracing::error!(%owner, %model, error = %err, "model lookup failed");
                Err(RelayError::Provider(err.to_string()))
            }
        }
    }

    // -- internals --

    fn token(&self) -> Result<&str, RelayError> {
        self.config
            .api_token
            .as_deref()
            .ok_or(RelayError::MissingCredential)
    }

    async fn call(
        &self,
        token: &str,
        path: &ModelPath,
        input: &Map<String, Value>,
    ) -> Result<Invocation, RelayError> {
        tracing::info!(
            model = %path,
            provider = self.provider.name(),
            fields = input.len(),
            "prediction in flight"
        );
        let started = Utc::now();
        let clock = Instant::now();
        let result = self.provider.run(token, path, input).await;
        let elapsed = clock.elapsed();
        let ended = Utc::now();

        match result {
            Ok(output) => {
                let status = output_status(&output);
                tracing::info!(
                    model = %path,
                    %status,
                    elapsed_ms = elapsed.as_millis() as u64,
                    "prediction completed"
                );
                Ok(Invocation {
                    timing: Timing::new(status, started, ended, elapsed.as_secs_f64()),
                    output,
                })
            }
            Err(err) => {
                tracing::error!(model = %path, error = %err, "prediction failed");
                Err(err.into())
            }
        }
    }
}

fn parse_object(body: &[u8]) -> Result<Map<String, Value>, RelayError> {
    match serde_json::from_slice(body) {
        Ok(Value::Object(map)) => Ok(map),
        _ => Err(RelayError::MalformedBody),
    }
}

fn non_empty_str(value: Option<&Value>) -> Option<&str> {
    value.and_then(Value::as_str).filter(|s| !s.is_empty())
}

fn input_object(value: Option<&Value>) -> Result<&Map<String, Value>, RelayError> {
    match value {
        Some(Value::Object(input)) if !input.is_empty() => Ok(input),
        _ => Err(RelayError::InvalidInput),
    }
}

/// The output's own `status`, stringified, or `"completed"`.
fn output_status(output: &Value) -> String {
    match output.get("status") {
        Some(Value::String(status)) => status.clone(),
        Some(other) => other.to_string(),
        None => "completed".into(),
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;
    use std::sync::atomic::{AtomicUsize, Ordering};

    use async_trait::async_trait;
    use serde_json::json;

    use super::*;
    use crate::provider::{InferenceBackend, ModelInfo};

    struct FakeBackend {
        calls: Arc<AtomicUsize>,
        output: Result<Value, String>,
    }

    #[async_trait]
    impl InferenceBackend for FakeBackend {
        fn name(&self) -> &str {
            "fake"
        }

        async fn run(
            &self,
            _token: &str,
            _model: &ModelPath,
            _input: &Map<String, Value>,
        ) -> Result<Value, ProviderError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            self.output.clone().map_err(|detail| ProviderError::Api {
                status: 422,
                body: json!({ "detail": &detail }).to_string(),
                detail: Some(detail),
            })
        }

        async fn model_info(
            &self,
            _token: &str,
            owner: &str,
            model: &str,
        ) -> Result<ModelInfo, ProviderError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            if owner == "missing" {
                return Err(ProviderError::Api {
                    status: 404,
                    body: r#"{"detail":"Not found."}"#.into(),
                    detail: Some("Not found.".into()),
                });
            }
            Ok(ModelInfo {
                name: model.to_string(),
                latest_version: Some("v2".into()),
            })
        }
    }

    fn relay(token: Option<&str>, output: Result<Value, String>) -> (Relay, Arc<AtomicUsize>) {
        let calls = Arc::new(AtomicUsize::new(0));
        let provider = Provider::new(FakeBackend {
            calls: Arc::clone(&calls),
            output,
        });
        let config = RelayConfig {
            api_token: token.map(str::to_string),
        };
        (Relay::new(config, provider), calls)
    }

    fn body(value: Value) -> Vec<u8> {
        value.to_string().into_bytes()
    }

    #[tokio::test]
    async fn generate_forwards_and_reshapes() {
        let output = json!({ "status": "succeeded", "output": ["https://cdn.example.com/1.png"] });
        let (relay, calls) = relay(Some("r8_test"), Ok(output.clone()));

        let response = relay
            .generate(&body(json!({
                "model": "stability-ai/sdxl",
                "input": { "prompt": "a red fox" }
            })))
            .await
            .expect("relay succeeds");

        assert_eq!(calls.load(Ordering::SeqCst), 1);
        assert_eq!(response.prediction, output);
        assert_eq!(response.timing.status, "succeeded");

        let duration = &response.timing.duration_in_seconds;
        let (whole, frac) = duration.split_once('.').expect("decimal point");
        assert!(whole.parse::<u64>().is_ok(), "{duration}");
        assert_eq!(frac.len(), 2, "{duration}");
        assert!(response.timing.started_at.ends_with('Z'));
    }

    #[tokio::test]
    async fn status_defaults_to_completed() {
        let (relay, _) = relay(Some("r8_test"), Ok(json!(["https://cdn.example.com/1.png"])));
        let response = relay
            .generate(&body(json!({
                "model": "stability-ai/sdxl:abc123",
                "input": { "prompt": "fox" }
            })))
            .await
            .expect("relay succeeds");
        assert_eq!(response.timing.status, "completed");
    }

    #[tokio::test]
    async fn missing_credential_is_checked_first() {
        let (relay, calls) = relay(None, Ok(json!(null)));
        let err = relay.generate(b"not json").await.expect_err("no token");
        assert_eq!(err, RelayError::MissingCredential);
        assert_eq!(err.status(), 500);
        assert_eq!(err.to_string(), "Missing REPLICATE_API_TOKEN in environment.");
        assert_eq!(relay.health(), Err(RelayError::MissingCredential));
        assert_eq!(calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn validation_failures_never_reach_the_provider() {
        let (relay, calls) = relay(Some("r8_test"), Ok(json!(null)));
        let cases = [
            (b"{not json".to_vec(), RelayError::MalformedBody),
            (body(json!([1, 2])), RelayError::MalformedBody),
            (
                body(json!({ "model": "bad-model-no-slash", "input": { "prompt": "x" } })),
                RelayError::InvalidModelPath,
            ),
            (
                body(json!({ "model": "sdxl", "input": "nope" })),
                RelayError::InvalidModelPath,
            ),
            (
                body(json!({ "model": "stability-ai/sdxl", "input": "nope" })),
                RelayError::InvalidInput,
            ),
            (
                body(json!({ "model": "stability-ai/sdxl", "input": {} })),
                RelayError::InvalidInput,
            ),
            (body(json!({ "model": "stability-ai/sdxl" })), RelayError::InvalidInput),
        ];

        for (request, expected) in cases {
            let err = relay.generate(&request).await.expect_err("invalid request");
            assert_eq!(err, expected);
            assert_eq!(err.status(), 400);
        }
        assert_eq!(calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn run_shape_requires_owner_and_model() {
        let (relay, calls) = relay(Some("r8_test"), Ok(json!("done")));

        let err = relay
            .run(&body(json!({ "owner": "", "model": "sdxl", "input": { "prompt": "x" } })))
            .await
            .expect_err("empty owner");
        assert_eq!(err, RelayError::MissingRunParams);
        assert_eq!(
            err.to_string(),
            "Missing required parameters: owner, model, and non-empty input"
        );
        assert_eq!(err.status(), 400);

        let err = relay
            .run(&body(json!({ "owner": "stability-ai", "input": { "prompt": "x" } })))
            .await
            .expect_err("missing model");
        assert_eq!(err, RelayError::MissingRunParams);

        let err = relay.run(b"{not json").await.expect_err("malformed");
        assert_eq!(err, RelayError::MalformedBody);
        assert_eq!(calls.load(Ordering::SeqCst), 0);

        let response = relay
            .run(&body(json!({
                "owner": "stability-ai",
                "model": "sdxl",
                "input": { "prompt": "x" }
            })))
            .await
            .expect("valid run");
        assert_eq!(response.output, json!("done"));
        assert_eq!(response.timing.status, "completed");
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn provider_detail_becomes_the_error() {
        let (relay, calls) = relay(Some("r8_test"), Err("Invalid version or not permitted".into()));
        let err = relay
            .generate(&body(json!({
                "model": "stability-ai/sdxl:abc123",
                "input": { "prompt": "fox" }
            })))
            .await
            .expect_err("provider fails");
        assert_eq!(err, RelayError::Provider("Invalid version or not permitted".into()));
        assert_eq!(err.status(), 500);
        assert_eq!(calls.load(Ordering::SeqCst), 1, "no retry");
    }

    #[tokio::test]
    async fn invoke_requires_input() {
        let (relay, calls) = relay(Some("r8_test"), Ok(json!({ "status": 3 })));
        let path = ModelPath::parse("acme/counter").expect("path");

        assert_eq!(
            relay.invoke(&path, &Map::new()).await,
            Err(RelayError::InvalidInput)
        );
        let input = Map::from_iter([("n".to_string(), json!(1))]);
        let invocation = relay.invoke(&path, &input).await.expect("invoke");
        assert_eq!(invocation.timing.status, "3");
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn health_and_lookup() {
        let (relay, _) = relay(Some("r8_test"), Ok(json!(null)));
        assert_eq!(
            relay.health(),
            Ok(Health {
                status: "ok",
                has_token: true
            })
        );

        let found = relay
            .lookup(Some("stability-ai"), Some("sdxl"))
            .await
            .expect("lookup");
        assert_eq!(found.model, "sdxl");
        assert_eq!(found.latest_version.as_deref(), Some("v2"));

        assert_eq!(
            relay.lookup(Some("stability-ai"), None).await,
            Err(RelayError::MissingLookupParams)
        );

        let err = relay
            .lookup(Some("missing"), Some("model"))
            .await
            .expect_err("upstream 404");
        assert_eq!(err.status(), 404);
        assert_eq!(err.to_string(), r#"{"detail":"Not found."}"#);
    }
}
