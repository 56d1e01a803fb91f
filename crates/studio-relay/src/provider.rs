use async_trait::async_trait;
use serde_json::{Map, Value};
use studio_models::ModelPath;

use crate::error::ProviderError;

/// Metadata about a hosted model.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ModelInfo {
    pub name: String,
    pub latest_version: Option<String>,
}

/// A concrete, type-erased inference provider.
///
/// Wraps an [`InferenceBackend`] behind a `Box<dyn ...>` so the relay never
/// needs generic parameters.
pub struct Provider {
    inner: Box<dyn InferenceBackend>,
}

impl Provider {
    /// Wrap any backend implementation into a provider.
    pub fn new(backend: impl InferenceBackend + 'static) -> Self {
        Self {
            inner: Box::new(backend),
        }
    }

    /// The provider name (e.g. `"replicate"`).
    pub fn name(&self) -> &str {
        self.inner.name()
    }

    /// Run one prediction to completion and return its output.
    pub async fn run(
        &self,
        token: &str,
        model: &ModelPath,
        input: &Map<String, Value>,
    ) -> Result<Value, ProviderError> {
        self.inner.run(token, model, input).await
    }

    pub async fn model_info(
        &self,
        token: &str,
        owner: &str,
        model: &str,
    ) -> Result<ModelInfo, ProviderError> {
        self.inner.model_info(token, owner, model).await
    }
}

impl std::fmt::Debug for Provider {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Provider").field("name", &self.name()).finish()
    }
}

/// Trait that provider backends implement.
#[async_trait]
pub trait InferenceBackend: Send + Sync {
    fn name(&self) -> &str;

    async fn run(
        &self,
        token: &str,
        model: &ModelPath,
        input: &Map<String, Value>,
    ) -> Result<Value, ProviderError>;

    async fn model_info(
        &self,
        token: &str,
        owner: &str,
        model: &str,
    ) -> Result<ModelInfo, ProviderError>;
}
