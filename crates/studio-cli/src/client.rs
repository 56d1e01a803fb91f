//! HTTP client for a running relay.

use studio_form::{GenerationRequest, GenerationResult};
use url::Url;

use crate::error::CliError;

pub struct RelayClient {
    http: reqwest::Client,
    base: Url,
}

impl RelayClient {
    pub fn new(base_url: &str) -> Result<Self, CliError> {
        let mut base = Url::parse(base_url).map_err(|source| CliError::RelayUrl {
            url: base_url.to_string(),
            source,
        })?;
        // `join` replaces the last segment unless the path ends in a slash.
        if !base.path().ends_with('/') {
            let path = format!("{}/", base.path());
            base.set_path(&path);
        }
        Ok(Self {
            http: reqwest::Client::new(),
            base,
        })
    }

    pub fn endpoint(&self, path: &str) -> Result<Url, CliError> {
        self.base.join(path).map_err(|source| CliError::RelayUrl {
            url: format!("{}{path}", self.base),
            source,
        })
    }

    /// `POST /generate`. Transport failures come back as a failed result,
    /// not an `Err`, so they can be shown like any other error.
    pub async fn generate(
        &self,
        request: &GenerationRequest,
    ) -> Result<GenerationResult, CliError> {
        let url = self.endpoint("generate")?;
        tracing::debug!(%url, model = %request.model, "sending generation request");

        let resp = match self.http.post(url).json(request).send().await {
            Ok(resp) => resp,
            Err(err) => return Ok(GenerationResult::network_error(err)),
        };
        let status = resp.status();
        let reason = status.canonical_reason().unwrap_or_default();
        Ok(match resp.bytes().await {
            Ok(body) => GenerationResult::from_response(status.as_u16(), reason, &body),
            Err(err) => GenerationResult::network_error(err),
        })
    }
}
