/// Message used when a provider failure carries nothing readable.
pub const FALLBACK_MESSAGE: &str = "An unexpected error occurred.";

/// Errors raised by an inference provider backend.
#[derive(Debug, thiserror::Error)]
pub enum ProviderError {
    #[error("http error: {0}")]
    Http(Box<dyn std::error::Error + Send + Sync>),

    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),

    /// Non-success HTTP status. `detail` is the `detail` field of the body,
    /// when the body is JSON and has one.
    #[error("api error ({status}): {body}")]
    Api {
        status: u16,
        body: String,
        detail: Option<String>,
    },

    /// The prediction reached a terminal state other than success.
    #[error("prediction {status}: {}", .message.as_deref().unwrap_or("no error reported"))]
    Prediction {
        status: String,
        message: Option<String>,
    },

    #[error("{0}")]
    Other(String),
}

impl ProviderError {
    /// The message shown to callers: the provider's nested `detail`, else
    /// this error's own message, else [`FALLBACK_MESSAGE`].
    pub fn user_message(&self) -> String {
        let detail = match self {
            ProviderError::Api { detail, .. } => detail.as_deref(),
            ProviderError::Prediction { message, .. } => message.as_deref(),
            _ => None,
        };
        match detail.filter(|d| !d.is_empty()) {
            Some(detail) => detail.to_string(),
            None => {
                let message = self.to_string();
                if message.trim().is_empty() {
                    FALLBACK_MESSAGE.to_string()
                } else {
                    message
                }
            }
        }
    }
}

/// Broad classes of relay failure.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// Server misconfiguration.
    Configuration,
    /// The caller sent something unusable.
    Validation,
    /// The provider failed or was unreachable.
    Provider,
}

/// Errors returned by [`Relay`](crate::Relay) operations.
///
/// The `Display` text is exactly what callers see in `{ "error": ... }`.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum RelayError {
    #[error("Missing REPLICATE_API_TOKEN in environment.")]
    MissingCredential,

    #[error("Invalid JSON format.")]
    MalformedBody,

    #[error("Invalid model format. Use \"owner/model\" or \"owner/model:version\".")]
    InvalidModelPath,

    #[error("Invalid input format.")]
    InvalidInput,

    #[error("Missing required parameters: owner, model, and non-empty input")]
    MissingRunParams,

    #[error("Missing owner or model parameter")]
    MissingLookupParams,

    #[error("{0}")]
    Provider(String),

    /// The provider answered a metadata lookup with an error status; the raw
    /// body is passed through.
    #[error("{body}")]
    Upstream { status: u16, body: String },
}

impl RelayError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            RelayError::MissingCredential => ErrorKind::Configuration,
            RelayError::MalformedBody
            | RelayError::InvalidModelPath
            | RelayError::InvalidInput
            | RelayError::MissingRunParams
            | RelayError::MissingLookupParams => ErrorKind::Validation,
            RelayError::Provider(_) | RelayError::Upstream { .. } => ErrorKind::Provider,
        }
    }

    /// HTTP status code for this error.
    pub fn status(&self) -> u16 {
        match self {
            RelayError::Upstream { status, .. } => *status,
            _ => match self.kind() {
                ErrorKind::Validation => 400,
                ErrorKind::Configuration | ErrorKind::Provider => 500,
            },
        }
    }
}

impl From<ProviderError> for RelayError {
    fn from(err: ProviderError) -> Self {
        RelayError::Provider(err.user_message())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn user_message_prefers_detail() {
        let err = ProviderError::Api {
            status: 422,
            body: r#"{"detail":"Invalid version"}"#.into(),
            detail: Some("Invalid version".into()),
        };
        assert_eq!(err.user_message(), "Invalid version");

        let err = ProviderError::Api {
            status: 502,
            body: "bad gateway".into(),
            detail: None,
        };
        assert_eq!(err.user_message(), "api error (502): bad gateway");

        let err = ProviderError::Prediction {
            status: "failed".into(),
            message: Some("CUDA out of memory".into()),
        };
        assert_eq!(err.user_message(), "CUDA out of memory");

        assert_eq!(ProviderError::Other(String::new()).user_message(), FALLBACK_MESSAGE);
    }

    #[test]
    fn status_codes() {
        assert_eq!(RelayError::MissingCredential.status(), 500);
        assert_eq!(RelayError::MalformedBody.status(), 400);
        assert_eq!(RelayError::InvalidModelPath.status(), 400);
        assert_eq!(RelayError::InvalidInput.status(), 400);
        assert_eq!(RelayError::MissingRunParams.status(), 400);
        assert_eq!(RelayError::Provider("x".into()).status(), 500);
        let upstream = RelayError::Upstream {
            status: 404,
            body: "not found".into(),
        };
        assert_eq!(upstream.status(), 404);
        assert_eq!(upstream.kind(), ErrorKind::Provider);
    }
}
