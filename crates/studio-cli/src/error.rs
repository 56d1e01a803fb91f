use studio_form::{FormError, SessionError, ValidationError};
use studio_relay::ProviderError;

/// Errors surfaced by the `studio` binary.
#[derive(Debug, thiserror::Error)]
pub enum CliError {
    #[error(transparent)]
    Catalog(#[from] studio_models::Error),

    #[error("provider setup failed: {0}")]
    Provider(#[from] ProviderError),

    #[error("invalid relay url '{url}': {source}")]
    RelayUrl {
        url: String,
        source: url::ParseError,
    },

    #[error("expected KEY=VALUE, got '{0}'")]
    Setting(String),

    #[error(transparent)]
    Form(#[from] FormError),

    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error(transparent)]
    Session(#[from] SessionError),

    /// The relay answered with an error; the message was already shown.
    #[error("generation failed: {0}")]
    Generation(String),

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}
