/// Errors produced by the model catalog.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// No model with the given id is registered.
    #[error("model not found: {0}")]
    ModelNotFound(String),

    /// Two catalog entries share the same id.
    #[error("duplicate model id: {0}")]
    DuplicateModel(String),

    /// A field spec violates its own constraints (default outside the range,
    /// default not in the enumeration, ...).
    #[error("invalid field '{field}' on model '{model}': {reason}")]
    InvalidField {
        model: String,
        field: String,
        reason: String,
    },

    /// A model path is not of the form `owner/model[:version]`.
    #[error("invalid model path '{0}', expected 'owner/model' or 'owner/model:version'")]
    InvalidModelPath(String),

    /// Failed to parse a catalog document.
    #[error("failed to parse model catalog: {0}")]
    Parse(#[from] serde_json::Error),

    /// Failed to read a catalog file.
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, Error>;
