use studio_models::ValueType;

/// Errors from editing a [`FormState`](crate::FormState).
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum FormError {
    #[error("unknown field: {0}")]
    UnknownField(String),

    #[error("field '{field}' expects a {expected} value, got {found}")]
    TypeMismatch {
        field: String,
        expected: ValueType,
        found: ValueType,
    },

    #[error("'{value}' is not a valid {expected} for field '{field}'")]
    InvalidNumber {
        field: String,
        expected: ValueType,
        value: String,
    },

    #[error("'{value}' is not one of the options for field '{field}'")]
    NotAnOption { field: String, value: String },

    #[error("model '{0}' takes no reference images")]
    NoReferenceInput(String),

    #[error("at most {0} reference images can be attached")]
    TooManyReferences(usize),
}

/// Errors from turning a form into a request.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ValidationError {
    #[error("Prompt cannot be empty")]
    EmptyPrompt,

    #[error("Prompt cannot exceed {max} characters ({len} given)")]
    PromptTooLong { len: usize, max: usize },

    #[error("form belongs to model '{found}', not '{expected}'")]
    ModelMismatch { expected: String, found: String },
}

/// Errors from the single-flight generation session.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum SessionError {
    #[error("a generation is already in progress")]
    Busy,
}
