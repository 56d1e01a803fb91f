//! Turns form state into the relay's request payload.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use studio_models::{ModelDescriptor, classify};

use crate::error::ValidationError;
use crate::form::FormState;

/// Maximum prompt length, in characters, after trimming.
pub const PROMPT_MAX_CHARS: usize = 500;

/// Body of `POST /generate`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GenerationRequest {
    /// Model path, `owner/model[:version]`.
    pub model: String,
    pub input: Map<String, Value>,
}

/// Check a prompt the way the submit button does.
pub fn validate_prompt(prompt: &str) -> Result<(), ValidationError> {
    let trimmed = prompt.trim();
    if trimmed.is_empty() {
        return Err(ValidationError::EmptyPrompt);
    }
    let len = trimmed.chars().count();
    if len > PROMPT_MAX_CHARS {
        return Err(ValidationError::PromptTooLong {
            len,
            max: PROMPT_MAX_CHARS,
        });
    }
    Ok(())
}

/// Build the request for `model` from `form`.
///
/// Undefined values and empty strings are left out, as are reference-image
/// fields. No other semantic checks happen here; the provider validates.
pub fn build(model: &ModelDescriptor, form: &FormState) -> Result<GenerationRequest, ValidationError> {
    if form.model_id() != model.id {
        return Err(ValidationError::ModelMismatch {
            expected: model.id.clone(),
            found: form.model_id().to_string(),
        });
    }
    if let Some(prompt) = form.prompt() {
        validate_prompt(prompt)?;
    }

    let input = form
        .values()
        .filter_map(|(name, value)| Some((name, value?)))
        .filter(|(_, value)| !value.is_empty())
        .filter(|(name, _)| {
            form.spec(name)
                .is_none_or(|spec| !classify(name, spec).reference_image)
        })
        .map(|(name, value)| (name.to_string(), value.to_json()))
        .collect();

    Ok(GenerationRequest {
        model: model.model_path(),
        input,
    })
}
