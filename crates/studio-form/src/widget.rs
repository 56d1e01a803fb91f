//! Maps a model's parameter schema to input widgets.

use serde::Serialize;
use studio_models::role::{self, effective_bounds};
use studio_models::{FieldKind, FieldValue, ModelDescriptor, classify};

use crate::form::{FormState, PromptMeter};

/// Everything a front end needs to draw the generation form.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FormLayout {
    /// Inline prompt editor; `None` when the model has no prompt-like field.
    pub prompt: Option<PromptWidget>,

    /// Whether the reference-image upload widget is shown.
    pub shows_reference_upload: bool,

    /// Remaining fields in display order.
    pub fields: Vec<FieldWidget>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PromptWidget {
    pub name: String,
    pub label: String,
    pub value: String,
    pub meter: Option<PromptMeter>,
    /// Inline validation message, if any.
    pub error: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FieldWidget {
    pub name: String,
    pub label: String,
    pub required: bool,
    pub description: Option<String>,
    pub widget: Widget,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Widget {
    Select {
        options: Vec<String>,
        selected: String,
    },
    TextArea {
        value: String,
    },
    Number {
        min: Option<f64>,
        max: Option<f64>,
        step: f64,
        /// `None` while the input is cleared.
        value: Option<f64>,
    },
}

/// Lay out the form for `model` with the values currently in `form`.
///
/// The prompt gets its own editor, reference-image fields are replaced by the
/// upload widget, and every other field becomes a plain widget.
pub fn layout(model: &ModelDescriptor, form: &FormState) -> FormLayout {
    let prompt_key = role::prompt_field(model);

    let prompt = prompt_key.map(|name| PromptWidget {
        name: name.to_string(),
        label: humanize(name),
        value: form.prompt().unwrap_or_default().to_string(),
        meter: form.prompt_meter(),
        error: form.prompt_error().map(|e| e.to_string()),
    });

    let fields = model
        .inputs
        .iter()
        .filter(|f| Some(f.name.as_str()) != prompt_key)
        .filter(|f| !classify(&f.name, &f.spec).reference_image)
        .map(|f| {
            let current = form.get(&f.name);
            let widget = match &f.spec.kind {
                FieldKind::String {
                    default,
                    enumeration: Some(options),
                } => Widget::Select {
                    selected: current
                        .and_then(FieldValue::as_str)
                        .map(str::to_string)
                        .or_else(|| default.clone())
                        .or_else(|| options.first().cloned())
                        .unwrap_or_default(),
                    options: options.clone(),
                },
                FieldKind::String { .. } => Widget::TextArea {
                    value: current
                        .and_then(FieldValue::as_str)
                        .unwrap_or_default()
                        .to_string(),
                },
                FieldKind::Integer { .. } | FieldKind::Float { .. } => {
                    let (min, max) = effective_bounds(&f.name, &f.spec).unwrap_or((None, None));
                    let step = if matches!(f.spec.kind, FieldKind::Integer { .. }) {
                        1.0
                    } else {
                        0.01
                    };
                    Widget::Number {
                        min,
                        max,
                        step,
                        value: current.and_then(FieldValue::as_f64),
                    }
                }
            };
            FieldWidget {
                name: f.name.clone(),
                label: humanize(&f.name),
                required: f.spec.required,
                description: f.spec.description.clone(),
                widget,
            }
        })
        .collect();

    FormLayout {
        prompt,
        shows_reference_upload: role::has_reference_image(model),
        fields,
    }
}

/// `num_outputs` → `Num Outputs`.
pub fn humanize(name: &str) -> String {
    name.split('_')
        .map(|word| {
            let mut chars = word.chars();
            match chars.next() {
                Some(first) => first.to_uppercase().chain(chars).collect(),
                None => String::new(),
            }
        })
        .collect::<Vec<_>>()
        .join(" ")
}
