//! Editable form state derived from a model's parameter schema.

use serde::ser::SerializeMap;
use serde::{Serialize, Serializer};
use studio_models::role::{self, MAX_OUTPUTS, MIN_OUTPUTS};
use studio_models::{FieldKind, FieldSpec, FieldValue, ModelDescriptor, ValueType, classify};

use crate::builder::{self, PROMPT_MAX_CHARS};
use crate::error::{FormError, ValidationError};

/// Reference images a form can hold.
pub const MAX_REFERENCES: usize = 4;

/// Character count above which the prompt meter turns to a warning.
const PROMPT_WARN_CHARS: usize = 450;

/// One field's spec and current value.
#[derive(Debug, Clone, PartialEq)]
struct FormField {
    name: String,
    spec: FieldSpec,
    value: Option<FieldValue>,
}

/// Client-local state of one generation form.
///
/// Holds exactly one slot per schema field, in display order. A slot is
/// `None` when the user cleared a numeric input.
#[derive(Debug, Clone, PartialEq)]
pub struct FormState {
    model_id: String,
    fields: Vec<FormField>,
    prompt_key: Option<String>,
    reference_input: bool,
    references: Vec<String>,
}

/// Prompt length indicator shown next to the inline prompt editor.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct PromptMeter {
    pub len: usize,
    pub limit: usize,
    pub level: MeterLevel,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum MeterLevel {
    Normal,
    Warning,
    Over,
}

impl FormState {
    /// Initialize every field: its default if declared, otherwise the empty
    /// string for strings, otherwise the minimum, otherwise zero.
    pub fn from_descriptor(model: &ModelDescriptor) -> Self {
        let fields = model
            .inputs
            .iter()
            .map(|field| FormField {
                name: field.name.clone(),
                spec: field.spec.clone(),
                value: Some(initial_value(&field.spec)),
            })
            .collect();

        Self {
            model_id: model.id.clone(),
            fields,
            prompt_key: role::prompt_field(model).map(str::to_string),
            reference_input: role::has_reference_image(model),
            references: Vec::new(),
        }
    }

    /// Catalog id of the model this form was built for.
    pub fn model_id(&self) -> &str {
        &self.model_id
    }

    pub fn get(&self, name: &str) -> Option<&FieldValue> {
        self.field(name)?.value.as_ref()
    }

    pub fn contains(&self, name: &str) -> bool {
        self.field(name).is_some()
    }

    /// Fields and their current values, in display order.
    pub fn values(&self) -> impl Iterator<Item = (&str, Option<&FieldValue>)> {
        self.fields.iter().map(|f| (f.name.as_str(), f.value.as_ref()))
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    /// Set a typed value.
    ///
    /// Integers are accepted for float fields. Output-count fields are
    /// clamped into `1..=4`. Enumerated strings must be one of the options.
    pub fn set(&mut self, name: &str, value: impl Into<FieldValue>) -> Result<(), FormError> {
        let value = value.into();
        let field = self
            .field_mut(name)
            .ok_or_else(|| FormError::UnknownField(name.to_string()))?;
        let class = classify(&field.name, &field.spec);

        let value = match (&field.spec.kind, value) {
            (FieldKind::String { enumeration, .. }, FieldValue::String(s)) => {
                if let Some(options) = enumeration
                    && !options.contains(&s)
                {
                    return Err(FormError::NotAnOption {
                        field: field.name.clone(),
                        value: s,
                    });
                }
                FieldValue::String(s)
            }
            (FieldKind::Integer { .. }, FieldValue::Integer(n)) if class.output_count => {
                FieldValue::Integer(n.clamp(MIN_OUTPUTS as i64, MAX_OUTPUTS as i64))
            }
            (FieldKind::Integer { .. }, FieldValue::Integer(n)) => FieldValue::Integer(n),
            (FieldKind::Float { .. }, FieldValue::Integer(n)) => {
                clamp_float(n as f64, class.output_count)
            }
            (FieldKind::Float { .. }, FieldValue::Float(n)) => clamp_float(n, class.output_count),
            (_, other) => {
                return Err(FormError::TypeMismatch {
                    field: field.name.clone(),
                    expected: field.spec.value_type(),
                    found: other.value_type(),
                });
            }
        };

        field.value = Some(value);
        Ok(())
    }

    /// Set a value from user-typed text, parsed per the field's type.
    ///
    /// Empty text on a numeric field leaves it undefined.
    pub fn set_raw(&mut self, name: &str, text: &str) -> Result<(), FormError> {
        let field = self
            .field(name)
            .ok_or_else(|| FormError::UnknownField(name.to_string()))?;
        let expected = field.spec.value_type();
        let invalid = || FormError::InvalidNumber {
            field: name.to_string(),
            expected,
            value: text.to_string(),
        };

        match expected {
            ValueType::String => self.set(name, text),
            _ if text.trim().is_empty() => self.clear(name),
            ValueType::Integer => {
                let n: i64 = text.trim().parse().map_err(|_| invalid())?;
                self.set(name, n)
            }
            ValueType::Float => {
                let n: f64 = text.trim().parse().map_err(|_| invalid())?;
                if !n.is_finite() {
                    return Err(invalid());
                }
                self.set(name, n)
            }
        }
    }

    /// Mark a field undefined.
    pub fn clear(&mut self, name: &str) -> Result<(), FormError> {
        let field = self
            .field_mut(name)
            .ok_or_else(|| FormError::UnknownField(name.to_string()))?;
        field.value = None;
        Ok(())
    }

    // -- prompt --

    /// Name of the field treated as the prompt, if the model has one.
    pub fn prompt_key(&self) -> Option<&str> {
        self.prompt_key.as_deref()
    }

    /// Current prompt text; empty when unset.
    pub fn prompt(&self) -> Option<&str> {
        let key = self.prompt_key.as_deref()?;
        Some(self.get(key).and_then(FieldValue::as_str).unwrap_or(""))
    }

    pub fn set_prompt(&mut self, text: &str) -> Result<(), FormError> {
        match self.prompt_key.clone() {
            Some(key) => self.set(&key, text),
            None => Err(FormError::UnknownField("prompt".into())),
        }
    }

    pub fn prompt_meter(&self) -> Option<PromptMeter> {
        let len = self.prompt()?.chars().count();
        let level = if len > PROMPT_MAX_CHARS {
            MeterLevel::Over
        } else if len > PROMPT_WARN_CHARS {
            MeterLevel::Warning
        } else {
            MeterLevel::Normal
        };
        Some(PromptMeter {
            len,
            limit: PROMPT_MAX_CHARS,
            level,
        })
    }

    /// Inline validation message for the prompt editor.
    pub fn prompt_error(&self) -> Option<ValidationError> {
        builder::validate_prompt(self.prompt()?).err()
    }

    /// Whether the submit control should be enabled (ignoring the busy flag).
    pub fn can_submit(&self) -> bool {
        self.prompt_error().is_none()
    }

    // -- reference images --

    /// Whether this model shows the reference-image upload widget.
    pub fn accepts_references(&self) -> bool {
        self.reference_input
    }

    /// Attached reference images (data URLs or links). Not part of the
    /// request payload.
    pub fn references(&self) -> &[String] {
        &self.references
    }

    pub fn add_reference(&mut self, data: impl Into<String>) -> Result<(), FormError> {
        if !self.reference_input {
            return Err(FormError::NoReferenceInput(self.model_id.clone()));
        }
        if self.references.len() >= MAX_REFERENCES {
            return Err(FormError::TooManyReferences(MAX_REFERENCES));
        }
        self.references.push(data.into());
        Ok(())
    }

    pub fn remove_reference(&mut self, index: usize) -> Option<String> {
        (index < self.references.len()).then(|| self.references.remove(index))
    }

    // -- internals --

    pub(crate) fn spec(&self, name: &str) -> Option<&FieldSpec> {
        self.field(name).map(|f| &f.spec)
    }

    fn field(&self, name: &str) -> Option<&FormField> {
        self.fields.iter().find(|f| f.name == name)
    }

    fn field_mut(&mut self, name: &str) -> Option<&mut FormField> {
        self.fields.iter_mut().find(|f| f.name == name)
    }
}

/// Serializes as an object of field name to value (`null` when undefined).
impl Serialize for FormState {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.fields.len()))?;
        for field in &self.fields {
            map.serialize_entry(&field.name, &field.value)?;
        }
        map.end()
    }
}

fn initial_value(spec: &FieldSpec) -> FieldValue {
    if let Some(default) = spec.default_value() {
        return default;
    }
    match &spec.kind {
        FieldKind::String { .. } => FieldValue::String(String::new()),
        FieldKind::Integer { minimum, .. } => FieldValue::Integer(minimum.unwrap_or(0)),
        FieldKind::Float { minimum, .. } => FieldValue::Float(minimum.unwrap_or(0.0)),
    }
}

fn clamp_float(n: f64, output_count: bool) -> FieldValue {
    if output_count {
        FieldValue::Float(n.clamp(MIN_OUTPUTS, MAX_OUTPUTS))
    } else {
        FieldValue::Float(n)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use studio_models::{InputFields, OutputKind, Registry};

    fn model(inputs: InputFields) -> ModelDescriptor {
        ModelDescriptor {
            id: "test".into(),
            name: "Test".into(),
            description: String::new(),
            owner: "acme".into(),
            model_name: "gen".into(),
            version: None,
            inputs,
            output_kind: OutputKind::Image,
        }
    }

    #[test]
    fn every_field_gets_exactly_one_typed_value() {
        for model in Registry::builtin().list() {
            let form = FormState::from_descriptor(model);
            assert_eq!(form.len(), model.inputs.len(), "model {}", model.id);
            for field in model.inputs.iter() {
                let value = form.get(&field.name).expect("initialized");
                assert_eq!(
                    value.value_type(),
                    field.spec.value_type(),
                    "field {} of {}",
                    field.name,
                    model.id
                );
            }
        }
    }

    #[test]
    fn initial_values_follow_default_then_minimum_then_zero() {
        let model = model(InputFields::from_iter([
            ("prompt", FieldSpec::string(None)),
            ("steps", FieldSpec::integer(None, Some((3, 9)))),
            ("scale", FieldSpec::float(None, None)),
            ("width", FieldSpec::integer(Some(768), Some((512, 1024)))),
        ]));
        let form = FormState::from_descriptor(&model);

        assert_eq!(form.get("prompt"), Some(&FieldValue::String(String::new())));
        assert_eq!(form.get("steps"), Some(&FieldValue::Integer(3)));
        assert_eq!(form.get("scale"), Some(&FieldValue::Float(0.0)));
        assert_eq!(form.get("width"), Some(&FieldValue::Integer(768)));
    }

    #[test]
    fn set_checks_names_types_and_options() {
        let registry = Registry::builtin();
        let mut form = FormState::from_descriptor(registry.lookup("sdxl").expect("sdxl"));

        assert!(matches!(form.set("seed", 1), Err(FormError::UnknownField(_))));
        assert!(matches!(
            form.set("width", "wide"),
            Err(FormError::TypeMismatch { .. })
        ));
        assert!(matches!(
            form.set("refine", "turbo"),
            Err(FormError::NotAnOption { .. })
        ));

        form.set("refine", "no_refiner").expect("valid option");
        form.set("guidance_scale", 9).expect("integer into float field");
        assert_eq!(form.get("guidance_scale"), Some(&FieldValue::Float(9.0)));
    }

    #[test]
    fn output_count_edits_are_clamped() {
        let registry = Registry::builtin();
        let mut form = FormState::from_descriptor(registry.lookup("sdxl").expect("sdxl"));

        form.set("num_outputs", 12).expect("set");
        assert_eq!(form.get("num_outputs"), Some(&FieldValue::Integer(4)));
        form.set_raw("num_outputs", "0").expect("set raw");
        assert_eq!(form.get("num_outputs"), Some(&FieldValue::Integer(1)));

        form.set("width", 4096).expect("plain numeric fields are not clamped");
        assert_eq!(form.get("width"), Some(&FieldValue::Integer(4096)));
    }

    #[test]
    fn raw_text_parses_per_field_type() {
        let registry = Registry::builtin();
        let mut form = FormState::from_descriptor(registry.lookup("sdxl").expect("sdxl"));

        form.set_raw("lora_scale", "0.25").expect("float");
        assert_eq!(form.get("lora_scale"), Some(&FieldValue::Float(0.25)));

        form.set_raw("height", "").expect("empty clears");
        assert_eq!(form.get("height"), None);

        assert!(matches!(
            form.set_raw("height", "tall"),
            Err(FormError::InvalidNumber { .. })
        ));
        assert!(form.set_raw("lora_scale", "NaN").is_err());
    }

    #[test]
    fn prompt_meter_tracks_length() {
        let registry = Registry::builtin();
        let mut form = FormState::from_descriptor(registry.lookup("lcm-sdxl").expect("lcm"));
        assert_eq!(form.prompt_key(), Some("prompt"));
        assert_eq!(form.prompt_error(), Some(ValidationError::EmptyPrompt));
        assert!(!form.can_submit());

        form.set_prompt("a red fox").expect("set prompt");
        let meter = form.prompt_meter().expect("meter");
        assert_eq!((meter.len, meter.level), (9, MeterLevel::Normal));
        assert!(form.can_submit());

        form.set_prompt(&"x".repeat(480)).expect("set prompt");
        assert_eq!(form.prompt_meter().map(|m| m.level), Some(MeterLevel::Warning));

        form.set_prompt(&"x".repeat(501)).expect("set prompt");
        assert_eq!(form.prompt_meter().map(|m| m.level), Some(MeterLevel::Over));
        assert!(matches!(
            form.prompt_error(),
            Some(ValidationError::PromptTooLong { len: 501, .. })
        ));
    }

    #[test]
    fn references_only_for_models_with_image_inputs() {
        let registry = Registry::builtin();
        let mut sdxl = FormState::from_descriptor(registry.lookup("sdxl").expect("sdxl"));
        assert!(!sdxl.accepts_references());
        assert!(matches!(
            sdxl.add_reference("data:image/png;base64,AAAA"),
            Err(FormError::NoReferenceInput(_))
        ));

        let img2img = model(InputFields::from_iter([
            ("prompt", FieldSpec::string(None)),
            ("init_image", FieldSpec::string(None)),
        ]));
        let mut form = FormState::from_descriptor(&img2img);
        assert!(form.accepts_references());
        for i in 0..MAX_REFERENCES {
            form.add_reference(format!("ref-{i}")).expect("room left");
        }
        assert!(matches!(
            form.add_reference("one too many"),
            Err(FormError::TooManyReferences(4))
        ));
        assert_eq!(form.remove_reference(0).as_deref(), Some("ref-0"));
        assert_eq!(form.remove_reference(9), None);
    }

    #[test]
    fn serializes_as_value_map() {
        let model = model(InputFields::from_iter([
            ("prompt", FieldSpec::string(None)),
            ("steps", FieldSpec::integer(Some(4), None)),
        ]));
        let mut form = FormState::from_descriptor(&model);
        form.clear("steps").expect("clear");
        let json = serde_json::to_value(&form).expect("serialize");
        assert_eq!(json, serde_json::json!({ "prompt": "", "steps": null }));
    }
}
