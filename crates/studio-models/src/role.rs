//! Field classification.
//!
//! Hosted model schemas carry no UX hints, so a field's role is inferred from
//! its name unless the catalog annotates it explicitly with [`FieldRole`].
//! Everything that needs to know "is this the prompt?" goes through
//! [`classify`], so the heuristics can be swapped for annotations without
//! touching call sites.

use serde::{Deserialize, Serialize};

use crate::spec::{FieldSpec, ModelDescriptor, ValueType};

/// Upper bound applied to output-count fields, whatever the schema says.
pub const MAX_OUTPUTS: f64 = 4.0;

/// Lower bound applied to output-count fields.
pub const MIN_OUTPUTS: f64 = 1.0;

const OUTPUT_COUNT_MARKERS: &[&str] = &["num", "count", "output", "image"];

/// Explicit role annotation for a field.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FieldRole {
    /// The free-text prompt.
    Prompt,
    /// Number of results to produce; clamped to `1..=4`.
    OutputCount,
    /// Reference image input, shown as an upload widget.
    ReferenceImage,
    /// No special treatment, even if the name looks special.
    Plain,
}

/// How a field is treated by the form.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct FieldClass {
    pub prompt_like: bool,
    pub output_count: bool,
    pub reference_image: bool,
}

/// Classify a field from its explicit role, or from its name and type.
pub fn classify(name: &str, spec: &FieldSpec) -> FieldClass {
    if let Some(role) = spec.role {
        return FieldClass {
            prompt_like: role == FieldRole::Prompt,
            output_count: role == FieldRole::OutputCount,
            reference_image: role == FieldRole::ReferenceImage,
        };
    }

    let lower = name.to_lowercase();
    let is_string = spec.value_type() == ValueType::String;

    FieldClass {
        prompt_like: is_string && lower.contains("prompt"),
        output_count: !is_string && OUTPUT_COUNT_MARKERS.iter().any(|m| lower.contains(m)),
        reference_image: is_string && lower.contains("image"),
    }
}

/// The single field that gets prompt treatment: the first prompt-like field
/// in display order.
pub fn prompt_field(model: &ModelDescriptor) -> Option<&str> {
    model
        .inputs
        .iter()
        .find(|f| classify(&f.name, &f.spec).prompt_like)
        .map(|f| f.name.as_str())
}

/// Whether the model shows the reference-image upload widget.
pub fn has_reference_image(model: &ModelDescriptor) -> bool {
    model
        .inputs
        .iter()
        .any(|f| classify(&f.name, &f.spec).reference_image)
}

/// Effective `(min, max)` for a numeric field after output-count clamping.
///
/// Output-count fields are narrowed to `[max(1, min), min(4, max)]`; other
/// fields keep their declared bounds. Strings have none.
pub fn effective_bounds(name: &str, spec: &FieldSpec) -> Option<(Option<f64>, Option<f64>)> {
    let (minimum, maximum) = spec.bounds()?;
    if !classify(name, spec).output_count {
        return Some((minimum, maximum));
    }
    Some((
        Some(minimum.map_or(MIN_OUTPUTS, |m| m.max(MIN_OUTPUTS))),
        Some(maximum.map_or(MAX_OUTPUTS, |m| m.min(MAX_OUTPUTS))),
    ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Registry;

    #[test]
    fn names_drive_classification() {
        let prompt = classify("prompt", &FieldSpec::string(None));
        assert!(prompt.prompt_like);
        assert!(!prompt.output_count);

        let negative = classify("Negative_Prompt", &FieldSpec::string(Some("")));
        assert!(negative.prompt_like);

        let strength = classify("prompt_strength", &FieldSpec::float(Some(0.8), None));
        assert!(!strength.prompt_like, "numeric fields are never the prompt");

        let outputs = classify("num_outputs", &FieldSpec::integer(Some(1), Some((1, 4))));
        assert!(outputs.output_count);

        let steps = classify("num_inference_steps", &FieldSpec::integer(Some(25), None));
        assert!(steps.output_count, "'num' marks an output-count field");

        let image = classify("init_image", &FieldSpec::string(None));
        assert!(image.reference_image);
        assert!(!image.output_count);
    }

    #[test]
    fn explicit_role_overrides_name() {
        let spec = FieldSpec::string(None).with_role(FieldRole::Plain);
        assert_eq!(classify("prompt", &spec), FieldClass::default());

        let spec = FieldSpec::string(None).with_role(FieldRole::Prompt);
        assert!(classify("text", &spec).prompt_like);
    }

    #[test]
    fn first_prompt_like_field_wins() {
        let registry = Registry::builtin();
        let dreamshaper = registry.lookup("dreamshaper").expect("dreamshaper");
        assert_eq!(prompt_field(dreamshaper), Some("prompt"));
        assert!(!has_reference_image(dreamshaper));
    }

    #[test]
    fn output_count_bounds_are_clamped() {
        let wide = FieldSpec::integer(Some(2), Some((0, 10)));
        assert_eq!(
            effective_bounds("num_outputs", &wide),
            Some((Some(1.0), Some(4.0)))
        );

        let open = FieldSpec::integer(Some(25), None);
        assert_eq!(
            effective_bounds("num_inference_steps", &open),
            Some((Some(1.0), Some(4.0)))
        );

        let width = FieldSpec::integer(Some(768), Some((512, 1024)));
        assert_eq!(
            effective_bounds("width", &width),
            Some((Some(512.0), Some(1024.0)))
        );
        assert_eq!(effective_bounds("prompt", &FieldSpec::string(None)), None);
    }
}
