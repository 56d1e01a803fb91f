//! Types describing a catalog entry and its parameter schema.
//!
//! The JSON shape mirrors what hosted model pages publish: an object of
//! `inputs` keyed by parameter name, each with a `type` tag and optional
//! `default`, `minimum`, `maximum` and `enum`.

use std::fmt;
use std::str::FromStr;

use serde::de::{MapAccess, Visitor};
use serde::ser::SerializeMap;
use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::error::Error;
use crate::path::ModelPath;
use crate::role::FieldRole;
use crate::value::FieldValue;

/// A selectable generation backend.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ModelDescriptor {
    /// Stable catalog key, e.g. `"sdxl"`.
    pub id: String,

    /// Human-friendly display name.
    pub name: String,

    #[serde(default)]
    pub description: String,

    /// Upstream owner, e.g. `"stability-ai"`.
    pub owner: String,

    /// Upstream model name, e.g. `"sdxl"`.
    #[serde(rename = "model")]
    pub model_name: String,

    /// Pinned upstream version id.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub version: Option<String>,

    /// Tunable parameters in display order.
    pub inputs: InputFields,

    pub output_kind: OutputKind,
}

impl ModelDescriptor {
    /// The `owner/model[:version]` path the provider expects.
    pub fn model_path(&self) -> String {
        match &self.version {
            Some(version) => format!("{}/{}:{}", self.owner, self.model_name, version),
            None => format!("{}/{}", self.owner, self.model_name),
        }
    }

    /// [`model_path`](Self::model_path), parsed.
    pub fn parsed_path(&self) -> Result<ModelPath, Error> {
        ModelPath::parse(&self.model_path())
    }

    pub fn field(&self, name: &str) -> Option<&FieldSpec> {
        self.inputs.get(name)
    }

    /// Check every catalog invariant for this entry.
    pub fn validate(&self) -> Result<(), Error> {
        if self.id.is_empty() {
            return Err(Error::InvalidField {
                model: self.name.clone(),
                field: "id".into(),
                reason: "catalog id is empty".into(),
            });
        }
        self.parsed_path()?;
        for field in self.inputs.iter() {
            field
                .spec
                .check()
                .map_err(|reason| Error::InvalidField {
                    model: self.id.clone(),
                    field: field.name.clone(),
                    reason,
                })?;
        }
        Ok(())
    }
}

/// Declared shape of a model's result. Drives rendering.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum OutputKind {
    Image,
    #[default]
    Text,
    Json,
}

impl OutputKind {
    pub fn as_str(self) -> &'static str {
        match self {
            OutputKind::Image => "image",
            OutputKind::Text => "text",
            OutputKind::Json => "json",
        }
    }
}

impl fmt::Display for OutputKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for OutputKind {
    type Err = std::convert::Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(match s {
            "image" => OutputKind::Image,
            "json" => OutputKind::Json,
            // Unknown kinds render as plain text.
            _ => OutputKind::Text,
        })
    }
}

impl Serialize for OutputKind {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

impl<'de> Deserialize<'de> for OutputKind {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        Ok(raw.parse().unwrap_or_default())
    }
}

// ---------------------------------------------------------------------------
// Fields
// ---------------------------------------------------------------------------

/// The value type a field accepts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ValueType {
    String,
    Integer,
    Float,
}

impl fmt::Display for ValueType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            ValueType::String => "string",
            ValueType::Integer => "integer",
            ValueType::Float => "number",
        })
    }
}

/// One tunable parameter of a model.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FieldSpec {
    #[serde(flatten)]
    pub kind: FieldKind,

    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub required: bool,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,

    /// Explicit role annotation. When absent, the name heuristics in
    /// [`crate::role`] apply.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub role: Option<FieldRole>,
}

/// Type-specific part of a [`FieldSpec`], discriminated by `type`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum FieldKind {
    String {
        #[serde(default, skip_serializing_if = "Option::is_none")]
        default: Option<String>,
        /// When present the field is a closed choice.
        #[serde(default, rename = "enum", skip_serializing_if = "Option::is_none")]
        enumeration: Option<Vec<String>>,
    },
    Integer {
        #[serde(default, skip_serializing_if = "Option::is_none")]
        default: Option<i64>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        minimum: Option<i64>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        maximum: Option<i64>,
    },
    #[serde(rename = "number", alias = "float")]
    Float {
        #[serde(default, skip_serializing_if = "Option::is_none")]
        default: Option<f64>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        minimum: Option<f64>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        maximum: Option<f64>,
    },
}

impl FieldSpec {
    fn with_kind(kind: FieldKind) -> Self {
        Self {
            kind,
            required: false,
            description: None,
            role: None,
        }
    }

    /// A free-text field.
    pub fn string(default: Option<&str>) -> Self {
        Self::with_kind(FieldKind::String {
            default: default.map(str::to_string),
            enumeration: None,
        })
    }

    /// A closed choice between `options`.
    pub fn choice(default: &str, options: &[&str]) -> Self {
        Self::with_kind(FieldKind::String {
            default: Some(default.to_string()),
            enumeration: Some(options.iter().map(|s| s.to_string()).collect()),
        })
    }

    pub fn integer(default: Option<i64>, range: Option<(i64, i64)>) -> Self {
        Self::with_kind(FieldKind::Integer {
            default,
            minimum: range.map(|(min, _)| min),
            maximum: range.map(|(_, max)| max),
        })
    }

    pub fn float(default: Option<f64>, range: Option<(f64, f64)>) -> Self {
        Self::with_kind(FieldKind::Float {
            default,
            minimum: range.map(|(min, _)| min),
            maximum: range.map(|(_, max)| max),
        })
    }

    pub fn required(mut self) -> Self {
        self.required = true;
        self
    }

    pub fn with_role(mut self, role: FieldRole) -> Self {
        self.role = Some(role);
        self
    }

    pub fn value_type(&self) -> ValueType {
        match self.kind {
            FieldKind::String { .. } => ValueType::String,
            FieldKind::Integer { .. } => ValueType::Integer,
            FieldKind::Float { .. } => ValueType::Float,
        }
    }

    pub fn default_value(&self) -> Option<FieldValue> {
        match &self.kind {
            FieldKind::String { default, .. } => default.clone().map(FieldValue::String),
            FieldKind::Integer { default, .. } => default.map(FieldValue::Integer),
            FieldKind::Float { default, .. } => default.map(FieldValue::Float),
        }
    }

    pub fn enumeration(&self) -> Option<&[String]> {
        match &self.kind {
            FieldKind::String { enumeration, .. } => enumeration.as_deref(),
            _ => None,
        }
    }

    /// Declared `(minimum, maximum)` widened to `f64`; `None` for strings.
    pub fn bounds(&self) -> Option<(Option<f64>, Option<f64>)> {
        match &self.kind {
            FieldKind::String { .. } => None,
            FieldKind::Integer {
                minimum, maximum, ..
            } => Some((minimum.map(|v| v as f64), maximum.map(|v| v as f64))),
            FieldKind::Float {
                minimum, maximum, ..
            } => Some((*minimum, *maximum)),
        }
    }

    /// Returns a reason when the spec contradicts itself.
    fn check(&self) -> Result<(), String> {
        match &self.kind {
            FieldKind::String {
                default,
                enumeration,
            } => {
                if let Some(options) = enumeration {
                    if options.is_empty() {
                        return Err("enumeration is empty".into());
                    }
                    if let Some(default) = default
                        && !options.contains(default)
                    {
                        return Err(format!("default '{default}' is not one of {options:?}"));
                    }
                }
                Ok(())
            }
            FieldKind::Integer { .. } | FieldKind::Float { .. } => {
                let (minimum, maximum) = self.bounds().unwrap_or((None, None));
                if let (Some(min), Some(max)) = (minimum, maximum)
                    && min > max
                {
                    return Err(format!("minimum {min} exceeds maximum {max}"));
                }
                let default = self.default_value().and_then(|v| v.as_f64());
                if let Some(default) = default {
                    if minimum.is_some_and(|min| default < min)
                        || maximum.is_some_and(|max| default > max)
                    {
                        return Err(format!("default {default} is outside the declared range"));
                    }
                }
                Ok(())
            }
        }
    }
}

/// A named parameter.
#[derive(Debug, Clone, PartialEq)]
pub struct InputField {
    pub name: String,
    pub spec: FieldSpec,
}

/// Parameters in display order.
///
/// Serialized as a JSON object; document order is preserved when reading so
/// that catalog files control the order fields appear in.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct InputFields(Vec<InputField>);

impl InputFields {
    pub fn new() -> Self {
        Self(Vec::new())
    }

    /// Append a field. Returns `false` (and leaves the list unchanged) when
    /// the name is already taken.
    pub fn push(&mut self, name: impl Into<String>, spec: FieldSpec) -> bool {
        let name = name.into();
        if self.get(&name).is_some() {
            return false;
        }
        self.0.push(InputField { name, spec });
        true
    }

    pub fn get(&self, name: &str) -> Option<&FieldSpec> {
        self.0.iter().find(|f| f.name == name).map(|f| &f.spec)
    }

    pub fn iter(&self) -> impl Iterator<Item = &InputField> {
        self.0.iter()
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.0.iter().map(|f| f.name.as_str())
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl<N: Into<String>> FromIterator<(N, FieldSpec)> for InputFields {
    fn from_iter<T: IntoIterator<Item = (N, FieldSpec)>>(iter: T) -> Self {
        let mut fields = InputFields::new();
        for (name, spec) in iter {
            fields.push(name, spec);
        }
        fields
    }
}

impl Serialize for InputFields {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.0.len()))?;
        for field in &self.0 {
            map.serialize_entry(&field.name, &field.spec)?;
        }
        map.end()
    }
}

impl<'de> Deserialize<'de> for InputFields {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        struct FieldsVisitor;

        impl<'de> Visitor<'de> for FieldsVisitor {
            type Value = InputFields;

            fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str("an object of parameter name to field spec")
            }

            fn visit_map<A: MapAccess<'de>>(self, mut access: A) -> Result<Self::Value, A::Error> {
                let mut fields = InputFields::new();
                while let Some((name, spec)) = access.next_entry::<String, FieldSpec>()? {
                    if !fields.push(name.clone(), spec) {
                        return Err(serde::de::Error::custom(format!(
                            "duplicate parameter '{name}'"
                        )));
                    }
                }
                Ok(fields)
            }
        }

        deserializer.deserialize_map(FieldsVisitor)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn field_specs_parse_with_type_tags() {
        let json = r#"{
            "prompt": { "type": "string", "required": true },
            "width": { "type": "integer", "default": 768, "minimum": 512, "maximum": 1024 },
            "guidance_scale": { "type": "number", "default": 12 },
            "refine": { "type": "string", "default": "no_refiner", "enum": ["no_refiner", "base"] }
        }"#;
        let fields: InputFields = serde_json::from_str(json).expect("parse inputs");

        let names: Vec<&str> = fields.names().collect();
        assert_eq!(names, ["prompt", "width", "guidance_scale", "refine"]);

        let prompt = fields.get("prompt").expect("prompt");
        assert!(prompt.required);
        assert_eq!(prompt.value_type(), ValueType::String);

        let width = fields.get("width").expect("width");
        assert_eq!(width.default_value(), Some(FieldValue::Integer(768)));
        assert_eq!(width.bounds(), Some((Some(512.0), Some(1024.0))));

        let guidance = fields.get("guidance_scale").expect("guidance");
        assert_eq!(guidance.default_value(), Some(FieldValue::Float(12.0)));

        let refine = fields.get("refine").expect("refine");
        assert_eq!(refine.enumeration().map(<[String]>::len), Some(2));
    }

    #[test]
    fn duplicate_parameters_are_rejected() {
        let json = r#"{ "a": { "type": "string" }, "a": { "type": "integer" } }"#;
        assert!(serde_json::from_str::<InputFields>(json).is_err());
    }

    #[test]
    fn check_flags_defaults_outside_constraints() {
        assert!(FieldSpec::integer(Some(2000), Some((512, 1024))).check().is_err());
        assert!(FieldSpec::float(Some(0.5), Some((0.0, 1.0))).check().is_ok());
        assert!(FieldSpec::integer(None, Some((5, 1))).check().is_err());
        assert!(FieldSpec::choice("x", &["a", "b"]).check().is_err());
        assert!(FieldSpec::choice("a", &["a", "b"]).check().is_ok());
    }

    #[test]
    fn unknown_output_kind_falls_back_to_text() {
        let kind: OutputKind = serde_json::from_str("\"audio\"").expect("parse kind");
        assert_eq!(kind, OutputKind::Text);
        let kind: OutputKind = serde_json::from_str("\"image\"").expect("parse kind");
        assert_eq!(kind, OutputKind::Image);
    }
}
