//! `owner/model[:version]` model paths.

use std::fmt;
use std::str::FromStr;

use crate::error::Error;

/// A parsed reference to an upstream model.
///
/// Accepts exactly the strings matching `^.+/.+(:.+)?$`: some `/` with at
/// least one character on each side. The version is whatever follows the
/// first `:` of the model segment, when both sides of that colon are
/// non-empty. Line terminators (`\n`, `\r`, U+2028, U+2029) are never part
/// of a path.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ModelPath {
    owner: String,
    model: String,
    version: Option<String>,
}

impl ModelPath {
    pub fn new(
        owner: impl Into<String>,
        model: impl Into<String>,
        version: Option<String>,
    ) -> Result<Self, Error> {
        let owner = owner.into();
        let model = model.into();
        if owner.is_empty() || model.is_empty() || version.as_deref() == Some("") {
            let version = version.map(|v| format!(":{v}")).unwrap_or_default();
            return Err(Error::InvalidModelPath(format!("{owner}/{model}{version}")));
        }
        Ok(Self {
            owner,
            model,
            version,
        })
    }

    pub fn parse(path: &str) -> Result<Self, Error> {
        if path.contains(is_line_terminator) {
            return Err(Error::InvalidModelPath(path.to_string()));
        }
        let split = path
            .char_indices()
            .find(|&(i, c)| c == '/' && i > 0 && i + 1 < path.len())
            .map(|(i, _)| i)
            .ok_or_else(|| Error::InvalidModelPath(path.to_string()))?;

        let owner = &path[..split];
        let rest = &path[split + 1..];
        let (model, version) = match rest.split_once(':') {
            Some((model, version)) if !model.is_empty() && !version.is_empty() => {
                (model, Some(version.to_string()))
            }
            _ => (rest, None),
        };

        Ok(Self {
            owner: owner.to_string(),
            model: model.to_string(),
            version,
        })
    }

    pub fn owner(&self) -> &str {
        &self.owner
    }

    pub fn model(&self) -> &str {
        &self.model
    }

    /// The pinned version id, if any.
    pub fn version(&self) -> Option<&str> {
        self.version.as_deref()
    }
}

fn is_line_terminator(c: char) -> bool {
    matches!(c, '\n' | '\r' | '\u{2028}' | '\u{2029}')
}

impl fmt::Display for ModelPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.owner, self.model)?;
        if let Some(version) = &self.version {
            write!(f, ":{version}")?;
        }
        Ok(())
    }
}

impl FromStr for ModelPath {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

#[cfg(test)]
mod tests {
    use super::ModelPath;

    #[test]
    fn accepts_owner_model_and_optional_version() {
        let plain = ModelPath::parse("stability-ai/sdxl").expect("plain path");
        assert_eq!(plain.owner(), "stability-ai");
        assert_eq!(plain.model(), "sdxl");
        assert_eq!(plain.version(), None);

        let pinned = ModelPath::parse("stability-ai/sdxl:abc123").expect("pinned path");
        assert_eq!(pinned.model(), "sdxl");
        assert_eq!(pinned.version(), Some("abc123"));
        assert_eq!(pinned.to_string(), "stability-ai/sdxl:abc123");
    }

    #[test]
    fn rejects_paths_without_both_segments() {
        for bad in ["sdxl", "", "/", "owner/", "/model", "bad-model-no-slash"] {
            assert!(ModelPath::parse(bad).is_err(), "'{bad}' should be rejected");
        }
    }

    #[test]
    fn rejects_line_breaks_anywhere() {
        for bad in [
            "owner\n/model",
            "owner/\nmodel",
            "stability-ai/sdxl\n",
            "stability-ai/sdxl\r\n",
            "owner/model:v\u{2028}",
            "\u{2029}owner/model",
        ] {
            assert!(ModelPath::parse(bad).is_err(), "{bad:?} should be rejected");
        }
    }

    #[test]
    fn keeps_odd_but_matching_paths_verbatim() {
        for odd in ["a/b/c", "owner/model:", "owner/:v", "a//"] {
            let parsed = ModelPath::parse(odd).expect("matches owner/model pattern");
            assert_eq!(parsed.to_string(), odd);
        }
    }

    #[test]
    fn new_rejects_empty_segments() {
        assert!(ModelPath::new("", "sdxl", None).is_err());
        assert!(ModelPath::new("stability-ai", "sdxl", Some(String::new())).is_err());
        assert!(ModelPath::new("stability-ai", "sdxl", Some("abc".into())).is_ok());
    }
}
