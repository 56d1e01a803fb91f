//! Turns a generation result into a typed view.
//!
//! [`render`] is pure: the same output, kind and error always produce the same
//! [`View`], and no input makes it panic.

use serde::Serialize;
use serde_json::Value;
use studio_models::OutputKind;

/// What the result area should show.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", content = "content", rename_all = "snake_case")]
pub enum View {
    /// Nothing generated yet.
    Placeholder,
    Error(String),
    Images(ImageGrid),
    Text(String),
    /// Pretty-printed with a two-space indent.
    Json(String),
    /// The output does not fit the declared kind.
    Unsupported,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ImageGrid {
    pub columns: u8,
    pub tiles: Vec<ImageTile>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ImageTile {
    pub url: String,
    /// 1-based position.
    pub index: usize,
    /// Columns this tile spans.
    pub span: u8,
    pub centered: bool,
    pub download_name: String,
}

impl ImageGrid {
    /// 1 image: one column. 2 to 4: two columns, with the third of three
    /// centered across both. More than 4: one column.
    pub fn new(urls: Vec<String>) -> Self {
        let count = urls.len();
        let columns = if (2..=4).contains(&count) { 2 } else { 1 };
        let tiles = urls
            .into_iter()
            .enumerate()
            .map(|(i, url)| {
                let odd_one_out = count == 3 && i == 2;
                ImageTile {
                    url,
                    index: i + 1,
                    span: if odd_one_out { 2 } else { 1 },
                    centered: odd_one_out,
                    download_name: format!("generated-image-{}.jpg", i + 1),
                }
            })
            .collect();
        Self { columns, tiles }
    }
}

/// Derive the view for a result. An error always wins over output.
pub fn render(output: Option<&Value>, kind: OutputKind, error: Option<&str>) -> View {
    if let Some(message) = error {
        return View::Error(message.to_string());
    }
    let output = match output {
        None | Some(Value::Null) => return View::Placeholder,
        Some(output) => output,
    };

    match kind {
        OutputKind::Image => match image_urls(output) {
            Some(urls) => View::Images(ImageGrid::new(urls)),
            None => View::Unsupported,
        },
        OutputKind::Text => View::Text(text(output)),
        OutputKind::Json => {
            // Serializing a `Value` cannot fail.
            View::Json(serde_json::to_string_pretty(output).unwrap_or_default())
        }
    }
}

fn image_urls(output: &Value) -> Option<Vec<String>> {
    match output {
        Value::String(url) => Some(vec![url.clone()]),
        Value::Array(items) if !items.is_empty() => items
            .iter()
            .map(|item| item.as_str().map(str::to_string))
            .collect(),
        _ => None,
    }
}

fn text(output: &Value) -> String {
    match output {
        Value::String(s) => s.clone(),
        Value::Array(items) => items
            .iter()
            .map(|item| match item {
                Value::String(s) => s.clone(),
                other => other.to_string(),
            })
            .collect(),
        other => other.to_string(),
    }
}
