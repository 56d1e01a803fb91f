//! Plain-text rendering of catalog entries, forms and result views.

use std::fmt::Write as _;

use studio_form::{FormLayout, GenerationResult, View, Widget};
use studio_models::Registry;

pub fn model_listing(registry: &Registry) -> String {
    let mut out = String::new();
    for model in registry.list() {
        let _ = writeln!(
            out,
            "{} ({}) [{}]",
            model.id, model.name, model.output_kind
        );
        let _ = writeln!(out, "  {}", model.model_path());
        if !model.description.is_empty() {
            let _ = writeln!(out, "  {}", model.description);
        }
        let names: Vec<&str> = model.inputs.names().collect();
        let _ = writeln!(out, "  inputs: {}", names.join(", "));
    }
    out
}

/// The form as `studio generate --set` would see it.
pub fn form_summary(form: &FormLayout) -> String {
    let mut out = String::new();
    if let Some(prompt) = &form.prompt {
        let _ = writeln!(out, "{} (--prompt)", prompt.label);
    }
    for field in &form.fields {
        let required = if field.required { " *" } else { "" };
        let detail = match &field.widget {
            Widget::Select { options, selected } => {
                format!("{selected} [one of: {}]", options.join(", "))
            }
            Widget::TextArea { value } => format!("{value:?}"),
            Widget::Number {
                min,
                max,
                step,
                value,
            } => {
                let value = value.map_or_else(|| "unset".to_string(), |v| v.to_string());
                let range = match (min, max) {
                    (Some(min), Some(max)) => format!(" [{min}..={max}]"),
                    (Some(min), None) => format!(" [>= {min}]"),
                    (None, Some(max)) => format!(" [<= {max}]"),
                    (None, None) => String::new(),
                };
                format!("{value}{range} step {step}")
            }
        };
        let _ = writeln!(out, "  {}{required} ({}): {detail}", field.label, field.name);
    }
    if form.shows_reference_upload {
        let _ = writeln!(out, "  reference images: upload not supported from the terminal");
    }
    out
}

pub fn view(view: &View) -> String {
    match view {
        View::Placeholder => "No output yet.\n".to_string(),
        View::Error(message) => format!("error: {message}\n"),
        View::Images(grid) => {
            let mut out = String::new();
            let noun = if grid.tiles.len() == 1 { "image" } else { "images" };
            let _ = writeln!(out, "{} {noun}, {} per row", grid.tiles.len(), grid.columns);
            for tile in &grid.tiles {
                let _ = writeln!(out, "  [{}] {} ({})", tile.index, tile.url, tile.download_name);
            }
            out
        }
        View::Text(text) | View::Json(text) => format!("{text}\n"),
        View::Unsupported => "Unsupported output format\n".to_string(),
    }
}

pub fn timing(result: &GenerationResult) -> Option<String> {
    let status = result.status.as_deref()?;
    let duration = result.duration_in_seconds.as_deref().unwrap_or("?");
    Some(format!("{status} in {duration}s"))
}
