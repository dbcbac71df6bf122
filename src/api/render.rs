//! HTML rendering for the prediction form.
//!
//! The page is assembled directly: one labeled input per schema feature, a
//! select for the operation mode, and an optional prediction banner.

use std::collections::HashMap;

use crate::schema::{self, FieldKind, FormValue, OperationMode};

/// Everything the page needs for one render.
pub struct RenderContext<'a> {
    /// Decoded label, an `Error: ...` string, or None on a plain form load
    pub prediction: Option<&'a str>,

    /// Current value for every feature
    pub values: &'a HashMap<String, FormValue>,
}

/// Render the full form page.
pub fn render_page(ctx: &RenderContext<'_>) -> String {
    let mut page = String::with_capacity(4096);

    page.push_str("<!DOCTYPE html>\n<html lang=\"en\">\n<head>\n");
    page.push_str("<meta charset=\"utf-8\">\n");
    page.push_str("<title>Machine Maintenance Predictor</title>\n");
    page.push_str(
        "<style>body{font-family:sans-serif;max-width:640px;margin:2rem auto}\
         label{display:block;margin-top:.75rem}\
         input,select{width:100%;padding:.25rem}\
         .result{margin-top:1rem;padding:.75rem;background:#e7f5e7}\
         .result.error{background:#f5e7e7}</style>\n",
    );
    page.push_str("</head>\n<body>\n<h1>Machine Maintenance Predictor</h1>\n");

    if let Some(prediction) = ctx.prediction {
        let class = if prediction.starts_with("Error: ") {
            "result error"
        } else {
            "result"
        };
        page.push_str(&format!(
            "<div class=\"{}\">{}</div>\n",
            class,
            escape(prediction)
        ));
    }

    page.push_str("<form method=\"post\" action=\"/\">\n");

    for descriptor in schema::descriptors() {
        let name = escape(descriptor.name);
        page.push_str(&format!(
            "<label for=\"{name}\">{name}</label>\n",
            name = name
        ));

        match descriptor.kind {
            FieldKind::Categorical => {
                let current = ctx
                    .values
                    .get(descriptor.name)
                    .map(ToString::to_string)
                    .unwrap_or_default();

                page.push_str(&format!(
                    "<select id=\"{name}\" name=\"{name}\">\n",
                    name = name
                ));
                for choice in OperationMode::choices() {
                    let selected = if choice == current { " selected" } else { "" };
                    page.push_str(&format!(
                        "<option value=\"{choice}\"{selected}>{choice}</option>\n",
                        choice = escape(choice),
                        selected = selected
                    ));
                }
                page.push_str("</select>\n");
            }
            FieldKind::Numeric => {
                let value = ctx
                    .values
                    .get(descriptor.name)
                    .map(ToString::to_string)
                    .unwrap_or_default();

                page.push_str(&format!(
                    "<input type=\"text\" id=\"{name}\" name=\"{name}\" value=\"{value}\">\n",
                    name = name,
                    value = escape(&value)
                ));
            }
        }
    }

    page.push_str("<button type=\"submit\">Predict</button>\n</form>\n</body>\n</html>\n");
    page
}

fn escape(raw: &str) -> String {
    let mut out = String::with_capacity(raw.len());
    for c in raw.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(c),
        }
    }
    out
}
