//! Template management for the pipeline.
//!
//! Templates are embedded at build time; placeholders are written
//! `{{name}}` and every one of them must be filled.

use regex::Regex;

use crate::PipelineError;

/// Body of the `main.go` scaffold
pub const MAIN_TEMPLATE: &str = include_str!("../templates/main.go.tmpl");

/// Replace every `{{key}}` of `template` with its value
///
/// # Errors
///
/// Returns an error naming the first placeholder left without a value.
pub fn fill_template(template: &str, values: &[(&str, String)]) -> Result<String, PipelineError> {
    let mut filled = template.to_string();
    for (key, value) in values {
        filled = filled.replace(&format!("{{{{{}}}}}", key), value);
    }

    let placeholder = Regex::new(r"\{\{\s*([A-Za-z_][A-Za-z0-9_]*)\s*\}\}")
        .map_err(|e| PipelineError::Message(e.to_string()))?;
    if let Some(caps) = placeholder.captures(&filled) {
        return Err(PipelineError::Message(format!(
            "template placeholder `{}` has no value",
            &caps[1]
        )));
    }
    Ok(filled)
}
